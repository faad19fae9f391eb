use serde::{Deserialize, Serialize};

use crate::error::{DataError, FormatError, ValidationError};

pub const MAGIC_HEADER: [u8; 4] = *b"BLP2";
pub const VERSION: u32 = 1;

/// Number of offset/size slots in the header, one per mipmap level.
pub const MAX_MIPS: usize = 16;
pub const HEADER_SIZE: usize = 0x94;
pub const PALETTE_ENTRIES: usize = 256;
pub const PALETTE_BLOCK_SIZE: usize = PALETTE_ENTRIES * 4;

/// Format hints stored in the header that select a block variant.
pub const FORMAT_HINT_BLOCK_A: u8 = 0;
pub const FORMAT_HINT_BLOCK_B: u8 = 1;
pub const FORMAT_HINT_BLOCK_C: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompressionKind {
    Palette = 1,
    #[default]
    Block = 2,
    Truecolor = 3,
}

impl TryFrom<u8> for CompressionKind {
    type Error = FormatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Palette),
            2 => Ok(Self::Block),
            3 => Ok(Self::Truecolor),
            other => Err(FormatError::UnsupportedCompressionKind(other)),
        }
    }
}

/// Bits of alpha stored per pixel in a palette-compressed level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlphaDepth {
    Zero = 0,
    One = 1,
    Four = 4,
    Eight = 8,
}

impl AlphaDepth {
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Size in bytes of the packed alpha plane for `pixel_count` pixels.
    pub fn plane_len(self, pixel_count: usize) -> usize {
        match self {
            Self::Zero => 0,
            Self::One => pixel_count.div_ceil(8),
            Self::Four => pixel_count.div_ceil(2),
            Self::Eight => pixel_count,
        }
    }
}

impl TryFrom<u8> for AlphaDepth {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Zero),
            1 => Ok(Self::One),
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            other => Err(ValidationError::UnsupportedAlphaDepth(other)),
        }
    }
}

/// What kind of alpha values an image carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlphaProfile {
    /// No alpha strictly between 0 and 255, and not both extremes present.
    Opaque,
    /// Alpha values are exactly {0, 255}.
    Binary,
    /// At least one alpha value strictly between 0 and 255.
    Translucent,
}

/// Uncompressed RGBA8 image, the value every codec produces and consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Image {
    pub const CHANNELS: usize = 4;

    /// Byte length of an RGBA8 buffer of `width` x `height` pixels.
    ///
    /// # Errors
    /// `DataError::DimensionsTooLarge` when the length does not fit in `usize`.
    pub fn buffer_len(width: u32, height: u32) -> Result<usize, DataError> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|count| count.checked_mul(Self::CHANNELS))
            .ok_or(DataError::DimensionsTooLarge { width, height })
    }

    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, DataError> {
        let expected = Self::buffer_len(width, height)?;
        if pixels.len() != expected {
            return Err(DataError::LengthMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Image of the given size filled with a single RGBA color.
    pub fn filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        Self {
            width,
            height,
            pixels: color.repeat(width as usize * height as usize),
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * Self::CHANNELS;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn alpha_profile(&self) -> AlphaProfile {
        let mut has_zero = false;
        let mut has_full = false;
        for pixel in self.pixels.chunks_exact(Self::CHANNELS) {
            match pixel[3] {
                0 => has_zero = true,
                255 => has_full = true,
                _ => return AlphaProfile::Translucent,
            }
        }
        if has_zero && has_full {
            AlphaProfile::Binary
        } else {
            AlphaProfile::Opaque
        }
    }
}
