pub mod block;
pub mod palette;
pub mod truecolor;

use log::debug;

use crate::error::{DataError, FormatError};
use crate::image::format::{AlphaDepth, CompressionKind, Image};
use crate::image::header::{ContainerHeader, MipmapLevel};
use block::BlockVariant;

/// Pixel codec for one container, selected from compression kind and format hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Palette { alpha_depth: AlphaDepth },
    Block { variant: BlockVariant, punch_through: bool },
    Truecolor,
}

impl Codec {
    pub fn from_header(header: &ContainerHeader) -> Result<Self, FormatError> {
        let codec = match header.compression {
            CompressionKind::Palette => Codec::Palette {
                alpha_depth: AlphaDepth::try_from(header.alpha_depth)
                    .map_err(|_| FormatError::UnsupportedAlphaDepth(header.alpha_depth))?,
            },
            CompressionKind::Block => Codec::Block {
                variant: BlockVariant::from_format_hint(header.format_hint),
                punch_through: header.alpha_depth > 0,
            },
            CompressionKind::Truecolor => Codec::Truecolor,
        };
        debug!("Codec selected: {:?}", codec);
        Ok(codec)
    }

    pub fn kind(&self) -> CompressionKind {
        match self {
            Codec::Palette { .. } => CompressionKind::Palette,
            Codec::Block { .. } => CompressionKind::Block,
            Codec::Truecolor => CompressionKind::Truecolor,
        }
    }

    /// Alpha depth recorded in the header for this codec.
    pub fn alpha_depth(&self) -> u8 {
        match self {
            Codec::Palette { alpha_depth } => alpha_depth.bits(),
            Codec::Block {
                variant: BlockVariant::PunchThrough,
                punch_through,
            } => u8::from(*punch_through),
            Codec::Block { .. } | Codec::Truecolor => 8,
        }
    }

    pub fn format_hint(&self) -> u8 {
        match self {
            Codec::Block { variant, .. } => variant.format_hint(),
            Codec::Palette { .. } | Codec::Truecolor => 0,
        }
    }

    /// Decodes one chain level. `palette` is the raw palette block and is only
    /// read by the palette codec.
    pub fn decode(&self, level: &MipmapLevel, palette: &[u8]) -> Result<Image, DataError> {
        match *self {
            Codec::Palette { alpha_depth } => palette::decode_palette(
                level.data,
                level.width,
                level.height,
                palette,
                alpha_depth,
            ),
            Codec::Block { variant, .. } => {
                block::decode_blocks(level.data, level.width, level.height, variant)
            }
            Codec::Truecolor => truecolor::decode_truecolor(level.data, level.width, level.height),
        }
    }

    /// Encodes one chain level. `palette` is the shared palette of the chain
    /// and is only read by the palette codec.
    pub fn encode(&self, image: &Image, palette: &[[u8; 3]]) -> Vec<u8> {
        match *self {
            Codec::Palette { alpha_depth } => {
                palette::encode_palette_with(image, palette, alpha_depth)
            }
            Codec::Block {
                variant,
                punch_through,
            } => block::encode_blocks(image, variant, punch_through),
            Codec::Truecolor => truecolor::encode_truecolor(image),
        }
    }
}
