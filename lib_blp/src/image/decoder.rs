use std::fmt;

use log::{debug, error, info};
use serde::Serialize;

use super::format::{
    CompressionKind, Image, FORMAT_HINT_BLOCK_B, FORMAT_HINT_BLOCK_C, HEADER_SIZE, MAX_MIPS,
    PALETTE_BLOCK_SIZE,
};
use super::header::{parse_header, walk_chain};
use crate::compression::block::BlockVariant;
use crate::compression::Codec;
use crate::error::{BlpError, DataError, FormatError};

/// Decodes the base (first populated) level of a container.
///
/// # Parameters
/// - `encoded_data`: the complete container, header included.
///
/// # Returns
/// The base level as an RGBA8 `Image` at the header's dimensions.
///
/// # Errors
/// - `FormatError` for a bad magic tag, version, compression kind or chain.
/// - `DataError` when a payload is shorter than its level needs, a palette
///   index is out of range or the dimensions cannot be addressed.
pub fn decode(encoded_data: &[u8]) -> Result<Image, BlpError> {
    info!("Starting decode of {} bytes", encoded_data.len());

    let header = parse_header(encoded_data)?;
    let levels = walk_chain(encoded_data, &header)?;
    let Some(base) = levels.first() else {
        error!("No populated mipmap slot");
        return Err(FormatError::EmptyChain.into());
    };
    debug!("Chain has {} populated levels", levels.len());

    let codec = Codec::from_header(&header)?;
    let palette = match codec {
        Codec::Palette { .. } => {
            let end = HEADER_SIZE + PALETTE_BLOCK_SIZE;
            if encoded_data.len() < end {
                error!("Palette block truncated");
                return Err(DataError::Truncated {
                    what: "palette",
                    expected: end,
                    actual: encoded_data.len(),
                }
                .into());
            }
            &encoded_data[HEADER_SIZE..end]
        }
        _ => &[][..],
    };

    let image = codec.decode(base, palette)?;
    info!(
        "Decode completed: {}x{} from slot {}",
        image.width, image.height, base.index
    );
    Ok(image)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelSummary {
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub offset: usize,
    pub size: usize,
}

/// Header fields of a container plus the block variant the decoder would pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderReport {
    pub magic: String,
    pub version: u32,
    pub compression: CompressionKind,
    pub alpha_depth: u8,
    pub format_hint: u8,
    pub mip_flag: u8,
    pub width: u32,
    pub height: u32,
    /// Raw slot tables, populated or not.
    pub mip_offsets: [u32; MAX_MIPS],
    pub mip_sizes: [u32; MAX_MIPS],
    pub levels: Vec<LevelSummary>,
    pub block_variant: Option<BlockVariant>,
    pub classification: String,
}

fn classify(compression: CompressionKind, format_hint: u8) -> (Option<BlockVariant>, String) {
    if compression != CompressionKind::Block {
        return (None, format!("{:?} compression, format hint unused", compression));
    }
    let variant = BlockVariant::from_format_hint(format_hint);
    let reason = match format_hint {
        FORMAT_HINT_BLOCK_B => {
            format!("format hint {} selects explicit 4-bit alpha", format_hint)
        }
        FORMAT_HINT_BLOCK_C => {
            format!("format hint {} selects interpolated alpha ramp", format_hint)
        }
        _ => format!(
            "format hint {} is neither {} nor {}, color block with punch-through alpha",
            format_hint, FORMAT_HINT_BLOCK_B, FORMAT_HINT_BLOCK_C
        ),
    };
    (Some(variant), reason)
}

/// Parses a container and reports its header without decoding pixels.
pub fn describe(encoded_data: &[u8]) -> Result<HeaderReport, BlpError> {
    let header = parse_header(encoded_data)?;
    let levels = walk_chain(encoded_data, &header)?;
    let (block_variant, classification) = classify(header.compression, header.format_hint);

    Ok(HeaderReport {
        magic: String::from_utf8_lossy(&header.magic).into_owned(),
        version: header.version,
        compression: header.compression,
        alpha_depth: header.alpha_depth,
        format_hint: header.format_hint,
        mip_flag: header.mip_flag,
        width: header.width,
        height: header.height,
        mip_offsets: header.mip_offsets,
        mip_sizes: header.mip_sizes,
        levels: levels
            .iter()
            .map(|level| LevelSummary {
                index: level.index,
                width: level.width,
                height: level.height,
                offset: level.offset,
                size: level.size,
            })
            .collect(),
        block_variant,
        classification,
    })
}

impl fmt::Display for HeaderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Magic: {}", self.magic)?;
        writeln!(f, "Version: {}", self.version)?;
        writeln!(
            f,
            "Compression: {:?} ({})",
            self.compression, self.compression as u8
        )?;
        writeln!(f, "Alpha depth: {}", self.alpha_depth)?;
        writeln!(f, "Format hint: {}", self.format_hint)?;
        writeln!(f, "Mipmaps: {}", self.mip_flag)?;
        writeln!(f, "Size: {}x{}", self.width, self.height)?;
        match self.block_variant {
            Some(variant) => {
                writeln!(f, "Block variant: {:?} ({})", variant, self.classification)?
            }
            None => writeln!(f, "Block variant: none ({})", self.classification)?,
        }
        writeln!(f, "Slot offsets: {:?}", self.mip_offsets)?;
        writeln!(f, "Slot sizes: {:?}", self.mip_sizes)?;
        writeln!(f, "Levels: {}", self.levels.len())?;
        for level in &self.levels {
            writeln!(
                f,
                "  [{}] {}x{} offset={} size={}",
                level.index, level.width, level.height, level.offset, level.size
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::header::ContainerHeader;

    #[test]
    fn test_classify_mirrors_dispatch() {
        for hint in 0..=255u8 {
            let (variant, _) = classify(CompressionKind::Block, hint);
            assert_eq!(variant, Some(BlockVariant::from_format_hint(hint)));
        }
        assert_eq!(classify(CompressionKind::Palette, 7).0, None);
    }

    #[test]
    fn test_empty_chain() {
        let bytes = ContainerHeader::new(CompressionKind::Block, 4, 4).to_bytes();
        assert_eq!(decode(&bytes), Err(BlpError::from(FormatError::EmptyChain)));
    }

    #[test]
    fn test_missing_palette_block() {
        let mut header = ContainerHeader::new(CompressionKind::Palette, 1, 1);
        header.mip_offsets[0] = 148;
        header.mip_sizes[0] = 1;
        let mut bytes = header.to_bytes();
        bytes.push(0);
        assert!(matches!(
            decode(&bytes),
            Err(BlpError::Data(DataError::Truncated { what: "palette", .. }))
        ));
    }

    #[test]
    fn test_describe_report() {
        let mut header = ContainerHeader::new(CompressionKind::Block, 8, 8);
        header.format_hint = 7;
        header.alpha_depth = 8;
        header.mip_offsets[0] = 148;
        header.mip_sizes[0] = 64;
        let mut bytes = header.to_bytes();
        bytes.resize(148 + 64, 0);

        let report = describe(&bytes).unwrap();
        assert_eq!(report.magic, "BLP2");
        assert_eq!(report.block_variant, Some(BlockVariant::InterpolatedAlpha));
        assert_eq!(report.levels.len(), 1);

        let text = report.to_string();
        assert!(text.contains("Size: 8x8"));
        assert!(text.contains("InterpolatedAlpha"));
        assert!(text.contains("[0] 8x8 offset=148 size=64"));
    }

    #[test]
    fn test_describe_keeps_half_populated_slots() {
        let mut header = ContainerHeader::new(CompressionKind::Truecolor, 2, 2);
        header.mip_offsets[0] = 148;
        header.mip_sizes[0] = 16;
        header.mip_offsets[1] = 164;
        let mut bytes = header.to_bytes();
        bytes.resize(148 + 16, 0);

        let report = describe(&bytes).unwrap();
        assert_eq!(report.levels.len(), 1);
        assert_eq!(report.mip_offsets[1], 164);
        assert_eq!(report.mip_sizes[1], 0);

        let text = report.to_string();
        assert!(text.contains("Slot offsets: [148, 164, 0,"));
        assert!(text.contains("Slot sizes: [16, 0, 0,"));
    }
}
