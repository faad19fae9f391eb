use log::{debug, error, info};

use super::format::{
    AlphaDepth, AlphaProfile, CompressionKind, Image, FORMAT_HINT_BLOCK_B, HEADER_SIZE,
};
use super::header::ContainerHeader;
use super::mipmap::generate_chain;
use super::options::BuildOptions;
use super::resize::{next_power_of_two_dims, resize};
use crate::compression::block::BlockVariant;
use crate::compression::palette::{build_palette, palette_block, MAX_COLORS};
use crate::compression::Codec;
use crate::error::{BlpError, DataError, ValidationError};

/// Picks the codec for `image`: explicit options win, everything else is
/// derived from the alpha values the image contains.
pub fn select_codec(image: &Image, options: &BuildOptions) -> Result<Codec, ValidationError> {
    let profile = image.alpha_profile();
    debug!("Alpha profile: {:?}", profile);

    let codec = match options.compression {
        CompressionKind::Palette => {
            let alpha_depth = match options.alpha_depth {
                Some(depth) => AlphaDepth::try_from(depth)?,
                None => match profile {
                    AlphaProfile::Opaque => AlphaDepth::Zero,
                    AlphaProfile::Binary => AlphaDepth::One,
                    AlphaProfile::Translucent => AlphaDepth::Eight,
                },
            };
            Codec::Palette { alpha_depth }
        }
        CompressionKind::Block => {
            let variant = match options.block_variant {
                Some(variant) => variant,
                None if profile == AlphaProfile::Translucent => {
                    if options.format_hint == Some(FORMAT_HINT_BLOCK_B) {
                        BlockVariant::ExplicitAlpha
                    } else {
                        BlockVariant::InterpolatedAlpha
                    }
                }
                None => BlockVariant::PunchThrough,
            };
            let punch_through = match (variant, options.alpha_depth) {
                (BlockVariant::PunchThrough, Some(0)) => false,
                (BlockVariant::PunchThrough, Some(1)) => true,
                (BlockVariant::PunchThrough, Some(other)) => {
                    return Err(ValidationError::UnsupportedAlphaDepth(other))
                }
                (BlockVariant::PunchThrough, None) => profile != AlphaProfile::Opaque,
                _ => false,
            };
            Codec::Block {
                variant,
                punch_through,
            }
        }
        CompressionKind::Truecolor => Codec::Truecolor,
    };
    debug!("Selected codec {:?}", codec);
    Ok(codec)
}

fn to_u32(value: usize) -> Result<u32, ValidationError> {
    u32::try_from(value).map_err(|_| ValidationError::InvalidDimensions {
        width: u32::MAX,
        height: u32::MAX,
    })
}

/// Serializes `image` into a container.
///
/// # Parameters
/// - `image`: RGBA8 source; resized to powers of two when `options.auto_resize` is set.
/// - `options`: codec choice and chain settings, see [`BuildOptions`].
///
/// # Returns
/// The container bytes: header, optional palette block, then every level.
///
/// # Errors
/// - `ValidationError` for empty or non-power-of-two dimensions and unsupported
///   alpha depths.
/// - `DataError::LengthMismatch` when the pixel buffer does not match the size.
pub fn build(image: &Image, options: &BuildOptions) -> Result<Vec<u8>, BlpError> {
    info!("Starting build of {}x{} image", image.width, image.height);

    if image.width == 0 || image.height == 0 {
        error!("Invalid dimensions {}x{}", image.width, image.height);
        return Err(ValidationError::InvalidDimensions {
            width: image.width,
            height: image.height,
        }
        .into());
    }
    let expected = Image::buffer_len(image.width, image.height)?;
    if image.pixels.len() != expected {
        error!("Pixel buffer is {} bytes, expected {}", image.pixels.len(), expected);
        return Err(DataError::LengthMismatch {
            expected,
            actual: image.pixels.len(),
        }
        .into());
    }

    let base = if image.width.is_power_of_two() && image.height.is_power_of_two() {
        image.clone()
    } else if options.auto_resize {
        let (width, height) = next_power_of_two_dims(image.width, image.height);
        resize(image, width, height, options.resize_mode, options.fill_color)?
    } else {
        error!(
            "Image is {}x{} and auto-resize is disabled",
            image.width, image.height
        );
        return Err(ValidationError::NonPowerOfTwo {
            width: image.width,
            height: image.height,
        }
        .into());
    };

    let codec = select_codec(&base, options)?;
    let palette = match codec {
        Codec::Palette { .. } => build_palette(&base.pixels, MAX_COLORS)?.palette,
        _ => Vec::new(),
    };

    let mut header = ContainerHeader::new(codec.kind(), base.width, base.height);
    header.alpha_depth = codec.alpha_depth();
    header.format_hint = codec.format_hint();
    header.mip_flag = u8::from(options.generate_mipmaps);

    let chain = if options.generate_mipmaps {
        generate_chain(base)
    } else {
        vec![base]
    };

    let mut body = Vec::new();
    if let Codec::Palette { .. } = codec {
        body.extend(palette_block(&palette));
        debug!("Palette block written with {} colors", palette.len());
    }

    for (slot, level) in chain.iter().enumerate() {
        let payload = codec.encode(level, &palette);
        header.mip_offsets[slot] = to_u32(HEADER_SIZE + body.len())?;
        header.mip_sizes[slot] = to_u32(payload.len())?;
        debug!(
            "Level {}: {}x{} -> {} bytes at offset {}",
            slot,
            level.width,
            level.height,
            payload.len(),
            header.mip_offsets[slot]
        );
        body.extend(payload);
    }

    let mut encoded = header.to_bytes();
    encoded.extend(body);
    info!(
        "Build completed: {} levels, {} bytes",
        chain.len(),
        encoded.len()
    );
    Ok(encoded)
}
