use std::collections::HashMap;

use crate::error::{DataError, ValidationError};
use crate::image::format::{AlphaDepth, Image, PALETTE_BLOCK_SIZE, PALETTE_ENTRIES};

pub const MAX_COLORS: usize = PALETTE_ENTRIES;

pub struct PaletteCompression {
    pub palette: Vec<[u8; 3]>, // Unique RGB colors, in order of first appearance
    pub indices: Vec<u8>,      // Palette index for each pixel
}

/// Result of palette-encoding one image: the derived palette and the
/// index plane followed by the packed alpha plane.
pub struct PaletteEncoding {
    pub palette: Vec<[u8; 3]>,
    pub data: Vec<u8>,
}

fn distance_sq(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as i32 - y as i32;
            (d * d) as u32
        })
        .sum()
}

/// Index of the palette entry closest to `color`; the lowest index wins ties.
pub fn nearest_index(palette: &[[u8; 3]], color: [u8; 3]) -> u8 {
    let mut best = 0;
    let mut best_distance = u32::MAX;
    for (index, &entry) in palette.iter().enumerate() {
        let distance = distance_sq(entry, color);
        if distance < best_distance {
            best = index;
            best_distance = distance;
        }
    }
    best as u8
}

/// Derives a palette of at most `max_colors` entries from RGBA pixels.
///
/// Every distinct RGB triple gets a slot in order of first appearance. When
/// there are more distinct colors than `max_colors`, every
/// `distinct / max_colors`-th color is kept and each pixel is remapped to its
/// nearest kept color. Alpha is ignored.
///
/// # Parameters
/// - `pixels`: RGBA8 pixel data, 4 bytes per pixel.
/// - `max_colors`: palette size limit, 1 to 256.
///
/// # Returns
/// The palette and one index per pixel.
///
/// # Errors
/// `ValidationError::PaletteTooLarge` when `max_colors` is 0 or above 256.
pub fn build_palette(
    pixels: &[u8],
    max_colors: usize,
) -> Result<PaletteCompression, ValidationError> {
    if max_colors == 0 || max_colors > MAX_COLORS {
        return Err(ValidationError::PaletteTooLarge {
            requested: max_colors,
            max: MAX_COLORS,
        });
    }

    let mut unique_colors: HashMap<[u8; 3], usize> = HashMap::new();
    let mut distinct = Vec::new();
    let mut first_pass = Vec::with_capacity(pixels.len() / 4);

    for pixel in pixels.chunks_exact(4) {
        let color = [pixel[0], pixel[1], pixel[2]];
        let index = *unique_colors.entry(color).or_insert_with(|| {
            distinct.push(color);
            distinct.len() - 1
        });
        first_pass.push(index);
    }

    if distinct.len() <= max_colors {
        return Ok(PaletteCompression {
            palette: distinct,
            indices: first_pass.into_iter().map(|i| i as u8).collect(),
        });
    }

    let stride = distinct.len() / max_colors;
    let palette: Vec<[u8; 3]> = (0..max_colors).map(|k| distinct[k * stride]).collect();
    // Nearest entry is a function of the color alone, so resolve it once per distinct color.
    let remap: Vec<u8> = distinct
        .iter()
        .map(|&color| nearest_index(&palette, color))
        .collect();

    Ok(PaletteCompression {
        palette,
        indices: first_pass.into_iter().map(|i| remap[i]).collect(),
    })
}

/// Packs the alpha channel of RGBA pixels at the given depth.
pub fn pack_alpha(pixels: &[u8], depth: AlphaDepth) -> Vec<u8> {
    let alphas = pixels.chunks_exact(4).map(|p| p[3]);
    let count = pixels.len() / 4;
    let mut plane = vec![0u8; depth.plane_len(count)];

    match depth {
        AlphaDepth::Zero => {}
        AlphaDepth::One => {
            for (i, alpha) in alphas.enumerate() {
                if alpha > 127 {
                    plane[i / 8] |= 1 << (i % 8);
                }
            }
        }
        AlphaDepth::Four => {
            for (i, alpha) in alphas.enumerate() {
                let nibble = ((alpha as u32 + 8) / 17) as u8;
                plane[i / 2] |= nibble << ((i % 2) * 4);
            }
        }
        AlphaDepth::Eight => {
            for (i, alpha) in alphas.enumerate() {
                plane[i] = alpha;
            }
        }
    }
    plane
}

/// Expands a packed alpha plane to one byte per pixel.
pub fn unpack_alpha(plane: &[u8], depth: AlphaDepth, count: usize) -> Result<Vec<u8>, DataError> {
    let expected = depth.plane_len(count);
    if plane.len() < expected {
        return Err(DataError::Truncated {
            what: "alpha plane",
            expected,
            actual: plane.len(),
        });
    }

    let alphas = match depth {
        AlphaDepth::Zero => vec![255; count],
        AlphaDepth::One => (0..count)
            .map(|i| if plane[i / 8] >> (i % 8) & 1 == 1 { 255 } else { 0 })
            .collect(),
        AlphaDepth::Four => (0..count)
            .map(|i| ((plane[i / 2] >> ((i % 2) * 4)) & 0x0F) * 17)
            .collect(),
        AlphaDepth::Eight => plane[..count].to_vec(),
    };
    Ok(alphas)
}

/// Encodes an image against a fixed palette, mapping every pixel to its nearest entry.
pub fn encode_palette_with(image: &Image, palette: &[[u8; 3]], depth: AlphaDepth) -> Vec<u8> {
    let mut cache: HashMap<[u8; 3], u8> = HashMap::new();
    let mut data = Vec::with_capacity(image.pixel_count() + depth.plane_len(image.pixel_count()));
    for pixel in image.pixels.chunks_exact(4) {
        let color = [pixel[0], pixel[1], pixel[2]];
        let index = *cache
            .entry(color)
            .or_insert_with(|| nearest_index(palette, color));
        data.push(index);
    }
    data.extend(pack_alpha(&image.pixels, depth));
    data
}

/// Derives a palette from the image and writes the index plane followed by
/// the alpha plane.
pub fn encode_palette(
    image: &Image,
    depth: AlphaDepth,
) -> Result<PaletteEncoding, ValidationError> {
    let compression = build_palette(&image.pixels, MAX_COLORS)?;
    let mut data = compression.indices;
    data.extend(pack_alpha(&image.pixels, depth));
    Ok(PaletteEncoding {
        palette: compression.palette,
        data,
    })
}

/// Serializes a palette into the 256-entry B,G,R,A block, alpha forced to 255.
pub fn palette_block(palette: &[[u8; 3]]) -> Vec<u8> {
    let mut block = vec![0u8; PALETTE_BLOCK_SIZE];
    for entry in block.chunks_exact_mut(4) {
        entry[3] = 255;
    }
    for (entry, color) in block.chunks_exact_mut(4).zip(palette) {
        entry[0] = color[2];
        entry[1] = color[1];
        entry[2] = color[0];
    }
    block
}

/// Expands an index plane plus alpha plane back into RGBA.
///
/// # Parameters
/// - `data`: `width * height` indices followed by the packed alpha plane.
/// - `palette`: 4 bytes per entry in B,G,R order; the fourth byte is ignored.
/// - `depth`: bits per pixel of the alpha plane.
///
/// # Errors
/// - `DataError::Truncated` if either plane is short.
/// - `DataError::PaletteIndexOutOfRange` for an index past the palette.
/// - `DataError::DimensionsTooLarge` if the pixel buffer cannot be addressed.
pub fn decode_palette(
    data: &[u8],
    width: u32,
    height: u32,
    palette: &[u8],
    depth: AlphaDepth,
) -> Result<Image, DataError> {
    let pixel_len = Image::buffer_len(width, height)?;
    let count = pixel_len / Image::CHANNELS;
    if data.len() < count {
        return Err(DataError::Truncated {
            what: "index plane",
            expected: count,
            actual: data.len(),
        });
    }
    let (indices, plane) = data.split_at(count);
    let alphas = unpack_alpha(plane, depth, count)?;
    let palette_len = palette.len() / 4;

    let mut pixels = Vec::with_capacity(pixel_len);
    for (&index, &alpha) in indices.iter().zip(&alphas) {
        let index = index as usize;
        if index >= palette_len {
            return Err(DataError::PaletteIndexOutOfRange { index, palette_len });
        }
        let entry = &palette[4 * index..4 * index + 4];
        pixels.extend_from_slice(&[entry[2], entry[1], entry[0], alpha]);
    }

    Ok(Image {
        width,
        height,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_first_appearance_order() {
        let pixels = vec![
            255, 0, 0, 255, // Red
            255, 0, 0, 128, // Red, alpha ignored
            0, 255, 0, 255, // Green
            0, 0, 255, 255, // Blue
        ];

        let compressed = build_palette(&pixels, MAX_COLORS).unwrap();
        assert_eq!(compressed.palette, vec![[255, 0, 0], [0, 255, 0], [0, 0, 255]]);
        assert_eq!(compressed.indices, vec![0, 0, 1, 2]);
    }

    #[test]
    fn test_palette_reduction_stride_and_ties() {
        // 8 distinct grays reduced to 4: stride 2 keeps 0, 20, 40, 60.
        let mut pixels = Vec::new();
        for i in 0..8u8 {
            pixels.extend_from_slice(&[i * 10, i * 10, i * 10, 255]);
        }
        let compressed = build_palette(&pixels, 4).unwrap();
        assert_eq!(
            compressed.palette,
            vec![[0, 0, 0], [20, 20, 20], [40, 40, 40], [60, 60, 60]]
        );
        // 10 is equidistant from 0 and 20, so the lower index wins.
        assert_eq!(compressed.indices, vec![0, 0, 1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn test_palette_too_large() {
        assert!(matches!(
            build_palette(&[0, 0, 0, 255], 257),
            Err(ValidationError::PaletteTooLarge { requested: 257, max: 256 })
        ));
    }

    #[test]
    fn test_palette_empty_input() {
        let compressed = build_palette(&[], MAX_COLORS).unwrap();
        assert!(compressed.palette.is_empty());
        assert!(compressed.indices.is_empty());
    }

    #[test]
    fn test_alpha_plane_layouts() {
        let pixels: Vec<u8> = [0u8, 200, 17, 255, 100]
            .iter()
            .flat_map(|&a| [0, 0, 0, a])
            .collect();

        assert_eq!(pack_alpha(&pixels, AlphaDepth::One), vec![0b0000_1010]);
        assert_eq!(pack_alpha(&pixels, AlphaDepth::Four), vec![0xC0, 0xF1, 0x06]);
        assert_eq!(pack_alpha(&pixels, AlphaDepth::Eight), vec![0, 200, 17, 255, 100]);
        assert!(pack_alpha(&pixels, AlphaDepth::Zero).is_empty());

        assert_eq!(
            unpack_alpha(&[0xC0, 0xF1, 0x06], AlphaDepth::Four, 5).unwrap(),
            vec![0, 204, 17, 255, 102]
        );
        assert_eq!(
            unpack_alpha(&[0b0000_1010], AlphaDepth::One, 5).unwrap(),
            vec![0, 255, 0, 255, 0]
        );
    }

    #[test]
    fn test_decode_swaps_palette_channels() {
        let palette = [10, 20, 30, 0, 40, 50, 60, 0];
        let image = decode_palette(&[1, 0], 2, 1, &palette, AlphaDepth::Zero).unwrap();
        assert_eq!(image.pixels, vec![60, 50, 40, 255, 30, 20, 10, 255]);
    }

    #[test]
    fn test_decode_invalid_index() {
        let palette = [0u8; 4];
        let result = decode_palette(&[0, 1], 2, 1, &palette, AlphaDepth::Zero);
        assert!(matches!(
            result,
            Err(DataError::PaletteIndexOutOfRange { index: 1, palette_len: 1 })
        ));
    }

    #[test]
    fn test_decode_truncated_alpha_plane() {
        let palette = [0u8; 4];
        let result = decode_palette(&[0, 0, 0, 0, 0xFF], 4, 1, &palette, AlphaDepth::Four);
        assert!(matches!(
            result,
            Err(DataError::Truncated { what: "alpha plane", expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_palette_block_layout() {
        let block = palette_block(&[[1, 2, 3]]);
        assert_eq!(block.len(), 1024);
        assert_eq!(&block[..8], &[3, 2, 1, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn test_encode_decode_depth_eight() {
        let mut pixels = Vec::new();
        for i in 0..16u8 {
            pixels.extend_from_slice(&[i, 255 - i, i / 2, i * 16]);
        }
        let image = Image::new(4, 4, pixels).unwrap();
        let encoded = encode_palette(&image, AlphaDepth::Eight).unwrap();
        assert_eq!(encoded.data.len(), 32);

        let block = palette_block(&encoded.palette);
        let decoded = decode_palette(&encoded.data, 4, 4, &block, AlphaDepth::Eight).unwrap();
        assert_eq!(decoded, image);
    }
}
