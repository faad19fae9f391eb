//! 4x4 block compression with three alpha schemes sharing one RGB565 color block.
//!
//! Block layouts (all multi-byte fields little-endian):
//! - [`BlockVariant::PunchThrough`]: `c0: u16, c1: u16, indices: u32` (8 bytes)
//! - [`BlockVariant::ExplicitAlpha`]: 16 alpha nibbles (8 bytes) + color block
//! - [`BlockVariant::InterpolatedAlpha`]: `a0: u8, a1: u8`, 16 3-bit indices
//!   (6 bytes) + color block

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::image::format::{
    Image, FORMAT_HINT_BLOCK_A, FORMAT_HINT_BLOCK_B, FORMAT_HINT_BLOCK_C,
};

pub const COLOR_BLOCK_SIZE: usize = 8;
const TEXELS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockVariant {
    /// Color block only; index 3 of a three-color block is transparent.
    PunchThrough,
    /// Explicit 4-bit alpha per texel.
    ExplicitAlpha,
    /// Two alpha endpoints with an 8-entry interpolated ramp.
    InterpolatedAlpha,
}

impl BlockVariant {
    pub fn block_size(self) -> usize {
        match self {
            Self::PunchThrough => COLOR_BLOCK_SIZE,
            Self::ExplicitAlpha | Self::InterpolatedAlpha => 2 * COLOR_BLOCK_SIZE,
        }
    }

    /// Variant selected by a header format hint; unknown hints fall back to punch-through.
    pub fn from_format_hint(hint: u8) -> Self {
        match hint {
            FORMAT_HINT_BLOCK_B => Self::ExplicitAlpha,
            FORMAT_HINT_BLOCK_C => Self::InterpolatedAlpha,
            _ => Self::PunchThrough,
        }
    }

    pub fn format_hint(self) -> u8 {
        match self {
            Self::PunchThrough => FORMAT_HINT_BLOCK_A,
            Self::ExplicitAlpha => FORMAT_HINT_BLOCK_B,
            Self::InterpolatedAlpha => FORMAT_HINT_BLOCK_C,
        }
    }
}

/// Byte length of a level of the given size.
///
/// # Errors
/// `DataError::DimensionsTooLarge` when the length does not fit in `usize`.
pub fn compressed_len(width: u32, height: u32, variant: BlockVariant) -> Result<usize, DataError> {
    (width.div_ceil(4) as usize)
        .checked_mul(height.div_ceil(4) as usize)
        .and_then(|tiles| tiles.checked_mul(variant.block_size()))
        .ok_or(DataError::DimensionsTooLarge { width, height })
}

const fn expand_table<const N: usize>() -> [u8; N] {
    let mut table = [0u8; N];
    let max = (N - 1) as u32;
    let mut i = 0;
    while i < N {
        table[i] = ((i as u32 * 255 + max / 2) / max) as u8;
        i += 1;
    }
    table
}

static EXPAND_5: [u8; 32] = expand_table::<32>();
static EXPAND_6: [u8; 64] = expand_table::<64>();

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Color565(u16);

impl Color565 {
    pub fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u16 {
        self.0
    }

    /// Quantizes an 8-bit color, rounding each channel to the nearest step.
    pub fn from_rgb888(rgb: [u8; 3]) -> Self {
        let r = (rgb[0] as u16 * 31 + 127) / 255;
        let g = (rgb[1] as u16 * 63 + 127) / 255;
        let b = (rgb[2] as u16 * 31 + 127) / 255;
        Self((r << 11) | (g << 5) | b)
    }

    pub fn red(self) -> u8 {
        EXPAND_5[(self.0 >> 11) as usize & 0x1F]
    }

    pub fn green(self) -> u8 {
        EXPAND_6[(self.0 >> 5) as usize & 0x3F]
    }

    pub fn blue(self) -> u8 {
        EXPAND_5[self.0 as usize & 0x1F]
    }

    pub fn to_rgb888(self) -> [u8; 3] {
        [self.red(), self.green(), self.blue()]
    }
}

/// The 4-entry color table of a block and whether it is a four-color ramp.
fn color_table(c0: Color565, c1: Color565) -> ([[u8; 3]; 4], bool) {
    let e0 = c0.to_rgb888();
    let e1 = c1.to_rgb888();
    let mut table = [e0, e1, [0; 3], [0; 3]];

    let four_color = c0.raw() > c1.raw();
    for ch in 0..3 {
        let (a, b) = (e0[ch] as u32, e1[ch] as u32);
        if four_color {
            table[2][ch] = ((2 * a + b + 1) / 3) as u8;
            table[3][ch] = ((a + 2 * b + 1) / 3) as u8;
        } else {
            table[2][ch] = ((a + b + 1) / 2) as u8;
        }
    }
    (table, four_color)
}

fn alpha_ramp(a0: u8, a1: u8) -> [u8; 8] {
    let (a, b) = (a0 as u32, a1 as u32);
    let mut ramp = [a0, a1, 0, 0, 0, 0, 0, 255];
    if a0 > a1 {
        for (i, slot) in ramp.iter_mut().enumerate().skip(2) {
            let i = i as u32;
            *slot = (((8 - i) * a + (i - 1) * b + 3) / 7) as u8;
        }
    } else {
        for (i, slot) in ramp.iter_mut().enumerate().take(6).skip(2) {
            let i = i as u32;
            *slot = (((6 - i) * a + (i - 1) * b + 2) / 5) as u8;
        }
    }
    ramp
}

fn distance_sq(a: [u8; 3], b: [u8; 3]) -> u32 {
    (0..3)
        .map(|ch| {
            let d = a[ch] as i32 - b[ch] as i32;
            (d * d) as u32
        })
        .sum()
}

fn nearest_slot(table: &[[u8; 3]], color: [u8; 3]) -> u32 {
    let mut best = 0;
    let mut best_distance = u32::MAX;
    for (slot, &entry) in table.iter().enumerate() {
        let distance = distance_sq(entry, color);
        if distance < best_distance {
            best = slot;
            best_distance = distance;
        }
    }
    best as u32
}

fn bounding_box<'a>(texels: impl Iterator<Item = &'a [u8; 4]>) -> ([u8; 3], [u8; 3]) {
    let mut max = [0u8; 3];
    let mut min = [255u8; 3];
    let mut any = false;
    for texel in texels {
        any = true;
        for ch in 0..3 {
            max[ch] = max[ch].max(texel[ch]);
            min[ch] = min[ch].min(texel[ch]);
        }
    }
    if any {
        (max, min)
    } else {
        ([0; 3], [0; 3])
    }
}

fn write_color_block(out: &mut Vec<u8>, c0: Color565, c1: Color565, indices: u32) {
    out.extend_from_slice(&c0.raw().to_le_bytes());
    out.extend_from_slice(&c1.raw().to_le_bytes());
    out.extend_from_slice(&indices.to_le_bytes());
}

/// Encodes the color block of one tile.
///
/// With `punch_through`, a tile holding any texel with alpha <= 127 is stored
/// as a three-color block and those texels use the transparent index 3.
/// `reserve_slot3` keeps opaque texels off index 3 of a three-color block.
fn encode_color(
    out: &mut Vec<u8>,
    texels: &[[u8; 4]; TEXELS],
    punch_through: bool,
    reserve_slot3: bool,
) {
    let transparent = punch_through && texels.iter().any(|t| t[3] <= 127);

    if transparent {
        let (max, min) = bounding_box(texels.iter().filter(|t| t[3] > 127));
        let c0 = Color565::from_rgb888(min);
        let c1 = Color565::from_rgb888(max);
        let (table, _) = color_table(c0, c1);
        let mut indices = 0u32;
        for (t, texel) in texels.iter().enumerate() {
            let slot = if texel[3] <= 127 {
                3
            } else {
                nearest_slot(&table[..3], [texel[0], texel[1], texel[2]])
            };
            indices |= slot << (2 * t);
        }
        write_color_block(out, c0, c1, indices);
        return;
    }

    let (max, min) = bounding_box(texels.iter());
    let c0 = Color565::from_rgb888(max);
    let c1 = Color565::from_rgb888(min);
    let (table, four_color) = color_table(c0, c1);
    let candidates = if !four_color && reserve_slot3 { 3 } else { 4 };
    let mut indices = 0u32;
    for (t, texel) in texels.iter().enumerate() {
        let slot = nearest_slot(&table[..candidates], [texel[0], texel[1], texel[2]]);
        indices |= slot << (2 * t);
    }
    write_color_block(out, c0, c1, indices);
}

fn encode_explicit_alpha(out: &mut Vec<u8>, texels: &[[u8; 4]; TEXELS]) {
    let mut block = [0u8; 8];
    for (t, texel) in texels.iter().enumerate() {
        let nibble = ((texel[3] as u32 + 8) / 17) as u8;
        block[t / 2] |= nibble << ((t % 2) * 4);
    }
    out.extend_from_slice(&block);
}

fn encode_interpolated_alpha(out: &mut Vec<u8>, texels: &[[u8; 4]; TEXELS]) {
    let a0 = texels.iter().map(|t| t[3]).max().unwrap_or(0);
    let a1 = texels.iter().map(|t| t[3]).min().unwrap_or(0);
    let ramp = alpha_ramp(a0, a1);

    let mut bits = 0u64;
    for (t, texel) in texels.iter().enumerate() {
        let mut best = 0;
        for (slot, &value) in ramp.iter().enumerate() {
            if value.abs_diff(texel[3]) < ramp[best].abs_diff(texel[3]) {
                best = slot;
            }
        }
        bits |= (best as u64) << (3 * t);
    }
    out.push(a0);
    out.push(a1);
    out.extend_from_slice(&bits.to_le_bytes()[..6]);
}

/// Gathers one tile; texels past the image edge are zero.
fn gather_tile(image: &Image, tile_x: u32, tile_y: u32) -> [[u8; 4]; TEXELS] {
    let mut texels = [[0u8; 4]; TEXELS];
    for (t, texel) in texels.iter_mut().enumerate() {
        let x = tile_x * 4 + (t % 4) as u32;
        let y = tile_y * 4 + (t / 4) as u32;
        if x < image.width && y < image.height {
            *texel = image.pixel(x, y);
        }
    }
    texels
}

/// Compresses an image tile by tile in row-major order.
pub fn encode_blocks(image: &Image, variant: BlockVariant, punch_through: bool) -> Vec<u8> {
    let capacity = compressed_len(image.width, image.height, variant).unwrap_or(0);
    let mut out = Vec::with_capacity(capacity);
    for tile_y in 0..image.height.div_ceil(4) {
        for tile_x in 0..image.width.div_ceil(4) {
            let texels = gather_tile(image, tile_x, tile_y);
            match variant {
                BlockVariant::PunchThrough => encode_color(&mut out, &texels, punch_through, true),
                BlockVariant::ExplicitAlpha => {
                    encode_explicit_alpha(&mut out, &texels);
                    encode_color(&mut out, &texels, false, false);
                }
                BlockVariant::InterpolatedAlpha => {
                    encode_interpolated_alpha(&mut out, &texels);
                    encode_color(&mut out, &texels, false, false);
                }
            }
        }
    }
    out
}

fn decode_alpha(block: &[u8], variant: BlockVariant) -> Option<[u8; TEXELS]> {
    let mut alphas = [0u8; TEXELS];
    match variant {
        BlockVariant::PunchThrough => return None,
        BlockVariant::ExplicitAlpha => {
            for (t, alpha) in alphas.iter_mut().enumerate() {
                *alpha = ((block[t / 2] >> ((t % 2) * 4)) & 0x0F) * 17;
            }
        }
        BlockVariant::InterpolatedAlpha => {
            let ramp = alpha_ramp(block[0], block[1]);
            let mut raw = [0u8; 8];
            raw[..6].copy_from_slice(&block[2..8]);
            let bits = u64::from_le_bytes(raw);
            for (t, alpha) in alphas.iter_mut().enumerate() {
                *alpha = ramp[((bits >> (3 * t)) & 0x07) as usize];
            }
        }
    }
    Some(alphas)
}

/// Decompresses a level of `width` x `height` texels.
pub fn decode_blocks(
    data: &[u8],
    width: u32,
    height: u32,
    variant: BlockVariant,
) -> Result<Image, DataError> {
    let expected = compressed_len(width, height, variant)?;
    let pixel_len = Image::buffer_len(width, height)?;
    if data.len() < expected {
        return Err(DataError::Truncated {
            what: "compressed blocks",
            expected,
            actual: data.len(),
        });
    }

    let mut pixels = vec![0u8; pixel_len];
    let tiles_x = width.div_ceil(4);
    for (tile, block) in data[..expected]
        .chunks_exact(variant.block_size())
        .enumerate()
    {
        let tile_x = tile as u32 % tiles_x;
        let tile_y = tile as u32 / tiles_x;

        let alphas = decode_alpha(block, variant);
        let color = &block[block.len() - COLOR_BLOCK_SIZE..];
        let c0 = Color565::from_raw(u16::from_le_bytes([color[0], color[1]]));
        let c1 = Color565::from_raw(u16::from_le_bytes([color[2], color[3]]));
        let indices = u32::from_le_bytes([color[4], color[5], color[6], color[7]]);
        let (table, four_color) = color_table(c0, c1);

        for t in 0..TEXELS {
            let x = tile_x * 4 + (t % 4) as u32;
            let y = tile_y * 4 + (t / 4) as u32;
            if x >= width || y >= height {
                continue;
            }
            let slot = ((indices >> (2 * t)) & 0x03) as usize;
            let alpha = match alphas {
                Some(alphas) => alphas[t],
                None if !four_color && slot == 3 => 0,
                None => 255,
            };
            let i = (y as usize * width as usize + x as usize) * 4;
            pixels[i..i + 3].copy_from_slice(&table[slot]);
            pixels[i + 3] = alpha;
        }
    }

    Ok(Image {
        width,
        height,
        pixels,
    })
}
