#![allow(dead_code)]

use lib_blp::Image;

/// Opaque image whose colors vary along both axes.
pub fn gradient(width: u32, height: u32) -> Image {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            pixels.extend_from_slice(&[
                (x * 255 / (width - 1).max(1)) as u8,
                (y * 255 / (height - 1).max(1)) as u8,
                ((x + y) * 7 % 256) as u8,
                255,
            ]);
        }
    }
    Image::new(width, height, pixels).unwrap()
}

/// Checkerboard of opaque color and fully transparent texels.
pub fn binary_alpha(width: u32, height: u32) -> Image {
    let mut image = gradient(width, height);
    for (i, pixel) in image.pixels.chunks_exact_mut(4).enumerate() {
        let (x, y) = (i as u32 % width, i as u32 / width);
        pixel[3] = if (x + y) % 2 == 0 { 255 } else { 0 };
    }
    image
}

/// Every alpha value from 0 to 255 repeated across the image.
pub fn translucent(width: u32, height: u32) -> Image {
    let mut image = gradient(width, height);
    for (i, pixel) in image.pixels.chunks_exact_mut(4).enumerate() {
        pixel[3] = (i % 256) as u8;
    }
    image
}

/// Deterministic pseudo-random image with up to 4096 distinct colors.
pub fn noisy(width: u32, height: u32) -> Image {
    let mut state = 0x2545_F491u32;
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let [r, g, b, a] = state.to_le_bytes();
        pixels.extend_from_slice(&[r & 0xF0, g & 0xF0, b & 0xF0, a]);
    }
    Image::new(width, height, pixels).unwrap()
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
