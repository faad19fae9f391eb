use log::debug;

use super::format::Image;
use super::options::ResizeMode;
use crate::error::ValidationError;

/// Smallest power-of-two dimensions that contain the image.
pub fn next_power_of_two_dims(width: u32, height: u32) -> (u32, u32) {
    (width.next_power_of_two(), height.next_power_of_two())
}

/// Resizes or pads `image` to `width` x `height`, both of which must be powers of two.
pub fn resize(
    image: &Image,
    width: u32,
    height: u32,
    mode: ResizeMode,
    fill_color: [u8; 4],
) -> Result<Image, ValidationError> {
    if !width.is_power_of_two() || !height.is_power_of_two() {
        return Err(ValidationError::NonPowerOfTwo { width, height });
    }
    if image.width == 0 || image.height == 0 {
        return Err(ValidationError::InvalidDimensions {
            width: image.width,
            height: image.height,
        });
    }
    debug!(
        "Resizing {}x{} to {}x{} ({:?})",
        image.width, image.height, width, height, mode
    );

    let pixels = match mode {
        ResizeMode::Stretch => stretch(image, width, height),
        ResizeMode::PadOrigin => pad(image, width, height, 0, 0, fill_color),
        ResizeMode::PadCenter => {
            let x = (width as i64 - image.width as i64) / 2;
            let y = (height as i64 - image.height as i64) / 2;
            pad(image, width, height, x, y, fill_color)
        }
    };
    Ok(Image {
        width,
        height,
        pixels,
    })
}

fn stretch(image: &Image, width: u32, height: u32) -> Vec<u8> {
    let (src_width, src_height) = (image.width as usize, image.height as usize);
    let (dst_width, dst_height) = (width as usize, height as usize);
    let x_ratio = if dst_width > 1 {
        (src_width - 1) as f32 / (dst_width - 1) as f32
    } else {
        0.0
    };
    let y_ratio = if dst_height > 1 {
        (src_height - 1) as f32 / (dst_height - 1) as f32
    } else {
        0.0
    };

    let mut output = vec![0u8; dst_width * dst_height * 4];
    for dst_y in 0..dst_height {
        let src_y_f = dst_y as f32 * y_ratio;
        let src_y0 = src_y_f.floor() as usize;
        let src_y1 = (src_y0 + 1).min(src_height - 1);
        let y_frac = src_y_f - src_y0 as f32;

        for dst_x in 0..dst_width {
            let src_x_f = dst_x as f32 * x_ratio;
            let src_x0 = src_x_f.floor() as usize;
            let src_x1 = (src_x0 + 1).min(src_width - 1);
            let x_frac = src_x_f - src_x0 as f32;

            let idx00 = (src_y0 * src_width + src_x0) * 4;
            let idx01 = (src_y0 * src_width + src_x1) * 4;
            let idx10 = (src_y1 * src_width + src_x0) * 4;
            let idx11 = (src_y1 * src_width + src_x1) * 4;
            let dst_idx = (dst_y * dst_width + dst_x) * 4;

            for c in 0..4 {
                let top = image.pixels[idx00 + c] as f32 * (1.0 - x_frac)
                    + image.pixels[idx01 + c] as f32 * x_frac;
                let bottom = image.pixels[idx10 + c] as f32 * (1.0 - x_frac)
                    + image.pixels[idx11 + c] as f32 * x_frac;
                let value = top * (1.0 - y_frac) + bottom * y_frac;
                output[dst_idx + c] = value.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    output
}

/// Copies `image` onto a `width` x `height` canvas of `fill_color` at (`x`, `y`),
/// cropping whatever falls outside.
fn pad(image: &Image, width: u32, height: u32, x: i64, y: i64, fill_color: [u8; 4]) -> Vec<u8> {
    let mut output = fill_color.repeat(width as usize * height as usize);
    for src_y in 0..image.height as i64 {
        let dst_y = src_y + y;
        if dst_y < 0 || dst_y >= height as i64 {
            continue;
        }
        for src_x in 0..image.width as i64 {
            let dst_x = src_x + x;
            if dst_x < 0 || dst_x >= width as i64 {
                continue;
            }
            let src = ((src_y * image.width as i64 + src_x) * 4) as usize;
            let dst = ((dst_y * width as i64 + dst_x) * 4) as usize;
            output[dst..dst + 4].copy_from_slice(&image.pixels[src..src + 4]);
        }
    }
    output
}
