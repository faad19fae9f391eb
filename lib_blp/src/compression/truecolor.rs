use crate::error::DataError;
use crate::image::format::Image;

/// Swaps the first and third byte of every pixel (B,G,R,A <-> R,G,B,A).
fn swizzle(pixels: &[u8]) -> Vec<u8> {
    pixels
        .chunks_exact(4)
        .flat_map(|p| [p[2], p[1], p[0], p[3]])
        .collect()
}

pub fn encode_truecolor(image: &Image) -> Vec<u8> {
    swizzle(&image.pixels)
}

pub fn decode_truecolor(data: &[u8], width: u32, height: u32) -> Result<Image, DataError> {
    let expected = Image::buffer_len(width, height)?;
    if data.len() < expected {
        return Err(DataError::Truncated {
            what: "truecolor pixels",
            expected,
            actual: data.len(),
        });
    }
    Ok(Image {
        width,
        height,
        pixels: swizzle(&data[..expected]),
    })
}
