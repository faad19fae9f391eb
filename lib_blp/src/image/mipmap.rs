use super::format::{Image, MAX_MIPS};

/// Halves an image (floor, minimum 1) by averaging 2x2 groups of texels.
/// Groups that run past the source edge average only the texels that exist.
pub fn downsample(image: &Image) -> Image {
    let width = (image.width / 2).max(1);
    let height = (image.height / 2).max(1);
    let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);

    for y in 0..height {
        for x in 0..width {
            let mut sum = [0u32; 4];
            let mut count = 0u32;
            for (sx, sy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                let src_x = x * 2 + sx;
                let src_y = y * 2 + sy;
                if src_x >= image.width || src_y >= image.height {
                    continue;
                }
                let pixel = image.pixel(src_x, src_y);
                for c in 0..4 {
                    sum[c] += pixel[c] as u32;
                }
                count += 1;
            }
            pixels.extend(sum.iter().map(|&s| ((s + count / 2) / count) as u8));
        }
    }

    Image {
        width,
        height,
        pixels,
    }
}

/// Full chain starting with `base`, halving until both dimensions are 1.
pub fn generate_chain(base: Image) -> Vec<Image> {
    let mut chain = vec![base];
    while chain.len() < MAX_MIPS {
        let last = &chain[chain.len() - 1];
        if last.width == 1 && last.height == 1 {
            break;
        }
        let next = downsample(last);
        chain.push(next);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downsample_box_filter() {
        let image = Image::new(
            2,
            2,
            vec![
                0, 0, 0, 255, 10, 20, 30, 255, //
                20, 40, 60, 0, 30, 60, 90, 0,
            ],
        )
        .unwrap();
        let half = downsample(&image);
        assert_eq!((half.width, half.height), (1, 1));
        assert_eq!(half.pixels, vec![15, 30, 45, 128]);
    }

    #[test]
    fn test_downsample_single_row() {
        let image = Image::new(4, 1, vec![0, 0, 0, 0, 100, 100, 100, 100, 7, 7, 7, 7, 9, 9, 9, 9])
            .unwrap();
        let half = downsample(&image);
        assert_eq!((half.width, half.height), (2, 1));
        assert_eq!(half.pixels, vec![50, 50, 50, 50, 8, 8, 8, 8]);
    }

    #[test]
    fn test_chain_dimensions() {
        let chain = generate_chain(Image::filled(8, 2, [1, 2, 3, 4]));
        let dims: Vec<_> = chain.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(dims, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
        assert!(chain.iter().all(|l| l.pixel(0, 0) == [1, 2, 3, 4]));
    }

    #[test]
    fn test_chain_is_capped_at_slot_count() {
        let chain = generate_chain(Image::filled(1 << 16, 1, [0; 4]));
        assert_eq!(chain.len(), MAX_MIPS);
    }
}
