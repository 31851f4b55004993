use crate::{PixelBuffer, Transform, TransformError, TransformResult};
use derivative::Derivative;
use derive_setters::Setters;
use image::{ImageBuffer, Pixel};
use rayon::prelude::*;

/// Normalized box filter with a square `kernel_size x kernel_size` window.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct BlurConfig {
    #[derivative(Default(value = "1"))]
    kernel_size: u32,
}

impl BlurConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kernel_size(&self) -> u32 {
        self.kernel_size
    }
}

impl Transform for BlurConfig {
    fn apply(&self, image: &PixelBuffer) -> TransformResult<PixelBuffer> {
        check_kernel_size(self.kernel_size)?;

        Ok(match image {
            PixelBuffer::Gray(img) => PixelBuffer::Gray(box_blur(img, self.kernel_size)?),
            PixelBuffer::Rgb(img) => PixelBuffer::Rgb(box_blur(img, self.kernel_size)?),
        })
    }
}

pub fn check_kernel_size(kernel_size: u32) -> TransformResult<()> {
    if kernel_size == 0 {
        return Err(TransformError::InvalidParameter(
            "kernel size must be at least 1".to_string(),
        ));
    }

    Ok(())
}

/// Averages every pixel over a `kernel_size` square window anchored at
/// `kernel_size / 2`. Borders are mirrored without repeating the edge pixel
/// (`dcb|abcd|cba`). A window of size 1 returns an identical image.
pub fn box_blur<P>(
    image: &ImageBuffer<P, Vec<u8>>,
    kernel_size: u32,
) -> TransformResult<ImageBuffer<P, Vec<u8>>>
where
    P: Pixel<Subpixel = u8>,
{
    check_kernel_size(kernel_size)?;

    let (width, height) = image.dimensions();
    if kernel_size == 1 || width == 0 || height == 0 {
        return Ok(image.clone());
    }

    let channels = P::CHANNEL_COUNT as usize;
    let (w, h, k) = (width as usize, height as usize, kernel_size as usize);
    let anchor = (k / 2) as isize;
    let row_len = w * channels;
    let src = image.as_raw();

    // Horizontal window sums, kept unnormalized so the final average is exact.
    let mut horizontal = vec![0u32; row_len * h];
    horizontal
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            let src_row = &src[y * row_len..(y + 1) * row_len];
            for x in 0..w {
                for j in 0..k {
                    let sx = reflect_101(x as isize + j as isize - anchor, w);
                    for c in 0..channels {
                        row[x * channels + c] += src_row[sx * channels + c] as u32;
                    }
                }
            }
        });

    let area = (k * k) as u32;
    let mut out = vec![0u8; row_len * h];
    out.par_chunks_mut(row_len).enumerate().for_each(|(y, row)| {
        let mut acc = vec![0u32; row_len];
        for j in 0..k {
            let sy = reflect_101(y as isize + j as isize - anchor, h);
            let sums = &horizontal[sy * row_len..(sy + 1) * row_len];
            for (a, s) in acc.iter_mut().zip(sums) {
                *a += s;
            }
        }

        for (o, a) in row.iter_mut().zip(acc) {
            *o = ((a + area / 2) / area) as u8;
        }
    });

    ImageBuffer::from_raw(width, height, out)
        .ok_or_else(|| TransformError::ImageProc("box blur buffer size mismatch".to_string()))
}

fn reflect_101(mut i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }

    let last = len as isize - 1;
    while i < 0 || i > last {
        if i < 0 {
            i = -i;
        }
        if i > last {
            i = 2 * last - i;
        }
    }

    i as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 40) as u8, (y * 30) as u8, ((x + y) * 10) as u8])
        })
    }

    #[test]
    fn test_reflect_101() {
        assert_eq!(reflect_101(-1, 5), 1);
        assert_eq!(reflect_101(-2, 5), 2);
        assert_eq!(reflect_101(5, 5), 3);
        assert_eq!(reflect_101(6, 5), 2);
        assert_eq!(reflect_101(3, 5), 3);
        assert_eq!(reflect_101(-7, 1), 0);
        assert_eq!(reflect_101(-9, 3), 1);
    }

    #[test]
    fn test_kernel_size_one_is_identity() {
        let img = PixelBuffer::Rgb(gradient(6, 5));
        let out = BlurConfig::new().with_kernel_size(1).apply(&img).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_kernel_size_zero_rejected() {
        let img = PixelBuffer::Rgb(gradient(4, 4));
        let err = BlurConfig::new().with_kernel_size(0).apply(&img);
        assert!(matches!(err, Err(TransformError::InvalidParameter(_))));
    }

    #[test]
    fn test_uniform_image_unchanged() {
        let img = RgbImage::from_pixel(7, 4, Rgb([10, 200, 33]));
        let out = box_blur(&img, 5).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_three_by_three_average() {
        let mut img = GrayImage::new(3, 3);
        img.put_pixel(1, 1, Luma([90]));

        let out = box_blur(&img, 3).unwrap();
        assert_eq!(out.get_pixel(1, 1)[0], 10);

        // Corner (0,0) mirrors to include the centre pixel four times.
        assert_eq!(out.get_pixel(0, 0)[0], 40);
    }

    #[test]
    fn test_preserves_shape() {
        let img = PixelBuffer::Rgb(gradient(9, 4));
        let out = BlurConfig::new().with_kernel_size(4).apply(&img).unwrap();
        assert_eq!(out.dimensions(), (9, 4));
        assert_eq!(out.channel_count(), 3);
    }

    #[test]
    fn test_kernel_larger_than_image() {
        let img = gradient(2, 3);
        let out = box_blur(&img, 11).unwrap();
        assert_eq!(out.dimensions(), (2, 3));
    }
}
