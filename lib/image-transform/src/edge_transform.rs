use crate::{
    PixelBuffer, Transform, TransformError, TransformResult, blur_transform::box_blur,
};
use derivative::Derivative;
use derive_setters::Setters;
use image::{Rgb, RgbImage};

/// Ratio between the high and the low hysteresis threshold.
pub const CANNY_THRESHOLD_RATIO: f32 = 3.0;

/// Canny edge detection that keeps the original colours on edge pixels.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct CannyConfig {
    #[derivative(Default(value = "1"))]
    kernel_size: u32,

    #[derivative(Default(value = "1"))]
    threshold: u32,
}

impl CannyConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transform for CannyConfig {
    fn apply(&self, image: &PixelBuffer) -> TransformResult<PixelBuffer> {
        if self.threshold == 0 {
            return Err(TransformError::InvalidParameter(
                "edge detection threshold must be at least 1".to_string(),
            ));
        }

        if image.is_empty() {
            return Ok(PixelBuffer::Rgb(image.to_rgb()));
        }

        let edges = detect_edges(image, self.kernel_size, self.threshold)?;
        let source = image.to_rgb();

        let mut out = RgbImage::new(source.width(), source.height());
        for ((dst, src), edge) in out.pixels_mut().zip(source.pixels()).zip(edges.pixels()) {
            if edge[0] != 0 {
                *dst = *src;
            } else {
                *dst = Rgb([0, 0, 0]);
            }
        }

        Ok(PixelBuffer::Rgb(out))
    }
}

/// Binary edge map (255 on edges) of the blurred grayscale image.
pub fn detect_edges(
    image: &PixelBuffer,
    kernel_size: u32,
    threshold: u32,
) -> TransformResult<image::GrayImage> {
    let gray = box_blur(&image.to_gray(), kernel_size)?;
    let low = threshold as f32;
    let high = low * CANNY_THRESHOLD_RATIO;

    log::debug!("canny: kernel={kernel_size} low={low} high={high}");
    Ok(imageproc::edges::canny(&gray, low, high))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_on_blue() -> RgbImage {
        RgbImage::from_fn(40, 40, |x, y| {
            if (10..30).contains(&x) && (10..30).contains(&y) {
                Rgb([200, 120, 40])
            } else {
                Rgb([30, 60, 90])
            }
        })
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let img = PixelBuffer::Rgb(square_on_blue());
        let res = CannyConfig::new().with_threshold(0).apply(&img);
        assert!(matches!(res, Err(TransformError::InvalidParameter(_))));
    }

    #[test]
    fn test_edges_keep_original_colour() {
        let img = PixelBuffer::Rgb(square_on_blue());
        let out = CannyConfig::new()
            .with_kernel_size(3)
            .with_threshold(20)
            .apply(&img)
            .unwrap();

        let PixelBuffer::Rgb(out) = out else {
            panic!("expected a colour image");
        };

        assert_eq!(out.dimensions(), (40, 40));

        let edge_pixels = out.pixels().filter(|p| p.0 != [0, 0, 0]).count();
        assert!(edge_pixels > 0);

        // Every surviving pixel is an original pixel, never a synthesized colour.
        let src = square_on_blue();
        for (x, y, p) in out.enumerate_pixels() {
            if p.0 != [0, 0, 0] {
                assert_eq!(p, src.get_pixel(x, y));
            }
        }

        // The interior of the square and the far background carry no edges.
        assert_eq!(out.get_pixel(20, 20).0, [0, 0, 0]);
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_hysteresis_ratio_is_one_to_three() {
        let img = PixelBuffer::Rgb(square_on_blue());
        let blurred = box_blur(&img.to_gray(), 3).unwrap();

        let edges = detect_edges(&img, 3, 12).unwrap();
        assert_eq!(edges, imageproc::edges::canny(&blurred, 12.0, 36.0));
    }

    #[test]
    fn test_empty_image_passes_through() {
        for (w, h) in [(0, 0), (3, 0), (0, 4)] {
            let img = PixelBuffer::Rgb(RgbImage::new(w, h));
            let out = CannyConfig::new()
                .with_kernel_size(3)
                .with_threshold(10)
                .apply(&img)
                .unwrap();
            assert_eq!(out.dimensions(), (w, h));
        }
    }

    #[test]
    fn test_flat_image_has_no_edges() {
        let img = PixelBuffer::Rgb(RgbImage::from_pixel(16, 16, Rgb([90, 90, 90])));
        let edges = detect_edges(&img, 1, 10).unwrap();
        assert!(edges.pixels().all(|p| p[0] == 0));
    }
}
