//! Hue based background removal.
//!
//! The hue plane is split at its histogram-weighted average, the resulting
//! mask is smoothed and cleaned with morphology, and the foreground pixels
//! are copied onto a white canvas.

use crate::{PixelBuffer, Transform, TransformResult, blur_transform::box_blur};
use derivative::Derivative;
use derive_setters::Setters;
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};

/// Hue values use the 8-bit convention: degrees / 2, so 0..=179.
pub const HUE_RANGE: usize = 180;

/// Value written into the mask for foreground pixels.
pub const MASK_VALUE: u8 = 179;

pub const DILATE_PASSES: usize = 1;
pub const ERODE_PASSES: usize = 3;

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct RemoveBackgroundConfig {
    #[derivative(Default(value = "1"))]
    kernel_size: u32,
}

impl RemoveBackgroundConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transform for RemoveBackgroundConfig {
    fn apply(&self, image: &PixelBuffer) -> TransformResult<PixelBuffer> {
        let source = image.to_rgb();
        if image.is_empty() {
            return Ok(PixelBuffer::Rgb(source));
        }

        let mask = foreground_mask(&source, self.kernel_size)?;

        let mut out = RgbImage::from_pixel(source.width(), source.height(), Rgb([255, 255, 255]));
        for ((dst, src), m) in out.pixels_mut().zip(source.pixels()).zip(mask.pixels()) {
            if m[0] != 0 {
                *dst = *src;
            }
        }

        Ok(PixelBuffer::Rgb(out))
    }
}

/// Non-zero where the pixel belongs to the foreground.
pub fn foreground_mask(image: &RgbImage, kernel_size: u32) -> TransformResult<GrayImage> {
    let hue = hue_plane(image);
    let hist = hue_histogram(&hue);
    let average = average_hue(&hist, image.width(), image.height());
    log::debug!("remove background: average hue {average:.2}");

    let mask = threshold_plane(&hue, average, MASK_VALUE, true);
    let mut mask = box_blur(&mask, kernel_size)?;

    let square = Mask::square(1);
    for _ in 0..DILATE_PASSES {
        mask = grayscale_dilate(&mask, &square);
    }
    for _ in 0..ERODE_PASSES {
        mask = grayscale_erode(&mask, &square);
    }

    Ok(threshold_plane(&mask, average, MASK_VALUE, false))
}

/// Converts one pixel to 8-bit HSV: hue in 0..=179, saturation and value in 0..=255.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let saturation = if max == 0.0 { 0.0 } else { delta * 255.0 / max };

    let mut hue = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };

    if hue < 0.0 {
        hue += 360.0;
    }

    let hue = ((hue / 2.0).round() as usize % HUE_RANGE) as u8;
    [hue, saturation.round() as u8, max as u8]
}

pub fn hue_plane(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y);
        Luma([rgb_to_hsv(p[0], p[1], p[2])[0]])
    })
}

pub fn hue_histogram(hue: &GrayImage) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for p in hue.pixels() {
        hist[p[0] as usize] += 1;
    }
    hist
}

/// `sum(hist[h] * h for h in 0..180) / (width * height)`
pub fn average_hue(hist: &[u64; 256], width: u32, height: u32) -> f64 {
    let area = width as u64 * height as u64;
    if area == 0 {
        return 0.0;
    }

    let weighted: u64 = hist
        .iter()
        .take(HUE_RANGE)
        .enumerate()
        .map(|(h, count)| h as u64 * count)
        .sum();

    weighted as f64 / area as f64
}

/// `src > thresh ? max : 0`, or the opposite when `inverse` is set.
pub fn threshold_plane(image: &GrayImage, thresh: f64, max: u8, inverse: bool) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let above = image.get_pixel(x, y)[0] as f64 > thresh;
        Luma([if above != inverse { max } else { 0 }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_hsv() {
        assert_eq!(rgb_to_hsv(255, 0, 0), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 255, 0), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 0, 255), [120, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 0, 0), [0, 0, 0]);
        assert_eq!(rgb_to_hsv(128, 128, 128), [0, 0, 128]);
        assert_eq!(rgb_to_hsv(255, 0, 255), [150, 255, 255]);
    }

    #[test]
    fn test_average_hue() {
        let mut hist = [0u64; 256];
        hist[0] = 100;
        hist[120] = 100;
        assert_eq!(average_hue(&hist, 20, 10), 60.0);

        // Bins outside the hue range never contribute.
        hist[200] = 50;
        assert_eq!(average_hue(&hist, 20, 10), 60.0);

        assert_eq!(average_hue(&hist, 0, 10), 0.0);
    }

    #[test]
    fn test_threshold_plane() {
        let img = GrayImage::from_fn(3, 1, |x, _| Luma([x as u8 * 10]));

        let bin = threshold_plane(&img, 10.0, 179, false);
        assert_eq!(bin.as_raw(), &vec![0, 0, 179]);

        let inv = threshold_plane(&img, 10.0, 179, true);
        assert_eq!(inv.as_raw(), &vec![179, 179, 0]);
    }

    // A solid colour has a single hue equal to the average, so the inverse
    // threshold marks everything as foreground and the image survives intact.
    #[test]
    fn test_solid_colour_is_all_foreground() {
        let src = RgbImage::from_pixel(12, 9, Rgb([0, 0, 255]));
        let out = RemoveBackgroundConfig::new()
            .with_kernel_size(3)
            .apply(&PixelBuffer::Rgb(src.clone()))
            .unwrap();

        assert_eq!(out, PixelBuffer::Rgb(src));
    }

    // Hue 179 is the top of the range: the final threshold needs a value
    // strictly above the average, so nothing survives.
    #[test]
    fn test_solid_top_hue_is_all_background() {
        assert_eq!(rgb_to_hsv(255, 0, 8)[0], 179);

        let src = RgbImage::from_pixel(12, 9, Rgb([255, 0, 8]));
        let out = RemoveBackgroundConfig::new()
            .with_kernel_size(3)
            .apply(&PixelBuffer::Rgb(src))
            .unwrap();

        let white = RgbImage::from_pixel(12, 9, Rgb([255, 255, 255]));
        assert_eq!(out, PixelBuffer::Rgb(white));
    }

    #[test]
    fn test_empty_image_passes_through() {
        for (w, h) in [(0, 0), (3, 0), (0, 4)] {
            let out = RemoveBackgroundConfig::new()
                .with_kernel_size(3)
                .apply(&PixelBuffer::Rgb(RgbImage::new(w, h)))
                .unwrap();
            assert_eq!(out.dimensions(), (w, h));
        }
    }

    #[test]
    fn test_high_hue_half_becomes_white() {
        let src = RgbImage::from_fn(20, 10, |x, _| {
            if x < 10 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });

        let PixelBuffer::Rgb(out) = RemoveBackgroundConfig::new()
            .apply(&PixelBuffer::Rgb(src))
            .unwrap()
        else {
            panic!("expected a colour image");
        };

        assert_eq!(out.dimensions(), (20, 10));

        // One dilation and three erosions pull the red edge back by two columns.
        assert_eq!(out.get_pixel(4, 5).0, [255, 0, 0]);
        assert_eq!(out.get_pixel(7, 5).0, [255, 0, 0]);
        assert_eq!(out.get_pixel(8, 5).0, [255, 255, 255]);
        assert_eq!(out.get_pixel(15, 5).0, [255, 255, 255]);
    }
}
