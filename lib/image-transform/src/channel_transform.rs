//! Channel extraction and grayscale conversion.
//!
//! Both transforms smooth the source with the box blur first.

use crate::{
    ChannelLayout, PixelBuffer, Transform, TransformResult, blur_transform::box_blur,
    pixel_buffer::rgb_to_gray,
};
use derivative::Derivative;
use derive_setters::Setters;
use image::{GrayImage, Luma, Rgb, RgbImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
}

impl ColorChannel {
    pub fn index(&self) -> usize {
        match self {
            ColorChannel::Red => 0,
            ColorChannel::Green => 1,
            ColorChannel::Blue => 2,
        }
    }
}

#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ChannelConfig {
    #[derivative(Default(value = "ColorChannel::Red"))]
    channel: ColorChannel,

    #[derivative(Default(value = "1"))]
    kernel_size: u32,

    layout: ChannelLayout,
}

impl ChannelConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transform for ChannelConfig {
    fn apply(&self, image: &PixelBuffer) -> TransformResult<PixelBuffer> {
        let blurred = box_blur(&image.to_rgb(), self.kernel_size)?;
        let index = self.channel.index();

        Ok(match self.layout {
            ChannelLayout::ZeroFilled => {
                let mut out = RgbImage::new(blurred.width(), blurred.height());
                for (dst, src) in out.pixels_mut().zip(blurred.pixels()) {
                    let mut planes = [0u8; 3];
                    planes[index] = src[index];
                    *dst = Rgb(planes);
                }
                PixelBuffer::Rgb(out)
            }
            ChannelLayout::SinglePlane => {
                PixelBuffer::Gray(GrayImage::from_fn(blurred.width(), blurred.height(), |x, y| {
                    Luma([blurred.get_pixel(x, y)[index]])
                }))
            }
        })
    }
}

/// Blur followed by a luma conversion to a single channel.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GrayConfig {
    #[derivative(Default(value = "1"))]
    kernel_size: u32,
}

impl GrayConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transform for GrayConfig {
    fn apply(&self, image: &PixelBuffer) -> TransformResult<PixelBuffer> {
        Ok(match image {
            PixelBuffer::Gray(img) => PixelBuffer::Gray(box_blur(img, self.kernel_size)?),
            PixelBuffer::Rgb(img) => {
                PixelBuffer::Gray(rgb_to_gray(&box_blur(img, self.kernel_size)?))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RgbImage {
        RgbImage::from_fn(8, 6, |x, y| {
            Rgb([(x * 30) as u8, (y * 40) as u8, (255 - x * 20) as u8])
        })
    }

    #[test]
    fn test_zero_filled_keeps_single_plane() {
        let src = PixelBuffer::Rgb(sample());
        let blurred = box_blur(&sample(), 3).unwrap();

        for channel in [ColorChannel::Red, ColorChannel::Green, ColorChannel::Blue] {
            let out = ChannelConfig::new()
                .with_channel(channel)
                .with_kernel_size(3)
                .apply(&src)
                .unwrap();

            let PixelBuffer::Rgb(out) = out else {
                panic!("expected a three-channel image");
            };

            assert_eq!(out.dimensions(), (8, 6));
            for (p, b) in out.pixels().zip(blurred.pixels()) {
                for plane in 0..3 {
                    if plane == channel.index() {
                        assert_eq!(p[plane], b[plane]);
                    } else {
                        assert_eq!(p[plane], 0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_single_plane_layout() {
        let src = PixelBuffer::Rgb(sample());
        let out = ChannelConfig::new()
            .with_channel(ColorChannel::Green)
            .with_layout(ChannelLayout::SinglePlane)
            .apply(&src)
            .unwrap();

        let PixelBuffer::Gray(out) = out else {
            panic!("expected a single-channel image");
        };

        assert_eq!(out.get_pixel(2, 3)[0], sample().get_pixel(2, 3)[1]);
    }

    #[test]
    fn test_gray_is_single_channel() {
        let src = PixelBuffer::Rgb(sample());
        let out = GrayConfig::new().with_kernel_size(5).apply(&src).unwrap();

        assert_eq!(out.channel_count(), 1);
        assert_eq!(out.dimensions(), src.dimensions());
    }

    #[test]
    fn test_gray_without_blur_matches_luma() {
        let src = PixelBuffer::Rgb(RgbImage::from_pixel(2, 2, Rgb([255, 0, 0])));
        let out = GrayConfig::new().apply(&src).unwrap();
        assert_eq!(out, PixelBuffer::Gray(GrayImage::from_pixel(2, 2, Luma([76]))));
    }
}
