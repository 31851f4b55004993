//! In-memory raster images shared by every stage of the pipeline.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};

/// An 8-bit image with either one (gray) or three (RGB) channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelBuffer {
    Gray(GrayImage),
    Rgb(RgbImage),
}

/// Output shape of the red/green/blue channel transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelLayout {
    /// Three channels, the selected plane keeps its data and the others are zero.
    #[default]
    ZeroFilled,

    /// One channel holding only the selected plane.
    SinglePlane,
}

impl PixelBuffer {
    pub fn width(&self) -> u32 {
        match self {
            PixelBuffer::Gray(img) => img.width(),
            PixelBuffer::Rgb(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            PixelBuffer::Gray(img) => img.height(),
            PixelBuffer::Rgb(img) => img.height(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn channel_count(&self) -> u8 {
        match self {
            PixelBuffer::Gray(_) => 1,
            PixelBuffer::Rgb(_) => 3,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Three-channel view of the image. Gray images are replicated into every plane.
    pub fn to_rgb(&self) -> RgbImage {
        match self {
            PixelBuffer::Rgb(img) => img.clone(),
            PixelBuffer::Gray(img) => RgbImage::from_fn(img.width(), img.height(), |x, y| {
                let v = img.get_pixel(x, y)[0];
                Rgb([v, v, v])
            }),
        }
    }

    /// Single-channel luma view of the image.
    pub fn to_gray(&self) -> GrayImage {
        match self {
            PixelBuffer::Gray(img) => img.clone(),
            PixelBuffer::Rgb(img) => rgb_to_gray(img),
        }
    }

    pub fn to_rgba(&self) -> RgbaImage {
        match self {
            PixelBuffer::Gray(img) => RgbaImage::from_fn(img.width(), img.height(), |x, y| {
                let v = img.get_pixel(x, y)[0];
                Rgba([v, v, v, 255])
            }),
            PixelBuffer::Rgb(img) => RgbaImage::from_fn(img.width(), img.height(), |x, y| {
                let p = img.get_pixel(x, y);
                Rgba([p[0], p[1], p[2], 255])
            }),
        }
    }

    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            PixelBuffer::Gray(img) => DynamicImage::ImageLuma8(img),
            PixelBuffer::Rgb(img) => DynamicImage::ImageRgb8(img),
        }
    }
}

impl From<GrayImage> for PixelBuffer {
    fn from(img: GrayImage) -> Self {
        PixelBuffer::Gray(img)
    }
}

impl From<RgbImage> for PixelBuffer {
    fn from(img: RgbImage) -> Self {
        PixelBuffer::Rgb(img)
    }
}

/// Human perception weighting: 0.299*R + 0.587*G + 0.114*B
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
        .round()
        .clamp(0.0, 255.0) as u8
}

pub fn rgb_to_gray(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let p = image.get_pixel(x, y);
        Luma([luma(p[0], p[1], p[2])])
    })
}
