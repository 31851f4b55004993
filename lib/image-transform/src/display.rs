use crate::{PixelBuffer, TransformError, TransformResult};
use derivative::Derivative;
use derive_setters::Setters;
use fast_image_resize::{PixelType, ResizeAlg, ResizeOptions, Resizer, images::Image as FrImage};
use image::RgbaImage;

/// Limits applied when turning a buffer into an on-screen bitmap.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct DisplayConfig {
    #[derivative(Default(value = "700"))]
    max_height: u32,

    // Breathing room left under the cap once an image is scaled down.
    #[derivative(Default(value = "10"))]
    margin: u32,
}

impl DisplayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size the image is shown at, aspect ratio preserved.
    pub fn fit(&self, width: u32, height: u32) -> (u32, u32) {
        if height <= self.max_height || height == 0 {
            return (width, height);
        }

        let target_height = self.max_height.saturating_sub(self.margin).max(1);
        let target_width =
            ((width as f64 * target_height as f64 / height as f64).round() as u32).max(1);
        (target_width, target_height)
    }
}

/// RGBA bitmap ready to hand to the UI toolkit.
pub fn render(image: &PixelBuffer, config: &DisplayConfig) -> TransformResult<RgbaImage> {
    let rgba = image.to_rgba();
    let (width, height) = rgba.dimensions();
    let (target_width, target_height) = config.fit(width, height);

    if (target_width, target_height) == (width, height) {
        return Ok(rgba);
    }

    log::debug!("display resize {width}x{height} -> {target_width}x{target_height}");

    let src_image = FrImage::from_vec_u8(width, height, rgba.into_raw(), PixelType::U8x4)?;
    let mut dst_image = FrImage::new(target_width, target_height, PixelType::U8x4);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(
        fast_image_resize::FilterType::Lanczos3,
    ));
    Resizer::new().resize(&src_image, &mut dst_image, &options)?;

    RgbaImage::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| TransformError::ImageProc("to RgbaImage failed".to_string()))
}
