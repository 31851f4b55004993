//! Loading and saving PNG/JPEG files.

use crate::{PixelBuffer, TransformError, TransformResult};
use image::ImageReader;
use std::path::Path;

/// Decodes an image file into a three-channel buffer, whatever its stored layout.
pub fn load(path: impl AsRef<Path>) -> TransformResult<PixelBuffer> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(TransformError::NotFound(path.to_path_buf()));
    }

    let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    log::info!(
        "loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );

    Ok(PixelBuffer::Rgb(image.to_rgb8()))
}

/// Encodes `image` in the format implied by the file extension.
pub fn save(path: impl AsRef<Path>, image: &PixelBuffer) -> TransformResult<()> {
    let path = path.as_ref();

    match image {
        PixelBuffer::Gray(img) => img.save(path)?,
        PixelBuffer::Rgb(img) => img.save(path)?,
    }

    log::info!("saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use tempfile::tempdir;

    #[test]
    fn test_png_round_trip_is_pixel_exact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("round_trip.png");

        let img = PixelBuffer::Rgb(RgbImage::from_fn(13, 7, |x, y| {
            Rgb([(x * 19) as u8, (y * 31) as u8, (x ^ y) as u8])
        }));

        save(&path, &img).unwrap();
        assert_eq!(load(&path).unwrap(), img);
    }

    #[test]
    fn test_gray_png_loads_as_colour() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gray.png");

        let gray = PixelBuffer::Gray(GrayImage::from_pixel(4, 4, Luma([77])));
        save(&path, &gray).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.channel_count(), 3);
        assert_eq!(loaded, PixelBuffer::Rgb(gray.to_rgb()));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let res = load(dir.path().join("nope.png"));
        assert!(matches!(res, Err(TransformError::NotFound(_))));
    }

    #[test]
    fn test_undecodable_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not an image").unwrap();

        assert!(matches!(load(&path), Err(TransformError::Image(_))));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        let img = PixelBuffer::Rgb(RgbImage::new(2, 2));

        assert!(save(&path, &img).is_err());
    }
}
