/// Runs every transform over a generated test image
/// Results are written to tmp/

use image::{Rgb, RgbImage};
use image_transform::{PixelBuffer, TransformKind, TransformParameters, source};
use std::path::Path;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let output_dir = Path::new("tmp");
    std::fs::create_dir_all(output_dir)?;

    // Colourful gradient with a red disc in the middle
    let img = RgbImage::from_fn(320, 240, |x, y| {
        let (dx, dy) = (x as i32 - 160, y as i32 - 120);
        if dx * dx + dy * dy < 50 * 50 {
            Rgb([220, 30, 30])
        } else {
            Rgb([(x * 255 / 320) as u8, (y * 255 / 240) as u8, 160])
        }
    });
    let img = PixelBuffer::Rgb(img);

    let template = image::imageops::crop_imm(&img.to_rgb(), 100, 60, 40, 30).to_image();
    let template = PixelBuffer::Rgb(template);
    let params = TransformParameters::new()
        .with_kernel_size(5)
        .with_threshold(20);

    for kind in TransformKind::all() {
        let out = image_transform::apply(&img, *kind, &params, Some(&template))?;
        let filename = format!("{}.png", kind.key());
        source::save(output_dir.join(&filename), &out)?;
        println!("✓ Generated {}", filename);
    }

    println!("\n✓ All transforms applied successfully!");
    println!("  Images saved to: tmp/");

    Ok(())
}
