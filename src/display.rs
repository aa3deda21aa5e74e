use std::path::Path;

use image::RgbImage;
use log::info;

use crate::image::{Image, ImageError};

/// Pixel gap between the montage panels
const GAP: u32 = 4;

/// Writes the original, blurred and deblurred images side by side into a
/// single PNG for visual inspection
pub fn montage(
    original: &Image,
    blurred: &Image,
    deblurred: &Image,
    path: &Path,
) -> Result<(), ImageError> {
    let panels = [original.to_rgb8(), blurred.to_rgb8(), deblurred.to_rgb8()];
    let height = panels.iter().map(|p| p.height()).max().unwrap_or(0);
    let width: u32 = panels.iter().map(|p| p.width()).sum::<u32>() + 2 * GAP;

    let mut canvas = RgbImage::new(width, height);
    let mut x0 = 0u32;
    for panel in &panels {
        for (x, y, pixel) in panel.enumerate_pixels() {
            canvas.put_pixel(x0 + x, y, *pixel);
        }
        x0 += panel.width() + GAP;
    }
    canvas.save(path).map_err(|source| ImageError::Save {
        path: path.to_path_buf(),
        source,
    })?;
    info!("montage written to {:?}", path);
    Ok(())
}
