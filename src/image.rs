use std::path::{Path, PathBuf};

use image::{GrayImage, Rgb, RgbImage};
use nalgebra::DMatrix;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("failed to load image {path:?}")]
    Load {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("failed to save image {path:?}")]
    Save {
        path: PathBuf,
        source: image::ImageError,
    },
}
type Result<T> = std::result::Result<T, ImageError>;

fn to_u8(value: f64) -> u8 {
    (value.clamp(0f64, 1f64) * 255f64).round() as u8
}

/// Grayscale or RGB image as height x width matrices of intensities in `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub enum Image {
    Gray(DMatrix<f64>),
    Rgb([DMatrix<f64>; 3]),
}
impl Image {
    /// Load from `path`, converting to grayscale unless `color` is set
    pub fn load<P: AsRef<Path>>(path: P, color: bool) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| ImageError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        if color {
            let rgb = img.into_rgb8();
            let (h, w) = (rgb.height() as usize, rgb.width() as usize);
            let channel = |c: usize| {
                DMatrix::from_fn(h, w, |i, j| {
                    rgb.get_pixel(j as u32, i as u32).0[c] as f64 / 255f64
                })
            };
            Ok(Image::Rgb([channel(0), channel(1), channel(2)]))
        } else {
            let gray = img.into_luma8();
            let (h, w) = (gray.height() as usize, gray.width() as usize);
            Ok(Image::Gray(DMatrix::from_fn(h, w, |i, j| {
                gray.get_pixel(j as u32, i as u32).0[0] as f64 / 255f64
            })))
        }
    }
    /// Save to `path` in the raster format its extension implies,
    /// clamping intensities to `[0, 1]` and rounding to 8 bits
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        match self {
            Image::Gray(m) => GrayImage::from_fn(m.ncols() as u32, m.nrows() as u32, |x, y| {
                image::Luma([to_u8(m[(y as usize, x as usize)])])
            })
            .save(path),
            Image::Rgb(_) => self.to_rgb8().save(path),
        }
        .map_err(|source| ImageError::Save {
            path: path.to_path_buf(),
            source,
        })
    }
    /// Render as an 8-bit RGB buffer (grayscale replicated across channels)
    pub fn to_rgb8(&self) -> RgbImage {
        match self {
            Image::Gray(m) => RgbImage::from_fn(m.ncols() as u32, m.nrows() as u32, |x, y| {
                let v = to_u8(m[(y as usize, x as usize)]);
                Rgb([v, v, v])
            }),
            Image::Rgb([r, g, b]) => {
                RgbImage::from_fn(r.ncols() as u32, r.nrows() as u32, |x, y| {
                    let px = (y as usize, x as usize);
                    Rgb([to_u8(r[px]), to_u8(g[px]), to_u8(b[px])])
                })
            }
        }
    }
    pub fn height(&self) -> usize {
        match self {
            Image::Gray(m) => m.nrows(),
            Image::Rgb([r, ..]) => r.nrows(),
        }
    }
    pub fn width(&self) -> usize {
        match self {
            Image::Gray(m) => m.ncols(),
            Image::Rgb([r, ..]) => r.ncols(),
        }
    }
    pub fn channels(&self) -> &[DMatrix<f64>] {
        match self {
            Image::Gray(m) => std::slice::from_ref(m),
            Image::Rgb(channels) => channels,
        }
    }
    /// Mean squared error against `other`, `None` on shape or mode mismatch
    pub fn mse(&self, other: &Image) -> Option<f64> {
        let (a, b) = (self.channels(), other.channels());
        if a.len() != b.len() || self.height() != other.height() || self.width() != other.width()
        {
            return None;
        }
        let n = (a.len() * self.height() * self.width()) as f64;
        Some(
            a.iter()
                .zip(b)
                .map(|(ca, cb)| (ca - cb).map(|d| d * d).sum())
                .sum::<f64>()
                / n,
        )
    }
}
