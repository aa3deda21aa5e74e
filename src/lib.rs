/*!
# Optical blur simulation and deconvolution

This library simulates optical blur with a point-spread function (PSF),
optionally corrupts the blurred image with Gaussian noise, and recovers an
approximation of the original image by inverting the blur operator with
SVD least-squares solves.

## Key components

- [`Psf`] - Gaussian or Defocus PSF specification sampled into a normalized [`Kernel`]
- [`BlurOperator`] - banded convolution-as-matrix operator built from a kernel
- [`Image`] - grayscale or RGB image with intensities in `[0, 1]`
- [`engine`] - the blurring and deblurring engines
- [`Config`] - typed run configuration read from a TOML file

## Usage

```no_run
use deblur::{engine, BlurOperator, Image, Psf};

# fn main() -> anyhow::Result<()> {
let image = Image::load("input.png", false)?;
let kernel = Psf::Gaussian { sigma: 1.0 }.kernel(5)?;
let row_op = BlurOperator::new(&kernel, image.height())?;
let col_op = BlurOperator::new(&kernel, image.width())?;

let blurred = engine::blur(&image, &row_op, &col_op)?;
let deblurred = engine::deblur(&blurred, &row_op, &col_op)?;
deblurred.save("deblurred.png")?;
# Ok(())
# }
```

The solves are pure least-squares with no added regularization: the wider
the PSF and the stronger the noise, the worse the recovery, which is the
behavior the tool is meant to demonstrate.
*/

pub mod config;
pub mod display;
pub mod engine;
mod error;
pub mod image;
pub mod noise;
pub mod operator;
pub mod psf;

pub use config::Config;
pub use error::Error;
pub use image::Image;
pub use noise::NoiseParams;
pub use operator::BlurOperator;
pub use psf::{Kernel, Psf};
