use std::fmt;

use log::warn;
use nalgebra::DMatrix;

use crate::{image::Image, operator::BlurOperator};

/// Singular values below `s_max * SV_CUTOFF` are treated as zero by the
/// least-squares solve; small enough to leave noise amplification on
/// ill-conditioned operators fully visible
const SV_CUTOFF: f64 = 1e-12;
/// Condition number above which a diagnostic is logged before solving
const COND_WARN: f64 = 1e12;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(
        "{height}x{width} image does not match {rows}x{cols} row/column operators"
    )]
    DimensionMismatch {
        height: usize,
        width: usize,
        rows: usize,
        cols: usize,
    },
    #[error("blur operator along the {0} axis is singular, deconvolution is not meaningful")]
    SingularOperator(Axis),
}
type Result<T> = std::result::Result<T, EngineError>;

/// Image axis a blur operator applies to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Axis {
    Row,
    Column,
}
impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
        }
    }
}

fn check_dimensions(image: &Image, row_op: &BlurOperator, col_op: &BlurOperator) -> Result<()> {
    // every channel is checked: an RGB image built by hand may carry
    // channels of different shapes
    for channel in image.channels() {
        if channel.nrows() != row_op.dimension() || channel.ncols() != col_op.dimension() {
            return Err(EngineError::DimensionMismatch {
                height: channel.nrows(),
                width: channel.ncols(),
                rows: row_op.dimension(),
                cols: col_op.dimension(),
            });
        }
    }
    Ok(())
}

fn clamp(matrix: DMatrix<f64>) -> DMatrix<f64> {
    matrix.map(|x| x.clamp(0f64, 1f64))
}

fn per_channel<F>(image: &Image, mut f: F) -> Result<Image>
where
    F: FnMut(&DMatrix<f64>) -> Result<DMatrix<f64>>,
{
    match image {
        Image::Gray(m) => Ok(Image::Gray(f(m)?)),
        Image::Rgb([r, g, b]) => Ok(Image::Rgb([f(r)?, f(g)?, f(b)?])),
    }
}

/// Applies the separable blur `R * X * C^T` to each channel of `image`,
/// clamping the result to `[0, 1]`
pub fn blur(image: &Image, row_op: &BlurOperator, col_op: &BlurOperator) -> Result<Image> {
    check_dimensions(image, row_op, col_op)?;
    per_channel(image, |channel| {
        Ok(clamp(row_op.matrix() * channel * col_op.matrix().transpose()))
    })
}

/// Least-squares solve of `op * X = rhs` through the operator SVD
fn solve(op: &BlurOperator, rhs: &DMatrix<f64>, axis: Axis) -> Result<DMatrix<f64>> {
    let svd = op.matrix().clone().svd(true, true);
    let s_max = svd.singular_values.max();
    let s_min = svd.singular_values.min();
    if s_min <= 0f64 || s_max / s_min > COND_WARN {
        warn!(
            "{} operator condition number {:.3e}, expect noise amplification in the recovery",
            axis,
            if s_min > 0f64 {
                s_max / s_min
            } else {
                f64::INFINITY
            }
        );
    }
    svd.solve(rhs, s_max * SV_CUTOFF)
        .map_err(|_| EngineError::SingularOperator(axis))
}

/// Recovers an approximation of the original image from `blurred` by
/// inverting the row and column operators with least-squares solves
/// (`R^-1 * B * (C^-1)^T` when both are well conditioned); the result is
/// clamped to `[0, 1]`
pub fn deblur(blurred: &Image, row_op: &BlurOperator, col_op: &BlurOperator) -> Result<Image> {
    check_dimensions(blurred, row_op, col_op)?;
    per_channel(blurred, |channel| {
        // R * Y = B, then C * X^T = Y^T
        let y = solve(row_op, channel, Axis::Row)?;
        let x = solve(col_op, &y.transpose(), Axis::Column)?;
        Ok(clamp(x.transpose()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        noise::{gaussian_noise, NoiseParams},
        psf::Psf,
    };
    use rand::{rngs::StdRng, SeedableRng};

    fn operators(psf: Psf, n: usize, height: usize, width: usize) -> (BlurOperator, BlurOperator) {
        let kernel = psf.kernel(n).unwrap();
        (
            BlurOperator::new(&kernel, height).unwrap(),
            BlurOperator::new(&kernel, width).unwrap(),
        )
    }

    fn ramp(height: usize, width: usize) -> Image {
        Image::Gray(DMatrix::from_fn(height, width, |i, j| {
            (i * width + j) as f64 / (height * width) as f64
        }))
    }

    #[test]
    fn identity_operators_round_trip_exactly() {
        let (row_op, col_op) = operators(Psf::Gaussian { sigma: 1f64 }, 1, 8, 8);
        let image = ramp(8, 8);
        assert_eq!(blur(&image, &row_op, &col_op).unwrap(), image);
    }

    #[test]
    fn constant_image_is_invariant_in_the_interior() {
        let value = 100f64 / 255f64;
        let image = Image::Gray(DMatrix::from_element(8, 8, value));
        let (row_op, col_op) = operators(Psf::Gaussian { sigma: 1f64 }, 5, 8, 8);
        let blurred = blur(&image, &row_op, &col_op).unwrap();
        match &blurred {
            Image::Gray(m) => {
                for i in 2..6 {
                    for j in 2..6 {
                        assert!((m[(i, j)] - value).abs() < 1e-9);
                    }
                }
                // zero-padding darkens the corners
                assert!(m[(0, 0)] < value);
            }
            _ => unreachable!(),
        }
        let deblurred = deblur(&blurred, &row_op, &col_op).unwrap();
        assert!(image.mse(&deblurred).unwrap() < 1e-12);
    }

    #[test]
    fn noiseless_round_trip_recovers_the_image() {
        let image = ramp(12, 9);
        let (row_op, col_op) = operators(Psf::Gaussian { sigma: 1f64 }, 5, 12, 9);
        let blurred = blur(&image, &row_op, &col_op).unwrap();
        let deblurred = deblur(&blurred, &row_op, &col_op).unwrap();
        assert!(image.mse(&deblurred).unwrap() < 1e-10);
    }

    #[test]
    fn color_channels_are_blurred_independently() {
        let r = DMatrix::from_element(6, 6, 0.9);
        let g = DMatrix::from_element(6, 6, 0.5);
        let b = DMatrix::from_element(6, 6, 0.1);
        let image = Image::Rgb([r, g, b]);
        let (row_op, col_op) = operators(Psf::Defocus { radius: 1f64 }, 3, 6, 6);
        match blur(&image, &row_op, &col_op).unwrap() {
            Image::Rgb([r, g, b]) => {
                assert!((r[(3, 3)] - 0.9).abs() < 1e-9);
                assert!((g[(3, 3)] - 0.5).abs() < 1e-9);
                assert!((b[(3, 3)] - 0.1).abs() < 1e-9);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let (row_op, col_op) = operators(Psf::Gaussian { sigma: 1f64 }, 3, 8, 8);
        let image = ramp(7, 8);
        assert!(matches!(
            blur(&image, &row_op, &col_op),
            Err(EngineError::DimensionMismatch { height: 7, .. })
        ));
        assert!(deblur(&image, &row_op, &col_op).is_err());
    }

    #[test]
    fn ragged_color_channels_are_a_dimension_mismatch() {
        // height()/width() only see the first channel; the undersized blue
        // channel must still be caught instead of panicking in the multiply
        let image = Image::Rgb([
            DMatrix::from_element(6, 6, 0.5),
            DMatrix::from_element(6, 6, 0.5),
            DMatrix::from_element(6, 5, 0.5),
        ]);
        let (row_op, col_op) = operators(Psf::Gaussian { sigma: 1f64 }, 3, 6, 6);
        assert!(matches!(
            blur(&image, &row_op, &col_op),
            Err(EngineError::DimensionMismatch {
                height: 6,
                width: 5,
                ..
            })
        ));
        assert!(matches!(
            deblur(&image, &row_op, &col_op),
            Err(EngineError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn noise_does_not_improve_reconstruction() {
        let image = ramp(10, 10);
        let (row_op, col_op) = operators(Psf::Defocus { radius: 1f64 }, 3, 10, 10);
        let blurred = blur(&image, &row_op, &col_op).unwrap();

        let mse = |variance: f64, seed: u64| {
            let noisy = match &blurred {
                Image::Gray(m) => {
                    let mut rng = StdRng::seed_from_u64(seed);
                    Image::Gray(
                        gaussian_noise(m, NoiseParams { mean: 0f64, variance }, &mut rng).unwrap(),
                    )
                }
                _ => unreachable!(),
            };
            image.mse(&deblur(&noisy, &row_op, &col_op).unwrap()).unwrap()
        };

        let clean = mse(0f64, 11);
        let low = mse(1e-4, 11);
        let high = mse(1e-2, 11);
        assert!(low > clean);
        assert!(high > low);
    }
}
