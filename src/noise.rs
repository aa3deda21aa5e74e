use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::image::Image;

#[derive(Debug, thiserror::Error)]
pub enum NoiseError {
    #[error("invalid Gaussian noise distribution (mean: {mean}, variance: {variance})")]
    Distribution { mean: f64, variance: f64 },
}
type Result<T> = std::result::Result<T, NoiseError>;

/// Additive Gaussian noise parameters
#[derive(Debug, Clone, Copy)]
pub struct NoiseParams {
    pub mean: f64,
    pub variance: f64,
}
impl NoiseParams {
    fn distribution(&self) -> Result<Normal<f64>> {
        Normal::new(self.mean, self.variance.sqrt()).map_err(|_| NoiseError::Distribution {
            mean: self.mean,
            variance: self.variance,
        })
    }
}

/// Returns a copy of `matrix` with i.i.d. Gaussian noise added to every
/// element; the input is left untouched
pub fn gaussian_noise<R: Rng>(
    matrix: &DMatrix<f64>,
    params: NoiseParams,
    rng: &mut R,
) -> Result<DMatrix<f64>> {
    let normal = params.distribution()?;
    Ok(matrix.map(|x| x + normal.sample(rng)))
}

/// [gaussian_noise] applied to every channel of an [Image]
pub fn perturb<R: Rng>(image: &Image, params: NoiseParams, rng: &mut R) -> Result<Image> {
    match image {
        Image::Gray(m) => Ok(Image::Gray(gaussian_noise(m, params, rng)?)),
        Image::Rgb([r, g, b]) => Ok(Image::Rgb([
            gaussian_noise(r, params, rng)?,
            gaussian_noise(g, params, rng)?,
            gaussian_noise(b, params, rng)?,
        ])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn input_is_not_mutated() {
        let mut rng = StdRng::seed_from_u64(1);
        let matrix = DMatrix::from_element(8, 8, 0.5);
        let before = matrix.clone();
        let noisy = gaussian_noise(
            &matrix,
            NoiseParams {
                mean: 0f64,
                variance: 0.01,
            },
            &mut rng,
        )
        .unwrap();
        assert_eq!(matrix, before);
        assert_ne!(noisy, before);
    }

    #[test]
    fn sample_statistics_match_parameters() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 200usize;
        let params = NoiseParams {
            mean: 0.2,
            variance: 0.04,
        };
        let noisy = gaussian_noise(&DMatrix::zeros(n, n), params, &mut rng).unwrap();
        let mean = noisy.mean();
        let var = noisy.map(|x| (x - mean) * (x - mean)).mean();
        assert!((mean - params.mean).abs() < 0.01);
        assert!((var - params.variance).abs() / params.variance < 0.1);
    }

    #[test]
    fn zero_variance_adds_the_mean() {
        let mut rng = StdRng::seed_from_u64(7);
        let noisy = gaussian_noise(
            &DMatrix::from_element(2, 2, 1f64),
            NoiseParams {
                mean: 0.25,
                variance: 0f64,
            },
            &mut rng,
        )
        .unwrap();
        assert_eq!(noisy, DMatrix::from_element(2, 2, 1.25));
    }

    #[test]
    fn negative_variance_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(gaussian_noise(
            &DMatrix::zeros(2, 2),
            NoiseParams {
                mean: 0f64,
                variance: -1f64,
            },
            &mut rng,
        )
        .is_err());
    }
}
