use std::ops::Deref;

use nalgebra::DMatrix;

use crate::psf::Kernel;

#[derive(Debug, thiserror::Error)]
pub enum OperatorError {
    #[error("kernel of length {kernel} does not fit a {dimension}x{dimension} operator")]
    DimensionMismatch { kernel: usize, dimension: usize },
}
type Result<T> = std::result::Result<T, OperatorError>;

/// Banded convolution-as-matrix blur operator
///
/// Row `i` holds the kernel centered at column `i`; taps falling outside
/// `[0, dimension)` are dropped and the row is not renormalized, so edge
/// rows sum to less than 1 (zero-padding boundary policy).
#[derive(Debug, Clone)]
pub struct BlurOperator(DMatrix<f64>);
impl Deref for BlurOperator {
    type Target = DMatrix<f64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl BlurOperator {
    /// Build the `dimension x dimension` operator from a normalized [Kernel]
    pub fn new(kernel: &Kernel, dimension: usize) -> Result<Self> {
        if dimension < 1 || kernel.len() > dimension {
            return Err(OperatorError::DimensionMismatch {
                kernel: kernel.len(),
                dimension,
            });
        }
        let mid = (kernel.len() / 2) as isize;
        let mut mat = DMatrix::<f64>::zeros(dimension, dimension);
        for i in 0..dimension {
            for (j, &tap) in kernel.iter().enumerate() {
                let col = i as isize + j as isize - mid;
                if (0..dimension as isize).contains(&col) {
                    mat[(i, col as usize)] = tap;
                }
            }
        }
        Ok(Self(mat))
    }
    pub fn dimension(&self) -> usize {
        self.0.nrows()
    }
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.0
    }
    /// Ratio of the extreme singular values, infinite for a singular operator
    pub fn condition_number(&self) -> f64 {
        let sv = self.0.singular_values();
        let s_max = sv.max();
        let s_min = sv.min();
        if s_min > 0f64 {
            s_max / s_min
        } else {
            f64::INFINITY
        }
    }
}
