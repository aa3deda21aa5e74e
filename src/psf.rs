use std::{fmt, ops::Deref};

#[derive(Debug, thiserror::Error)]
pub enum PsfError {
    #[error("PSF code {0} is not recognized, expected 0 (Gaussian) or 1 (Defocus)")]
    UnknownCode(u32),
    #[error("{0} PSF parameter must be positive, got {1}")]
    InvalidParameter(&'static str, f64),
    #[error("kernel length must be at least 1")]
    EmptyKernel,
}
type Result<T> = std::result::Result<T, PsfError>;

/// Normalized 1D point-spread kernel, sums to 1
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel(Vec<f64>);
impl Deref for Kernel {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl Kernel {
    /// `None` when the taps cannot be normalized, i.e. their sum underflows
    /// to zero (degenerate shape parameter) or the window is empty
    fn normalized(mut taps: Vec<f64>) -> Option<Self> {
        let sum: f64 = taps.iter().sum();
        if sum <= 0f64 || !sum.is_finite() {
            return None;
        }
        taps.iter_mut().for_each(|x| *x /= sum);
        Some(Self(taps))
    }
}

/// Point-spread function specification
///
/// The shape parameter is the standard deviation for [Gaussian](Psf::Gaussian)
/// and the disk radius in samples for [Defocus](Psf::Defocus).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Psf {
    Gaussian { sigma: f64 },
    Defocus { radius: f64 },
}
impl Psf {
    /// Get a new `Psf` from its config-file code: 0 is Gaussian, 1 is Defocus
    pub fn from_code(code: u32, param: f64) -> Result<Self> {
        match code {
            0 => Ok(Psf::Gaussian { sigma: param }),
            1 => Ok(Psf::Defocus { radius: param }),
            _ => Err(PsfError::UnknownCode(code)),
        }
    }
    /// Sample the PSF over `n` points into a normalized [Kernel]
    pub fn kernel(&self, n: usize) -> Result<Kernel> {
        if n < 1 {
            return Err(PsfError::EmptyKernel);
        }
        match *self {
            Psf::Gaussian { sigma } => {
                if sigma <= 0f64 {
                    return Err(PsfError::InvalidParameter("Gaussian", sigma));
                }
                let center = (n - 1) as f64 / 2f64;
                let taps = (0..n)
                    .map(|i| {
                        let d = i as f64 - center;
                        (-d * d / (2f64 * sigma * sigma)).exp()
                    })
                    .collect();
                // for even n every tap is off-center and a tiny sigma
                // underflows them all to zero
                Kernel::normalized(taps).ok_or(PsfError::InvalidParameter("Gaussian", sigma))
            }
            Psf::Defocus { radius } => {
                if radius <= 0f64 {
                    return Err(PsfError::InvalidParameter("Defocus", radius));
                }
                let mid = (n / 2) as isize;
                let taps: Vec<f64> = (0..n)
                    .map(|i| {
                        let d = (i as isize - mid) as f64;
                        if d * d <= radius * radius {
                            1f64
                        } else {
                            0f64
                        }
                    })
                    .collect();
                Kernel::normalized(taps).ok_or(PsfError::InvalidParameter("Defocus", radius))
            }
        }
    }
}
impl fmt::Display for Psf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Psf::Gaussian { sigma } => write!(f, "Gaussian (sigma: {})", sigma),
            Psf::Defocus { radius } => write!(f, "Defocus (radius: {})", radius),
        }
    }
}
