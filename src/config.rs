use std::{fs, path::PathBuf};

use serde::Deserialize;

use crate::psf::{Psf, PsfError};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("kernel length `n` must be at least 1")]
    ZeroKernelLength,
    #[error("`psf_param` must be positive, got {0}")]
    NonPositiveParam(f64),
    #[error("noise variance `var` must be non-negative, got {0}")]
    NegativeVariance(f64),
    #[error("invalid `psf`")]
    Psf(#[from] PsfError),
}
type Result<T> = std::result::Result<T, ConfigError>;

/// Run parameters, read once from a TOML file and validated before any
/// numerical work starts
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path of the image to blur
    pub input_image: PathBuf,
    /// Where to write the blurred image
    pub blurred_image: PathBuf,
    /// Where to write the recovered image
    pub deblurred_image: PathBuf,
    /// PSF code: 0 is Gaussian, 1 is Defocus
    pub psf: u32,
    /// Kernel length
    pub n: usize,
    /// PSF shape parameter (sigma or radius)
    pub psf_param: f64,
    /// Write a side-by-side montage of the three images
    #[serde(default)]
    pub show_images: bool,
    /// Add Gaussian noise to the blurred image
    #[serde(default)]
    pub add_noise: bool,
    /// Noise mean
    #[serde(default)]
    pub mean: f64,
    /// Noise variance
    #[serde(default)]
    pub var: f64,
    /// Load the image as RGB instead of grayscale
    #[serde(default)]
    pub color: bool,
    /// Noise RNG seed, random when unset
    #[serde(default)]
    pub seed: Option<u64>,
}
impl Config {
    /// Load and validate a config file
    pub fn load<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let data = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: Config =
            toml::from_str(&data).map_err(|source| ConfigError::Parse { path, source })?;
        config.validate()?;
        Ok(config)
    }
    fn validate(&self) -> Result<()> {
        if self.n < 1 {
            return Err(ConfigError::ZeroKernelLength);
        }
        if self.psf_param <= 0f64 {
            return Err(ConfigError::NonPositiveParam(self.psf_param));
        }
        if self.var < 0f64 {
            return Err(ConfigError::NegativeVariance(self.var));
        }
        // rejects unknown PSF codes up front
        Psf::from_code(self.psf, self.psf_param)?;
        Ok(())
    }
    /// The configured [Psf]
    pub fn psf(&self) -> Result<Psf> {
        Ok(Psf::from_code(self.psf, self.psf_param)?)
    }
}
