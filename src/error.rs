use crate::{
    config::ConfigError, engine::EngineError, image::ImageError, noise::NoiseError,
    operator::OperatorError, psf::PsfError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `config` module")]
    Config(#[from] ConfigError),
    #[error("Error in the `psf` module")]
    Psf(#[from] PsfError),
    #[error("Error in the `operator` module")]
    Operator(#[from] OperatorError),
    #[error("Error in the `noise` module")]
    Noise(#[from] NoiseError),
    #[error("Error in the `engine` module")]
    Engine(#[from] EngineError),
    #[error("Error in the `image` module")]
    Image(#[from] ImageError),
}
