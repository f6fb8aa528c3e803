use ffgen::forcefield::params::ForceFieldError;
use ffgen::models::ModelError;
use ffgen::pipeline::PipelineError;
use ffgen::system::SystemError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    System(#[from] SystemError),

    #[error(transparent)]
    ForceField(#[from] ForceFieldError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),
}
