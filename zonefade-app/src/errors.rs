//! Error types for the headless runner.

use thiserror::Error;
use zonefade_core::ConfigError;

/// Errors that stop the runner before or during startup.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Scene configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scene defines no zones")]
    EmptyScene,

    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(f32),
}
