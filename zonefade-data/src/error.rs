//! Error types for splat data loading.

use thiserror::Error;

/// Errors that can occur while reading splat data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PLY parsing error: {0}")]
    Parse(String),

    #[error("Missing '{property}' at vertex {index}")]
    MissingProperty { property: &'static str, index: usize },
}
