//! Error types for zone configuration and loading.

use std::time::Duration;
use thiserror::Error;

/// Errors in the zone registry. These abort scene construction before any load is issued.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Zone at index {0} has an empty name")]
    EmptyName(usize),

    #[error("Duplicate zone name: {0}")]
    DuplicateName(String),

    #[error("Zone '{name}' has invalid radius {value} (must be finite and >= 0)")]
    InvalidRadius { name: String, value: f32 },

    #[error("Zone '{name}' has invalid fade width {value} (must be finite and >= 0)")]
    InvalidFadeWidth { name: String, value: f32 },

    #[error("Zone '{name}' has a non-finite anchor")]
    InvalidAnchor { name: String },

    #[error("Scene JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while resolving a zone's visual content.
///
/// A zone that hits any of these is permanently marked failed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Asset data error: {0}")]
    Data(#[from] zonefade_data::DataError),

    #[error("Asset '{0}' contains no renderable elements")]
    Empty(String),

    #[error("Load timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Importer panicked: {0}")]
    Panicked(String),

    #[error("Importer error: {0}")]
    Importer(String),
}
