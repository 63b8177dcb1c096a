//! Zonefade Data Crate
//!
//! Splat point data, bounds and PLY loading used by zone importers.
//! This crate is GPU-agnostic and knows nothing about zones or crossfading.

pub mod error;
pub mod ply;
pub mod types;

pub use error::DataError;
pub use ply::{PlyVertex, load_vertices_from_ply};
pub use types::{Bounds, Splat};
