//! PLY vertex data structures

use crate::types::Splat;
use glam::Vec3;

/// Vertex data extracted from a splat PLY file.
#[derive(Debug, Clone, PartialEq)]
pub struct PlyVertex {
    pub position: Vec3,
    pub color: Vec3,
    pub opacity: f32,
}

impl From<&PlyVertex> for Splat {
    fn from(vertex: &PlyVertex) -> Self {
        Splat::new(vertex.position, vertex.color, vertex.opacity)
    }
}
