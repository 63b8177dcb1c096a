//! PLY file loading and parsing

mod loader;
mod vertex;

pub use loader::{load_vertices_from_ply, vertex_from_properties};
pub use vertex::PlyVertex;
