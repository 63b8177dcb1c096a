//! Asset importers handed to the crossfade manager.

use glam::Vec3;
use std::path::PathBuf;
use tracing::debug;
use zonefade_core::{AssetImporter, ImportRequest, LoadError, SplatElement};
use zonefade_data::{Splat, load_vertices_from_ply};

/// Loads each zone from a PLY file at `root/source`.
#[derive(Debug, Clone)]
pub struct PlyImporter {
    root: PathBuf,
}

impl PlyImporter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetImporter for PlyImporter {
    fn import(&self, request: &ImportRequest) -> Result<Vec<SplatElement>, LoadError> {
        let path = self.root.join(&request.source);
        debug!("Importing zone '{}' from {}", request.name, path.display());
        let vertices = load_vertices_from_ply(&path)?;
        let splats = vertices.iter().map(Splat::from).collect();
        Ok(vec![SplatElement::new(request.source.clone(), splats)])
    }
}

/// Generates a deterministic shell of splats per zone, for demos without assets.
#[derive(Debug, Clone)]
pub struct SyntheticImporter {
    splats_per_zone: usize,
    shell_radius: f32,
}

impl SyntheticImporter {
    pub fn new(splats_per_zone: usize, shell_radius: f32) -> Self {
        Self {
            splats_per_zone,
            shell_radius,
        }
    }
}

impl Default for SyntheticImporter {
    fn default() -> Self {
        Self::new(2048, 3.0)
    }
}

impl AssetImporter for SyntheticImporter {
    fn import(&self, request: &ImportRequest) -> Result<Vec<SplatElement>, LoadError> {
        let color = tint(&request.name);
        let splats = fibonacci_sphere(self.splats_per_zone)
            .map(|direction| Splat::new(direction * self.shell_radius, color, 1.0))
            .collect();
        Ok(vec![SplatElement::new(request.source.clone(), splats)])
    }
}

/// Evenly spread unit directions on a sphere.
fn fibonacci_sphere(count: usize) -> impl Iterator<Item = Vec3> {
    let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    (0..count).map(move |i| {
        let y = 1.0 - 2.0 * (i as f32 + 0.5) / count as f32;
        let ring = (1.0 - y * y).max(0.0).sqrt();
        let theta = golden_angle * i as f32;
        Vec3::new(theta.cos() * ring, y, theta.sin() * ring)
    })
}

/// Stable per-name color.
fn tint(name: &str) -> Vec3 {
    // FNV-1a
    let hash = name
        .bytes()
        .fold(0x811c_9dc5_u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
    let channel = |shift: u32| 0.35 + 0.65 * ((hash >> shift) & 0xff) as f32 / 255.0;
    Vec3::new(channel(0), channel(8), channel(16))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonefade_core::ZoneId;

    fn request(name: &str, source: &str) -> ImportRequest {
        ImportRequest {
            zone: ZoneId::new(0),
            name: name.to_string(),
            source: source.to_string(),
        }
    }

    #[test]
    fn test_synthetic_importer_is_deterministic() {
        let importer = SyntheticImporter::new(64, 2.0);
        let a = importer.import(&request("porch", "porch")).unwrap();
        let b = importer.import(&request("porch", "porch")).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].len(), 64);
        assert_eq!(a[0].splats(), b[0].splats());
        for splat in a[0].splats() {
            assert!((splat.position.length() - 2.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_tint_differs_per_name() {
        assert_ne!(tint("porch"), tint("yard"));
        assert_eq!(tint("porch"), tint("porch"));
    }

    #[test]
    fn test_ply_importer_reads_file_under_root() {
        let root = std::env::temp_dir().join(format!("zonefade-assets-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(
            root.join("porch.ply"),
            "ply\n\
             format ascii 1.0\n\
             element vertex 2\n\
             property float x\n\
             property float y\n\
             property float z\n\
             property uchar red\n\
             property uchar green\n\
             property uchar blue\n\
             end_header\n\
             1 2 3 255 0 0\n\
             4 5 6 0 0 255\n",
        )
        .unwrap();

        let elements = PlyImporter::new(&root)
            .import(&request("porch", "porch.ply"))
            .unwrap();
        let _ = std::fs::remove_dir_all(&root);

        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].name(), "porch.ply");
        let splats = elements[0].splats();
        assert_eq!(splats.len(), 2);
        assert_eq!(splats[0], Splat::new(Vec3::new(1.0, 2.0, 3.0), Vec3::X, 1.0));
        assert_eq!(splats[1].color, Vec3::Z);
    }

    #[test]
    fn test_ply_importer_missing_file() {
        let importer = PlyImporter::new(std::env::temp_dir());
        let err = importer
            .import(&request("ghost", "zonefade-missing-zone.ply"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Data(zonefade_data::DataError::Io(_))));
    }
}
