//! Core data types for splat point clouds.
//!
//! These are CPU-side representations handed from importers to zone aggregates.

use glam::Vec3;

/// A single splat point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Splat {
    /// Position in world space.
    pub position: Vec3,
    /// RGB color (linear, 0-1 range).
    pub color: Vec3,
    /// Opacity (0-1) as authored in the asset.
    pub opacity: f32,
}

impl Splat {
    /// Create a new splat with position, color and opacity.
    pub fn new(position: Vec3, color: Vec3, opacity: f32) -> Self {
        Self {
            position,
            color,
            opacity,
        }
    }

    /// Create an opaque white splat at the given position.
    pub fn white(position: Vec3) -> Self {
        Self {
            position,
            color: Vec3::ONE,
            opacity: 1.0,
        }
    }
}

impl Default for Splat {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Vec3::splat(0.8),
            opacity: 1.0,
        }
    }
}

/// Axis-aligned bounds of a set of positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
    pub center: Vec3,
    pub radius: f32,
}

impl Bounds {
    /// Compute bounds from positions. An empty iterator yields unit bounds at the origin.
    pub fn from_positions(positions: impl Iterator<Item = Vec3>) -> Self {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        let mut count = 0;

        for pos in positions {
            min = min.min(pos);
            max = max.max(pos);
            count += 1;
        }

        if count == 0 {
            return Self {
                min: Vec3::ZERO,
                max: Vec3::ZERO,
                center: Vec3::ZERO,
                radius: 1.0,
            };
        }

        let center = (min + max) * 0.5;
        let radius = ((max - min).length() * 0.5).max(f32::EPSILON);
        Self {
            min,
            max,
            center,
            radius,
        }
    }

    /// Merge two bounds into one enclosing both.
    pub fn union(&self, other: &Bounds) -> Self {
        Self::from_positions([self.min, self.max, other.min, other.max].into_iter())
    }
}
