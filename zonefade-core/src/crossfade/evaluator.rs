//! Opacity evaluation from camera distance.

use crate::constants::{DEFAULT_EPSILON, OUT_OF_RANGE_OPACITY};
use crate::zone::{Zone, ZoneId};
use glam::Vec3;

/// Proximity score of a zone at `distance` from its anchor.
///
/// `1.0` inside `radius`, decaying linearly to `0.0` across the fade band.
/// A zero fade width is a hard edge: anything past `radius` weighs `0.0`.
pub fn raw_weight(distance: f32, radius: f32, fade_width: f32) -> f32 {
    if distance <= radius {
        return 1.0;
    }
    if fade_width <= 0.0 {
        return 0.0;
    }
    (1.0 - (distance - radius) / fade_width).clamp(0.0, 1.0)
}

/// The dominant zone of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveZone {
    pub zone: ZoneId,
    pub weight: f32,
    pub distance: f32,
}

/// Opacity assignment for one frame, in registry order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Crossfade {
    opacities: Vec<(ZoneId, f32)>,
    active: Option<ActiveZone>,
}

impl Crossfade {
    /// Opacity of `zone`, or `None` if it was not loaded this frame.
    pub fn opacity(&self, zone: ZoneId) -> Option<f32> {
        self.opacities
            .iter()
            .find(|(id, _)| *id == zone)
            .map(|(_, opacity)| *opacity)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, f32)> + '_ {
        self.opacities.iter().copied()
    }

    /// The active zone, or `None` when no loaded zone is in range.
    pub fn active(&self) -> Option<ActiveZone> {
        self.active
    }

    pub fn len(&self) -> usize {
        self.opacities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opacities.is_empty()
    }
}

/// Computes per-zone opacity from the camera position.
///
/// Only one zone is dominant per frame. It gets its own weight as opacity and
/// every other loaded zone gets the complement, whatever its own distance.
/// When nothing is in range every loaded zone is fully shown.
#[derive(Debug, Clone, Copy)]
pub struct CrossfadeEvaluator {
    epsilon: f32,
}

impl CrossfadeEvaluator {
    pub fn new(epsilon: f32) -> Self {
        Self {
            epsilon: epsilon.max(0.0),
        }
    }

    /// Whether a zone at `distance` is inside its radius plus fade band.
    pub fn in_range(&self, distance: f32, radius: f32, fade_width: f32) -> bool {
        distance <= radius + fade_width + self.epsilon
    }

    /// Evaluate opacities for the loaded zones among `zones`.
    ///
    /// `zones` must be in registry order; the earliest zone wins weight ties.
    pub fn evaluate<'a>(&self, camera: Vec3, zones: impl IntoIterator<Item = &'a Zone>) -> Crossfade {
        let loaded: Vec<&Zone> = zones.into_iter().filter(|z| z.is_loaded()).collect();

        let mut active: Option<ActiveZone> = None;
        for zone in &loaded {
            let distance = camera.distance(zone.anchor());
            if !self.in_range(distance, zone.radius(), zone.fade_width()) {
                continue;
            }
            let weight = raw_weight(distance, zone.radius(), zone.fade_width());
            let wins = match active {
                None => true,
                Some(best) => weight > best.weight + self.epsilon,
            };
            if wins {
                active = Some(ActiveZone {
                    zone: zone.id(),
                    weight,
                    distance,
                });
            }
        }

        let opacities = loaded
            .iter()
            .map(|zone| {
                let opacity = match active {
                    None => OUT_OF_RANGE_OPACITY,
                    Some(a) if a.zone == zone.id() => a.weight,
                    Some(a) => 1.0 - a.weight,
                };
                (zone.id(), opacity.clamp(0.0, 1.0))
            })
            .collect();

        Crossfade { opacities, active }
    }
}

impl Default for CrossfadeEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}
