//! Writes computed opacities onto zone aggregates.

use crate::constants::DEFAULT_VISIBILITY_CUTOFF;
use crate::zone::{VisualAggregate, Zone};

/// Applies an opacity to a zone's visual aggregate.
///
/// Opacities at or below the cutoff disable the whole group and skip the
/// per-element writes, which matters for zones with many elements.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityApplicator {
    cutoff: f32,
}

impl VisibilityApplicator {
    pub fn new(cutoff: f32) -> Self {
        Self {
            cutoff: cutoff.max(0.0),
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Apply `opacity` to `aggregate`. Returns true if its render state changed.
    pub fn apply(&self, aggregate: &mut VisualAggregate, opacity: f32) -> bool {
        if opacity <= self.cutoff {
            return aggregate.set_enabled(false);
        }
        let enabled = aggregate.set_enabled(true);
        let written = aggregate.set_visibility(opacity.min(1.0));
        enabled || written
    }

    /// Apply `opacity` to a zone. Zones without an aggregate are left untouched.
    pub fn apply_to_zone(&self, zone: &mut Zone, opacity: f32) -> bool {
        match zone.aggregate_mut() {
            Some(aggregate) => self.apply(aggregate, opacity),
            None => false,
        }
    }
}

impl Default for VisibilityApplicator {
    fn default() -> Self {
        Self::new(DEFAULT_VISIBILITY_CUTOFF)
    }
}
