//! Visual aggregates: the group of renderable elements that makes up a zone.

use glam::Vec3;
use zonefade_data::{Bounds, Splat};

/// One renderable element produced by an importer, e.g. one splat mesh.
///
/// Splat positions are local to the owning aggregate's anchor.
#[derive(Debug, Clone)]
pub struct SplatElement {
    name: String,
    splats: Vec<Splat>,
    visibility: f32,
}

impl SplatElement {
    /// Create an element. It starts fully invisible.
    pub fn new(name: impl Into<String>, splats: Vec<Splat>) -> Self {
        Self {
            name: name.into(),
            splats,
            visibility: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn splats(&self) -> &[Splat] {
        &self.splats
    }

    pub fn len(&self) -> usize {
        self.splats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.splats.is_empty()
    }

    /// Visibility factor multiplied into every splat's opacity at render time.
    pub fn visibility(&self) -> f32 {
        self.visibility
    }

    fn set_visibility(&mut self, visibility: f32) -> bool {
        if self.visibility == visibility {
            return false;
        }
        self.visibility = visibility;
        true
    }
}

/// Transform group anchoring a zone's elements at a world position.
///
/// Enabled state and element visibility are the render state the crossfade
/// writes each frame. `revision` advances only when that state actually changes.
#[derive(Debug, Clone)]
pub struct VisualAggregate {
    anchor: Vec3,
    enabled: bool,
    elements: Vec<SplatElement>,
    local_bounds: Bounds,
    revision: u64,
}

impl VisualAggregate {
    /// Group `elements` under `anchor`, disabled and with zero visibility.
    pub fn new(anchor: Vec3, mut elements: Vec<SplatElement>) -> Self {
        for element in &mut elements {
            element.visibility = 0.0;
        }
        let local_bounds = Bounds::from_positions(
            elements
                .iter()
                .flat_map(|e| e.splats.iter().map(|s| s.position)),
        );
        Self {
            anchor,
            enabled: false,
            elements,
            local_bounds,
            revision: 0,
        }
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn elements(&self) -> &[SplatElement] {
        &self.elements
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn splat_count(&self) -> usize {
        self.elements.iter().map(SplatElement::len).sum()
    }

    /// Bounds of the content in world space.
    pub fn world_bounds(&self) -> Bounds {
        Bounds {
            min: self.local_bounds.min + self.anchor,
            max: self.local_bounds.max + self.anchor,
            center: self.local_bounds.center + self.anchor,
            radius: self.local_bounds.radius,
        }
    }

    /// Number of observable render-state changes applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Enable or disable the whole group. Returns true if the state changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;
        self.revision += 1;
        true
    }

    /// Write `visibility` to every element. Returns true if any element changed.
    pub fn set_visibility(&mut self, visibility: f32) -> bool {
        let mut changed = false;
        for element in &mut self.elements {
            changed |= element.set_visibility(visibility);
        }
        if changed {
            self.revision += 1;
        }
        changed
    }

    /// Shared visibility of the elements, if there are any.
    pub fn visibility(&self) -> Option<f32> {
        self.elements.first().map(SplatElement::visibility)
    }
}
