//! Zone identity and load state.

use crate::errors::LoadError;
use crate::registry::ZoneDescriptor;
use crate::zone::VisualAggregate;
use glam::Vec3;
use std::fmt;

/// Index of a zone in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(usize);

impl ZoneId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Load progress of a zone. Transitions are one-way out of `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Loaded,
    Failed,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Pending => write!(f, "Pending"),
            LoadState::Loaded => write!(f, "Loaded"),
            LoadState::Failed => write!(f, "Failed"),
        }
    }
}

/// A zone in the live scene.
///
/// The visual aggregate exists only once the zone is loaded and is never replaced.
#[derive(Debug)]
pub struct Zone {
    id: ZoneId,
    descriptor: ZoneDescriptor,
    state: LoadState,
    aggregate: Option<VisualAggregate>,
    error: Option<LoadError>,
}

impl Zone {
    pub(crate) fn new(id: ZoneId, descriptor: ZoneDescriptor) -> Self {
        Self {
            id,
            descriptor,
            state: LoadState::Pending,
            aggregate: None,
            error: None,
        }
    }

    pub fn id(&self) -> ZoneId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &ZoneDescriptor {
        &self.descriptor
    }

    pub fn anchor(&self) -> Vec3 {
        self.descriptor.anchor
    }

    pub fn radius(&self) -> f32 {
        self.descriptor.radius
    }

    pub fn fade_width(&self) -> f32 {
        self.descriptor.fade_width
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    pub fn is_pending(&self) -> bool {
        self.state == LoadState::Pending
    }

    /// The zone's visual content, present only when loaded.
    pub fn aggregate(&self) -> Option<&VisualAggregate> {
        self.aggregate.as_ref()
    }

    pub(crate) fn aggregate_mut(&mut self) -> Option<&mut VisualAggregate> {
        self.aggregate.as_mut()
    }

    /// Why the zone failed to load, if it did.
    pub fn load_error(&self) -> Option<&LoadError> {
        self.error.as_ref()
    }

    /// Bind the aggregate and move to `Loaded`. Returns false if the zone already left `Pending`.
    pub(crate) fn mark_loaded(&mut self, aggregate: VisualAggregate) -> bool {
        if self.state != LoadState::Pending {
            return false;
        }
        self.aggregate = Some(aggregate);
        self.state = LoadState::Loaded;
        true
    }

    /// Record the failure and move to `Failed`. Returns false if the zone already left `Pending`.
    pub(crate) fn mark_failed(&mut self, error: LoadError) -> bool {
        if self.state != LoadState::Pending {
            return false;
        }
        self.error = Some(error);
        self.state = LoadState::Failed;
        true
    }
}
