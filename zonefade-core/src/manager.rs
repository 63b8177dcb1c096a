//! The crossfade manager: the per-frame context object.
//!
//! Owns the zone set, the loader, and the evaluator/applicator pair. The host
//! engine calls [`CrossfadeManager::before_render`] once per frame with the
//! camera position; everything inside runs to completion on that call.

use crate::constants::{DEFAULT_EPSILON, DEFAULT_VISIBILITY_CUTOFF};
use crate::crossfade::{ActiveZone, Crossfade, CrossfadeEvaluator, VisibilityApplicator};
use crate::loader::{AssetImporter, ZoneLoader};
use crate::registry::ZoneRegistry;
use crate::zone::{LoadState, Zone, ZoneId};
use glam::Vec3;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tunables for evaluation, application and loading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossfadeSettings {
    /// Tolerance for range checks and weight ties.
    pub epsilon: f32,
    /// Opacities at or below this disable a zone.
    pub visibility_cutoff: f32,
    /// Zones pending longer than this are failed. `None` waits forever.
    pub load_timeout: Option<Duration>,
}

impl Default for CrossfadeSettings {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            visibility_cutoff: DEFAULT_VISIBILITY_CUTOFF,
            load_timeout: None,
        }
    }
}

/// What happened during one `before_render` call.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub crossfade: Crossfade,
    pub loaded: usize,
    pub pending: usize,
    pub failed: usize,
    /// Zones whose load state changed this frame.
    pub load_transitions: usize,
    /// Aggregates whose render state changed this frame.
    pub visibility_changes: usize,
}

impl FrameReport {
    pub fn active(&self) -> Option<ActiveZone> {
        self.crossfade.active()
    }
}

pub struct CrossfadeManager {
    zones: Vec<Zone>,
    loader: Option<ZoneLoader>,
    evaluator: CrossfadeEvaluator,
    applicator: VisibilityApplicator,
    settings: CrossfadeSettings,
    frame: u64,
    last_active: Option<ZoneId>,
}

impl CrossfadeManager {
    /// Create one pending zone per registry entry.
    pub fn new(registry: &ZoneRegistry, settings: CrossfadeSettings) -> Self {
        let zones = registry
            .iter()
            .map(|(id, descriptor)| Zone::new(id, descriptor.clone()))
            .collect();
        Self {
            zones,
            loader: None,
            evaluator: CrossfadeEvaluator::new(settings.epsilon),
            applicator: VisibilityApplicator::new(settings.visibility_cutoff),
            settings,
            frame: 0,
            last_active: None,
        }
    }

    /// Issue loads for every zone. Only the first call has any effect.
    pub fn start_loading(&mut self, importer: impl AssetImporter) -> usize {
        if self.loader.is_some() {
            warn!("Zone loading already started; ignoring");
            return 0;
        }
        let mut loader = ZoneLoader::new(importer, self.settings.load_timeout);
        let issued = loader.spawn_all(&mut self.zones);
        info!("Issued {} zone loads", issued);
        self.loader = Some(loader);
        issued
    }

    /// Per-frame hook: publish finished loads, evaluate, and apply opacities.
    pub fn before_render(&mut self, camera: Vec3) -> FrameReport {
        self.frame += 1;

        let load_transitions = match self.loader.as_mut() {
            Some(loader) => loader.drain(&mut self.zones),
            None => 0,
        };

        let crossfade = self.evaluator.evaluate(camera, &self.zones);

        let mut visibility_changes = 0;
        for (id, opacity) in crossfade.iter() {
            if let Some(zone) = self.zones.get_mut(id.index()) {
                if self.applicator.apply_to_zone(zone, opacity) {
                    visibility_changes += 1;
                }
            }
        }

        let active = crossfade.active().map(|a| a.zone);
        if active != self.last_active {
            match crossfade.active() {
                Some(a) => debug!(
                    "Active zone -> '{}' (distance {:.2}, weight {:.3})",
                    self.zones[a.zone.index()].name(),
                    a.distance,
                    a.weight
                ),
                None => debug!("No zone in range; showing all loaded zones"),
            }
            self.last_active = active;
        }

        let (loaded, pending, failed) = self.counts();
        FrameReport {
            frame: self.frame,
            crossfade,
            loaded,
            pending,
            failed,
            load_transitions,
            visibility_changes,
        }
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(id.index())
    }

    pub fn zone_by_name(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name() == name)
    }

    pub fn settings(&self) -> &CrossfadeSettings {
        &self.settings
    }

    /// Number of frames processed so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// True once loading started and no zone is pending any more.
    pub fn is_settled(&self) -> bool {
        self.loader.is_some() && self.zones.iter().all(|z| !z.is_pending())
    }

    fn counts(&self) -> (usize, usize, usize) {
        self.zones
            .iter()
            .fold((0, 0, 0), |(l, p, f), zone| match zone.load_state() {
                LoadState::Loaded => (l + 1, p, f),
                LoadState::Pending => (l, p + 1, f),
                LoadState::Failed => (l, p, f + 1),
            })
    }
}
