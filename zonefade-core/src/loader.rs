//! Asynchronous zone loading.
//!
//! Every zone load runs on its own worker thread and reports back over a
//! channel. Results are only applied to zones when the frame thread calls
//! [`ZoneLoader::drain`], so a load becomes visible at a frame boundary and
//! worker threads never touch zone state directly.

use crate::errors::LoadError;
use crate::zone::{LoadState, SplatElement, VisualAggregate, Zone, ZoneId};
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What the importer is asked to resolve for one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRequest {
    pub zone: ZoneId,
    pub name: String,
    pub source: String,
}

/// The engine's asset import operation.
///
/// Called once per zone from a worker thread.
pub trait AssetImporter: Send + Sync + 'static {
    fn import(&self, request: &ImportRequest) -> Result<Vec<SplatElement>, LoadError>;
}

impl<F> AssetImporter for F
where
    F: Fn(&ImportRequest) -> Result<Vec<SplatElement>, LoadError> + Send + Sync + 'static,
{
    fn import(&self, request: &ImportRequest) -> Result<Vec<SplatElement>, LoadError> {
        self(request)
    }
}

/// Result of one zone load, sent from its worker thread.
#[derive(Debug)]
pub struct LoadOutcome {
    pub zone: ZoneId,
    pub result: Result<Vec<SplatElement>, LoadError>,
    pub elapsed: Duration,
}

/// Issues zone loads and publishes their results into the zone set.
pub struct ZoneLoader {
    importer: Arc<dyn AssetImporter>,
    sender: Sender<LoadOutcome>,
    receiver: Receiver<LoadOutcome>,
    issued: HashMap<ZoneId, Instant>,
    timeout: Option<Duration>,
}

impl ZoneLoader {
    pub fn new(importer: impl AssetImporter, timeout: Option<Duration>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            importer: Arc::new(importer),
            sender,
            receiver,
            issued: HashMap::new(),
            timeout,
        }
    }

    /// Issue a load for every pending zone. Returns how many were issued.
    pub fn spawn_all(&mut self, zones: &mut [Zone]) -> usize {
        zones
            .iter_mut()
            .map(|zone| self.spawn(zone))
            .filter(|issued| *issued)
            .count()
    }

    /// Issue the load for one zone. A zone is only ever issued once.
    #[tracing::instrument(skip_all, fields(zone = %zone.name()))]
    pub fn spawn(&mut self, zone: &mut Zone) -> bool {
        if zone.load_state() != LoadState::Pending || self.issued.contains_key(&zone.id()) {
            return false;
        }

        let request = ImportRequest {
            zone: zone.id(),
            name: zone.name().to_string(),
            source: zone.descriptor().source().to_string(),
        };
        let importer = Arc::clone(&self.importer);
        let sender = self.sender.clone();

        debug!("Issuing load for '{}' from '{}'", request.name, request.source);
        let spawned = thread::Builder::new()
            .name(format!("zone-load-{}", request.name))
            .spawn(move || {
                let start = Instant::now();
                let result = panic::catch_unwind(AssertUnwindSafe(|| importer.import(&request)))
                    .unwrap_or_else(|payload| Err(LoadError::Panicked(panic_message(payload))));
                // The receiver only goes away with the loader; nobody is left to tell.
                let _ = sender.send(LoadOutcome {
                    zone: request.zone,
                    result,
                    elapsed: start.elapsed(),
                });
            });

        match spawned {
            Ok(_) => {
                self.issued.insert(zone.id(), Instant::now());
                true
            }
            Err(e) => {
                warn!("Failed to spawn load worker for '{}': {}", zone.name(), e);
                self.issued.insert(zone.id(), Instant::now());
                zone.mark_failed(LoadError::Io(e));
                false
            }
        }
    }

    /// Apply every finished load to `zones`, then fail zones that exceeded the timeout.
    ///
    /// Returns the number of zones whose load state changed.
    pub fn drain(&mut self, zones: &mut [Zone]) -> usize {
        let mut transitions = 0;

        while let Ok(outcome) = self.receiver.try_recv() {
            let Some(zone) = zones.get_mut(outcome.zone.index()) else {
                warn!("Discarding load result for unknown zone {}", outcome.zone);
                continue;
            };
            if zone.load_state() != LoadState::Pending {
                warn!(
                    "Discarding late load result for '{}' ({})",
                    zone.name(),
                    zone.load_state()
                );
                continue;
            }
            if publish(zone, outcome) {
                transitions += 1;
            }
        }

        if let Some(timeout) = self.timeout {
            for zone in zones.iter_mut().filter(|z| z.is_pending()) {
                let Some(issued_at) = self.issued.get(&zone.id()) else {
                    continue;
                };
                let waited = issued_at.elapsed();
                if waited > timeout {
                    warn!("Load for '{}' timed out after {:?}", zone.name(), waited);
                    if zone.mark_failed(LoadError::TimedOut(waited)) {
                        transitions += 1;
                    }
                }
            }
        }

        transitions
    }

    /// Number of zones a load has been issued for.
    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}

fn publish(zone: &mut Zone, outcome: LoadOutcome) -> bool {
    match outcome.result {
        Ok(elements) if elements.is_empty() || elements.iter().all(SplatElement::is_empty) => {
            let source = zone.descriptor().source().to_string();
            warn!("Zone '{}' loaded no splats from '{}'", zone.name(), source);
            zone.mark_failed(LoadError::Empty(source))
        }
        Ok(elements) => {
            let aggregate = VisualAggregate::new(zone.anchor(), elements);
            info!(
                "Zone '{}' loaded: {} elements, {} splats in {:?}",
                zone.name(),
                aggregate.element_count(),
                aggregate.splat_count(),
                outcome.elapsed
            );
            zone.mark_loaded(aggregate)
        }
        Err(e) => {
            warn!("Failed to load zone '{}': {}", zone.name(), e);
            zone.mark_failed(e)
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ZoneDescriptor;
    use glam::Vec3;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use zonefade_data::Splat;

    fn zones(names: &[&str]) -> Vec<Zone> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                Zone::new(
                    ZoneId::new(i),
                    ZoneDescriptor::new(*name, Vec3::new(i as f32 * 10.0, 0.0, 0.0), 5.0, 3.0),
                )
            })
            .collect()
    }

    type ImportResult = Result<Vec<SplatElement>, LoadError>;

    fn importer(
        f: impl Fn(&ImportRequest) -> ImportResult + Send + Sync + 'static,
    ) -> impl AssetImporter {
        f
    }

    fn one_splat(request: &ImportRequest) -> Vec<SplatElement> {
        vec![SplatElement::new(
            request.source.clone(),
            vec![Splat::white(Vec3::ZERO)],
        )]
    }

    /// Drain until no zone is pending, polling like a frame loop would.
    fn drain_until_settled(loader: &mut ZoneLoader, zones: &mut [Zone]) {
        let start = Instant::now();
        while zones.iter().any(Zone::is_pending) {
            loader.drain(zones);
            assert!(start.elapsed() < Duration::from_secs(5), "loads did not settle");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_successful_load_binds_disabled_aggregate() {
        let mut zones = zones(&["porch"]);
        let mut loader = ZoneLoader::new(importer(|r| Ok(one_splat(r))), None);
        assert_eq!(loader.spawn_all(&mut zones), 1);
        drain_until_settled(&mut loader, &mut zones);

        let zone = &zones[0];
        assert_eq!(zone.load_state(), LoadState::Loaded);
        let aggregate = zone.aggregate().unwrap();
        assert!(!aggregate.is_enabled());
        assert_eq!(aggregate.visibility(), Some(0.0));
        assert_eq!(aggregate.anchor(), zone.anchor());
    }

    #[test]
    fn test_failures_are_isolated() {
        let mut zones = zones(&["good", "bad", "also-good"]);
        let mut loader = ZoneLoader::new(
            importer(|r| {
                if r.name == "bad" {
                    Err(LoadError::Importer("no such asset".into()))
                } else {
                    Ok(one_splat(r))
                }
            }),
            None,
        );
        loader.spawn_all(&mut zones);
        drain_until_settled(&mut loader, &mut zones);

        let states: Vec<_> = zones.iter().map(Zone::load_state).collect();
        assert_eq!(
            states,
            [LoadState::Loaded, LoadState::Failed, LoadState::Loaded]
        );
        assert!(zones[1].aggregate().is_none());
        assert!(matches!(zones[1].load_error(), Some(LoadError::Importer(_))));
    }

    #[test]
    fn test_empty_import_fails_zone() {
        let mut zones = zones(&["hollow"]);
        let mut loader = ZoneLoader::new(
            importer(|r| Ok(vec![SplatElement::new(r.source.clone(), Vec::new())])),
            None,
        );
        loader.spawn_all(&mut zones);
        drain_until_settled(&mut loader, &mut zones);
        assert!(matches!(zones[0].load_error(), Some(LoadError::Empty(_))));
    }

    #[test]
    fn test_panicking_importer_fails_only_its_zone() {
        let mut zones = zones(&["boom", "fine"]);
        let mut loader = ZoneLoader::new(
            importer(|r| {
                if r.name == "boom" {
                    panic!("decoder exploded");
                }
                Ok(one_splat(r))
            }),
            None,
        );
        loader.spawn_all(&mut zones);
        drain_until_settled(&mut loader, &mut zones);

        match zones[0].load_error() {
            Some(LoadError::Panicked(message)) => assert!(message.contains("decoder exploded")),
            other => panic!("unexpected state: {other:?}"),
        }
        assert!(zones[1].is_loaded());
    }

    #[test]
    fn test_each_zone_is_issued_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut zones = zones(&["a", "b"]);
        let mut loader = ZoneLoader::new(
            importer(move |r| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(one_splat(r))
            }),
            None,
        );
        assert_eq!(loader.spawn_all(&mut zones), 2);
        assert_eq!(loader.spawn_all(&mut zones), 0);
        drain_until_settled(&mut loader, &mut zones);
        assert_eq!(loader.spawn_all(&mut zones), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(loader.issued_count(), 2);
    }

    #[test]
    fn test_import_request_uses_source() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let mut zones = vec![Zone::new(
            ZoneId::new(0),
            ZoneDescriptor::new("porch", Vec3::ZERO, 5.0, 3.0).with_source("porch.ply"),
        )];
        let mut loader = ZoneLoader::new(
            importer(move |r| {
                log.lock().unwrap().push(r.clone());
                Ok(one_splat(r))
            }),
            None,
        );
        loader.spawn_all(&mut zones);
        drain_until_settled(&mut loader, &mut zones);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].name, "porch");
        assert_eq!(seen[0].source, "porch.ply");
        assert_eq!(seen[0].zone, ZoneId::new(0));
    }

    #[test]
    fn test_timeout_fails_zone_and_discards_late_result() {
        let (release, gate) = mpsc::channel::<()>();
        let gate = Arc::new(Mutex::new(gate));
        let mut zones = zones(&["slow"]);
        let mut loader = ZoneLoader::new(
            importer(move |r| {
                let _ = gate.lock().unwrap().recv();
                Ok(one_splat(r))
            }),
            Some(Duration::from_millis(5)),
        );
        loader.spawn_all(&mut zones);

        thread::sleep(Duration::from_millis(20));
        assert_eq!(loader.drain(&mut zones), 1);
        assert!(matches!(zones[0].load_error(), Some(LoadError::TimedOut(_))));

        release.send(()).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(loader.drain(&mut zones), 0);
        assert_eq!(zones[0].load_state(), LoadState::Failed);
        assert!(zones[0].aggregate().is_none());
    }

    #[test]
    fn test_drain_without_results_changes_nothing() {
        let mut zones = zones(&["idle"]);
        let mut loader = ZoneLoader::new(importer(|r| Ok(one_splat(r))), None);
        assert_eq!(loader.drain(&mut zones), 0);
        assert!(zones[0].is_pending());
    }
}
