//! Application configuration and the headless frame loop, with builder pattern.

use crate::camera::{CameraScript, FlyThrough, OrbitCamera};
use crate::errors::AppError;
use crate::importer::{PlyImporter, SyntheticImporter};
use crate::scene::demo_scene;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use zonefade_core::{CrossfadeManager, CrossfadeSettings, LoadState, SceneConfig, ZoneId};
use zonefade_data::Bounds;

/// Nominal frame time used when running unpaced.
const UNPACED_DT: f32 = 1.0 / 60.0;

/// How long `wait_for_loads` blocks before starting the flight anyway.
const LOAD_WAIT_LIMIT: Duration = Duration::from_secs(60);

/// Where zone content comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImporterKind {
    /// PLY files under the asset root.
    Ply,
    /// Generated splat shells, no files needed.
    Synthetic,
}

/// Logging configuration.
pub struct LoggingConfig {
    pub level: String,
    pub enable_tracy: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            enable_tracy: false,
        }
    }
}

/// Final state of one zone after a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSummary {
    pub name: String,
    pub state: LoadState,
    pub enabled: bool,
    pub visibility: Option<f32>,
    pub splats: usize,
    /// World-space bounds of the loaded content.
    pub bounds: Option<Bounds>,
    pub error: Option<String>,
}

/// Outcome of a headless run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub active_changes: usize,
    pub final_active: Option<String>,
    pub zones: Vec<ZoneSummary>,
}

impl RunSummary {
    pub fn count(&self, state: LoadState) -> usize {
        self.zones.iter().filter(|z| z.state == state).count()
    }

    /// Bounds enclosing every loaded zone.
    pub fn scene_bounds(&self) -> Option<Bounds> {
        self.zones
            .iter()
            .filter_map(|z| z.bounds)
            .reduce(|a, b| a.union(&b))
    }

    /// Log one line per zone and an overall summary.
    pub fn log(&self) {
        for zone in &self.zones {
            match (&zone.error, zone.bounds) {
                (Some(e), _) => warn!("Zone '{}': {} ({})", zone.name, zone.state, e),
                (None, Some(bounds)) => info!(
                    "Zone '{}': {} splats, center {:?}, radius {:.2}, enabled {}, visibility {:?}",
                    zone.name, zone.splats, bounds.center, bounds.radius, zone.enabled, zone.visibility
                ),
                (None, None) => info!("Zone '{}': {}", zone.name, zone.state),
            }
        }
        if let Some(bounds) = self.scene_bounds() {
            info!("Scene bounds: {:?} .. {:?}", bounds.min, bounds.max);
        }
        info!(
            "Finished {} frames, {} active zone changes (last: {}), {} loaded, {} failed",
            self.frames,
            self.active_changes,
            self.final_active.as_deref().unwrap_or("none"),
            self.count(LoadState::Loaded),
            self.count(LoadState::Failed)
        );
    }
}

/// Builder for configuring and running the application.
pub struct AppBuilder {
    scene_path: Option<PathBuf>,
    asset_root: Option<PathBuf>,
    importer: ImporterKind,
    frames: u64,
    fps: f32,
    seconds_per_leg: f32,
    wait_for_loads: bool,
    logging: LoggingConfig,
}

impl AppBuilder {
    /// Create a new AppBuilder with default settings.
    pub fn new() -> Self {
        Self {
            scene_path: None,
            asset_root: None,
            importer: ImporterKind::Ply,
            frames: 600,
            fps: 60.0,
            seconds_per_leg: 10.0,
            wait_for_loads: false,
            logging: LoggingConfig::default(),
        }
    }

    /// Load the scene from a JSON file instead of the built-in demo.
    pub fn with_scene(mut self, path: PathBuf) -> Self {
        self.scene_path = Some(path);
        self
    }

    /// Override the scene's asset root.
    pub fn with_asset_root(mut self, root: PathBuf) -> Self {
        self.asset_root = Some(root);
        self
    }

    pub fn with_importer(mut self, importer: ImporterKind) -> Self {
        self.importer = importer;
        self
    }

    /// Number of frames to run.
    pub fn with_frames(mut self, frames: u64) -> Self {
        self.frames = frames;
        self
    }

    /// Target frame rate. Zero runs unpaced.
    pub fn with_fps(mut self, fps: f32) -> Self {
        self.fps = fps;
        self
    }

    /// Seconds the camera takes between consecutive zone anchors.
    pub fn with_seconds_per_leg(mut self, seconds: f32) -> Self {
        self.seconds_per_leg = seconds;
        self
    }

    /// Hold the camera at the first anchor until every zone has loaded or failed.
    pub fn with_wait_for_loads(mut self, wait: bool) -> Self {
        self.wait_for_loads = wait;
        self
    }

    /// Configure logging.
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging = config;
        self
    }

    /// Run the application.
    pub fn run(self) -> Result<RunSummary, AppError> {
        self.init_logging();
        self.run_headless()
    }

    /// Run the frame loop without touching global logging state.
    pub fn run_headless(&self) -> Result<RunSummary, AppError> {
        if !self.fps.is_finite() || self.fps < 0.0 {
            return Err(AppError::InvalidFrameRate(self.fps));
        }
        let dt = if self.fps > 0.0 { 1.0 / self.fps } else { UNPACED_DT };
        let frame_budget = if self.fps > 0.0 {
            let budget = Duration::try_from_secs_f32(dt)
                .map_err(|_| AppError::InvalidFrameRate(self.fps))?;
            Some(budget)
        } else {
            None
        };

        let scene = match &self.scene_path {
            Some(path) => SceneConfig::from_json_file(path)?,
            None => {
                info!("No scene file given - using the built-in demo scene");
                demo_scene()?
            }
        };
        let registry = scene.registry()?;
        if registry.is_empty() {
            return Err(AppError::EmptyScene);
        }

        let settings = CrossfadeSettings {
            load_timeout: scene.load_timeout(),
            ..CrossfadeSettings::default()
        };
        let mut manager = CrossfadeManager::new(&registry, settings);

        match self.importer {
            ImporterKind::Ply => {
                let root = self
                    .asset_root
                    .clone()
                    .unwrap_or_else(|| scene.asset_root.clone());
                info!("Loading {} zones from {}", registry.len(), root.display());
                manager.start_loading(PlyImporter::new(root));
            }
            ImporterKind::Synthetic => {
                info!("Generating {} synthetic zones", registry.len());
                manager.start_loading(SyntheticImporter::default());
            }
        }

        let waypoints = registry.iter().map(|(_, d)| d.anchor).collect();
        let mut script = FlyThrough::new(waypoints, self.seconds_per_leg);
        let mut camera = OrbitCamera::default();

        if self.wait_for_loads {
            let intent = script.update(&camera.update_context(0.0));
            camera.apply(&intent);
            self.wait_until_settled(&mut manager, camera.position());
        }

        let mut last_active: Option<ZoneId> = None;
        let mut active_changes = 0;
        let mut path_finished = false;

        for frame in 0..self.frames {
            let started = Instant::now();
            // Simulated time keeps the flight identical whether paced or not.
            let elapsed = frame as f32 * dt;

            let intent = script.update(&camera.update_context(elapsed));
            if !intent.is_empty() {
                camera.apply(&intent);
            }
            if script.is_finished() && !path_finished {
                info!(frame, "Camera reached the last zone anchor");
                path_finished = true;
            }

            let report = manager.before_render(camera.position());
            if report.load_transitions > 0 {
                info!(
                    "Zones: {} loaded, {} pending, {} failed",
                    report.loaded, report.pending, report.failed
                );
            }

            let active = report.active().map(|a| a.zone);
            if active != last_active {
                active_changes += 1;
                let name = active
                    .and_then(|id| manager.zone(id))
                    .map(|z| z.name())
                    .unwrap_or("none");
                info!(frame, "Active zone: {}", name);
                last_active = active;
            }
            debug!(frame, camera = ?camera.position(), "opacities: {:?}", report.crossfade);

            if let Some(budget) = frame_budget {
                if let Some(rest) = budget.checked_sub(started.elapsed()) {
                    thread::sleep(rest);
                }
            }
        }

        let summary = RunSummary {
            frames: self.frames,
            active_changes,
            final_active: last_active
                .and_then(|id| manager.zone(id))
                .map(|z| z.name().to_string()),
            zones: manager
                .zones()
                .iter()
                .map(|zone| ZoneSummary {
                    name: zone.name().to_string(),
                    state: zone.load_state(),
                    enabled: zone.aggregate().is_some_and(|a| a.is_enabled()),
                    visibility: zone.aggregate().and_then(|a| a.visibility()),
                    splats: zone.aggregate().map_or(0, |a| a.splat_count()),
                    bounds: zone.aggregate().map(|a| a.world_bounds()),
                    error: zone.load_error().map(|e| e.to_string()),
                })
                .collect(),
        };

        summary.log();

        Ok(summary)
    }

    fn wait_until_settled(&self, manager: &mut CrossfadeManager, camera: glam::Vec3) {
        let start = Instant::now();
        while !manager.is_settled() {
            if start.elapsed() > LOAD_WAIT_LIMIT {
                warn!("Gave up waiting for zone loads after {:?}", LOAD_WAIT_LIMIT);
                return;
            }
            manager.before_render(camera);
            thread::sleep(Duration::from_millis(1));
        }
        info!("All zone loads settled in {:?}", start.elapsed());
    }

    fn init_logging(&self) {
        #[cfg(feature = "tracy")]
        {
            if self.logging.enable_tracy {
                use tracing_subscriber::Layer;
                use tracing_subscriber::layer::SubscriberExt;
                use tracing_subscriber::util::SubscriberInitExt;
                tracing_subscriber::registry()
                    .with(tracing_tracy::TracyLayer::default())
                    .with(
                        tracing_subscriber::fmt::layer().with_filter(
                            tracing_subscriber::EnvFilter::try_from_default_env()
                                .unwrap_or_else(|_| self.logging.level.clone().into()),
                        ),
                    )
                    .init();
                return;
            }
        }

        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&self.logging.level)),
            )
            .with_target(false)
            .init();

        #[cfg(not(feature = "tracy"))]
        {
            if self.logging.enable_tracy {
                warn!("Tracy output needs the `tracy` feature; using plain logging");
            }
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
