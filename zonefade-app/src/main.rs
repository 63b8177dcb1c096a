//! Zonefade Application
//!
//! Headless runner that flies a camera through a scene of splat zones and
//! crossfades them every frame.
//!
//! Features:
//! - Scene descriptions from JSON, or a built-in two-zone demo
//! - PLY zone assets, or synthetic splat shells
//! - Scripted orbit camera path through every zone anchor

mod app;
mod camera;
mod errors;
mod importer;
mod scene;

use app::{AppBuilder, ImporterKind, LoggingConfig};
use clap::Parser;
use std::path::PathBuf;

/// Zonefade - Splat Zone Crossfading
#[derive(Parser, Debug)]
#[command(name = "zonefade")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a scene JSON file (uses the built-in demo scene if omitted)
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Directory zone sources are resolved against (overrides the scene's)
    #[arg(short, long)]
    asset_root: Option<PathBuf>,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Target frame rate (0 runs unpaced)
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Seconds the camera takes between zone anchors
    #[arg(long, default_value_t = 10.0)]
    seconds_per_leg: f32,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Generate synthetic zones instead of reading PLY files
    #[arg(long)]
    synthetic: bool,

    /// Hold the camera until every zone has loaded or failed
    #[arg(long)]
    wait_for_loads: bool,

    /// Send spans to Tracy (needs the `tracy` feature)
    #[arg(long)]
    tracy: bool,
}

fn main() {
    let args = Args::parse();

    let importer = if args.synthetic {
        ImporterKind::Synthetic
    } else {
        ImporterKind::Ply
    };

    let mut builder = AppBuilder::new()
        .with_importer(importer)
        .with_frames(args.frames)
        .with_fps(args.fps)
        .with_seconds_per_leg(args.seconds_per_leg)
        .with_wait_for_loads(args.wait_for_loads)
        .with_logging(LoggingConfig {
            level: args.log_level,
            enable_tracy: args.tracy,
        });
    if let Some(scene) = args.scene {
        builder = builder.with_scene(scene);
    }
    if let Some(root) = args.asset_root {
        builder = builder.with_asset_root(root);
    }

    if let Err(e) = builder.run() {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}
