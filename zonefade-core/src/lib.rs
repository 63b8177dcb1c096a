//! Zonefade Core Crate
//!
//! Cross-fades large splat assets that represent different physical zones as a
//! camera moves through space. Only the zone nearest the viewer is opaque; the
//! others share a complementary opacity.
//!
//! ## Modules
//!
//! - [`registry`]: Static zone descriptors and scene configuration
//! - [`zone`]: Zone records, load state and visual aggregates
//! - [`loader`]: Asynchronous zone loading through an [`AssetImporter`]
//! - [`crossfade`]: Per-frame opacity evaluation and visibility application
//! - [`manager`]: The per-frame context tying everything together

pub mod constants;
pub mod crossfade;
pub mod errors;
pub mod loader;
pub mod manager;
pub mod registry;
pub mod zone;

pub use crossfade::{ActiveZone, Crossfade, CrossfadeEvaluator, VisibilityApplicator, raw_weight};
pub use errors::{ConfigError, LoadError};
pub use loader::{AssetImporter, ImportRequest, LoadOutcome, ZoneLoader};
pub use manager::{CrossfadeManager, CrossfadeSettings, FrameReport};
pub use registry::{SceneConfig, ZoneDescriptor, ZoneRegistry};
pub use zone::{LoadState, SplatElement, VisualAggregate, Zone, ZoneId};
