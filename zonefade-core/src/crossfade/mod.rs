//! Per-frame crossfading between zones.
//!
//! The evaluator turns a camera position into an opacity per loaded zone; the
//! applicator writes those opacities onto each zone's visual aggregate.

pub mod evaluator;
pub mod visibility;

pub use evaluator::{ActiveZone, Crossfade, CrossfadeEvaluator, raw_weight};
pub use visibility::VisibilityApplicator;
