//! Constants used throughout the crossfade core.

/// Tolerance for distance and weight comparisons.
pub const DEFAULT_EPSILON: f32 = 1e-4;

/// Opacities at or below this disable a zone instead of writing per-element visibility.
pub const DEFAULT_VISIBILITY_CUTOFF: f32 = 0.001;

/// Opacity given to every loaded zone when none is in range.
pub const OUT_OF_RANGE_OPACITY: f32 = 1.0;
