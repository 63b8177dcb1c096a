//! Zone records and their visual content.
//!
//! A [`Zone`] is created from its registry descriptor in [`LoadState::Pending`]
//! and moves exactly once to `Loaded` or `Failed`.

pub mod aggregate;
pub mod state;

pub use aggregate::{SplatElement, VisualAggregate};
pub use state::{LoadState, Zone, ZoneId};
