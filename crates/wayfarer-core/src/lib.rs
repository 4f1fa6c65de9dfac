//! **wayfarer-core**: world coordinates and obstruction data.
//!
//! This crate provides the types every other *wayfarer* crate builds on:
//! packed world [`Position`]s, compass [`Direction`]s, per-tile
//! [`CollisionFlags`], the immutable [`GridSnapshot`] searches run against,
//! and the [`Chart`] text format used to draw snapshots by hand.

pub mod chart;
pub mod direction;
pub mod flags;
pub mod position;
pub mod snapshot;

pub use chart::{Chart, ChartError};
pub use direction::Direction;
pub use flags::CollisionFlags;
pub use position::{Area, Position};
pub use snapshot::{GridSnapshot, SnapshotError};
