//! Collision-aware pathfinding over [`GridSnapshot`](wayfarer_core::GridSnapshot)s.
//!
//! Two breadth-first searches are provided, both shortest by move count:
//!
//! - **Local** 8-direction search ([`SearchRange::local_path`]) and reach
//!   maps ([`SearchRange::local_map`]), gated by the snapshot's obstruction
//!   rules with no corner cutting.
//! - **Strategic** 24-direction search ([`SearchRange::strategic_path`]) that
//!   adds far cardinal, far diagonal and knight-style moves, skips
//!   [`Exclusions`], and accepts several goals at once. Every move is
//!   validated through the table in [`moves`].
//!
//! All searches run through [`SearchRange`], which owns and reuses its
//! scratch buffers so that repeated queries incur no allocations after
//! warm-up. Unreachable goals are reported as `None`, never as errors.
//!
//! The generic [`SearchRange::bfs_map`] and [`SearchRange::bfs_path`] accept
//! any [`Pather`].

mod distance;
mod local;
pub mod moves;
mod search;
mod strategic;
mod traits;

pub use distance::chebyshev;
pub use local::{LOCAL_DIRECTIONS, LocalMoves};
pub use search::{PathNode, SearchRange};
pub use strategic::Exclusions;
pub use traits::Pather;
