//! Long-distance travel on top of [`wayfarer_paths`].
//!
//! This crate combines walking with requirement-gated transport edges
//! (stairs, shortcuts, teleports, station networks) and executes the result
//! cooperatively, one world tick at a time.
//!
//! - [`TransportTable`] loads transport definitions from JSON and builds an
//!   immutable [`TransportGraph`], shared behind an `Arc`.
//! - [`NavContext`] owns the collision snapshot and search scratch space and
//!   composes [`Route`]s with [`NavContext::compose`].
//! - [`StepExecutor`] drives a route through an explicit state machine,
//!   replanning once when the agent gets stuck.
//! - [`Navigator`] ties it together: `travel_to`, then `tick` once per world
//!   step until a terminal [`TickOutcome`].
//!
//! The world is reached only through the [`WorldState`] and [`Actuator`]
//! traits.

mod cancel;
mod composer;
mod config;
mod context;
mod error;
mod executor;
mod graph;
mod navigator;
mod network;
mod requirement;
mod route;
mod script;
mod table;
mod transport;
mod world;

#[cfg(test)]
mod testing;

pub use cancel::CancelToken;
pub use composer::remaining;
pub use config::{ComposerConfig, ExecutorConfig, NavConfig};
pub use context::NavContext;
pub use error::{LoadError, NavError};
pub use executor::{Event, Next, State, StepExecutor, TickOutcome, transition};
pub use graph::{GraphBuilder, TransportGraph};
pub use navigator::Navigator;
pub use network::{Reach, STATION_PLACEHOLDER, Station, StationNetwork};
pub use requirement::{Comparison, ItemMode, Requirement, RequirementSet};
pub use route::{Leg, Route};
pub use script::{Condition, Interaction, Script, ScriptRunner, ScriptStatus, ScriptStep, Target};
pub use table::{ReverseDef, TransportDef, TransportTable};
pub use transport::{Category, EdgeId, TransportEdge};
pub use world::{Actuator, ItemSource, QuestState, VarKind, WorldState};
