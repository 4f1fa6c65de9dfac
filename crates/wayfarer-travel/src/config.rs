use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

/// Tuning for route composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Furthest walk, in moves, considered to reach a transport origin.
    pub max_edge_walk: u32,
    /// Extra distance charged per plane of difference when estimating the
    /// remaining distance to the goal.
    pub plane_penalty: u32,
    /// When the goal tile itself is blocked, walkable tiles this close to it
    /// are accepted instead.
    pub goal_radius: u32,
    /// When nothing within `goal_radius` is walkable either, the nearest
    /// walkable tile within this radius stands in for the goal.
    pub snap_radius: u32,
    /// A teleport must bring the agent at least this much closer to the goal.
    pub teleport_min_gain: u32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            max_edge_walk: 64,
            plane_penalty: 8,
            goal_radius: 1,
            snap_radius: 5,
            teleport_min_gain: 20,
        }
    }
}

/// Tuning for tick-driven execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Consecutive walking ticks without moving before a replan.
    pub stall_ticks: u32,
    /// Bounds, inclusive, of the random number of route steps walked toward
    /// per command.
    pub lookahead_min: u32,
    pub lookahead_max: u32,
    /// Most transport edges used in one journey.
    pub max_hops: u32,
    /// Chebyshev distance from the goal that counts as arrived.
    pub arrive_radius: u32,
    /// Fixed seed for the lookahead generator. Seeded from the OS if unset.
    pub seed: Option<u64>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            stall_ticks: 12,
            lookahead_min: 10,
            lookahead_max: 16,
            max_hops: 8,
            arrive_radius: 0,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub composer: ComposerConfig,
    pub executor: ExecutorConfig,
}

impl NavConfig {
    pub fn from_json(s: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&s)
    }
}
