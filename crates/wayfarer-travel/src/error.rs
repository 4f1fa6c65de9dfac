use std::path::PathBuf;

use wayfarer_core::Position;

/// Why a navigation request could not be served.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    #[error("no path from {start} to {goal}")]
    NoPathFound { start: Position, goal: Position },
    #[error("no goal given")]
    NoGoal,
    #[error("a route is already being executed")]
    Busy,
    #[error("no collision snapshot around {0}")]
    NoSnapshot(Position),
}

/// Errors raised while loading transport tables or configuration.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{name}: {position} is outside the packable coordinate range")]
    InvalidPosition { name: String, position: Position },
    #[error("network {0} needs at least two stations")]
    EmptyNetwork(String),
    #[error("{0}: a reverse direction needs a fixed origin")]
    ReverseWithoutOrigin(String),
}
