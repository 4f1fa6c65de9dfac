use std::sync::Arc;

use log::debug;
use wayfarer_core::{Area, GridSnapshot, Position};
use wayfarer_paths::{Exclusions, SearchRange};

use crate::config::NavConfig;
use crate::graph::TransportGraph;
use crate::world::WorldState;

/// Everything a navigation request reads and the scratch space it writes.
///
/// A context owns the current collision snapshot, a handle to the shared
/// transport graph and the search buffers. Contexts are independent of each
/// other, so several can search in parallel over the same graph.
#[derive(Debug)]
pub struct NavContext {
    pub(crate) graph: Arc<TransportGraph>,
    pub(crate) snapshot: Option<GridSnapshot>,
    pub(crate) search: SearchRange,
    pub(crate) exclusions: Exclusions,
    pub(crate) config: NavConfig,
}

impl NavContext {
    pub fn new(graph: Arc<TransportGraph>, config: NavConfig) -> Self {
        Self {
            graph,
            snapshot: None,
            search: SearchRange::new(Area::default(), 0),
            exclusions: Exclusions::new(),
            config,
        }
    }

    pub fn graph(&self) -> &Arc<TransportGraph> {
        &self.graph
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Option<&GridSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn set_snapshot(&mut self, snapshot: GridSnapshot) {
        self.snapshot = Some(snapshot);
    }

    /// Replace the snapshot with a fresh capture around `around`. Returns
    /// whether the world had one to give; on `false` the context is left
    /// without a snapshot.
    pub fn capture<W: WorldState + ?Sized>(&mut self, world: &W, around: Position) -> bool {
        self.snapshot = world.snapshot(around);
        if let Some(s) = &self.snapshot {
            debug!("captured {} over {} planes around {around}", s.area(), s.planes());
        }
        self.snapshot.is_some()
    }

    pub fn exclusions(&self) -> &Exclusions {
        &self.exclusions
    }

    /// Tiles walks must avoid. Non-empty exclusions switch walking to the
    /// strategic search.
    pub fn set_exclusions(&mut self, exclusions: Exclusions) {
        self.exclusions = exclusions;
    }

    /// 8-direction walk over the current snapshot.
    pub fn local_path(&mut self, from: Position, to: Position) -> Option<Vec<Position>> {
        let snapshot = self.snapshot.as_ref()?;
        self.search.local_path(snapshot, from, to)
    }

    /// 24-direction walk over the current snapshot to the nearest of
    /// `goals`, avoiding the context's exclusions.
    pub fn strategic_path(&mut self, start: Position, goals: &[Position]) -> Option<Vec<Position>> {
        let snapshot = self.snapshot.as_ref()?;
        self.search
            .strategic_path(snapshot, start, goals, &self.exclusions)
    }
}
