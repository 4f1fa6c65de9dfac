use std::collections::HashMap;

use log::trace;
use wayfarer_core::Position;

use crate::transport::{EdgeId, TransportEdge};
use crate::world::WorldState;

/// Directed multigraph of transport edges, keyed by origin.
///
/// The graph is immutable once built and is shared between navigators
/// behind an `Arc`. Requirement state is never stored here; filtering by
/// what the agent can currently use happens on every query.
#[derive(Debug, Clone, Default)]
pub struct TransportGraph {
    edges: Vec<TransportEdge>,
    by_origin: HashMap<Position, Vec<EdgeId>>,
    anywhere: Vec<EdgeId>,
}

impl TransportGraph {
    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edge(&self, id: EdgeId) -> Option<&TransportEdge> {
        self.edges.get(id.0 as usize)
    }

    pub fn edges(&self) -> &[TransportEdge] {
        &self.edges
    }

    /// Every distinct fixed origin, in no particular order.
    pub fn origins(&self) -> impl Iterator<Item = Position> + '_ {
        self.by_origin.keys().copied()
    }

    /// Edges whose origin is exactly `p`.
    pub fn edges_from(&self, p: Position) -> impl Iterator<Item = &TransportEdge> + '_ {
        self.by_origin
            .get(&p)
            .into_iter()
            .flatten()
            .filter_map(|&id| self.edge(id))
    }

    /// Edges usable from any position.
    pub fn teleports(&self) -> impl Iterator<Item = &TransportEdge> + '_ {
        self.anywhere.iter().filter_map(|&id| self.edge(id))
    }

    /// Every edge whose requirements hold against `world` right now, in id
    /// order.
    pub fn usable<'a, W: WorldState + ?Sized>(
        &'a self,
        world: &'a W,
    ) -> impl Iterator<Item = &'a TransportEdge> + 'a {
        self.edges.iter().filter(move |e| admits(e, world))
    }
}

/// Whether every requirement of `edge` holds against `world`. The first
/// unmet one is traced.
pub(crate) fn admits<W: WorldState + ?Sized>(edge: &TransportEdge, world: &W) -> bool {
    match edge.requirements.first_unmet(world) {
        Some(r) => {
            trace!("skipping {edge}: needs {r}");
            false
        }
        None => true,
    }
}

/// Incrementally assembles a [`TransportGraph`], assigning edge ids in
/// insertion order.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    edges: Vec<TransportEdge>,
}

impl GraphBuilder {
    /// Add an edge and return its id.
    pub fn add(&mut self, mut edge: TransportEdge) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        edge.id = id;
        self.edges.push(edge);
        id
    }

    /// Builder form of [`add`](Self::add).
    pub fn edge(mut self, edge: TransportEdge) -> Self {
        self.add(edge);
        self
    }

    pub fn extend(&mut self, edges: impl IntoIterator<Item = TransportEdge>) {
        for e in edges {
            self.add(e);
        }
    }

    pub fn build(self) -> TransportGraph {
        let mut by_origin: HashMap<Position, Vec<EdgeId>> = HashMap::new();
        let mut anywhere = Vec::new();
        for e in &self.edges {
            match e.origin {
                Some(o) => by_origin.entry(o).or_default().push(e.id),
                None => anywhere.push(e.id),
            }
        }
        TransportGraph {
            edges: self.edges,
            by_origin,
            anywhere,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirement::{Requirement, RequirementSet};
    use crate::testing::FakeWorld;

    fn p(x: i32, y: i32, plane: u8) -> Position {
        Position::new(x, y, plane)
    }

    fn sample() -> TransportGraph {
        TransportGraph::builder()
            .edge(TransportEdge::new("Stairs up", p(2, 2, 0), p(2, 2, 1), 3))
            .edge(TransportEdge::new("Stairs down", p(2, 2, 1), p(2, 2, 0), 3))
            .edge(TransportEdge::new("Trapdoor", p(2, 2, 0), p(9, 9, 2), 4))
            .edge(
                TransportEdge::teleport("Ring of dueling", p(50, 50, 0), 6).with_requirements(
                    RequirementSet::new().with(Requirement::item(2552, 1)),
                ),
            )
            .build()
    }

    #[test]
    fn ids_follow_insertion() {
        let g = sample();
        assert_eq!(g.len(), 4);
        for (i, e) in g.edges().iter().enumerate() {
            assert_eq!(e.id, EdgeId(i as u32));
            assert_eq!(g.edge(e.id), Some(e));
        }
        assert_eq!(g.edge(EdgeId(4)), None);
    }

    #[test]
    fn origin_index() {
        let g = sample();
        let names: Vec<&str> = g.edges_from(p(2, 2, 0)).map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Stairs up", "Trapdoor"]);
        assert_eq!(g.edges_from(p(2, 2, 1)).count(), 1);
        assert_eq!(g.edges_from(p(0, 0, 0)).count(), 0);
        assert_eq!(g.teleports().count(), 1);
        let mut origins: Vec<Position> = g.origins().collect();
        origins.sort_by_key(|o| (o.plane, o.x, o.y));
        assert_eq!(origins, vec![p(2, 2, 0), p(2, 2, 1)]);
    }

    #[test]
    fn usable_reflects_current_state() {
        let g = sample();
        let mut world = FakeWorld::default();
        assert_eq!(g.usable(&world).count(), 3);
        world.items.insert(2552, 1);
        assert_eq!(g.usable(&world).count(), 4);
        world.items.clear();
        assert!(g.usable(&world).all(|e| !e.is_teleport()));
    }
}
