//! Route composition: weighing transport edges against walking.

use std::collections::HashSet;

use log::{debug, trace};
use wayfarer_core::{GridSnapshot, Position};
use wayfarer_paths::{Exclusions, SearchRange, chebyshev};

use crate::config::ComposerConfig;
use crate::context::NavContext;
use crate::error::NavError;
use crate::graph::{TransportGraph, admits};
use crate::route::Route;
use crate::transport::{EdgeId, TransportEdge};
use crate::world::WorldState;

/// Distance still to cover from `p` to `goal`, charging `plane_penalty` per
/// plane of difference.
pub fn remaining(p: Position, goal: Position, plane_penalty: u32) -> u32 {
    chebyshev(p, goal) as u32 + plane_penalty * p.plane.abs_diff(goal.plane) as u32
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    estimate: u32,
    edge: EdgeId,
    board: Position,
}

/// Read-only inputs of one composition.
struct Composition<'a, W: ?Sized> {
    graph: &'a TransportGraph,
    snapshot: &'a GridSnapshot,
    exclusions: &'a Exclusions,
    config: ComposerConfig,
    world: &'a W,
    start: Position,
    goals: &'a [Position],
}

impl<W: WorldState + ?Sized> Composition<'_, W> {
    /// Distance from `p` to the closest goal.
    fn remaining(&self, p: Position) -> u32 {
        let penalty = self.config.plane_penalty;
        self.goals
            .iter()
            .map(|&g| remaining(p, g, penalty))
            .min()
            .unwrap_or(u32::MAX)
    }

    /// Tiles that count as reaching a goal, with the tolerance they imply.
    ///
    /// A blocked goal is replaced by the walkable tiles within `goal_radius`
    /// of it, or failing that by the nearest walkable tile within
    /// `snap_radius`.
    fn goal_tiles(&self) -> (Vec<Position>, u32) {
        let mut tiles = Vec::new();
        let mut tolerance = 0;
        for &goal in self.goals {
            if !self.snapshot.contains(goal) || self.snapshot.is_walkable(goal) {
                tiles.push(goal);
                continue;
            }
            let r = self.config.goal_radius as i32;
            let before = tiles.len();
            tiles.extend(
                (-r..=r)
                    .flat_map(|dy| (-r..=r).map(move |dx| goal.shift(dx, dy)))
                    .filter(|&p| self.snapshot.is_walkable(p)),
            );
            if tiles.len() > before {
                tolerance = tolerance.max(self.config.goal_radius);
                continue;
            }
            match self.snapshot.nearest_walkable(goal, self.config.snap_radius as i32) {
                Some(near) => {
                    debug!("goal {goal} is blocked, heading for {near}");
                    tiles.push(near);
                    tolerance = tolerance.max(chebyshev(goal, near) as u32);
                }
                None => debug!("goal {goal} is blocked with nothing walkable nearby"),
            }
        }
        (tiles, tolerance)
    }

    /// Walk from the start to the nearest of `targets`.
    fn walk(&self, search: &mut SearchRange, targets: &[Position]) -> Option<Vec<Position>> {
        if !self.exclusions.is_empty() {
            return search.strategic_path(self.snapshot, self.start, targets, self.exclusions);
        }
        match targets {
            [] => None,
            [target] => search.local_path(self.snapshot, self.start, *target),
            _ => {
                search.local_map(self.snapshot, self.start, u32::MAX);
                let (_, nearest) = targets
                    .iter()
                    .filter_map(|&t| search.local_cost(t).map(|c| (c, t)))
                    .min_by_key(|&(c, _)| c)?;
                search.local_path_to(nearest)
            }
        }
    }

    /// Edges worth weighing: teleports, and edges whose origin could be
    /// inside the reach map from the start.
    fn nearby(&self) -> impl Iterator<Item = &TransportEdge> + '_ {
        let start = self.start;
        let graph = self.graph;
        // strategic moves cover up to two tiles each
        let stride = if self.exclusions.is_empty() { 1 } else { 2 };
        let reach = self.config.max_edge_walk.saturating_mul(stride);
        let fixed = graph
            .origins()
            .filter(move |o| o.plane == start.plane)
            .flat_map(move |o| graph.edges_from(o))
            .filter(move |e| {
                e.origin.is_some_and(|o| {
                    chebyshev(o, start) as u32 <= reach.saturating_add(e.origin_radius)
                })
            });
        graph.teleports().chain(fixed)
    }

    /// Eligible edges, cheapest first, ties broken by id. Leaves the reach
    /// map from the start in `search`.
    fn candidates(
        &self,
        search: &mut SearchRange,
        ridden: &HashSet<EdgeId>,
        direct: Option<u32>,
    ) -> Vec<Candidate> {
        let here = self.remaining(self.start);
        let max = self.config.max_edge_walk;
        if self.exclusions.is_empty() {
            search.local_map(self.snapshot, self.start, max);
        } else {
            search.strategic_map(self.snapshot, self.start, max, self.exclusions);
        }

        let mut out = Vec::new();
        for edge in self.nearby() {
            if ridden.contains(&edge.id) {
                trace!("skipping {edge}: already ridden");
                continue;
            }
            if !admits(edge, self.world) {
                continue;
            }
            let there = self.remaining(edge.destination);
            if there >= here {
                continue;
            }
            let (walk, board) = match edge.origin {
                None => {
                    if here - there < self.config.teleport_min_gain {
                        trace!("skipping {edge}: gains only {}", here - there);
                        continue;
                    }
                    (0, self.start)
                }
                Some(origin) => match boarding_tile(search, origin, edge.origin_radius) {
                    Some(b) => b,
                    None => {
                        trace!("skipping {edge}: origin out of walking reach");
                        continue;
                    }
                },
            };
            let estimate = walk + edge.cost + there;
            if direct.is_some_and(|d| estimate >= d) {
                trace!("skipping {edge}: estimate {estimate} does not beat walking");
                continue;
            }
            out.push(Candidate {
                estimate,
                edge: edge.id,
                board,
            });
        }
        out.sort_by_key(|c| (c.estimate, c.edge));
        out
    }
}

/// Cheapest reached tile within `radius` of `origin` in the last reach map.
fn boarding_tile(search: &SearchRange, origin: Position, radius: u32) -> Option<(u32, Position)> {
    let r = radius as i32;
    let mut best: Option<(u32, Position)> = None;
    for dy in -r..=r {
        for dx in -r..=r {
            let p = origin.shift(dx, dy);
            let Some(c) = search.local_cost(p) else {
                continue;
            };
            if best.is_none_or(|(bc, _)| c < bc) {
                best = Some((c, p));
            }
        }
    }
    best
}

impl NavContext {
    /// Compose a route from `start` to `goal` over the current snapshot.
    ///
    /// Every edge whose requirements hold right now is weighed by
    /// walk-to-origin + cost + remaining distance; the cheapest one is used
    /// only if it beats walking directly. A route through an edge stops right
    /// after it, the rest is composed again once the agent has been carried
    /// across. Edges in `ridden` are never picked.
    pub fn compose<W: WorldState + ?Sized>(
        &mut self,
        world: &W,
        start: Position,
        goal: Position,
        ridden: &HashSet<EdgeId>,
    ) -> Result<Route, NavError> {
        self.compose_any(world, start, &[goal], ridden)
    }

    /// Like [`compose`](Self::compose), but any of `goals` will do. Walking
    /// heads for the nearest reachable one and edges are weighed by their
    /// distance to the closest.
    pub fn compose_any<W: WorldState + ?Sized>(
        &mut self,
        world: &W,
        start: Position,
        goals: &[Position],
        ridden: &HashSet<EdgeId>,
    ) -> Result<Route, NavError> {
        let Some(&goal) = goals.first() else {
            return Err(NavError::NoGoal);
        };
        let route = || Route::new(goal).with_goals(goals.iter().copied());
        if goals.contains(&start) {
            return Ok(route());
        }
        let NavContext {
            graph,
            snapshot,
            search,
            exclusions,
            config,
        } = self;
        let snapshot = snapshot.as_ref().ok_or(NavError::NoSnapshot(start))?;
        let comp = Composition {
            graph: &**graph,
            snapshot,
            exclusions,
            config: config.composer,
            world,
            start,
            goals,
        };

        let (targets, tolerance) = comp.goal_tiles();
        let direct = comp.walk(search, &targets);
        let direct_len = direct.as_ref().map(|p| p.len() as u32);

        for c in comp.candidates(search, ridden, direct_len) {
            let steps = if c.board == start {
                Some(Vec::new())
            } else {
                search.local_path_to(c.board)
            };
            let Some(steps) = steps else {
                trace!("skipping {}: no walk to {}", c.edge, c.board);
                continue;
            };
            debug!(
                "route {start} -> {goal}: {} steps to {}, then edge {} (estimate {})",
                steps.len(),
                c.board,
                c.edge,
                c.estimate
            );
            let mut route = route().with_tolerance(tolerance);
            route.push_walks(steps);
            route.push_transport(c.edge);
            return Ok(route);
        }

        match direct {
            Some(steps) => {
                debug!("route {start} -> {goal}: walk {} steps", steps.len());
                let mut route = route().with_tolerance(tolerance);
                route.push_walks(steps);
                Ok(route)
            }
            None => {
                debug!("no route {start} -> {goal}");
                Err(NavError::NoPathFound { start, goal })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::NavConfig;
    use crate::requirement::{Requirement, RequirementSet};
    use crate::route::Leg;
    use crate::testing::FakeWorld;
    use crate::transport::TransportEdge;
    use wayfarer_core::Chart;

    const COINS: u32 = 995;

    fn p(x: i32, y: i32, plane: u8) -> Position {
        Position::new(x, y, plane)
    }

    // Row y=3 is a wall with a single gap at x=8, so walking from one side
    // to the other means going around.
    const WALLED: &str = "\
.........
########.
.........
.........
.........";

    fn context(chart: &str, edges: Vec<TransportEdge>) -> NavContext {
        let chart = Chart::new(chart).unwrap();
        let mut b = TransportGraph::builder();
        b.extend(edges);
        let mut ctx = NavContext::new(Arc::new(b.build()), NavConfig::default());
        ctx.set_snapshot(chart.snapshot(p(0, 0, 0)).unwrap());
        ctx
    }

    fn shortcut(cost: u32) -> TransportEdge {
        TransportEdge::new("Wall climb", p(0, 2, 0), p(0, 4, 0), cost)
            .with_requirements(RequirementSet::new().with(Requirement::item(COINS, 30)))
    }

    fn walks(route: &Route) -> Vec<Position> {
        route.walk_run().collect()
    }

    #[test]
    fn already_there() {
        let mut ctx = context(".", vec![]);
        let world = FakeWorld::default();
        let r = ctx.compose(&world, p(0, 0, 0), p(0, 0, 0), &HashSet::new()).unwrap();
        assert!(r.is_empty());
    }

    #[test]
    fn needs_snapshot() {
        let mut ctx = NavContext::new(Arc::new(TransportGraph::default()), NavConfig::default());
        let world = FakeWorld::default();
        assert_eq!(
            ctx.compose(&world, p(0, 0, 0), p(1, 0, 0), &HashSet::new()),
            Err(NavError::NoSnapshot(p(0, 0, 0)))
        );
    }

    #[test]
    fn plain_walk() {
        let mut ctx = context(WALLED, vec![]);
        let world = FakeWorld::default();
        let r = ctx.compose(&world, p(0, 2, 0), p(0, 4, 0), &HashSet::new()).unwrap();
        assert_eq!(r.len(), 18);
        assert_eq!(r.transports().count(), 0);
        assert_eq!(walks(&r).last(), Some(&p(0, 4, 0)));
        assert_eq!(r.tolerance(), 0);
    }

    #[test]
    fn unmet_requirement_falls_back_to_walking() {
        let mut ctx = context(WALLED, vec![shortcut(2)]);
        let mut world = FakeWorld::default();
        let r = ctx.compose(&world, p(0, 2, 0), p(0, 4, 0), &HashSet::new()).unwrap();
        assert_eq!(r.transports().count(), 0);
        assert_eq!(r.len(), 18);

        world.items.insert(COINS, 30);
        let r = ctx.compose(&world, p(0, 2, 0), p(0, 4, 0), &HashSet::new()).unwrap();
        assert_eq!(r.legs().copied().collect::<Vec<_>>(), vec![Leg::Transport(EdgeId(0))]);
    }

    #[test]
    fn unmet_requirement_without_walk_is_no_path() {
        let stairs = TransportEdge::new("Stairs", p(0, 0, 0), p(0, 0, 1), 3)
            .with_requirements(RequirementSet::new().with(Requirement::item(COINS, 30)));
        let mut ctx = context("...\n...\n\n...\n...", vec![stairs]);
        let mut world = FakeWorld::default();
        let start = p(2, 0, 0);
        let goal = p(2, 1, 1);
        assert_eq!(
            ctx.compose(&world, start, goal, &HashSet::new()),
            Err(NavError::NoPathFound { start, goal })
        );

        world.items.insert(COINS, 30);
        let r = ctx.compose(&world, start, goal, &HashSet::new()).unwrap();
        assert_eq!(
            r.legs().copied().collect::<Vec<_>>(),
            vec![
                Leg::Walk(p(1, 0, 0)),
                Leg::Walk(p(0, 0, 0)),
                Leg::Transport(EdgeId(0))
            ]
        );
    }

    #[test]
    fn edge_must_beat_walking() {
        let mut ctx = context(WALLED, vec![shortcut(18)]);
        let mut world = FakeWorld::default();
        world.items.insert(COINS, 30);
        let r = ctx.compose(&world, p(0, 2, 0), p(0, 4, 0), &HashSet::new()).unwrap();
        assert_eq!(r.transports().count(), 0);

        let mut ctx = context(WALLED, vec![shortcut(17)]);
        let r = ctx.compose(&world, p(0, 2, 0), p(0, 4, 0), &HashSet::new()).unwrap();
        assert_eq!(r.transports().collect::<Vec<_>>(), vec![EdgeId(0)]);
    }

    #[test]
    fn ties_go_to_lowest_id() {
        let mut ctx = context(WALLED, vec![shortcut(4), shortcut(3), shortcut(3)]);
        let mut world = FakeWorld::default();
        world.items.insert(COINS, 30);
        let r = ctx.compose(&world, p(0, 2, 0), p(0, 4, 0), &HashSet::new()).unwrap();
        assert_eq!(r.transports().collect::<Vec<_>>(), vec![EdgeId(1)]);
    }

    #[test]
    fn ridden_edges_are_skipped() {
        let mut ctx = context(WALLED, vec![shortcut(2)]);
        let mut world = FakeWorld::default();
        world.items.insert(COINS, 30);
        let ridden = HashSet::from([EdgeId(0)]);
        let r = ctx.compose(&world, p(0, 2, 0), p(0, 4, 0), &ridden).unwrap();
        assert_eq!(r.transports().count(), 0);
    }

    #[test]
    fn origin_radius_boards_nearby() {
        let ladder = TransportEdge::new("Ladder", p(4, 0, 0), p(4, 0, 1), 2).with_origin_radius(1);
        let mut ctx = context(".....\n\n.....", vec![ladder]);
        let world = FakeWorld::default();
        let r = ctx.compose(&world, p(0, 0, 0), p(4, 0, 1), &HashSet::new()).unwrap();
        assert_eq!(walks(&r), vec![p(1, 0, 0), p(2, 0, 0), p(3, 0, 0)]);
        assert_eq!(r.front(), Some(Leg::Walk(p(1, 0, 0))));
        assert_eq!(r.transports().collect::<Vec<_>>(), vec![EdgeId(0)]);
    }

    #[test]
    fn origin_beyond_walking_reach_is_ignored() {
        let ladder = TransportEdge::new("Ladder", p(4, 0, 0), p(4, 0, 1), 2);
        let mut ctx = context(".....\n\n.....", vec![ladder]);
        ctx.config.composer.max_edge_walk = 3;
        let world = FakeWorld::default();
        let start = p(0, 0, 0);
        let goal = p(4, 0, 1);
        assert_eq!(
            ctx.compose(&world, start, goal, &HashSet::new()),
            Err(NavError::NoPathFound { start, goal })
        );
    }

    #[test]
    fn teleports_need_enough_gain() {
        let world = FakeWorld::default();
        let start = p(0, 0, 0);
        let goal = p(100, 100, 0);

        let mut ctx = context("...", vec![TransportEdge::teleport("Tab", p(10, 10, 0), 5)]);
        assert_eq!(
            ctx.compose(&world, start, goal, &HashSet::new()),
            Err(NavError::NoPathFound { start, goal })
        );

        let mut ctx = context("...", vec![TransportEdge::teleport("Tab", p(95, 95, 0), 5)]);
        let r = ctx.compose(&world, start, goal, &HashSet::new()).unwrap();
        assert_eq!(r.legs().copied().collect::<Vec<_>>(), vec![Leg::Transport(EdgeId(0))]);
    }

    #[test]
    fn edges_that_do_not_get_closer_are_ignored() {
        let world = FakeWorld::default();
        let start = p(0, 0, 0);
        let goal = p(100, 0, 0);
        let mut ctx = context("...", vec![TransportEdge::teleport("Away", p(0, 100, 0), 1)]);
        assert!(ctx.compose(&world, start, goal, &HashSet::new()).is_err());
    }

    #[test]
    fn blocked_goal_accepts_neighbours() {
        let mut ctx = context(".....\n..#..\n.....", vec![]);
        let world = FakeWorld::default();
        let r = ctx.compose(&world, p(0, 1, 0), p(2, 1, 0), &HashSet::new()).unwrap();
        assert_eq!(r.tolerance(), 1);
        assert_eq!(walks(&r), vec![p(1, 0, 0)]);
        assert!(r.is_arrival(p(1, 0, 0), 0));

        // with no ring to fall back on, the nearest walkable tile stands in
        ctx.config.composer.goal_radius = 0;
        let r = ctx.compose(&world, p(0, 1, 0), p(2, 1, 0), &HashSet::new()).unwrap();
        assert_eq!(r.tolerance(), 1);
        assert_eq!(r.len(), 2);
        assert_eq!(walks(&r).last(), Some(&p(2, 0, 0)));
    }

    const BUNKER: &str = "\
.....
.###.
.###.
.###.
.....";

    #[test]
    fn buried_goal_snaps_to_nearest_walkable() {
        let mut ctx = context(BUNKER, vec![]);
        let world = FakeWorld::default();
        let start = p(0, 0, 0);
        let goal = p(2, 2, 0);
        let r = ctx.compose(&world, start, goal, &HashSet::new()).unwrap();
        assert_eq!(walks(&r), vec![p(1, 0, 0), p(2, 0, 0)]);
        assert_eq!(r.tolerance(), 2);
        assert_eq!(r.goal(), goal);
        assert!(r.is_arrival(p(2, 0, 0), 0));

        ctx.config.composer.snap_radius = 1;
        assert_eq!(
            ctx.compose(&world, start, goal, &HashSet::new()),
            Err(NavError::NoPathFound { start, goal })
        );
    }

    #[test]
    fn nearest_of_several_goals() {
        let mut ctx = context("..........", vec![]);
        let world = FakeWorld::default();
        let goals = [p(0, 0, 0), p(9, 0, 0), p(7, 0, 0)];
        let r = ctx.compose_any(&world, p(5, 0, 0), &goals, &HashSet::new()).unwrap();
        assert_eq!(walks(&r), vec![p(6, 0, 0), p(7, 0, 0)]);
        assert_eq!(r.goal(), p(0, 0, 0));
        assert_eq!(r.goals(), &goals);

        let r = ctx.compose_any(&world, p(9, 0, 0), &goals, &HashSet::new()).unwrap();
        assert!(r.is_empty());
        assert_eq!(
            ctx.compose_any(&world, p(5, 0, 0), &[], &HashSet::new()),
            Err(NavError::NoGoal)
        );
    }

    #[test]
    fn edges_are_weighed_against_the_closest_goal() {
        let mut ctx = context(WALLED, vec![shortcut(2)]);
        let mut world = FakeWorld::default();
        world.items.insert(COINS, 30);
        let start = p(0, 2, 0);
        let r = ctx.compose_any(&world, start, &[p(0, 4, 0), p(1, 1, 0)], &HashSet::new()).unwrap();
        assert_eq!(r.transports().count(), 0);
        assert_eq!(walks(&r), vec![p(1, 1, 0)]);

        let r = ctx.compose_any(&world, start, &[p(0, 4, 0), p(8, 0, 0)], &HashSet::new()).unwrap();
        assert_eq!(r.transports().collect::<Vec<_>>(), vec![EdgeId(0)]);
    }

    #[test]
    fn far_origins_are_not_considered() {
        let ladder = TransportEdge::new("Ladder", p(4, 0, 0), p(4, 0, 1), 2).with_origin_radius(1);
        let other_floor = TransportEdge::new("Trapdoor", p(1, 0, 1), p(1, 0, 0), 2);
        let mut ctx = context(".....\n\n.....", vec![ladder, other_floor]);
        ctx.config.composer.max_edge_walk = 3;
        let world = FakeWorld::default();
        let comp = Composition {
            graph: &**ctx.graph(),
            snapshot: ctx.snapshot().unwrap(),
            exclusions: &Exclusions::new(),
            config: ctx.config.composer,
            world: &world,
            start: p(0, 0, 0),
            goals: &[p(4, 0, 1)],
        };
        let ids: Vec<EdgeId> = comp.nearby().map(|e| e.id).collect();
        assert_eq!(ids, vec![EdgeId(0)]);

        let comp = Composition {
            config: ComposerConfig {
                max_edge_walk: 2,
                ..ctx.config.composer
            },
            ..comp
        };
        assert_eq!(comp.nearby().count(), 0);
    }

    #[test]
    fn boarding_costs_respect_exclusions() {
        let ladder = TransportEdge::new("Ladder", p(3, 0, 0), p(3, 0, 1), 2).with_origin_radius(1);
        let mut ctx = context(".....\n.....\n\n.....\n.....", vec![ladder]);
        let world = FakeWorld::default();
        let danger = p(2, 0, 0);
        ctx.set_exclusions(Exclusions::new().with_dangerous(danger));

        let r = ctx.compose(&world, p(0, 0, 0), p(4, 0, 1), &HashSet::new()).unwrap();
        assert_eq!(r.transports().collect::<Vec<_>>(), vec![EdgeId(0)]);
        let steps = walks(&r);
        assert!(!steps.contains(&danger));
        let board = steps.last().copied().unwrap_or(p(0, 0, 0));
        assert!(chebyshev(board, p(3, 0, 0)) <= 1, "boards at {board}");
    }

    #[test]
    fn exclusions_switch_to_strategic_walks() {
        let mut ctx = context(".....", vec![]);
        let world = FakeWorld::default();
        let r = ctx.compose(&world, p(0, 0, 0), p(4, 0, 0), &HashSet::new()).unwrap();
        assert_eq!(r.len(), 4);

        ctx.set_exclusions(Exclusions::new().with_dangerous(p(9, 9, 0)));
        let r = ctx.compose(&world, p(0, 0, 0), p(4, 0, 0), &HashSet::new()).unwrap();
        assert_eq!(walks(&r), vec![p(2, 0, 0), p(4, 0, 0)]);
    }

    #[test]
    fn remaining_charges_planes() {
        assert_eq!(remaining(p(0, 0, 0), p(3, 1, 0), 8), 3);
        assert_eq!(remaining(p(0, 0, 0), p(3, 1, 2), 8), 19);
    }
}
