use std::collections::VecDeque;

use wayfarer_core::Position;
use wayfarer_paths::chebyshev;

use crate::transport::EdgeId;

/// One leg of a route.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Leg {
    /// Walk onto this tile.
    Walk(Position),
    /// Use this transport edge.
    Transport(EdgeId),
}

/// An ordered plan of walking steps and transport edges toward one of a set
/// of goals.
///
/// Routes are consumed from the front while executing. An empty route means
/// the composer considered the agent already there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    /// Never empty; the first entry is the primary goal.
    goals: Vec<Position>,
    tolerance: u32,
    legs: VecDeque<Leg>,
}

impl Route {
    pub fn new(goal: Position) -> Self {
        Self {
            goals: vec![goal],
            tolerance: 0,
            legs: VecDeque::new(),
        }
    }

    /// Also accept arrival at any of `goals`.
    pub fn with_goals(mut self, goals: impl IntoIterator<Item = Position>) -> Self {
        for g in goals {
            if !self.goals.contains(&g) {
                self.goals.push(g);
            }
        }
        self
    }

    /// Accept arrival within a Chebyshev distance `tolerance` of any goal.
    pub fn with_tolerance(mut self, tolerance: u32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn push_walk(&mut self, p: Position) {
        self.legs.push_back(Leg::Walk(p));
    }

    pub fn push_walks(&mut self, steps: impl IntoIterator<Item = Position>) {
        self.legs.extend(steps.into_iter().map(Leg::Walk));
    }

    pub fn push_transport(&mut self, id: EdgeId) {
        self.legs.push_back(Leg::Transport(id));
    }

    pub fn goal(&self) -> Position {
        self.goals[0]
    }

    pub fn goals(&self) -> &[Position] {
        &self.goals
    }

    pub fn tolerance(&self) -> u32 {
        self.tolerance
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn legs(&self) -> impl Iterator<Item = &Leg> {
        self.legs.iter()
    }

    pub fn front(&self) -> Option<Leg> {
        self.legs.front().copied()
    }

    pub fn pop_front(&mut self) -> Option<Leg> {
        self.legs.pop_front()
    }

    /// Transport edges used, in order.
    pub fn transports(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.legs.iter().filter_map(|l| match l {
            Leg::Transport(id) => Some(*id),
            Leg::Walk(_) => None,
        })
    }

    /// The walking steps before the next transport edge.
    pub fn walk_run(&self) -> impl Iterator<Item = Position> + '_ {
        self.legs.iter().map_while(|l| match l {
            Leg::Walk(p) => Some(*p),
            Leg::Transport(_) => None,
        })
    }

    /// Drop the leading walking steps up to and including the last one equal
    /// to `p`. Returns how many were dropped.
    pub fn skip_reached(&mut self, p: Position) -> usize {
        let Some(i) = self
            .walk_run()
            .enumerate()
            .filter(|&(_, q)| q == p)
            .map(|(i, _)| i)
            .last()
        else {
            return 0;
        };
        self.legs.drain(..=i);
        i + 1
    }

    /// Whether `p` is close enough to any goal, allowing `slack` on top of
    /// the route's own tolerance.
    pub fn is_arrival(&self, p: Position, slack: u32) -> bool {
        let reach = self.tolerance.max(slack) as i32;
        self.goals
            .iter()
            .any(|g| p.plane == g.plane && chebyshev(p, *g) <= reach)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y, 0)
    }

    #[test]
    fn walk_run_stops_at_transport() {
        let mut r = Route::new(p(9, 9));
        r.push_walks([p(1, 0), p(2, 0)]);
        r.push_transport(EdgeId(3));
        r.push_walk(p(9, 9));
        assert_eq!(r.walk_run().collect::<Vec<_>>(), vec![p(1, 0), p(2, 0)]);
        assert_eq!(r.transports().collect::<Vec<_>>(), vec![EdgeId(3)]);
        assert_eq!(r.len(), 4);
    }

    #[test]
    fn skip_reached_drops_prefix() {
        let mut r = Route::new(p(4, 0));
        r.push_walks([p(1, 0), p(2, 0), p(3, 0), p(4, 0)]);
        assert_eq!(r.skip_reached(p(0, 5)), 0);
        assert_eq!(r.skip_reached(p(2, 0)), 2);
        assert_eq!(r.front(), Some(Leg::Walk(p(3, 0))));
        assert_eq!(r.skip_reached(p(4, 0)), 2);
        assert!(r.is_empty());
    }

    #[test]
    fn skip_reached_ignores_steps_past_transport() {
        let mut r = Route::new(p(4, 0));
        r.push_walk(p(1, 0));
        r.push_transport(EdgeId(0));
        r.push_walk(p(5, 5));
        assert_eq!(r.skip_reached(p(5, 5)), 0);
        assert_eq!(r.skip_reached(p(1, 0)), 1);
        assert_eq!(r.front(), Some(Leg::Transport(EdgeId(0))));
    }

    #[test]
    fn arrival_tolerance() {
        let r = Route::new(p(5, 5)).with_tolerance(1);
        assert!(r.is_arrival(p(6, 6), 0));
        assert!(!r.is_arrival(p(7, 5), 0));
        assert!(r.is_arrival(p(7, 5), 2));
        assert!(!r.is_arrival(Position::new(5, 5, 1), 3));
    }

    #[test]
    fn any_goal_counts_as_arrival() {
        let r = Route::new(p(0, 0)).with_goals([p(9, 9), p(0, 0), Position::new(3, 3, 1)]);
        assert_eq!(r.goal(), p(0, 0));
        assert_eq!(r.goals().len(), 3);
        assert!(r.is_arrival(p(9, 9), 0));
        assert!(r.is_arrival(Position::new(3, 3, 1), 0));
        assert!(!r.is_arrival(p(3, 3), 0));
        assert!(!r.is_arrival(p(8, 9), 0));
        assert!(r.is_arrival(p(8, 9), 1));
    }
}
