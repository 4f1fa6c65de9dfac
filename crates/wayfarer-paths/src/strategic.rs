use std::collections::HashSet;

use wayfarer_core::{GridSnapshot, Position};

use crate::moves::{Check, MOVES};
use crate::search::{NO_PARENT, PathNode, SearchRange};

/// Tiles a strategic search must never pass through or land on.
///
/// `dangerous` tiles are ones the caller would rather avoid (hazards, enemy
/// reach); `impassable` tiles are treated as if fully obstructed. Both are
/// excluded from the search alike; the distinction is kept for callers that
/// relax one set and not the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Exclusions {
    pub dangerous: HashSet<Position>,
    pub impassable: HashSet<Position>,
}

impl Exclusions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a dangerous tile.
    pub fn with_dangerous(mut self, p: Position) -> Self {
        self.dangerous.insert(p);
        self
    }

    /// Builder: add an impassable tile.
    pub fn with_impassable(mut self, p: Position) -> Self {
        self.impassable.insert(p);
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dangerous.is_empty() && self.impassable.is_empty()
    }

    /// Whether `p` is in either set.
    #[inline]
    pub fn contains(&self, p: Position) -> bool {
        self.dangerous.contains(&p) || self.impassable.contains(&p)
    }

    /// The same exclusions without the dangerous set.
    pub fn impassable_only(&self) -> Self {
        Self {
            dangerous: HashSet::new(),
            impassable: self.impassable.clone(),
        }
    }
}

impl SearchRange {
    /// 24-direction breadth-first search from `start` to the nearest of
    /// `goals`, by move count.
    ///
    /// Besides single steps this tries far (2-tile) cardinal and diagonal
    /// moves and knight-style moves, each validated against the move table.
    /// The returned route leaves out `start`; consecutive entries may be up
    /// to two tiles apart. Returns `None` when `goals` is empty, when `start`
    /// is outside `snapshot`, when no goal lies on the start's plane inside
    /// the snapshot, or when every goal is unreachable.
    pub fn strategic_path(
        &mut self,
        snapshot: &GridSnapshot,
        start: Position,
        goals: &[Position],
        exclusions: &Exclusions,
    ) -> Option<Vec<Position>> {
        if goals.is_empty() || !snapshot.contains(start) {
            return None;
        }
        self.fit(snapshot.area(), start.plane);
        self.begin();
        let generation = self.generation;

        let mut any_goal = false;
        for &g in goals {
            if let Some(i) = self.idx(g) {
                self.goal[i] = generation;
                any_goal = true;
            }
        }
        if !any_goal {
            return None;
        }
        self.exclude(exclusions);

        let si = self.idx(start)?;
        self.visit(si, NO_PARENT, 0);
        self.queue.push_back(si);

        while let Some(ci) = self.queue.pop_front() {
            if self.goal[ci] == generation {
                return Some(self.path_to(ci));
            }
            self.expand(snapshot, start.plane, ci, false);
        }
        None
    }

    /// 24-direction reach map from `from`, up to `max_dist` moves, never
    /// entering `exclusions`. Returns every reached node in BFS order.
    ///
    /// The map is read back with [`local_cost`](Self::local_cost) and
    /// [`local_path_to`](Self::local_path_to), the same as a local reach
    /// map. Reconstructed routes may have entries two tiles apart.
    pub fn strategic_map(
        &mut self,
        snapshot: &GridSnapshot,
        from: Position,
        max_dist: u32,
        exclusions: &Exclusions,
    ) -> &[PathNode] {
        if !snapshot.contains(from) {
            self.begin();
            self.results.clear();
            return &self.results;
        }
        self.fit(snapshot.area(), from.plane);
        self.begin();
        self.results.clear();
        self.exclude(exclusions);

        let Some(si) = self.idx(from) else {
            return &self.results;
        };
        self.visit(si, NO_PARENT, 0);
        self.queue.push_back(si);
        self.results.push(PathNode { pos: from, cost: 0 });

        while let Some(ci) = self.queue.pop_front() {
            if self.cost[ci] >= max_dist {
                continue;
            }
            self.expand(snapshot, from.plane, ci, true);
        }
        &self.results
    }

    fn exclude(&mut self, exclusions: &Exclusions) {
        let generation = self.generation;
        for &p in exclusions.dangerous.iter().chain(exclusions.impassable.iter()) {
            if let Some(i) = self.idx(p) {
                self.excluded[i] = generation;
            }
        }
    }

    /// Visit every legal move out of `ci`, optionally recording the new
    /// nodes in `results`.
    fn expand(&mut self, snapshot: &GridSnapshot, plane: u8, ci: usize, record: bool) {
        let (cx, cy) = self.xy(ci);
        let nd = self.cost[ci] + 1;

        'moves: for mv in MOVES.iter() {
            let Some(ni) = self.idx_xy(cx + mv.dx, cy + mv.dy) else {
                continue;
            };
            if self.visited(ni) || self.excluded[ni] == self.generation {
                continue;
            }
            for &check in mv.checks {
                if !self.passes(snapshot, plane, cx, cy, check) {
                    continue 'moves;
                }
            }
            self.visit(ni, ci as u32, nd);
            self.queue.push_back(ni);
            if record {
                let pos = self.position(ni);
                self.results.push(PathNode { pos, cost: nd });
            }
        }
    }

    #[inline]
    fn passes(&self, snapshot: &GridSnapshot, plane: u8, cx: i32, cy: i32, check: Check) -> bool {
        match check {
            Check::Clear(dx, dy) => match self.idx_xy(cx + dx, cy + dy) {
                Some(i) => self.excluded[i] != self.generation,
                None => true,
            },
            Check::Step(dx, dy, dir) => snapshot.can_move_xy(cx + dx, cy + dy, plane, dir),
        }
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn exclusions_json() {
        let ex = Exclusions::new().with_dangerous(Position::new(1, 2, 0));
        let json = serde_json::to_string(&ex).unwrap();
        let back: Exclusions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ex);
        let partial: Exclusions = serde_json::from_str("{}").unwrap();
        assert!(partial.is_empty());
    }
}
