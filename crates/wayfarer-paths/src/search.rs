use std::collections::VecDeque;

use wayfarer_core::{Area, Position};

/// A position with the number of moves needed to reach it, returned from
/// reach-map queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathNode {
    pub pos: Position,
    pub cost: u32,
}

pub(crate) const NO_PARENT: u32 = u32::MAX;

// ---------------------------------------------------------------------------
// SearchRange
// ---------------------------------------------------------------------------

/// Scratch space for breadth-first searches over one rectangular area.
///
/// `SearchRange` owns the visited stamps, predecessor links, exclusion and
/// goal marks, and the FIFO frontier. Every search bumps a generation counter
/// instead of clearing the arrays, so repeated queries over the same area do
/// not allocate after the first one.
#[derive(Debug)]
pub struct SearchRange {
    pub(crate) area: Area,
    pub(crate) plane: u8,
    pub(crate) width: usize,
    pub(crate) generation: u32,
    pub(crate) seen: Vec<u32>,
    pub(crate) parent: Vec<u32>,
    pub(crate) cost: Vec<u32>,
    pub(crate) excluded: Vec<u32>,
    pub(crate) goal: Vec<u32>,
    pub(crate) queue: VecDeque<usize>,
    pub(crate) results: Vec<PathNode>,
    // shared scratch buffer for neighbor queries
    pub(crate) nbuf: Vec<Position>,
}

impl SearchRange {
    /// Create scratch space for `area` on `plane`.
    pub fn new(area: Area, plane: u8) -> Self {
        let len = area.len();
        Self {
            area,
            plane,
            width: area.width() as usize,
            generation: 0,
            seen: vec![0; len],
            parent: vec![NO_PARENT; len],
            cost: vec![0; len],
            excluded: vec![0; len],
            goal: vec![0; len],
            queue: VecDeque::new(),
            results: Vec::new(),
            nbuf: Vec::with_capacity(8),
        }
    }

    /// Point the range at a new area and plane.
    ///
    /// Buffers are only reallocated when the new area needs more tiles than
    /// are already available.
    pub fn set_area(&mut self, area: Area, plane: u8) {
        let len = area.len();
        self.area = area;
        self.plane = plane;
        self.width = area.width() as usize;
        self.results.clear();
        if len <= self.seen.len() {
            self.begin();
            return;
        }
        self.seen.clear();
        self.seen.resize(len, 0);
        self.parent.resize(len, NO_PARENT);
        self.cost.resize(len, 0);
        self.excluded.clear();
        self.excluded.resize(len, 0);
        self.goal.clear();
        self.goal.resize(len, 0);
        self.generation = 0;
    }

    /// The area currently covered.
    #[inline]
    pub fn area(&self) -> Area {
        self.area
    }

    /// The plane searches currently run on.
    #[inline]
    pub fn plane(&self) -> u8 {
        self.plane
    }

    /// Retarget only when the area or plane actually changed.
    pub(crate) fn fit(&mut self, area: Area, plane: u8) {
        if self.area != area || self.plane != plane {
            self.set_area(area, plane);
        }
    }

    /// Start a new search, invalidating every stamp from previous ones.
    pub(crate) fn begin(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            self.seen.fill(0);
            self.excluded.fill(0);
            self.goal.fill(0);
            self.generation = 1;
        }
        self.queue.clear();
    }

    // -----------------------------------------------------------------------
    // Coordinate helpers
    // -----------------------------------------------------------------------

    /// Convert a position to a flat index. Returns `None` if it lies outside
    /// the area or on another plane.
    #[inline]
    pub(crate) fn idx(&self, p: Position) -> Option<usize> {
        if p.plane != self.plane {
            return None;
        }
        self.idx_xy(p.x, p.y)
    }

    #[inline]
    pub(crate) fn idx_xy(&self, x: i32, y: i32) -> Option<usize> {
        if !self.area.contains_xy(x, y) {
            return None;
        }
        let col = (x - self.area.x0) as usize;
        let row = (y - self.area.y0) as usize;
        Some(row * self.width + col)
    }

    #[inline]
    pub(crate) fn xy(&self, idx: usize) -> (i32, i32) {
        (
            (idx % self.width) as i32 + self.area.x0,
            (idx / self.width) as i32 + self.area.y0,
        )
    }

    #[inline]
    pub(crate) fn position(&self, idx: usize) -> Position {
        let (x, y) = self.xy(idx);
        Position::new(x, y, self.plane)
    }

    /// Mark `idx` visited in the current generation.
    #[inline]
    pub(crate) fn visit(&mut self, idx: usize, parent: u32, cost: u32) {
        self.seen[idx] = self.generation;
        self.parent[idx] = parent;
        self.cost[idx] = cost;
    }

    #[inline]
    pub(crate) fn visited(&self, idx: usize) -> bool {
        self.generation != 0 && self.seen[idx] == self.generation
    }

    /// Follow predecessor links back from `idx`. The root of the search is
    /// left out, `idx` itself is the last element.
    pub(crate) fn path_to(&self, idx: usize) -> Vec<Position> {
        let mut path = Vec::new();
        let mut cur = idx;
        while self.parent[cur] != NO_PARENT {
            path.push(self.position(cur));
            cur = self.parent[cur] as usize;
        }
        path.reverse();
        path
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn path_node_json() {
        let n = PathNode {
            pos: Position::new(4, 5, 1),
            cost: 3,
        };
        let json = serde_json::to_string(&n).unwrap();
        let back: PathNode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, n);
    }
}
