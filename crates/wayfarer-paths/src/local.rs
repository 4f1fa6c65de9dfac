use wayfarer_core::{Direction, GridSnapshot, Position};

use crate::search::{NO_PARENT, PathNode, SearchRange};
use crate::traits::Pather;

/// Expansion order for local searches. Ties between equally short routes go
/// to whichever predecessor this order discovers first.
pub const LOCAL_DIRECTIONS: [Direction; 8] = [
    Direction::West,
    Direction::East,
    Direction::North,
    Direction::South,
    Direction::NorthWest,
    Direction::NorthEast,
    Direction::SouthWest,
    Direction::SouthEast,
];

/// Single-tile movement over a snapshot, honouring its obstruction rules.
#[derive(Debug, Clone, Copy)]
pub struct LocalMoves<'a> {
    snapshot: &'a GridSnapshot,
}

impl<'a> LocalMoves<'a> {
    pub fn new(snapshot: &'a GridSnapshot) -> Self {
        Self { snapshot }
    }
}

impl Pather for LocalMoves<'_> {
    fn neighbors(&self, p: Position, buf: &mut Vec<Position>) {
        for dir in LOCAL_DIRECTIONS {
            if self.snapshot.can_move(p, dir) {
                let (dx, dy) = dir.delta();
                buf.push(p.shift(dx, dy));
            }
        }
    }
}

impl SearchRange {
    /// Compute a multi-source breadth-first reach map over the current area.
    ///
    /// Each move costs 1 and expansion stops beyond `max_dist`. Returns every
    /// reached node in BFS order. Sources on another plane or outside the
    /// area are skipped.
    pub fn bfs_map<P: Pather>(
        &mut self,
        pather: &P,
        sources: &[Position],
        max_dist: u32,
    ) -> &[PathNode] {
        self.begin();
        self.results.clear();

        for &src in sources {
            let Some(si) = self.idx(src) else {
                continue;
            };
            if self.visited(si) {
                continue;
            }
            self.visit(si, NO_PARENT, 0);
            self.queue.push_back(si);
            self.results.push(PathNode { pos: src, cost: 0 });
        }

        let mut nbuf = std::mem::take(&mut self.nbuf);

        while let Some(ci) = self.queue.pop_front() {
            let nd = self.cost[ci] + 1;
            if nd > max_dist {
                continue;
            }
            let cp = self.position(ci);

            nbuf.clear();
            pather.neighbors(cp, &mut nbuf);

            for &np in nbuf.iter() {
                let Some(ni) = self.idx(np) else {
                    continue;
                };
                if self.visited(ni) {
                    continue;
                }
                self.visit(ni, ci as u32, nd);
                self.queue.push_back(ni);
                self.results.push(PathNode { pos: np, cost: nd });
            }
        }

        self.nbuf = nbuf;
        &self.results
    }

    /// Shortest route from `from` to `to` by move count, using `pather` over
    /// the current area. The result leaves out `from` and ends with `to`.
    pub fn bfs_path<P: Pather>(
        &mut self,
        pather: &P,
        from: Position,
        to: Position,
    ) -> Option<Vec<Position>> {
        let si = self.idx(from)?;
        let gi = self.idx(to)?;
        self.begin();
        self.visit(si, NO_PARENT, 0);
        self.queue.push_back(si);

        let mut nbuf = std::mem::take(&mut self.nbuf);
        let mut found = None;

        'search: while let Some(ci) = self.queue.pop_front() {
            if ci == gi {
                found = Some(ci);
                break 'search;
            }
            let cp = self.position(ci);
            let nd = self.cost[ci] + 1;

            nbuf.clear();
            pather.neighbors(cp, &mut nbuf);

            for &np in nbuf.iter() {
                let Some(ni) = self.idx(np) else {
                    continue;
                };
                if self.visited(ni) {
                    continue;
                }
                self.visit(ni, ci as u32, nd);
                self.queue.push_back(ni);
            }
        }

        self.nbuf = nbuf;
        found.map(|gi| self.path_to(gi))
    }

    // -----------------------------------------------------------------------
    // Snapshot conveniences
    // -----------------------------------------------------------------------

    /// 8-direction shortest route over `snapshot`.
    ///
    /// Returns `None` when `to` cannot be reached inside the snapshot, when
    /// either end lies outside it, or when the ends are on different planes.
    /// Returns an empty route when `from == to`.
    pub fn local_path(
        &mut self,
        snapshot: &GridSnapshot,
        from: Position,
        to: Position,
    ) -> Option<Vec<Position>> {
        if from.plane != to.plane || !snapshot.contains(from) || !snapshot.contains(to) {
            return None;
        }
        self.fit(snapshot.area(), from.plane);
        self.bfs_path(&LocalMoves::new(snapshot), from, to)
    }

    /// 8-direction reach map from `from` over `snapshot`, up to `max_dist`
    /// moves. Follow up with [`local_cost`](Self::local_cost) and
    /// [`local_path_to`](Self::local_path_to).
    pub fn local_map(
        &mut self,
        snapshot: &GridSnapshot,
        from: Position,
        max_dist: u32,
    ) -> &[PathNode] {
        if !snapshot.contains(from) {
            self.begin();
            self.results.clear();
            return &self.results;
        }
        self.fit(snapshot.area(), from.plane);
        self.bfs_map(&LocalMoves::new(snapshot), &[from], max_dist)
    }

    /// Moves needed to reach `p` in the last reach map, local or strategic,
    /// if it was reached.
    pub fn local_cost(&self, p: Position) -> Option<u32> {
        let i = self.idx(p)?;
        self.visited(i).then(|| self.cost[i])
    }

    /// Route to `p` reconstructed from the last reach map.
    pub fn local_path_to(&self, p: Position) -> Option<Vec<Position>> {
        let i = self.idx(p)?;
        self.visited(i).then(|| self.path_to(i))
    }
}
