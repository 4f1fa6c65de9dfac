//! Captured obstruction data for a bounded region of the world.
//!
//! A [`GridSnapshot`] is a dense, plane-indexed array of [`CollisionFlags`]
//! covering one rectangular [`Area`]. Searches borrow it immutably, so it
//! cannot change while a search is running. Tiles outside the snapshot read
//! as fully blocked.

use crate::direction::Direction;
use crate::flags::CollisionFlags;
use crate::position::{Area, Position};

/// Errors raised when assembling a snapshot from raw data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// The flag buffer does not match `area.len() * planes`.
    #[error("snapshot: expected {expected} flag entries, got {found}")]
    FlagCount { expected: usize, found: usize },
    /// The area or plane count is zero.
    #[error("snapshot: empty region {area} with {planes} plane(s)")]
    Empty { area: Area, planes: u8 },
}

/// Obstruction flags for a bounded, plane-indexed region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSnapshot {
    area: Area,
    planes: u8,
    width: usize,
    flags: Vec<CollisionFlags>,
}

impl GridSnapshot {
    /// An all-open snapshot over `area` on planes `0..planes`.
    pub fn new(area: Area, planes: u8) -> Self {
        Self {
            area,
            planes,
            width: area.width() as usize,
            flags: vec![CollisionFlags::OPEN; area.len() * planes as usize],
        }
    }

    /// Wrap a flag buffer laid out plane by plane, then row by row from the
    /// south edge.
    pub fn from_flags(
        area: Area,
        planes: u8,
        flags: Vec<CollisionFlags>,
    ) -> Result<Self, SnapshotError> {
        if area.is_empty() || planes == 0 {
            return Err(SnapshotError::Empty { area, planes });
        }
        let expected = area.len() * planes as usize;
        if flags.len() != expected {
            return Err(SnapshotError::FlagCount {
                expected,
                found: flags.len(),
            });
        }
        Ok(Self {
            area,
            planes,
            width: area.width() as usize,
            flags,
        })
    }

    /// The covered columns and rows.
    #[inline]
    pub fn area(&self) -> Area {
        self.area
    }

    /// Number of planes captured, starting at plane 0.
    #[inline]
    pub fn planes(&self) -> u8 {
        self.planes
    }

    #[inline]
    pub fn contains(&self, p: Position) -> bool {
        p.plane < self.planes && self.area.contains(p)
    }

    /// Flat index of `p`, or `None` outside the snapshot.
    #[inline]
    pub fn index(&self, p: Position) -> Option<usize> {
        self.index_xy(p.x, p.y, p.plane)
    }

    #[inline]
    pub fn index_xy(&self, x: i32, y: i32, plane: u8) -> Option<usize> {
        if plane >= self.planes || !self.area.contains_xy(x, y) {
            return None;
        }
        let col = (x - self.area.x0) as usize;
        let row = (y - self.area.y0) as usize;
        Some((plane as usize * self.area.len()) + row * self.width + col)
    }

    /// Position of a flat index produced by [`index`](Self::index).
    #[inline]
    pub fn position(&self, idx: usize) -> Position {
        let per_plane = self.area.len();
        let plane = idx / per_plane;
        let rem = idx % per_plane;
        Position::new(
            (rem % self.width) as i32 + self.area.x0,
            (rem / self.width) as i32 + self.area.y0,
            plane as u8,
        )
    }

    /// Flags at `p`. Outside the snapshot this is [`CollisionFlags::BLOCKED`].
    #[inline]
    pub fn flags(&self, p: Position) -> CollisionFlags {
        self.flags_xy(p.x, p.y, p.plane)
    }

    #[inline]
    pub fn flags_xy(&self, x: i32, y: i32, plane: u8) -> CollisionFlags {
        match self.index_xy(x, y, plane) {
            Some(i) => self.flags[i],
            None => CollisionFlags::BLOCKED,
        }
    }

    /// Replace the flags at `p`. Returns `false` if `p` is outside.
    pub fn set_flags(&mut self, p: Position, flags: CollisionFlags) -> bool {
        match self.index(p) {
            Some(i) => {
                self.flags[i] = flags;
                true
            }
            None => false,
        }
    }

    /// Add bits to the flags at `p`. Returns `false` if `p` is outside.
    pub fn insert_flags(&mut self, p: Position, flags: CollisionFlags) -> bool {
        match self.index(p) {
            Some(i) => {
                self.flags[i] |= flags;
                true
            }
            None => false,
        }
    }

    /// Reset `p` to open, e.g. for a door the caller knows it can open.
    pub fn clear_tile(&mut self, p: Position) -> bool {
        self.set_flags(p, CollisionFlags::OPEN)
    }

    /// Whether the tile exists and can be stood on.
    #[inline]
    pub fn is_walkable(&self, p: Position) -> bool {
        self.contains(p) && !self.flags(p).is_blocked()
    }

    // -----------------------------------------------------------------------
    // Obstruction rules
    // -----------------------------------------------------------------------

    /// Whether a single step from `p` toward `dir` is unobstructed.
    #[inline]
    pub fn can_move(&self, p: Position, dir: Direction) -> bool {
        self.can_move_xy(p.x, p.y, p.plane, dir)
    }

    /// Primitive-coordinate form of [`can_move`](Self::can_move).
    ///
    /// A cardinal step is blocked if the current tile blocks leaving toward
    /// `dir` or the next tile blocks leaving back the other way. A diagonal
    /// step additionally requires both cardinal legs and both corner legs to
    /// be clear, so walls and blocked tiles cannot be cut around.
    pub fn can_move_xy(&self, x: i32, y: i32, plane: u8, dir: Direction) -> bool {
        match dir.split() {
            None => {
                let (dx, dy) = dir.delta();
                !self.flags_xy(x, y, plane).blocks_exit(dir)
                    && !self
                        .flags_xy(x + dx, y + dy, plane)
                        .blocks_exit(dir.opposite())
            }
            Some((v, h)) => {
                let (vx, vy) = v.delta();
                let (hx, hy) = h.delta();
                self.can_move_xy(x, y, plane, v)
                    && self.can_move_xy(x, y, plane, h)
                    && self.can_move_xy(x + hx, y + hy, plane, v)
                    && self.can_move_xy(x + vx, y + vy, plane, h)
            }
        }
    }

    /// The walkable tile closest to `p` (Euclidean) within a Chebyshev
    /// `radius`, scanning rows south to north on ties.
    pub fn nearest_walkable(&self, p: Position, radius: i32) -> Option<Position> {
        let mut best: Option<(i64, Position)> = None;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let q = p.shift(dx, dy);
                if !self.is_walkable(q) {
                    continue;
                }
                let d = (dx as i64).pow(2) + (dy as i64).pow(2);
                if best.is_none_or(|(bd, _)| d < bd) {
                    best = Some((d, q));
                }
            }
        }
        best.map(|(_, q)| q)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(w: i32, h: i32) -> GridSnapshot {
        GridSnapshot::new(Area::sized(0, 0, w, h), 1)
    }

    #[test]
    fn index_round_trip() {
        let s = GridSnapshot::new(Area::sized(100, 200, 7, 5), 3);
        for plane in 0..3 {
            for (x, y) in s.area().iter() {
                let p = Position::new(x, y, plane);
                let i = s.index(p).unwrap();
                assert_eq!(s.position(i), p);
            }
        }
        assert_eq!(s.index(Position::new(99, 200, 0)), None);
        assert_eq!(s.index(Position::new(100, 200, 3)), None);
    }

    #[test]
    fn outside_reads_blocked() {
        let s = open(3, 3);
        assert!(s.flags(Position::new(-1, 0, 0)).is_blocked());
        assert!(!s.can_move(Position::new(2, 1, 0), Direction::East));
        assert!(!s.can_move(Position::new(0, 0, 0), Direction::SouthWest));
    }

    #[test]
    fn from_flags_checks_length() {
        let area = Area::sized(0, 0, 2, 2);
        let err = GridSnapshot::from_flags(area, 1, vec![CollisionFlags::OPEN; 3]).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::FlagCount {
                expected: 4,
                found: 3
            }
        );
        assert!(GridSnapshot::from_flags(area, 0, Vec::new()).is_err());
    }

    #[test]
    fn south_wall_blocks_entry_from_south() {
        let mut s = open(5, 5);
        s.insert_flags(Position::new(2, 2, 0), CollisionFlags::WALL_SOUTH);
        assert!(!s.can_move(Position::new(2, 1, 0), Direction::North));
        assert!(!s.can_move(Position::new(2, 2, 0), Direction::South));
        assert!(s.can_move(Position::new(3, 2, 0), Direction::West));
    }

    #[test]
    fn diagonal_needs_every_leg() {
        let origin = Position::new(1, 1, 0);
        // Blocked tile east of origin.
        let mut s = open(4, 4);
        s.set_flags(Position::new(2, 1, 0), CollisionFlags::OBJECT);
        assert!(!s.can_move(origin, Direction::NorthEast));
        // Blocked tile north of origin.
        let mut s = open(4, 4);
        s.set_flags(Position::new(1, 2, 0), CollisionFlags::OBJECT);
        assert!(!s.can_move(origin, Direction::NorthEast));
        // Wall on the far corner leg.
        let mut s = open(4, 4);
        s.insert_flags(Position::new(2, 1, 0), CollisionFlags::WALL_NORTH);
        assert!(!s.can_move(origin, Direction::NorthEast));
        // Open.
        let s = open(4, 4);
        assert!(s.can_move(origin, Direction::NorthEast));
    }

    #[test]
    fn blocked_destination_rejects_all_entries() {
        let mut s = open(3, 3);
        let centre = Position::new(1, 1, 0);
        s.set_flags(centre, CollisionFlags::FLOOR);
        for d in Direction::ALL {
            let (dx, dy) = d.opposite().delta();
            assert!(!s.can_move(centre.shift(dx, dy), d), "{d}");
        }
    }

    #[test]
    fn nearest_walkable_prefers_closest() {
        let mut s = open(5, 5);
        let target = Position::new(2, 2, 0);
        s.set_flags(target, CollisionFlags::OBJECT);
        assert_eq!(s.nearest_walkable(target, 0), None);
        let near = s.nearest_walkable(target, 2).unwrap();
        assert_eq!(near, Position::new(2, 1, 0));
        s.clear_tile(target);
        assert_eq!(s.nearest_walkable(target, 2), Some(target));
    }
}
