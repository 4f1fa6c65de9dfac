//! Per-tile obstruction bitmask.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

use crate::direction::Direction;

/// Obstruction bits for a single tile.
///
/// A wall bit means movement cannot leave the tile across that side. Object,
/// floor-decoration and floor bits each make the whole tile impassable.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionFlags(pub u32);

impl CollisionFlags {
    pub const OPEN: Self = Self(0);
    pub const WALL_NORTH_WEST: Self = Self(1 << 0);
    pub const WALL_NORTH: Self = Self(1 << 1);
    pub const WALL_NORTH_EAST: Self = Self(1 << 2);
    pub const WALL_EAST: Self = Self(1 << 3);
    pub const WALL_SOUTH_EAST: Self = Self(1 << 4);
    pub const WALL_SOUTH: Self = Self(1 << 5);
    pub const WALL_SOUTH_WEST: Self = Self(1 << 6);
    pub const WALL_WEST: Self = Self(1 << 7);
    pub const OBJECT: Self = Self(1 << 8);
    pub const FLOOR_DECORATION: Self = Self(1 << 9);
    pub const FLOOR: Self = Self(1 << 10);

    /// Any of these bits blocks the tile outright.
    pub const BLOCKED: Self = Self(Self::OBJECT.0 | Self::FLOOR_DECORATION.0 | Self::FLOOR.0);

    /// The wall bit for one side of the tile.
    #[inline]
    pub const fn wall(dir: Direction) -> Self {
        match dir {
            Direction::North => Self::WALL_NORTH,
            Direction::NorthEast => Self::WALL_NORTH_EAST,
            Direction::East => Self::WALL_EAST,
            Direction::SouthEast => Self::WALL_SOUTH_EAST,
            Direction::South => Self::WALL_SOUTH,
            Direction::SouthWest => Self::WALL_SOUTH_WEST,
            Direction::West => Self::WALL_WEST,
            Direction::NorthWest => Self::WALL_NORTH_WEST,
        }
    }

    /// Whether this mask contains all the bits from `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Whether this mask shares any bit with `other`.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether the tile cannot be stood on.
    #[inline]
    pub const fn is_blocked(self) -> bool {
        self.intersects(Self::BLOCKED)
    }

    /// Whether movement may not leave this tile toward `dir`.
    ///
    /// For a cardinal side this also honours the two corner walls flanking
    /// it. Diagonal sides only look at their own corner bit; full diagonal
    /// movement rules live in [`GridSnapshot`](crate::GridSnapshot).
    #[inline]
    pub const fn blocks_exit(self, dir: Direction) -> bool {
        if self.is_blocked() || self.intersects(Self::wall(dir)) {
            return true;
        }
        match dir.flanks() {
            Some((a, b)) => self.intersects(Self::wall(a)) || self.intersects(Self::wall(b)),
            None => false,
        }
    }
}

impl BitOr for CollisionFlags {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for CollisionFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for CollisionFlags {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for CollisionFlags {
    type Output = Self;
    #[inline]
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Debug for CollisionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CollisionFlags({:#06x})", self.0)
    }
}
