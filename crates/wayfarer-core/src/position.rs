//! World coordinates: [`Position`] and the planar [`Area`].

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

const COORD_BITS: u32 = 28;
const COORD_MASK: u64 = (1 << COORD_BITS) - 1;
const PLANE_SHIFT: u32 = 2 * COORD_BITS;

/// A tile in the world grid. X grows east, Y grows north, and `plane` is the
/// vertical layer.
///
/// Positions pack losslessly into a `u64` (see [`pack`](Self::pack)) as long
/// as both coordinates lie in [`COORD_MIN`](Self::COORD_MIN)..=
/// [`COORD_MAX`](Self::COORD_MAX).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub plane: u8,
}

impl Position {
    /// Smallest coordinate that survives packing.
    pub const COORD_MIN: i32 = -(1 << (COORD_BITS - 1));
    /// Largest coordinate that survives packing.
    pub const COORD_MAX: i32 = (1 << (COORD_BITS - 1)) - 1;

    /// Create a new position.
    #[inline]
    pub const fn new(x: i32, y: i32, plane: u8) -> Self {
        Self { x, y, plane }
    }

    /// Return a position shifted by (dx, dy) on the same plane.
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            plane: self.plane,
        }
    }

    /// Same x and y, different plane.
    #[inline]
    pub const fn with_plane(self, plane: u8) -> Self {
        Self {
            x: self.x,
            y: self.y,
            plane,
        }
    }

    /// Whether both coordinates fit the packed representation.
    #[inline]
    pub const fn is_packable(self) -> bool {
        self.x >= Self::COORD_MIN
            && self.x <= Self::COORD_MAX
            && self.y >= Self::COORD_MIN
            && self.y <= Self::COORD_MAX
    }

    /// Pack into a single `u64`: x in bits 0..28, y in bits 28..56 (both
    /// two's complement), plane in bits 56..64.
    #[inline]
    pub const fn pack(self) -> u64 {
        ((self.plane as u64) << PLANE_SHIFT)
            | (((self.y as u32 as u64) & COORD_MASK) << COORD_BITS)
            | ((self.x as u32 as u64) & COORD_MASK)
    }

    /// Inverse of [`pack`](Self::pack).
    #[inline]
    pub const fn unpack(packed: u64) -> Self {
        Self {
            x: sign_extend(packed & COORD_MASK),
            y: sign_extend((packed >> COORD_BITS) & COORD_MASK),
            plane: (packed >> PLANE_SHIFT) as u8,
        }
    }
}

#[inline]
const fn sign_extend(raw: u64) -> i32 {
    let shift = 32 - COORD_BITS;
    ((raw as u32) << shift) as i32 >> shift
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.plane
            .cmp(&other.plane)
            .then(self.y.cmp(&other.y))
            .then(self.x.cmp(&other.x))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.plane)
    }
}

impl From<Position> for u64 {
    #[inline]
    fn from(p: Position) -> u64 {
        p.pack()
    }
}

impl From<u64> for Position {
    #[inline]
    fn from(packed: u64) -> Self {
        Self::unpack(packed)
    }
}

// ---------------------------------------------------------------------------
// Area
// ---------------------------------------------------------------------------

/// A half-open rectangle of columns \[x0, x1) and rows \[y0, y1), independent
/// of plane.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Area {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Area {
    /// Create a new area. Inverted bounds produce an empty area.
    #[inline]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Area of the given size with its south-west corner at (x, y).
    #[inline]
    pub const fn sized(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    #[inline]
    pub const fn width(&self) -> i32 {
        if self.x1 > self.x0 { self.x1 - self.x0 } else { 0 }
    }

    #[inline]
    pub const fn height(&self) -> i32 {
        if self.y1 > self.y0 { self.y1 - self.y0 } else { 0 }
    }

    /// Number of tiles covered on one plane.
    #[inline]
    pub const fn len(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the column/row pair lies inside.
    #[inline]
    pub const fn contains_xy(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// Whether the position's x and y lie inside (plane is ignored).
    #[inline]
    pub const fn contains(&self, p: Position) -> bool {
        self.contains_xy(p.x, p.y)
    }

    /// Iterate over all (x, y) pairs, row by row from the south edge.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (self.y0..self.y1).flat_map(move |y| (self.x0..self.x1).map(move |x| (x, y)))
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})x[{}, {})", self.x0, self.x1, self.y0, self.y1)
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn position_json() {
        let p = Position::new(3200, 3200, 1);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"x":3200,"y":3200,"plane":1}"#);
        let back: Position = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
