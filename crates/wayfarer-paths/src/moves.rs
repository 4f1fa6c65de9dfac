//! The strategic move table.
//!
//! Each of the 24 movement vectors is listed with the primitive checks that
//! validate it. A move is legal when its landing tile is not excluded and
//! every check passes, evaluated in order and stopping at the first failure.
//! Offsets are relative to the tile the move starts from.

use wayfarer_core::Direction::{self, *};

/// One primitive check making up a move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Check {
    /// The tile at this offset must not be in an exclusion set.
    Clear(i32, i32),
    /// A single step from this offset toward the direction must be
    /// unobstructed.
    Step(i32, i32, Direction),
}

/// A movement vector and its decomposition.
#[derive(Copy, Clone, Debug)]
pub struct Move {
    pub dx: i32,
    pub dy: i32,
    pub checks: &'static [Check],
}

use Check::{Clear, Step};

/// All strategic moves in expansion order: far cardinals, cardinals,
/// diagonals, far diagonals, then knight-style moves.
#[rustfmt::skip]
pub static MOVES: [Move; 24] = [
    // far cardinal
    Move { dx: -2, dy: 0, checks: &[Clear(-1, 0), Step(0, 0, West), Step(-1, 0, West)] },
    Move { dx: 0, dy: 2, checks: &[Clear(0, 1), Step(0, 0, North), Step(0, 1, North)] },
    Move { dx: 2, dy: 0, checks: &[Clear(1, 0), Step(0, 0, East), Step(1, 0, East)] },
    Move { dx: 0, dy: -2, checks: &[Clear(0, -1), Step(0, 0, South), Step(0, -1, South)] },
    // cardinal
    Move { dx: 1, dy: 0, checks: &[Step(0, 0, East)] },
    Move { dx: 0, dy: 1, checks: &[Step(0, 0, North)] },
    Move { dx: -1, dy: 0, checks: &[Step(0, 0, West)] },
    Move { dx: 0, dy: -1, checks: &[Step(0, 0, South)] },
    // diagonal
    Move { dx: 1, dy: 1, checks: &[Clear(1, 0), Clear(0, 1), Step(0, 0, NorthEast)] },
    Move { dx: -1, dy: -1, checks: &[Clear(-1, 0), Clear(0, -1), Step(0, 0, SouthWest)] },
    Move { dx: -1, dy: 1, checks: &[Clear(-1, 0), Clear(0, 1), Step(0, 0, NorthWest)] },
    Move { dx: 1, dy: -1, checks: &[Clear(1, 0), Clear(0, -1), Step(0, 0, SouthEast)] },
    // far diagonal
    Move {
        dx: -2,
        dy: 2,
        checks: &[
            Clear(-1, 2), Clear(-2, 1),
            Clear(0, 1), Step(0, 0, North),
            Clear(-1, 0), Step(0, 0, West),
            Clear(-1, 1), Step(0, 0, NorthWest),
            Step(-1, 1, NorthWest),
        ],
    },
    Move {
        dx: -2,
        dy: -2,
        checks: &[
            Clear(-1, -2), Clear(-2, -1),
            Clear(0, -1), Step(0, 0, South),
            Clear(-1, 0), Step(0, 0, West),
            Clear(-1, -1), Step(0, 0, SouthWest),
            Step(-1, -1, SouthWest),
        ],
    },
    Move {
        dx: 2,
        dy: 2,
        checks: &[
            Clear(1, 2), Clear(2, 1),
            Clear(0, 1), Step(0, 0, North),
            Clear(1, 0), Step(0, 0, East),
            Clear(1, 1), Step(0, 0, NorthEast),
            Step(1, 1, NorthEast),
        ],
    },
    Move {
        dx: 2,
        dy: -2,
        checks: &[
            Clear(1, -2), Clear(2, -1),
            Clear(0, -1), Step(0, 0, South),
            Clear(1, 0), Step(0, 0, East),
            Clear(1, -1), Step(0, 0, SouthEast),
            Step(1, -1, SouthEast),
        ],
    },
    // knight
    Move {
        dx: -2,
        dy: -1,
        checks: &[
            Clear(-1, -1), Step(0, 0, SouthWest),
            Clear(-1, 0), Step(0, 0, West),
            Clear(-2, 0), Step(-1, 0, West),
            Step(-1, -1, West),
        ],
    },
    Move {
        dx: -2,
        dy: 1,
        checks: &[
            Clear(-1, 1), Step(0, 0, NorthWest),
            Clear(-1, 0), Step(0, 0, West),
            Clear(-2, 0), Step(-1, 0, West),
            Step(-1, 1, West),
        ],
    },
    Move {
        dx: -1,
        dy: -2,
        checks: &[
            Clear(-1, -1), Step(0, 0, SouthWest),
            Clear(0, -1), Step(0, 0, South),
            Clear(0, -2), Step(0, -1, South),
            Step(-1, -1, South),
        ],
    },
    Move {
        dx: -1,
        dy: 2,
        checks: &[
            Clear(-1, 1), Step(0, 0, NorthWest),
            Clear(0, 1), Step(0, 0, North),
            Clear(0, 2), Step(0, 1, North),
            Step(-1, 1, North),
        ],
    },
    Move {
        dx: 1,
        dy: -2,
        checks: &[
            Clear(1, -1), Step(0, 0, SouthEast),
            Clear(0, -1), Step(0, 0, South),
            Clear(0, -2), Step(0, -1, South),
            Step(1, -1, South),
        ],
    },
    Move {
        dx: 1,
        dy: 2,
        checks: &[
            Clear(1, 1), Step(0, 0, NorthEast),
            Clear(0, 1), Step(0, 0, North),
            Clear(0, 2), Step(0, 1, North),
            Step(1, 1, North),
        ],
    },
    Move {
        dx: 2,
        dy: -1,
        checks: &[
            Clear(1, -1), Step(0, 0, SouthEast),
            Clear(1, 0), Step(0, 0, East),
            Clear(2, 0), Step(1, 0, East),
            Step(1, -1, East),
        ],
    },
    Move {
        dx: 2,
        dy: 1,
        checks: &[
            Clear(1, 1), Step(0, 0, NorthEast),
            Clear(1, 0), Step(0, 0, East),
            Clear(2, 0), Step(1, 0, East),
            Step(1, 1, East),
        ],
    },
];
