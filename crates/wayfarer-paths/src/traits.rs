use wayfarer_core::Position;

/// Minimal search interface: enumerates the tiles reachable in one move.
pub trait Pather {
    /// Append neighbors of `p` into `buf`, in the order they should be
    /// expanded. The caller clears `buf` before calling.
    fn neighbors(&self, p: Position, buf: &mut Vec<Position>);
}
