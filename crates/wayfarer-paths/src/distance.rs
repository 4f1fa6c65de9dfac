use wayfarer_core::Position;

/// Chebyshev (L∞) distance between two positions, ignoring planes. This is
/// the number of moves an unobstructed 8-direction walk needs.
#[inline]
pub fn chebyshev(a: Position, b: Position) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}
