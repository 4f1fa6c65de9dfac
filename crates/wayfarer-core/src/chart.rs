//! ASCII charts that expand into [`GridSnapshot`]s.
//!
//! A [`Chart`] is a text drawing of one or more planes. The first line is the
//! northernmost row. Planes are separated by a blank line and must share the
//! same size. The default legend is:
//!
//! | Glyph | Meaning |
//! |---|---|
//! | `.` | open floor |
//! | `#` | blocked by an object |
//! | `~` | blocked floor (water, chasm) |
//! | `^` `v` `<` `>` | wall on the north/south/west/east side of the tile |
//! | `A`..=`Z` | open floor carrying a named mark |

use crate::flags::CollisionFlags;
use crate::position::{Area, Position};
use crate::snapshot::GridSnapshot;

/// Errors raised while parsing a chart or expanding it to a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChartError {
    #[error("chart: no content")]
    Empty,
    /// A row differs in width from the first row of its plane.
    #[error("chart: plane {plane} row {row} is {found} wide, expected {expected}")]
    InconsistentWidth {
        plane: usize,
        row: usize,
        expected: usize,
        found: usize,
    },
    /// A plane differs in height from plane 0.
    #[error("chart: plane {plane} is {found} rows tall, expected {expected}")]
    InconsistentHeight {
        plane: usize,
        expected: usize,
        found: usize,
    },
    #[error("chart: {0} planes exceed the 255 plane limit")]
    TooManyPlanes(usize),
    /// A glyph with no legend entry.
    #[error("chart contains unknown glyph \u{201c}{ch}\u{201d} at {pos}")]
    UnknownGlyph { ch: char, pos: Position },
}

/// A text drawing of one or more planes.
#[derive(Debug, Clone)]
pub struct Chart {
    planes: Vec<Vec<Vec<char>>>,
    width: usize,
    height: usize,
    legend: Vec<(char, CollisionFlags)>,
}

impl Chart {
    /// Parse a chart. Leading and trailing blank lines are ignored, as is
    /// trailing whitespace on each row.
    pub fn new(s: &str) -> Result<Self, ChartError> {
        let mut planes: Vec<Vec<Vec<char>>> = Vec::new();
        let mut current: Vec<Vec<char>> = Vec::new();
        for line in s.trim_matches('\n').lines() {
            let line = line.trim_end();
            if line.is_empty() {
                if !current.is_empty() {
                    planes.push(std::mem::take(&mut current));
                }
                continue;
            }
            current.push(line.chars().collect());
        }
        if !current.is_empty() {
            planes.push(current);
        }
        let Some(first) = planes.first() else {
            return Err(ChartError::Empty);
        };
        if planes.len() > u8::MAX as usize {
            return Err(ChartError::TooManyPlanes(planes.len()));
        }

        let height = first.len();
        let width = first[0].len();
        for (pi, rows) in planes.iter().enumerate() {
            if rows.len() != height {
                return Err(ChartError::InconsistentHeight {
                    plane: pi,
                    expected: height,
                    found: rows.len(),
                });
            }
            for (ri, row) in rows.iter().enumerate() {
                if row.len() != width {
                    return Err(ChartError::InconsistentWidth {
                        plane: pi,
                        row: ri,
                        expected: width,
                        found: row.len(),
                    });
                }
            }
        }

        Ok(Self {
            planes,
            width,
            height,
            legend: default_legend(),
        })
    }

    /// Map an extra glyph (or remap an existing one) to collision flags.
    pub fn with_glyph(mut self, ch: char, flags: CollisionFlags) -> Self {
        match self.legend.iter_mut().find(|(c, _)| *c == ch) {
            Some(entry) => entry.1 = flags,
            None => self.legend.push((ch, flags)),
        }
        self
    }

    /// (width, height) in tiles.
    pub fn size(&self) -> (i32, i32) {
        (self.width as i32, self.height as i32)
    }

    pub fn planes(&self) -> u8 {
        self.planes.len() as u8
    }

    /// Visit every tile with its chart-local position (south-west corner at
    /// the origin) and glyph.
    pub fn iter(&self, mut f: impl FnMut(Position, char)) {
        for (pi, rows) in self.planes.iter().enumerate() {
            for (ri, row) in rows.iter().enumerate() {
                let y = (self.height - 1 - ri) as i32;
                for (x, &ch) in row.iter().enumerate() {
                    f(Position::new(x as i32, y, pi as u8), ch);
                }
            }
        }
    }

    /// All positions carrying glyph `mark`, shifted by `origin`'s x and y.
    pub fn marks(&self, mark: char, origin: Position) -> Vec<Position> {
        let mut found = Vec::new();
        self.iter(|p, ch| {
            if ch == mark {
                found.push(p.shift(origin.x, origin.y));
            }
        });
        found
    }

    /// The first position carrying glyph `mark`, scanning planes then rows
    /// from the north.
    pub fn mark(&self, mark: char, origin: Position) -> Option<Position> {
        self.marks(mark, origin).into_iter().next()
    }

    /// Expand into a snapshot whose south-west corner sits at `origin`'s x
    /// and y. Chart plane `n` becomes snapshot plane `n`.
    pub fn snapshot(&self, origin: Position) -> Result<GridSnapshot, ChartError> {
        let area = Area::sized(origin.x, origin.y, self.width as i32, self.height as i32);
        let mut snap = GridSnapshot::new(area, self.planes());
        let mut err = None;
        self.iter(|p, ch| {
            if err.is_some() {
                return;
            }
            let p = p.shift(origin.x, origin.y);
            match self.glyph(ch) {
                Some(flags) => {
                    snap.set_flags(p, flags);
                }
                None => err = Some(ChartError::UnknownGlyph { ch, pos: p }),
            }
        });
        match err {
            Some(e) => Err(e),
            None => Ok(snap),
        }
    }

    fn glyph(&self, ch: char) -> Option<CollisionFlags> {
        if let Some(&(_, flags)) = self.legend.iter().find(|(c, _)| *c == ch) {
            return Some(flags);
        }
        ch.is_ascii_uppercase().then_some(CollisionFlags::OPEN)
    }
}

fn default_legend() -> Vec<(char, CollisionFlags)> {
    vec![
        ('.', CollisionFlags::OPEN),
        ('#', CollisionFlags::OBJECT),
        ('~', CollisionFlags::FLOOR),
        ('^', CollisionFlags::WALL_NORTH),
        ('v', CollisionFlags::WALL_SOUTH),
        ('<', CollisionFlags::WALL_WEST),
        ('>', CollisionFlags::WALL_EAST),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;

    const HUT: &str = "
#####
#..G#
#.#.#
#S..#
#####";

    #[test]
    fn parse_and_size() {
        let c = Chart::new(HUT).unwrap();
        assert_eq!(c.size(), (5, 5));
        assert_eq!(c.planes(), 1);
    }

    #[test]
    fn rows_run_north_to_south() {
        let c = Chart::new(HUT).unwrap();
        let origin = Position::new(0, 0, 0);
        assert_eq!(c.mark('S', origin), Some(Position::new(1, 1, 0)));
        assert_eq!(c.mark('G', origin), Some(Position::new(3, 3, 0)));
    }

    #[test]
    fn snapshot_applies_origin_and_legend() {
        let c = Chart::new(HUT).unwrap();
        let s = c.snapshot(Position::new(3200, 3200, 0)).unwrap();
        assert_eq!(s.area(), Area::sized(3200, 3200, 5, 5));
        assert!(s.is_walkable(Position::new(3201, 3201, 0)));
        assert!(!s.is_walkable(Position::new(3202, 3202, 0)));
        assert!(!s.is_walkable(Position::new(3200, 3200, 0)));
    }

    #[test]
    fn wall_glyphs() {
        let c = Chart::new("...\n.v.\n...").unwrap();
        let s = c.snapshot(Position::new(0, 0, 0)).unwrap();
        assert!(!s.can_move(Position::new(1, 0, 0), Direction::North));
        assert!(s.can_move(Position::new(0, 1, 0), Direction::East));
    }

    #[test]
    fn multiple_planes() {
        let c = Chart::new("..\n..\n\n#.\n.#").unwrap();
        assert_eq!(c.planes(), 2);
        let s = c.snapshot(Position::new(0, 0, 0)).unwrap();
        assert!(s.is_walkable(Position::new(0, 1, 0)));
        assert!(!s.is_walkable(Position::new(0, 1, 1)));
        assert!(!s.is_walkable(Position::new(1, 0, 1)));
    }

    #[test]
    fn rejects_ragged_rows() {
        let err = Chart::new("...\n..").unwrap_err();
        assert_eq!(
            err,
            ChartError::InconsistentWidth {
                plane: 0,
                row: 1,
                expected: 3,
                found: 2
            }
        );
        assert!(matches!(
            Chart::new("..\n..\n\n.."),
            Err(ChartError::InconsistentHeight { plane: 1, .. })
        ));
        assert_eq!(Chart::new("\n\n").unwrap_err(), ChartError::Empty);
    }

    #[test]
    fn unknown_glyph_and_custom_legend() {
        let c = Chart::new(".%.").unwrap();
        assert!(matches!(
            c.snapshot(Position::default()),
            Err(ChartError::UnknownGlyph { ch: '%', .. })
        ));
        let c = c.with_glyph('%', CollisionFlags::FLOOR_DECORATION);
        let s = c.snapshot(Position::default()).unwrap();
        assert!(!s.is_walkable(Position::new(1, 0, 0)));
    }
}
