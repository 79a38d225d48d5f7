//! Grid coordinates and dimensions.

use std::fmt::{self, Display};

/// A cell coordinate on a puzzle grid.
///
/// `x` is the column and `y` is the row, both 0-based. Positions are totally
/// ordered in row-major order (all of row 0 first, then row 1, ...), which is
/// the order used for every deterministic iteration in the engine.
///
/// # Examples
///
/// ```
/// use vardoku_core::Position;
///
/// let a = Position::new(8, 0);
/// let b = Position::new(0, 1);
/// assert!(a < b); // row-major
/// assert_eq!(a.to_string(), "r1c9");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Position {
    // Field order matters: derived `Ord` compares `y` first.
    y: u8,
    x: u8,
}

impl Position {
    /// Creates a position from a column (`x`) and a row (`y`).
    #[must_use]
    #[inline]
    pub const fn new(x: u8, y: u8) -> Self {
        Self { y, x }
    }

    /// Returns the column (0-based).
    #[must_use]
    #[inline]
    pub const fn x(self) -> u8 {
        self.x
    }

    /// Returns the row (0-based).
    #[must_use]
    #[inline]
    pub const fn y(self) -> u8 {
        self.y
    }

    /// Returns the position shifted by `(dx, dy)` if it stays inside `bounds`.
    ///
    /// # Examples
    ///
    /// ```
    /// use vardoku_core::{Bounds, Position};
    ///
    /// let bounds = Bounds::new(9, 9);
    /// assert_eq!(
    ///     Position::new(0, 0).offset(1, 2, bounds),
    ///     Some(Position::new(1, 2))
    /// );
    /// assert_eq!(Position::new(0, 0).offset(-1, 0, bounds), None);
    /// ```
    #[must_use]
    pub fn offset(self, dx: i16, dy: i16, bounds: Bounds) -> Option<Self> {
        let x = i16::from(self.x) + dx;
        let y = i16::from(self.y) + dy;
        let x = u8::try_from(x).ok()?;
        let y = u8::try_from(y).ok()?;
        let pos = Self::new(x, y);
        bounds.contains(pos).then_some(pos)
    }

    /// Returns `true` if the two positions share an edge.
    #[must_use]
    pub fn is_orthogonally_adjacent(self, other: Self) -> bool {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) == 1
    }

    /// Returns `true` if the two positions touch by an edge or a corner.
    #[must_use]
    pub fn is_king_adjacent(self, other: Self) -> bool {
        self != other && self.x.abs_diff(other.x) <= 1 && self.y.abs_diff(other.y) <= 1
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}c{}", u16::from(self.y) + 1, u16::from(self.x) + 1)
    }
}

/// Errors produced when building [`Bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum PositionError {
    /// Width or height is zero.
    #[display("grid dimensions must be non-zero, got {width}x{height}")]
    EmptyBounds {
        /// Requested width.
        width: u8,
        /// Requested height.
        height: u8,
    },
}

/// Grid dimensions; every valid [`Position`] lies strictly inside them.
///
/// # Examples
///
/// ```
/// use vardoku_core::{Bounds, Position};
///
/// let bounds = Bounds::from_max(Position::new(5, 5));
/// assert_eq!(bounds.width(), 6);
/// assert_eq!(bounds.len(), 36);
/// assert_eq!(bounds.positions().count(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    width: u8,
    height: u8,
}

impl Bounds {
    /// Creates bounds of `width` columns and `height` rows.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero. Use [`Bounds::try_new`] for checked
    /// construction.
    #[must_use]
    pub fn new(width: u8, height: u8) -> Self {
        match Self::try_new(width, height) {
            Ok(bounds) => bounds,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates bounds, rejecting empty dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`PositionError::EmptyBounds`] if either dimension is zero.
    pub fn try_new(width: u8, height: u8) -> Result<Self, PositionError> {
        if width == 0 || height == 0 {
            return Err(PositionError::EmptyBounds { width, height });
        }
        Ok(Self { width, height })
    }

    /// Creates bounds whose last cell is `max`.
    ///
    /// # Panics
    ///
    /// Panics if `max` lies on column or row 255, since the resulting
    /// dimension would not fit in a `u8`.
    #[must_use]
    pub fn from_max(max: Position) -> Self {
        let width = max.x().checked_add(1).expect("max position column overflows");
        let height = max.y().checked_add(1).expect("max position row overflows");
        Self { width, height }
    }

    /// Number of columns.
    #[must_use]
    #[inline]
    pub const fn width(self) -> u8 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    #[inline]
    pub const fn height(self) -> u8 {
        self.height
    }

    /// The last (bottom-right) position.
    #[must_use]
    pub const fn max(self) -> Position {
        Position::new(self.width - 1, self.height - 1)
    }

    /// Number of cells.
    #[must_use]
    #[inline]
    pub const fn len(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Always `false`: bounds are never empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        false
    }

    /// Returns `true` if `pos` lies inside the bounds.
    #[must_use]
    #[inline]
    pub const fn contains(self, pos: Position) -> bool {
        pos.x() < self.width && pos.y() < self.height
    }

    /// Returns the row-major linear index of `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of bounds.
    #[must_use]
    #[inline]
    pub fn linear_index(self, pos: Position) -> usize {
        assert!(self.contains(pos), "position {pos} is outside {self:?}");
        usize::from(pos.y()) * usize::from(self.width) + usize::from(pos.x())
    }

    /// Returns the position at a row-major linear index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not smaller than [`Bounds::len`].
    #[must_use]
    pub fn position_at(self, index: usize) -> Position {
        assert!(index < self.len(), "index {index} is outside {self:?}");
        let width = usize::from(self.width);
        #[expect(clippy::cast_possible_truncation)]
        Position::new((index % width) as u8, (index / width) as u8)
    }

    /// Iterates over every position in row-major order.
    pub fn positions(self) -> impl DoubleEndedIterator<Item = Position> + ExactSizeIterator {
        (0..self.len()).map(move |i| self.position_at(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_order() {
        let mut positions = vec![
            Position::new(2, 1),
            Position::new(0, 2),
            Position::new(8, 0),
            Position::new(0, 1),
        ];
        positions.sort();
        assert_eq!(
            positions,
            vec![
                Position::new(8, 0),
                Position::new(0, 1),
                Position::new(2, 1),
                Position::new(0, 2),
            ]
        );
    }

    #[test]
    fn test_linear_index_round_trip() {
        let bounds = Bounds::new(6, 4);
        for (i, pos) in bounds.positions().enumerate() {
            assert_eq!(bounds.linear_index(pos), i);
            assert_eq!(bounds.position_at(i), pos);
        }
        assert_eq!(bounds.max(), Position::new(5, 3));
    }

    #[test]
    fn test_offset_and_adjacency() {
        let bounds = Bounds::new(9, 9);
        let center = Position::new(4, 4);
        assert_eq!(center.offset(2, -1, bounds), Some(Position::new(6, 3)));
        assert_eq!(Position::new(8, 8).offset(1, 0, bounds), None);
        assert!(center.is_orthogonally_adjacent(Position::new(4, 5)));
        assert!(!center.is_orthogonally_adjacent(Position::new(5, 5)));
        assert!(center.is_king_adjacent(Position::new(5, 5)));
        assert!(!center.is_king_adjacent(center));
    }

    #[test]
    fn test_try_new_rejects_empty() {
        assert_eq!(
            Bounds::try_new(0, 9),
            Err(PositionError::EmptyBounds {
                width: 0,
                height: 9
            })
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Position::new(0, 0).to_string(), "r1c1");
        assert_eq!(Position::new(8, 4).to_string(), "r5c9");
    }
}
