//! Immutable candidate grids.

use std::{
    cmp::Ordering,
    fmt::{self, Display},
    hash::{Hash, Hasher},
    sync::Arc,
};

use vardoku_core::{Bounds, CandidateSet, Position, Value, ValueParseError};

use crate::{ClueRule, ClueSource, Reason, UpdateResult};

/// Errors produced when parsing a grid from text.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GridParseError {
    /// The text does not have one line per grid row.
    #[display("expected {expected} rows, found {found}")]
    RowCount {
        /// Grid height.
        expected: usize,
        /// Non-blank lines in the text.
        found: usize,
    },
    /// A row does not have one token per grid column.
    #[display("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        /// 1-based row number.
        row: usize,
        /// Grid width.
        expected: usize,
        /// Tokens in the row.
        found: usize,
    },
    /// A token is neither a value symbol nor an empty-cell placeholder.
    #[display("row {row}, column {column}: {source}")]
    UnknownToken {
        /// 1-based row number.
        row: usize,
        /// 1-based column number.
        column: usize,
        /// The token error.
        source: ValueParseError,
    },
}

/// A snapshot of every cell's candidates.
///
/// Grids are never mutated: narrowing produces a new grid, and clones share
/// the same cell storage. Equality, ordering and hashing only look at the
/// cells, so grids of the same puzzle can be collected into sets.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use vardoku_core::{Bounds, Position, ValueDomain};
/// use vardoku_solver::{ClueSource, ClueSpecs, Grid};
///
/// let bounds = Bounds::new(4, 4);
/// let mut specs = ClueSpecs::new();
/// specs.classic(bounds, 2, 2);
/// let source = Arc::new(ClueSource::build(specs, bounds, ValueDomain::digits(1..=4)?)?);
///
/// let grid = Grid::parse(source, "1...\n..2.\n.3..\n...4")?;
/// assert_eq!(grid.candidates_at(Position::new(0, 0)).len(), 1);
/// assert_eq!(grid.candidates_at(Position::new(1, 0)).len(), 4);
/// assert_eq!(grid.to_text(), "1...\n..2.\n.3..\n...4");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Grid {
    source: Arc<ClueSource>,
    cells: Arc<[CandidateSet]>,
}

impl Grid {
    /// Creates a grid where every cell holds every legal value.
    #[must_use]
    pub fn new(source: Arc<ClueSource>) -> Self {
        let all = source.values().all();
        let cells = vec![all; source.bounds().len()].into();
        Self { source, cells }
    }

    /// Parses a rectangular grid of tokens, one line per row.
    ///
    /// A row whose length (ignoring whitespace) equals the grid width is read
    /// one character per cell; otherwise it is split on whitespace. Blank
    /// lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`GridParseError`] if the shape does not match the bounds or a
    /// token is unknown.
    pub fn parse(source: Arc<ClueSource>, text: &str) -> Result<Self, GridParseError> {
        let bounds = source.bounds();
        let (width, height) = (usize::from(bounds.width()), usize::from(bounds.height()));
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if rows.len() != height {
            return Err(GridParseError::RowCount {
                expected: height,
                found: rows.len(),
            });
        }

        let all = source.values().all();
        let mut cells = Vec::with_capacity(bounds.len());
        for (y, row) in rows.iter().enumerate() {
            let compact: Vec<String> = row
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(String::from)
                .collect();
            let tokens = if compact.len() == width {
                compact
            } else {
                row.split_whitespace().map(str::to_owned).collect()
            };
            if tokens.len() != width {
                return Err(GridParseError::RowWidth {
                    row: y + 1,
                    expected: width,
                    found: tokens.len(),
                });
            }
            for (x, token) in tokens.iter().enumerate() {
                let value = source.values().parse_token(token).map_err(|error| {
                    GridParseError::UnknownToken {
                        row: y + 1,
                        column: x + 1,
                        source: error,
                    }
                })?;
                cells.push(value.map_or(all, CandidateSet::single));
            }
        }

        Ok(Self {
            source,
            cells: cells.into(),
        })
    }

    /// The clue set this grid is checked against.
    #[must_use]
    pub fn source(&self) -> &Arc<ClueSource> {
        &self.source
    }

    /// The grid dimensions.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.source.bounds()
    }

    /// Returns the candidates of `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is outside the grid.
    #[must_use]
    #[inline]
    pub fn candidates_at(&self, pos: Position) -> CandidateSet {
        self.cells[self.bounds().linear_index(pos)]
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(&self) -> impl ExactSizeIterator<Item = (Position, CandidateSet)> {
        let bounds = self.bounds();
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (bounds.position_at(i), *cell))
    }

    /// Returns `true` if every cell holds exactly one candidate.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_single())
    }

    /// Iterates over cells with more than one candidate, in row-major order.
    pub fn unresolved_positions(&self) -> impl Iterator<Item = Position> {
        self.cells()
            .filter(|(_, cell)| cell.len() > 1)
            .map(|(pos, _)| pos)
    }

    /// Returns a grid with `pos` replaced by `cell`.
    ///
    /// This is a manual edit: the result may hold more candidates than `self`
    /// and starts a new propagation chain.
    #[must_use]
    pub fn with_cell(&self, pos: Position, cell: CandidateSet) -> Self {
        let index = self.bounds().linear_index(pos);
        let mut cells = self.cells.to_vec();
        cells[index] = cell;
        Self {
            source: Arc::clone(&self.source),
            cells: cells.into(),
        }
    }

    /// Returns a grid with `pos` set to `value`.
    #[must_use]
    pub fn with_value(&self, pos: Position, value: Value) -> Self {
        self.with_cell(pos, CandidateSet::single(value))
    }

    /// Places `value` at `pos` by hand, returning the new grid and the
    /// narrowing that records the edit.
    #[must_use]
    pub fn enter(&self, pos: Position, value: Value) -> (Self, UpdateResult) {
        let cell = self.candidates_at(pos) & CandidateSet::single(value);
        let update = UpdateResult::single(pos, cell, Reason::manual(pos).into());
        let grid = self.apply(&update);
        (grid, update)
    }

    /// Applies the narrowings of `update`.
    ///
    /// Contradicted positions keep their current candidates.
    ///
    /// # Panics
    ///
    /// Panics if a narrowing would empty a cell, which means `update` was not
    /// computed against a predecessor of this grid.
    #[must_use]
    pub fn apply(&self, update: &UpdateResult) -> Self {
        if update.updates().is_empty() {
            return self.clone();
        }
        let bounds = self.bounds();
        let mut cells = self.cells.to_vec();
        for (pos, cell_update) in update.updates() {
            if update.contradictions().contains_key(pos) {
                continue;
            }
            let cell = &mut cells[bounds.linear_index(*pos)];
            let narrowed = *cell & cell_update.cell();
            assert!(
                !narrowed.is_empty(),
                "narrowing {pos} to {} empties the cell",
                cell_update.cell()
            );
            *cell = narrowed;
        }
        Self {
            source: Arc::clone(&self.source),
            cells: cells.into(),
        }
    }

    /// Renders the grid as text that [`Grid::parse`] reads back.
    ///
    /// Unresolved cells are written as `.`.
    #[must_use]
    pub fn to_text(&self) -> String {
        let values = self.source.values();
        let separator = if values.symbol_width() > 1 { " " } else { "" };
        let width = usize::from(self.bounds().width());
        self.cells
            .chunks(width)
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        cell.as_single()
                            .and_then(|value| values.symbol(value))
                            .unwrap_or(".")
                    })
                    .collect::<Vec<_>>()
                    .join(separator)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Builds the structured description handed to exporters.
    #[must_use]
    pub fn describe(&self) -> GridDescription {
        let values = self.source.values();
        GridDescription {
            width: self.bounds().width(),
            height: self.bounds().height(),
            cells: self.cells.iter().map(|cell| values.render(*cell)).collect(),
            clues: self
                .source
                .clues()
                .map(|(_, clue)| clue.name().to_owned())
                .collect(),
        }
    }

    /// Lists the cells whose candidates differ from `other`.
    #[must_use]
    pub fn diff(&self, other: &Self) -> Vec<CellChange> {
        self.cells()
            .zip(other.cells.iter())
            .filter(|((_, before), after)| before != *after)
            .map(|((position, before), after)| CellChange {
                position,
                before,
                after: *after,
            })
            .collect()
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl Eq for Grid {}

impl PartialOrd for Grid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Grid {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cells.cmp(&other.cells)
    }
}

impl Hash for Grid {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cells.hash(state);
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// One cell that differs between two grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellChange {
    /// The cell.
    pub position: Position,
    /// Candidates in the first grid.
    pub before: CandidateSet,
    /// Candidates in the second grid.
    pub after: CandidateSet,
}

impl CellChange {
    /// Candidates present before but not after.
    #[must_use]
    pub fn removed(&self) -> CandidateSet {
        self.before.difference(self.after)
    }
}

/// Plain description of a grid for serialization.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridDescription {
    /// Columns.
    pub width: u8,
    /// Rows.
    pub height: u8,
    /// Rendered candidates per cell, row-major.
    pub cells: Vec<String>,
    /// Names of the active clues, in evaluation order.
    pub clues: Vec<String>,
}

#[cfg(test)]
mod tests {
    use vardoku_core::ValueDomain;

    use super::*;
    use crate::ClueSpecs;

    fn source(width: u8, height: u8, values: ValueDomain) -> Arc<ClueSource> {
        let mut specs = ClueSpecs::new();
        specs.uniqueness("row 1", (0..width).map(|x| Position::new(x, 0)));
        Arc::new(ClueSource::build(specs, Bounds::new(width, height), values).unwrap())
    }

    #[test]
    fn test_parse_compact_and_spaced() {
        let source = source(4, 2, ValueDomain::digits(1..=4).unwrap());
        let compact = Grid::parse(Arc::clone(&source), "12.4\n_-3.").unwrap();
        let spaced = Grid::parse(source, "1 2 . 4\n\n_ - 3 .\n").unwrap();
        assert_eq!(compact, spaced);
        assert_eq!(
            compact.candidates_at(Position::new(2, 1)),
            CandidateSet::single(Value::new(3))
        );
        assert_eq!(compact.unresolved_positions().count(), 4);
    }

    #[test]
    fn test_parse_wide_symbols() {
        let source = source(12, 1, ValueDomain::digits(1..=12).unwrap());
        let grid = Grid::parse(source, "10 . 12 1 2 3 4 5 6 7 8 .").unwrap();
        assert_eq!(
            grid.candidates_at(Position::new(0, 0)),
            CandidateSet::single(Value::new(10))
        );
        assert_eq!(grid.to_text(), "10 . 12 1 2 3 4 5 6 7 8 .");
    }

    #[test]
    fn test_parse_errors() {
        let source = source(4, 2, ValueDomain::digits(1..=4).unwrap());
        assert_eq!(
            Grid::parse(Arc::clone(&source), "1234"),
            Err(GridParseError::RowCount {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            Grid::parse(Arc::clone(&source), "1234\n12"),
            Err(GridParseError::RowWidth {
                row: 2,
                expected: 4,
                found: 1
            })
        );
        assert!(matches!(
            Grid::parse(source, "1234\n12x4"),
            Err(GridParseError::UnknownToken {
                row: 2,
                column: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_enter_and_diff() {
        let source = source(4, 1, ValueDomain::digits(1..=4).unwrap());
        let grid = Grid::new(source);
        let pos = Position::new(1, 0);
        let (edited, update) = grid.enter(pos, Value::new(2));
        assert_eq!(grid.candidates_at(pos).len(), 4);
        assert_eq!(edited.candidates_at(pos), CandidateSet::single(Value::new(2)));
        assert_eq!(update.updates().len(), 1);

        let changes = grid.diff(&edited);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].position, pos);
        assert_eq!(changes[0].removed().len(), 3);
    }

    #[test]
    fn test_describe() {
        let source = source(2, 1, ValueDomain::from_symbols("AB".chars()).unwrap());
        let grid = Grid::parse(source, "A.").unwrap();
        let description = grid.describe();
        assert_eq!(description.width, 2);
        assert_eq!(description.cells, ["A", "AB"]);
        assert_eq!(description.clues, ["row 1"]);
    }
}
