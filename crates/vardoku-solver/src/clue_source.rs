//! Clue specifications and the validated clue set built from them.
//!
//! The configuration layer describes a puzzle as a list of [`ClueSpec`]s,
//! usually assembled with the [`ClueSpecs`] helpers. [`ClueSource::build`]
//! validates the list against the grid bounds and the value domain, merges
//! relationships that share a pair of cells, drops duplicates, and indexes
//! every clue by the positions it governs.
//!
//! # Examples
//!
//! ```
//! use vardoku_core::{Bounds, ValueDomain};
//! use vardoku_solver::{ClueSource, ClueSpecs};
//!
//! let bounds = Bounds::new(9, 9);
//! let mut specs = ClueSpecs::new();
//! specs.classic(bounds, 3, 3).anti_knight(bounds);
//! let source = ClueSource::build(specs, bounds, ValueDomain::digits(1..=9)?)?;
//! assert!(source.len() > 27 * 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};

use vardoku_core::{Bounds, CandidateSet, Position, Value, ValueDomain};

use crate::{
    Clue, ClueId, ClueRule, CompletenessClue, Constraint, RelationshipClue, UniquenessClue,
};

/// One rule as described by the configuration layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClueSpec {
    /// No value repeats among `positions`.
    Uniqueness {
        /// Display name.
        name: String,
        /// Governed cells.
        positions: Vec<Position>,
    },
    /// Every value of `values` (default: the whole value domain) appears
    /// among `positions`.
    Completeness {
        /// Display name.
        name: String,
        /// Governed cells.
        positions: Vec<Position>,
        /// Required values.
        values: Option<CandidateSet>,
    },
    /// `constraint(first, second)` holds.
    ///
    /// Non-fixed relationships on a pair are dropped when the pair also has a
    /// fixed one; several fixed (or several non-fixed) relationships on a pair
    /// are merged with [`Constraint::combine`].
    Relationship {
        /// Display name.
        name: String,
        /// First cell.
        first: Position,
        /// Second cell.
        second: Position,
        /// Predicate over `(first, second)`.
        constraint: Constraint,
        /// Whether the relationship overrides non-fixed ones.
        fixed: bool,
    },
}

impl ClueSpec {
    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Uniqueness { name, .. }
            | Self::Completeness { name, .. }
            | Self::Relationship { name, .. } => name,
        }
    }
}

/// Errors produced when validating clue specifications.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ClueSourceError {
    /// A clue references a cell outside the grid.
    #[display("clue {clue:?} references {position} outside the grid")]
    OutOfBounds {
        /// Clue name.
        clue: String,
        /// Offending position.
        position: Position,
    },
    /// A clue governs no cell.
    #[display("clue {clue:?} has no cell")]
    EmptyDomain {
        /// Clue name.
        clue: String,
    },
    /// A clue lists the same cell twice.
    #[display("clue {clue:?} lists {position} twice")]
    DuplicatePosition {
        /// Clue name.
        clue: String,
        /// Offending position.
        position: Position,
    },
    /// A uniqueness clue has more cells than there are values.
    #[display("clue {clue:?} has {cells} cells but only {values} distinct values exist")]
    TooManyCells {
        /// Clue name.
        clue: String,
        /// Number of governed cells.
        cells: usize,
        /// Number of legal values.
        values: usize,
    },
    /// A completeness clue has fewer cells than required values.
    #[display("clue {clue:?} has {cells} cells but requires {values} values")]
    TooFewCells {
        /// Clue name.
        clue: String,
        /// Number of governed cells.
        cells: usize,
        /// Number of required values.
        values: usize,
    },
    /// A completeness clue requires a value outside the value domain.
    #[display("clue {clue:?} requires value {value} outside the value domain")]
    ValueOutsideDomain {
        /// Clue name.
        clue: String,
        /// Offending value.
        value: Value,
    },
    /// Fixed relationships on the same pair admit no value pair.
    #[display("fixed relationships between {first} and {second} cannot be satisfied together")]
    ConflictingConstraints {
        /// First cell of the pair.
        first: Position,
        /// Second cell of the pair.
        second: Position,
    },
}

/// An ordered list of [`ClueSpec`]s with helpers for common variants.
///
/// The helpers append and return `&mut Self` so they can be chained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClueSpecs {
    specs: Vec<ClueSpec>,
}

const KNIGHT_MOVES: [(i16, i16); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_MOVES: [(i16, i16); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

impl ClueSpecs {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a raw specification.
    pub fn push(&mut self, spec: ClueSpec) -> &mut Self {
        self.specs.push(spec);
        self
    }

    /// Number of specifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns `true` if there is no specification.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Iterates over the specifications in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, ClueSpec> {
        self.specs.iter()
    }

    /// Appends a uniqueness rule.
    pub fn uniqueness(
        &mut self,
        name: impl Into<String>,
        positions: impl IntoIterator<Item = Position>,
    ) -> &mut Self {
        self.push(ClueSpec::Uniqueness {
            name: name.into(),
            positions: positions.into_iter().collect(),
        })
    }

    /// Appends a completeness rule.
    pub fn completeness(
        &mut self,
        name: impl Into<String>,
        positions: impl IntoIterator<Item = Position>,
        values: Option<CandidateSet>,
    ) -> &mut Self {
        self.push(ClueSpec::Completeness {
            name: name.into(),
            positions: positions.into_iter().collect(),
            values,
        })
    }

    /// Appends a house: every value exactly once among `positions`.
    pub fn house(
        &mut self,
        name: impl Into<String>,
        positions: impl IntoIterator<Item = Position>,
    ) -> &mut Self {
        let name = name.into();
        let positions: Vec<_> = positions.into_iter().collect();
        self.uniqueness(name.clone(), positions.iter().copied());
        self.completeness(name, positions, None)
    }

    /// Appends a relationship between two cells.
    pub fn relationship(
        &mut self,
        name: impl Into<String>,
        first: Position,
        second: Position,
        constraint: Constraint,
        fixed: bool,
    ) -> &mut Self {
        self.push(ClueSpec::Relationship {
            name: name.into(),
            first,
            second,
            constraint,
            fixed,
        })
    }

    /// Appends rows, columns and `box_width` x `box_height` boxes as houses.
    ///
    /// Boxes are only added for tiles that fit entirely in `bounds`.
    pub fn classic(&mut self, bounds: Bounds, box_width: u8, box_height: u8) -> &mut Self {
        for y in 0..bounds.height() {
            self.house(
                format!("row {}", y + 1),
                (0..bounds.width()).map(|x| Position::new(x, y)),
            );
        }
        for x in 0..bounds.width() {
            self.house(
                format!("column {}", x + 1),
                (0..bounds.height()).map(|y| Position::new(x, y)),
            );
        }
        if box_width == 0 || box_height == 0 {
            return self;
        }
        let (columns, rows) = (bounds.width() / box_width, bounds.height() / box_height);
        for by in 0..rows {
            for bx in 0..columns {
                let number = u32::from(by) * u32::from(columns) + u32::from(bx) + 1;
                let cells = (0..box_height).flat_map(|dy| {
                    (0..box_width)
                        .map(move |dx| Position::new(bx * box_width + dx, by * box_height + dy))
                });
                self.house(format!("box {number}"), cells);
            }
        }
        self
    }

    /// Appends both main diagonals of a square grid as houses.
    pub fn diagonals(&mut self, bounds: Bounds) -> &mut Self {
        let size = bounds.width().min(bounds.height());
        self.house("main diagonal", (0..size).map(|i| Position::new(i, i)));
        self.house(
            "anti-diagonal",
            (0..size).map(|i| Position::new(size - 1 - i, i)),
        )
    }

    /// Cells a chess knight's move apart hold different values.
    pub fn anti_knight(&mut self, bounds: Bounds) -> &mut Self {
        self.different_at_offsets("anti-knight", bounds, &KNIGHT_MOVES)
    }

    /// Cells a chess king's move apart hold different values.
    pub fn anti_king(&mut self, bounds: Bounds) -> &mut Self {
        self.different_at_offsets("anti-king", bounds, &KING_MOVES)
    }

    fn different_at_offsets(
        &mut self,
        rule: &str,
        bounds: Bounds,
        offsets: &[(i16, i16)],
    ) -> &mut Self {
        for pos in bounds.positions() {
            for &(dx, dy) in offsets {
                let Some(other) = pos.offset(dx, dy, bounds) else {
                    continue;
                };
                if other > pos {
                    self.relationship(
                        format!("{rule} {pos}-{other}"),
                        pos,
                        other,
                        Constraint::Different,
                        true,
                    );
                }
            }
        }
        self
    }

    /// A white Kropki dot: the values are consecutive.
    pub fn kropki_white(&mut self, first: Position, second: Position) -> &mut Self {
        self.relationship(
            format!("white dot {first}-{second}"),
            first,
            second,
            Constraint::DifferBy(1),
            true,
        )
    }

    /// A black Kropki dot: one value is double the other.
    pub fn kropki_black(&mut self, first: Position, second: Position) -> &mut Self {
        self.relationship(
            format!("black dot {first}-{second}"),
            first,
            second,
            Constraint::Ratio(2),
            true,
        )
    }

    /// A thermometer: values strictly increase from the bulb along `cells`.
    pub fn thermometer(
        &mut self,
        name: impl Into<String>,
        cells: impl IntoIterator<Item = Position>,
    ) -> &mut Self {
        let name = name.into();
        let cells: Vec<_> = cells.into_iter().collect();
        for pair in cells.windows(2) {
            self.relationship(name.clone(), pair[0], pair[1], Constraint::LessThan, true);
        }
        self
    }

    /// A marked pair whose values sum to `sum` (an X is 10, a V is 5).
    pub fn sum_pair(&mut self, first: Position, second: Position, sum: u8) -> &mut Self {
        self.relationship(
            format!("sum {sum} {first}-{second}"),
            first,
            second,
            Constraint::SumIs(sum),
            true,
        )
    }

    /// Forbids every orthogonally adjacent pair from summing to any of
    /// `sums`, except pairs that carry a fixed relationship.
    pub fn negative_sums(&mut self, bounds: Bounds, sums: &[u8]) -> &mut Self {
        for pos in bounds.positions() {
            for (dx, dy) in [(1, 0), (0, 1)] {
                let Some(other) = pos.offset(dx, dy, bounds) else {
                    continue;
                };
                for &sum in sums {
                    self.relationship(
                        format!("no sum {sum} {pos}-{other}"),
                        pos,
                        other,
                        Constraint::SumIsNot(sum),
                        false,
                    );
                }
            }
        }
        self
    }
}

impl IntoIterator for ClueSpecs {
    type Item = ClueSpec;
    type IntoIter = std::vec::IntoIter<ClueSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.into_iter()
    }
}

impl FromIterator<ClueSpec> for ClueSpecs {
    fn from_iter<I: IntoIterator<Item = ClueSpec>>(iter: I) -> Self {
        Self {
            specs: iter.into_iter().collect(),
        }
    }
}

/// Relationships collected for one ordered pair of cells.
#[derive(Debug, Default)]
struct PairSpecs {
    fixed: Vec<(String, Constraint)>,
    loose: Vec<(String, Constraint)>,
}

/// The validated clue set of one puzzle configuration.
///
/// Immutable once built; [`Grid`](crate::Grid)s share it through an `Arc`.
#[derive(Debug)]
pub struct ClueSource {
    bounds: Bounds,
    values: ValueDomain,
    clues: Vec<Clue>,
    by_position: Vec<Vec<ClueId>>,
}

impl ClueSource {
    /// Validates `specs` and builds the clue set.
    ///
    /// # Errors
    ///
    /// Returns [`ClueSourceError`] if a specification references cells outside
    /// `bounds`, lists a cell twice, cannot fit the value domain, or if fixed
    /// relationships on a pair contradict each other.
    pub fn build(
        specs: impl IntoIterator<Item = ClueSpec>,
        bounds: Bounds,
        values: ValueDomain,
    ) -> Result<Self, ClueSourceError> {
        let mut clues: Vec<Clue> = Vec::new();
        let mut seen = HashSet::new();
        let mut pairs: BTreeMap<(Position, Position), PairSpecs> = BTreeMap::new();

        for spec in specs {
            match spec {
                ClueSpec::Uniqueness { name, positions } => {
                    let domain = validate_domain(&name, positions, bounds)?;
                    if domain.len() > values.len() {
                        return Err(ClueSourceError::TooManyCells {
                            clue: name,
                            cells: domain.len(),
                            values: values.len(),
                        });
                    }
                    if seen.insert((false, domain.clone(), CandidateSet::EMPTY)) {
                        clues.push(UniquenessClue::new(name, domain).into());
                    }
                }
                ClueSpec::Completeness {
                    name,
                    positions,
                    values: required,
                } => {
                    let domain = validate_domain(&name, positions, bounds)?;
                    let required = required.unwrap_or(values.all());
                    if let Some(value) = required.difference(values.all()).first() {
                        return Err(ClueSourceError::ValueOutsideDomain { clue: name, value });
                    }
                    if domain.len() < required.len() {
                        return Err(ClueSourceError::TooFewCells {
                            clue: name,
                            cells: domain.len(),
                            values: required.len(),
                        });
                    }
                    if seen.insert((true, domain.clone(), required)) {
                        clues.push(CompletenessClue::new(name, domain, required).into());
                    }
                }
                ClueSpec::Relationship {
                    name,
                    first,
                    second,
                    constraint,
                    fixed,
                } => {
                    for position in [first, second] {
                        if !bounds.contains(position) {
                            return Err(ClueSourceError::OutOfBounds {
                                clue: name,
                                position,
                            });
                        }
                    }
                    if first == second {
                        return Err(ClueSourceError::DuplicatePosition {
                            clue: name,
                            position: first,
                        });
                    }
                    let (key, constraint) = if first < second {
                        ((first, second), constraint)
                    } else {
                        ((second, first), constraint.flipped())
                    };
                    let entry = pairs.entry(key).or_default();
                    if fixed {
                        entry.fixed.push((name, constraint));
                    } else {
                        entry.loose.push((name, constraint));
                    }
                }
            }
        }

        let relationship_count = pairs.len();
        for ((first, second), pair) in pairs {
            let chosen = if pair.fixed.is_empty() {
                pair.loose
            } else {
                pair.fixed
            };
            let (names, constraints): (BTreeSet<String>, Vec<Constraint>) =
                chosen.into_iter().unzip();
            let Some(constraint) = Constraint::combine(constraints) else {
                continue;
            };
            let clue = RelationshipClue::new(
                names.into_iter().collect::<Vec<_>>().join(" + "),
                first,
                second,
                constraint,
                values.all(),
            );
            if clue.constraint().support_table(values.all()).is_unsatisfiable() {
                return Err(ClueSourceError::ConflictingConstraints { first, second });
            }
            clues.push(clue.into());
        }

        let mut by_position = vec![Vec::new(); bounds.len()];
        for (index, clue) in clues.iter().enumerate() {
            let id = ClueId::new(u32::try_from(index).unwrap_or(u32::MAX));
            for &pos in clue.domain() {
                by_position[bounds.linear_index(pos)].push(id);
            }
        }

        log::debug!(
            "built clue source: {} clues ({} relationship pairs) over {}x{} with {} values",
            clues.len(),
            relationship_count,
            bounds.width(),
            bounds.height(),
            values.len(),
        );

        Ok(Self {
            bounds,
            values,
            clues,
            by_position,
        })
    }

    /// The grid dimensions.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The value domain.
    #[must_use]
    pub fn values(&self) -> &ValueDomain {
        &self.values
    }

    /// Number of clues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clues.len()
    }

    /// Returns `true` if the puzzle has no clue.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clues.is_empty()
    }

    /// Returns the clue for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this source.
    #[must_use]
    pub fn clue(&self, id: ClueId) -> &Clue {
        &self.clues[id.index()]
    }

    /// Iterates over every clue in evaluation order.
    pub fn clues(&self) -> impl ExactSizeIterator<Item = (ClueId, &Clue)> {
        self.clues.iter().enumerate().map(|(index, clue)| {
            (
                ClueId::new(u32::try_from(index).unwrap_or(u32::MAX)),
                clue,
            )
        })
    }

    /// Returns the clues whose domain contains `pos`, in evaluation order.
    #[must_use]
    pub fn clues_at(&self, pos: Position) -> &[ClueId] {
        &self.by_position[self.bounds.linear_index(pos)]
    }

    /// Returns the clues whose domain meets any of `positions`.
    pub fn clues_touching<'a>(
        &self,
        positions: impl IntoIterator<Item = &'a Position>,
    ) -> BTreeSet<ClueId> {
        positions
            .into_iter()
            .flat_map(|pos| self.clues_at(*pos).iter().copied())
            .collect()
    }
}

fn validate_domain(
    name: &str,
    positions: Vec<Position>,
    bounds: Bounds,
) -> Result<Vec<Position>, ClueSourceError> {
    if positions.is_empty() {
        return Err(ClueSourceError::EmptyDomain {
            clue: name.to_owned(),
        });
    }
    let mut domain = positions;
    domain.sort_unstable();
    for window in domain.windows(2) {
        if window[0] == window[1] {
            return Err(ClueSourceError::DuplicatePosition {
                clue: name.to_owned(),
                position: window[0],
            });
        }
    }
    if let Some(&position) = domain.iter().find(|pos| !bounds.contains(**pos)) {
        return Err(ClueSourceError::OutOfBounds {
            clue: name.to_owned(),
            position,
        });
    }
    Ok(domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits() -> ValueDomain {
        ValueDomain::digits(1..=9).unwrap()
    }

    #[test]
    fn test_classic_layout() {
        let bounds = Bounds::new(9, 9);
        let mut specs = ClueSpecs::new();
        specs.classic(bounds, 3, 3);
        let source = ClueSource::build(specs, bounds, digits()).unwrap();
        assert_eq!(source.len(), 54);
        // row, column and box, each as uniqueness and completeness
        assert_eq!(source.clues_at(Position::new(4, 4)).len(), 6);
        let names: BTreeSet<_> = source
            .clues_at(Position::new(4, 4))
            .iter()
            .map(|id| source.clue(*id).name())
            .collect();
        assert_eq!(names, BTreeSet::from(["row 5", "column 5", "box 5"]));
    }

    #[test]
    fn test_duplicate_houses_collapse() {
        let bounds = Bounds::new(9, 9);
        let mut specs = ClueSpecs::new();
        specs.classic(bounds, 3, 3).classic(bounds, 3, 3);
        let source = ClueSource::build(specs, bounds, digits()).unwrap();
        assert_eq!(source.len(), 54);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut specs = ClueSpecs::new();
        specs.uniqueness("bad", [Position::new(0, 0), Position::new(9, 0)]);
        assert_eq!(
            ClueSource::build(specs, Bounds::new(9, 9), digits()).unwrap_err(),
            ClueSourceError::OutOfBounds {
                clue: "bad".to_owned(),
                position: Position::new(9, 0),
            }
        );
    }

    #[test]
    fn test_size_validation() {
        let bounds = Bounds::new(10, 1);
        let mut specs = ClueSpecs::new();
        specs.uniqueness("long", bounds.positions());
        assert!(matches!(
            ClueSource::build(specs, bounds, digits()),
            Err(ClueSourceError::TooManyCells { cells: 10, .. })
        ));

        let mut specs = ClueSpecs::new();
        specs.completeness("short", Bounds::new(8, 1).positions(), None);
        assert!(matches!(
            ClueSource::build(specs, bounds, digits()),
            Err(ClueSourceError::TooFewCells { cells: 8, .. })
        ));
    }

    #[test]
    fn test_swapped_pair_is_flipped_and_merged() {
        let a = Position::new(0, 0);
        let b = Position::new(1, 0);
        let mut specs = ClueSpecs::new();
        specs
            .relationship("greater", b, a, Constraint::GreaterThan, true)
            .relationship("dot", a, b, Constraint::DifferBy(1), true);
        let source = ClueSource::build(specs, Bounds::new(2, 1), digits()).unwrap();
        assert_eq!(source.len(), 1);
        let Clue::Relationship(clue) = source.clue(ClueId::new(0)) else {
            panic!("expected a relationship");
        };
        assert_eq!(clue.positions(), [a, b]);
        assert_eq!(
            clue.constraint(),
            &Constraint::combine([Constraint::LessThan, Constraint::DifferBy(1)]).unwrap()
        );
        assert_eq!(clue.name(), "dot + greater");
    }

    #[test]
    fn test_fixed_overrides_loose() {
        let bounds = Bounds::new(2, 1);
        let (a, b) = (Position::new(0, 0), Position::new(1, 0));
        let mut specs = ClueSpecs::new();
        specs.negative_sums(bounds, &[5, 10]).sum_pair(a, b, 10);
        let source = ClueSource::build(specs, bounds, digits()).unwrap();
        let Clue::Relationship(clue) = source.clue(ClueId::new(0)) else {
            panic!("expected a relationship");
        };
        assert_eq!(clue.constraint(), &Constraint::SumIs(10));
    }

    #[test]
    fn test_conflicting_fixed_constraints() {
        let (a, b) = (Position::new(0, 0), Position::new(1, 0));
        let mut specs = ClueSpecs::new();
        specs
            .relationship("lt", a, b, Constraint::LessThan, true)
            .relationship("gt", a, b, Constraint::GreaterThan, true);
        assert_eq!(
            ClueSource::build(specs, Bounds::new(2, 1), digits()).unwrap_err(),
            ClueSourceError::ConflictingConstraints {
                first: a,
                second: b
            }
        );
    }

    #[test]
    fn test_anti_knight_pairs() {
        let bounds = Bounds::new(3, 3);
        let mut specs = ClueSpecs::new();
        specs.anti_knight(bounds);
        let source = ClueSource::build(specs, bounds, digits()).unwrap();
        // every cell but the center has two knight neighbours
        assert_eq!(source.len(), 8);
        assert!(source.clues_at(Position::new(1, 1)).is_empty());
    }
}
