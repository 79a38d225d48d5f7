//! Test harness for clue and propagation tests.
//!
//! [`GridTester`] keeps the grid a test started from next to the grid after
//! evaluation, so assertions can talk about what changed.
//!
//! ```ignore
//! GridTester::from_text(specs, Bounds::new(9, 1), &["5........"])
//!     .evaluate_once()
//!     .assert_removed_includes(Position::new(1, 0), [5])
//!     .assert_no_change(Position::new(0, 0));
//! ```

use std::sync::Arc;

use vardoku_core::{Bounds, CandidateSet, Position, Value, ValueDomain};

use crate::{
    Cancellation, ClueSource, ClueSpecs, Grid, MergePolicy, SolverConfig, UpdateResult, iterate,
    propagate,
};

/// Tracks an initial grid, the current grid and the last evaluation result.
///
/// Every method takes and returns `self` for chaining. Assertions panic with
/// the caller's location.
#[derive(Debug)]
pub struct GridTester {
    initial: Grid,
    current: Grid,
    result: UpdateResult,
    config: SolverConfig,
}

impl GridTester {
    /// Builds the clues for `bounds` with values 1-9 and parses `rows`.
    ///
    /// # Panics
    ///
    /// Panics if the clues are invalid or the rows cannot be parsed.
    #[track_caller]
    pub fn from_text(specs: ClueSpecs, bounds: Bounds, rows: &[&str]) -> Self {
        let values = ValueDomain::digits(1..=9).unwrap();
        let source = Arc::new(ClueSource::build(specs, bounds, values).unwrap());
        let grid = Grid::parse(source, &rows.join("\n")).unwrap();
        Self {
            initial: grid.clone(),
            current: grid,
            result: UpdateResult::empty(),
            config: SolverConfig::default(),
        }
    }

    /// Overwrites one cell in both the initial and the current grid.
    #[must_use]
    pub fn with_cell(mut self, pos: Position, cell: CandidateSet) -> Self {
        self.initial = self.initial.with_cell(pos, cell);
        self.current = self.current.with_cell(pos, cell);
        self
    }

    /// The current grid.
    pub fn grid(&self) -> &Grid {
        &self.current
    }

    /// Runs a single propagation pass over every clue.
    #[must_use]
    pub fn evaluate_once(mut self) -> Self {
        let (grid, result) = iterate(&self.current, MergePolicy::Default, None, &self.config);
        self.current = grid;
        self.result = result;
        self
    }

    /// Propagates to a fixed point, keeping the accumulated result.
    #[track_caller]
    #[must_use]
    pub fn propagate(mut self) -> Self {
        let propagation = propagate(
            &self.current,
            MergePolicy::Default,
            &self.config,
            &Cancellation::new(),
        )
        .unwrap();
        self.current = propagation.grid;
        self.result = propagation.result;
        self
    }

    /// Asserts the exact candidates of a cell.
    #[track_caller]
    pub fn assert_candidates<const N: usize>(self, pos: Position, values: [u8; N]) -> Self {
        let expected = to_set(values);
        let current = self.current.candidates_at(pos);
        assert_eq!(
            current, expected,
            "Expected candidates {expected} at {pos}, but found {current}"
        );
        self
    }

    /// Asserts that `values` were present initially and are gone now.
    #[track_caller]
    pub fn assert_removed_includes<const N: usize>(self, pos: Position, values: [u8; N]) -> Self {
        let values = to_set(values);
        let initial = self.initial.candidates_at(pos);
        let current = self.current.candidates_at(pos);
        assert!(
            values.is_subset(initial),
            "Expected initial candidates at {pos} to include {values}, but they are {initial}"
        );
        assert!(
            current.intersection(values).is_empty(),
            "Expected {values} to be removed from {pos}, but {current} remains"
        );
        self
    }

    /// Asserts that a cell still holds its initial candidates.
    #[track_caller]
    pub fn assert_no_change(self, pos: Position) -> Self {
        let initial = self.initial.candidates_at(pos);
        let current = self.current.candidates_at(pos);
        assert_eq!(
            initial, current,
            "Expected no change at {pos}, but candidates changed from {initial} to {current}"
        );
        self
    }

    /// Asserts that the last evaluation reported a contradiction at `pos`.
    #[track_caller]
    pub fn assert_contradiction_at(self, pos: Position) -> Self {
        assert!(
            self.result.contradictions().contains_key(&pos),
            "Expected a contradiction at {pos}, but found contradictions at {:?}",
            self.result.contradictions().keys().collect::<Vec<_>>()
        );
        self
    }

    /// Asserts that the contradiction at `pos` cites `holder` as evidence.
    #[track_caller]
    pub fn assert_contradiction_mentions(self, pos: Position, holder: Position) -> Self {
        let Some(reasons) = self.result.contradictions().get(&pos) else {
            panic!("Expected a contradiction at {pos}");
        };
        let positions = reasons.positions();
        assert!(
            positions.contains(&holder),
            "Expected the contradiction at {pos} to mention {holder}, but it mentions {positions:?}"
        );
        self
    }
}

fn to_set<const N: usize>(values: [u8; N]) -> CandidateSet {
    values.into_iter().map(Value::new).collect()
}
