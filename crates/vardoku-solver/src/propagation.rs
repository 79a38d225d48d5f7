//! Fixed-point propagation.
//!
//! [`iterate`] evaluates clues against one grid snapshot and applies the merged
//! narrowings; [`propagate`] repeats it until nothing changes. Every clue
//! deduction is sound and only ever removes candidates, so the fixed point does
//! not depend on the order in which clues run or on whether they run in
//! parallel.

use std::collections::BTreeSet;

use rayon::prelude::*;
use vardoku_core::Position;

use crate::{Cancellation, Cancelled, ClueId, ClueRule, Grid, SolverConfig, UpdateResult};

/// How the results of one pass are merged.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum MergePolicy {
    /// Merge every clue's result.
    #[default]
    Default,
    /// Keep only the first non-empty result, in clue order.
    ///
    /// Meant for stepping through a solve; hints are ignored.
    SingleStep,
}

/// Runs one propagation pass.
///
/// With a `hint`, only clues whose domain meets one of the hinted positions
/// are evaluated. The hint only saves work: clues outside it cannot find
/// anything new after a pass that changed only the hinted cells.
///
/// Returns the narrowed grid and the merged result, or the unchanged grid and
/// an empty result at a fixed point. Contradicted cells are reported but keep
/// their candidates.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use vardoku_core::{Bounds, Position, ValueDomain};
/// use vardoku_solver::{ClueSource, ClueSpecs, Grid, MergePolicy, SolverConfig, iterate};
///
/// let bounds = Bounds::new(4, 1);
/// let mut specs = ClueSpecs::new();
/// specs.house("row", bounds.positions());
/// let source = Arc::new(ClueSource::build(specs, bounds, ValueDomain::digits(1..=4)?)?);
/// let grid = Grid::parse(source, "123.")?;
///
/// let (grid, result) = iterate(&grid, MergePolicy::Default, None, &SolverConfig::default());
/// assert_eq!(result.updates().len(), 1);
/// assert_eq!(grid.to_text(), "1234");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[must_use]
pub fn iterate(
    grid: &Grid,
    policy: MergePolicy,
    hint: Option<&BTreeSet<Position>>,
    config: &SolverConfig,
) -> (Grid, UpdateResult) {
    let source = grid.source();
    let selected: Vec<ClueId> = match (policy, hint) {
        (MergePolicy::Default, Some(hint)) => source.clues_touching(hint).into_iter().collect(),
        _ => source.clues().map(|(id, _)| id).collect(),
    };
    let evaluate = |id: &ClueId| source.clue(*id).evaluate(*id, grid, config);

    let result = match policy {
        MergePolicy::Default if config.parallel => selected
            .par_iter()
            .map(evaluate)
            .reduce(UpdateResult::empty, UpdateResult::combine),
        MergePolicy::Default => selected.iter().map(evaluate).collect(),
        MergePolicy::SingleStep => selected
            .iter()
            .map(evaluate)
            .find(|result| !result.is_empty())
            .unwrap_or_default(),
    };

    if result.is_empty() {
        return (grid.clone(), result);
    }
    log::trace!(
        "pass over {} clues: {} narrowings, {} contradictions",
        selected.len(),
        result.updates().len(),
        result.contradictions().len()
    );
    (grid.apply(&result), result)
}

/// The outcome of [`propagate`].
#[derive(Debug, Clone)]
pub struct Propagation {
    /// The most advanced grid reached.
    pub grid: Grid,
    /// Every narrowing and contradiction found along the way.
    pub result: UpdateResult,
    /// Number of non-empty passes.
    pub passes: usize,
}

impl Propagation {
    /// Returns `true` if propagation stopped on a contradiction.
    #[must_use]
    pub fn is_contradiction(&self) -> bool {
        self.result.has_contradictions()
    }
}

/// Calls [`iterate`] until a fixed point or a contradiction.
///
/// The first pass evaluates every clue; later passes are hinted with the
/// positions the previous pass touched.
///
/// # Errors
///
/// Returns [`Cancelled`] if `cancel` is set before a pass. The grid passed in
/// is unaffected.
pub fn propagate(
    grid: &Grid,
    policy: MergePolicy,
    config: &SolverConfig,
    cancel: &Cancellation,
) -> Result<Propagation, Cancelled> {
    let mut current = grid.clone();
    let mut total = UpdateResult::empty();
    let mut hint: Option<BTreeSet<Position>> = None;
    let mut passes = 0;

    loop {
        cancel.check()?;
        let (next, result) = iterate(&current, policy, hint.as_ref(), config);
        if result.is_empty() {
            break;
        }
        passes += 1;
        let contradicted = result.has_contradictions();
        hint = Some(result.touched_positions());
        total = total.combine(result);
        current = next;
        if contradicted {
            break;
        }
    }

    log::debug!(
        "propagation finished after {passes} passes ({} cells narrowed, {} contradictions)",
        total.updates().len(),
        total.contradictions().len()
    );
    Ok(Propagation {
        grid: current,
        result: total,
        passes,
    })
}

#[cfg(test)]
mod tests {
    use vardoku_core::{Bounds, CandidateSet, Value};

    use super::*;
    use crate::{ClueSpecs, testing::GridTester};

    fn classic() -> ClueSpecs {
        let mut specs = ClueSpecs::new();
        specs.classic(Bounds::new(9, 9), 3, 3);
        specs
    }

    const EMPTY_ROW: &str = ".........";

    #[test]
    fn test_naked_single_by_row() {
        let mut rows = [EMPTY_ROW; 9];
        rows[4] = "12345678.";
        GridTester::from_text(classic(), Bounds::new(9, 9), &rows)
            .propagate()
            .assert_candidates(Position::new(8, 4), [9]);
    }

    #[test]
    fn test_naked_single_by_box() {
        let mut rows = [EMPTY_ROW; 9];
        rows[0] = "123......";
        rows[1] = "456......";
        rows[2] = "78.......";
        GridTester::from_text(classic(), Bounds::new(9, 9), &rows)
            .propagate()
            .assert_candidates(Position::new(2, 2), [9]);
    }

    #[test]
    fn test_conjugate_pair() {
        let mut rows = [EMPTY_ROW; 9];
        rows[0] = "1234....9";
        rows[1] = "....7....";
        rows[2] = ".....8...";
        GridTester::from_text(classic(), Bounds::new(9, 9), &rows)
            .propagate()
            .assert_candidates(Position::new(6, 0), [7, 8])
            .assert_candidates(Position::new(7, 0), [7, 8])
            .assert_candidates(Position::new(4, 0), [5, 6])
            .assert_candidates(Position::new(5, 0), [5, 6]);
    }

    #[test]
    fn test_contradiction_names_holding_cell() {
        let mut rows = [EMPTY_ROW; 9];
        rows[0] = "5........";
        GridTester::from_text(classic(), Bounds::new(9, 9), &rows)
            .with_cell(Position::new(3, 0), CandidateSet::single(Value::new(5)))
            .propagate()
            .assert_contradiction_at(Position::new(3, 0))
            .assert_contradiction_mentions(Position::new(3, 0), Position::new(0, 0));
    }

    #[test]
    fn test_single_step_changes_one_clue_at_a_time() {
        let mut rows = [EMPTY_ROW; 9];
        rows[4] = "12345678.";
        let tester = GridTester::from_text(classic(), Bounds::new(9, 9), &rows);
        let config = SolverConfig::default();
        let (_, result) = iterate(tester.grid(), MergePolicy::SingleStep, None, &config);
        let clues: BTreeSet<_> = result
            .updates()
            .values()
            .flat_map(|update| update.reasons().iter().filter_map(|r| r.clue()))
            .collect();
        assert_eq!(clues.len(), 1);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let rows = [
            "53..7....",
            "6..195...",
            ".98....6.",
            "8...6...3",
            "4..8.3..1",
            "7...2...6",
            ".6....28.",
            "...419..5",
            "....8..79",
        ];
        let tester = GridTester::from_text(classic(), Bounds::new(9, 9), &rows);
        let cancel = Cancellation::new();
        let sequential = propagate(
            tester.grid(),
            MergePolicy::Default,
            &SolverConfig::default(),
            &cancel,
        )
        .unwrap();
        let parallel = propagate(
            tester.grid(),
            MergePolicy::Default,
            &SolverConfig {
                parallel: true,
                ..SolverConfig::default()
            },
            &cancel,
        )
        .unwrap();
        assert_eq!(sequential.grid, parallel.grid);
        assert_eq!(sequential.result, parallel.result);
        assert!(sequential.grid.is_complete());
    }

    #[test]
    fn test_cancelled_before_first_pass() {
        let tester = GridTester::from_text(classic(), Bounds::new(9, 9), &[EMPTY_ROW; 9]);
        let cancel = Cancellation::new();
        cancel.cancel();
        assert!(
            propagate(
                tester.grid(),
                MergePolicy::Default,
                &SolverConfig::default(),
                &cancel
            )
            .is_err()
        );
    }
}
