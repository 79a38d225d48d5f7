//! Solve orchestration: propagation, then bifurcation, until done or stuck.

use std::collections::{BTreeMap, BTreeSet};

use vardoku_core::Position;

use crate::{
    BifurcationResult, Cancellation, Cancelled, Grid, MergePolicy, Propagation,
    RandomSolveEvent, RandomSolveIncremental, Reasons, SolverConfig, UpdateResult, bifurcate,
    iterate, propagate,
};

/// Counters collected by [`Solver::solve`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Non-empty propagation passes.
    pub passes: usize,
    /// Calls to [`bifurcate`].
    pub bifurcation_rounds: usize,
    /// Hypotheses explored by bifurcation.
    pub hypotheses: usize,
    /// Candidates removed by bifurcation.
    pub eliminations: usize,
}

/// The outcome of [`Solver::solve`].
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// The most advanced contradiction-free grid reached.
    pub grid: Grid,
    /// Contradictions that stopped the solve, with their reasons.
    pub contradictions: BTreeMap<Position, Reasons>,
    /// `true` if `grid` is complete and no contradiction was found.
    pub success: bool,
    /// Complete grids found along the way.
    pub completed: BTreeSet<Grid>,
    /// Work counters.
    pub stats: SolveStats,
}

impl SolveResult {
    /// Returns `true` if the solve stopped on a contradiction.
    #[must_use]
    pub fn is_contradiction(&self) -> bool {
        !self.contradictions.is_empty()
    }

    /// Returns `true` if the solve ran out of deductions on an incomplete grid.
    #[must_use]
    pub fn is_stalled(&self) -> bool {
        !self.success && !self.is_contradiction()
    }
}

/// Entry point bundling a [`SolverConfig`] with every solving operation.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use vardoku_core::{Bounds, ValueDomain};
/// use vardoku_solver::{Cancellation, ClueSource, ClueSpecs, Grid, Solver, SolverConfig};
///
/// let bounds = Bounds::new(9, 9);
/// let mut specs = ClueSpecs::new();
/// specs.classic(bounds, 3, 3);
/// let source = Arc::new(ClueSource::build(specs, bounds, ValueDomain::digits(1..=9)?)?);
/// let grid = Grid::parse(
///     source,
///     "53..7....\n6..195...\n.98....6.\n8...6...3\n4..8.3..1\n7...2...6\n.6....28.\n...419..5\n....8..79",
/// )?;
///
/// let result = Solver::new(SolverConfig::default()).solve(&grid, &Cancellation::new())?;
/// assert!(result.success);
/// assert!(result.grid.to_text().starts_with("534678912"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    /// Creates a solver.
    #[must_use]
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Runs one propagation pass. See [`iterate`].
    #[must_use]
    pub fn iterate(
        &self,
        grid: &Grid,
        policy: MergePolicy,
        hint: Option<&BTreeSet<Position>>,
    ) -> (Grid, UpdateResult) {
        iterate(grid, policy, hint, &self.config)
    }

    /// Propagates to a fixed point. See [`propagate`].
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` is set.
    pub fn propagate(&self, grid: &Grid, cancel: &Cancellation) -> Result<Propagation, Cancelled> {
        propagate(grid, MergePolicy::Default, &self.config, cancel)
    }

    /// Runs case analysis up to the configured depth. See [`bifurcate`].
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` is set.
    pub fn bifurcate(
        &self,
        grid: &Grid,
        policy: MergePolicy,
        cancel: &Cancellation,
    ) -> Result<BifurcationResult, Cancelled> {
        bifurcate(
            grid,
            self.config.max_bifurcation_depth,
            policy,
            &self.config,
            cancel,
        )
    }

    /// Alternates propagation and bifurcation while either makes progress.
    ///
    /// Stops on a complete grid, a contradiction, or when bifurcation finds
    /// nothing more to eliminate.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` is set; `grid` is left untouched.
    pub fn solve(&self, grid: &Grid, cancel: &Cancellation) -> Result<SolveResult, Cancelled> {
        let mut stats = SolveStats::default();
        let mut completed = BTreeSet::new();
        let mut current = grid.clone();

        let contradictions = loop {
            let propagation = self.propagate(&current, cancel)?;
            stats.passes += propagation.passes;
            current = propagation.grid;
            if propagation.result.has_contradictions() {
                break propagation.result.into_contradictions();
            }
            if current.is_complete() {
                completed.insert(current.clone());
                break BTreeMap::new();
            }

            let bifurcation = self.bifurcate(&current, MergePolicy::Default, cancel)?;
            stats.bifurcation_rounds += 1;
            stats.hypotheses += bifurcation.hypotheses;
            completed.extend(bifurcation.completed);
            if bifurcation.update.has_contradictions() {
                break bifurcation.update.into_contradictions();
            }
            if bifurcation.update.is_empty() {
                break BTreeMap::new();
            }
            let next = current.apply(&bifurcation.update);
            stats.eliminations += current
                .diff(&next)
                .iter()
                .map(|change| change.removed().len())
                .sum::<usize>();
            current = next;
        };

        let success = contradictions.is_empty() && current.is_complete();
        log::debug!(
            "solve finished: success={success}, {} contradictions, {stats:?}",
            contradictions.len()
        );
        Ok(SolveResult {
            grid: current,
            contradictions,
            success,
            completed,
            stats,
        })
    }

    /// Starts a backtracking search for complete solutions.
    #[must_use]
    pub fn random_solve(&self, grid: &Grid) -> RandomSolveIncremental {
        RandomSolveIncremental::new(grid.clone(), self.config)
    }

    /// Counts complete solutions, stopping once `limit` are found.
    ///
    /// `count_solutions(grid, 2, ..) == Ok(1)` checks that a puzzle is unique.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] if `cancel` is set before the count finishes.
    pub fn count_solutions(
        &self,
        grid: &Grid,
        limit: usize,
        cancel: &Cancellation,
    ) -> Result<usize, Cancelled> {
        let mut count = 0;
        if limit == 0 {
            return Ok(count);
        }
        for event in self
            .random_solve(grid)
            .with_cancellation(cancel.clone())
        {
            if let RandomSolveEvent::Solved(_) = event? {
                count += 1;
                if count >= limit {
                    break;
                }
            }
        }
        Ok(count)
    }
}
