//! Depth-bounded case analysis.
//!
//! Bifurcation never commits to a guess. For an unresolved cell it assumes
//! each remaining value in turn, propagates, and removes the values whose
//! assumption always ends in a contradiction. Complete grids met along the way
//! are collected so callers can spot solutions early.

use std::collections::BTreeSet;

use rayon::prelude::*;
use vardoku_core::{CandidateSet, Position, Value};

use crate::{
    Cancellation, Cancelled, Grid, MergePolicy, Reason, ReasonKind, Reasons, SolverConfig,
    UpdateResult, propagate,
};

/// The outcome of [`bifurcate`].
#[derive(Debug, Clone, Default)]
pub struct BifurcationResult {
    /// Forced eliminations, or a contradiction if every value of some cell was
    /// refuted.
    pub update: UpdateResult,
    /// Complete grids found while exploring hypotheses.
    pub completed: BTreeSet<Grid>,
    /// Number of hypotheses explored, including nested ones.
    pub hypotheses: usize,
}

impl BifurcationResult {
    /// Returns `true` if nothing was eliminated and no contradiction found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.update.is_empty()
    }
}

/// What became of one hypothesis.
#[derive(Debug)]
enum Branch {
    /// The hypothesis is impossible; the contradicted cells are kept as
    /// evidence.
    Contradiction(BTreeSet<Position>),
    /// The hypothesis survived.
    Open,
}

#[derive(Debug)]
struct Exploration {
    branch: Branch,
    completed: BTreeSet<Grid>,
    hypotheses: usize,
}

/// Removes candidates whose assumption always leads to a contradiction.
///
/// Cells are visited fewest candidates first, ties in row-major order. For
/// every value of a cell the grid is narrowed to that value and propagated;
/// with `max_depth > 1` a stalled branch bifurcates again one level deeper.
/// Refuted values are removed with an
/// [`AllHypothesesContradict`](ReasonKind::AllHypothesesContradict) reason. If
/// every value of a cell is refuted the result holds a contradiction at that
/// cell and the search stops.
///
/// With [`MergePolicy::SingleStep`] the search stops at the first cell with an
/// elimination. With `config.parallel` the values of a cell are explored on
/// the rayon pool; the result is the same either way.
///
/// # Errors
///
/// Returns [`Cancelled`] if `cancel` is set between hypotheses.
pub fn bifurcate(
    grid: &Grid,
    max_depth: usize,
    policy: MergePolicy,
    config: &SolverConfig,
    cancel: &Cancellation,
) -> Result<BifurcationResult, Cancelled> {
    let mut outcome = BifurcationResult::default();
    if max_depth == 0 {
        return Ok(outcome);
    }

    let mut positions: Vec<Position> = grid.unresolved_positions().collect();
    positions.sort_by_key(|pos| (grid.candidates_at(*pos).len(), *pos));

    for pos in positions {
        cancel.check()?;
        let cell = grid.candidates_at(pos);
        let values: Vec<Value> = cell.iter().collect();
        let explore_value =
            |value: &Value| explore(&grid.with_value(pos, *value), max_depth - 1, config, cancel);
        let explorations: Vec<Exploration> = if config.parallel {
            values.par_iter().map(explore_value).collect::<Result<_, _>>()?
        } else {
            values.iter().map(explore_value).collect::<Result<_, _>>()?
        };

        let mut refuted = CandidateSet::EMPTY;
        let mut reasons = Reasons::new();
        for (value, exploration) in values.iter().zip(explorations) {
            outcome.hypotheses += exploration.hypotheses;
            outcome.completed.extend(exploration.completed);
            if let Branch::Contradiction(evidence) = exploration.branch {
                refuted.insert(*value);
                reasons.insert(Reason::new(
                    ReasonKind::AllHypothesesContradict { value: *value },
                    None,
                    evidence.into_iter().chain([pos]),
                ));
            }
        }
        if refuted.is_empty() {
            continue;
        }

        log::debug!("bifurcation at {pos} refuted {refuted} of {cell}");
        let remaining = cell.difference(refuted);
        outcome.update = outcome
            .update
            .combine(UpdateResult::single(pos, remaining, reasons));
        if remaining.is_empty() || policy.is_single_step() {
            break;
        }
    }

    Ok(outcome)
}

fn explore(
    hypothesis: &Grid,
    depth: usize,
    config: &SolverConfig,
    cancel: &Cancellation,
) -> Result<Exploration, Cancelled> {
    let mut exploration = Exploration {
        branch: Branch::Open,
        completed: BTreeSet::new(),
        hypotheses: 1,
    };
    let mut grid = hypothesis.clone();
    loop {
        let propagation = propagate(&grid, MergePolicy::Default, config, cancel)?;
        if propagation.is_contradiction() {
            let evidence = propagation
                .result
                .contradictions()
                .keys()
                .copied()
                .collect();
            exploration.branch = Branch::Contradiction(evidence);
            return Ok(exploration);
        }
        grid = propagation.grid;
        if grid.is_complete() {
            exploration.completed.insert(grid);
            return Ok(exploration);
        }
        if depth == 0 {
            return Ok(exploration);
        }

        let nested = bifurcate(&grid, depth, MergePolicy::Default, config, cancel)?;
        exploration.hypotheses += nested.hypotheses;
        exploration.completed.extend(nested.completed);
        if nested.update.has_contradictions() {
            let evidence = nested.update.contradictions().keys().copied().collect();
            exploration.branch = Branch::Contradiction(evidence);
            return Ok(exploration);
        }
        if nested.update.is_empty() {
            return Ok(exploration);
        }
        grid = grid.apply(&nested.update);
    }
}
