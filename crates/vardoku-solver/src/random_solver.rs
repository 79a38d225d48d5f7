//! Guess-and-backtrack search over complete solutions.
//!
//! [`RandomSolveIncremental`] is a lazy depth-first search. Each step commits to
//! a guess at the most constrained cell, propagates, and backtracks on
//! contradiction. Guess order is shuffled with a seeded PCG generator, so
//! different seeds reach solutions in different orders while a fixed seed
//! replays the same search.

use rand::{SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg64;
use vardoku_core::{Position, Value};

use crate::{Cancellation, Cancelled, Grid, MergePolicy, SolverConfig, propagate};

/// One step of a [`RandomSolveIncremental`] search.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum RandomSolveEvent {
    /// A consistent but incomplete grid, one guess deeper than its parent.
    Advanced(Grid),
    /// A complete grid satisfying every clue.
    Solved(Grid),
}

impl RandomSolveEvent {
    /// The grid reached by this step.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        match self {
            Self::Advanced(grid) | Self::Solved(grid) => grid,
        }
    }
}

/// Guess and backtrack counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomSolveStats {
    /// Values committed to.
    pub guesses: usize,
    /// Cells whose every value was exhausted.
    pub backtracks: usize,
}

#[derive(Debug)]
struct Frame {
    grid: Grid,
    pos: Position,
    untried: Vec<Value>,
}

/// A lazy, restartable backtracking search.
///
/// Iterating yields every grid the search advances to. Each complete solution
/// is yielded exactly once, as [`RandomSolveEvent::Solved`]. After a
/// cancellation the iterator yields one `Err(Cancelled)` and then ends.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use vardoku_core::{Bounds, ValueDomain};
/// use vardoku_solver::{ClueSource, ClueSpecs, Grid, RandomSolveIncremental, SolverConfig};
///
/// let bounds = Bounds::new(4, 4);
/// let mut specs = ClueSpecs::new();
/// specs.classic(bounds, 2, 2);
/// let source = Arc::new(ClueSource::build(specs, bounds, ValueDomain::digits(1..=4)?)?);
///
/// // An empty 4x4 grid has 288 solutions.
/// let solutions = RandomSolveIncremental::new(Grid::new(source), SolverConfig::default())
///     .with_seed(7)
///     .solutions()
///     .count();
/// assert_eq!(solutions, 288);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct RandomSolveIncremental {
    root: Grid,
    config: SolverConfig,
    cancel: Cancellation,
    seed: u64,
    rng: Pcg64,
    stack: Vec<Frame>,
    started: bool,
    finished: bool,
    stats: RandomSolveStats,
}

impl RandomSolveIncremental {
    /// Starts a search from `grid` with a random seed.
    #[must_use]
    pub fn new(grid: Grid, config: SolverConfig) -> Self {
        let seed = rand::random();
        Self {
            root: grid,
            config,
            cancel: Cancellation::new(),
            seed,
            rng: Pcg64::seed_from_u64(seed),
            stack: Vec::new(),
            started: false,
            finished: false,
            stats: RandomSolveStats::default(),
        }
    }

    /// Pins the seed and restarts the search.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.restart();
        self
    }

    /// Observes `cancel` between guesses.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: Cancellation) -> Self {
        self.cancel = cancel;
        self
    }

    /// The seed in use.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Counters since the last restart.
    #[must_use]
    pub fn stats(&self) -> RandomSolveStats {
        self.stats
    }

    /// Rewinds to the starting grid. The same seed replays the same search.
    pub fn restart(&mut self) {
        self.rng = Pcg64::seed_from_u64(self.seed);
        self.stack.clear();
        self.started = false;
        self.finished = false;
        self.stats = RandomSolveStats::default();
    }

    /// Yields only the complete solutions.
    ///
    /// Ends early, without an error, if the search is cancelled.
    pub fn solutions(self) -> impl Iterator<Item = Grid> {
        self.map_while(Result::ok).filter_map(|event| match event {
            RandomSolveEvent::Solved(grid) => Some(grid),
            RandomSolveEvent::Advanced(_) => None,
        })
    }

    /// Propagates `grid` and turns the outcome into an event, pushing a new
    /// frame when the grid is consistent but incomplete.
    fn settle(&mut self, grid: &Grid) -> Result<Option<RandomSolveEvent>, Cancelled> {
        let propagation = propagate(grid, MergePolicy::Default, &self.config, &self.cancel)?;
        if propagation.is_contradiction() {
            return Ok(None);
        }
        let grid = propagation.grid;
        if grid.cells().any(|(_, cell)| cell.is_empty()) {
            return Ok(None);
        }
        let Some(pos) = most_constrained(&grid) else {
            debug_assert!(grid.is_complete());
            return Ok(Some(RandomSolveEvent::Solved(grid)));
        };
        let mut untried: Vec<Value> = grid.candidates_at(pos).iter().collect();
        untried.shuffle(&mut self.rng);
        self.stack.push(Frame {
            grid: grid.clone(),
            pos,
            untried,
        });
        Ok(Some(RandomSolveEvent::Advanced(grid)))
    }

    fn step(&mut self) -> Result<Option<RandomSolveEvent>, Cancelled> {
        if !self.started {
            self.started = true;
            let root = self.root.clone();
            return self.settle(&root);
        }
        loop {
            self.cancel.check()?;
            let Some(frame) = self.stack.last_mut() else {
                return Ok(None);
            };
            let Some(value) = frame.untried.pop() else {
                self.stack.pop();
                self.stats.backtracks += 1;
                log::trace!("backtracking, depth {}", self.stack.len());
                continue;
            };
            let guess = frame.grid.with_value(frame.pos, value);
            self.stats.guesses += 1;
            if let Some(event) = self.settle(&guess)? {
                return Ok(Some(event));
            }
        }
    }
}

impl Iterator for RandomSolveIncremental {
    type Item = Result<RandomSolveEvent, Cancelled>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.step() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.finished = true;
                log::debug!(
                    "random solve exhausted after {} guesses, {} backtracks",
                    self.stats.guesses,
                    self.stats.backtracks
                );
                None
            }
            Err(cancelled) => {
                self.finished = true;
                Some(Err(cancelled))
            }
        }
    }
}

/// Fewest candidates first, ties broken in row-major order. `None` once every
/// cell is resolved or empty.
fn most_constrained(grid: &Grid) -> Option<Position> {
    grid.unresolved_positions()
        .min_by_key(|pos| (grid.candidates_at(*pos).len(), *pos))
}
