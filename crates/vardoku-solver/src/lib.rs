//! Constraint propagation and case analysis for variant number-place puzzles.
//!
//! A puzzle is a set of clues over a rectangular grid. Every cell holds the
//! [`CandidateSet`](vardoku_core::CandidateSet) of values it may still take,
//! and solving only ever removes candidates.
//!
//! # Overview
//!
//! - [`ClueSpecs`] and [`ClueSource`]: declare rules and validate them into an
//!   immutable, shareable clue set. Relationship rules on the same pair of
//!   cells are merged into one [`Constraint`].
//! - [`Grid`]: an immutable snapshot of every cell's candidates.
//! - [`clue`]: the closed family of rules. Each [`ClueRule::evaluate`] returns an
//!   [`UpdateResult`], a batch of narrowings with [`Reasons`].
//! - [`iterate`] and [`propagate`]: merge clue results pass by pass until a
//!   fixed point, optionally on the rayon pool.
//! - [`bifurcate`]: assume each candidate of a cell and remove those that always
//!   end in a contradiction.
//! - [`RandomSolveIncremental`]: a seeded guess-and-backtrack search yielding
//!   complete solutions lazily.
//! - [`Solver`]: ties the above together under a [`SolverConfig`].
//! - [`solve_puzzle`] and [`solve_puzzle_async`]: solve straight from text.
//!
//! Long-running calls observe a [`Cancellation`] flag and return [`Cancelled`].
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use vardoku_core::{Bounds, Position, ValueDomain};
//! use vardoku_solver::{Cancellation, ClueSource, ClueSpecs, Grid, Solver, SolverConfig};
//!
//! let bounds = Bounds::new(4, 4);
//! let mut specs = ClueSpecs::new();
//! specs
//!     .classic(bounds, 2, 2)
//!     .kropki_black(Position::new(0, 0), Position::new(1, 0));
//! let source = Arc::new(ClueSource::build(specs, bounds, ValueDomain::digits(1..=4)?)?);
//! let grid = Grid::parse(source, "1...\n....\n....\n....")?;
//!
//! let result = Solver::new(SolverConfig::default()).solve(&grid, &Cancellation::new())?;
//! assert!(!result.is_contradiction());
//! assert_eq!(result.grid.to_text().lines().next(), Some("12.."));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use self::{
    bifurcation::*, cancellation::*, clue::*, clue_source::*, config::*, constraint::*, grid::*,
    propagation::*, puzzle::*, random_solver::*, reason::*, solver::*, update::*,
};

mod bifurcation;
mod cancellation;
pub mod clue;
mod clue_source;
mod config;
mod constraint;
mod grid;
mod propagation;
mod puzzle;
mod random_solver;
mod reason;
mod solver;
mod update;

#[cfg(test)]
mod testing;
