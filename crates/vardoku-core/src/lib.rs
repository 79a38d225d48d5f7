//! Core data structures for variant number-place puzzles.
//!
//! This crate provides the leaf types shared by the solving engine and by any
//! front end that drives it. They are small `Copy` values designed to be used as
//! map keys and to be manipulated in every propagation step.
//!
//! # Overview
//!
//! - [`position`]: Grid coordinates ([`Position`]) and grid dimensions ([`Bounds`]).
//! - [`value`]: Cell values ([`Value`]) and the legal value set of a puzzle
//!   ([`ValueDomain`]), including token parsing and rendering.
//! - [`candidate_set`]: The bitmask-backed set of remaining values for one cell
//!   ([`CandidateSet`]).
//!
//! # Examples
//!
//! ```
//! use vardoku_core::{Bounds, CandidateSet, Position, Value, ValueDomain};
//!
//! let domain = ValueDomain::digits(1..=9)?;
//! let bounds = Bounds::new(9, 9);
//!
//! let mut candidates = domain.all();
//! candidates.remove(Value::new(5));
//! assert_eq!(candidates.len(), 8);
//!
//! let pos = Position::new(4, 4);
//! assert!(bounds.contains(pos));
//! assert_eq!(bounds.linear_index(pos), 40);
//! # Ok::<(), vardoku_core::DomainError>(())
//! ```

pub mod candidate_set;
pub mod position;
pub mod value;

// Re-export commonly used types
pub use self::{
    candidate_set::CandidateSet,
    position::{Bounds, Position, PositionError},
    value::{DomainError, Value, ValueDomain, ValueParseError},
};
