//! Puzzle rules.
//!
//! A [`Clue`] reads a [`Grid`](crate::Grid) and reports narrowings for the
//! cells of its domain. Clues never mutate the grid, so any number of them can
//! be evaluated against the same snapshot, in any order or in parallel.
//!
//! The set of clue shapes is closed:
//!
//! - [`UniquenessClue`]: a placed value cannot appear elsewhere in the domain;
//!   also finds naked subsets (cells that together hold exactly as many values).
//! - [`CompletenessClue`]: every required value appears somewhere in the
//!   domain; finds hidden singles and hidden subsets.
//! - [`RelationshipClue`]: a [`Constraint`](crate::Constraint) between two
//!   cells, enforced by arc consistency through precomputed support tables.

use std::{
    fmt::{self, Debug, Display},
    ops::BitOr,
};

use tinyvec::ArrayVec;
use vardoku_core::{CandidateSet, Position};

pub use self::{
    completeness::CompletenessClue, relationship::RelationshipClue, uniqueness::UniquenessClue,
};
use crate::{Grid, SolverConfig, UpdateResult};

mod completeness;
mod relationship;
mod uniqueness;

/// Handle of a clue inside its [`ClueSource`](crate::ClueSource).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct ClueId(u32);

impl ClueId {
    /// Creates a handle from an index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the index into the clue list.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for ClueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Behaviour shared by every clue shape.
pub trait ClueRule: Debug + Send + Sync {
    /// Human-readable name, e.g. `"row 3"`.
    fn name(&self) -> &str;

    /// The governed positions, in row-major order.
    fn domain(&self) -> &[Position];

    /// Computes the narrowings this clue implies on `grid`.
    ///
    /// `id` is recorded in every reason produced.
    fn evaluate(&self, id: ClueId, grid: &Grid, config: &SolverConfig) -> UpdateResult;
}

/// A validated puzzle rule.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From, derive_more::IsVariant)]
pub enum Clue {
    /// See [`UniquenessClue`].
    Uniqueness(UniquenessClue),
    /// See [`CompletenessClue`].
    Completeness(CompletenessClue),
    /// See [`RelationshipClue`].
    Relationship(RelationshipClue),
}

impl ClueRule for Clue {
    fn name(&self) -> &str {
        match self {
            Self::Uniqueness(clue) => clue.name(),
            Self::Completeness(clue) => clue.name(),
            Self::Relationship(clue) => clue.name(),
        }
    }

    fn domain(&self) -> &[Position] {
        match self {
            Self::Uniqueness(clue) => clue.domain(),
            Self::Completeness(clue) => clue.domain(),
            Self::Relationship(clue) => clue.domain(),
        }
    }

    fn evaluate(&self, id: ClueId, grid: &Grid, config: &SolverConfig) -> UpdateResult {
        match self {
            Self::Uniqueness(clue) => clue.evaluate(id, grid, config),
            Self::Completeness(clue) => clue.evaluate(id, grid, config),
            Self::Relationship(clue) => clue.evaluate(id, grid, config),
        }
    }
}

/// Largest subset size searched by the subset techniques.
pub(crate) const MAX_SUBSET_SIZE: usize = 8;

pub(crate) type Subset = ArrayVec<[usize; MAX_SUBSET_SIZE]>;

/// A bit mask the subset search can union and count.
pub(crate) trait SubsetMask: Copy + BitOr<Output = Self> {
    const EMPTY: Self;

    fn count(self) -> usize;
}

impl SubsetMask for CandidateSet {
    const EMPTY: Self = CandidateSet::EMPTY;

    fn count(self) -> usize {
        self.len()
    }
}

impl SubsetMask for u64 {
    const EMPTY: Self = 0;

    fn count(self) -> usize {
        self.count_ones() as usize
    }
}

/// Calls `visit` for every subset of `items` with exactly `size` members whose
/// combined mask has at most `size` bits.
///
/// Branches are pruned as soon as the combined mask grows past `size`, which
/// keeps the search cheap on the typical 9-cell house.
pub(crate) fn for_each_tight_subset<M>(items: &[M], size: usize, visit: &mut impl FnMut(&Subset, M))
where
    M: SubsetMask,
{
    fn recurse<M: SubsetMask>(
        items: &[M],
        size: usize,
        start: usize,
        chosen: &mut Subset,
        union: M,
        visit: &mut impl FnMut(&Subset, M),
    ) {
        if chosen.len() == size {
            visit(chosen, union);
            return;
        }
        let needed = size - chosen.len();
        let Some(last) = items.len().checked_sub(needed) else {
            return;
        };
        for i in start..=last {
            let next = union | items[i];
            if next.count() > size {
                continue;
            }
            chosen.push(i);
            recurse(items, size, i + 1, chosen, next, visit);
            chosen.pop();
        }
    }

    if size == 0 || size > MAX_SUBSET_SIZE || size > items.len() {
        return;
    }
    let mut chosen = Subset::new();
    recurse(items, size, 0, &mut chosen, M::EMPTY, visit);
}

#[cfg(test)]
mod tests {
    use vardoku_core::Value;

    use super::*;

    fn set(values: &[u8]) -> CandidateSet {
        values.iter().copied().map(Value::new).collect()
    }

    #[test]
    fn test_tight_subsets() {
        let items = [set(&[1, 2]), set(&[2, 3]), set(&[1, 2]), set(&[4, 5, 6])];
        let mut found = vec![];
        for_each_tight_subset(&items, 2, &mut |subset, union| {
            found.push((subset.to_vec(), union));
        });
        assert_eq!(found, vec![(vec![0, 2], set(&[1, 2]))]);

        let mut found = vec![];
        for_each_tight_subset(&items, 3, &mut |subset, union| {
            found.push((subset.to_vec(), union));
        });
        assert_eq!(found, vec![(vec![0, 1, 2], set(&[1, 2, 3]))]);
    }

    #[test]
    fn test_tight_subsets_out_of_range() {
        let items = [set(&[1])];
        let mut calls = 0;
        for_each_tight_subset(&[0b11_u64, 0b01], 1, &mut |_, _| calls += 1);
        assert_eq!(calls, 1);
        calls = 0;
        for_each_tight_subset(&items, 2, &mut |_, _| calls += 1);
        for_each_tight_subset(&items, 0, &mut |_, _| calls += 1);
        assert_eq!(calls, 0);
    }
}
