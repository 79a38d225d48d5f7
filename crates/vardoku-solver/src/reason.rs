//! Justifications attached to every narrowing and contradiction.

use std::{
    collections::BTreeSet,
    fmt::{self, Display},
};

use vardoku_core::{CandidateSet, Position, Value};

use crate::{ClueId, ClueRule, ClueSource, Constraint};

/// The deduction technique behind a [`Reason`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReasonKind {
    /// A value entered by hand.
    Manual,
    /// The value is already placed elsewhere in a uniqueness domain.
    FixedValue {
        /// The placed value.
        value: Value,
    },
    /// Every required value must appear somewhere in a completeness domain.
    MustExist {
        /// The required value.
        value: Value,
    },
    /// A set of values is confined to as many cells.
    HiddenSubset {
        /// The confined values.
        values: CandidateSet,
    },
    /// A set of cells can only hold as many values, in some order.
    Permutation {
        /// The values shared by the cells.
        values: CandidateSet,
    },
    /// No value at the partner cell satisfies a relationship.
    Relationship {
        /// The constraint from this cell's point of view.
        constraint: Constraint,
    },
    /// Assuming the value led to a contradiction in every explored branch.
    AllHypothesesContradict {
        /// The refuted value.
        value: Value,
    },
}

impl Display for ReasonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => f.write_str("entered manually"),
            Self::FixedValue { value } => write!(f, "value {value} is already placed"),
            Self::MustExist { value } => write!(f, "value {value} must exist in domain"),
            Self::HiddenSubset { values } => {
                write!(f, "only {} cells can hold values {values}", values.len())
            }
            Self::Permutation { values } => write!(f, "values {values} form a permutation"),
            Self::Relationship { constraint } => {
                write!(f, "no partner value satisfies: {constraint}")
            }
            Self::AllHypothesesContradict { value } => {
                write!(f, "all hypotheses for value {value} led to contradiction")
            }
        }
    }
}

/// One explanation: a technique, the clue that produced it, and the cells
/// that contributed to the deduction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reason {
    kind: ReasonKind,
    clue: Option<ClueId>,
    positions: BTreeSet<Position>,
}

impl Reason {
    /// Creates a reason.
    #[must_use]
    pub fn new<I>(kind: ReasonKind, clue: Option<ClueId>, positions: I) -> Self
    where
        I: IntoIterator<Item = Position>,
    {
        Self {
            kind,
            clue,
            positions: positions.into_iter().collect(),
        }
    }

    /// Creates a reason for a manual edit of `pos`.
    #[must_use]
    pub fn manual(pos: Position) -> Self {
        Self::new(ReasonKind::Manual, None, [pos])
    }

    /// Returns the technique.
    #[must_use]
    pub fn kind(&self) -> &ReasonKind {
        &self.kind
    }

    /// Returns the originating clue, if any.
    #[must_use]
    pub fn clue(&self) -> Option<ClueId> {
        self.clue
    }

    /// Returns the contributing positions in row-major order.
    #[must_use]
    pub fn positions(&self) -> &BTreeSet<Position> {
        &self.positions
    }

    /// Renders the reason with the clue name resolved through `source`.
    #[must_use]
    pub fn describe(&self, source: &ClueSource) -> String {
        match self.clue {
            Some(id) => format!("{} ({})", self, source.clue(id).name()),
            None => self.to_string(),
        }
    }
}

impl Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.kind, f)?;
        if !self.positions.is_empty() {
            f.write_str(" [")?;
            for (i, pos) in self.positions.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                Display::fmt(pos, f)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// A sorted, duplicate-free list of reasons.
///
/// Combining two lists keeps each distinct reason once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Reasons {
    reasons: Vec<Reason>,
}

impl Reasons {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there is no reason.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    /// Number of distinct reasons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    /// Adds a reason unless it is already present.
    pub fn insert(&mut self, reason: Reason) {
        if let Err(i) = self.reasons.binary_search(&reason) {
            self.reasons.insert(i, reason);
        }
    }

    /// Merges two lists.
    #[must_use]
    pub fn combine(mut self, other: Self) -> Self {
        if self.reasons.is_empty() {
            return other;
        }
        for reason in other.reasons {
            self.insert(reason);
        }
        self
    }

    /// Iterates over the reasons in canonical order.
    pub fn iter(&self) -> std::slice::Iter<'_, Reason> {
        self.reasons.iter()
    }

    /// Returns the union of contributing positions of all reasons.
    #[must_use]
    pub fn positions(&self) -> BTreeSet<Position> {
        self.reasons
            .iter()
            .flat_map(|r| r.positions.iter().copied())
            .collect()
    }
}

impl From<Reason> for Reasons {
    fn from(reason: Reason) -> Self {
        Self {
            reasons: vec![reason],
        }
    }
}

impl FromIterator<Reason> for Reasons {
    fn from_iter<I: IntoIterator<Item = Reason>>(iter: I) -> Self {
        let mut reasons: Vec<_> = iter.into_iter().collect();
        reasons.sort();
        reasons.dedup();
        Self { reasons }
    }
}

impl<'a> IntoIterator for &'a Reasons {
    type Item = &'a Reason;
    type IntoIter = std::slice::Iter<'a, Reason>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Display for Reasons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, reason) in self.reasons.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            Display::fmt(reason, f)?;
        }
        Ok(())
    }
}
