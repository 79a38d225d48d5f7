//! Pairwise value constraints and their canonicalizing algebra.
//!
//! A [`Constraint`] is a pure predicate over an ordered pair of values. The set
//! of shapes is closed so that subsumption and combination can reason over all
//! of them. Conjunctions are represented by [`Constraint::All`], whose members
//! are kept in a canonical, minimal, sorted form; two composites built from the
//! same logical members compare equal regardless of construction order.
//!
//! # Examples
//!
//! ```
//! use vardoku_core::Value;
//! use vardoku_solver::Constraint;
//!
//! let c = Constraint::combine([Constraint::Different, Constraint::LessThan]).unwrap();
//! // `LessThan` already implies `Different`.
//! assert_eq!(c, Constraint::LessThan);
//! assert_eq!(c.flipped(), Constraint::GreaterThan);
//! assert!(c.valid(Value::new(1), Value::new(2)));
//! ```

use std::{
    cmp::Ordering,
    fmt::{self, Display},
    hash::{Hash, Hasher},
    sync::Arc,
};

use vardoku_core::{CandidateSet, Value};

/// A predicate over an ordered pair of values `(first, second)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Constraint {
    /// The values differ.
    Different,
    /// The values are equal.
    Equal,
    /// `first < second`.
    LessThan,
    /// `first > second`.
    GreaterThan,
    /// `|first - second| == d`.
    DifferBy(u8),
    /// One value is `r` times the other.
    Ratio(u8),
    /// `|first - second| >= d`.
    MinDifference(u8),
    /// `first + second == s`.
    SumIs(u8),
    /// `first + second != s`.
    SumIsNot(u8),
    /// Every member holds.
    All(Composite),
}

impl Constraint {
    /// Evaluates the predicate.
    #[must_use]
    pub fn valid(&self, first: Value, second: Value) -> bool {
        let (a, b) = (first.get(), second.get());
        match self {
            Self::Different => a != b,
            Self::Equal => a == b,
            Self::LessThan => a < b,
            Self::GreaterThan => a > b,
            Self::DifferBy(d) => a.abs_diff(b) == *d,
            Self::Ratio(r) => {
                let (a, b, r) = (u16::from(a), u16::from(b), u16::from(*r));
                a == r * b || b == r * a
            }
            Self::MinDifference(d) => a.abs_diff(b) >= *d,
            Self::SumIs(s) => a + b == *s,
            Self::SumIsNot(s) => a + b != *s,
            Self::All(composite) => composite
                .members()
                .iter()
                .all(|member| member.valid(first, second)),
        }
    }

    /// Returns the constraint with its arguments swapped.
    ///
    /// Commutative shapes return themselves.
    #[must_use]
    pub fn flipped(&self) -> Self {
        match self {
            Self::LessThan => Self::GreaterThan,
            Self::GreaterThan => Self::LessThan,
            Self::All(composite) => Self::All(composite.flipped()),
            other => other.clone(),
        }
    }

    /// Returns `true` if swapping the arguments yields the same constraint.
    #[must_use]
    pub fn is_commutative(&self) -> bool {
        self.flipped() == *self
    }

    /// Returns `true` if `self` is at least as restrictive as `other`, i.e.
    /// every pair accepted by `self` is accepted by `other`.
    ///
    /// Values are bounded by [`Value::MAX`], so the check is exact.
    #[must_use]
    pub fn is_super_constraint(&self, other: &Self) -> bool {
        if self == other {
            return true;
        }
        if let Self::All(composite) = other {
            return composite
                .members()
                .iter()
                .all(|member| self.is_super_constraint(member));
        }
        all_values().all(|a| {
            all_values().all(|b| !self.valid(a, b) || other.valid(a, b))
        })
    }

    /// Reduces a collection of constraints to its canonical minimal form.
    ///
    /// Composites are flattened, members subsumed by another member are
    /// dropped, and the survivors are sorted. A single survivor is returned
    /// unwrapped; several are wrapped in [`Constraint::All`]. Returns `None`
    /// for an empty collection.
    ///
    /// The result does not depend on the input order, and combining a
    /// combined constraint again returns it unchanged.
    pub fn combine<I>(constraints: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let mut flat = Vec::new();
        for constraint in constraints {
            match constraint {
                Self::All(composite) => flat.extend(composite.members().iter().cloned()),
                other => flat.push(other),
            }
        }
        flat.sort();
        flat.dedup();

        let mut kept: Vec<Self> = Vec::with_capacity(flat.len());
        for constraint in flat {
            if kept.iter().any(|k| k.is_super_constraint(&constraint)) {
                continue;
            }
            kept.retain(|k| !constraint.is_super_constraint(k));
            kept.push(constraint);
        }
        kept.sort();

        match kept.len() {
            0 => None,
            1 => kept.pop(),
            _ => Some(Self::All(Composite::new(kept))),
        }
    }

    /// Builds the lookup table of second values compatible with each first
    /// value, restricted to `domain`.
    #[must_use]
    pub fn support_table(&self, domain: CandidateSet) -> SupportTable {
        let mut table = [CandidateSet::EMPTY; 32];
        for a in domain {
            table[usize::from(a.get())] = domain.iter().filter(|b| self.valid(a, *b)).collect();
        }
        SupportTable { table }
    }
}

impl Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Different => f.write_str("values differ"),
            Self::Equal => f.write_str("values are equal"),
            Self::LessThan => f.write_str("first is less than second"),
            Self::GreaterThan => f.write_str("first is greater than second"),
            Self::DifferBy(d) => write!(f, "values differ by {d}"),
            Self::Ratio(r) => write!(f, "values are in ratio 1:{r}"),
            Self::MinDifference(d) => write!(f, "values differ by at least {d}"),
            Self::SumIs(s) => write!(f, "values sum to {s}"),
            Self::SumIsNot(s) => write!(f, "values do not sum to {s}"),
            Self::All(composite) => {
                f.write_str("all of [")?;
                for (i, member) in composite.members().iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    Display::fmt(member, f)?;
                }
                f.write_str("]")
            }
        }
    }
}

fn all_values() -> impl Iterator<Item = Value> {
    (0..=Value::MAX.get()).map(Value::new)
}

/// Members of a composite constraint in both argument orders.
///
/// Both orientations are built together so that flipping a composite is a
/// flag toggle on a shared allocation.
#[derive(Debug)]
struct CompositePair {
    forward: Vec<Constraint>,
    backward: Vec<Constraint>,
}

/// A canonical conjunction of constraints, paired with its flipped twin.
#[derive(Debug, Clone)]
pub struct Composite {
    pair: Arc<CompositePair>,
    flipped: bool,
}

impl Composite {
    fn new(members: Vec<Constraint>) -> Self {
        debug_assert!(members.is_sorted());
        let mut backward: Vec<_> = members.iter().map(Constraint::flipped).collect();
        backward.sort();
        Self {
            pair: Arc::new(CompositePair {
                forward: members,
                backward,
            }),
            flipped: false,
        }
    }

    /// Returns the sorted members in this orientation.
    #[must_use]
    pub fn members(&self) -> &[Constraint] {
        if self.flipped {
            &self.pair.backward
        } else {
            &self.pair.forward
        }
    }

    /// Returns the twin with arguments swapped, sharing the same allocation.
    #[must_use]
    pub fn flipped(&self) -> Self {
        Self {
            pair: Arc::clone(&self.pair),
            flipped: !self.flipped,
        }
    }
}

impl PartialEq for Composite {
    fn eq(&self, other: &Self) -> bool {
        self.members() == other.members()
    }
}

impl Eq for Composite {}

impl PartialOrd for Composite {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Composite {
    fn cmp(&self, other: &Self) -> Ordering {
        self.members().cmp(other.members())
    }
}

impl Hash for Composite {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.members().hash(state);
    }
}

/// Precomputed compatibility table of a constraint over a value domain.
///
/// `supported(a)` is the set of second values `b` such that `(a, b)` is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportTable {
    table: [CandidateSet; 32],
}

impl SupportTable {
    /// Returns the second values compatible with `first`.
    #[must_use]
    #[inline]
    pub fn supported(&self, first: Value) -> CandidateSet {
        self.table[usize::from(first.get())]
    }

    /// Returns the union of second values compatible with any of `firsts`.
    #[must_use]
    pub fn supported_by_any(&self, firsts: CandidateSet) -> CandidateSet {
        firsts
            .iter()
            .fold(CandidateSet::EMPTY, |acc, a| acc | self.supported(a))
    }

    /// Returns `true` if no pair is valid.
    #[must_use]
    pub fn is_unsatisfiable(&self) -> bool {
        self.table.iter().all(|s| s.is_empty())
    }
}
