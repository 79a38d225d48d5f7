//! Candidate values for a single cell.
//!
//! [`CandidateSet`] is a 32-bit mask where bit `n` represents [`Value`] `n`.
//! Membership, union, intersection and difference are single integer
//! operations, which matters because every clue evaluation manipulates these
//! sets.
//!
//! # Examples
//!
//! ```
//! use vardoku_core::{CandidateSet, Value};
//!
//! let a = CandidateSet::from_iter([1, 2, 3].map(Value::new));
//! let b = CandidateSet::from_iter([2, 3, 4].map(Value::new));
//!
//! assert_eq!(a | b, CandidateSet::from_iter([1, 2, 3, 4].map(Value::new)));
//! assert_eq!(a & b, CandidateSet::from_iter([2, 3].map(Value::new)));
//! assert_eq!(a.difference(b), CandidateSet::single(Value::new(1)));
//! ```

use std::{
    fmt::{self, Debug},
    iter::FusedIterator,
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not},
};

use crate::Value;

/// A set of [`Value`]s backed by a `u32` bitmask.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct CandidateSet {
    bits: u32,
}

impl CandidateSet {
    /// The empty set.
    pub const EMPTY: Self = Self { bits: 0 };

    /// Creates an empty set.
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self::EMPTY
    }

    /// Creates a set from its raw bit representation.
    #[must_use]
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self { bits }
    }

    /// Returns the raw bit representation.
    #[must_use]
    #[inline]
    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Creates a set containing exactly `value`.
    #[must_use]
    #[inline]
    pub const fn single(value: Value) -> Self {
        Self {
            bits: 1 << value.get(),
        }
    }

    /// Creates the set of all values in `min..=max`.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`.
    #[must_use]
    pub fn range(min: Value, max: Value) -> Self {
        assert!(min <= max, "empty value range {min}..={max}");
        let high = if max.get() == 31 {
            u32::MAX
        } else {
            (1u32 << (max.get() + 1)) - 1
        };
        let low = (1u32 << min.get()) - 1;
        Self { bits: high & !low }
    }

    /// Returns the number of values in the set.
    #[must_use]
    #[inline]
    pub const fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Returns `true` if the set contains no value.
    #[must_use]
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Returns `true` if the set contains exactly one value.
    #[must_use]
    #[inline]
    pub const fn is_single(self) -> bool {
        self.bits != 0 && self.bits & (self.bits - 1) == 0
    }

    /// Returns the only value of the set, or `None` if it is empty or has
    /// several values.
    #[must_use]
    pub fn as_single(self) -> Option<Value> {
        if self.is_single() { self.first() } else { None }
    }

    /// Returns the smallest value of the set.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn first(self) -> Option<Value> {
        (!self.is_empty()).then(|| Value::new(self.bits.trailing_zeros() as u8))
    }

    /// Returns the largest value of the set.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn last(self) -> Option<Value> {
        (!self.is_empty()).then(|| Value::new(31 - self.bits.leading_zeros() as u8))
    }

    /// Returns `true` if `value` is in the set.
    #[must_use]
    #[inline]
    pub const fn contains(self, value: Value) -> bool {
        self.bits & (1 << value.get()) != 0
    }

    /// Adds `value`; returns `true` if it was not present.
    #[inline]
    pub fn insert(&mut self, value: Value) -> bool {
        let present = self.contains(value);
        self.bits |= 1 << value.get();
        !present
    }

    /// Removes `value`; returns `true` if it was present.
    #[inline]
    pub fn remove(&mut self, value: Value) -> bool {
        let present = self.contains(value);
        self.bits &= !(1 << value.get());
        present
    }

    /// Returns the union of two sets.
    #[must_use]
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Returns the intersection of two sets.
    #[must_use]
    #[inline]
    pub const fn intersection(self, other: Self) -> Self {
        Self {
            bits: self.bits & other.bits,
        }
    }

    /// Returns the values of `self` that are not in `other`.
    #[must_use]
    #[inline]
    pub const fn difference(self, other: Self) -> Self {
        Self {
            bits: self.bits & !other.bits,
        }
    }

    /// Returns `true` if every value of `self` is in `other`.
    #[must_use]
    #[inline]
    pub const fn is_subset(self, other: Self) -> bool {
        self.bits & !other.bits == 0
    }

    /// Returns `true` if every value of `other` is in `self`.
    #[must_use]
    #[inline]
    pub const fn is_superset(self, other: Self) -> bool {
        other.is_subset(self)
    }

    /// Iterates over the values in ascending order.
    #[must_use]
    pub fn iter(self) -> Iter {
        Iter { bits: self.bits }
    }
}

impl Debug for CandidateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(Value::get)).finish()
    }
}

impl fmt::Display for CandidateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("}")
    }
}

impl FromIterator<Value> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl Extend<Value> for CandidateSet {
    fn extend<I: IntoIterator<Item = Value>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl IntoIterator for CandidateSet {
    type Item = Value;
    type IntoIter = Iter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl BitOr for CandidateSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for CandidateSet {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl BitAnd for CandidateSet {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersection(rhs)
    }
}

impl BitAndAssign for CandidateSet {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = self.intersection(rhs);
    }
}

impl Not for CandidateSet {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self { bits: !self.bits }
    }
}

/// Iterator over the values of a [`CandidateSet`], in ascending order.
#[derive(Debug, Clone)]
pub struct Iter {
    bits: u32,
}

impl Iterator for Iter {
    type Item = Value;

    #[inline]
    #[expect(clippy::cast_possible_truncation)]
    fn next(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        let index = self.bits.trailing_zeros();
        self.bits &= self.bits - 1;
        Some(Value::new(index as u8))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.bits.count_ones() as usize;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for Iter {
    #[inline]
    #[expect(clippy::cast_possible_truncation)]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.bits == 0 {
            return None;
        }
        let index = 31 - self.bits.leading_zeros();
        self.bits &= !(1 << index);
        Some(Value::new(index as u8))
    }
}

impl ExactSizeIterator for Iter {}
impl FusedIterator for Iter {}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn set(values: &[u8]) -> CandidateSet {
        values.iter().copied().map(Value::new).collect()
    }

    #[test]
    fn test_basic_operations() {
        let mut s = CandidateSet::new();
        assert!(s.is_empty());
        assert!(s.insert(Value::new(3)));
        assert!(!s.insert(Value::new(3)));
        assert!(s.is_single());
        assert_eq!(s.as_single(), Some(Value::new(3)));
        assert!(s.insert(Value::new(31)));
        assert_eq!(s.len(), 2);
        assert_eq!(s.as_single(), None);
        assert_eq!(s.first(), Some(Value::new(3)));
        assert_eq!(s.last(), Some(Value::new(31)));
        assert!(s.remove(Value::new(3)));
        assert!(!s.contains(Value::new(3)));
    }

    #[test]
    fn test_range() {
        assert_eq!(
            CandidateSet::range(Value::new(1), Value::new(9)),
            set(&[1, 2, 3, 4, 5, 6, 7, 8, 9])
        );
        assert_eq!(
            CandidateSet::range(Value::new(0), Value::new(31)).len(),
            32
        );
        assert_eq!(
            CandidateSet::range(Value::new(5), Value::new(5)),
            set(&[5])
        );
    }

    #[test]
    fn test_iteration_order() {
        let s = set(&[9, 1, 5, 3]);
        assert_eq!(s.iter().map(Value::get).collect::<Vec<_>>(), vec![1, 3, 5, 9]);
        assert_eq!(
            s.iter().rev().map(Value::get).collect::<Vec<_>>(),
            vec![9, 5, 3, 1]
        );
        assert_eq!(s.iter().len(), 4);
    }

    #[test]
    fn test_display() {
        assert_eq!(set(&[1, 2, 9]).to_string(), "{1,2,9}");
        assert_eq!(CandidateSet::EMPTY.to_string(), "{}");
    }

    proptest! {
        #[test]
        fn prop_set_algebra_matches_bits(a in any::<u32>(), b in any::<u32>()) {
            let sa = CandidateSet::from_bits(a);
            let sb = CandidateSet::from_bits(b);
            prop_assert_eq!((sa | sb).bits(), a | b);
            prop_assert_eq!((sa & sb).bits(), a & b);
            prop_assert_eq!(sa.difference(sb).bits(), a & !b);
            prop_assert_eq!(sa.len(), sa.iter().count());
            prop_assert!((sa & sb).is_subset(sa));
        }
    }
}
