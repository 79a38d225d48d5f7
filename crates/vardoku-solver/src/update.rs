//! Narrowing batches produced by clue evaluation, and their merge algebra.

use std::collections::{BTreeMap, BTreeSet, btree_map::Entry};

use vardoku_core::{CandidateSet, Position};

use crate::{Grid, Reason, Reasons};

/// A replacement candidate set for one cell, with its justification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    cell: CandidateSet,
    reasons: Reasons,
}

impl CellUpdate {
    /// Creates an update.
    #[must_use]
    pub fn new(cell: CandidateSet, reasons: Reasons) -> Self {
        Self { cell, reasons }
    }

    /// The narrowed candidates.
    #[must_use]
    pub fn cell(&self) -> CandidateSet {
        self.cell
    }

    /// Why the cell was narrowed.
    #[must_use]
    pub fn reasons(&self) -> &Reasons {
        &self.reasons
    }
}

/// A batch of narrowings and contradictions.
///
/// `UpdateResult` is a commutative monoid under [`UpdateResult::combine`] with
/// [`UpdateResult::empty`] as identity: overlapping narrowings intersect,
/// reasons merge, and a position whose merged candidates would be empty (or
/// that either side reports as contradictory) ends up in the contradiction map
/// carrying every reason recorded for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateResult {
    updates: BTreeMap<Position, CellUpdate>,
    contradictions: BTreeMap<Position, Reasons>,
}

impl UpdateResult {
    /// The identity batch.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a batch with a single narrowing.
    #[must_use]
    pub fn single(pos: Position, cell: CandidateSet, reasons: Reasons) -> Self {
        let mut result = Self::empty();
        if cell.is_empty() {
            result.contradictions.insert(pos, reasons);
        } else {
            result.updates.insert(pos, CellUpdate::new(cell, reasons));
        }
        result
    }

    /// Creates a batch with a single contradiction.
    #[must_use]
    pub fn contradiction(pos: Position, reasons: Reasons) -> Self {
        let mut result = Self::empty();
        result.contradictions.insert(pos, reasons);
        result
    }

    /// Returns `true` if the batch has neither narrowings nor contradictions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.contradictions.is_empty()
    }

    /// Returns `true` if any contradiction was found.
    #[must_use]
    pub fn has_contradictions(&self) -> bool {
        !self.contradictions.is_empty()
    }

    /// The narrowings, keyed by position.
    #[must_use]
    pub fn updates(&self) -> &BTreeMap<Position, CellUpdate> {
        &self.updates
    }

    /// The contradictions, keyed by position.
    #[must_use]
    pub fn contradictions(&self) -> &BTreeMap<Position, Reasons> {
        &self.contradictions
    }

    /// Consumes the batch and returns its contradictions.
    #[must_use]
    pub fn into_contradictions(self) -> BTreeMap<Position, Reasons> {
        self.contradictions
    }

    /// Every position touched by a narrowing or a contradiction.
    #[must_use]
    pub fn touched_positions(&self) -> BTreeSet<Position> {
        self.updates
            .keys()
            .chain(self.contradictions.keys())
            .copied()
            .collect()
    }

    /// Merges two batches.
    #[must_use]
    pub fn combine(mut self, other: Self) -> Self {
        if self.is_empty() {
            return other;
        }
        for (pos, reasons) in other.contradictions {
            self.add_contradiction(pos, reasons);
        }
        for (pos, update) in other.updates {
            self.add_update(pos, update);
        }
        self
    }

    fn add_contradiction(&mut self, pos: Position, reasons: Reasons) {
        let reasons = match self.updates.remove(&pos) {
            Some(update) => reasons.combine(update.reasons),
            None => reasons,
        };
        match self.contradictions.entry(pos) {
            Entry::Occupied(mut entry) => {
                let existing = std::mem::take(entry.get_mut());
                *entry.get_mut() = existing.combine(reasons);
            }
            Entry::Vacant(entry) => {
                entry.insert(reasons);
            }
        }
    }

    fn add_update(&mut self, pos: Position, update: CellUpdate) {
        if let Some(existing) = self.contradictions.get_mut(&pos) {
            *existing = std::mem::take(existing).combine(update.reasons);
            return;
        }
        match self.updates.remove(&pos) {
            Some(existing) => {
                let cell = existing.cell & update.cell;
                let reasons = existing.reasons.combine(update.reasons);
                if cell.is_empty() {
                    self.contradictions.insert(pos, reasons);
                } else {
                    self.updates.insert(pos, CellUpdate::new(cell, reasons));
                }
            }
            None => {
                self.updates.insert(pos, update);
            }
        }
    }
}

impl FromIterator<UpdateResult> for UpdateResult {
    fn from_iter<I: IntoIterator<Item = UpdateResult>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::combine)
    }
}

/// Accumulates the narrowings of one clue against one grid.
///
/// Each [`restrict`](Self::restrict) intersects the pending candidates of a
/// cell with an allowed set; the reason is recorded only if it removed
/// something. [`finish`](Self::finish) turns cells that changed into
/// narrowings and emptied cells into contradictions.
#[derive(Debug)]
pub(crate) struct UpdateBuilder<'a> {
    grid: &'a Grid,
    pending: BTreeMap<Position, (CandidateSet, Reasons)>,
    contradictions: BTreeMap<Position, Reasons>,
}

impl<'a> UpdateBuilder<'a> {
    pub(crate) fn new(grid: &'a Grid) -> Self {
        Self {
            grid,
            pending: BTreeMap::new(),
            contradictions: BTreeMap::new(),
        }
    }

    pub(crate) fn restrict(
        &mut self,
        pos: Position,
        allowed: CandidateSet,
        reason: impl FnOnce() -> Reason,
    ) {
        let grid = self.grid;
        let entry = self
            .pending
            .entry(pos)
            .or_insert_with(|| (grid.candidates_at(pos), Reasons::new()));
        let narrowed = entry.0 & allowed;
        if narrowed != entry.0 {
            entry.0 = narrowed;
            entry.1.insert(reason());
        }
    }

    pub(crate) fn contradict(&mut self, pos: Position, reason: Reason) {
        self.contradictions.entry(pos).or_default().insert(reason);
    }

    pub(crate) fn finish(self) -> UpdateResult {
        let mut result = UpdateResult::empty();
        for (pos, reasons) in self.contradictions {
            result.add_contradiction(pos, reasons);
        }
        for (pos, (cell, reasons)) in self.pending {
            if reasons.is_empty() {
                continue;
            }
            if cell.is_empty() {
                result.add_contradiction(pos, reasons);
            } else {
                result.add_update(pos, CellUpdate::new(cell, reasons));
            }
        }
        result
    }
}
