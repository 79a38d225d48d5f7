use vardoku_core::{CandidateSet, Position, Value};

use super::{ClueId, ClueRule, MAX_SUBSET_SIZE, for_each_tight_subset};
use crate::{Grid, Reason, ReasonKind, SolverConfig, UpdateResult, update::UpdateBuilder};

/// Hidden subsets are only searched in domains that fit a `u64` cell mask.
const MAX_SUBSET_DOMAIN: usize = 64;

/// Every required value appears exactly once in the domain.
///
/// A placed required value is removed from every other cell of the domain, so
/// two cells holding the same required value contradict each other. A value
/// with no remaining cell is a contradiction; a value with a single remaining
/// cell is placed there (hidden single). When `k` values are
/// confined to `k` cells (a hidden subset), those cells lose every other
/// candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletenessClue {
    name: String,
    domain: Vec<Position>,
    values: CandidateSet,
}

impl CompletenessClue {
    /// Creates the clue. `domain` must be sorted and free of duplicates.
    #[must_use]
    pub fn new(name: impl Into<String>, domain: Vec<Position>, values: CandidateSet) -> Self {
        debug_assert!(domain.is_sorted());
        Self {
            name: name.into(),
            domain,
            values,
        }
    }

    /// The values that must appear.
    #[must_use]
    pub fn values(&self) -> CandidateSet {
        self.values
    }

    fn cells_holding(&self, grid: &Grid, value: Value) -> u64 {
        self.domain
            .iter()
            .take(MAX_SUBSET_DOMAIN)
            .enumerate()
            .filter(|(_, pos)| grid.candidates_at(**pos).contains(value))
            .fold(0, |mask, (i, _)| mask | (1 << i))
    }

    fn eliminate_placed_values(&self, id: ClueId, grid: &Grid, builder: &mut UpdateBuilder<'_>) {
        for &pos in &self.domain {
            let Some(value) = grid.candidates_at(pos).as_single() else {
                continue;
            };
            if !self.values.contains(value) {
                continue;
            }
            for &other in self.domain.iter().filter(|other| **other != pos) {
                builder.restrict(other, !CandidateSet::single(value), || {
                    Reason::new(ReasonKind::FixedValue { value }, Some(id), [pos])
                });
            }
        }
    }

    fn place_hidden_singles(&self, id: ClueId, grid: &Grid, builder: &mut UpdateBuilder<'_>) {
        for value in self.values {
            let mut holders = self
                .domain
                .iter()
                .copied()
                .filter(|pos| grid.candidates_at(*pos).contains(value));
            let reason = |except: Option<Position>| {
                Reason::new(
                    ReasonKind::MustExist { value },
                    Some(id),
                    self.domain.iter().copied().filter(|p| Some(*p) != except),
                )
            };
            match (holders.next(), holders.next()) {
                (None, _) => {
                    if let Some(&first) = self.domain.first() {
                        builder.contradict(first, reason(None));
                    }
                }
                (Some(pos), None) => {
                    builder.restrict(pos, CandidateSet::single(value), || reason(Some(pos)));
                }
                _ => {}
            }
        }
    }

    fn confine_hidden_subsets(
        &self,
        id: ClueId,
        grid: &Grid,
        max_size: usize,
        builder: &mut UpdateBuilder<'_>,
    ) {
        if self.domain.len() > MAX_SUBSET_DOMAIN {
            return;
        }
        let (values, masks): (Vec<Value>, Vec<u64>) = self
            .values
            .iter()
            .map(|value| (value, self.cells_holding(grid, value)))
            .filter(|(_, mask)| mask.count_ones() >= 2)
            .unzip();

        for size in 2..=max_size.min(values.len()) {
            for_each_tight_subset(&masks, size, &mut |subset, cells| {
                let confined: CandidateSet = subset.iter().map(|&i| values[i]).collect();
                let positions = (0..self.domain.len())
                    .filter(|i| cells & (1 << i) != 0)
                    .map(|i| self.domain[i]);
                let reason = Reason::new(
                    ReasonKind::HiddenSubset { values: confined },
                    Some(id),
                    positions.clone(),
                );
                if (cells.count_ones() as usize) < size {
                    for pos in positions {
                        builder.contradict(pos, reason.clone());
                    }
                    return;
                }
                for pos in positions {
                    builder.restrict(pos, confined, || reason.clone());
                }
            });
        }
    }
}

impl ClueRule for CompletenessClue {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> &[Position] {
        &self.domain
    }

    fn evaluate(&self, id: ClueId, grid: &Grid, config: &SolverConfig) -> UpdateResult {
        let mut builder = UpdateBuilder::new(grid);
        self.eliminate_placed_values(id, grid, &mut builder);
        self.place_hidden_singles(id, grid, &mut builder);
        self.confine_hidden_subsets(
            id,
            grid,
            config.max_subset_size.min(MAX_SUBSET_SIZE),
            &mut builder,
        );
        builder.finish()
    }
}
