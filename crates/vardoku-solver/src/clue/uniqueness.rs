use vardoku_core::{CandidateSet, Position};

use super::{ClueId, ClueRule, MAX_SUBSET_SIZE, for_each_tight_subset};
use crate::{Grid, Reason, ReasonKind, SolverConfig, UpdateResult, update::UpdateBuilder};

/// No value appears twice in the domain.
///
/// A placed value is removed from every other cell of the domain. When `k`
/// unresolved cells share only `k` candidates between them (a naked subset),
/// those values are removed from the rest of the domain; fewer than `k` shared
/// candidates is a contradiction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniquenessClue {
    name: String,
    domain: Vec<Position>,
}

impl UniquenessClue {
    /// Creates the clue. `domain` must be sorted and free of duplicates.
    #[must_use]
    pub fn new(name: impl Into<String>, domain: Vec<Position>) -> Self {
        debug_assert!(domain.is_sorted());
        Self {
            name: name.into(),
            domain,
        }
    }

    fn eliminate_fixed_values(&self, id: ClueId, grid: &Grid, builder: &mut UpdateBuilder<'_>) {
        for &pos in &self.domain {
            let Some(value) = grid.candidates_at(pos).as_single() else {
                continue;
            };
            for &other in &self.domain {
                if other == pos {
                    continue;
                }
                builder.restrict(other, !CandidateSet::single(value), || {
                    Reason::new(ReasonKind::FixedValue { value }, Some(id), [pos])
                });
            }
        }
    }

    fn eliminate_naked_subsets(
        &self,
        id: ClueId,
        grid: &Grid,
        max_size: usize,
        builder: &mut UpdateBuilder<'_>,
    ) {
        let unresolved: Vec<Position> = self
            .domain
            .iter()
            .copied()
            .filter(|pos| grid.candidates_at(*pos).len() > 1)
            .collect();
        let candidates: Vec<CandidateSet> =
            unresolved.iter().map(|pos| grid.candidates_at(*pos)).collect();

        for size in 2..=max_size.min(unresolved.len()) {
            for_each_tight_subset(&candidates, size, &mut |subset, values| {
                let members = subset.iter().map(|&i| unresolved[i]);
                let reason = Reason::new(ReasonKind::Permutation { values }, Some(id), members);
                if values.len() < size {
                    for &i in subset {
                        builder.contradict(unresolved[i], reason.clone());
                    }
                    return;
                }
                for &other in &self.domain {
                    if subset.iter().any(|&i| unresolved[i] == other) {
                        continue;
                    }
                    builder.restrict(other, !values, || reason.clone());
                }
            });
        }
    }
}

impl ClueRule for UniquenessClue {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> &[Position] {
        &self.domain
    }

    fn evaluate(&self, id: ClueId, grid: &Grid, config: &SolverConfig) -> UpdateResult {
        let mut builder = UpdateBuilder::new(grid);
        self.eliminate_fixed_values(id, grid, &mut builder);
        self.eliminate_naked_subsets(
            id,
            grid,
            config.max_subset_size.min(MAX_SUBSET_SIZE),
            &mut builder,
        );
        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use vardoku_core::{Bounds, Value};

    use super::*;
    use crate::{ClueSpecs, testing::GridTester};

    fn row_only() -> ClueSpecs {
        let mut specs = ClueSpecs::new();
        specs.uniqueness("row 1", Bounds::new(9, 1).positions());
        specs
    }

    #[test]
    fn test_placed_value_is_removed_from_domain() {
        GridTester::from_text(row_only(), Bounds::new(9, 1), &["5........"])
            .evaluate_once()
            .assert_removed_includes(Position::new(1, 0), [5])
            .assert_removed_includes(Position::new(8, 0), [5])
            .assert_no_change(Position::new(0, 0));
    }

    #[test]
    fn test_naked_pair_eliminates_from_rest_of_domain() {
        let pair = CandidateSet::from_iter([1, 2].map(Value::new));
        GridTester::from_text(row_only(), Bounds::new(9, 1), &["........."])
            .with_cell(Position::new(0, 0), pair)
            .with_cell(Position::new(4, 0), pair)
            .evaluate_once()
            .assert_removed_includes(Position::new(1, 0), [1, 2])
            .assert_removed_includes(Position::new(8, 0), [1, 2])
            .assert_no_change(Position::new(0, 0))
            .assert_no_change(Position::new(4, 0));
    }

    #[test]
    fn test_too_few_values_is_contradiction() {
        let single = CandidateSet::from_iter([1, 2].map(Value::new));
        GridTester::from_text(row_only(), Bounds::new(9, 1), &["........."])
            .with_cell(Position::new(0, 0), single)
            .with_cell(Position::new(1, 0), single)
            .with_cell(Position::new(2, 0), single)
            .evaluate_once()
            .assert_contradiction_at(Position::new(0, 0));
    }

    #[test]
    fn test_repeated_value_reports_holding_position() {
        GridTester::from_text(row_only(), Bounds::new(9, 1), &["5...5...."])
            .evaluate_once()
            .assert_contradiction_at(Position::new(4, 0))
            .assert_contradiction_mentions(Position::new(4, 0), Position::new(0, 0));
    }
}
