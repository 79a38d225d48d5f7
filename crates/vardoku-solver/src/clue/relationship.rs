use vardoku_core::{CandidateSet, Position};

use super::{ClueId, ClueRule};
use crate::{
    Constraint, Grid, Reason, ReasonKind, SolverConfig, SupportTable, UpdateResult,
    update::UpdateBuilder,
};

/// A [`Constraint`] between two cells.
///
/// Each side keeps only the values that some remaining partner value
/// supports. Support is looked up in tables built once for the value domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipClue {
    name: String,
    positions: [Position; 2],
    constraint: Constraint,
    forward: SupportTable,
    backward: SupportTable,
}

impl RelationshipClue {
    /// Creates the clue for `constraint(first, second)` over `values`.
    ///
    /// # Panics
    ///
    /// Panics if `first` is not strictly before `second`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        first: Position,
        second: Position,
        constraint: Constraint,
        values: CandidateSet,
    ) -> Self {
        assert!(first < second, "relationship positions must be ordered");
        let forward = constraint.support_table(values);
        let backward = constraint.flipped().support_table(values);
        Self {
            name: name.into(),
            positions: [first, second],
            constraint,
            forward,
            backward,
        }
    }

    /// The constraint as seen from the first cell.
    #[must_use]
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// The two cells, in row-major order.
    #[must_use]
    pub fn positions(&self) -> [Position; 2] {
        self.positions
    }
}

impl ClueRule for RelationshipClue {
    fn name(&self) -> &str {
        &self.name
    }

    fn domain(&self) -> &[Position] {
        &self.positions
    }

    fn evaluate(&self, id: ClueId, grid: &Grid, _config: &SolverConfig) -> UpdateResult {
        let [first, second] = self.positions;
        let (first_cell, second_cell) = (grid.candidates_at(first), grid.candidates_at(second));

        let mut builder = UpdateBuilder::new(grid);
        builder.restrict(first, self.backward.supported_by_any(second_cell), || {
            Reason::new(
                ReasonKind::Relationship {
                    constraint: self.constraint.clone(),
                },
                Some(id),
                [second],
            )
        });
        builder.restrict(second, self.forward.supported_by_any(first_cell), || {
            Reason::new(
                ReasonKind::Relationship {
                    constraint: self.constraint.flipped(),
                },
                Some(id),
                [first],
            )
        });
        builder.finish()
    }
}
