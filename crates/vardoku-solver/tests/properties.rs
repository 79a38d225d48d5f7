//! Property tests for propagation and bifurcation.
//!
//! Puzzles are drawn by revealing a random subset of a known solution, so
//! every deduction must keep the solution's value in each cell.

use std::sync::Arc;

use proptest::prelude::*;
use vardoku_core::{Bounds, CandidateSet, Position, Value, ValueDomain};
use vardoku_solver::{
    Cancellation, ClueSource, ClueSpec, ClueSpecs, Constraint, Grid, MergePolicy, Reason,
    ReasonKind, Reasons, SolverConfig, UpdateResult, bifurcate, propagate,
};

const SOLUTION: [&str; 9] = [
    "534678912",
    "672195348",
    "198342567",
    "859761423",
    "426853791",
    "713924856",
    "961537284",
    "287419635",
    "345286179",
];

const SIZE: u8 = 9;

fn bounds() -> Bounds {
    Bounds::new(SIZE, SIZE)
}

fn solution_value(pos: Position) -> Value {
    let digit = SOLUTION[usize::from(pos.y())].as_bytes()[usize::from(pos.x())] - b'0';
    Value::new(digit)
}

/// Classic rules plus a white dot on every consecutive horizontal pair of the
/// solution.
fn specs() -> Vec<ClueSpec> {
    let mut specs = ClueSpecs::new();
    specs.classic(bounds(), 3, 3);
    for pos in bounds().positions() {
        let Some(right) = pos.offset(1, 0, bounds()) else {
            continue;
        };
        if solution_value(pos).get().abs_diff(solution_value(right).get()) == 1 {
            specs.kropki_white(pos, right);
        }
    }
    specs.into_iter().collect()
}

fn grid(specs: Vec<ClueSpec>, revealed: &[bool]) -> Grid {
    let source = ClueSource::build(specs, bounds(), ValueDomain::digits(1..=9).unwrap()).unwrap();
    let text = bounds()
        .positions()
        .zip(revealed)
        .map(|(pos, &shown)| {
            let symbol = if shown {
                char::from(b'0' + solution_value(pos).get())
            } else {
                '.'
            };
            if pos.x() == SIZE - 1 { format!("{symbol}\n") } else { symbol.to_string() }
        })
        .collect::<String>();
    Grid::parse(Arc::new(source), &text).unwrap()
}

fn run(grid: &Grid, policy: MergePolicy, config: &SolverConfig) -> Grid {
    let propagation = propagate(grid, policy, config, &Cancellation::new()).unwrap();
    assert!(!propagation.is_contradiction());
    propagation.grid
}

fn revealed(weight: f64) -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(prop::bool::weighted(weight), bounds().len())
}

fn update_result() -> impl Strategy<Value = UpdateResult> {
    prop::collection::vec((0u8..3, 0u8..3, 0u32..16), 0..6).prop_map(|cells| {
        cells
            .into_iter()
            .map(|(x, y, bits)| {
                let pos = Position::new(x, y);
                let cell = CandidateSet::from_bits(bits << 1);
                let mut reasons = Reasons::new();
                reasons.insert(Reason::new(
                    ReasonKind::FixedValue {
                        value: Value::new(u8::try_from(bits % 4 + 1).unwrap()),
                    },
                    None,
                    [pos],
                ));
                UpdateResult::single(pos, cell, reasons)
            })
            .collect()
    })
}

fn constraint() -> impl Strategy<Value = Constraint> {
    prop_oneof![
        Just(Constraint::Different),
        Just(Constraint::Equal),
        Just(Constraint::LessThan),
        Just(Constraint::GreaterThan),
        (1u8..4).prop_map(Constraint::DifferBy),
        (2u8..4).prop_map(Constraint::Ratio),
        (1u8..6).prop_map(Constraint::MinDifference),
        (3u8..17).prop_map(Constraint::SumIs),
        (3u8..17).prop_map(Constraint::SumIsNot),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_constraint_combine_is_canonical(
        (members, shuffled) in prop::collection::vec(constraint(), 1..5)
            .prop_flat_map(|members| (Just(members.clone()), Just(members).prop_shuffle())),
    ) {
        let combined = Constraint::combine(members.clone()).unwrap();
        prop_assert_eq!(Constraint::combine(shuffled), Some(combined.clone()));
        prop_assert_eq!(Constraint::combine([combined.clone()]), Some(combined.clone()));
        for a in 1..=9 {
            for b in 1..=9 {
                let (a, b) = (Value::new(a), Value::new(b));
                let expected = members.iter().all(|member| member.valid(a, b));
                prop_assert_eq!(combined.valid(a, b), expected);
            }
        }
    }

    #[test]
    fn prop_propagation_is_sound_and_monotone(revealed in revealed(0.3)) {
        let initial = grid(specs(), &revealed);
        let fixed = run(&initial, MergePolicy::Default, &SolverConfig::default());
        for (pos, cell) in fixed.cells() {
            prop_assert!(cell.is_subset(initial.candidates_at(pos)));
            prop_assert!(cell.contains(solution_value(pos)), "{pos} lost its value");
        }
    }

    #[test]
    fn prop_fixed_point_ignores_clue_order(
        revealed in revealed(0.3),
        shuffled in Just(specs()).prop_shuffle(),
    ) {
        let config = SolverConfig::default();
        let ordered = run(&grid(specs(), &revealed), MergePolicy::Default, &config);
        let reordered = run(&grid(shuffled, &revealed), MergePolicy::Default, &config);
        prop_assert_eq!(ordered, reordered);
    }

    #[test]
    fn prop_fixed_point_ignores_merge_strategy(revealed in revealed(0.3)) {
        let initial = grid(specs(), &revealed);
        let sequential = run(&initial, MergePolicy::Default, &SolverConfig::default());
        let parallel = run(
            &initial,
            MergePolicy::Default,
            &SolverConfig { parallel: true, ..SolverConfig::default() },
        );
        let stepped = run(&initial, MergePolicy::SingleStep, &SolverConfig::default());
        prop_assert_eq!(&sequential, &parallel);
        prop_assert_eq!(&sequential, &stepped);
    }

    #[test]
    fn prop_combine_is_a_commutative_monoid(
        a in update_result(),
        b in update_result(),
        c in update_result(),
    ) {
        prop_assert_eq!(a.clone().combine(b.clone()), b.clone().combine(a.clone()));
        prop_assert_eq!(a.clone().combine(a.clone()), a.clone());
        prop_assert_eq!(a.clone().combine(UpdateResult::empty()), a.clone());
        prop_assert_eq!(
            a.clone().combine(b.clone()).combine(c.clone()),
            a.combine(b.combine(c))
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn prop_bifurcation_keeps_solution(revealed in revealed(0.25)) {
        let config = SolverConfig::default();
        let fixed = run(&grid(specs(), &revealed), MergePolicy::Default, &config);
        let result = bifurcate(&fixed, 1, MergePolicy::Default, &config, &Cancellation::new())
            .unwrap();
        prop_assert!(!result.update.has_contradictions());
        for (pos, update) in result.update.updates() {
            prop_assert!(update.cell().contains(solution_value(*pos)), "{pos} lost its value");
        }
    }
}
