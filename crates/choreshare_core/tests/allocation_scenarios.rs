use choreshare_core::{
    allocate, AllocationError, ChoreEstimate, ChoreException, ChoreKey, ChoreValidationError,
    CumulativeLoads, LoadDelta, SelectionRule, UserSlot, PINNED_FRACTION,
};
use std::collections::HashSet;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn dishes_and_trash() -> Vec<ChoreEstimate> {
    vec![
        ChoreEstimate::new("dishes", "mon", [10, 20]),
        ChoreEstimate::new("trash", "mon", [30, 10]),
    ]
}

fn household_week() -> Vec<ChoreEstimate> {
    vec![
        ChoreEstimate::new("dishes", "mon", [10, 20]),
        ChoreEstimate::new("trash", "mon", [30, 10]),
        ChoreEstimate::new("laundry", "tue", [45, 30]),
        ChoreEstimate::new("vacuum", "wed", [20, 40]),
        ChoreEstimate::new("cooking", "thu", [60, 25])
            .with_exception(ChoreException::AwayFromUser2),
        ChoreEstimate::new("dishes", "thu", [10, 20]),
        ChoreEstimate::new("bathroom", "sat", [35, 35])
            .with_exception(ChoreException::AwayFromUser1),
    ]
}

#[test]
fn two_chore_example_splits_by_comparative_advantage() {
    let outcome = allocate(&dishes_and_trash(), CumulativeLoads::ZERO).unwrap();

    assert_eq!(outcome.assignments.len(), 2);
    let first = &outcome.assignments[0];
    assert_eq!(first.key(), ChoreKey::new("dishes", "mon"));
    assert_eq!(first.owner, UserSlot::One);
    assert_eq!(first.time_value, 0.25);
    assert!(!first.is_exception);

    let second = &outcome.assignments[1];
    assert_eq!(second.key(), ChoreKey::new("trash", "mon"));
    assert_eq!(second.owner, UserSlot::Two);
    assert_eq!(second.time_value, 0.333);

    assert_eq!(
        outcome.steps[0].rule,
        SelectionRule::ComparativeAdvantage { position: 1 }
    );
    assert_eq!(
        outcome.steps[1].rule,
        SelectionRule::ComparativeAdvantage { position: 0 }
    );
    assert_eq!(outcome.final_loads, CumulativeLoads::new(0.25, 0.333));

    // User 1 ended lower, so user 1 carries the gap forward.
    assert_close(outcome.delta.user1, 0.083);
    assert_eq!(outcome.delta.user2, 0.0);
}

#[test]
fn seeded_loads_decide_who_goes_first() {
    let outcome = allocate(&dishes_and_trash(), CumulativeLoads::new(2.0, 0.0)).unwrap();

    let decisions: Vec<(String, UserSlot)> = outcome
        .assignments
        .iter()
        .map(|assigned| (assigned.name.clone(), assigned.owner))
        .collect();
    assert_eq!(
        decisions,
        vec![
            ("trash".to_string(), UserSlot::Two),
            ("dishes".to_string(), UserSlot::Two),
        ]
    );
    assert_eq!(outcome.steps[1].rule, SelectionRule::Fallback);
    assert_close(outcome.final_loads.user2, 1.0);
    assert_eq!(outcome.delta.user1, 0.0);
    assert_close(outcome.delta.user2, 1.0);
}

#[test]
fn every_chore_is_assigned_exactly_once() {
    let chores = household_week();
    let outcome = allocate(&chores, CumulativeLoads::new(0.4, 0.1)).unwrap();

    assert_eq!(outcome.assignments.len(), chores.len());
    let assigned: HashSet<ChoreKey> = outcome.assignments.iter().map(|a| a.key()).collect();
    let expected: HashSet<ChoreKey> = chores.iter().map(|c| c.key()).collect();
    assert_eq!(assigned, expected);
}

#[test]
fn running_loads_never_decrease_and_lists_shrink_in_lockstep() {
    let chores = household_week();
    let seed = CumulativeLoads::new(0.0, 0.3);
    let outcome = allocate(&chores, seed).unwrap();

    let mut previous = seed;
    for (index, step) in outcome.steps.iter().enumerate() {
        assert!(step.loads_after.user1 >= previous.user1);
        assert!(step.loads_after.user2 >= previous.user2);
        let left = chores.len() - index - 1;
        assert_eq!(step.remaining, [left, left]);
        previous = step.loads_after;
    }
    assert_eq!(previous, outcome.final_loads);
}

#[test]
fn recipient_is_always_the_lighter_user() {
    let seed = CumulativeLoads::new(0.2, 0.2);
    let outcome = allocate(&household_week(), seed).unwrap();

    let mut before = seed;
    for step in &outcome.steps {
        let expected = if before.user1 <= before.user2 {
            UserSlot::One
        } else {
            UserSlot::Two
        };
        assert_eq!(step.recipient, expected);
        before = step.loads_after;
    }
}

#[test]
fn final_loads_equal_seed_plus_assigned_time() {
    let seed = CumulativeLoads::new(1.25, 0.5);
    let outcome = allocate(&household_week(), seed).unwrap();

    for user in UserSlot::BOTH {
        let assigned: f64 = outcome
            .assignments_for(user)
            .map(|assigned| assigned.time_value)
            .sum();
        assert_close(outcome.final_loads.get(user), seed.get(user) + assigned);
    }
}

#[test]
fn pinned_chore_goes_to_other_user_when_an_advantage_exists() {
    let chores = vec![
        ChoreEstimate::new("laundry", "tue", [10, 30])
            .with_exception(ChoreException::AwayFromUser1),
        ChoreEstimate::new("dishes", "mon", [10, 40]),
    ];
    let outcome = allocate(&chores, CumulativeLoads::ZERO).unwrap();

    let dishes = &outcome.assignments[0];
    assert_eq!(dishes.key(), ChoreKey::new("dishes", "mon"));
    assert_eq!(dishes.owner, UserSlot::One);
    assert_eq!(dishes.time_value, 0.5);

    let laundry = &outcome.assignments[1];
    assert_eq!(laundry.key(), ChoreKey::new("laundry", "tue"));
    assert_eq!(laundry.owner, UserSlot::Two);
    assert_eq!(laundry.time_value, 0.429);
    assert!(laundry.is_exception);

    assert_eq!(outcome.delta.user1, 0.0);
    assert_close(outcome.delta.user2, 0.071);
}

// The fallback takes the recipient's front entry, which is the pinned one.
#[test]
fn fallback_assigns_pinned_chore_to_the_user_it_was_pinned_away_from() {
    let chores = vec![
        ChoreEstimate::new("laundry", "tue", [10, 30])
            .with_exception(ChoreException::AwayFromUser1),
        ChoreEstimate::new("dishes", "mon", [10, 10]),
    ];
    let outcome = allocate(&chores, CumulativeLoads::ZERO).unwrap();

    assert_eq!(outcome.steps[0].recipient, UserSlot::One);
    assert_eq!(outcome.steps[0].rule, SelectionRule::Fallback);

    let laundry = &outcome.assignments[0];
    assert_eq!(laundry.key(), ChoreKey::new("laundry", "tue"));
    assert_eq!(laundry.owner, UserSlot::One);
    assert_eq!(laundry.time_value, PINNED_FRACTION);
    assert!(laundry.is_exception);

    let dishes = &outcome.assignments[1];
    assert_eq!(dishes.owner, UserSlot::Two);
    assert_eq!(dishes.time_value, 0.25);

    assert_eq!(outcome.final_loads, CumulativeLoads::new(1.5, 0.25));
    assert_eq!(
        outcome.delta,
        LoadDelta {
            user1: 0.0,
            user2: 1.25
        }
    );
}

#[test]
fn equal_final_loads_persist_no_delta() {
    let chores = vec![
        ChoreEstimate::new("dishes", "mon", [10, 10]),
        ChoreEstimate::new("trash", "mon", [10, 10]),
    ];
    let outcome = allocate(&chores, CumulativeLoads::ZERO).unwrap();

    assert_eq!(outcome.assignments[0].owner, UserSlot::One);
    assert_eq!(outcome.assignments[1].owner, UserSlot::Two);
    assert_eq!(outcome.final_loads, CumulativeLoads::new(0.5, 0.5));
    assert_eq!(outcome.delta, LoadDelta::NONE);
}

#[test]
fn repeated_runs_are_identical() {
    let chores = household_week();
    let seed = CumulativeLoads::new(0.75, 0.5);

    let first = allocate(&chores, seed).unwrap();
    let second = allocate(&chores, seed).unwrap();
    assert_eq!(first, second);
}

#[test]
fn empty_input_is_a_no_op() {
    let seed = CumulativeLoads::new(3.0, 1.0);
    let outcome = allocate(&[], seed).unwrap();

    assert!(outcome.is_noop());
    assert_eq!(outcome.final_loads, seed);
    assert_eq!(outcome.delta, LoadDelta::NONE);
}

#[test]
fn invalid_batches_are_rejected_before_allocation() {
    let duplicate = vec![
        ChoreEstimate::new("dishes", "mon", [10, 20]),
        ChoreEstimate::new("dishes", "mon", [5, 5]),
    ];
    assert_eq!(
        allocate(&duplicate, CumulativeLoads::ZERO),
        Err(AllocationError::InvalidChore(
            ChoreValidationError::DuplicateKey(ChoreKey::new("dishes", "mon"))
        ))
    );

    let zero_total = vec![ChoreEstimate::new("dishes", "mon", [0, 20])];
    assert_eq!(
        allocate(&zero_total, CumulativeLoads::ZERO),
        Err(AllocationError::InvalidChore(
            ChoreValidationError::ZeroTotalEstimate(UserSlot::One)
        ))
    );

    let blank_day = vec![ChoreEstimate::new("dishes", " ", [1, 2])];
    assert!(matches!(
        allocate(&blank_day, CumulativeLoads::ZERO),
        Err(AllocationError::InvalidChore(
            ChoreValidationError::BlankDay { .. }
        ))
    ));
}

#[test]
fn same_name_on_different_days_is_allowed() {
    let chores = vec![
        ChoreEstimate::new("dishes", "mon", [10, 20]),
        ChoreEstimate::new("dishes", "tue", [10, 20]),
    ];
    let outcome = allocate(&chores, CumulativeLoads::ZERO).unwrap();
    assert_eq!(outcome.assignments.len(), 2);
}

#[test]
fn negative_seed_load_is_rejected() {
    let err = allocate(&dishes_and_trash(), CumulativeLoads::new(0.0, -1.0)).unwrap_err();
    assert!(matches!(
        err,
        AllocationError::InvalidSeedLoad {
            user: UserSlot::Two,
            ..
        }
    ));
}

#[test]
fn chores_parse_from_json_input() {
    let json = r#"[
        {"name": "dishes", "day": "mon", "estimate": [10, 20], "exception": 0},
        {"name": "trash", "day": "mon", "estimate": [30, 10]}
    ]"#;
    let chores: Vec<ChoreEstimate> = serde_json::from_str(json).unwrap();
    assert_eq!(chores, dishes_and_trash());
}
