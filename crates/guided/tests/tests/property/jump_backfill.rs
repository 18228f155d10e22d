//! Property tests: a jump lands exactly on its target and back-fills
//! every earlier step, plus earlier substeps of an explicit target.

use guided_tests::{caravan, drain_keys, open};
use guided_types::*;
use proptest::prelude::*;

proptest! {
    /// In-range jumps land on the target and complete everything before it.
    #[test]
    fn jump_backfills_earlier_steps(step in 1u32..=4, substep in prop::option::of(1u32..=5)) {
        let (mut session, _clock) = open(caravan());
        let transition = session.jump_to(step, substep).unwrap();

        let expected = match (step, substep) {
            (4, Some(s)) => Position::substep(4, s),
            (4, None) => Position::substep(4, 1),
            (s, _) => Position::step(s),
        };
        prop_assert_eq!(transition.to, expected);
        prop_assert_eq!(session.position(), expected);

        let controller = session.controller();
        for earlier in 1..step {
            prop_assert!(controller.is_step_complete(earlier));
        }
        prop_assert!(!controller.is_step_complete(step));
        if let (4, Some(s)) = (step, substep) {
            for earlier in 1..s {
                prop_assert!(controller.is_unit_complete(Position::substep(4, earlier)));
            }
            prop_assert!(!controller.is_unit_complete(Position::substep(4, s)));
        }

        let announced = drain_keys(&mut session);
        prop_assert_eq!(announced.len(), transition.newly_completed.len());
    }

    /// Out-of-range jumps change nothing at all.
    #[test]
    fn out_of_range_jump_is_dropped(step in 5u32..100, substep in prop::option::of(0u32..10)) {
        let (mut session, _clock) = open(caravan());
        let before = session.snapshot();
        prop_assert!(session.jump_to(step, substep).is_err());
        prop_assert_eq!(session.snapshot(), before);
        prop_assert!(drain_keys(&mut session).is_empty());
    }

    /// Substeps outside the declared range are rejected for substep steps.
    #[test]
    fn out_of_range_substep_is_dropped(substep in prop_oneof![Just(0u32), 6u32..50]) {
        let (mut session, _clock) = open(caravan());
        let before = session.snapshot();
        let result = session.jump_to(4, Some(substep));
        let is_substep_error = matches!(result, Err(GuidedError::SubstepOutOfRange { .. }));
        prop_assert!(is_substep_error);
        prop_assert_eq!(session.snapshot(), before);
    }
}

#[test]
fn substep_for_plain_step_is_ignored() {
    let (mut session, _clock) = open(caravan());
    let transition = session.jump_to(2, Some(3)).unwrap();
    assert_eq!(transition.to, Position::step(2));
    assert_eq!(drain_keys(&mut session), vec!["step-1-completed"]);
}

#[test]
fn jump_without_substep_returns_to_last_visited() {
    let (mut session, _clock) = open(caravan());
    session.jump_to(4, Some(3)).unwrap();
    session.jump_to(1, None).unwrap();
    let transition = session.jump_to(4, None).unwrap();
    assert_eq!(transition.to, Position::substep(4, 3));
    assert!(transition.newly_completed.is_empty());
}
