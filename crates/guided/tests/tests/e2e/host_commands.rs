//! E2E test: navigation commands pushed by the host dialog.

use guided_engine::{BridgeOutcome, IgnoreReason, JournalEvent, StepController, SyncBridge};
use guided_tests::{caravan, drain_keys, open, solve_current};
use guided_types::*;
use serde_json::json;
use std::sync::Arc;

#[test]
fn payload_without_step_is_ignored_but_passes_through() {
    let (mut session, _clock) = open(caravan());
    let outcome = session
        .apply_payload(&json!({"step": "intro", "voiceOver": "intro", "displayFlags": {"palette": false}}))
        .unwrap();
    assert_eq!(outcome, BridgeOutcome::Ignored(IgnoreReason::MissingStep));
    assert_eq!(session.position(), Position::step(1));

    let view = session.view();
    assert_eq!(view.pass_through.get("voiceOver"), Some(&json!("intro")));
    assert!(!view.is_visible("palette"));
    assert!(view.is_visible("equationList"));
}

#[test]
fn string_step_is_accepted_and_backfills() {
    let (mut session, _clock) = open(caravan());
    let outcome = session.apply_payload(&json!({"step": "3"})).unwrap();
    assert!(matches!(outcome, BridgeOutcome::Applied(ref t) if t.to == Position::step(3)));
    assert_eq!(
        drain_keys(&mut session),
        vec!["step-1-completed", "step-2-completed"]
    );
}

#[test]
fn same_step_command_is_a_no_op() {
    let (mut session, _clock) = open(caravan());
    session.place_next(Token::new("M")).unwrap();
    let before = session.snapshot();
    let outcome = session.apply_payload(&json!({"step": 1})).unwrap();
    assert_eq!(outcome, BridgeOutcome::Ignored(IgnoreReason::Unchanged));
    assert_eq!(session.snapshot(), before);
}

#[test]
fn substep_command_within_current_step_moves() {
    let (mut session, _clock) = open(caravan());
    session.apply_payload(&json!({"step": 4})).unwrap();
    assert_eq!(session.position(), Position::substep(4, 1));
    drain_keys(&mut session);

    session
        .apply_payload(&json!({"step": 4, "subStep": 3}))
        .unwrap();
    assert_eq!(session.position(), Position::substep(4, 3));
    assert_eq!(
        drain_keys(&mut session),
        vec!["step-4-substep-1-completed", "step-4-substep-2-completed"]
    );
}

#[test]
fn out_of_range_command_is_rejected_without_side_effects() {
    let (mut session, _clock) = open(caravan());
    let before = session.snapshot();
    assert!(matches!(
        session.apply_payload(&json!({"step": 9})),
        Err(GuidedError::StepOutOfRange { step: 9, total: 4 })
    ));
    assert!(matches!(
        session.apply_payload(&json!({"step": 4, "subStep": 6})),
        Err(GuidedError::SubstepOutOfRange { .. })
    ));
    assert_eq!(session.snapshot(), before);
    assert!(drain_keys(&mut session).is_empty());
}

#[test]
fn non_positive_step_or_substep_is_rejected_not_dropped() {
    let (mut session, _clock) = open(caravan());
    session.place_next(Token::new("M")).unwrap();
    drain_keys(&mut session);
    let before = session.snapshot();

    assert!(matches!(
        session.apply_payload(&json!({"step": 4, "subStep": 0})),
        Err(GuidedError::SubstepOutOfRange { step: 4, substep: 0, total: 5 })
    ));
    assert!(matches!(
        session.apply_payload(&json!({"step": 4, "subStep": -1})),
        Err(GuidedError::SubstepOutOfRange { step: 4, .. })
    ));
    assert!(matches!(
        session.apply_payload(&json!({"step": 4, "subStep": 1.5})),
        Err(GuidedError::SubstepOutOfRange { step: 4, .. })
    ));
    assert!(matches!(
        session.apply_payload(&json!({"step": 0})),
        Err(GuidedError::StepOutOfRange { step: 0, total: 4 })
    ));
    assert!(matches!(
        session.apply_payload(&json!({"step": -3})),
        Err(GuidedError::StepOutOfRange { step: 0, .. })
    ));

    assert_eq!(session.position(), Position::step(1));
    assert_eq!(session.snapshot(), before);
    assert!(!session.controller().is_step_complete(1));
    assert!(drain_keys(&mut session).is_empty());
    assert!(matches!(
        session.journal().records().last().map(|r| &r.event),
        Some(JournalEvent::NavigationRejected { .. })
    ));
}

#[test]
fn display_flags_follow_the_latest_command() {
    let (mut session, _clock) = open(caravan());
    session
        .apply_command(&NavigationCommand::to_step(2).with_display_flag("palette", false))
        .unwrap();
    assert!(!session.view().is_visible("palette"));

    session
        .apply_command(&NavigationCommand::to_step(3))
        .unwrap();
    assert!(session.view().is_visible("palette"));
}

#[test]
fn gate_is_reported_from_observed_flags() {
    let (mut session, _clock) = open(caravan());
    session
        .apply_command(&NavigationCommand::to_step(2).with_disabled_unless("step-2-completed"))
        .unwrap();
    assert_eq!(session.view().gate.as_deref(), Some("step-2-completed"));
    assert_eq!(session.gate_satisfied(), Some(false));

    solve_current(&mut session).unwrap();
    assert_eq!(session.gate_satisfied(), Some(true));

    session
        .apply_command(&NavigationCommand::to_step(3).with_disabled_unless("voice-over-finished"))
        .unwrap();
    assert_eq!(session.gate_satisfied(), Some(false));

    session.apply_command(&NavigationCommand::to_step(4)).unwrap();
    assert_eq!(session.gate_satisfied(), None);
}

#[test]
fn only_the_latest_of_a_burst_is_applied() {
    let mut controller = StepController::new(Arc::new(caravan()), Position::step(1)).unwrap();
    let mut bridge = SyncBridge::new();
    let burst = [
        NavigationCommand::to_step(2),
        NavigationCommand::to_step(4),
        NavigationCommand::to_step(3),
    ];

    let outcome = bridge.apply_latest(&mut controller, &burst).unwrap();
    assert!(matches!(outcome, Some(BridgeOutcome::Applied(ref t)) if t.to == Position::step(3)));
    assert!(!controller.is_step_complete(3));
    assert!(!controller.state().is_completed(&CompletionKey::Substep { step: 4, substep: 1 }));
}
