//! E2E test: a learner works through the whole caravan exercise,
//! including wrong answers and a blocked advance.

use guided_engine::JournalEvent;
use guided_tests::{angles, caravan, drain_keys, open, solve_current};
use guided_types::*;

#[test]
fn full_walkthrough_emits_every_flag_in_order() {
    let (mut session, _clock) = open(caravan());

    // Advancing before solving is refused with the configured message
    assert!(matches!(session.go_next(), Err(GuidedError::StepIncomplete(_))));
    assert_eq!(
        session.feedback().unwrap().key,
        "please_complete_current_step_before_proceeding"
    );

    // Step 1: wrong total first
    for token in ["M", "L", "C", "5000"] {
        session.place_next(Token::new(token)).unwrap();
    }
    assert!(session.feedback().unwrap().is_error());
    assert_eq!(session.feedback().unwrap().key, "not_quite_right");
    assert!(drain_keys(&mut session).is_empty());

    let fixed = session.place(0, 6, Token::new("4500")).unwrap();
    assert_eq!(fixed.replaced, Some(Token::new("5000")));
    assert_eq!(fixed.outcome, MatchOutcome::Correct);
    assert_eq!(session.feedback().unwrap().key, "perfect");
    assert_eq!(drain_keys(&mut session), vec!["step-1-completed"]);
    session.go_next().unwrap();

    // Step 2: a commuted product that is not on the allow-list
    for token in ["C", "M", "2"] {
        session.place_next(Token::new(token)).unwrap();
    }
    assert_eq!(session.feedback().unwrap().key, "remember");
    session.reset_step(2).unwrap();
    assert!(session.feedback().is_none());
    for token in ["2", "C", "M"] {
        session.place_next(Token::new(token)).unwrap();
    }
    assert_eq!(session.feedback().unwrap().key, "excellent");
    session.go_next().unwrap();

    // Step 3 and the five substitution substeps
    solve_current(&mut session).unwrap();
    session.go_next().unwrap();
    for substep in 1..=5 {
        assert_eq!(session.position(), Position::substep(4, substep));
        solve_current(&mut session).unwrap();
        if substep < 5 {
            session.go_next().unwrap();
        }
    }
    assert!(matches!(session.go_next(), Err(GuidedError::NoNextStep)));

    let keys = drain_keys(&mut session);
    assert_eq!(
        keys,
        vec![
            "step-2-completed",
            "step-3-completed",
            "step-4-substep-1-completed",
            "step-4-substep-2-completed",
            "step-4-substep-3-completed",
            "step-4-substep-4-completed",
            "step-4-substep-5-completed",
            "step-4-completed",
        ]
    );
    assert_eq!(session.view().completed.len(), 9);
    assert_eq!(session.journal().completions().len(), 9);
}

#[test]
fn walking_back_keeps_work_and_flags() {
    let (mut session, _clock) = open(caravan());
    solve_current(&mut session).unwrap();
    session.go_next().unwrap();
    session.place_next(Token::new("M")).unwrap();

    session.go_previous().unwrap();
    assert_eq!(session.position(), Position::step(1));
    assert_eq!(
        session.view().equations[0].rendered,
        "C + L + M = 4500"
    );
    assert!(session.view().can_go_next);

    // Clearing a slot of a solved step never retracts its flag
    session.clear_slot(0, 0).unwrap();
    assert!(session.controller().is_step_complete(1));
    assert!(session.view().can_go_next);

    session.go_next().unwrap();
    assert_eq!(session.view().equations[0].rendered, "M = _ * _");
    assert_eq!(drain_keys(&mut session), vec!["step-1-completed"]);
}

#[test]
fn moving_forward_into_substeps_lands_on_first_substep() {
    let (mut session, _clock) = open(caravan());
    session.jump_to(4, Some(5)).unwrap();
    solve_current(&mut session).unwrap();
    assert!(session.controller().is_step_complete(4));

    session.jump_to(3, None).unwrap();
    solve_current(&mut session).unwrap();
    session.go_next().unwrap();
    assert_eq!(session.position(), Position::substep(4, 1));

    session.go_previous().unwrap();
    session.go_previous().unwrap();
    assert_eq!(session.position(), Position::step(2));
}

#[test]
fn multi_equation_unit_completes_when_all_equations_are_correct() {
    let (mut session, _clock) = open(angles());
    solve_current(&mut session).unwrap();
    session.go_next().unwrap();

    // Label the exterior angle with the second alternative
    for token in ["D", "C", "C"] {
        session.place_next(Token::new(token)).unwrap();
    }
    session.go_next().unwrap();
    assert_eq!(session.view().title, "measure");
    assert_eq!(session.view().equations[1].label, "second");

    session.place(0, 2, Token::new("50")).unwrap();
    assert!(!session.controller().is_current_complete());
    session.place_next(Token::new("120")).unwrap();
    assert_eq!(session.feedback().unwrap().key, "not_quite_right");
    session.place(1, 2, Token::new("110")).unwrap();
    assert!(session.controller().is_current_complete());

    assert_eq!(
        drain_keys(&mut session),
        vec![
            "step-1-completed",
            "step-2-substep-1-completed",
            "step-2-substep-2-completed",
            "step-2-completed",
        ]
    );
    assert!(session
        .journal()
        .records()
        .any(|r| matches!(r.event, JournalEvent::Evaluated { outcome: MatchOutcome::Incorrect, .. })));
}
