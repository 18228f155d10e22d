//! Property tests: completion flags never go back to false, and every
//! flag that turns true is announced exactly once.

use guided_engine::GuidedSession;
use guided_tests::{caravan, drain_keys, open, solve_current};
use guided_types::*;
use proptest::prelude::*;
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) enum Op {
    Solve,
    PlaceNext(&'static str),
    Clear(usize),
    Next,
    Previous,
    Jump(u32, Option<u32>),
    Command(serde_json::Value),
    ResetStep(u32),
    Restart,
}

pub(crate) fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Solve),
        3 => prop::sample::select(vec!["C", "L", "M", "2", "4500", "C + 500", "4C", "1000"])
            .prop_map(Op::PlaceNext),
        1 => (0usize..8).prop_map(Op::Clear),
        3 => Just(Op::Next),
        2 => Just(Op::Previous),
        2 => (0u32..7, prop::option::of(0u32..7)).prop_map(|(s, ss)| Op::Jump(s, ss)),
        1 => (1u32..6).prop_map(|s| Op::Command(serde_json::json!({ "step": s }))),
        1 => (0u32..6).prop_map(Op::ResetStep),
        1 => Just(Op::Restart),
    ]
}

pub(crate) fn apply(session: &mut GuidedSession, op: &Op) {
    // Rejections are expected along the way; only state changes matter here
    let _ = match op {
        Op::Solve => solve_current(session),
        Op::PlaceNext(token) => session.place_next(Token::new(*token)).map(|_| ()),
        Op::Clear(slot) => session.clear_slot(0, *slot).map(|_| ()),
        Op::Next => session.go_next().map(|_| ()),
        Op::Previous => session.go_previous().map(|_| ()),
        Op::Jump(step, substep) => session.jump_to(*step, *substep).map(|_| ()),
        Op::Command(payload) => session.apply_payload(payload).map(|_| ()),
        Op::ResetStep(step) => session.reset_step(*step),
        Op::Restart => session.restart().map(|_| ()),
    };
}

fn completed(session: &GuidedSession) -> BTreeSet<String> {
    session.view().completed.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Flags only accumulate, and the announced keys always equal the set flags.
    #[test]
    fn flags_are_monotonic_and_announced_once(ops in prop::collection::vec(arb_op(), 1..40)) {
        let (mut session, _clock) = open(caravan());
        let mut announced = BTreeSet::new();
        let mut before = BTreeSet::new();

        for op in &ops {
            apply(&mut session, op);

            let now = completed(&session);
            prop_assert!(now.is_superset(&before), "flag retracted by {:?}", op);

            for key in drain_keys(&mut session) {
                prop_assert!(announced.insert(key.clone()), "{} announced twice", key);
            }
            prop_assert_eq!(&announced, &now);
            before = now;
        }
    }

    /// The pointer always addresses a unit of the definition.
    #[test]
    fn position_stays_in_bounds(ops in prop::collection::vec(arb_op(), 1..40)) {
        let definition = caravan();
        let units = definition.positions();
        let (mut session, _clock) = open(definition);
        for op in &ops {
            apply(&mut session, op);
            prop_assert!(units.contains(&session.position()), "{} after {:?}", session.position(), op);
        }
    }
}
