//! Property tests: permutation-class answers ignore order, format-class
//! answers accept exactly their allow-list.

use guided_engine::AnswerMatcher;
use guided_types::*;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn filled(values: &[&str]) -> Vec<Option<Token>> {
    values.iter().map(|v| Some(Token::new(*v))).collect()
}

fn total_profit_answer() -> CanonicalAnswer {
    CanonicalAnswer::permutation(tokens(["C", "L", "M"])).with_fixed(3, "4500")
}

fn merchant_share_answer() -> CanonicalAnswer {
    CanonicalAnswer::format(vec![
        tokens(["M", "2", "C"]),
        tokens(["M", "C", "2"]),
        tokens(["2", "C", "M"]),
        tokens(["C", "2", "M"]),
    ])
}

/// Any 3-tuple over the step-2 palette
fn arb_palette_triple() -> impl Strategy<Value = Vec<&'static str>> {
    prop::collection::vec(prop::sample::select(vec!["M", "C", "2", "3"]), 3)
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Every ordering of the variables is correct with the right total.
    #[test]
    fn permutation_accepts_every_ordering(
        order in Just(vec!["C", "L", "M"]).prop_shuffle(),
    ) {
        let mut values = order.clone();
        values.push("4500");
        let outcome = AnswerMatcher::new().evaluate(&filled(&values), &total_profit_answer());
        prop_assert_eq!(outcome, MatchOutcome::Correct);
    }

    /// The fixed total is never permuted: a wrong total fails any ordering.
    #[test]
    fn permutation_checks_fixed_total(
        order in Just(vec!["C", "L", "M"]).prop_shuffle(),
        total in prop::sample::select(vec!["5000", "C", "L", "M"]),
    ) {
        let mut values = order.clone();
        values.push(total);
        let outcome = AnswerMatcher::new().evaluate(&filled(&values), &total_profit_answer());
        prop_assert_eq!(outcome, MatchOutcome::Incorrect);
    }

    /// A permutation needs the exact multiset: one substituted variable fails.
    #[test]
    fn permutation_rejects_wrong_multiset(
        order in Just(vec!["C", "L", "M"]).prop_shuffle(),
        index in 0usize..3,
        replacement in prop::sample::select(vec!["4500", "5000", "X"]),
    ) {
        let mut values = order.clone();
        values[index] = replacement;
        values.push("4500");
        let outcome = AnswerMatcher::new().evaluate(&filled(&values), &total_profit_answer());
        prop_assert_eq!(outcome, MatchOutcome::Incorrect);
    }

    /// Format answers accept a tuple iff it is listed.
    #[test]
    fn format_accepts_exactly_allow_list(triple in arb_palette_triple()) {
        let answer = merchant_share_answer();
        let listed = match &answer {
            CanonicalAnswer::Format { accepted } => accepted
                .iter()
                .any(|t| t.iter().map(Token::as_str).eq(triple.iter().copied())),
            _ => unreachable!(),
        };
        let outcome = AnswerMatcher::new().evaluate(&filled(&triple), &answer);
        prop_assert_eq!(outcome.is_correct(), listed);
        prop_assert_ne!(outcome, MatchOutcome::Incomplete);
    }

    /// Any empty slot makes the tuple incomplete, never incorrect.
    #[test]
    fn empty_slot_is_incomplete(
        triple in arb_palette_triple(),
        hole in 0usize..3,
    ) {
        let mut values = filled(&triple);
        values[hole] = None;
        let outcome = AnswerMatcher::new().evaluate(&values, &merchant_share_answer());
        prop_assert_eq!(outcome, MatchOutcome::Incomplete);
        prop_assert!(!outcome.is_reportable_error());
    }
}

#[test]
fn format_rejects_unlisted_commutation() {
    let outcome = AnswerMatcher::new().evaluate(&filled(&["C", "M", "2"]), &merchant_share_answer());
    assert_eq!(outcome, MatchOutcome::Incorrect);
}
