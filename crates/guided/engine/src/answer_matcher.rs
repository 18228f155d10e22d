//! Answer matcher: decides whether an equation's slot values are correct
//!
//! The matcher is a pure function of the editable-slot tuple and the
//! canonical answer. It holds no state, so re-validating after
//! navigation, reset or restore always gives the same result.
//!
//! Tuples are compared element-wise over [`Token`] values; permutation
//! answers compare sorted multisets.

use guided_types::{CanonicalAnswer, MatchOutcome, Token};

/// Evaluates editable-slot tuples against canonical answers
#[derive(Clone, Debug)]
pub struct AnswerMatcher;

impl AnswerMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a tuple of editable-slot values.
    ///
    /// Any empty slot makes the tuple [`MatchOutcome::Incomplete`]; only a
    /// fully filled tuple can be `Correct` or `Incorrect`.
    pub fn evaluate(&self, values: &[Option<Token>], answer: &CanonicalAnswer) -> MatchOutcome {
        let Some(filled) = values.iter().map(Option::as_ref).collect::<Option<Vec<&Token>>>()
        else {
            return MatchOutcome::Incomplete;
        };

        if self.accepts(&filled, answer) {
            MatchOutcome::Correct
        } else {
            MatchOutcome::Incorrect
        }
    }

    /// Convenience wrapper: `true` only for a correct, fully filled tuple
    pub fn is_correct(&self, values: &[Option<Token>], answer: &CanonicalAnswer) -> bool {
        self.evaluate(values, answer).is_correct()
    }

    fn accepts(&self, filled: &[&Token], answer: &CanonicalAnswer) -> bool {
        match answer {
            CanonicalAnswer::Permutation {
                expected, fixed, ..
            } => {
                let fixed_ok = fixed
                    .iter()
                    .all(|f| filled.get(f.index).is_some_and(|v| **v == f.value));
                if !fixed_ok {
                    return false;
                }

                let indices = answer.permuted_indices(filled.len());
                let Some(mut actual) = indices
                    .iter()
                    .map(|i| filled.get(*i).copied())
                    .collect::<Option<Vec<&Token>>>()
                else {
                    return false;
                };
                let mut wanted: Vec<&Token> = expected.iter().collect();
                actual.sort();
                wanted.sort();
                tuples_equal(&actual, &wanted)
            }

            CanonicalAnswer::Format { accepted } => accepted.iter().any(|tuple| {
                let tuple: Vec<&Token> = tuple.iter().collect();
                tuples_equal(filled, &tuple)
            }),

            CanonicalAnswer::AnyOf { answers } => {
                answers.iter().any(|nested| self.accepts(filled, nested))
            }
        }
    }
}

impl Default for AnswerMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Element-wise comparison; tuples of different length never match
fn tuples_equal(a: &[&Token], b: &[&Token]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}
