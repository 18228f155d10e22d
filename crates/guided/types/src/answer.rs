//! Canonical answers: which slot-value tuples count as correct
//!
//! Two shapes exist. A permutation-class answer accepts any ordering of
//! an expected multiset (addition is commutative, so `M + L + C` and
//! `C + M + L` are both right) combined with exact-value positions such
//! as the total after `=`. A format-class answer is an explicit
//! allow-list of fully ordered tuples, for equations where only some
//! rearrangements are valid.
//!
//! Both shapes describe a set of accepted tuples over the editable slots
//! of an equation; indices below are positions in that tuple, not in the
//! full slot list.

use crate::Token;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An exact-value constraint on one editable slot
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedValue {
    /// Index into the editable-value tuple
    pub index: usize,
    /// The value that must appear there
    pub value: Token,
}

/// The rule set deciding which slot assignments are correct
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CanonicalAnswer {
    /// The values at `positions` must equal `expected` as a multiset, and
    /// every `fixed` index must hold its exact value. An empty `positions`
    /// means every index not claimed by `fixed`.
    Permutation {
        expected: Vec<Token>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        positions: Vec<usize>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        fixed: Vec<FixedValue>,
    },
    /// The full tuple must equal one of the accepted tuples
    Format { accepted: Vec<Vec<Token>> },
    /// Correct if any of the nested answers accepts the tuple
    AnyOf { answers: Vec<CanonicalAnswer> },
}

impl CanonicalAnswer {
    /// Permutation-class answer over every editable slot
    pub fn permutation(expected: Vec<Token>) -> Self {
        CanonicalAnswer::Permutation {
            expected,
            positions: Vec::new(),
            fixed: Vec::new(),
        }
    }

    /// Format-class answer from an allow-list of ordered tuples
    pub fn format(accepted: Vec<Vec<Token>>) -> Self {
        CanonicalAnswer::Format { accepted }
    }

    /// Format-class answer with exactly one accepted tuple
    pub fn exact(tuple: Vec<Token>) -> Self {
        CanonicalAnswer::Format {
            accepted: vec![tuple],
        }
    }

    pub fn any_of(answers: Vec<CanonicalAnswer>) -> Self {
        CanonicalAnswer::AnyOf { answers }
    }

    /// Add an exact-value constraint (permutation-class only)
    pub fn with_fixed(mut self, index: usize, value: impl Into<Token>) -> Self {
        if let CanonicalAnswer::Permutation { fixed, .. } = &mut self {
            fixed.push(FixedValue {
                index,
                value: value.into(),
            });
        }
        self
    }

    /// Restrict the permuted values to explicit indices (permutation-class only)
    pub fn at_positions(mut self, indices: Vec<usize>) -> Self {
        if let CanonicalAnswer::Permutation { positions, .. } = &mut self {
            *positions = indices;
        }
        self
    }

    pub fn is_permutation(&self) -> bool {
        matches!(self, CanonicalAnswer::Permutation { .. })
    }

    pub fn is_format(&self) -> bool {
        matches!(self, CanonicalAnswer::Format { .. })
    }

    /// Indices of the editable tuple permuted by a permutation-class
    /// answer, with the "everything not fixed" default resolved
    pub fn permuted_indices(&self, arity: usize) -> Vec<usize> {
        match self {
            CanonicalAnswer::Permutation {
                positions, fixed, ..
            } => {
                if positions.is_empty() {
                    let claimed: BTreeSet<usize> = fixed.iter().map(|f| f.index).collect();
                    (0..arity).filter(|i| !claimed.contains(i)).collect()
                } else {
                    positions.clone()
                }
            }
            _ => Vec::new(),
        }
    }

    /// Check the answer is well-formed for an equation with `arity`
    /// editable slots. Returns a description of the first problem found.
    pub fn check_arity(&self, arity: usize) -> Result<(), String> {
        match self {
            CanonicalAnswer::Permutation {
                expected, fixed, ..
            } => {
                let permuted = self.permuted_indices(arity);
                if permuted.len() != expected.len() {
                    return Err(format!(
                        "permutation expects {} values but covers {} slots",
                        expected.len(),
                        permuted.len()
                    ));
                }
                let mut seen = BTreeSet::new();
                for index in permuted.iter().chain(fixed.iter().map(|f| &f.index)) {
                    if *index >= arity {
                        return Err(format!(
                            "index {} outside {} editable slots",
                            index, arity
                        ));
                    }
                    if !seen.insert(*index) {
                        return Err(format!("index {} constrained twice", index));
                    }
                }
                Ok(())
            }
            CanonicalAnswer::Format { accepted } => {
                if accepted.is_empty() {
                    return Err("format answer accepts no tuples".into());
                }
                match accepted.iter().find(|tuple| tuple.len() != arity) {
                    Some(tuple) => Err(format!(
                        "accepted tuple of length {} for {} editable slots",
                        tuple.len(),
                        arity
                    )),
                    None => Ok(()),
                }
            }
            CanonicalAnswer::AnyOf { answers } => {
                if answers.is_empty() {
                    return Err("any_of answer has no alternatives".into());
                }
                answers.iter().try_for_each(|a| a.check_arity(arity))
            }
        }
    }
}

/// The result of evaluating an equation against its canonical answer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// At least one required slot is still empty
    Incomplete,
    /// Every slot is filled but the tuple is not accepted
    Incorrect,
    /// The tuple is accepted
    Correct,
}

impl MatchOutcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, MatchOutcome::Correct)
    }

    /// Only a filled, non-matching tuple surfaces an error to the learner
    pub fn is_reportable_error(&self) -> bool {
        matches!(self, MatchOutcome::Incorrect)
    }
}

impl std::fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchOutcome::Incomplete => write!(f, "incomplete"),
            MatchOutcome::Incorrect => write!(f, "incorrect"),
            MatchOutcome::Correct => write!(f, "correct"),
        }
    }
}
