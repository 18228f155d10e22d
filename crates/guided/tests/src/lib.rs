//! Shared fixtures for guided engine tests
//!
//! Two exercises are provided. The caravan-profit exercise has three
//! plain steps and a fourth step split into five substeps. The angle
//! exercise mixes answer shapes and puts two equations in one unit.

use guided_engine::{EngineConfig, GuidedSession, ManualClock};
use guided_types::*;
use std::sync::Arc;

pub const CARAVAN_ID: &str = "caravan-profit";
pub const ANGLES_ID: &str = "triangle-angles";

fn substitution(title: &str, layout: &str, answer: &[&str], palette: &[&str]) -> UnitDefinition {
    UnitDefinition::new(title)
        .with_equation(EquationDefinition::from_layout(
            layout,
            CanonicalAnswer::exact(tokens(answer.iter().copied())),
        ))
        .with_tokens(palette.iter().copied())
}

/// The caravan-profit exercise: `C + L + M = 4500`, `M = 2C`, `L = C + 500`,
/// then substitution down to `C = 1000`
pub fn caravan() -> ExerciseDefinition {
    ExerciseDefinition::new(WidgetId::new(CARAVAN_ID))
        .with_title("Caravan profit division")
        .with_step(StepDefinition::single(
            UnitDefinition::new("create_total_profit_equation")
                .with_equation(
                    EquationDefinition::from_layout(
                        "_ + _ + _ = _",
                        CanonicalAnswer::permutation(tokens(["C", "L", "M"])).with_fixed(3, "4500"),
                    )
                    .with_success_message("perfect")
                    .with_error_message("not_quite_right"),
                )
                .with_tokens(["M", "L", "C", "4500", "5000"]),
        ))
        .with_step(StepDefinition::single(
            UnitDefinition::new("create_merchant_share_equation")
                .with_equation(
                    EquationDefinition::from_layout(
                        "_ = _ * _",
                        CanonicalAnswer::format(vec![
                            tokens(["M", "2", "C"]),
                            tokens(["M", "C", "2"]),
                            tokens(["2", "C", "M"]),
                            tokens(["C", "2", "M"]),
                        ]),
                    )
                    .with_success_message("excellent")
                    .with_error_message("remember"),
                )
                .with_tokens(["M", "C", "2", "3"]),
        ))
        .with_step(StepDefinition::single(
            UnitDefinition::new("create_lead_merchant_share_equation")
                .with_equation(
                    EquationDefinition::from_layout(
                        "_ = _ + _",
                        CanonicalAnswer::format(vec![
                            tokens(["L", "C", "500"]),
                            tokens(["L", "500", "C"]),
                        ]),
                    )
                    .with_success_message("good"),
                )
                .with_tokens(["L", "C", "500", "300"]),
        ))
        .with_step(StepDefinition::with_substeps(
            "solve_system_using_substitution_method",
            vec![
                substitution(
                    "replace_m_in_first_equation",
                    "_ + L + C = 4500",
                    &["2C"],
                    &["2C", "L", "3C"],
                ),
                // "C + 500" is one token, so this layout is built by hand
                UnitDefinition::new("replace_l_with_expression")
                    .with_equation(EquationDefinition::new(
                        vec![
                            Some(Token::new("2C")),
                            Some(Token::new("+")),
                            None,
                            Some(Token::new("+")),
                            Some(Token::new("C")),
                            Some(Token::new("=")),
                            Some(Token::new("4500")),
                        ],
                        CanonicalAnswer::exact(tokens(["C + 500"])),
                    ))
                    .with_tokens(["C + 500", "C + 300"]),
                substitution(
                    "combine_like_terms",
                    "_ + 500 = 4500",
                    &["4C"],
                    &["4C", "500", "4500", "3C"],
                ),
                substitution(
                    "subtract_from_both_sides",
                    "_ = _",
                    &["4C", "4000"],
                    &["4C", "4000", "4500"],
                ),
                substitution("solve_for_c", "_ = _", &["C", "1000"], &["C", "1000", "1200"]),
            ],
        ))
}

/// A two-step angle exercise with an any-of answer and a two-equation unit
pub fn angles() -> ExerciseDefinition {
    ExerciseDefinition::new(WidgetId::new(ANGLES_ID))
        .with_title("Triangle angles")
        .with_step(StepDefinition::single(
            UnitDefinition::new("interior_sum")
                .with_equation(EquationDefinition::from_layout(
                    "_ + _ + _ = _",
                    CanonicalAnswer::permutation(tokens(["A", "B", "C"])).with_fixed(3, "180"),
                ))
                .with_tokens(["A", "B", "C", "D", "180", "360"]),
        ))
        .with_step(StepDefinition::with_substeps(
            "exterior_angle",
            vec![
                UnitDefinition::new("label_exterior")
                    .with_equation(EquationDefinition::from_layout(
                        "_ = _ + _",
                        CanonicalAnswer::any_of(vec![
                            CanonicalAnswer::permutation(tokens(["A", "B"])).with_fixed(0, "D"),
                            CanonicalAnswer::format(vec![tokens(["D", "C", "C"])]),
                        ]),
                    ))
                    .with_tokens(["A", "B", "C", "D"]),
                UnitDefinition::new("measure")
                    .with_equation(
                        EquationDefinition::from_layout(
                            "A = _",
                            CanonicalAnswer::exact(tokens(["50"])),
                        )
                        .with_label("first"),
                    )
                    .with_equation(
                        EquationDefinition::from_layout(
                            "D = _",
                            CanonicalAnswer::exact(tokens(["110"])),
                        )
                        .with_label("second"),
                    )
                    .with_tokens(["50", "60", "110", "120"]),
            ],
        ))
}

/// One accepted tuple of editable-slot values for an equation.
/// Slots no constraint covers get `"any"`.
pub fn solution(answer: &CanonicalAnswer, arity: usize) -> Vec<Token> {
    match answer {
        CanonicalAnswer::Permutation {
            expected, fixed, ..
        } => {
            let mut tuple = vec![Token::new("any"); arity];
            for (index, value) in answer.permuted_indices(arity).into_iter().zip(expected) {
                tuple[index] = value.clone();
            }
            for f in fixed {
                tuple[f.index] = f.value.clone();
            }
            tuple
        }
        CanonicalAnswer::Format { accepted } => accepted.first().cloned().unwrap_or_default(),
        CanonicalAnswer::AnyOf { answers } => answers
            .first()
            .map(|a| solution(a, arity))
            .unwrap_or_default(),
    }
}

/// Fill every equation of the session's current unit with a correct tuple
pub fn solve_current(session: &mut GuidedSession) -> GuidedResult<()> {
    let unit = session
        .controller()
        .current_unit()
        .cloned()
        .ok_or_else(|| GuidedError::InvalidDefinition("no current unit".into()))?;
    for (index, equation) in unit.equations.iter().enumerate() {
        let slots = equation.instantiate().editable_positions();
        let values = solution(&equation.answer, equation.arity());
        for (slot, token) in slots.into_iter().zip(values) {
            session.place(index, slot, token)?;
        }
    }
    Ok(())
}

/// Open a session on a manual clock starting at the epoch
pub fn open(definition: ExerciseDefinition) -> (GuidedSession, ManualClock) {
    open_with_config(definition, &EngineConfig::default())
}

pub fn open_with_config(
    definition: ExerciseDefinition,
    config: &EngineConfig,
) -> (GuidedSession, ManualClock) {
    let clock = ManualClock::at_epoch();
    let session = GuidedSession::open_with_clock(Arc::new(definition), config, Arc::new(clock.clone()))
        .unwrap_or_else(|e| panic!("fixture definition rejected: {}", e));
    (session, clock)
}

/// Notification keys drained from a session
pub fn drain_keys(session: &mut GuidedSession) -> Vec<String> {
    session
        .drain_notifications()
        .iter()
        .map(|n| n.notification_key())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_validate() {
        caravan().validate().unwrap();
        angles().validate().unwrap();
        assert_eq!(caravan().positions().len(), 8);
        assert_eq!(angles().positions().len(), 3);
    }

    #[test]
    fn test_solution_is_accepted() {
        let matcher = guided_engine::AnswerMatcher::new();
        for definition in [caravan(), angles()] {
            for position in definition.positions() {
                let unit = definition.unit(position).unwrap();
                for equation in &unit.equations {
                    let values: Vec<Option<Token>> = solution(&equation.answer, equation.arity())
                        .into_iter()
                        .map(Some)
                        .collect();
                    assert!(
                        matcher.is_correct(&values, &equation.answer),
                        "{} at {}",
                        definition.widget_id,
                        position
                    );
                }
            }
        }
    }
}
