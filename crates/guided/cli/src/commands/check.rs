//! Single-equation answer check

use super::load_definition;
use crate::error::{CliError, CliResult};
use crate::output::{self, print_error, print_success, print_warning, OutputFormat};
use clap::Args;
use guided_engine::AnswerMatcher;
use guided_types::{MatchOutcome, Position, Token, WidgetId};
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for `guided check`
#[derive(Args)]
pub struct CheckArgs {
    /// Definition file (JSON or YAML)
    pub definition: PathBuf,

    /// Step number (1-based)
    #[arg(long)]
    pub step: u32,

    /// Substep number (1-based) for steps split into substeps
    #[arg(long)]
    pub substep: Option<u32>,

    /// Equation index within the unit
    #[arg(long, default_value_t = 0)]
    pub equation: usize,

    /// Editable-slot values, left to right; `_` leaves a slot empty
    #[arg(long, value_delimiter = ',', required = true)]
    pub values: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    widget_id: WidgetId,
    position: Position,
    equation: usize,
    values: Vec<Option<Token>>,
    outcome: MatchOutcome,
}

fn parse_values(raw: &[String]) -> Vec<Option<Token>> {
    raw.iter()
        .map(|v| v.trim())
        .map(|v| match v {
            "" | "_" => None,
            value => Some(Token::new(value)),
        })
        .collect()
}

/// Execute the check command
pub fn execute(args: CheckArgs, format: OutputFormat) -> CliResult<()> {
    let definition = load_definition(&args.definition)?;
    let position = match args.substep {
        Some(substep) => Position::substep(args.step, substep),
        None => Position::step(args.step),
    };
    let unit = definition
        .unit(position)
        .ok_or_else(|| CliError::InvalidInput(format!("no unit at {}", position)))?;
    let equation = unit.equations.get(args.equation).ok_or_else(|| {
        CliError::InvalidInput(format!("no equation {} at {}", args.equation, position))
    })?;

    let values = parse_values(&args.values);
    if values.len() != equation.arity() {
        return Err(CliError::InvalidInput(format!(
            "equation has {} editable slots, got {} values",
            equation.arity(),
            values.len()
        )));
    }

    let outcome = AnswerMatcher::new().evaluate(&values, &equation.answer);
    tracing::debug!(position = %position, outcome = %outcome, "Values checked");

    match format {
        OutputFormat::Table => match outcome {
            MatchOutcome::Correct => print_success("correct"),
            MatchOutcome::Incorrect => print_error("incorrect"),
            MatchOutcome::Incomplete => print_warning("incomplete"),
        },
        _ => output::print_single(
            &CheckReport {
                widget_id: definition.widget_id.clone(),
                position,
                equation: args.equation,
                values,
                outcome,
            },
            format,
        )?,
    }
    Ok(())
}
