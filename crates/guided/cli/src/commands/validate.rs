//! Definition validation command

use super::read_definition;
use crate::error::{CliError, CliResult};
use crate::output::{self, print_error, print_success, OutputFormat};
use clap::Args;
use guided_types::ExerciseDefinition;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

/// Arguments for `guided validate`
#[derive(Args)]
pub struct ValidateArgs {
    /// Definition files (JSON or YAML)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Table row for one definition file
#[derive(Debug, Serialize, Tabled)]
struct ValidationRow {
    file: String,
    widget: String,
    steps: u32,
    units: usize,
    equations: usize,
    status: String,
}

impl ValidationRow {
    fn new(file: &str, definition: &ExerciseDefinition, status: String) -> Self {
        let units = definition.positions();
        let equations = units
            .iter()
            .filter_map(|p| definition.unit(*p))
            .map(|u| u.equations.len())
            .sum();
        Self {
            file: file.to_string(),
            widget: definition.widget_id.to_string(),
            steps: definition.total_steps(),
            units: units.len(),
            equations,
            status,
        }
    }

    fn unreadable(file: &str, reason: String) -> Self {
        Self {
            file: file.to_string(),
            widget: "-".to_string(),
            steps: 0,
            units: 0,
            equations: 0,
            status: reason,
        }
    }
}

/// Execute the validate command
pub fn execute(args: ValidateArgs, format: OutputFormat) -> CliResult<()> {
    let mut rows = Vec::with_capacity(args.files.len());
    let mut failed = 0;

    for path in &args.files {
        let file = path.display().to_string();
        let row = match read_definition(path) {
            Ok(definition) => match definition.validate() {
                Ok(()) => ValidationRow::new(&file, &definition, "ok".to_string()),
                Err(e) => {
                    failed += 1;
                    ValidationRow::new(&file, &definition, e.to_string())
                }
            },
            Err(e) => {
                failed += 1;
                ValidationRow::unreadable(&file, e.to_string())
            }
        };
        rows.push(row);
    }

    output::print_output(rows, format)?;

    if failed > 0 {
        print_error(&format!("{} of {} invalid", failed, args.files.len()));
        return Err(CliError::ValidationFailed(failed));
    }
    if matches!(format, OutputFormat::Table) {
        print_success(&format!("{} definition(s) valid", args.files.len()));
    }
    Ok(())
}
