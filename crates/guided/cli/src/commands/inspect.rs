//! Progress snapshot inspection

use crate::error::CliResult;
use crate::output::{self, print_info, OutputFormat};
use clap::Args;
use guided_engine::{FileProgressStore, ProgressStore};
use guided_types::{EquationSnapshot, ProgressSnapshot};
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

/// Arguments for `guided inspect`
#[derive(Args)]
pub struct InspectArgs {
    /// Snapshot file, or a progress store directory
    pub path: PathBuf,
}

/// One stored widget in a progress store
#[derive(Debug, Serialize, Tabled)]
struct StoredRow {
    widget: String,
    position: String,
    completed: usize,
    saved_at: String,
}

impl From<&ProgressSnapshot> for StoredRow {
    fn from(snapshot: &ProgressSnapshot) -> Self {
        Self {
            widget: snapshot.widget_id.to_string(),
            position: snapshot.position.to_string(),
            completed: snapshot.completed.len(),
            saved_at: snapshot.saved_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// One saved equation of a snapshot
#[derive(Debug, Serialize, Tabled)]
struct EquationRow {
    unit: String,
    equation: usize,
    values: String,
}

impl From<&EquationSnapshot> for EquationRow {
    fn from(eq: &EquationSnapshot) -> Self {
        let values: Vec<&str> = eq
            .values
            .iter()
            .map(|v| v.as_ref().map_or("_", |t| t.as_str()))
            .collect();
        Self {
            unit: eq.position.to_string(),
            equation: eq.index,
            values: values.join(" "),
        }
    }
}

/// Execute the inspect command
pub async fn execute(args: InspectArgs, format: OutputFormat) -> CliResult<()> {
    if args.path.is_dir() {
        let store = FileProgressStore::new(&args.path);
        let mut snapshots = Vec::new();
        for widget_id in store.list().await? {
            if let Some(snapshot) = store.load(&widget_id).await? {
                snapshots.push(snapshot);
            }
        }
        return output::print_output(snapshots.iter().map(StoredRow::from).collect(), format);
    }

    let snapshot = ProgressSnapshot::from_json(&std::fs::read_to_string(&args.path)?)?;
    match format {
        OutputFormat::Table => {
            print_info(&format!(
                "{} at {} (snapshot v{}, saved {})",
                snapshot.widget_id, snapshot.position, snapshot.version, snapshot.saved_at
            ));
            print_info(&format!("completed: {}", snapshot.completed_keys().join(", ")));
            output::print_output(
                snapshot.equations.iter().map(EquationRow::from).collect(),
                format,
            )
        }
        _ => output::print_single(&snapshot, format),
    }
}
