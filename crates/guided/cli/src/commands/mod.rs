//! CLI command implementations

pub mod check;
pub mod inspect;
pub mod replay;
pub mod validate;

use crate::error::CliResult;
use guided_types::ExerciseDefinition;
use std::path::Path;

/// Read a definition from JSON, or YAML when the extension says so.
/// The definition is not validated here.
pub fn read_definition(path: &Path) -> CliResult<ExerciseDefinition> {
    let contents = std::fs::read_to_string(path)?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == "yaml" || e == "yml");
    let definition = if is_yaml {
        serde_yaml::from_str(&contents)?
    } else {
        serde_json::from_str(&contents)?
    };
    Ok(definition)
}

/// Read and validate a definition
pub fn load_definition(path: &Path) -> CliResult<ExerciseDefinition> {
    let definition = read_definition(path)?;
    definition.validate()?;
    Ok(definition)
}
