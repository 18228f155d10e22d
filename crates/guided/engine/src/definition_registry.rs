//! Definition registry: the exercise definitions a host knows about
//!
//! Definitions are validated on the way in and immutable afterwards.
//! Sessions hold an `Arc` to the definition they were opened with, so
//! removing a definition never disturbs a running session.

use guided_types::{ExerciseDefinition, GuidedError, GuidedResult, WidgetId};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Registry of exercise definitions keyed by widget id
#[derive(Clone, Debug, Default)]
pub struct DefinitionRegistry {
    definitions: BTreeMap<WidgetId, Arc<ExerciseDefinition>>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a definition
    pub fn register(&mut self, definition: ExerciseDefinition) -> GuidedResult<WidgetId> {
        definition.validate()?;

        let id = definition.widget_id.clone();
        if self.definitions.contains_key(&id) {
            return Err(GuidedError::DuplicateWidget(id));
        }
        let steps = definition.total_steps();
        self.definitions.insert(id.clone(), Arc::new(definition));

        tracing::info!(widget = %id, steps, "Exercise definition registered");
        Ok(id)
    }

    /// Parse and register a JSON definition
    pub fn register_json(&mut self, json: &str) -> GuidedResult<WidgetId> {
        self.register(ExerciseDefinition::from_json(json)?)
    }

    /// Register every `*.json` file in a directory, in file name order
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> GuidedResult<Vec<WidgetId>> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir)
            .map_err(|e| GuidedError::Storage(format!("{}: {}", dir.display(), e)))?;
        let mut paths: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut ids = Vec::with_capacity(paths.len());
        for path in paths {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| GuidedError::Storage(format!("{}: {}", path.display(), e)))?;
            ids.push(self.register_json(&json)?);
        }
        Ok(ids)
    }

    pub fn get(&self, id: &WidgetId) -> GuidedResult<Arc<ExerciseDefinition>> {
        self.definitions
            .get(id)
            .cloned()
            .ok_or_else(|| GuidedError::WidgetNotFound(id.clone()))
    }

    /// All definitions, ordered by widget id
    pub fn list(&self) -> Vec<&ExerciseDefinition> {
        self.definitions.values().map(Arc::as_ref).collect()
    }

    pub fn count(&self) -> usize {
        self.definitions.len()
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.definitions.contains_key(id)
    }

    pub fn remove(&mut self, id: &WidgetId) -> GuidedResult<Arc<ExerciseDefinition>> {
        let def = self
            .definitions
            .remove(id)
            .ok_or_else(|| GuidedError::WidgetNotFound(id.clone()))?;
        tracing::info!(widget = %id, "Exercise definition removed");
        Ok(def)
    }
}
