//! Persisted progress snapshots for session resume

use crate::{CompletionKey, Position, Token, WidgetId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Format version written into every snapshot
pub const SNAPSHOT_VERSION: u32 = 1;

/// Contents of one equation's editable slots
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquationSnapshot {
    #[serde(flatten)]
    pub position: Position,
    pub index: usize,
    pub values: Vec<Option<Token>>,
}

/// Serialized progress of one widget
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub version: u32,
    pub widget_id: WidgetId,
    pub position: Position,
    #[serde(default)]
    pub completed: Vec<CompletionKey>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub substep_cursors: BTreeMap<u32, u32>,
    #[serde(default)]
    pub equations: Vec<EquationSnapshot>,
    pub saved_at: DateTime<Utc>,
}

impl ProgressSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Notification keys of every completed flag, in order
    pub fn completed_keys(&self) -> Vec<String> {
        self.completed.iter().map(|k| k.notification_key()).collect()
    }
}
