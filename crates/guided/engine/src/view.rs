//! Read-only projection of a session for the rendering surface

use guided_types::{
    DisplayFlags, FeedbackMessage, MatchOutcome, Position, Slot, TokenOption, WidgetId,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One equation as the surface should draw it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquationView {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    pub slots: Vec<Slot>,
    /// Slots joined with spaces, `_` for empty
    pub rendered: String,
    pub outcome: MatchOutcome,
}

/// Everything the surface needs to draw the current unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub widget_id: WidgetId,
    pub position: Position,
    pub total_steps: u32,
    /// Substeps of the current step, 0 when it has none
    pub substep_count: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub equations: Vec<EquationView>,
    pub palette: Vec<TokenOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackMessage>,
    pub is_current_complete: bool,
    pub can_go_next: bool,
    pub can_go_previous: bool,
    /// Notification keys of every set completion flag
    pub completed: Vec<String>,
    #[serde(default)]
    pub display_flags: DisplayFlags,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub pass_through: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate_satisfied: Option<bool>,
}

impl SessionView {
    /// Explicit `false` hides; absent or `true` shows
    pub fn is_visible(&self, flag: &str) -> bool {
        self.display_flags.is_visible(flag)
    }

    pub fn is_completed(&self, notification_key: &str) -> bool {
        self.completed.iter().any(|k| k == notification_key)
    }
}
