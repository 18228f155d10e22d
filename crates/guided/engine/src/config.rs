//! Engine configuration
//!
//! Loaded from TOML. Every section and field is optional; anything left
//! out takes its default.
//!
//! ```toml
//! [feedback]
//! success_ttl_ms = 4000
//!
//! [messages]
//! correct = "perfect"
//! incorrect = "not_quite_right"
//! step_incomplete = "please_complete_current_step_before_proceeding"
//!
//! [session]
//! entry = "first"
//!
//! [journal]
//! capacity = 256
//! ```

use guided_types::{GuidedError, GuidedResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level engine configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub feedback: FeedbackConfig,
    pub messages: MessageConfig,
    pub session: SessionConfig,
    pub journal: JournalConfig,
}

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> GuidedResult<Self> {
        toml::from_str(contents).map_err(|e| GuidedError::Config(e.to_string()))
    }

    /// Load from a file; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> GuidedResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No engine config, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| GuidedError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> GuidedResult<String> {
        toml::to_string_pretty(self).map_err(|e| GuidedError::Config(e.to_string()))
    }
}

/// Success-message auto-clear
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub success_ttl_ms: u64,
}

impl FeedbackConfig {
    pub fn success_ttl(&self) -> Duration {
        Duration::from_millis(self.success_ttl_ms)
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            success_ttl_ms: 4000,
        }
    }
}

/// Message keys used when an equation does not name its own
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    pub correct: String,
    pub incorrect: String,
    pub step_incomplete: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            correct: "perfect".into(),
            incorrect: "not_quite_right".into(),
            step_incomplete: "please_complete_current_step_before_proceeding".into(),
        }
    }
}

/// Where a fresh session opens
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryPolicy {
    /// First unit, for a first visit
    #[default]
    First,
    /// Final unit, for reviewing a widget already worked through
    Last,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub entry: EntryPolicy,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Oldest records are dropped beyond this many
    pub capacity: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}
