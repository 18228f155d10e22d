//! Transient feedback messages shown to the learner

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a message reports success or a retryable error
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Success,
    Error,
}

impl std::fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackKind::Success => write!(f, "success"),
            FeedbackKind::Error => write!(f, "error"),
        }
    }
}

/// A message currently displayed; `key` is an opaque message key the
/// rendering surface localizes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackMessage {
    pub kind: FeedbackKind,
    pub key: String,
    pub shown_at: DateTime<Utc>,
    /// When the message clears itself; errors never do
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl FeedbackMessage {
    pub fn success(key: impl Into<String>, shown_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            kind: FeedbackKind::Success,
            key: key.into(),
            shown_at,
            expires_at: Some(expires_at),
        }
    }

    pub fn error(key: impl Into<String>, shown_at: DateTime<Utc>) -> Self {
        Self {
            kind: FeedbackKind::Error,
            key: key.into(),
            shown_at,
            expires_at: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == FeedbackKind::Success
    }

    pub fn is_error(&self) -> bool {
        self.kind == FeedbackKind::Error
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}
