//! Completion notifications produced for the host
//!
//! A notification is emitted exactly once, when a completion flag flips
//! from `false` to `true`. Completion is monotonic for a session, so the
//! value is always `true`.

use crate::CompletionKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One completion transition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionNotification {
    pub key: CompletionKey,
    pub emitted_at: DateTime<Utc>,
}

impl CompletionNotification {
    pub fn new(key: CompletionKey, emitted_at: DateTime<Utc>) -> Self {
        Self { key, emitted_at }
    }

    /// The stable identifier, e.g. `step-4-substep-2-completed`
    pub fn notification_key(&self) -> String {
        self.key.notification_key()
    }

    /// Completion never reports `false`
    pub fn value(&self) -> bool {
        true
    }
}

/// Collapse notifications into the key → `true` mapping hosts consume
pub fn notification_map(notifications: &[CompletionNotification]) -> BTreeMap<String, bool> {
    notifications
        .iter()
        .map(|n| (n.notification_key(), n.value()))
        .collect()
}
