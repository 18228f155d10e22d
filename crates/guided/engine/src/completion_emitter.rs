//! Completion emitter: turns flag transitions into host notifications
//!
//! Each key is emitted at most once per session. Keys already set when
//! a session is resumed are primed so they are never re-announced.

use chrono::{DateTime, Utc};
use guided_types::{CompletionKey, CompletionNotification};
use std::collections::{HashSet, VecDeque};

/// Queues one notification per completion transition
#[derive(Clone, Debug, Default)]
pub struct CompletionEmitter {
    emitted: HashSet<CompletionKey>,
    pending: VecDeque<CompletionNotification>,
}

impl CompletionEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark keys as already announced without queueing anything
    pub fn prime<'a>(&mut self, keys: impl IntoIterator<Item = &'a CompletionKey>) {
        self.emitted.extend(keys.into_iter().copied());
    }

    /// Queue notifications for keys not announced before; returns the
    /// ones queued by this call
    pub fn emit(
        &mut self,
        keys: &[CompletionKey],
        now: DateTime<Utc>,
    ) -> Vec<CompletionNotification> {
        let mut queued = Vec::new();
        for key in keys {
            if !self.emitted.insert(*key) {
                continue;
            }
            let notification = CompletionNotification::new(*key, now);
            tracing::info!(key = %key, "Completion notified");
            self.pending.push_back(notification.clone());
            queued.push(notification);
        }
        queued
    }

    /// Take every queued notification, oldest first
    pub fn drain(&mut self) -> Vec<CompletionNotification> {
        self.pending.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn has_emitted(&self, key: &CompletionKey) -> bool {
        self.emitted.contains(key)
    }
}
