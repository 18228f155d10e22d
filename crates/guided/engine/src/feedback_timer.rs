//! Transient feedback: one message at a time, success auto-clears
//!
//! Showing a message supersedes the previous one and cancels its
//! pending expiry. Each scheduled expiry carries a ticket; expiring
//! with a ticket that is no longer pending does nothing, so a stale
//! timer can never clear a newer message.

use chrono::{DateTime, Duration, Utc};
use guided_types::{FeedbackKind, FeedbackMessage};

/// Identifies one scheduled auto-clear
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ExpiryTicket(u64);

/// The single scheduled auto-clear, if any
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingExpiry {
    pub ticket: ExpiryTicket,
    pub at: DateTime<Utc>,
}

/// Holds the displayed message and its cancellable expiry
#[derive(Clone, Debug)]
pub struct FeedbackTimer {
    ttl: Duration,
    current: Option<FeedbackMessage>,
    pending: Option<PendingExpiry>,
    next_ticket: u64,
}

impl FeedbackTimer {
    pub fn new(ttl: std::time::Duration) -> Self {
        Self {
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::milliseconds(4000)),
            current: None,
            pending: None,
            next_ticket: 0,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn current(&self) -> Option<&FeedbackMessage> {
        self.current.as_ref()
    }

    pub fn pending(&self) -> Option<PendingExpiry> {
        self.pending
    }

    /// Show a success message and schedule its auto-clear
    pub fn show_success(&mut self, key: impl Into<String>, now: DateTime<Utc>) -> PendingExpiry {
        let at = now + self.ttl;
        self.current = Some(FeedbackMessage::success(key, now, at));
        self.next_ticket += 1;
        let expiry = PendingExpiry {
            ticket: ExpiryTicket(self.next_ticket),
            at,
        };
        self.pending = Some(expiry);
        expiry
    }

    /// Show an error message; it stays until cleared
    pub fn show_error(&mut self, key: impl Into<String>, now: DateTime<Utc>) {
        self.pending = None;
        self.current = Some(FeedbackMessage::error(key, now));
    }

    /// Cancel any pending expiry and drop the message
    pub fn clear(&mut self) -> bool {
        self.pending = None;
        self.current.take().is_some()
    }

    /// Drop the message only if it is an error
    pub fn clear_error(&mut self) -> bool {
        if self
            .current
            .as_ref()
            .is_some_and(|m| m.kind == FeedbackKind::Error)
        {
            self.current = None;
            return true;
        }
        false
    }

    /// Fire a scheduled expiry; ignored unless it is still the pending one
    pub fn expire(&mut self, ticket: ExpiryTicket) -> bool {
        match self.pending {
            Some(pending) if pending.ticket == ticket => {
                self.pending = None;
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Clear the message if its expiry is due at `now`
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.pending {
            Some(pending) if now >= pending.at => self.expire(pending.ticket),
            _ => false,
        }
    }
}

impl Default for FeedbackTimer {
    fn default() -> Self {
        Self::new(std::time::Duration::from_millis(4000))
    }
}
