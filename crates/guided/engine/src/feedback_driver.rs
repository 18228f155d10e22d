//! Tokio driver for success-message auto-clear
//!
//! Async hosts share a session behind a mutex. After each operation on
//! the session they call [`AutoClearDriver::sync`], which aborts the
//! task for any superseded expiry and spawns one for the current one.
//! A stale task that still manages to run is harmless: the session
//! ignores expiries whose ticket is no longer pending.

use crate::feedback_timer::ExpiryTicket;
use crate::session::GuidedSession;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Shared handle to a session used from async code
pub type SharedSession = Arc<Mutex<GuidedSession>>;

/// Owns at most one scheduled auto-clear task
#[derive(Debug)]
pub struct AutoClearDriver {
    session: SharedSession,
    scheduled: Option<(ExpiryTicket, JoinHandle<()>)>,
}

impl AutoClearDriver {
    pub fn new(session: SharedSession) -> Self {
        Self {
            session,
            scheduled: None,
        }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Align the scheduled task with the session's pending expiry
    pub async fn sync(&mut self) {
        let (pending, now) = {
            let session = self.session.lock().await;
            (session.pending_expiry(), session.now())
        };

        let Some(pending) = pending else {
            self.cancel();
            return;
        };
        if self
            .scheduled
            .as_ref()
            .is_some_and(|(ticket, _)| *ticket == pending.ticket)
        {
            return;
        }

        self.cancel();
        let delay = (pending.at - now).to_std().unwrap_or_default();
        let session = Arc::clone(&self.session);
        let ticket = pending.ticket;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut session = session.lock().await;
            if session.expire_feedback(ticket) {
                tracing::debug!(widget = %session.widget_id(), "Success message auto-cleared");
            }
        });
        self.scheduled = Some((ticket, handle));
    }

    /// Abort the scheduled task, if any
    pub fn cancel(&mut self) {
        if let Some((_, handle)) = self.scheduled.take() {
            handle.abort();
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
            .as_ref()
            .is_some_and(|(_, handle)| !handle.is_finished())
    }
}

impl Drop for AutoClearDriver {
    fn drop(&mut self) {
        self.cancel();
    }
}
