//! Exercise orchestrator: hosts many widgets at once
//!
//! The host dialog addresses widgets by id. The orchestrator:
//! 1. Registers exercise definitions
//! 2. Opens sessions, fresh or resumed from a progress store
//! 3. Routes navigation commands to the addressed session
//! 4. Collects completion notifications from every session
//! 5. Checkpoints sessions back to the store
//!
//! Sessions never see each other; a command for one widget cannot touch
//! another widget's progress.

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::progress_store::ProgressStore;
use crate::session::GuidedSession;
use crate::sync_bridge::BridgeOutcome;
use crate::definition_registry::DefinitionRegistry;
use guided_types::*;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Multi-widget host for guided sessions
pub struct ExerciseOrchestrator {
    config: EngineConfig,
    definitions: DefinitionRegistry,
    sessions: BTreeMap<WidgetId, GuidedSession>,
    clock: Arc<dyn Clock>,
    store: Option<Arc<dyn ProgressStore>>,
}

impl ExerciseOrchestrator {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            definitions: DefinitionRegistry::new(),
            sessions: BTreeMap::new(),
            clock: Arc::new(SystemClock),
            store: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ProgressStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Definition Management ────────────────────────────────────────

    pub fn register_definition(&mut self, definition: ExerciseDefinition) -> GuidedResult<WidgetId> {
        self.definitions.register(definition)
    }

    pub fn definitions(&self) -> &DefinitionRegistry {
        &self.definitions
    }

    // ── Session Lifecycle ────────────────────────────────────────────

    /// Open a fresh session; an already open session is returned as is
    pub fn open_session(&mut self, widget_id: &WidgetId) -> GuidedResult<&mut GuidedSession> {
        if !self.sessions.contains_key(widget_id) {
            let definition = self.definitions.get(widget_id)?;
            let session =
                GuidedSession::open_with_clock(definition, &self.config, Arc::clone(&self.clock))?;
            self.sessions.insert(widget_id.clone(), session);
        }
        self.session_mut(widget_id)
    }

    /// Open a session resumed from the store when it holds a snapshot.
    ///
    /// Returns `true` when progress was restored. A snapshot that no
    /// longer matches the definition is logged and a fresh session is
    /// opened instead.
    pub async fn resume_session(&mut self, widget_id: &WidgetId) -> GuidedResult<bool> {
        let definition = self.definitions.get(widget_id)?;
        let snapshot = match &self.store {
            Some(store) => store.load(widget_id).await?,
            None => None,
        };

        let mut session =
            GuidedSession::open_with_clock(definition, &self.config, Arc::clone(&self.clock))?;
        let restored = match snapshot {
            Some(snapshot) => match session.restore(&snapshot) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(widget = %widget_id, error = %e, "Stored progress discarded");
                    false
                }
            },
            None => false,
        };

        self.sessions.insert(widget_id.clone(), session);
        Ok(restored)
    }

    pub fn session(&self, widget_id: &WidgetId) -> GuidedResult<&GuidedSession> {
        self.sessions
            .get(widget_id)
            .ok_or_else(|| GuidedError::WidgetNotFound(widget_id.clone()))
    }

    pub fn session_mut(&mut self, widget_id: &WidgetId) -> GuidedResult<&mut GuidedSession> {
        self.sessions
            .get_mut(widget_id)
            .ok_or_else(|| GuidedError::WidgetNotFound(widget_id.clone()))
    }

    pub fn close_session(&mut self, widget_id: &WidgetId) -> Option<GuidedSession> {
        self.sessions.remove(widget_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    // ── Command Routing ──────────────────────────────────────────────

    /// Route a navigation command to one widget's session
    pub fn dispatch(
        &mut self,
        widget_id: &WidgetId,
        command: &NavigationCommand,
    ) -> GuidedResult<BridgeOutcome> {
        self.session_mut(widget_id)?.apply_command(command)
    }

    /// Route a raw host payload to one widget's session
    pub fn dispatch_payload(
        &mut self,
        widget_id: &WidgetId,
        payload: &serde_json::Value,
    ) -> GuidedResult<BridgeOutcome> {
        self.session_mut(widget_id)?.apply_payload(payload)
    }

    /// Notifications queued by every session, grouped by widget
    pub fn drain_notifications(&mut self) -> Vec<(WidgetId, CompletionNotification)> {
        self.sessions
            .iter_mut()
            .flat_map(|(id, session)| {
                session
                    .drain_notifications()
                    .into_iter()
                    .map(move |n| (id.clone(), n))
            })
            .collect()
    }

    /// Let every session clear due success messages
    pub fn tick_all(&mut self) -> usize {
        self.sessions
            .values_mut()
            .map(GuidedSession::tick)
            .filter(|cleared| *cleared)
            .count()
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Save one session's progress to the store
    pub async fn checkpoint(&self, widget_id: &WidgetId) -> GuidedResult<ProgressSnapshot> {
        let snapshot = self.session(widget_id)?.snapshot();
        if let Some(store) = &self.store {
            store.save(&snapshot).await?;
            tracing::debug!(widget = %widget_id, "Session checkpointed");
        }
        Ok(snapshot)
    }

    /// Save every open session; returns how many were saved
    pub async fn checkpoint_all(&self) -> GuidedResult<usize> {
        let mut saved = 0;
        for widget_id in self.sessions.keys() {
            self.checkpoint(widget_id).await?;
            saved += 1;
        }
        Ok(saved)
    }
}

impl std::fmt::Debug for ExerciseOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExerciseOrchestrator")
            .field("definitions", &self.definitions.count())
            .field("sessions", &self.sessions.keys().collect::<Vec<_>>())
            .field("has_store", &self.store.is_some())
            .finish()
    }
}
