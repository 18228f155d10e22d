//! Guided session: one learner working through one widget
//!
//! The session wires the step controller to the completion emitter, the
//! sync bridge, the feedback timer and the journal. Every learner action
//! and every host command enters here, runs to completion synchronously,
//! and leaves behind queued notifications and at most one feedback
//! message.

use crate::clock::{Clock, SystemClock};
use crate::completion_emitter::CompletionEmitter;
use crate::config::{EngineConfig, EntryPolicy, MessageConfig};
use crate::feedback_timer::{ExpiryTicket, FeedbackTimer, PendingExpiry};
use crate::journal::{JournalEvent, NavigationCause, SessionJournal};
use crate::state_machine::{PlacementOutcome, StepController, Transition};
use crate::sync_bridge::{BridgeOutcome, SyncBridge};
use crate::view::{EquationView, SessionView};
use guided_types::*;
use std::sync::Arc;

/// A single widget session
#[derive(Debug)]
pub struct GuidedSession {
    controller: StepController,
    emitter: CompletionEmitter,
    bridge: SyncBridge,
    feedback: FeedbackTimer,
    journal: SessionJournal,
    messages: MessageConfig,
    clock: Arc<dyn Clock>,
}

impl GuidedSession {
    /// Open a fresh session on the wall clock
    pub fn open(definition: Arc<ExerciseDefinition>, config: &EngineConfig) -> GuidedResult<Self> {
        Self::open_with_clock(definition, config, Arc::new(SystemClock))
    }

    /// Open a fresh session at the position the entry policy selects
    pub fn open_with_clock(
        definition: Arc<ExerciseDefinition>,
        config: &EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> GuidedResult<Self> {
        definition.validate()?;
        let units = definition.positions();
        let entry = match config.session.entry {
            EntryPolicy::First => units.first(),
            EntryPolicy::Last => units.last(),
        }
        .copied()
        .ok_or_else(|| GuidedError::InvalidDefinition("no steps".into()))?;

        let widget_id = definition.widget_id.clone();
        let controller = StepController::new(definition, entry)?;
        let mut session = Self {
            controller,
            emitter: CompletionEmitter::new(),
            bridge: SyncBridge::new(),
            feedback: FeedbackTimer::new(config.feedback.success_ttl()),
            journal: SessionJournal::new(config.journal.capacity),
            messages: config.messages.clone(),
            clock,
        };
        session.record(JournalEvent::SessionOpened { position: entry });
        tracing::info!(widget = %widget_id, position = %entry, "Session opened");
        Ok(session)
    }

    /// Open a session and restore it from a snapshot
    pub fn resume(
        definition: Arc<ExerciseDefinition>,
        config: &EngineConfig,
        clock: Arc<dyn Clock>,
        snapshot: &ProgressSnapshot,
    ) -> GuidedResult<Self> {
        let mut session = Self::open_with_clock(definition, config, clock)?;
        session.restore(snapshot)?;
        Ok(session)
    }

    pub fn widget_id(&self) -> &WidgetId {
        &self.controller.definition().widget_id
    }

    pub fn position(&self) -> Position {
        self.controller.position()
    }

    pub fn controller(&self) -> &StepController {
        &self.controller
    }

    pub fn journal(&self) -> &SessionJournal {
        &self.journal
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    // ── Learner actions ──────────────────────────────────────────────

    /// Drag-style placement at an explicit slot
    pub fn place(
        &mut self,
        equation: usize,
        slot: usize,
        token: Token,
    ) -> GuidedResult<PlacementOutcome> {
        let outcome = self.controller.place(equation, slot, token.clone())?;
        self.record(JournalEvent::TokenPlaced {
            position: outcome.position,
            equation,
            slot,
            token,
        });
        self.after_placement(&outcome);
        Ok(outcome)
    }

    /// Click/keyboard placement into the next empty slot; `None` when
    /// every slot is already filled
    pub fn place_next(&mut self, token: Token) -> GuidedResult<Option<PlacementOutcome>> {
        let position = self.position();
        let Some(outcome) = self.controller.place_next(token.clone())? else {
            self.record(JournalEvent::PlacementIgnored { position, token });
            return Ok(None);
        };
        if let Some(slot) = outcome.slot {
            self.record(JournalEvent::TokenPlaced {
                position,
                equation: outcome.equation,
                slot,
                token,
            });
        }
        self.after_placement(&outcome);
        Ok(Some(outcome))
    }

    /// Empty a slot of the current unit
    pub fn clear_slot(&mut self, equation: usize, slot: usize) -> GuidedResult<Option<Token>> {
        let removed = self.controller.clear_slot(equation, slot)?;
        self.feedback.clear_error();
        self.record(JournalEvent::SlotCleared {
            position: self.position(),
            equation,
            slot,
        });
        Ok(removed)
    }

    fn after_placement(&mut self, outcome: &PlacementOutcome) {
        if self.feedback.clear_error() {
            self.record(JournalEvent::FeedbackCleared);
        }
        self.record(JournalEvent::Evaluated {
            position: outcome.position,
            equation: outcome.equation,
            outcome: outcome.outcome,
        });

        let equation = self
            .controller
            .definition()
            .unit(outcome.position)
            .and_then(|u| u.equations.get(outcome.equation));
        match outcome.outcome {
            MatchOutcome::Correct => {
                let key = equation
                    .and_then(|e| e.success_message.clone())
                    .unwrap_or_else(|| self.messages.correct.clone());
                self.show_success(key);
            }
            MatchOutcome::Incorrect => {
                let key = equation
                    .and_then(|e| e.error_message.clone())
                    .unwrap_or_else(|| self.messages.incorrect.clone());
                self.show_error(key);
            }
            MatchOutcome::Incomplete => {}
        }

        self.notify(&outcome.newly_completed);
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Advance one unit. An incomplete unit shows the step-incomplete
    /// message and leaves the pointer where it is.
    pub fn go_next(&mut self) -> GuidedResult<Transition> {
        match self.controller.go_next() {
            Ok(transition) => {
                self.after_navigation(&transition, NavigationCause::Next);
                Ok(transition)
            }
            Err(e) => {
                if e.is_learner_facing() {
                    let key = self.messages.step_incomplete.clone();
                    self.show_error(key);
                }
                self.reject(&e);
                Err(e)
            }
        }
    }

    pub fn go_previous(&mut self) -> GuidedResult<Transition> {
        let result = self.controller.go_previous();
        self.finish_navigation(result, NavigationCause::Previous)
    }

    pub fn jump_to(&mut self, step: u32, substep: Option<u32>) -> GuidedResult<Transition> {
        let result = self.controller.jump_to(step, substep);
        self.finish_navigation(result, NavigationCause::Jump)
    }

    /// Empty a step's equations; pointer and completion flags stay
    pub fn reset_step(&mut self, step: u32) -> GuidedResult<()> {
        if let Err(e) = self.controller.reset_step(step) {
            self.reject(&e);
            return Err(e);
        }
        self.clear_feedback();
        self.record(JournalEvent::StepReset { step });
        Ok(())
    }

    /// Empty everything and go back to the first unit
    pub fn restart(&mut self) -> GuidedResult<Transition> {
        let result = self.controller.restart();
        self.finish_navigation(result, NavigationCause::Restart)
    }

    /// Apply a navigation command from the host
    pub fn apply_command(&mut self, command: &NavigationCommand) -> GuidedResult<BridgeOutcome> {
        match self.bridge.apply(&mut self.controller, command) {
            Ok(BridgeOutcome::Applied(transition)) => {
                self.after_navigation(&transition, NavigationCause::Command);
                Ok(BridgeOutcome::Applied(transition))
            }
            Ok(ignored @ BridgeOutcome::Ignored(reason)) => {
                self.record(JournalEvent::CommandIgnored {
                    reason: reason.to_string(),
                });
                Ok(ignored)
            }
            Err(e) => {
                self.reject(&e);
                Err(e)
            }
        }
    }

    /// Parse and apply a raw host payload
    pub fn apply_payload(&mut self, payload: &serde_json::Value) -> GuidedResult<BridgeOutcome> {
        self.apply_command(&NavigationCommand::from_json_value(payload))
    }

    /// Apply a burst of commands observed between two renders. Only the
    /// last one is applied; the rest are dropped without effect.
    pub fn apply_latest<'a>(
        &mut self,
        commands: impl IntoIterator<Item = &'a NavigationCommand>,
    ) -> GuidedResult<Option<BridgeOutcome>> {
        match commands.into_iter().last() {
            Some(command) => self.apply_command(command).map(Some),
            None => Ok(None),
        }
    }

    fn finish_navigation(
        &mut self,
        result: GuidedResult<Transition>,
        cause: NavigationCause,
    ) -> GuidedResult<Transition> {
        match result {
            Ok(transition) => {
                self.after_navigation(&transition, cause);
                Ok(transition)
            }
            Err(e) => {
                self.reject(&e);
                Err(e)
            }
        }
    }

    fn after_navigation(&mut self, transition: &Transition, cause: NavigationCause) {
        self.clear_feedback();
        self.record(JournalEvent::Navigated {
            from: transition.from,
            to: transition.to,
            cause,
        });
        self.notify(&transition.newly_completed);
    }

    fn reject(&mut self, error: &GuidedError) {
        tracing::debug!(error = %error, "Navigation rejected");
        self.record(JournalEvent::NavigationRejected {
            reason: error.to_string(),
        });
    }

    // ── Feedback ─────────────────────────────────────────────────────

    pub fn feedback(&self) -> Option<&FeedbackMessage> {
        self.feedback.current()
    }

    pub fn pending_expiry(&self) -> Option<PendingExpiry> {
        self.feedback.pending()
    }

    /// Clear the success message if its expiry is due by the session clock
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        let cleared = self.feedback.poll(now);
        if cleared {
            self.record(JournalEvent::FeedbackCleared);
        }
        cleared
    }

    /// Fire a scheduled expiry; stale tickets are ignored
    pub fn expire_feedback(&mut self, ticket: ExpiryTicket) -> bool {
        let cleared = self.feedback.expire(ticket);
        if cleared {
            self.record(JournalEvent::FeedbackCleared);
        }
        cleared
    }

    fn show_success(&mut self, key: String) {
        let now = self.clock.now();
        self.feedback.show_success(key.clone(), now);
        self.record(JournalEvent::FeedbackShown {
            kind: FeedbackKind::Success,
            key,
        });
    }

    fn show_error(&mut self, key: String) {
        let now = self.clock.now();
        self.feedback.show_error(key.clone(), now);
        self.record(JournalEvent::FeedbackShown {
            kind: FeedbackKind::Error,
            key,
        });
    }

    fn clear_feedback(&mut self) {
        if self.feedback.clear() {
            self.record(JournalEvent::FeedbackCleared);
        }
    }

    // ── Notifications ────────────────────────────────────────────────

    fn notify(&mut self, keys: &[CompletionKey]) {
        let now = self.clock.now();
        for notification in self.emitter.emit(keys, now) {
            self.record(JournalEvent::Completed {
                key: notification.key,
            });
        }
    }

    /// Take every completion notification queued since the last drain
    pub fn drain_notifications(&mut self) -> Vec<CompletionNotification> {
        self.emitter.drain()
    }

    // ── Views and persistence ────────────────────────────────────────

    pub fn display_flags(&self) -> &DisplayFlags {
        self.bridge.display_flags()
    }

    pub fn gate_satisfied(&self) -> Option<bool> {
        self.bridge.gate_satisfied(&self.controller)
    }

    pub fn view(&self) -> SessionView {
        let position = self.position();
        let definition = self.controller.definition();
        let unit = self.controller.current_unit();
        let outcomes = self.controller.unit_outcomes(position);

        let equations = self
            .controller
            .current_equations()
            .iter()
            .enumerate()
            .map(|(i, eq)| EquationView {
                label: unit
                    .and_then(|u| u.equations.get(i))
                    .map(|e| e.label.clone())
                    .unwrap_or_default(),
                slots: eq.slots().to_vec(),
                rendered: eq.to_string(),
                outcome: outcomes.get(i).copied().unwrap_or(MatchOutcome::Incomplete),
            })
            .collect();

        SessionView {
            widget_id: definition.widget_id.clone(),
            position,
            total_steps: definition.total_steps(),
            substep_count: definition.substep_count(position.step),
            title: unit.map(|u| u.title.clone()).unwrap_or_default(),
            equations,
            palette: unit.map(|u| u.tokens.clone()).unwrap_or_default(),
            feedback: self.feedback.current().cloned(),
            is_current_complete: self.controller.is_current_complete(),
            can_go_next: self.controller.can_go_next(),
            can_go_previous: self.controller.can_go_previous(),
            completed: self
                .controller
                .state()
                .completed()
                .map(CompletionKey::notification_key)
                .collect(),
            display_flags: self.bridge.display_flags().clone(),
            pass_through: self.bridge.pass_through().clone(),
            gate: self.bridge.gate().map(str::to_string),
            gate_satisfied: self.gate_satisfied(),
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        self.controller.snapshot(self.clock.now())
    }

    /// Replace progress with a snapshot. Flags already set in it are
    /// never re-announced.
    pub fn restore(&mut self, snapshot: &ProgressSnapshot) -> GuidedResult<()> {
        let completed = self.controller.restore(snapshot)?;
        self.emitter.prime(&completed);
        self.clear_feedback();
        let position = self.position();
        self.record(JournalEvent::SessionResumed { position });
        tracing::info!(
            widget = %self.widget_id(),
            position = %position,
            completed = completed.len(),
            "Session resumed"
        );
        Ok(())
    }

    fn record(&mut self, event: JournalEvent) {
        let now = self.clock.now();
        self.journal.record(event, now);
    }
}
