//! Sync bridge: reconciles host navigation commands with the controller
//!
//! The host dialog and the widget each keep a step pointer. Host
//! commands are applied through [`StepController::jump_to`] and nothing
//! else; a `disabledUnless` gate is remembered for the host to query but
//! never satisfied by the bridge itself.
//!
//! Commands are applied in arrival order and never queued. When several
//! arrive together only the last one counts.

use crate::state_machine::{StepController, Transition};
use guided_types::{CompletionKey, DisplayFlags, GuidedResult, NavigationCommand};
use serde_json::{Map, Value};

/// What became of a command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// The pointer was updated (possibly to where it already was)
    Applied(Transition),
    /// Nothing to do
    Ignored(IgnoreReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The payload carried no usable step
    MissingStep,
    /// Same step as the current one, and that step has no substeps
    Unchanged,
}

impl std::fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IgnoreReason::MissingStep => write!(f, "no step in command"),
            IgnoreReason::Unchanged => write!(f, "step unchanged"),
        }
    }
}

/// Holds the host-facing side of the last observed command
#[derive(Clone, Debug, Default)]
pub struct SyncBridge {
    display_flags: DisplayFlags,
    pass_through: Map<String, Value>,
    gate: Option<String>,
}

impl SyncBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one command. Out-of-range targets come back as errors with
    /// the controller untouched.
    ///
    /// Display flags and pass-through keys are taken from every command,
    /// including one later rejected or ignored: they describe what the
    /// host is showing, not where the learner is.
    pub fn apply(
        &mut self,
        controller: &mut StepController,
        command: &NavigationCommand,
    ) -> GuidedResult<BridgeOutcome> {
        self.display_flags.replace(command.display_flags.clone());
        self.pass_through = command.extra.clone();

        let Some(step) = command.step else {
            tracing::debug!("Navigation command without step ignored");
            return Ok(BridgeOutcome::Ignored(IgnoreReason::MissingStep));
        };

        let current = controller.position();
        let has_substeps = controller
            .definition()
            .step(step)
            .is_some_and(|s| s.has_substeps());
        if step == current.step && !has_substeps {
            self.gate = command.disabled_unless.clone();
            tracing::debug!(step, "Navigation command for current step ignored");
            return Ok(BridgeOutcome::Ignored(IgnoreReason::Unchanged));
        }

        let transition = controller.jump_to(step, command.sub_step)?;
        self.gate = command.disabled_unless.clone();
        tracing::debug!(
            from = %transition.from,
            to = %transition.to,
            gate = ?self.gate,
            "Navigation command applied"
        );
        Ok(BridgeOutcome::Applied(transition))
    }

    /// Apply only the most recent of a burst of commands
    pub fn apply_latest<'a>(
        &mut self,
        controller: &mut StepController,
        commands: impl IntoIterator<Item = &'a NavigationCommand>,
    ) -> GuidedResult<Option<BridgeOutcome>> {
        match commands.into_iter().last() {
            Some(command) => self.apply(controller, command).map(Some),
            None => Ok(None),
        }
    }

    pub fn display_flags(&self) -> &DisplayFlags {
        &self.display_flags
    }

    /// Payload keys the core does not interpret
    pub fn pass_through(&self) -> &Map<String, Value> {
        &self.pass_through
    }

    /// The gate named by the last applied command
    pub fn gate(&self) -> Option<&str> {
        self.gate.as_deref()
    }

    /// Whether the last command's gate is satisfied by an observed flag.
    /// `None` when there is no gate; unknown gate names are never satisfied.
    pub fn gate_satisfied(&self, controller: &StepController) -> Option<bool> {
        let gate = self.gate.as_deref()?;
        Some(match CompletionKey::parse(gate) {
            Some(CompletionKey::Step { step }) => controller.is_step_complete(step),
            Some(key @ CompletionKey::Substep { .. }) => controller.state().is_completed(&key),
            None => {
                tracing::debug!(gate, "Unknown completion gate");
                false
            }
        })
    }
}
