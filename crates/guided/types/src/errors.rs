//! Error types for guided exercises
//!
//! Nothing here is fatal to a session. Every operation that returns an
//! error leaves the progress state exactly as it was.

use crate::{Position, WidgetId};

/// Errors that can occur in guided exercise operations
#[derive(Debug, thiserror::Error)]
pub enum GuidedError {
    #[error("Step {step} out of range (1..={total})")]
    StepOutOfRange { step: u32, total: u32 },

    #[error("Substep {substep} out of range for step {step} (1..={total})")]
    SubstepOutOfRange { step: u32, substep: u32, total: u32 },

    #[error("Complete {0} before proceeding")]
    StepIncomplete(Position),

    #[error("Already at the last step")]
    NoNextStep,

    #[error("Already at the first step")]
    NoPreviousStep,

    #[error("Equation {index} not found at {position}")]
    EquationNotFound { position: Position, index: usize },

    #[error("Slot {position} out of range (equation has {len} slots)")]
    SlotOutOfRange { position: usize, len: usize },

    #[error("Slot {0} is not editable")]
    SlotNotEditable(usize),

    #[error("Invalid exercise definition: {0}")]
    InvalidDefinition(String),

    #[error("Widget already registered: {0}")]
    DuplicateWidget(WidgetId),

    #[error("Widget not found: {0}")]
    WidgetNotFound(WidgetId),

    #[error("Snapshot does not match definition: {0}")]
    SnapshotMismatch(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GuidedError {
    /// Whether the error should be surfaced to the learner as a retryable
    /// message rather than only logged
    pub fn is_learner_facing(&self) -> bool {
        matches!(self, Self::StepIncomplete(_))
    }
}

/// Result type alias for guided exercise operations
pub type GuidedResult<T> = Result<T, GuidedError>;
