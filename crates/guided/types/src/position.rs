//! Positions and completion keys
//!
//! Steps and substeps are 1-based, matching what hosts send in
//! navigation payloads. A [`Position`] addresses one *unit*: either a
//! step without substeps, or one substep of a step that has them.

use serde::{Deserialize, Serialize};

/// The current (step, substep) pointer
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub step: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substep: Option<u32>,
}

impl Position {
    pub fn step(step: u32) -> Self {
        Self {
            step,
            substep: None,
        }
    }

    pub fn substep(step: u32, substep: u32) -> Self {
        Self {
            step,
            substep: Some(substep),
        }
    }

    /// The completion flag that guards leaving this position
    pub fn completion_key(&self) -> CompletionKey {
        match self.substep {
            Some(substep) => CompletionKey::Substep {
                step: self.step,
                substep,
            },
            None => CompletionKey::Step { step: self.step },
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.substep {
            Some(substep) => write!(f, "step {} substep {}", self.step, substep),
            None => write!(f, "step {}", self.step),
        }
    }
}

/// Identifies one completion flag
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum CompletionKey {
    Step { step: u32 },
    Substep { step: u32, substep: u32 },
}

impl CompletionKey {
    pub fn step_number(&self) -> u32 {
        match self {
            CompletionKey::Step { step } | CompletionKey::Substep { step, .. } => *step,
        }
    }

    /// The stable identifier hosts key notifications by, e.g.
    /// `step-2-completed` or `step-4-substep-3-completed`
    pub fn notification_key(&self) -> String {
        self.to_string()
    }

    /// Parse a notification key back into a completion key
    pub fn parse(key: &str) -> Option<Self> {
        let rest = key.strip_prefix("step-")?.strip_suffix("-completed")?;
        match rest.split_once("-substep-") {
            Some((step, substep)) => Some(CompletionKey::Substep {
                step: step.parse().ok()?,
                substep: substep.parse().ok()?,
            }),
            None => Some(CompletionKey::Step {
                step: rest.parse().ok()?,
            }),
        }
    }
}

impl std::fmt::Display for CompletionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompletionKey::Step { step } => write!(f, "step-{}-completed", step),
            CompletionKey::Substep { step, substep } => {
                write!(f, "step-{}-substep-{}-completed", step, substep)
            }
        }
    }
}
