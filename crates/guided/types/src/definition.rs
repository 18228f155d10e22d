//! Exercise definitions: the per-widget topology and answer sheet
//!
//! A widget supplies only data: its ordered steps, optional substeps
//! within a step, the slot equations each unit carries, and the
//! canonical answers they are checked against. All control flow lives
//! in the engine.
//!
//! Definitions are immutable once validated.

use crate::{CanonicalAnswer, GuidedError, GuidedResult, Position, SlotEquation, Token, TokenOption};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Identifiers ──────────────────────────────────────────────────────

/// Identifies a widget; navigation commands and snapshots are keyed by it
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WidgetId(pub String);

impl WidgetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Equations ────────────────────────────────────────────────────────

/// One slot equation and the answer it must match
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquationDefinition {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    /// Slot layout: `null` marks an editable slot, a string a fixed one
    pub structure: Vec<Option<Token>>,
    pub answer: CanonicalAnswer,
    /// Message key shown when this equation becomes correct
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_message: Option<String>,
    /// Message key shown when this equation is filled but wrong
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl EquationDefinition {
    pub fn new(structure: Vec<Option<Token>>, answer: CanonicalAnswer) -> Self {
        Self {
            label: String::new(),
            structure,
            answer,
            success_message: None,
            error_message: None,
        }
    }

    /// Parse a compact layout where `_` marks an editable slot, e.g.
    /// `"_ + _ + _ = _"`
    pub fn from_layout(layout: &str, answer: CanonicalAnswer) -> Self {
        let structure = layout
            .split_whitespace()
            .map(|part| match part {
                "_" => None,
                other => Some(Token::new(other)),
            })
            .collect();
        Self::new(structure, answer)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_success_message(mut self, key: impl Into<String>) -> Self {
        self.success_message = Some(key.into());
        self
    }

    pub fn with_error_message(mut self, key: impl Into<String>) -> Self {
        self.error_message = Some(key.into());
        self
    }

    /// Number of editable slots
    pub fn arity(&self) -> usize {
        self.structure.iter().filter(|s| s.is_none()).count()
    }

    /// A fresh equation with every editable slot empty
    pub fn instantiate(&self) -> SlotEquation {
        SlotEquation::from_structure(&self.structure)
    }

    fn validate(&self, at: &str) -> GuidedResult<()> {
        let arity = self.arity();
        if arity == 0 {
            return Err(GuidedError::InvalidDefinition(format!(
                "{}: equation has no editable slots",
                at
            )));
        }
        self.answer
            .check_arity(arity)
            .map_err(|reason| GuidedError::InvalidDefinition(format!("{}: {}", at, reason)))
    }
}

// ── Units and steps ──────────────────────────────────────────────────

/// The content of one navigable unit: a step without substeps, or a substep
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDefinition {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub equations: Vec<EquationDefinition>,
    /// Palette offered to the learner while this unit is current
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tokens: Vec<TokenOption>,
}

impl UnitDefinition {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_equation(mut self, equation: EquationDefinition) -> Self {
        self.equations.push(equation);
        self
    }

    pub fn with_tokens<I, T>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        self.tokens
            .extend(values.into_iter().map(|v| TokenOption::new(v)));
        self
    }

    pub fn with_token_option(mut self, option: TokenOption) -> Self {
        self.tokens.push(option);
        self
    }

    fn validate(&self, at: &str) -> GuidedResult<()> {
        if self.equations.is_empty() {
            return Err(GuidedError::InvalidDefinition(format!(
                "{}: no equations",
                at
            )));
        }
        for (i, equation) in self.equations.iter().enumerate() {
            equation.validate(&format!("{} equation {}", at, i))?;
        }
        Ok(())
    }
}

/// One step; either carries equations directly or is split into substeps
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    #[serde(flatten)]
    pub content: UnitDefinition,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub substeps: Vec<UnitDefinition>,
}

impl StepDefinition {
    /// A step whose equations are solved directly
    pub fn single(content: UnitDefinition) -> Self {
        Self {
            content,
            substeps: Vec::new(),
        }
    }

    /// A step split into ordered substeps
    pub fn with_substeps(title: impl Into<String>, substeps: Vec<UnitDefinition>) -> Self {
        Self {
            content: UnitDefinition::new(title),
            substeps,
        }
    }

    pub fn has_substeps(&self) -> bool {
        !self.substeps.is_empty()
    }

    pub fn substep_count(&self) -> u32 {
        self.substeps.len() as u32
    }
}

// ── Exercise ─────────────────────────────────────────────────────────

/// The full definition of one guided exercise widget
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub widget_id: WidgetId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub steps: Vec<StepDefinition>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl ExerciseDefinition {
    pub fn new(widget_id: WidgetId) -> Self {
        Self {
            widget_id,
            title: String::new(),
            steps: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_step(mut self, step: StepDefinition) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn from_json(json: &str) -> GuidedResult<Self> {
        let definition: Self = serde_json::from_str(json)?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn total_steps(&self) -> u32 {
        self.steps.len() as u32
    }

    /// 1-based step lookup
    pub fn step(&self, step: u32) -> Option<&StepDefinition> {
        if step == 0 {
            return None;
        }
        self.steps.get(step as usize - 1)
    }

    /// Number of substeps of a step, 0 when it has none or does not exist
    pub fn substep_count(&self, step: u32) -> u32 {
        self.step(step).map(StepDefinition::substep_count).unwrap_or(0)
    }

    /// The unit addressed by a position, if the position is well-formed
    pub fn unit(&self, position: Position) -> Option<&UnitDefinition> {
        let step = self.step(position.step)?;
        match (step.has_substeps(), position.substep) {
            (false, None) => Some(&step.content),
            (true, Some(substep)) if substep >= 1 => step.substeps.get(substep as usize - 1),
            _ => None,
        }
    }

    /// Every navigable position in order
    pub fn positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        for (i, step) in self.steps.iter().enumerate() {
            let number = i as u32 + 1;
            if step.has_substeps() {
                positions.extend((1..=step.substep_count()).map(|s| Position::substep(number, s)));
            } else {
                positions.push(Position::step(number));
            }
        }
        positions
    }

    /// The first position of a step (substep 1 when it has substeps)
    pub fn first_position_of(&self, step: u32) -> Option<Position> {
        let def = self.step(step)?;
        Some(if def.has_substeps() {
            Position::substep(step, 1)
        } else {
            Position::step(step)
        })
    }

    /// The last position of a step (its final substep when it has substeps)
    pub fn last_position_of(&self, step: u32) -> Option<Position> {
        let def = self.step(step)?;
        Some(if def.has_substeps() {
            Position::substep(step, def.substep_count())
        } else {
            Position::step(step)
        })
    }

    /// Validate the definition for structural correctness
    pub fn validate(&self) -> GuidedResult<()> {
        if self.widget_id.0.trim().is_empty() {
            return Err(GuidedError::InvalidDefinition("empty widget id".into()));
        }
        if self.steps.is_empty() {
            return Err(GuidedError::InvalidDefinition(format!(
                "{}: no steps",
                self.widget_id
            )));
        }
        for (i, step) in self.steps.iter().enumerate() {
            let at = format!("{} step {}", self.widget_id, i + 1);
            if step.has_substeps() {
                if !step.content.equations.is_empty() {
                    return Err(GuidedError::InvalidDefinition(format!(
                        "{}: equations on a step that has substeps",
                        at
                    )));
                }
                for (j, substep) in step.substeps.iter().enumerate() {
                    substep.validate(&format!("{} substep {}", at, j + 1))?;
                }
            } else {
                step.content.validate(&at)?;
            }
        }
        Ok(())
    }
}
