//! Slot equations: ordered slots a learner fills one token at a time
//!
//! Structural symbols (`+`, `=`, a given total) are fixed slots and never
//! change. Editable slots start empty and are overwritten on every
//! placement (last write wins). A reset empties the editable slots and
//! leaves the structure alone.

use crate::{GuidedError, GuidedResult, Token};
use serde::{Deserialize, Serialize};

/// A single position in a slot equation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Pre-filled structural symbol, never editable
    Fixed(Token),
    /// Learner-filled position, `None` while empty
    Editable(Option<Token>),
}

impl Slot {
    pub fn is_editable(&self) -> bool {
        matches!(self, Slot::Editable(_))
    }

    pub fn is_empty_editable(&self) -> bool {
        matches!(self, Slot::Editable(None))
    }

    /// The token currently shown in this slot, fixed or placed
    pub fn value(&self) -> Option<&Token> {
        match self {
            Slot::Fixed(token) => Some(token),
            Slot::Editable(value) => value.as_ref(),
        }
    }
}

/// An ordered sequence of slots for one sub-problem
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotEquation {
    slots: Vec<Slot>,
}

impl SlotEquation {
    /// Build an equation from a structure where `None` marks an editable
    /// slot and `Some(token)` a fixed one. Editable slots start empty.
    pub fn from_structure(structure: &[Option<Token>]) -> Self {
        let slots = structure
            .iter()
            .map(|entry| match entry {
                Some(token) => Slot::Fixed(token.clone()),
                None => Slot::Editable(None),
            })
            .collect();
        Self { slots }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Place a token at an explicit position, overwriting any previous
    /// token there. Returns the token that was replaced.
    pub fn place(&mut self, position: usize, token: Token) -> GuidedResult<Option<Token>> {
        let len = self.slots.len();
        match self.slots.get_mut(position) {
            None => Err(GuidedError::SlotOutOfRange { position, len }),
            Some(Slot::Fixed(_)) => Err(GuidedError::SlotNotEditable(position)),
            Some(Slot::Editable(value)) => Ok(value.replace(token)),
        }
    }

    /// Place a token into the first empty editable slot, left to right.
    ///
    /// Returns the position filled, or `None` when every editable slot is
    /// already occupied (the placement is then a no-op).
    pub fn place_next(&mut self, token: Token) -> Option<usize> {
        let position = self.first_empty_editable_slot()?;
        self.slots[position] = Slot::Editable(Some(token));
        Some(position)
    }

    /// Empty a single editable slot. Returns the token that was removed.
    pub fn clear_slot(&mut self, position: usize) -> GuidedResult<Option<Token>> {
        let len = self.slots.len();
        match self.slots.get_mut(position) {
            None => Err(GuidedError::SlotOutOfRange { position, len }),
            Some(Slot::Fixed(_)) => Err(GuidedError::SlotNotEditable(position)),
            Some(Slot::Editable(value)) => Ok(value.take()),
        }
    }

    pub fn first_empty_editable_slot(&self) -> Option<usize> {
        self.slots.iter().position(Slot::is_empty_editable)
    }

    /// Return every editable slot to empty; fixed slots are untouched
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            if let Slot::Editable(value) = slot {
                *value = None;
            }
        }
    }

    /// Positions of the editable slots, left to right
    pub fn editable_positions(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_editable())
            .map(|(i, _)| i)
            .collect()
    }

    /// The tuple of editable-slot values, left to right
    pub fn editable_values(&self) -> Vec<Option<Token>> {
        self.slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Editable(value) => Some(value.clone()),
                Slot::Fixed(_) => None,
            })
            .collect()
    }

    /// Whether every editable slot holds a token
    pub fn is_filled(&self) -> bool {
        !self.slots.iter().any(Slot::is_empty_editable)
    }

    /// Overwrite the editable slots with previously captured values.
    ///
    /// The number of values must match the number of editable slots.
    pub fn restore_values(&mut self, values: &[Option<Token>]) -> GuidedResult<()> {
        let editable = self.slots.iter().filter(|s| s.is_editable()).count();
        if editable != values.len() {
            return Err(GuidedError::SnapshotMismatch(format!(
                "expected {} editable values, got {}",
                editable,
                values.len()
            )));
        }
        let mut incoming = values.iter();
        for slot in &mut self.slots {
            if let Slot::Editable(value) = slot {
                *value = incoming.next().cloned().flatten();
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for SlotEquation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<&str> = self
            .slots
            .iter()
            .map(|slot| slot.value().map(Token::as_str).unwrap_or("_"))
            .collect();
        write!(f, "{}", rendered.join(" "))
    }
}
