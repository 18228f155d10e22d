//! Progress state: the pointer, completion flags, and live equations
//!
//! Navigating never clears equations or completion flags anywhere; only
//! the pointer moves. Equations are created lazily the first time a
//! unit is entered and are kept for the rest of the session.

use crate::{
    CompletionKey, EquationSnapshot, ExerciseDefinition, GuidedError, GuidedResult, Position,
    ProgressSnapshot, SlotEquation, UnitDefinition, WidgetId, SNAPSHOT_VERSION,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Everything a session knows about the learner's progress
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressState {
    position: Position,
    completed: BTreeSet<CompletionKey>,
    /// Last visited substep per substep-bearing step
    substep_cursors: BTreeMap<u32, u32>,
    equations: BTreeMap<Position, Vec<SlotEquation>>,
}

impl ProgressState {
    pub fn new(position: Position) -> Self {
        let mut state = Self {
            position,
            completed: BTreeSet::new(),
            substep_cursors: BTreeMap::new(),
            equations: BTreeMap::new(),
        };
        state.set_position(position);
        state
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Move the pointer, remembering the substep for later re-entry
    pub fn set_position(&mut self, position: Position) {
        self.position = position;
        if let Some(substep) = position.substep {
            self.substep_cursors.insert(position.step, substep);
        }
    }

    pub fn substep_cursor(&self, step: u32) -> Option<u32> {
        self.substep_cursors.get(&step).copied()
    }

    // ── Completion flags ─────────────────────────────────────────────

    pub fn is_completed(&self, key: &CompletionKey) -> bool {
        self.completed.contains(key)
    }

    /// Set a flag; returns `true` only when it was previously unset
    pub fn mark_completed(&mut self, key: CompletionKey) -> bool {
        self.completed.insert(key)
    }

    pub fn completed(&self) -> impl Iterator<Item = &CompletionKey> {
        self.completed.iter()
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    // ── Equations ────────────────────────────────────────────────────

    pub fn equations(&self, position: Position) -> Option<&[SlotEquation]> {
        self.equations.get(&position).map(Vec::as_slice)
    }

    pub fn equations_mut(&mut self, position: Position) -> Option<&mut Vec<SlotEquation>> {
        self.equations.get_mut(&position)
    }

    /// The unit's equations, instantiating them empty on first entry
    pub fn ensure_equations(
        &mut self,
        position: Position,
        unit: &UnitDefinition,
    ) -> &mut Vec<SlotEquation> {
        self.equations
            .entry(position)
            .or_insert_with(|| unit.equations.iter().map(|e| e.instantiate()).collect())
    }

    /// Every unit entered so far, in position order
    pub fn visited(&self) -> impl Iterator<Item = (&Position, &Vec<SlotEquation>)> {
        self.equations.iter()
    }

    // ── Persistence ──────────────────────────────────────────────────

    pub fn snapshot(&self, widget_id: &WidgetId, saved_at: DateTime<Utc>) -> ProgressSnapshot {
        let equations = self
            .equations
            .iter()
            .flat_map(|(position, eqs)| {
                eqs.iter().enumerate().map(|(index, eq)| EquationSnapshot {
                    position: *position,
                    index,
                    values: eq.editable_values(),
                })
            })
            .collect();

        ProgressSnapshot {
            version: SNAPSHOT_VERSION,
            widget_id: widget_id.clone(),
            position: self.position,
            completed: self.completed.iter().copied().collect(),
            substep_cursors: self.substep_cursors.clone(),
            equations,
            saved_at,
        }
    }

    /// Rebuild progress from a snapshot, checking it against the definition
    pub fn from_snapshot(
        snapshot: &ProgressSnapshot,
        definition: &ExerciseDefinition,
    ) -> GuidedResult<Self> {
        let mismatch = |reason: String| GuidedError::SnapshotMismatch(reason);

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(mismatch(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        if snapshot.widget_id != definition.widget_id {
            return Err(mismatch(format!(
                "snapshot for {} applied to {}",
                snapshot.widget_id, definition.widget_id
            )));
        }
        if definition.unit(snapshot.position).is_none() {
            return Err(mismatch(format!("no unit at {}", snapshot.position)));
        }

        let mut state = Self::new(snapshot.position);

        for key in &snapshot.completed {
            let known = match *key {
                CompletionKey::Step { step } => definition.step(step).is_some(),
                CompletionKey::Substep { step, substep } => definition
                    .unit(Position::substep(step, substep))
                    .is_some(),
            };
            if !known {
                return Err(mismatch(format!("unknown completion key {}", key)));
            }
            state.completed.insert(*key);
        }

        for (step, substep) in &snapshot.substep_cursors {
            if definition.unit(Position::substep(*step, *substep)).is_none() {
                return Err(mismatch(format!(
                    "substep cursor {} for step {}",
                    substep, step
                )));
            }
            state.substep_cursors.insert(*step, *substep);
        }
        if let Some(substep) = snapshot.position.substep {
            state.substep_cursors.insert(snapshot.position.step, substep);
        }

        for saved in &snapshot.equations {
            let unit = definition
                .unit(saved.position)
                .ok_or_else(|| mismatch(format!("no unit at {}", saved.position)))?;
            if saved.index >= unit.equations.len() {
                return Err(mismatch(format!(
                    "equation {} at {} (unit has {})",
                    saved.index,
                    saved.position,
                    unit.equations.len()
                )));
            }
            let equations = state.ensure_equations(saved.position, unit);
            equations[saved.index].restore_values(&saved.values)?;
        }

        Ok(state)
    }
}
