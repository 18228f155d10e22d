//! Step controller: the state machine over steps and substeps
//!
//! The controller exclusively owns a session's [`ProgressState`]. Every
//! mutation goes through one of its transition functions, each of which
//! either succeeds or returns an error having changed nothing.
//!
//! Units are walked in definition order: a step without substeps is one
//! unit, a step with substeps contributes one unit per substep. Leaving
//! a unit forward requires its completion flag; moving backward is
//! always allowed. Completion flags only ever go from unset to set.

use crate::answer_matcher::AnswerMatcher;
use guided_types::*;
use std::sync::Arc;

/// Result of a single placement
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementOutcome {
    /// Unit the placement happened in
    pub position: Position,
    /// Equation index within the unit
    pub equation: usize,
    /// Slot filled, `None` when the placement was a no-op
    pub slot: Option<usize>,
    /// Token overwritten by the placement
    pub replaced: Option<Token>,
    /// Evaluation of the equation after the placement
    pub outcome: MatchOutcome,
    /// Completion flags flipped by this placement, innermost first
    pub newly_completed: Vec<CompletionKey>,
}

impl PlacementOutcome {
    pub fn is_noop(&self) -> bool {
        self.slot.is_none()
    }
}

/// Result of a pointer move
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: Position,
    pub to: Position,
    /// Flags set by back-filling on a jump
    pub newly_completed: Vec<CompletionKey>,
}

impl Transition {
    pub fn moved(&self) -> bool {
        self.from != self.to
    }
}

/// Guarded transitions over a definition's steps and substeps
#[derive(Clone, Debug)]
pub struct StepController {
    definition: Arc<ExerciseDefinition>,
    state: ProgressState,
    matcher: AnswerMatcher,
    /// Every unit in navigation order
    units: Vec<Position>,
}

impl StepController {
    /// Start a fresh session at `entry`
    pub fn new(definition: Arc<ExerciseDefinition>, entry: Position) -> GuidedResult<Self> {
        let unit = definition.unit(entry).ok_or(GuidedError::StepOutOfRange {
            step: entry.step,
            total: definition.total_steps(),
        })?;
        let mut state = ProgressState::new(entry);
        state.ensure_equations(entry, unit);
        let units = definition.positions();

        Ok(Self {
            definition,
            state,
            matcher: AnswerMatcher::new(),
            units,
        })
    }

    pub fn definition(&self) -> &ExerciseDefinition {
        &self.definition
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn position(&self) -> Position {
        self.state.position()
    }

    pub fn total_steps(&self) -> u32 {
        self.definition.total_steps()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Read from the step's flag, never recomputed once set
    pub fn is_step_complete(&self, step: u32) -> bool {
        self.state.is_completed(&CompletionKey::Step { step })
    }

    /// A substep also counts as complete once its whole step is
    pub fn is_unit_complete(&self, position: Position) -> bool {
        self.state.is_completed(&position.completion_key())
            || (position.substep.is_some() && self.is_step_complete(position.step))
    }

    pub fn is_current_complete(&self) -> bool {
        self.is_unit_complete(self.position())
    }

    pub fn can_go_next(&self) -> bool {
        self.unit_index()
            .is_some_and(|i| i + 1 < self.units.len())
            && self.is_current_complete()
    }

    pub fn can_go_previous(&self) -> bool {
        self.unit_index().is_some_and(|i| i > 0)
    }

    /// The current unit's definition
    pub fn current_unit(&self) -> Option<&UnitDefinition> {
        self.definition.unit(self.position())
    }

    /// The current unit's live equations
    pub fn current_equations(&self) -> &[SlotEquation] {
        self.state.equations(self.position()).unwrap_or(&[])
    }

    /// Evaluate every equation of a visited unit
    pub fn unit_outcomes(&self, position: Position) -> Vec<MatchOutcome> {
        let (Some(unit), Some(equations)) =
            (self.definition.unit(position), self.state.equations(position))
        else {
            return Vec::new();
        };
        unit.equations
            .iter()
            .zip(equations)
            .map(|(def, eq)| self.matcher.evaluate(&eq.editable_values(), &def.answer))
            .collect()
    }

    // ── Placement ────────────────────────────────────────────────────

    /// Place a token at an explicit slot of one of the current unit's
    /// equations, overwriting whatever was there
    pub fn place(
        &mut self,
        equation: usize,
        slot: usize,
        token: Token,
    ) -> GuidedResult<PlacementOutcome> {
        let position = self.position();
        let equations = self.current_equations_mut()?;
        let target = equations
            .get_mut(equation)
            .ok_or(GuidedError::EquationNotFound {
                position,
                index: equation,
            })?;
        let replaced = target.place(slot, token)?;

        tracing::debug!(%position, equation, slot, "Token placed");
        Ok(self.after_placement(position, equation, Some(slot), replaced))
    }

    /// Click/keyboard placement: the first empty editable slot of the
    /// first equation that has one. `None` when every slot is filled.
    pub fn place_next(&mut self, token: Token) -> GuidedResult<Option<PlacementOutcome>> {
        let position = self.position();
        let equations = self.current_equations_mut()?;
        let Some(equation) = equations
            .iter()
            .position(|eq| eq.first_empty_editable_slot().is_some())
        else {
            tracing::debug!(%position, "No empty slot, placement ignored");
            return Ok(None);
        };
        let slot = equations[equation].place_next(token);

        tracing::debug!(%position, equation, ?slot, "Token placed in next slot");
        Ok(Some(self.after_placement(position, equation, slot, None)))
    }

    /// Empty one slot of the current unit. Completion flags stay set.
    pub fn clear_slot(&mut self, equation: usize, slot: usize) -> GuidedResult<Option<Token>> {
        let position = self.position();
        let equations = self.current_equations_mut()?;
        equations
            .get_mut(equation)
            .ok_or(GuidedError::EquationNotFound {
                position,
                index: equation,
            })?
            .clear_slot(slot)
    }

    fn after_placement(
        &mut self,
        position: Position,
        equation: usize,
        slot: Option<usize>,
        replaced: Option<Token>,
    ) -> PlacementOutcome {
        let outcomes = self.unit_outcomes(position);
        let outcome = outcomes
            .get(equation)
            .copied()
            .unwrap_or(MatchOutcome::Incomplete);

        let mut newly_completed = Vec::new();
        if !outcomes.is_empty() && outcomes.iter().all(MatchOutcome::is_correct) {
            newly_completed = self.complete_unit(position);
        }

        PlacementOutcome {
            position,
            equation,
            slot,
            replaced,
            outcome,
            newly_completed,
        }
    }

    /// Flag a unit complete and roll substeps up into their step
    fn complete_unit(&mut self, position: Position) -> Vec<CompletionKey> {
        let mut flipped = Vec::new();
        let key = position.completion_key();
        if self.state.mark_completed(key) {
            flipped.push(key);
        }

        if position.substep.is_some() {
            let step = position.step;
            let count = self.definition.substep_count(step);
            let all_done = (1..=count).all(|s| {
                self.state
                    .is_completed(&CompletionKey::Substep { step, substep: s })
            });
            if all_done && self.state.mark_completed(CompletionKey::Step { step }) {
                flipped.push(CompletionKey::Step { step });
            }
        }

        for key in &flipped {
            tracing::info!(key = %key, "Completion flag set");
        }
        flipped
    }

    fn current_equations_mut(&mut self) -> GuidedResult<&mut Vec<SlotEquation>> {
        let position = self.position();
        let unit = self
            .definition
            .unit(position)
            .ok_or(GuidedError::EquationNotFound { position, index: 0 })?;
        Ok(self.state.ensure_equations(position, unit))
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Advance one unit; requires the current unit to be complete
    pub fn go_next(&mut self) -> GuidedResult<Transition> {
        let from = self.position();
        let index = self.unit_index().ok_or(GuidedError::NoNextStep)?;
        let to = *self.units.get(index + 1).ok_or(GuidedError::NoNextStep)?;
        if !self.is_current_complete() {
            return Err(GuidedError::StepIncomplete(from));
        }
        self.move_to(to);
        tracing::debug!(%from, %to, "Advanced");
        Ok(Transition {
            from,
            to,
            newly_completed: Vec::new(),
        })
    }

    /// Move back one unit; nothing is cleared
    pub fn go_previous(&mut self) -> GuidedResult<Transition> {
        let from = self.position();
        let index = self
            .unit_index()
            .filter(|i| *i > 0)
            .ok_or(GuidedError::NoPreviousStep)?;
        let to = self.units[index - 1];
        self.move_to(to);
        tracing::debug!(%from, %to, "Moved back");
        Ok(Transition {
            from,
            to,
            newly_completed: Vec::new(),
        })
    }

    /// Jump to a step (and substep). Every step before the target, and
    /// every substep before an explicit target substep, is marked
    /// complete. The target itself and everything after it are left
    /// untouched.
    pub fn jump_to(&mut self, step: u32, substep: Option<u32>) -> GuidedResult<Transition> {
        let from = self.position();
        let to = self.resolve_target(step, substep)?;

        let mut newly_completed = Vec::new();
        for earlier in 1..step {
            let key = CompletionKey::Step { step: earlier };
            if self.state.mark_completed(key) {
                newly_completed.push(key);
            }
        }
        if let (Some(target_substep), Some(_)) = (substep, to.substep) {
            for earlier in 1..target_substep {
                let key = CompletionKey::Substep {
                    step,
                    substep: earlier,
                };
                if self.state.mark_completed(key) {
                    newly_completed.push(key);
                }
            }
        }

        self.move_to(to);
        tracing::debug!(%from, %to, backfilled = newly_completed.len(), "Jumped");
        Ok(Transition {
            from,
            to,
            newly_completed,
        })
    }

    /// Check a jump target against the declared bounds
    pub fn resolve_target(&self, step: u32, substep: Option<u32>) -> GuidedResult<Position> {
        let total = self.total_steps();
        let Some(def) = self.definition.step(step) else {
            tracing::warn!(step, total, "Jump target out of range, dropped");
            return Err(GuidedError::StepOutOfRange { step, total });
        };

        if !def.has_substeps() {
            if let Some(substep) = substep {
                tracing::warn!(step, substep, "Step has no substeps, substep ignored");
            }
            return Ok(Position::step(step));
        }

        let count = def.substep_count();
        match substep {
            Some(s) if (1..=count).contains(&s) => Ok(Position::substep(step, s)),
            Some(s) => {
                tracing::warn!(step, substep = s, count, "Substep out of range, dropped");
                Err(GuidedError::SubstepOutOfRange {
                    step,
                    substep: s,
                    total: count,
                })
            }
            None => Ok(Position::substep(
                step,
                self.state.substep_cursor(step).unwrap_or(1),
            )),
        }
    }

    /// Empty every equation of a step; the pointer stays put
    pub fn reset_step(&mut self, step: u32) -> GuidedResult<()> {
        if self.definition.step(step).is_none() {
            return Err(GuidedError::StepOutOfRange {
                step,
                total: self.total_steps(),
            });
        }
        let visited: Vec<Position> = self
            .state
            .visited()
            .map(|(p, _)| *p)
            .filter(|p| p.step == step)
            .collect();
        for position in visited {
            if let Some(equations) = self.state.equations_mut(position) {
                equations.iter_mut().for_each(SlotEquation::reset);
            }
        }
        tracing::debug!(step, "Step reset");
        Ok(())
    }

    /// Empty every equation and return to the first unit
    pub fn restart(&mut self) -> GuidedResult<Transition> {
        let from = self.position();
        let to = *self.units.first().ok_or(GuidedError::NoPreviousStep)?;
        let visited: Vec<Position> = self.state.visited().map(|(p, _)| *p).collect();
        for position in visited {
            if let Some(equations) = self.state.equations_mut(position) {
                equations.iter_mut().for_each(SlotEquation::reset);
            }
        }
        self.move_to(to);
        tracing::debug!(%from, "Restarted");
        Ok(Transition {
            from,
            to,
            newly_completed: Vec::new(),
        })
    }

    // ── Persistence ──────────────────────────────────────────────────

    pub fn snapshot(&self, saved_at: chrono::DateTime<chrono::Utc>) -> ProgressSnapshot {
        self.state.snapshot(&self.definition.widget_id, saved_at)
    }

    /// Replace progress with a snapshot, re-validating the restored
    /// equations. On error the current progress is kept.
    ///
    /// Returns every flag set after the restore.
    pub fn restore(&mut self, snapshot: &ProgressSnapshot) -> GuidedResult<Vec<CompletionKey>> {
        let state = ProgressState::from_snapshot(snapshot, &self.definition)?;
        let previous = std::mem::replace(&mut self.state, state);

        let visited: Vec<Position> = self.state.visited().map(|(p, _)| *p).collect();
        for position in visited {
            let outcomes = self.unit_outcomes(position);
            if !outcomes.is_empty() && outcomes.iter().all(MatchOutcome::is_correct) {
                self.complete_unit(position);
            }
        }
        let position = self.position();
        if self.current_equations_mut().is_err() {
            self.state = previous;
            return Err(GuidedError::SnapshotMismatch(format!("no unit at {}", position)));
        }

        Ok(self.state.completed().copied().collect())
    }

    // ── Internal helpers ─────────────────────────────────────────────

    fn unit_index(&self) -> Option<usize> {
        let position = self.position();
        self.units.iter().position(|p| *p == position)
    }

    fn move_to(&mut self, to: Position) {
        self.state.set_position(to);
        if let Some(unit) = self.definition.unit(to) {
            self.state.ensure_equations(to, unit);
        }
    }
}
