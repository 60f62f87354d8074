//! Session driver for the equalization exercise
//!
//! Drives one attempt through the fixed phase sequence, owning the game
//! history, the post-success overlay flag, and the hint visibility, and
//! feeding the recorder. All verification failures are recoverable: the
//! phase stays put and only the error counters grow. Phase transitions are
//! forward-only; undo/redo operate on the game history inside a phase and
//! never cross a phase boundary.

use super::actions::{resolve_drag, DragMove, DragOutcome};
use super::game::{GameHistory, GameState};
use super::verify::{
    verify_equalization, verify_simplification, verify_weight, VerificationOutcome,
};
use crate::error::{AlgespaceError, Result};
use crate::exercises::{check_against, EqualizationExercise, InputCheck};
use crate::tracking::SessionRecorder;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Fixed phase sequence of the equalization exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EqualizationPhase {
    FirstInstruction,
    ScaleAndSystemRelation,
    RelationReason,
    Simplification,
    DeterminingSecondVariable,
    DeterminingIsolatedVariable,
    Solution,
}

impl EqualizationPhase {
    /// The phase that follows this one, or `None` at the end
    pub fn next(&self) -> Option<Self> {
        match self {
            EqualizationPhase::FirstInstruction => Some(EqualizationPhase::ScaleAndSystemRelation),
            EqualizationPhase::ScaleAndSystemRelation => Some(EqualizationPhase::RelationReason),
            EqualizationPhase::RelationReason => Some(EqualizationPhase::Simplification),
            EqualizationPhase::Simplification => {
                Some(EqualizationPhase::DeterminingSecondVariable)
            }
            EqualizationPhase::DeterminingSecondVariable => {
                Some(EqualizationPhase::DeterminingIsolatedVariable)
            }
            EqualizationPhase::DeterminingIsolatedVariable => Some(EqualizationPhase::Solution),
            EqualizationPhase::Solution => None,
        }
    }

    /// Wire name used in tracking payloads and hint keys
    pub fn as_str(&self) -> &'static str {
        match self {
            EqualizationPhase::FirstInstruction => "first_instruction",
            EqualizationPhase::ScaleAndSystemRelation => "scale_and_system_relation",
            EqualizationPhase::RelationReason => "relation_reason",
            EqualizationPhase::Simplification => "simplification",
            EqualizationPhase::DeterminingSecondVariable => "determining_second_variable",
            EqualizationPhase::DeterminingIsolatedVariable => "determining_isolated_variable",
            EqualizationPhase::Solution => "solution",
        }
    }

    /// Phases in which items may be dragged
    pub fn allows_dragging(&self) -> bool {
        matches!(
            self,
            EqualizationPhase::ScaleAndSystemRelation
                | EqualizationPhase::Simplification
                | EqualizationPhase::DeterminingIsolatedVariable
        )
    }
}

impl fmt::Display for EqualizationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Offered answers for the relation-reason question
///
/// Only one is right: the sides can be set equal because both equal the
/// isolated variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationAnswer {
    /// Both right-hand sides weigh exactly one isolated variable
    BothSidesEqualIsolated,
    /// Distractor: the heavier side determines the value
    HeavierSideWins,
    /// Distractor: the scale happens to balance by chance
    CoincidentalBalance,
}

impl RelationAnswer {
    pub fn is_correct(&self) -> bool {
        matches!(self, RelationAnswer::BothSidesEqualIsolated)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationAnswer::BothSidesEqualIsolated => "both_sides_equal_isolated",
            RelationAnswer::HeavierSideWins => "heavier_side_wins",
            RelationAnswer::CoincidentalBalance => "coincidental_balance",
        }
    }
}

/// One running equalization attempt
pub struct EqualizationSession {
    exercise: EqualizationExercise,
    recorder: SessionRecorder,
    phase: EqualizationPhase,
    history: GameHistory,
    /// Set after a successful scale check; freezes dragging until the
    /// participant continues
    overlay: bool,
    hints_visible: bool,
}

impl EqualizationSession {
    pub fn new(exercise: EqualizationExercise, mut recorder: SessionRecorder) -> Self {
        let history = GameHistory::new(GameState::initial(&exercise));
        recorder.begin_phase();
        Self {
            exercise,
            recorder,
            phase: EqualizationPhase::FirstInstruction,
            history,
            overlay: false,
            hints_visible: true,
        }
    }

    pub fn phase(&self) -> EqualizationPhase {
        self.phase
    }

    pub fn state(&self) -> &GameState {
        self.history.current()
    }

    pub fn history(&self) -> &GameHistory {
        &self.history
    }

    pub fn exercise(&self) -> &EqualizationExercise {
        &self.exercise
    }

    pub fn overlay_shown(&self) -> bool {
        self.overlay
    }

    pub fn hints_visible(&self) -> bool {
        self.hints_visible
    }

    /// Hint for the current phase, if the author wrote one and hints are
    /// not hidden
    pub fn hint(&self) -> Option<&str> {
        if !self.hints_visible {
            return None;
        }
        self.exercise.hint(self.phase.as_str())
    }

    pub fn recorder_mut(&mut self) -> &mut SessionRecorder {
        &mut self.recorder
    }

    /// Await outstanding tracking calls (exercise end, tests)
    pub async fn flush_tracking(&mut self) {
        self.recorder.flush().await;
    }

    /// Advance past the instruction screen or past a successful scale
    /// check's overlay
    pub fn proceed(&mut self) -> Result<()> {
        let allowed = self.phase == EqualizationPhase::FirstInstruction
            || (self.overlay && self.phase.allows_dragging());
        if !allowed {
            return Err(AlgespaceError::GameLogic(format!(
                "continue is not available in phase {}",
                self.phase
            )));
        }
        self.recorder.log_action(self.phase.as_str(), "continue");
        self.advance(None)
    }

    /// Resolve one drag-release event
    ///
    /// Rejected drops are ordinary outcomes and are still logged; dragging
    /// outside a drag phase (or under the overlay) is a logic violation.
    pub fn drag(&mut self, mv: DragMove) -> Result<DragOutcome> {
        self.ensure_dragging_allowed()?;
        let outcome = resolve_drag(&mut self.history, &self.exercise, &mv);
        self.recorder
            .log_action(self.phase.as_str(), &format!("{} ({})", mv, outcome));
        Ok(outcome)
    }

    /// Step the game history back one state
    pub fn undo(&mut self) -> Result<bool> {
        self.ensure_dragging_allowed()?;
        let moved = self.history.undo();
        if moved {
            self.recorder.log_action(self.phase.as_str(), "undo");
        }
        Ok(moved)
    }

    /// Step the game history forward one state
    pub fn redo(&mut self) -> Result<bool> {
        self.ensure_dragging_allowed()?;
        let moved = self.history.redo();
        if moved {
            self.recorder.log_action(self.phase.as_str(), "redo");
        }
        Ok(moved)
    }

    /// Check the balance scale against the current phase's goal
    ///
    /// On success the overlay freezes further dragging and hints are
    /// hidden; `proceed` then advances the phase.
    pub fn check_scale(&mut self) -> Result<VerificationOutcome> {
        let outcome = match self.phase {
            EqualizationPhase::ScaleAndSystemRelation => {
                verify_equalization(self.state(), &self.exercise)
            }
            EqualizationPhase::Simplification => {
                verify_simplification(self.state(), &self.exercise)
            }
            _ => {
                return Err(AlgespaceError::GameLogic(format!(
                    "scale check is not available in phase {}",
                    self.phase
                )))
            }
        };

        match outcome {
            VerificationOutcome::Success => {
                self.overlay = true;
                self.hints_visible = false;
                self.recorder
                    .log_action(self.phase.as_str(), "scale check passed");
                info!("scale check passed in phase {}", self.phase);
            }
            VerificationOutcome::Mistake(mistake) => {
                self.recorder.log_error();
                self.recorder.log_action(
                    self.phase.as_str(),
                    &format!("scale check failed: {}", mistake),
                );
            }
        }
        Ok(outcome)
    }

    /// Answer the relation-reason question
    ///
    /// A wrong answer counts as an error and the question stays open; the
    /// right answer is recorded as the phase choice and advances.
    pub fn answer_relation(&mut self, answer: RelationAnswer) -> Result<bool> {
        if self.phase != EqualizationPhase::RelationReason {
            return Err(AlgespaceError::GameLogic(format!(
                "relation answer is not available in phase {}",
                self.phase
            )));
        }
        self.recorder.log_action(
            self.phase.as_str(),
            &format!("relation answer {}", answer.as_str()),
        );
        if !answer.is_correct() {
            self.recorder.log_error();
            return Ok(false);
        }
        self.recorder
            .record_choice(self.phase.as_str(), answer.as_str());
        self.advance(Some(answer.as_str().to_string()))?;
        Ok(true)
    }

    /// Submit the free-text expression for the second variable's weight
    ///
    /// `Invalid` is validation feedback (no error counted); `Incorrect`
    /// counts an error; `Correct` advances.
    pub fn submit_second_weight(&mut self, input: &str) -> Result<InputCheck> {
        if self.phase != EqualizationPhase::DeterminingSecondVariable {
            return Err(AlgespaceError::GameLogic(format!(
                "weight input is not available in phase {}",
                self.phase
            )));
        }
        let check = check_against(input, self.exercise.second.weight);
        match &check {
            InputCheck::Correct => {
                self.recorder
                    .log_action(self.phase.as_str(), &format!("input '{}' correct", input));
                self.advance(None)?;
            }
            InputCheck::Incorrect { value } => {
                self.recorder.log_error();
                self.recorder.log_action(
                    self.phase.as_str(),
                    &format!("input '{}' evaluates to {}", input, value),
                );
            }
            InputCheck::Invalid { message } => {
                self.recorder.log_action(
                    self.phase.as_str(),
                    &format!("input '{}' invalid: {}", input, message),
                );
            }
        }
        Ok(check)
    }

    /// Check the digital scale against the isolated variable's weight
    pub fn check_weight(&mut self) -> Result<bool> {
        if self.phase != EqualizationPhase::DeterminingIsolatedVariable {
            return Err(AlgespaceError::GameLogic(format!(
                "weight check is not available in phase {}",
                self.phase
            )));
        }
        if !verify_weight(self.state(), &self.exercise) {
            self.recorder.log_error();
            self.recorder
                .log_action(self.phase.as_str(), "digital scale check failed");
            return Ok(false);
        }
        self.recorder
            .log_action(self.phase.as_str(), "digital scale check passed");
        self.advance(None)?;
        Ok(true)
    }

    /// Close the attempt on the solution screen
    pub fn finish(&mut self) -> Result<()> {
        if self.phase != EqualizationPhase::Solution {
            return Err(AlgespaceError::GameLogic(format!(
                "cannot finish in phase {}",
                self.phase
            )));
        }
        self.recorder.finish_phase(self.phase.as_str(), None);
        self.recorder.finish();
        info!("equalization exercise {} completed", self.exercise.id);
        Ok(())
    }

    fn ensure_dragging_allowed(&self) -> Result<()> {
        if !self.phase.allows_dragging() {
            return Err(AlgespaceError::GameLogic(format!(
                "dragging is not available in phase {}",
                self.phase
            )));
        }
        if self.overlay {
            return Err(AlgespaceError::GameLogic(
                "dragging is frozen after a passed check".into(),
            ));
        }
        Ok(())
    }

    /// Forward-only phase transition
    ///
    /// The game history restarts at the phase boundary so undo cannot
    /// reach back into a completed phase. The digital-scale phase starts
    /// from a reset board with the isolated variable out of play.
    fn advance(&mut self, choice: Option<String>) -> Result<()> {
        let next = self.phase.next().ok_or_else(|| {
            AlgespaceError::GameLogic("the exercise is already complete".into())
        })?;
        self.recorder.finish_phase(self.phase.as_str(), choice);

        debug!("phase {} -> {}", self.phase, next);
        self.phase = next;
        self.overlay = false;
        self.hints_visible = true;
        self.history = match next {
            EqualizationPhase::DeterminingIsolatedVariable => {
                GameHistory::new(GameState::digital_scale(&self.exercise))
            }
            _ => GameHistory::new(self.history.current().clone()),
        };
        self.recorder.begin_phase();
        Ok(())
    }
}
