//! Verification of scale states against the phase goals
//!
//! Success on the balance scale requires both weight equality and the
//! expected second-variable counts per pan (in either orientation).
//! Failures are classified into exactly one mistake, checked in a fixed
//! order so the participant always gets the most specific feedback.

use super::game::{GameState, Zone};
use crate::exercises::EqualizationExercise;
use serde::Serialize;
use std::fmt;

/// Classified reason a scale check failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EqualizationMistake {
    /// One pan (or both) holds nothing
    EmptyScale,
    /// The variable being solved for was placed on the scale
    IsolatedOnScale,
    /// Second-variable counts do not match the goal in either orientation
    CountMismatch,
    /// Counts are right but the pans do not weigh the same
    Imbalance,
}

impl EqualizationMistake {
    /// Feedback message shown for this mistake
    pub fn feedback(&self) -> &'static str {
        match self {
            EqualizationMistake::EmptyScale => {
                "Both pans need items before the scale can tell you anything."
            }
            EqualizationMistake::IsolatedOnScale => {
                "The variable you are solving for stays off the scale. \
                 Build both sides from the other items."
            }
            EqualizationMistake::CountMismatch => {
                "The number of variable items on the pans does not match the system of equations."
            }
            EqualizationMistake::Imbalance => {
                "The scale is tilted. Compare the total weight on each side."
            }
        }
    }
}

impl fmt::Display for EqualizationMistake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            EqualizationMistake::EmptyScale => "empty_scale",
            EqualizationMistake::IsolatedOnScale => "isolated_on_scale",
            EqualizationMistake::CountMismatch => "count_mismatch",
            EqualizationMistake::Imbalance => "imbalance",
        };
        write!(f, "{}", tag)
    }
}

/// Outcome of a balance-scale check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationOutcome {
    Success,
    Mistake(EqualizationMistake),
}

impl VerificationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, VerificationOutcome::Success)
    }
}

/// Check the scale against the equalization goal
pub fn verify_equalization(
    state: &GameState,
    exercise: &EqualizationExercise,
) -> VerificationOutcome {
    verify_balance(state, exercise, exercise.equalized_counts())
}

/// Check the scale against the simplified goal
pub fn verify_simplification(
    state: &GameState,
    exercise: &EqualizationExercise,
) -> VerificationOutcome {
    verify_balance(state, exercise, exercise.simplified_counts())
}

fn verify_balance(
    state: &GameState,
    exercise: &EqualizationExercise,
    goal: (u32, u32),
) -> VerificationOutcome {
    if state.pan_len(Zone::LeftPan) == 0 || state.pan_len(Zone::RightPan) == 0 {
        return VerificationOutcome::Mistake(EqualizationMistake::EmptyScale);
    }
    if state.contains_isolated(Zone::LeftPan) || state.contains_isolated(Zone::RightPan) {
        return VerificationOutcome::Mistake(EqualizationMistake::IsolatedOnScale);
    }
    let counts = (
        state.second_count(Zone::LeftPan),
        state.second_count(Zone::RightPan),
    );
    if counts != goal && counts != (goal.1, goal.0) {
        return VerificationOutcome::Mistake(EqualizationMistake::CountMismatch);
    }
    if state.pan_weight(Zone::LeftPan, exercise) != state.pan_weight(Zone::RightPan, exercise) {
        return VerificationOutcome::Mistake(EqualizationMistake::Imbalance);
    }
    VerificationOutcome::Success
}

/// Check the digital scale against the isolated variable's true weight
///
/// Exact equality, no tolerance.
pub fn verify_weight(state: &GameState, exercise: &EqualizationExercise) -> bool {
    state.pan_weight(Zone::LeftPan, exercise) == exercise.isolated.weight
}
