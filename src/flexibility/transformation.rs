//! The payload produced by the method-application phases
//!
//! Whichever method branch the participant works through, its output has
//! the same shape: one transformed single-variable equation and a note of
//! which variable was isolated first. That pair is threaded through every
//! later phase of the sequence.

use crate::exercises::{FlexibilityExercise, LinearEquation, VarSymbol};
use serde::{Deserialize, Serialize};

/// Result of applying a solving method to the system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationOutcome {
    /// The equation the method produced (e.g. `2x + 1 = 4x - 3` after
    /// equalization)
    pub transformed: LinearEquation,

    /// The variable that was isolated first while applying the method
    pub isolated_first: VarSymbol,
}

impl TransformationOutcome {
    pub fn new(transformed: LinearEquation, isolated_first: VarSymbol) -> Self {
        Self {
            transformed,
            isolated_first,
        }
    }

    /// The variable the transformed equation is solved for
    ///
    /// Isolating one variable leaves an equation in the other one, so the
    /// first numeric solution belongs to the counterpart.
    pub fn solved_variable(&self) -> VarSymbol {
        self.isolated_first.other()
    }

    /// Whether this outcome is a valid transformation of the exercise's
    /// system
    ///
    /// The transformed equation must still hold at the system's solution
    /// and must only mention the variable being solved for. Submissions
    /// failing this are recoverable mistakes, not logic errors.
    pub fn is_valid_for(&self, exercise: &FlexibilityExercise) -> bool {
        let solution = exercise.solution;
        if !self
            .transformed
            .is_satisfied_by(solution.x, solution.y)
        {
            return false;
        }
        let gone = self.isolated_first;
        let mentions_gone = self
            .transformed
            .lhs
            .iter()
            .chain(self.transformed.rhs.iter())
            .any(|term| term.variable == Some(gone));
        !mentions_gone
    }
}
