//! Equalization exercise definitions
//!
//! One definition describes a two-equation system in which the same
//! variable is isolated on both sides, e.g.
//!
//! ```text
//! 1 barrel = 2 crates +  6 kg
//! 1 barrel = 1 crate  + 11 kg
//! ```
//!
//! The participant equalizes the two right-hand sides on a balance scale,
//! simplifies, and determines both weights.

use crate::error::{AlgespaceError, Result};
use crate::exercises::equations::{EquationSide, Variable, WeightStock};
use crate::types::ExerciseId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default number of items a single pan can hold
pub const DEFAULT_PAN_CAPACITY: u32 = 12;

fn default_pan_capacity() -> u32 {
    DEFAULT_PAN_CAPACITY
}

/// Immutable definition of one equalization exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqualizationExercise {
    pub id: ExerciseId,

    /// The variable isolated in both source equations
    pub isolated: Variable,

    /// The second variable appearing on the right-hand sides
    pub second: Variable,

    /// Right-hand side of the first source equation
    pub left: EquationSide,

    /// Right-hand side of the second source equation
    pub right: EquationSide,

    /// Weights shelf stock available for the scale phases
    pub weights: Vec<WeightStock>,

    /// Maximum items a pan accepts before drops are rejected
    #[serde(default = "default_pan_capacity")]
    pub pan_capacity: u32,

    /// Optional hint text keyed by phase wire name
    #[serde(default)]
    pub hints: BTreeMap<String, String>,
}

impl EqualizationExercise {
    /// Expected second-variable counts per pan after equalization
    ///
    /// The goal is symmetric under pan swap, so `(a, b)` and `(b, a)` are
    /// both accepted by verification.
    pub fn equalized_counts(&self) -> (u32, u32) {
        (self.left.second_count, self.right.second_count)
    }

    /// Expected second-variable counts per pan after removing the common
    /// items from both sides
    pub fn simplified_counts(&self) -> (u32, u32) {
        let common = self.left.second_count.min(self.right.second_count);
        (
            self.left.second_count - common,
            self.right.second_count - common,
        )
    }

    /// Hint text for a phase, if the author provided one
    pub fn hint(&self, phase_name: &str) -> Option<&str> {
        self.hints.get(phase_name).map(String::as_str)
    }

    /// Check the arithmetic consistency of the definition
    ///
    /// Both right-hand sides must weigh exactly the isolated variable, and
    /// the shelf stock must be plausible. Called on seed and on load.
    pub fn validate(&self) -> Result<()> {
        if self.isolated.weight <= 0 || self.second.weight <= 0 {
            return Err(AlgespaceError::Exercise(format!(
                "exercise {}: variable weights must be positive",
                self.id
            )));
        }
        let left_total = self.left.total_weight(self.second.weight);
        let right_total = self.right.total_weight(self.second.weight);
        if left_total != self.isolated.weight || right_total != self.isolated.weight {
            return Err(AlgespaceError::Exercise(format!(
                "exercise {}: sides weigh {} and {}, expected {} ({})",
                self.id, left_total, right_total, self.isolated.weight, self.isolated.name
            )));
        }
        if self.left == self.right {
            return Err(AlgespaceError::Exercise(format!(
                "exercise {}: the two equations are identical",
                self.id
            )));
        }
        if self.weights.is_empty() {
            return Err(AlgespaceError::Exercise(format!(
                "exercise {}: weights shelf is empty",
                self.id
            )));
        }
        if self
            .weights
            .iter()
            .any(|w| w.denomination <= 0 || w.amount == 0)
        {
            return Err(AlgespaceError::Exercise(format!(
                "exercise {}: weight stock entries must be positive",
                self.id
            )));
        }
        if self.pan_capacity == 0 {
            return Err(AlgespaceError::Exercise(format!(
                "exercise {}: pan capacity must be positive",
                self.id
            )));
        }
        Ok(())
    }
}

/// Barrel-and-crate fixture shared by game and session tests
#[cfg(test)]
pub(crate) fn barrel_exercise() -> EqualizationExercise {
    EqualizationExercise {
        id: ExerciseId(1),
        isolated: Variable::new("barrel", 16),
        second: Variable::new("crate", 5),
        left: EquationSide::new(2, 6),
        right: EquationSide::new(1, 11),
        weights: vec![
            WeightStock::new(1, 4),
            WeightStock::new(5, 3),
            WeightStock::new(10, 2),
        ],
        pan_capacity: DEFAULT_PAN_CAPACITY,
        hints: BTreeMap::new(),
    }
}
