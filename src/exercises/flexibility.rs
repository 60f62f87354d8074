//! Flexibility-training exercise definitions
//!
//! Suitability, efficiency, and matching exercises share one definition
//! shape: a system of two linear equations, the author-declared method
//! sets, and the exact solution. Matching exercises additionally carry the
//! candidate systems the participant chooses between.

use crate::error::{AlgespaceError, Result};
use crate::exercises::equations::{LinearEquation, SystemSolution};
use crate::types::{ExerciseId, ExerciseKind, Method};
use serde::{Deserialize, Serialize};

/// One candidate system offered in a matching exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSystem {
    pub first: LinearEquation,
    pub second: LinearEquation,
}

/// Immutable definition of one flexibility exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexibilityExercise {
    pub id: ExerciseId,

    /// Suitability, Efficiency, or Matching
    pub kind: ExerciseKind,

    /// The system the participant solves
    pub first_equation: LinearEquation,
    pub second_equation: LinearEquation,

    /// Methods the author considers pedagogically suitable for this system
    #[serde(default)]
    pub suitable_methods: Vec<Method>,

    /// Methods the author considers most efficient for this system
    #[serde(default)]
    pub efficient_methods: Vec<Method>,

    /// Exact solution of the system
    pub solution: SystemSolution,

    /// Whether the optional self-explanation phase is shown after the
    /// method selection
    #[serde(default)]
    pub self_explanation: bool,

    /// Matching only: the systems offered for selection
    #[serde(default)]
    pub candidate_systems: Vec<CandidateSystem>,

    /// Matching only: the method the chosen system must fit
    #[serde(default)]
    pub target_method: Option<Method>,

    /// Matching only: index of the correct candidate
    #[serde(default)]
    pub matching_index: Option<usize>,
}

impl FlexibilityExercise {
    /// Whether a method counts as suitable for this system
    pub fn is_suitable(&self, method: Method) -> bool {
        self.suitable_methods.contains(&method)
    }

    /// Whether a method counts as efficient for this system
    pub fn is_efficient(&self, method: Method) -> bool {
        self.efficient_methods.contains(&method)
    }

    /// Check the internal consistency of the definition
    pub fn validate(&self) -> Result<()> {
        if !self.kind.is_flexibility() {
            return Err(AlgespaceError::Exercise(format!(
                "exercise {}: kind {} is not a flexibility exercise",
                self.id, self.kind
            )));
        }
        let SystemSolution { x, y } = self.solution;
        if !self.first_equation.is_satisfied_by(x, y) || !self.second_equation.is_satisfied_by(x, y)
        {
            return Err(AlgespaceError::Exercise(format!(
                "exercise {}: declared solution (x={}, y={}) does not solve the system",
                self.id, x, y
            )));
        }
        match self.kind {
            ExerciseKind::Suitability if self.suitable_methods.is_empty() => {
                Err(AlgespaceError::Exercise(format!(
                    "exercise {}: suitability exercises need at least one suitable method",
                    self.id
                )))
            }
            ExerciseKind::Efficiency if self.efficient_methods.is_empty() => {
                Err(AlgespaceError::Exercise(format!(
                    "exercise {}: efficiency exercises need at least one efficient method",
                    self.id
                )))
            }
            ExerciseKind::Matching => {
                if self.target_method.is_none() {
                    return Err(AlgespaceError::Exercise(format!(
                        "exercise {}: matching exercises need a target method",
                        self.id
                    )));
                }
                match self.matching_index {
                    Some(i) if i < self.candidate_systems.len() => Ok(()),
                    _ => Err(AlgespaceError::Exercise(format!(
                        "exercise {}: matching index out of range ({} candidates)",
                        self.id,
                        self.candidate_systems.len()
                    ))),
                }
            }
            _ => Ok(()),
        }
    }
}

/// Suitability fixture (y = 2x + 1 and y = 4x - 3, solution (2, 5))
/// shared by session tests
#[cfg(test)]
pub(crate) fn suitability_exercise() -> FlexibilityExercise {
    use crate::exercises::equations::{Term, VarSymbol};
    use crate::math::Fraction;

    let first = LinearEquation::new(
        vec![Term::with_var(1, VarSymbol::Y)],
        vec![Term::with_var(2, VarSymbol::X), Term::constant(1)],
    );
    let second = LinearEquation::new(
        vec![Term::with_var(1, VarSymbol::Y)],
        vec![Term::with_var(4, VarSymbol::X), Term::constant(-3)],
    );
    FlexibilityExercise {
        id: ExerciseId(10),
        kind: ExerciseKind::Suitability,
        first_equation: first,
        second_equation: second,
        suitable_methods: vec![Method::Equalization, Method::Substitution],
        efficient_methods: vec![Method::Equalization],
        solution: SystemSolution {
            x: Fraction::from_integer(2),
            y: Fraction::from_integer(5),
        },
        self_explanation: false,
        candidate_systems: Vec::new(),
        target_method: None,
        matching_index: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Fraction;

    #[test]
    fn test_valid_suitability_definition() {
        suitability_exercise().validate().unwrap();
    }

    #[test]
    fn test_wrong_solution_rejected() {
        let mut ex = suitability_exercise();
        ex.solution.x = Fraction::from_integer(3);
        assert!(ex.validate().is_err());
    }

    #[test]
    fn test_suitability_requires_methods() {
        let mut ex = suitability_exercise();
        ex.suitable_methods.clear();
        assert!(ex.validate().is_err());
    }

    #[test]
    fn test_matching_requires_target_and_index() {
        let mut ex = suitability_exercise();
        ex.kind = ExerciseKind::Matching;
        assert!(ex.validate().is_err());

        ex.target_method = Some(Method::Elimination);
        ex.candidate_systems = vec![CandidateSystem {
            first: ex.first_equation.clone(),
            second: ex.second_equation.clone(),
        }];
        ex.matching_index = Some(0);
        ex.validate().unwrap();

        ex.matching_index = Some(5);
        assert!(ex.validate().is_err());
    }

    #[test]
    fn test_method_membership() {
        let ex = suitability_exercise();
        assert!(ex.is_suitable(Method::Equalization));
        assert!(!ex.is_suitable(Method::Elimination));
        assert!(ex.is_efficient(Method::Equalization));
        assert!(!ex.is_efficient(Method::Substitution));
    }
}
