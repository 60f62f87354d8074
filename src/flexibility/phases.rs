//! Phase vocabulary of the flexibility exercises
//!
//! Each variant carries exactly the payload its screen needs, so a phase
//! that requires upstream results (the selected method, the method
//! application's outcome, the chosen equation) cannot be constructed
//! without them. The session dispatches on the variant, which keeps the
//! transition table exhaustiveness-checked.

use super::transformation::TransformationOutcome;
use crate::types::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the system's two equations the participant picked to find
/// the remaining variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquationChoice {
    First,
    Second,
}

impl EquationChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquationChoice::First => "first_equation",
            EquationChoice::Second => "second_equation",
        }
    }
}

/// Current phase of a flexibility exercise, with its payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum FlexibilityPhase {
    /// Suitability/efficiency entry: pick the solving method
    MethodSelection,

    /// Matching entry: pick the candidate system fitting the target method
    SystemSelection,

    /// Optional reflection screen after the method selection
    SelfExplanation { method: Method },

    /// Prepare the system for the chosen method
    SystemTransformation { method: Method },

    /// Method branches: work the chosen method on the system
    EqualizationMethod,
    SubstitutionMethod,
    EliminationMethod,

    /// Solve the transformed equation for the first numeric value
    FirstSolution {
        method: Method,
        outcome: TransformationOutcome,
    },

    /// Pick the equation used to find the remaining variable
    EquationSelection {
        method: Method,
        outcome: TransformationOutcome,
    },

    /// Solve for the remaining variable
    SecondSolution {
        method: Method,
        outcome: TransformationOutcome,
        equation: EquationChoice,
    },

    /// Present the full solution of the system
    SystemSolution {
        method: Method,
        outcome: TransformationOutcome,
    },

    /// Suitability, chosen method was suitable: compare with an
    /// alternative suitable method
    Comparison { method: Method, alternative: Method },

    /// Suitability, chosen method was not suitable: redo the system with
    /// a suitable one
    SystemTransformationOnResolve { comparison_method: Method },
    MethodOnResolve { comparison_method: Method },
    ResolveConclusion { comparison_method: Method },

    /// Terminal marker after the attempt is completed
    Done,
}

impl FlexibilityPhase {
    /// Wire name used in tracking payloads
    pub fn name(&self) -> &'static str {
        match self {
            FlexibilityPhase::MethodSelection => "method_selection",
            FlexibilityPhase::SystemSelection => "system_selection",
            FlexibilityPhase::SelfExplanation { .. } => "self_explanation",
            FlexibilityPhase::SystemTransformation { .. } => "system_transformation",
            FlexibilityPhase::EqualizationMethod => "equalization_method",
            FlexibilityPhase::SubstitutionMethod => "substitution_method",
            FlexibilityPhase::EliminationMethod => "elimination_method",
            FlexibilityPhase::FirstSolution { .. } => "first_solution",
            FlexibilityPhase::EquationSelection { .. } => "equation_selection",
            FlexibilityPhase::SecondSolution { .. } => "second_solution",
            FlexibilityPhase::SystemSolution { .. } => "system_solution",
            FlexibilityPhase::Comparison { .. } => "comparison",
            FlexibilityPhase::SystemTransformationOnResolve { .. } => {
                "system_transformation_on_resolve"
            }
            FlexibilityPhase::MethodOnResolve { .. } => "method_on_resolve",
            FlexibilityPhase::ResolveConclusion { .. } => "resolve_conclusion",
            FlexibilityPhase::Done => "done",
        }
    }

    /// The method-branch phase for a chosen method
    pub fn method_branch(method: Method) -> Self {
        match method {
            Method::Equalization => FlexibilityPhase::EqualizationMethod,
            Method::Substitution => FlexibilityPhase::SubstitutionMethod,
            Method::Elimination => FlexibilityPhase::EliminationMethod,
        }
    }

    /// The method a branch phase works on, if this is one
    pub fn branch_method(&self) -> Option<Method> {
        match self {
            FlexibilityPhase::EqualizationMethod => Some(Method::Equalization),
            FlexibilityPhase::SubstitutionMethod => Some(Method::Substitution),
            FlexibilityPhase::EliminationMethod => Some(Method::Elimination),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, FlexibilityPhase::Done)
    }
}

impl fmt::Display for FlexibilityPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
