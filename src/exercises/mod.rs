//! Immutable exercise definitions
//!
//! Definitions are authored as seed data, stored in the exercise database,
//! and fetched read-only by clients. Nothing in a running session ever
//! mutates them.

pub mod equalization;
pub mod equations;
pub mod expression;
pub mod flexibility;

pub use equalization::EqualizationExercise;
pub use equations::{
    EquationSide, LinearEquation, SystemSolution, Term, VarSymbol, Variable, WeightStock,
};
pub use expression::{check_against, evaluate, ExpressionError, InputCheck};
pub use flexibility::FlexibilityExercise;
