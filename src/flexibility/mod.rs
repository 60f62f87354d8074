//! Flexibility-training gameplay
//!
//! Drives the suitability, efficiency, and matching exercise sequences.
//! The phase machine lives in [`phases`], the shared method-application
//! payload in [`transformation`], and the session driver tying both to
//! the tracking recorder in [`session`].

pub mod phases;
pub mod session;
pub mod transformation;

pub use phases::{EquationChoice, FlexibilityPhase};
pub use session::{FlexibilitySession, PostSolution};
pub use transformation::TransformationOutcome;
