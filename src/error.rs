//! Error types for the AlgeSpace exercise and study platform
//!
//! This module provides comprehensive error handling using thiserror for
//! structured error definitions and anyhow for error propagation at the
//! binary edge.

use crate::types::{EntryId, StudyId};
use thiserror::Error;

/// Main error type for AlgeSpace operations
#[derive(Error, Debug)]
pub enum AlgespaceError {
    /// Authentication or authorization failure (bad bearer token / API key)
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Referenced study does not exist
    #[error("Unknown study: {0}")]
    StudyNotFound(StudyId),

    /// Referenced exercise does not exist
    ///
    /// `family` is the lookup namespace ("equalization" or "flexibility"),
    /// matching the two definition tables.
    #[error("Unknown {family} exercise: {id}")]
    ExerciseNotFound {
        family: &'static str,
        id: crate::types::ExerciseId,
    },

    /// Referenced tracking entry does not exist
    #[error("Unknown tracking entry: {0}")]
    EntryNotFound(EntryId),

    /// Internal consistency violation in a session (a phase was entered
    /// without its required upstream results). Unrecoverable locally.
    #[error("Game logic invariant broken: {0}")]
    GameLogic(String),

    /// An exercise definition references data that does not add up
    #[error("Invalid exercise definition: {0}")]
    Exercise(String),

    /// Arithmetic expression could not be evaluated
    #[error("Invalid expression: {0}")]
    Expression(#[from] crate::exercises::expression::ExpressionError),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tracking request failed (transport or non-2xx status)
    #[error("Tracking request failed ({context}): {source}")]
    Network {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl AlgespaceError {
    /// Wrap a reqwest error with the endpoint it came from
    pub fn network(context: impl Into<String>, source: reqwest::Error) -> Self {
        AlgespaceError::Network {
            context: context.into(),
            source,
        }
    }
}

/// Result type alias for AlgeSpace operations
pub type Result<T> = std::result::Result<T, AlgespaceError>;

/// Convert anyhow::Error to AlgespaceError
impl From<anyhow::Error> for AlgespaceError {
    fn from(err: anyhow::Error) -> Self {
        AlgespaceError::Other(err.to_string())
    }
}
