//! Core identifiers and shared enums for the AlgeSpace platform
//!
//! This module defines the fundamental vocabulary used throughout the crate:
//! typed identifiers for studies, exercises, and tracking entries, the
//! solving-method and exercise-kind enums, and the study-arm tags carried
//! into tracking entries.

use serde::{Deserialize, Serialize};

/// Unique identifier for a research study
///
/// Wraps the database row id to prevent mixing study ids with other
/// integer-based identifiers in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudyId(pub i64);

impl std::fmt::Display for StudyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an exercise definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExerciseId(pub i64);

impl std::fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one tracking entry (one exercise attempt)
///
/// Returned by `createEntry` and quoted by every subsequent tracking call
/// for the same attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub i64);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque participant identifier assigned by the study administration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh participant id for sessions without an assigned one
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Solving method for a system of linear equations
///
/// Selected by the user in the first phase of a flexibility exercise; the
/// selection determines the method branch taken later in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Set the two isolated right-hand sides equal to each other
    Equalization,

    /// Substitute one equation's isolated expression into the other
    Substitution,

    /// Add/subtract scaled equations to eliminate a variable
    Elimination,
}

impl Method {
    /// All methods, in the order they are offered to the user
    pub const ALL: [Method; 3] = [
        Method::Equalization,
        Method::Substitution,
        Method::Elimination,
    ];
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Equalization => write!(f, "equalization"),
            Method::Substitution => write!(f, "substitution"),
            Method::Elimination => write!(f, "elimination"),
        }
    }
}

/// Exercise family
///
/// Equalization is the standalone drag-and-drop scale exercise; the other
/// three are flexibility-training exercises sharing one phase graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Equalization,
    Suitability,
    Efficiency,
    Matching,
}

impl ExerciseKind {
    /// Whether this kind runs on the flexibility phase graph
    pub fn is_flexibility(&self) -> bool {
        !matches!(self, ExerciseKind::Equalization)
    }
}

impl std::fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExerciseKind::Equalization => write!(f, "equalization"),
            ExerciseKind::Suitability => write!(f, "suitability"),
            ExerciseKind::Efficiency => write!(f, "efficiency"),
            ExerciseKind::Matching => write!(f, "matching"),
        }
    }
}

/// Study arm: whether the participant sees the pedagogical agent
///
/// Carried opaquely into tracking entries; the exercise logic never
/// branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentCondition {
    /// Participant is accompanied by the pedagogical agent
    Agent,

    /// Control group without the agent
    Control,
}

impl std::fmt::Display for AgentCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentCondition::Agent => write!(f, "agent"),
            AgentCondition::Control => write!(f, "control"),
        }
    }
}

/// Flavor of the pedagogical agent assigned to a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    /// Encouraging, affect-oriented messages
    Motivational,

    /// Strategy- and content-oriented messages
    Informational,

    /// Agent present but with neutral messages
    Neutral,
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentType::Motivational => write!(f, "motivational"),
            AgentType::Informational => write!(f, "informational"),
            AgentType::Neutral => write!(f, "neutral"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(StudyId(7).to_string(), "7");
        assert_eq!(EntryId(123).to_string(), "123");
        assert_eq!(UserId::new("p-004").to_string(), "p-004");
    }

    #[test]
    fn test_generated_user_ids_are_unique() {
        let a = UserId::generate();
        let b = UserId::generate();
        assert_ne!(a, b);
        assert!(!a.0.is_empty());
    }

    #[test]
    fn test_method_wire_format() {
        let json = serde_json::to_string(&Method::Equalization).unwrap();
        assert_eq!(json, "\"equalization\"");
        let back: Method = serde_json::from_str("\"elimination\"").unwrap();
        assert_eq!(back, Method::Elimination);
    }

    #[test]
    fn test_exercise_kind_family() {
        assert!(!ExerciseKind::Equalization.is_flexibility());
        assert!(ExerciseKind::Suitability.is_flexibility());
        assert!(ExerciseKind::Matching.is_flexibility());
    }

    #[test]
    fn test_agent_tags_roundtrip() {
        let json = serde_json::to_string(&AgentCondition::Control).unwrap();
        assert_eq!(json, "\"control\"");
        let back: AgentType = serde_json::from_str("\"motivational\"").unwrap();
        assert_eq!(back, AgentType::Motivational);
    }
}
