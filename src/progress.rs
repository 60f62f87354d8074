//! Per-participant progress through a study's exercises
//!
//! An explicit value the host owns and persists; completing an exercise
//! is recorded here by the host after the session reports `Done`. Goals
//! say how many completions of each kind a study requires.

use crate::types::{ExerciseId, ExerciseKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Completed-exercise bookkeeping for one participant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyProgress {
    /// Completed exercise ids per kind
    #[serde(default)]
    completed: BTreeMap<ExerciseKind, BTreeSet<ExerciseId>>,

    /// Required completion count per kind; kinds without a goal never
    /// gate progress
    #[serde(default)]
    goals: BTreeMap<ExerciseKind, u32>,
}

impl StudyProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style goal configuration
    pub fn with_goal(mut self, kind: ExerciseKind, goal: u32) -> Self {
        self.set_goal(kind, goal);
        self
    }

    pub fn set_goal(&mut self, kind: ExerciseKind, goal: u32) {
        self.goals.insert(kind, goal);
    }

    /// Mark an exercise as completed; repeating an exercise does not
    /// count twice
    pub fn record_completed(&mut self, kind: ExerciseKind, id: ExerciseId) {
        self.completed.entry(kind).or_default().insert(id);
    }

    pub fn is_completed(&self, kind: ExerciseKind, id: ExerciseId) -> bool {
        self.completed
            .get(&kind)
            .is_some_and(|ids| ids.contains(&id))
    }

    /// Number of distinct completed exercises of a kind
    pub fn completed_count(&self, kind: ExerciseKind) -> u32 {
        self.completed
            .get(&kind)
            .map(|ids| ids.len() as u32)
            .unwrap_or(0)
    }

    /// Whether the per-kind goal is met
    ///
    /// A kind without a configured goal is vacuously reached, so hosts
    /// can check every kind without special cases.
    pub fn goal_reached(&self, kind: ExerciseKind) -> bool {
        match self.goals.get(&kind) {
            Some(goal) => self.completed_count(kind) >= *goal,
            None => true,
        }
    }

    /// Whether every configured goal is met
    pub fn all_goals_reached(&self) -> bool {
        self.goals.keys().all(|kind| self.goal_reached(*kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_completion_counts_once() {
        let mut progress = StudyProgress::new();
        progress.record_completed(ExerciseKind::Suitability, ExerciseId(1));
        progress.record_completed(ExerciseKind::Suitability, ExerciseId(1));
        progress.record_completed(ExerciseKind::Suitability, ExerciseId(2));

        assert_eq!(progress.completed_count(ExerciseKind::Suitability), 2);
        assert!(progress.is_completed(ExerciseKind::Suitability, ExerciseId(1)));
        assert!(!progress.is_completed(ExerciseKind::Matching, ExerciseId(1)));
    }

    #[test]
    fn test_goal_gating() {
        let mut progress = StudyProgress::new()
            .with_goal(ExerciseKind::Equalization, 1)
            .with_goal(ExerciseKind::Suitability, 2);

        // Unconfigured kinds never gate
        assert!(progress.goal_reached(ExerciseKind::Matching));
        assert!(!progress.goal_reached(ExerciseKind::Equalization));
        assert!(!progress.all_goals_reached());

        progress.record_completed(ExerciseKind::Equalization, ExerciseId(1));
        progress.record_completed(ExerciseKind::Suitability, ExerciseId(1));
        assert!(progress.goal_reached(ExerciseKind::Equalization));
        assert!(!progress.all_goals_reached());

        progress.record_completed(ExerciseKind::Suitability, ExerciseId(3));
        assert!(progress.all_goals_reached());
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut progress = StudyProgress::new().with_goal(ExerciseKind::Efficiency, 1);
        progress.record_completed(ExerciseKind::Efficiency, ExerciseId(4));

        let json = serde_json::to_string(&progress).unwrap();
        let back: StudyProgress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, progress);
        assert!(back.goal_reached(ExerciseKind::Efficiency));
    }
}
