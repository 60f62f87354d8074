//! End-to-end flexibility attempts against a live backend
//!
//! One walk per exercise kind: suitability into the comparison branch,
//! efficiency ending at the system solution, and matching with a wrong
//! candidate pick on the way.

mod common;

use algespace::exercises::{LinearEquation, Term, VarSymbol};
use algespace::flexibility::{
    EquationChoice, FlexibilityPhase, FlexibilitySession, PostSolution, TransformationOutcome,
};
use algespace::storage::EventKind;
use algespace::tracking::{AttemptInfo, SessionRecorder};
use algespace::types::{
    AgentCondition, AgentType, ExerciseId, ExerciseKind, Method, StudyId, UserId,
};
use algespace::{FlexibilityExercise, Fraction};
use common::{spawn_backend, TestBackend};
use std::collections::BTreeSet;

fn attempt(exercise_id: i64, kind: ExerciseKind) -> AttemptInfo {
    AttemptInfo {
        user_id: UserId::new("p-flex"),
        username: "participant".into(),
        study_id: StudyId(1),
        flexibility_id: ExerciseId(exercise_id),
        exercise_id: ExerciseId(exercise_id),
        exercise_type: kind,
        agent_condition: AgentCondition::Agent,
        agent_type: AgentType::Informational,
    }
}

async fn fetch_exercise(backend: &TestBackend, id: i64) -> FlexibilityExercise {
    backend
        .client()
        .get(backend.url(&format!("/flexibility-training/getExercise/{}", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

fn completed_phases(events: &[algespace::storage::EventRecord]) -> BTreeSet<String> {
    events
        .iter()
        .filter(|e| e.kind == EventKind::PhaseComplete)
        .map(|e| e.phase.clone())
        .collect()
}

#[tokio::test]
async fn test_suitable_choice_walks_comparison() {
    let backend = spawn_backend().await;
    // y = 2x + 1 and y = 4x - 3, solution (2, 5)
    let exercise = fetch_exercise(&backend, 1).await;

    let recorder = SessionRecorder::start(backend.tracker(), attempt(1, ExerciseKind::Suitability))
        .await
        .unwrap();
    let entry_id = recorder.entry().unwrap();
    let mut s = FlexibilitySession::new(exercise, recorder).unwrap();

    s.select_method(Method::Equalization).unwrap();
    s.confirm_transformation().unwrap();

    // Equalizing both right-hand sides eliminates y
    let outcome = TransformationOutcome::new(
        LinearEquation::new(
            vec![Term::with_var(2, VarSymbol::X), Term::constant(1)],
            vec![Term::with_var(4, VarSymbol::X), Term::constant(-3)],
        ),
        VarSymbol::Y,
    );
    assert!(s.apply_method(outcome).unwrap());
    assert!(s.submit_first_solution(Fraction::from_integer(2)).unwrap());
    s.select_equation(EquationChoice::First).unwrap();
    assert!(s.submit_second_solution(Fraction::from_integer(5)).unwrap());

    assert_eq!(s.confirm_system_solution().unwrap(), PostSolution::Comparison);
    match s.phase() {
        FlexibilityPhase::Comparison { method, alternative } => {
            assert_eq!(*method, Method::Equalization);
            assert_eq!(*alternative, Method::Substitution);
        }
        other => panic!("expected comparison, got {}", other),
    }

    s.complete_comparison("equalization_faster").unwrap();
    assert!(s.is_done());
    s.flush_tracking().await;

    let entry = backend.state.tracking.entry(entry_id).await.unwrap();
    assert!(entry.is_completed());
    assert_eq!(entry.total_errors, Some(0));

    let events = backend.state.tracking.events(entry_id).await.unwrap();
    let expected: BTreeSet<String> = [
        "method_selection",
        "system_transformation",
        "equalization_method",
        "first_solution",
        "equation_selection",
        "second_solution",
        "system_solution",
        "comparison",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    assert_eq!(completed_phases(&events), expected);

    let method_choice = events
        .iter()
        .find(|e| e.kind == EventKind::Choice && e.phase == "method_selection")
        .unwrap();
    assert_eq!(method_choice.payload, "equalization");

    // The comparison verdict rides on the final phase completion
    let comparison_done = events
        .iter()
        .find(|e| e.kind == EventKind::PhaseComplete && e.phase == "comparison")
        .unwrap();
    let payload: serde_json::Value = serde_json::from_str(&comparison_done.payload).unwrap();
    assert_eq!(payload["choice"], "equalization_faster");
}

#[tokio::test]
async fn test_efficiency_run_ends_at_solution() {
    let backend = spawn_backend().await;
    // y = 5x - 9 and 2x + 3y = 7, solution (2, 1)
    let exercise = fetch_exercise(&backend, 3).await;

    let recorder = SessionRecorder::start(backend.tracker(), attempt(3, ExerciseKind::Efficiency))
        .await
        .unwrap();
    let entry_id = recorder.entry().unwrap();
    let mut s = FlexibilitySession::new(exercise, recorder).unwrap();

    s.select_method(Method::Substitution).unwrap();
    s.confirm_transformation().unwrap();

    // Substituting y = 5x - 9 into the second equation: 17x - 27 = 7
    let outcome = TransformationOutcome::new(
        LinearEquation::new(
            vec![Term::with_var(17, VarSymbol::X), Term::constant(-27)],
            vec![Term::constant(7)],
        ),
        VarSymbol::Y,
    );
    assert!(s.apply_method(outcome).unwrap());
    assert!(s.submit_first_solution(Fraction::from_integer(2)).unwrap());
    s.select_equation(EquationChoice::First).unwrap();
    assert!(s.submit_second_solution(Fraction::from_integer(1)).unwrap());

    assert_eq!(s.confirm_system_solution().unwrap(), PostSolution::Finished);
    assert!(s.is_done());
    s.flush_tracking().await;

    let entry = backend.state.tracking.entry(entry_id).await.unwrap();
    assert!(entry.is_completed());

    let events = backend.state.tracking.events(entry_id).await.unwrap();
    let phases = completed_phases(&events);
    assert!(!phases.contains("comparison"));
    assert!(!phases.contains("system_transformation_on_resolve"));
    assert_eq!(phases.len(), 7);

    // Efficiency attempts label the selection
    let selection = events
        .iter()
        .find(|e| e.kind == EventKind::Action && e.phase == "method_selection")
        .unwrap();
    assert_eq!(selection.payload, "selected substitution (efficient)");
}

#[tokio::test]
async fn test_matching_wrong_pick_counts_error() {
    let backend = spawn_backend().await;
    // Candidates around y = x + 3 and y = 2x - 1, solution (4, 7)
    let exercise = fetch_exercise(&backend, 5).await;

    let recorder = SessionRecorder::start(backend.tracker(), attempt(5, ExerciseKind::Matching))
        .await
        .unwrap();
    let entry_id = recorder.entry().unwrap();
    let mut s = FlexibilitySession::new(exercise, recorder).unwrap();

    assert_eq!(s.phase(), &FlexibilityPhase::SystemSelection);
    assert!(!s.select_system(0).unwrap());
    assert_eq!(s.phase(), &FlexibilityPhase::SystemSelection);
    assert!(s.select_system(1).unwrap());

    s.confirm_transformation().unwrap();
    let outcome = TransformationOutcome::new(
        LinearEquation::new(
            vec![Term::with_var(1, VarSymbol::X), Term::constant(3)],
            vec![Term::with_var(2, VarSymbol::X), Term::constant(-1)],
        ),
        VarSymbol::Y,
    );
    assert!(s.apply_method(outcome).unwrap());
    assert!(s.submit_first_solution(Fraction::from_integer(4)).unwrap());
    s.select_equation(EquationChoice::Second).unwrap();
    assert!(s.submit_second_solution(Fraction::from_integer(7)).unwrap());
    assert_eq!(s.confirm_system_solution().unwrap(), PostSolution::Finished);
    s.flush_tracking().await;

    let entry = backend.state.tracking.entry(entry_id).await.unwrap();
    assert!(entry.is_completed());
    assert_eq!(entry.total_errors, Some(1));

    let events = backend.state.tracking.events(entry_id).await.unwrap();
    let selection_done = events
        .iter()
        .find(|e| e.kind == EventKind::PhaseComplete && e.phase == "system_selection")
        .unwrap();
    let payload: serde_json::Value = serde_json::from_str(&selection_done.payload).unwrap();
    assert_eq!(payload["errors"], 1);

    let pick = events
        .iter()
        .find(|e| e.kind == EventKind::Choice && e.phase == "system_selection")
        .unwrap();
    assert_eq!(pick.payload, "system_1");
}
