//! HTTP round-trips for the tracking contract and the exercise lookups
//!
//! Drives the real client against a live backend and asserts on what the
//! tracking store actually persisted.

mod common;

use algespace::storage::{EventKind, StudyExerciseRef};
use algespace::tracking::{
    routes, AddActionRequest, CompletePhaseRequest, CompleteRequest, CreateEntryRequest,
    TrackChoiceRequest, Tracker,
};
use algespace::types::{
    AgentCondition, AgentType, EntryId, ExerciseId, ExerciseKind, StudyId, UserId,
};
use algespace::{EqualizationExercise, FlexibilityExercise};
use common::spawn_backend;

fn entry_request(user: &str) -> CreateEntryRequest {
    CreateEntryRequest {
        user_id: UserId::new(user),
        username: "participant".into(),
        study_id: StudyId(1),
        flexibility_id: ExerciseId(1),
        exercise_id: ExerciseId(1),
        exercise_type: ExerciseKind::Suitability,
        agent_condition: AgentCondition::Agent,
        agent_type: AgentType::Motivational,
    }
}

fn action(id: EntryId, phase: &str, action: &str) -> AddActionRequest {
    AddActionRequest {
        user_id: UserId::new("p-api"),
        username: "participant".into(),
        study_id: StudyId(1),
        id,
        phase: phase.into(),
        action: action.into(),
    }
}

fn choice(id: EntryId, phase: &str, choice: &str) -> TrackChoiceRequest {
    TrackChoiceRequest {
        user_id: UserId::new("p-api"),
        username: "participant".into(),
        study_id: StudyId(1),
        id,
        phase: phase.into(),
        choice: choice.into(),
    }
}

fn phase_done(id: EntryId, phase: &str, time: f64, errors: u32) -> CompletePhaseRequest {
    CompletePhaseRequest {
        user_id: UserId::new("p-api"),
        username: "participant".into(),
        study_id: StudyId(1),
        id,
        phase: phase.into(),
        time,
        errors,
        choice: None,
    }
}

#[tokio::test]
async fn test_full_contract_roundtrip() {
    let backend = spawn_backend().await;
    let tracker = backend.tracker();

    let id = tracker.create_entry(entry_request("p-rt")).await.unwrap();

    tracker
        .add_action(action(id, "method_selection", "selected equalization"))
        .await
        .unwrap();
    tracker
        .add_action(action(id, "method_selection", "hint opened"))
        .await
        .unwrap();
    tracker
        .track_choice(choice(id, "method_selection", "equalization"))
        .await
        .unwrap();
    tracker
        .complete_phase(phase_done(id, "method_selection", 3.5, 1))
        .await
        .unwrap();
    tracker
        .complete(CompleteRequest {
            user_id: UserId::new("p-rt"),
            username: "participant".into(),
            study_id: StudyId(1),
            id,
            time: 9.0,
            errors: 1,
        })
        .await
        .unwrap();

    let entry = backend.state.tracking.entry(id).await.unwrap();
    assert!(entry.is_completed());
    assert_eq!(entry.user_id, UserId::new("p-rt"));
    assert_eq!(entry.exercise_type, ExerciseKind::Suitability);
    assert_eq!(entry.total_time, Some(9.0));
    assert_eq!(entry.total_errors, Some(1));

    let events = backend.state.tracking.events(id).await.unwrap();
    let actions: Vec<_> = events
        .iter()
        .filter(|e| e.kind == EventKind::Action)
        .collect();
    assert_eq!(actions.len(), 2);
    // Awaited sequentially, so arrival order is the call order
    assert_eq!(actions[0].seq, 0);
    assert_eq!(actions[0].payload, "selected equalization");
    assert_eq!(actions[1].seq, 1);
    assert_eq!(actions[1].payload, "hint opened");

    let choices: Vec<_> = events
        .iter()
        .filter(|e| e.kind == EventKind::Choice)
        .collect();
    assert_eq!(choices.len(), 1);
    assert_eq!(choices[0].payload, "equalization");

    let completions: Vec<_> = events
        .iter()
        .filter(|e| e.kind == EventKind::PhaseComplete)
        .collect();
    assert_eq!(completions.len(), 1);
    let payload: serde_json::Value = serde_json::from_str(&completions[0].payload).unwrap();
    assert_eq!(payload["time"], 3.5);
    assert_eq!(payload["errors"], 1);
    assert!(payload.get("choice").is_none());
}

#[tokio::test]
async fn test_repeated_choice_and_completion_are_replaced() {
    let backend = spawn_backend().await;
    let tracker = backend.tracker();
    let id = tracker.create_entry(entry_request("p-repl")).await.unwrap();

    tracker
        .track_choice(choice(id, "method_selection", "substitution"))
        .await
        .unwrap();
    tracker
        .track_choice(choice(id, "method_selection", "equalization"))
        .await
        .unwrap();
    tracker
        .complete_phase(phase_done(id, "method_selection", 2.0, 0))
        .await
        .unwrap();
    tracker
        .complete_phase(phase_done(id, "method_selection", 6.0, 2))
        .await
        .unwrap();

    let events = backend.state.tracking.events(id).await.unwrap();
    let choices: Vec<_> = events
        .iter()
        .filter(|e| e.kind == EventKind::Choice)
        .collect();
    assert_eq!(choices.len(), 1);
    assert_eq!(choices[0].payload, "equalization");

    let completions: Vec<_> = events
        .iter()
        .filter(|e| e.kind == EventKind::PhaseComplete)
        .collect();
    assert_eq!(completions.len(), 1);
    let payload: serde_json::Value = serde_json::from_str(&completions[0].payload).unwrap();
    assert_eq!(payload["time"], 6.0);
    assert_eq!(payload["errors"], 2);
}

#[tokio::test]
async fn test_second_create_entry_appends_attempt() {
    let backend = spawn_backend().await;
    let tracker = backend.tracker();

    let first = tracker.create_entry(entry_request("p-again")).await.unwrap();
    tracker
        .add_action(action(first, "method_selection", "first attempt"))
        .await
        .unwrap();

    let second = tracker.create_entry(entry_request("p-again")).await.unwrap();
    assert_ne!(first, second);

    // The first attempt's history is untouched
    let events = backend.state.tracking.events(first).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].payload, "first attempt");

    let entry = backend.state.tracking.entry(second).await.unwrap();
    assert!(!entry.is_completed());
    assert!(backend.state.tracking.events(second).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejects_missing_and_wrong_bearer() {
    let backend = spawn_backend().await;
    let bare = reqwest::Client::new();

    let response = bare
        .put(backend.url(routes::CREATE_ENTRY))
        .json(&entry_request("p-noauth"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);

    let response = bare
        .put(backend.url(routes::CREATE_ENTRY))
        .header("Authorization", "Bearer wrong")
        .json(&entry_request("p-noauth"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_references_are_not_found() {
    let backend = spawn_backend().await;
    let client = backend.client();

    let response = client
        .post(backend.url(routes::ADD_ACTION))
        .json(&action(EntryId(9999), "method_selection", "ghost"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    let response = client
        .get(backend.url("/flexibility-study/getExercisesForStudy/99"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    let response = client
        .get(backend.url("/equalization/getExercise/99"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_catalog_lookups_roundtrip() {
    let backend = spawn_backend().await;
    let client = backend.client();

    let slots: Vec<StudyExerciseRef> = client
        .get(backend.url("/flexibility-study/getExercisesForStudy/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(slots.len(), 8);
    assert_eq!(slots[0].exercise_type, ExerciseKind::Equalization);
    assert!(slots[3..].iter().all(|s| s.exercise_type.is_flexibility()));

    let exercise: EqualizationExercise = client
        .get(backend.url("/equalization/getExercise/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(exercise.id, ExerciseId(1));
    assert_eq!(exercise.isolated.weight, 16);
    exercise.validate().unwrap();

    let exercise: FlexibilityExercise = client
        .get(backend.url("/flexibility-training/getExercise/5"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(exercise.kind, ExerciseKind::Matching);
    assert_eq!(exercise.candidate_systems.len(), 3);
}
