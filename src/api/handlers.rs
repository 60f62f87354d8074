//! Route handlers for the study backend

use super::server::AppState;
use crate::error::AlgespaceError;
use crate::exercises::{EqualizationExercise, FlexibilityExercise};
use crate::storage::{NewEntry, StudyExerciseRef};
use crate::tracking::{
    AddActionRequest, CompletePhaseRequest, CompleteRequest, CreateEntryRequest,
    TrackChoiceRequest,
};
use crate::types::{EntryId, ExerciseId, StudyId};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, warn};

/// Error wrapper that maps crate errors onto HTTP statuses
///
/// Bad references are 404, auth failures 401, everything else 500 with
/// the error message as the body.
pub struct ApiError(AlgespaceError);

impl From<AlgespaceError> for ApiError {
    fn from(err: AlgespaceError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AlgespaceError::StudyNotFound(_)
            | AlgespaceError::ExerciseNotFound { .. }
            | AlgespaceError::EntryNotFound(_) => StatusCode::NOT_FOUND,
            AlgespaceError::Auth(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            warn!("Request failed: {}", self.0);
        }
        (status, self.0.to_string()).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

/// `PUT /flexibility-study/createEntry`
///
/// Registers a new attempt and returns its id as the response body.
pub async fn create_entry_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateEntryRequest>,
) -> ApiResult<Json<EntryId>> {
    let id = state
        .tracking
        .create_entry(NewEntry {
            study_id: req.study_id,
            user_id: req.user_id,
            username: req.username,
            flexibility_id: req.flexibility_id,
            exercise_id: req.exercise_id,
            exercise_type: req.exercise_type,
            agent_condition: req.agent_condition,
            agent_type: req.agent_type,
        })
        .await?;
    debug!("Created tracking entry {} for study {}", id, req.study_id);
    Ok(Json(id))
}

/// `POST /flexibility-study/addActionToEntry`
///
/// Participant fields in the body are informational; the entry row is the
/// source of truth for the event's attribution.
pub async fn add_action_handler(
    State(state): State<AppState>,
    Json(req): Json<AddActionRequest>,
) -> ApiResult<StatusCode> {
    state.tracking.add_action(req.id, &req.phase, &req.action).await?;
    Ok(StatusCode::OK)
}

/// `POST /flexibility-study/trackChoice`
pub async fn track_choice_handler(
    State(state): State<AppState>,
    Json(req): Json<TrackChoiceRequest>,
) -> ApiResult<StatusCode> {
    state
        .tracking
        .record_choice(req.id, &req.phase, &req.choice)
        .await?;
    Ok(StatusCode::OK)
}

/// `POST /flexibility-study/completePhaseTracking`
pub async fn complete_phase_handler(
    State(state): State<AppState>,
    Json(req): Json<CompletePhaseRequest>,
) -> ApiResult<StatusCode> {
    state
        .tracking
        .complete_phase(req.id, &req.phase, req.time, req.errors, req.choice.as_deref())
        .await?;
    Ok(StatusCode::OK)
}

/// `POST /flexibility-study/completeTracking`
pub async fn complete_handler(
    State(state): State<AppState>,
    Json(req): Json<CompleteRequest>,
) -> ApiResult<StatusCode> {
    state.tracking.complete_entry(req.id, req.time, req.errors).await?;
    Ok(StatusCode::OK)
}

/// `GET /flexibility-study/getExercisesForStudy/{id}`
pub async fn study_exercises_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<StudyExerciseRef>>> {
    let slots = state.exercises.study_exercises(StudyId(id)).await?;
    Ok(Json(slots))
}

/// `GET /equalization/getExercise/{id}`
pub async fn get_equalization_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EqualizationExercise>> {
    let exercise = state.exercises.get_equalization(ExerciseId(id)).await?;
    Ok(Json(exercise))
}

/// `GET /flexibility-training/getExercise/{id}`
pub async fn get_flexibility_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<FlexibilityExercise>> {
    let exercise = state.exercises.get_flexibility(ExerciseId(id)).await?;
    Ok(Json(exercise))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// `GET /health` (unauthenticated)
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = health_handler().await;
        assert_eq!(response.0.status, "ok");
        assert_eq!(response.0.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_error_statuses() {
        use axum::response::IntoResponse;

        let resp = ApiError(AlgespaceError::StudyNotFound(StudyId(9))).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = ApiError(AlgespaceError::EntryNotFound(EntryId(1))).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = ApiError(AlgespaceError::Database("boom".into())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
