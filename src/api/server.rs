//! HTTP server for the study backend
//!
//! Serves the tracking contract and the exercise definition lookups. All
//! study routes sit behind the auth middleware; `/health` does not.

use super::auth::require_auth;
use super::handlers::{
    add_action_handler, complete_handler, complete_phase_handler, create_entry_handler,
    get_equalization_handler, get_flexibility_handler, health_handler, study_exercises_handler,
    track_choice_handler,
};
use crate::config::{Environment, Settings};
use crate::error::Result;
use crate::storage::{ExerciseStore, TrackingStore};
use crate::tracking::routes;
use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub exercises: Arc<ExerciseStore>,
    pub tracking: Arc<TrackingStore>,
}

/// The study backend server
pub struct StudyServer {
    state: AppState,
}

impl StudyServer {
    /// Open both databases and prepare the server
    pub async fn new(settings: Settings) -> Result<Self> {
        let exercises = ExerciseStore::open(&settings.database.exercises_path).await?;
        let tracking = TrackingStore::open(&settings.database.studies_path).await?;

        if !settings.require_bearer() {
            warn!("No bearer token configured; study routes are open");
        }

        Ok(Self {
            state: AppState {
                settings: Arc::new(settings),
                exercises: Arc::new(exercises),
                tracking: Arc::new(tracking),
            },
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The complete router, ready to serve
    pub fn router(&self) -> Router {
        Self::build_router(self.state.clone())
    }

    fn build_router(state: AppState) -> Router {
        let cors = cors_layer(&state.settings);

        let protected = Router::new()
            .route(routes::CREATE_ENTRY, put(create_entry_handler))
            .route(routes::ADD_ACTION, post(add_action_handler))
            .route(routes::TRACK_CHOICE, post(track_choice_handler))
            .route(routes::COMPLETE_PHASE, post(complete_phase_handler))
            .route(routes::COMPLETE, post(complete_handler))
            .route(
                "/flexibility-study/getExercisesForStudy/:id",
                get(study_exercises_handler),
            )
            .route("/equalization/getExercise/:id", get(get_equalization_handler))
            .route(
                "/flexibility-training/getExercise/:id",
                get(get_flexibility_handler),
            )
            .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

        Router::new()
            .merge(protected)
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Bind the configured address and serve until shutdown
    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = self.state.settings.server.addr;
        let router = self.router();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Study backend listening on http://{}", addr);
        axum::serve(listener, router).await?;
        Ok(())
    }
}

/// Permissive CORS in development, configured origins otherwise
fn cors_layer(settings: &Settings) -> CorsLayer {
    if settings.server.environment == Environment::Development {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = settings
        .server
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring unparseable CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn test_server(settings: Settings) -> StudyServer {
        StudyServer::new(settings).await.unwrap()
    }

    fn scratch_settings(dir: &tempfile::TempDir) -> Settings {
        let mut settings = Settings::default();
        settings.database.exercises_path = dir.path().join("exercises.db");
        settings.database.studies_path = dir.path().join("studies.db");
        settings
    }

    #[tokio::test]
    async fn test_health_is_open_without_auth() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = scratch_settings(&dir);
        settings.auth.bearer_token = "secret".to_string();
        let server = test_server(settings).await;

        let response = server
            .router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_study_routes_require_bearer() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = scratch_settings(&dir);
        settings.auth.bearer_token = "secret".to_string();
        let server = test_server(settings).await;

        let bare = server
            .router()
            .oneshot(
                Request::get("/flexibility-study/getExercisesForStudy/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(bare.status(), StatusCode::UNAUTHORIZED);

        let wrong = server
            .router()
            .oneshot(
                Request::get("/flexibility-study/getExercisesForStudy/1")
                    .header("Authorization", "Bearer nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_study_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let settings = scratch_settings(&dir);
        let server = test_server(settings).await;

        let response = server
            .router()
            .oneshot(
                Request::get("/flexibility-study/getExercisesForStudy/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
