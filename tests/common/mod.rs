//! Common test utilities and helpers

use algespace::api::{AppState, StudyServer};
use algespace::config::Settings;
use algespace::tracking::HttpTracker;
use std::sync::Arc;
use tempfile::TempDir;

/// Bearer token configured on every test backend
pub const BEARER: &str = "integration-token";

/// A seeded backend on an ephemeral port, with direct store access for
/// read-back assertions
pub struct TestBackend {
    pub base_url: String,
    pub state: AppState,
    _dir: TempDir,
}

/// Spawn a backend over scratch databases and seed the default catalog
pub async fn spawn_backend() -> TestBackend {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut settings = Settings::default();
    settings.database.exercises_path = dir.path().join("exercises.db");
    settings.database.studies_path = dir.path().join("studies.db");
    settings.auth.bearer_token = BEARER.to_string();

    let server = StudyServer::new(settings)
        .await
        .expect("Failed to open test backend");
    let state = server.state().clone();
    state
        .exercises
        .seed_defaults()
        .await
        .expect("Failed to seed catalog");

    // Bind first so requests never race server startup
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind ephemeral port");
    let addr = listener.local_addr().expect("Failed to read local addr");
    let router = server.router();
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("test server exited");
    });

    TestBackend {
        base_url: format!("http://{}", addr),
        state,
        _dir: dir,
    }
}

impl TestBackend {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Tracking client aimed at this backend
    pub fn tracker(&self) -> Arc<HttpTracker> {
        Arc::new(HttpTracker::new(self.base_url.clone(), BEARER, None).expect("tracker"))
    }

    /// Authenticated client for the exercise lookup routes
    pub fn client(&self) -> reqwest::Client {
        let mut headers = reqwest::header::HeaderMap::new();
        let bearer = format!("Bearer {}", BEARER).parse().expect("header value");
        headers.insert(reqwest::header::AUTHORIZATION, bearer);
        reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("client")
    }
}
