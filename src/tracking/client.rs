//! Tracker trait and its HTTP / no-op implementations

use super::routes;
use crate::error::{AlgespaceError, Result};
use crate::types::{AgentCondition, AgentType, EntryId, ExerciseId, ExerciseKind, StudyId, UserId};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Body of `PUT /flexibility-study/createEntry`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryRequest {
    pub user_id: UserId,
    pub username: String,
    pub study_id: StudyId,
    pub flexibility_id: ExerciseId,
    pub exercise_id: ExerciseId,
    pub exercise_type: ExerciseKind,
    pub agent_condition: AgentCondition,
    pub agent_type: AgentType,
}

/// Body of `POST /flexibility-study/addActionToEntry`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddActionRequest {
    pub user_id: UserId,
    pub username: String,
    pub study_id: StudyId,
    /// Entry id returned by `createEntry`
    pub id: EntryId,
    pub phase: String,
    pub action: String,
}

/// Body of `POST /flexibility-study/trackChoice`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackChoiceRequest {
    pub user_id: UserId,
    pub username: String,
    pub study_id: StudyId,
    pub id: EntryId,
    pub phase: String,
    pub choice: String,
}

/// Body of `POST /flexibility-study/completePhaseTracking`
///
/// `choice` is present only for comparison/resolve phase completions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePhaseRequest {
    pub user_id: UserId,
    pub username: String,
    pub study_id: StudyId,
    pub id: EntryId,
    pub phase: String,
    /// Elapsed phase time in seconds
    pub time: f64,
    pub errors: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice: Option<String>,
}

/// Body of `POST /flexibility-study/completeTracking`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    pub user_id: UserId,
    pub username: String,
    pub study_id: StudyId,
    pub id: EntryId,
    pub time: f64,
    pub errors: u32,
}

/// The telemetry call surface of one exercise attempt
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Register a new attempt; the returned id keys all later calls
    async fn create_entry(&self, req: CreateEntryRequest) -> Result<EntryId>;

    /// Append a free-text action to the entry's phase log
    async fn add_action(&self, req: AddActionRequest) -> Result<()>;

    /// Record a discrete decision for a phase (a newer call replaces it)
    async fn track_choice(&self, req: TrackChoiceRequest) -> Result<()>;

    /// Record elapsed time and error count on phase exit
    async fn complete_phase(&self, req: CompletePhaseRequest) -> Result<()>;

    /// Finalize the attempt with total time and error count
    async fn complete(&self, req: CompleteRequest) -> Result<()>;
}

/// Tracker that posts to the study backend over HTTP
///
/// Failures are wrapped with the endpoint context and surfaced to the
/// caller; there is no retry.
pub struct HttpTracker {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTracker {
    /// Build a tracker for the given backend base URL
    ///
    /// The bearer token is sent on every request; the API key only when
    /// the deployment requires one.
    pub fn new(
        base_url: impl Into<String>,
        bearer_token: &str,
        api_key: Option<&str>,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", bearer_token)).map_err(|_| {
            AlgespaceError::Config("bearer token is not a valid header value".into())
        })?;
        headers.insert(AUTHORIZATION, bearer);
        if let Some(key) = api_key {
            let key = HeaderValue::from_str(key)
                .map_err(|_| AlgespaceError::Config("API key is not a valid header value".into()))?;
            headers.insert("X-API-Key", key);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| AlgespaceError::network("building http client", e))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!("tracking client targets {}", base_url);
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_empty<B: Serialize + Sync>(&self, path: &'static str, body: &B) -> Result<()> {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| AlgespaceError::network(path, e))?
            .error_for_status()
            .map_err(|e| AlgespaceError::network(path, e))?;
        Ok(())
    }
}

#[async_trait]
impl Tracker for HttpTracker {
    async fn create_entry(&self, req: CreateEntryRequest) -> Result<EntryId> {
        let path = routes::CREATE_ENTRY;
        let response = self
            .client
            .put(self.url(path))
            .json(&req)
            .send()
            .await
            .map_err(|e| AlgespaceError::network(path, e))?
            .error_for_status()
            .map_err(|e| AlgespaceError::network(path, e))?;
        let id: i64 = response
            .json()
            .await
            .map_err(|e| AlgespaceError::network(path, e))?;
        Ok(EntryId(id))
    }

    async fn add_action(&self, req: AddActionRequest) -> Result<()> {
        self.post_empty(routes::ADD_ACTION, &req).await
    }

    async fn track_choice(&self, req: TrackChoiceRequest) -> Result<()> {
        self.post_empty(routes::TRACK_CHOICE, &req).await
    }

    async fn complete_phase(&self, req: CompletePhaseRequest) -> Result<()> {
        self.post_empty(routes::COMPLETE_PHASE, &req).await
    }

    async fn complete(&self, req: CompleteRequest) -> Result<()> {
        self.post_empty(routes::COMPLETE, &req).await
    }
}

/// Tracker for solo mode and declined consent; every call succeeds
/// without touching the network
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracker;

#[async_trait]
impl Tracker for NoopTracker {
    async fn create_entry(&self, _req: CreateEntryRequest) -> Result<EntryId> {
        Ok(EntryId(0))
    }

    async fn add_action(&self, _req: AddActionRequest) -> Result<()> {
        Ok(())
    }

    async fn track_choice(&self, _req: TrackChoiceRequest) -> Result<()> {
        Ok(())
    }

    async fn complete_phase(&self, _req: CompletePhaseRequest) -> Result<()> {
        Ok(())
    }

    async fn complete(&self, _req: CompleteRequest) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_bodies_are_camel_case() {
        let req = CreateEntryRequest {
            user_id: UserId("u-1".into()),
            username: "participant".into(),
            study_id: StudyId(3),
            flexibility_id: ExerciseId(7),
            exercise_id: ExerciseId(2),
            exercise_type: ExerciseKind::Suitability,
            agent_condition: AgentCondition::Agent,
            agent_type: AgentType::Motivational,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["userId"], "u-1");
        assert_eq!(json["studyId"], 3);
        assert_eq!(json["flexibilityId"], 7);
        assert_eq!(json["exerciseType"], "suitability");
        assert_eq!(json["agentCondition"], "agent");
    }

    #[test]
    fn test_phase_completion_omits_absent_choice() {
        let req = CompletePhaseRequest {
            user_id: UserId("u-1".into()),
            username: "participant".into(),
            study_id: StudyId(3),
            id: EntryId(11),
            phase: "system_solution".into(),
            time: 12.5,
            errors: 2,
            choice: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("choice").is_none());
        assert_eq!(json["time"], 12.5);

        let with_choice = CompletePhaseRequest {
            choice: Some("comparison".into()),
            ..req
        };
        let json = serde_json::to_value(&with_choice).unwrap();
        assert_eq!(json["choice"], "comparison");
    }

    #[tokio::test]
    async fn test_noop_tracker_accepts_everything() {
        let tracker = NoopTracker;
        let entry = tracker
            .create_entry(CreateEntryRequest {
                user_id: UserId("solo".into()),
                username: "solo".into(),
                study_id: StudyId(0),
                flexibility_id: ExerciseId(1),
                exercise_id: ExerciseId(1),
                exercise_type: ExerciseKind::Equalization,
                agent_condition: AgentCondition::Control,
                agent_type: AgentType::Neutral,
            })
            .await
            .unwrap();
        assert_eq!(entry, EntryId(0));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let tracker = HttpTracker::new("http://localhost:5161/", "token", None).unwrap();
        assert_eq!(
            tracker.url(routes::COMPLETE),
            "http://localhost:5161/flexibility-study/completeTracking"
        );
    }
}
