//! Per-attempt recording state used by the exercise sessions
//!
//! `SessionRecorder` owns the stopwatch and error counters for the current
//! phase and fans calls out to a `Tracker`. Only `createEntry` is awaited
//! (its id keys everything else); all later calls are spawned onto the
//! runtime so a session never waits for telemetry. Spawned handles are
//! kept in a `JoinSet` so `flush` can await stragglers at exercise end.
//!
//! Ordering between calls emitted for the same phase is not guaranteed;
//! the backend assigns sequence numbers on arrival.

use super::client::{
    AddActionRequest, CompletePhaseRequest, CompleteRequest, CreateEntryRequest,
    TrackChoiceRequest, Tracker,
};
use crate::error::Result;
use crate::types::{AgentCondition, AgentType, EntryId, ExerciseId, ExerciseKind, StudyId, UserId};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Identity of one tracked exercise attempt
#[derive(Debug, Clone)]
pub struct AttemptInfo {
    pub user_id: UserId,
    pub username: String,
    pub study_id: StudyId,
    pub flexibility_id: ExerciseId,
    pub exercise_id: ExerciseId,
    pub exercise_type: ExerciseKind,
    pub agent_condition: AgentCondition,
    pub agent_type: AgentType,
}

/// Recorder for one exercise attempt
///
/// A disabled recorder (solo mode) accepts every call and does nothing,
/// so session code never branches on consent.
pub struct SessionRecorder {
    inner: Option<Recording>,
}

struct Recording {
    tracker: Arc<dyn Tracker>,
    info: AttemptInfo,
    entry: EntryId,
    started: Instant,
    phase_started: Option<Instant>,
    phase_errors: u32,
    total_errors: u32,
    tasks: JoinSet<()>,
}

impl SessionRecorder {
    /// Start recording: registers the attempt and stores the entry id
    ///
    /// This is the only awaited tracking call. If it fails the attempt is
    /// not recorded and the caller decides whether to continue untracked.
    pub async fn start(tracker: Arc<dyn Tracker>, info: AttemptInfo) -> Result<Self> {
        let req = CreateEntryRequest {
            user_id: info.user_id.clone(),
            username: info.username.clone(),
            study_id: info.study_id,
            flexibility_id: info.flexibility_id,
            exercise_id: info.exercise_id,
            exercise_type: info.exercise_type,
            agent_condition: info.agent_condition,
            agent_type: info.agent_type,
        };
        let entry = tracker.create_entry(req).await?;
        debug!("tracking entry {} opened for user {}", entry, info.user_id);

        Ok(Self {
            inner: Some(Recording {
                tracker,
                info,
                entry,
                started: Instant::now(),
                phase_started: None,
                phase_errors: 0,
                total_errors: 0,
                tasks: JoinSet::new(),
            }),
        })
    }

    /// Recorder that drops everything (solo mode / declined consent)
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Entry id of the running attempt, if recording
    pub fn entry(&self) -> Option<EntryId> {
        self.inner.as_ref().map(|rec| rec.entry)
    }

    /// Errors counted so far in the current phase
    pub fn phase_errors(&self) -> u32 {
        self.inner.as_ref().map(|rec| rec.phase_errors).unwrap_or(0)
    }

    /// Errors counted over the whole attempt
    pub fn total_errors(&self) -> u32 {
        self.inner.as_ref().map(|rec| rec.total_errors).unwrap_or(0)
    }

    /// Start the stopwatch for a phase and reset its error counter
    pub fn begin_phase(&mut self) {
        if let Some(rec) = &mut self.inner {
            rec.phase_started = Some(Instant::now());
            rec.phase_errors = 0;
        }
    }

    /// Count one recoverable mistake in the current phase
    pub fn log_error(&mut self) {
        if let Some(rec) = &mut self.inner {
            rec.phase_errors += 1;
            rec.total_errors += 1;
        }
    }

    /// Append a free-text action description to the phase log
    pub fn log_action(&mut self, phase: &str, action: &str) {
        let Some(rec) = &mut self.inner else { return };
        let tracker = rec.tracker.clone();
        let req = AddActionRequest {
            user_id: rec.info.user_id.clone(),
            username: rec.info.username.clone(),
            study_id: rec.info.study_id,
            id: rec.entry,
            phase: phase.to_string(),
            action: action.to_string(),
        };
        rec.tasks.spawn(forward("addActionToEntry", async move {
            tracker.add_action(req).await
        }));
    }

    /// Record a discrete decision for the current phase
    pub fn record_choice(&mut self, phase: &str, choice: &str) {
        let Some(rec) = &mut self.inner else { return };
        let tracker = rec.tracker.clone();
        let req = TrackChoiceRequest {
            user_id: rec.info.user_id.clone(),
            username: rec.info.username.clone(),
            study_id: rec.info.study_id,
            id: rec.entry,
            phase: phase.to_string(),
            choice: choice.to_string(),
        };
        rec.tasks.spawn(forward("trackChoice", async move {
            tracker.track_choice(req).await
        }));
    }

    /// Close the current phase: emit its elapsed time and error count
    ///
    /// `choice` carries the comparison/resolve decision where one exists.
    pub fn finish_phase(&mut self, phase: &str, choice: Option<String>) {
        let Some(rec) = &mut self.inner else { return };
        let time = rec
            .phase_started
            .take()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let errors = std::mem::take(&mut rec.phase_errors);

        let tracker = rec.tracker.clone();
        let req = CompletePhaseRequest {
            user_id: rec.info.user_id.clone(),
            username: rec.info.username.clone(),
            study_id: rec.info.study_id,
            id: rec.entry,
            phase: phase.to_string(),
            time,
            errors,
            choice,
        };
        rec.tasks.spawn(forward("completePhaseTracking", async move {
            tracker.complete_phase(req).await
        }));
    }

    /// Finalize the attempt with wall-clock total time and total errors
    pub fn finish(&mut self) {
        let Some(rec) = &mut self.inner else { return };
        let tracker = rec.tracker.clone();
        let req = CompleteRequest {
            user_id: rec.info.user_id.clone(),
            username: rec.info.username.clone(),
            study_id: rec.info.study_id,
            id: rec.entry,
            time: rec.started.elapsed().as_secs_f64(),
            errors: rec.total_errors,
        };
        rec.tasks.spawn(forward("completeTracking", async move {
            tracker.complete(req).await
        }));
    }

    /// Await every spawned tracking call still in flight
    pub async fn flush(&mut self) {
        let Some(rec) = &mut self.inner else { return };
        while let Some(joined) = rec.tasks.join_next().await {
            if let Err(e) = joined {
                warn!("tracking task panicked: {}", e);
            }
        }
    }
}

async fn forward<F>(endpoint: &'static str, fut: F)
where
    F: std::future::Future<Output = Result<()>> + Send,
{
    if let Err(e) = fut.await {
        warn!("{} failed: {}", endpoint, e);
    }
}
