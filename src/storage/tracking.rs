//! Tracking entry and event store (studies.db)
//!
//! One `tracking_entries` row per exercise attempt, created by
//! `createEntry` and finalized in place by `completeTracking`. Events hang
//! off the entry in `tracking_events` with a server-assigned sequence
//! number per (entry, phase):
//!
//! - `action` events are append-only
//! - `choice` and `phase_complete` keep at most one row per (entry,
//!   phase); a newer write replaces the older row inside one transaction
//!
//! Creating an entry never clears earlier attempts; re-running an
//! exercise yields a second entry id with its own event log.

use crate::error::{AlgespaceError, Result};
use crate::storage::open_pool;
use crate::types::{AgentCondition, AgentType, EntryId, ExerciseId, ExerciseKind, StudyId, UserId};
use chrono::{DateTime, Utc};
use deadpool_sqlite::Pool;
use rusqlite::params;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tracking_entries (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    study_id        INTEGER NOT NULL,
    user_id         TEXT NOT NULL,
    username        TEXT NOT NULL,
    flexibility_id  INTEGER NOT NULL,
    exercise_id     INTEGER NOT NULL,
    exercise_type   TEXT NOT NULL,
    agent_condition TEXT NOT NULL,
    agent_type      TEXT NOT NULL,
    started_at      TEXT NOT NULL,
    completed_at    TEXT,
    total_time      REAL,
    total_errors    INTEGER
);

CREATE TABLE IF NOT EXISTS tracking_events (
    entry_id    INTEGER NOT NULL REFERENCES tracking_entries(id),
    study_id    INTEGER NOT NULL,
    user_id     TEXT NOT NULL,
    exercise_id INTEGER NOT NULL,
    phase       TEXT NOT NULL,
    seq         INTEGER NOT NULL,
    kind        TEXT NOT NULL,
    payload     TEXT NOT NULL,
    recorded_at TEXT NOT NULL,
    PRIMARY KEY (entry_id, phase, seq)
);

CREATE INDEX IF NOT EXISTS idx_tracking_entries_study
    ON tracking_entries (study_id, user_id);
"#;

/// Fields of a new attempt row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub study_id: StudyId,
    pub user_id: UserId,
    pub username: String,
    pub flexibility_id: ExerciseId,
    pub exercise_id: ExerciseId,
    pub exercise_type: ExerciseKind,
    pub agent_condition: AgentCondition,
    pub agent_type: AgentType,
}

/// A stored attempt row
#[derive(Debug, Clone, PartialEq)]
pub struct EntryRecord {
    pub id: EntryId,
    pub study_id: StudyId,
    pub user_id: UserId,
    pub username: String,
    pub flexibility_id: ExerciseId,
    pub exercise_id: ExerciseId,
    pub exercise_type: ExerciseKind,
    pub agent_condition: AgentCondition,
    pub agent_type: AgentType,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub total_time: Option<f64>,
    pub total_errors: Option<u32>,
}

impl EntryRecord {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Discriminator of a tracking event row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Action,
    Choice,
    PhaseComplete,
}

impl EventKind {
    fn as_str(&self) -> &'static str {
        match self {
            EventKind::Action => "action",
            EventKind::Choice => "choice",
            EventKind::PhaseComplete => "phase_complete",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value {
            "action" => Ok(EventKind::Action),
            "choice" => Ok(EventKind::Choice),
            "phase_complete" => Ok(EventKind::PhaseComplete),
            other => Err(AlgespaceError::Database(format!(
                "Unrecognized event kind '{}'",
                other
            ))),
        }
    }
}

/// One stored event
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub entry_id: EntryId,
    pub phase: String,
    pub seq: i64,
    pub kind: EventKind,
    pub payload: String,
    pub recorded_at: DateTime<Utc>,
}

/// Store for participant tracking data (studies.db)
pub struct TrackingStore {
    pool: Pool,
}

impl TrackingStore {
    /// Open (and create if missing) the tracking database
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = open_pool(db_path).await?;

        let conn = pool.get().await.map_err(|e| {
            AlgespaceError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        conn.interact(|conn| {
            conn.execute_batch(SCHEMA)
                .map_err(|e| AlgespaceError::Database(format!("Failed to create schema: {}", e)))
        })
        .await
        .map_err(|e| AlgespaceError::Database(format!("Pool interaction failed: {}", e)))??;

        Ok(Self { pool })
    }

    /// Insert a new attempt row and return its id
    ///
    /// Always appends; earlier attempts for the same participant and
    /// exercise keep their rows and events.
    pub async fn create_entry(&self, entry: NewEntry) -> Result<EntryId> {
        let conn = self.pool.get().await.map_err(|e| {
            AlgespaceError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        let id = conn
            .interact(move |conn| -> Result<EntryId> {
                conn.execute(
                    "INSERT INTO tracking_entries
                         (study_id, user_id, username, flexibility_id, exercise_id,
                          exercise_type, agent_condition, agent_type, started_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    params![
                        entry.study_id.0,
                        entry.user_id.0,
                        entry.username,
                        entry.flexibility_id.0,
                        entry.exercise_id.0,
                        entry.exercise_type.to_string(),
                        entry.agent_condition.to_string(),
                        entry.agent_type.to_string(),
                        Utc::now().to_rfc3339(),
                    ],
                )
                .map_err(|e| {
                    AlgespaceError::Database(format!("Failed to create entry: {}", e))
                })?;
                Ok(EntryId(conn.last_insert_rowid()))
            })
            .await
            .map_err(|e| AlgespaceError::Database(format!("Pool interaction failed: {}", e)))??;

        debug!("Created tracking entry {}", id);
        Ok(id)
    }

    /// Append an action event to the entry's phase log
    pub async fn add_action(&self, id: EntryId, phase: &str, action: &str) -> Result<()> {
        let phase = phase.to_string();
        let payload = action.to_string();

        let conn = self.pool.get().await.map_err(|e| {
            AlgespaceError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        conn.interact(move |conn| -> Result<()> {
            let inserted = insert_event(conn, id, &phase, EventKind::Action, &payload)?;
            if inserted == 0 {
                return Err(AlgespaceError::EntryNotFound(id));
            }
            Ok(())
        })
        .await
        .map_err(|e| AlgespaceError::Database(format!("Pool interaction failed: {}", e)))??;

        Ok(())
    }

    /// Record the decision made in a phase
    ///
    /// A newer choice for the same (entry, phase) replaces the older one.
    pub async fn record_choice(&self, id: EntryId, phase: &str, choice: &str) -> Result<()> {
        let phase = phase.to_string();
        let payload = choice.to_string();

        let conn = self.pool.get().await.map_err(|e| {
            AlgespaceError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        conn.interact(move |conn| -> Result<()> {
            replace_event(conn, id, &phase, EventKind::Choice, &payload)
        })
        .await
        .map_err(|e| AlgespaceError::Database(format!("Pool interaction failed: {}", e)))??;

        Ok(())
    }

    /// Record a phase completion (elapsed seconds, error count, optional
    /// choice for the comparison/resolve completions)
    ///
    /// A newer completion for the same (entry, phase) replaces the older
    /// one.
    pub async fn complete_phase(
        &self,
        id: EntryId,
        phase: &str,
        time: f64,
        errors: u32,
        choice: Option<&str>,
    ) -> Result<()> {
        let phase = phase.to_string();
        let mut payload = serde_json::json!({ "time": time, "errors": errors });
        if let Some(choice) = choice {
            payload["choice"] = serde_json::Value::String(choice.to_string());
        }
        let payload = payload.to_string();

        let conn = self.pool.get().await.map_err(|e| {
            AlgespaceError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        conn.interact(move |conn| -> Result<()> {
            replace_event(conn, id, &phase, EventKind::PhaseComplete, &payload)
        })
        .await
        .map_err(|e| AlgespaceError::Database(format!("Pool interaction failed: {}", e)))??;

        Ok(())
    }

    /// Finalize an entry with its attempt totals
    pub async fn complete_entry(&self, id: EntryId, time: f64, errors: u32) -> Result<()> {
        let conn = self.pool.get().await.map_err(|e| {
            AlgespaceError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        conn.interact(move |conn| -> Result<()> {
            let updated = conn
                .execute(
                    "UPDATE tracking_entries
                     SET completed_at = ?2, total_time = ?3, total_errors = ?4
                     WHERE id = ?1",
                    params![id.0, Utc::now().to_rfc3339(), time, errors],
                )
                .map_err(|e| {
                    AlgespaceError::Database(format!("Failed to complete entry {}: {}", id, e))
                })?;
            if updated == 0 {
                return Err(AlgespaceError::EntryNotFound(id));
            }
            Ok(())
        })
        .await
        .map_err(|e| AlgespaceError::Database(format!("Pool interaction failed: {}", e)))??;

        debug!("Completed tracking entry {}", id);
        Ok(())
    }

    /// Load one attempt row
    pub async fn entry(&self, id: EntryId) -> Result<EntryRecord> {
        let conn = self.pool.get().await.map_err(|e| {
            AlgespaceError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        let record = conn
            .interact(move |conn| -> Result<EntryRecord> {
                let mut stmt = conn
                    .prepare(
                        "SELECT study_id, user_id, username, flexibility_id, exercise_id,
                                exercise_type, agent_condition, agent_type, started_at,
                                completed_at, total_time, total_errors
                         FROM tracking_entries WHERE id = ?1",
                    )
                    .map_err(|e| {
                        AlgespaceError::Database(format!("Failed to prepare query: {}", e))
                    })?;
                let raw = match stmt.query_row(params![id.0], |row| {
                    Ok(RawEntry {
                        study_id: row.get(0)?,
                        user_id: row.get(1)?,
                        username: row.get(2)?,
                        flexibility_id: row.get(3)?,
                        exercise_id: row.get(4)?,
                        exercise_type: row.get(5)?,
                        agent_condition: row.get(6)?,
                        agent_type: row.get(7)?,
                        started_at: row.get(8)?,
                        completed_at: row.get(9)?,
                        total_time: row.get(10)?,
                        total_errors: row.get(11)?,
                    })
                }) {
                    Ok(raw) => raw,
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        return Err(AlgespaceError::EntryNotFound(id))
                    }
                    Err(e) => {
                        return Err(AlgespaceError::Database(format!(
                            "Failed to load entry {}: {}",
                            id, e
                        )))
                    }
                };
                raw.into_record(id)
            })
            .await
            .map_err(|e| AlgespaceError::Database(format!("Pool interaction failed: {}", e)))??;

        Ok(record)
    }

    /// All events of an entry, in arrival order
    pub async fn events(&self, id: EntryId) -> Result<Vec<EventRecord>> {
        let conn = self.pool.get().await.map_err(|e| {
            AlgespaceError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        let events = conn
            .interact(move |conn| -> Result<Vec<EventRecord>> {
                let mut stmt = conn
                    .prepare(
                        "SELECT phase, seq, kind, payload, recorded_at
                         FROM tracking_events WHERE entry_id = ?1 ORDER BY rowid",
                    )
                    .map_err(|e| {
                        AlgespaceError::Database(format!("Failed to prepare query: {}", e))
                    })?;
                let rows = stmt
                    .query_map(params![id.0], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, String>(4)?,
                        ))
                    })
                    .map_err(|e| {
                        AlgespaceError::Database(format!("Failed to list events: {}", e))
                    })?;

                let mut events = Vec::new();
                for row in rows {
                    let (phase, seq, kind, payload, recorded_at) = row.map_err(|e| {
                        AlgespaceError::Database(format!("Failed to read event row: {}", e))
                    })?;
                    events.push(EventRecord {
                        entry_id: id,
                        phase,
                        seq,
                        kind: EventKind::parse(&kind)?,
                        payload,
                        recorded_at: parse_timestamp(&recorded_at)?,
                    });
                }
                Ok(events)
            })
            .await
            .map_err(|e| AlgespaceError::Database(format!("Pool interaction failed: {}", e)))??;

        Ok(events)
    }
}

struct RawEntry {
    study_id: i64,
    user_id: String,
    username: String,
    flexibility_id: i64,
    exercise_id: i64,
    exercise_type: String,
    agent_condition: String,
    agent_type: String,
    started_at: String,
    completed_at: Option<String>,
    total_time: Option<f64>,
    total_errors: Option<u32>,
}

impl RawEntry {
    fn into_record(self, id: EntryId) -> Result<EntryRecord> {
        let completed_at = match self.completed_at {
            Some(ts) => Some(parse_timestamp(&ts)?),
            None => None,
        };
        Ok(EntryRecord {
            id,
            study_id: StudyId(self.study_id),
            user_id: UserId(self.user_id),
            username: self.username,
            flexibility_id: ExerciseId(self.flexibility_id),
            exercise_id: ExerciseId(self.exercise_id),
            exercise_type: parse_tag(&self.exercise_type)?,
            agent_condition: parse_tag(&self.agent_condition)?,
            agent_type: parse_tag(&self.agent_type)?,
            started_at: parse_timestamp(&self.started_at)?,
            completed_at,
            total_time: self.total_time,
            total_errors: self.total_errors,
        })
    }
}

/// Insert an event with the next sequence number for (entry, phase)
///
/// The entry row is the insert source, so a missing entry inserts zero
/// rows instead of an orphaned event.
fn insert_event(
    conn: &rusqlite::Connection,
    id: EntryId,
    phase: &str,
    kind: EventKind,
    payload: &str,
) -> Result<usize> {
    conn.execute(
        "INSERT INTO tracking_events
             (entry_id, study_id, user_id, exercise_id, phase, seq, kind, payload, recorded_at)
         SELECT e.id, e.study_id, e.user_id, e.exercise_id, ?2,
                COALESCE((SELECT MAX(seq) + 1 FROM tracking_events
                          WHERE entry_id = ?1 AND phase = ?2), 0),
                ?3, ?4, ?5
         FROM tracking_entries e WHERE e.id = ?1",
        params![id.0, phase, kind.as_str(), payload, Utc::now().to_rfc3339()],
    )
    .map_err(|e| AlgespaceError::Database(format!("Failed to store event: {}", e)))
}

/// Replace the (entry, phase) row of a single-instance event kind
fn replace_event(
    conn: &mut rusqlite::Connection,
    id: EntryId,
    phase: &str,
    kind: EventKind,
    payload: &str,
) -> Result<()> {
    let tx = conn
        .transaction()
        .map_err(|e| AlgespaceError::Database(format!("Failed to start transaction: {}", e)))?;

    tx.execute(
        "DELETE FROM tracking_events WHERE entry_id = ?1 AND phase = ?2 AND kind = ?3",
        params![id.0, phase, kind.as_str()],
    )
    .map_err(|e| AlgespaceError::Database(format!("Failed to clear event: {}", e)))?;

    let inserted = insert_event(&tx, id, phase, kind, payload)?;
    if inserted == 0 {
        // Transaction rolls back on drop
        return Err(AlgespaceError::EntryNotFound(id));
    }

    tx.commit()
        .map_err(|e| AlgespaceError::Database(format!("Failed to commit: {}", e)))
}

fn parse_tag<T: serde::de::DeserializeOwned>(value: &str) -> Result<T> {
    serde_json::from_str(&format!("\"{}\"", value))
        .map_err(|_| AlgespaceError::Database(format!("Unrecognized tag '{}'", value)))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AlgespaceError::Database(format!("Bad timestamp '{}': {}", value, e)))
}
