//! Exercise definition and study composition store
//!
//! Definitions are opaque JSON documents to SQL; the id (and a kind tag
//! for flexibility exercises) is the only indexed structure. Studies are
//! an ordered list of (exercise id, exercise type) references.

use crate::error::{AlgespaceError, Result};
use crate::exercises::{EqualizationExercise, FlexibilityExercise};
use crate::storage::open_pool;
use crate::types::{ExerciseId, ExerciseKind, StudyId};
use deadpool_sqlite::Pool;
use rusqlite::params;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS equalization_exercises (
    id         INTEGER PRIMARY KEY,
    definition TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS flexibility_exercises (
    id         INTEGER PRIMARY KEY,
    kind       TEXT NOT NULL,
    definition TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS studies (
    id   INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS study_exercises (
    study_id      INTEGER NOT NULL REFERENCES studies(id),
    position      INTEGER NOT NULL,
    exercise_id   INTEGER NOT NULL,
    exercise_type TEXT NOT NULL,
    PRIMARY KEY (study_id, position)
);
"#;

/// One slot in a study's ordered exercise list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyExerciseRef {
    pub exercise_id: ExerciseId,
    pub exercise_type: ExerciseKind,
}

/// A study and the exercises it presents, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyDefinition {
    pub id: StudyId,
    pub name: String,
    pub exercises: Vec<StudyExerciseRef>,
}

/// Store for authored exercise definitions (exercises.db)
pub struct ExerciseStore {
    pool: Pool,
}

impl ExerciseStore {
    /// Open (and create if missing) the definition database
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

    /// Insert or replace an equalization exercise definition
    ///
    /// The definition is validated before anything touches the database.
    pub async fn put_equalization(&self, exercise: &EqualizationExercise) -> Result<()> {
        exercise.validate()?;
        let id = exercise.id;
        let json = serde_json::to_string(exercise)?;

        let conn = self.pool.get().await.map_err(|e| {
            AlgespaceError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        conn.interact(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO equalization_exercises (id, definition) VALUES (?1, ?2)",
                params![id.0, json],
            )
            .map_err(|e| {
                AlgespaceError::Database(format!("Failed to store exercise {}: {}", id, e))
            })
        })
        .await
        .map_err(|e| AlgespaceError::Database(format!("Pool interaction failed: {}", e)))??;

        debug!("Stored equalization exercise {}", id);
        Ok(())
    }

    /// Insert or replace a flexibility exercise definition
    pub async fn put_flexibility(&self, exercise: &FlexibilityExercise) -> Result<()> {
        exercise.validate()?;
        let id = exercise.id;
        let kind = exercise.kind.to_string();
        let json = serde_json::to_string(exercise)?;

        let conn = self.pool.get().await.map_err(|e| {
            AlgespaceError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        conn.interact(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO flexibility_exercises (id, kind, definition)
                 VALUES (?1, ?2, ?3)",
                params![id.0, kind, json],
            )
            .map_err(|e| {
                AlgespaceError::Database(format!("Failed to store exercise {}: {}", id, e))
            })
        })
        .await
        .map_err(|e| AlgespaceError::Database(format!("Pool interaction failed: {}", e)))??;

        debug!("Stored flexibility exercise {}", id);
        Ok(())
    }

    /// Load an equalization exercise by id
    pub async fn get_equalization(&self, id: ExerciseId) -> Result<EqualizationExercise> {
        let conn = self.pool.get().await.map_err(|e| {
            AlgespaceError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        let exercise = conn
            .interact(move |conn| -> Result<EqualizationExercise> {
                let mut stmt = conn
                    .prepare("SELECT definition FROM equalization_exercises WHERE id = ?1")
                    .map_err(|e| {
                        AlgespaceError::Database(format!("Failed to prepare query: {}", e))
                    })?;
                let json: String = match stmt.query_row(params![id.0], |row| row.get(0)) {
                    Ok(json) => json,
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        return Err(AlgespaceError::ExerciseNotFound {
                            family: "equalization",
                            id,
                        })
                    }
                    Err(e) => {
                        return Err(AlgespaceError::Database(format!(
                            "Failed to load exercise {}: {}",
                            id, e
                        )))
                    }
                };
                let exercise: EqualizationExercise = serde_json::from_str(&json)?;
                exercise.validate()?;
                Ok(exercise)
            })
            .await
            .map_err(|e| AlgespaceError::Database(format!("Pool interaction failed: {}", e)))??;

        Ok(exercise)
    }

    /// Load a flexibility exercise by id
    pub async fn get_flexibility(&self, id: ExerciseId) -> Result<FlexibilityExercise> {
        let conn = self.pool.get().await.map_err(|e| {
            AlgespaceError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        let exercise = conn
            .interact(move |conn| -> Result<FlexibilityExercise> {
                let mut stmt = conn
                    .prepare("SELECT definition FROM flexibility_exercises WHERE id = ?1")
                    .map_err(|e| {
                        AlgespaceError::Database(format!("Failed to prepare query: {}", e))
                    })?;
                let json: String = match stmt.query_row(params![id.0], |row| row.get(0)) {
                    Ok(json) => json,
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        return Err(AlgespaceError::ExerciseNotFound {
                            family: "flexibility",
                            id,
                        })
                    }
                    Err(e) => {
                        return Err(AlgespaceError::Database(format!(
                            "Failed to load exercise {}: {}",
                            id, e
                        )))
                    }
                };
                let exercise: FlexibilityExercise = serde_json::from_str(&json)?;
                exercise.validate()?;
                Ok(exercise)
            })
            .await
            .map_err(|e| AlgespaceError::Database(format!("Pool interaction failed: {}", e)))??;

        Ok(exercise)
    }

    /// Insert or replace a study and its ordered exercise list
    ///
    /// Replaces only the composition rows for this study; tracking data
    /// lives in a different database and is never touched here.
    pub async fn put_study(&self, study: &StudyDefinition) -> Result<()> {
        let study = study.clone();

        let conn = self.pool.get().await.map_err(|e| {
            AlgespaceError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        conn.interact(move |conn| -> Result<()> {
            let tx = conn.transaction().map_err(|e| {
                AlgespaceError::Database(format!("Failed to start transaction: {}", e))
            })?;

            tx.execute(
                "INSERT OR REPLACE INTO studies (id, name) VALUES (?1, ?2)",
                params![study.id.0, study.name],
            )
            .map_err(|e| {
                AlgespaceError::Database(format!("Failed to store study {}: {}", study.id, e))
            })?;

            tx.execute(
                "DELETE FROM study_exercises WHERE study_id = ?1",
                params![study.id.0],
            )
            .map_err(|e| {
                AlgespaceError::Database(format!("Failed to clear study {}: {}", study.id, e))
            })?;

            for (position, slot) in study.exercises.iter().enumerate() {
                tx.execute(
                    "INSERT INTO study_exercises (study_id, position, exercise_id, exercise_type)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        study.id.0,
                        position as i64,
                        slot.exercise_id.0,
                        slot.exercise_type.to_string()
                    ],
                )
                .map_err(|e| {
                    AlgespaceError::Database(format!(
                        "Failed to store study {} slot {}: {}",
                        study.id, position, e
                    ))
                })?;
            }

            tx.commit()
                .map_err(|e| AlgespaceError::Database(format!("Failed to commit: {}", e)))
        })
        .await
        .map_err(|e| AlgespaceError::Database(format!("Pool interaction failed: {}", e)))??;

        Ok(())
    }

    /// The ordered exercise list of a study
    pub async fn study_exercises(&self, id: StudyId) -> Result<Vec<StudyExerciseRef>> {
        let conn = self.pool.get().await.map_err(|e| {
            AlgespaceError::Database(format!("Failed to get connection from pool: {}", e))
        })?;
        let slots = conn
            .interact(move |conn| -> Result<Vec<StudyExerciseRef>> {
                let known: bool = conn
                    .query_row(
                        "SELECT EXISTS(SELECT 1 FROM studies WHERE id = ?1)",
                        params![id.0],
                        |row| row.get(0),
                    )
                    .map_err(|e| {
                        AlgespaceError::Database(format!("Failed to look up study {}: {}", id, e))
                    })?;
                if !known {
                    return Err(AlgespaceError::StudyNotFound(id));
                }

                let mut stmt = conn
                    .prepare(
                        "SELECT exercise_id, exercise_type FROM study_exercises
                         WHERE study_id = ?1 ORDER BY position",
                    )
                    .map_err(|e| {
                        AlgespaceError::Database(format!("Failed to prepare query: {}", e))
                    })?;
                let rows = stmt
                    .query_map(params![id.0], |row| {
                        Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                    })
                    .map_err(|e| {
                        AlgespaceError::Database(format!("Failed to list study {}: {}", id, e))
                    })?;

                let mut slots = Vec::new();
                for row in rows {
                    let (exercise_id, kind) = row.map_err(|e| {
                        AlgespaceError::Database(format!("Failed to read study row: {}", e))
                    })?;
                    slots.push(StudyExerciseRef {
                        exercise_id: ExerciseId(exercise_id),
                        exercise_type: parse_kind(&kind)?,
                    });
                }
                Ok(slots)
            })
            .await
            .map_err(|e| AlgespaceError::Database(format!("Pool interaction failed: {}", e)))??;

        Ok(slots)
    }

    /// Load the built-in exercise catalog and the demo study
    ///
    /// Upserts definitions only; safe to run repeatedly.
    pub async fn seed_defaults(&self) -> Result<StudyId> {
        let catalog = super::catalog::default_catalog();

        for exercise in &catalog.equalization {
            self.put_equalization(exercise).await?;
        }
        for exercise in &catalog.flexibility {
            self.put_flexibility(exercise).await?;
        }
        self.put_study(&catalog.study).await?;

        info!(
            "Seeded {} equalization and {} flexibility exercises into study {}",
            catalog.equalization.len(),
            catalog.flexibility.len(),
            catalog.study.id
        );
        Ok(catalog.study.id)
    }
}

fn parse_kind(value: &str) -> Result<ExerciseKind> {
    serde_json::from_str(&format!("\"{}\"", value))
        .map_err(|_| AlgespaceError::Database(format!("Unrecognized exercise kind '{}'", value)))
}
