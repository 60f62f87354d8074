//! Persistence layer for the study backend
//!
//! Two separate SQLite databases: `exercises.db` holds the authored
//! exercise definitions and study compositions, `studies.db` holds the
//! tracking data collected from participants. Each gets its own
//! connection pool; all database work runs inside `interact` closures on
//! the pool's blocking threads.

pub mod catalog;
pub mod exercises;
pub mod tracking;

pub use exercises::{ExerciseStore, StudyDefinition, StudyExerciseRef};
pub use tracking::{EntryRecord, EventKind, EventRecord, NewEntry, TrackingStore};

use crate::error::{AlgespaceError, Result};
use deadpool_sqlite::{Config, Pool, Runtime};
use std::path::Path;
use tracing::info;

/// Open a pooled connection to one database file
///
/// The parent directory is created if missing. WAL mode is persistent, so
/// setting it once on the first connection covers the pool.
pub(crate) async fn open_pool(db_path: &Path) -> Result<Pool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let path_str = db_path.to_string_lossy().to_string();
    info!("Opening database: {}", path_str);

    let config = Config::new(path_str);
    let pool = config.create_pool(Runtime::Tokio1).map_err(|e| {
        AlgespaceError::Database(format!("Failed to create connection pool: {}", e))
    })?;

    let conn = pool.get().await.map_err(|e| {
        AlgespaceError::Database(format!("Failed to get connection from pool: {}", e))
    })?;
    conn.interact(|conn| -> Result<()> {
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| AlgespaceError::Database(format!("Failed to enable WAL mode: {}", e)))?;
        conn.pragma_update(None, "foreign_keys", "ON").map_err(|e| {
            AlgespaceError::Database(format!("Failed to enable foreign keys: {}", e))
        })?;
        Ok(())
    })
    .await
    .map_err(|e| AlgespaceError::Database(format!("Pool interaction failed: {}", e)))??;

    Ok(pool)
}
