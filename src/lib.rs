//! AlgeSpace - Linear-System Exercises with Study Telemetry
//!
//! A Rust backend and game-logic library for algebra learning studies:
//! - Drag-and-drop equalization exercises on a balance scale
//! - Flexibility training (suitability, efficiency, matching) for solution methods
//! - Strictly ordered per-attempt telemetry with replace-on-repeat semantics
//! - SQLite-backed exercise catalog and tracking storage behind an HTTP API
//!
//! # Architecture
//!
//! The crate is organized into layers:
//! - **Types**: Shared identifiers and enums (`StudyId`, `Method`, `ExerciseKind`)
//! - **Exercises**: Immutable definitions and the equation/expression model
//! - **Game logic**: The equalization and flexibility session state machines
//! - **Tracking**: The telemetry client and the per-attempt recorder
//! - **Storage**: Exercise and tracking databases (SQLite via a deadpool pool)
//! - **Api**: The axum HTTP server exposing the study contract
//!
//! # Example
//!
//! ```ignore
//! use algespace::{api::StudyServer, config::Settings, storage::ExerciseStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load("algespace.toml".as_ref())?;
//!
//!     // Seed the default catalog once, then serve the study API
//!     let exercises = ExerciseStore::open(&settings.database.exercises_path).await?;
//!     exercises.seed_defaults().await?;
//!
//!     StudyServer::new(settings).await?.serve().await
//! }
//! ```

pub mod api;
pub mod config;
pub mod equalization;
pub mod error;
pub mod exercises;
pub mod flexibility;
pub mod math;
pub mod progress;
pub mod storage;
pub mod tracking;
pub mod types;

// Re-export commonly used types
pub use config::Settings;
pub use error::{AlgespaceError, Result};
pub use exercises::{EqualizationExercise, FlexibilityExercise, LinearEquation, SystemSolution};
pub use math::Fraction;
pub use types::{
    AgentCondition, AgentType, EntryId, ExerciseId, ExerciseKind, Method, StudyId, UserId,
};
