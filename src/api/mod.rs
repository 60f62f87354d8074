//! HTTP API of the study backend
//!
//! Provides:
//! - The tracking contract (entry creation, actions, choices, completions)
//! - Exercise definition and study composition lookups
//! - Bearer/API-key authentication with an open health check

pub mod auth;
pub mod handlers;
pub mod server;

pub use handlers::ApiError;
pub use server::{AppState, StudyServer};
