//! Telemetry client for study sessions
//!
//! One attempt emits a strictly ordered call sequence: `createEntry` first
//! (its returned id keys every later call), then phase-scoped actions,
//! choices, and phase completions, then `completeTracking` once at the end.
//! Everything after `createEntry` is fire-and-forget; the state machines
//! never block phase advancement on telemetry.

pub mod client;
pub mod recorder;

pub use client::{
    AddActionRequest, CompletePhaseRequest, CompleteRequest, CreateEntryRequest, HttpTracker,
    NoopTracker, TrackChoiceRequest, Tracker,
};
pub use recorder::{AttemptInfo, SessionRecorder};

/// Wire paths shared by the client and the HTTP server
pub mod routes {
    pub const CREATE_ENTRY: &str = "/flexibility-study/createEntry";
    pub const ADD_ACTION: &str = "/flexibility-study/addActionToEntry";
    pub const TRACK_CHOICE: &str = "/flexibility-study/trackChoice";
    pub const COMPLETE_PHASE: &str = "/flexibility-study/completePhaseTracking";
    pub const COMPLETE: &str = "/flexibility-study/completeTracking";
}
