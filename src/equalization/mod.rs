//! The equalization drag-and-drop exercise
//!
//! Split into the pure game model (`game`), drag resolution (`actions`),
//! scale verification (`verify`), and the phase-sequencing session driver
//! (`session`). The first three are free of I/O and tracking concerns.

pub mod actions;
pub mod game;
pub mod session;
pub mod verify;

pub use actions::{resolve_drag, DragMove, DragOutcome, RejectReason};
pub use game::{GameHistory, GameState, Item, ItemKind, Zone};
pub use session::{EqualizationPhase, EqualizationSession, RelationAnswer};
pub use verify::{
    verify_equalization, verify_simplification, verify_weight, EqualizationMistake,
    VerificationOutcome,
};
