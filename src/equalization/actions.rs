//! Drag-release resolution for the balance-scale board
//!
//! Every release event resolves against the current snapshot. Rejected
//! drops change nothing (the session still logs them); accepted drops
//! produce a new snapshot pushed onto the history.

use super::game::{GameHistory, GameState, ItemKind, Zone};
use crate::exercises::EqualizationExercise;
use std::fmt;
use tracing::warn;

/// One drag-release event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragMove {
    pub item: ItemKind,
    pub source: Zone,
    /// `None` when the item was dropped outside every zone
    pub target: Option<Zone>,
}

impl DragMove {
    pub fn new(item: ItemKind, source: Zone, target: Option<Zone>) -> Self {
        Self {
            item,
            source,
            target,
        }
    }
}

impl fmt::Display for DragMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Some(target) => write!(f, "drag {} from {} to {}", self.item, self.source, target),
            None => write!(f, "drag {} from {} dropped outside", self.item, self.source),
        }
    }
}

/// Why a drop was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Dropped outside every zone
    OutsideZone,
    /// Target equals the source
    SameZone,
    /// Target pan already holds the capacity limit
    PanFull,
    /// Item dropped on a shelf that does not hold its kind
    ShelfMismatch,
    /// Source zone holds no such item
    MissingItem,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RejectReason::OutsideZone => "outside_zone",
            RejectReason::SameZone => "same_zone",
            RejectReason::PanFull => "pan_full",
            RejectReason::ShelfMismatch => "shelf_mismatch",
            RejectReason::MissingItem => "missing_item",
        };
        write!(f, "{}", name)
    }
}

/// Result of resolving one drag-release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Accepted,
    Rejected(RejectReason),
}

impl DragOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DragOutcome::Accepted)
    }
}

impl fmt::Display for DragOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DragOutcome::Accepted => write!(f, "accepted"),
            DragOutcome::Rejected(reason) => write!(f, "rejected ({})", reason),
        }
    }
}

/// Resolve a drag-release against the current snapshot
///
/// On acceptance a new `GameState` is pushed onto the history and becomes
/// current; on rejection the history is untouched.
pub fn resolve_drag(
    history: &mut GameHistory,
    exercise: &EqualizationExercise,
    mv: &DragMove,
) -> DragOutcome {
    let Some(target) = mv.target else {
        return DragOutcome::Rejected(RejectReason::OutsideZone);
    };
    if target == mv.source {
        return DragOutcome::Rejected(RejectReason::SameZone);
    }
    if mv.source.is_shelf() && mv.source != mv.item.home_shelf() {
        return DragOutcome::Rejected(RejectReason::ShelfMismatch);
    }
    if target.is_shelf() && target != mv.item.home_shelf() {
        return DragOutcome::Rejected(RejectReason::ShelfMismatch);
    }
    if target.is_pan() && history.current().pan_len(target) >= exercise.pan_capacity as usize {
        return DragOutcome::Rejected(RejectReason::PanFull);
    }

    let mut next: GameState = history.current().clone();

    let removed = if mv.source.is_pan() {
        next.remove_from_pan(mv.source, mv.item)
    } else {
        next.take_from_shelf(mv.item)
    };
    if !removed {
        // Source out of sync with the reported move. Game data is
        // inconsistent; reject and leave the snapshot untouched.
        warn!("drag from {} claims an item {} it does not hold", mv.source, mv.item);
        return DragOutcome::Rejected(RejectReason::MissingItem);
    }

    let added = if target.is_pan() {
        next.add_to_pan(target, mv.item)
    } else {
        next.return_to_shelf(mv.item)
    };
    if !added {
        warn!("drop target {} cannot hold item {}", target, mv.item);
        return DragOutcome::Rejected(RejectReason::MissingItem);
    }

    history.push(next);
    DragOutcome::Accepted
}
