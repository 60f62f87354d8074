//! Game state for the equalization drag-and-drop puzzle
//!
//! A `GameState` is one immutable snapshot of item placement: how many
//! items of each kind remain on the shelves and which items sit on the
//! two scale pans. Every accepted action produces a new snapshot; the
//! ordered snapshots form a `GameHistory` navigated by undo/redo.
//!
//! Invariant: for every item kind, the total across shelf and both pans
//! is conserved by every action within a phase.

use crate::exercises::{EqualizationExercise, WeightStock};
use std::fmt;

/// Kind of draggable item on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// The variable being solved for (must stay off the balance scale)
    Isolated,
    /// The second variable
    Second,
    /// A weight of the given denomination
    Weight(i64),
}

impl ItemKind {
    /// The shelf zone this kind of item belongs to
    pub fn home_shelf(&self) -> Zone {
        match self {
            ItemKind::Isolated => Zone::IsolatedShelf,
            ItemKind::Second => Zone::SecondShelf,
            ItemKind::Weight(_) => Zone::WeightsShelf,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Isolated => write!(f, "isolated"),
            ItemKind::Second => write!(f, "second"),
            ItemKind::Weight(d) => write!(f, "{}kg", d),
        }
    }
}

/// A single item placed on a pan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub kind: ItemKind,
}

impl Item {
    pub fn new(kind: ItemKind) -> Self {
        Self { kind }
    }

    /// True weight of the item, resolved against the exercise definition
    pub fn weight(&self, exercise: &EqualizationExercise) -> i64 {
        match self.kind {
            ItemKind::Isolated => exercise.isolated.weight,
            ItemKind::Second => exercise.second.weight,
            ItemKind::Weight(d) => d,
        }
    }
}

/// Board zones items can be dragged between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    IsolatedShelf,
    SecondShelf,
    WeightsShelf,
    LeftPan,
    RightPan,
}

impl Zone {
    pub fn is_pan(&self) -> bool {
        matches!(self, Zone::LeftPan | Zone::RightPan)
    }

    pub fn is_shelf(&self) -> bool {
        !self.is_pan()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::IsolatedShelf => "isolated_shelf",
            Zone::SecondShelf => "second_shelf",
            Zone::WeightsShelf => "weights_shelf",
            Zone::LeftPan => "left_pan",
            Zone::RightPan => "right_pan",
        };
        write!(f, "{}", name)
    }
}

/// Immutable snapshot of item placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub isolated_on_shelf: u32,
    pub second_on_shelf: u32,
    pub weights_on_shelf: Vec<WeightStock>,
    pub left_pan: Vec<Item>,
    pub right_pan: Vec<Item>,
}

impl GameState {
    /// Starting placement for the balance-scale phases
    ///
    /// Shelf stock is derived from the system: one isolated item per
    /// equation, and exactly the second-variable items the two equations
    /// mention. Weight stock comes from the exercise definition.
    pub fn initial(exercise: &EqualizationExercise) -> Self {
        Self {
            isolated_on_shelf: 2,
            second_on_shelf: exercise.left.second_count + exercise.right.second_count,
            weights_on_shelf: exercise.weights.clone(),
            left_pan: Vec::new(),
            right_pan: Vec::new(),
        }
    }

    /// Starting placement for the digital-scale phase
    ///
    /// The isolated variable is out of play here: its weight is what the
    /// user is asked to determine, so it cannot be placed on the scale.
    pub fn digital_scale(exercise: &EqualizationExercise) -> Self {
        Self {
            isolated_on_shelf: 0,
            ..Self::initial(exercise)
        }
    }

    /// Items currently on a pan zone
    pub fn pan(&self, zone: Zone) -> Option<&[Item]> {
        match zone {
            Zone::LeftPan => Some(&self.left_pan),
            Zone::RightPan => Some(&self.right_pan),
            _ => None,
        }
    }

    fn pan_mut(&mut self, zone: Zone) -> Option<&mut Vec<Item>> {
        match zone {
            Zone::LeftPan => Some(&mut self.left_pan),
            Zone::RightPan => Some(&mut self.right_pan),
            _ => None,
        }
    }

    /// Number of items on a pan
    pub fn pan_len(&self, zone: Zone) -> usize {
        self.pan(zone).map(|items| items.len()).unwrap_or(0)
    }

    /// Remaining shelf stock for an item kind
    pub fn shelf_count(&self, kind: ItemKind) -> u32 {
        match kind {
            ItemKind::Isolated => self.isolated_on_shelf,
            ItemKind::Second => self.second_on_shelf,
            ItemKind::Weight(d) => self
                .weights_on_shelf
                .iter()
                .find(|s| s.denomination == d)
                .map(|s| s.amount)
                .unwrap_or(0),
        }
    }

    /// Take one item of the kind off its shelf; false if none remain
    pub(crate) fn take_from_shelf(&mut self, kind: ItemKind) -> bool {
        match kind {
            ItemKind::Isolated => {
                if self.isolated_on_shelf == 0 {
                    return false;
                }
                self.isolated_on_shelf -= 1;
                true
            }
            ItemKind::Second => {
                if self.second_on_shelf == 0 {
                    return false;
                }
                self.second_on_shelf -= 1;
                true
            }
            ItemKind::Weight(d) => {
                match self
                    .weights_on_shelf
                    .iter_mut()
                    .find(|s| s.denomination == d && s.amount > 0)
                {
                    Some(stock) => {
                        stock.amount -= 1;
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Put one item of the kind back on its shelf; false for a weight
    /// denomination the shelf never carried
    pub(crate) fn return_to_shelf(&mut self, kind: ItemKind) -> bool {
        match kind {
            ItemKind::Isolated => {
                self.isolated_on_shelf += 1;
                true
            }
            ItemKind::Second => {
                self.second_on_shelf += 1;
                true
            }
            ItemKind::Weight(d) => {
                match self
                    .weights_on_shelf
                    .iter_mut()
                    .find(|s| s.denomination == d)
                {
                    Some(stock) => {
                        stock.amount += 1;
                        true
                    }
                    None => false,
                }
            }
        }
    }

    /// Remove one item of the kind from a pan; false if absent
    pub(crate) fn remove_from_pan(&mut self, zone: Zone, kind: ItemKind) -> bool {
        let Some(items) = self.pan_mut(zone) else {
            return false;
        };
        match items.iter().rposition(|item| item.kind == kind) {
            Some(idx) => {
                items.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Append one item of the kind to a pan
    pub(crate) fn add_to_pan(&mut self, zone: Zone, kind: ItemKind) -> bool {
        match self.pan_mut(zone) {
            Some(items) => {
                items.push(Item::new(kind));
                true
            }
            None => false,
        }
    }

    /// Total weight of the items on a pan
    pub fn pan_weight(&self, zone: Zone, exercise: &EqualizationExercise) -> i64 {
        self.pan(zone)
            .map(|items| items.iter().map(|item| item.weight(exercise)).sum())
            .unwrap_or(0)
    }

    /// Number of second-variable items on a pan
    pub fn second_count(&self, zone: Zone) -> u32 {
        self.pan(zone)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.kind == ItemKind::Second)
                    .count() as u32
            })
            .unwrap_or(0)
    }

    /// Whether a pan holds the isolated variable
    pub fn contains_isolated(&self, zone: Zone) -> bool {
        self.pan(zone)
            .map(|items| items.iter().any(|item| item.kind == ItemKind::Isolated))
            .unwrap_or(false)
    }

    /// Total count of an item kind across shelf and both pans
    pub fn kind_total(&self, kind: ItemKind) -> u32 {
        let on_pans = [Zone::LeftPan, Zone::RightPan]
            .iter()
            .map(|&zone| {
                self.pan(zone)
                    .map(|items| items.iter().filter(|i| i.kind == kind).count() as u32)
                    .unwrap_or(0)
            })
            .sum::<u32>();
        self.shelf_count(kind) + on_pans
    }
}

/// Undo/redo history of game states, addressed by a cursor
///
/// Past entries are never mutated. Pushing after an undo discards the
/// redo tail first.
#[derive(Debug, Clone)]
pub struct GameHistory {
    states: Vec<GameState>,
    cursor: usize,
}

impl GameHistory {
    pub fn new(initial: GameState) -> Self {
        Self {
            states: vec![initial],
            cursor: 0,
        }
    }

    /// Snapshot at the cursor
    pub fn current(&self) -> &GameState {
        &self.states[self.cursor]
    }

    /// Append a snapshot, discarding any redo tail, and make it current
    pub fn push(&mut self, state: GameState) {
        self.states.truncate(self.cursor + 1);
        self.states.push(state);
        self.cursor = self.states.len() - 1;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.states.len()
    }

    /// Move the cursor one step back; false at the initial state
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Move the cursor one step forward; false at the newest state
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::equalization::barrel_exercise;

    #[test]
    fn test_initial_stock_derived_from_system() {
        let ex = barrel_exercise();
        let state = GameState::initial(&ex);
        assert_eq!(state.isolated_on_shelf, 2);
        assert_eq!(state.second_on_shelf, 3);
        assert_eq!(state.shelf_count(ItemKind::Weight(5)), 3);
        assert_eq!(state.pan_len(Zone::LeftPan), 0);
    }

    #[test]
    fn test_digital_scale_removes_isolated_from_play() {
        let ex = barrel_exercise();
        let state = GameState::digital_scale(&ex);
        assert_eq!(state.shelf_count(ItemKind::Isolated), 0);
        assert_eq!(state.second_on_shelf, 3);
    }

    #[test]
    fn test_shelf_take_and_return() {
        let ex = barrel_exercise();
        let mut state = GameState::initial(&ex);

        assert!(state.take_from_shelf(ItemKind::Second));
        assert_eq!(state.second_on_shelf, 2);
        assert!(state.return_to_shelf(ItemKind::Second));
        assert_eq!(state.second_on_shelf, 3);

        assert!(state.take_from_shelf(ItemKind::Weight(10)));
        assert!(state.take_from_shelf(ItemKind::Weight(10)));
        assert!(!state.take_from_shelf(ItemKind::Weight(10)));
        // Denomination the shelf never carried
        assert!(!state.take_from_shelf(ItemKind::Weight(3)));
        assert!(!state.return_to_shelf(ItemKind::Weight(3)));
    }

    #[test]
    fn test_pan_weight_and_counts() {
        let ex = barrel_exercise();
        let mut state = GameState::initial(&ex);
        state.add_to_pan(Zone::LeftPan, ItemKind::Second);
        state.add_to_pan(Zone::LeftPan, ItemKind::Weight(5));
        state.add_to_pan(Zone::RightPan, ItemKind::Isolated);

        assert_eq!(state.pan_weight(Zone::LeftPan, &ex), 10);
        assert_eq!(state.pan_weight(Zone::RightPan, &ex), 16);
        assert_eq!(state.second_count(Zone::LeftPan), 1);
        assert_eq!(state.second_count(Zone::RightPan), 0);
        assert!(state.contains_isolated(Zone::RightPan));
        assert!(!state.contains_isolated(Zone::LeftPan));
    }

    #[test]
    fn test_history_push_undo_redo() {
        let ex = barrel_exercise();
        let initial = GameState::initial(&ex);
        let mut history = GameHistory::new(initial.clone());

        let mut next = initial.clone();
        assert!(next.take_from_shelf(ItemKind::Second));
        next.add_to_pan(Zone::LeftPan, ItemKind::Second);
        history.push(next.clone());

        assert_eq!(history.current(), &next);
        assert!(history.undo());
        assert_eq!(history.current(), &initial);
        assert!(!history.undo());
        assert!(history.redo());
        assert_eq!(history.current(), &next);
        assert!(!history.redo());
    }

    #[test]
    fn test_push_after_undo_discards_redo_tail() {
        let ex = barrel_exercise();
        let initial = GameState::initial(&ex);
        let mut history = GameHistory::new(initial.clone());

        let mut a = initial.clone();
        a.add_to_pan(Zone::LeftPan, ItemKind::Weight(1));
        history.push(a);

        let mut b = initial.clone();
        b.add_to_pan(Zone::RightPan, ItemKind::Weight(5));
        history.undo();
        history.push(b.clone());

        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), &b);
        assert!(!history.can_redo());
    }
}
