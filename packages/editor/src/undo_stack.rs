//! # Undo/Redo Stack
//!
//! Snapshot-based history for the modification store.
//!
//! ## Design
//!
//! - A checkpoint is a deep copy of both modification sets, taken before a
//!   mutating action is applied
//! - Checkpoints equal to the current top of the undo stack are not pushed
//! - The undo stack is bounded; the oldest checkpoint is evicted on overflow
//! - New checkpoints clear the redo stack, including the one taken by redo
//! - Undo pushes the live state onto the redo stack directly, without dedup
//!   or bound (see [`HistoryManager::undo`])
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = HistoryManager::new();
//!
//! history.save_checkpoint(&store);
//! store.record(block);
//!
//! history.undo(&mut store); // back to the checkpoint
//! history.redo(&mut store); // forward again
//! ```

use crate::config::DEFAULT_HISTORY_DEPTH;
use crate::store::ModificationStore;
use pagebuilder_common::ModificationSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

/// Immutable copy of the global and local modification sets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    global: ModificationSet,
    local: ModificationSet,
}

impl HistorySnapshot {
    pub fn new(global: ModificationSet, local: ModificationSet) -> Self {
        Self { global, local }
    }

    pub fn global(&self) -> &ModificationSet {
        &self.global
    }

    pub fn local(&self) -> &ModificationSet {
        &self.local
    }

    pub fn into_parts(self) -> (ModificationSet, ModificationSet) {
        (self.global, self.local)
    }
}

/// Availability of undo/redo, emitted after every stack change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
}

pub type HistoryListener = Box<dyn FnMut(HistoryState) + Send>;

pub struct HistoryManager {
    /// Checkpoints, most recent last
    undo_stack: VecDeque<HistorySnapshot>,

    /// Undone states, most recent last
    redo_stack: Vec<HistorySnapshot>,

    /// Maximum number of undo levels (0 = unlimited)
    max_depth: usize,

    listener: Option<HistoryListener>,
}

impl HistoryManager {
    /// Create a history manager with the default depth (10)
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_HISTORY_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth,
            listener: None,
        }
    }

    /// Register the `historyChanged` listener
    pub fn set_listener(&mut self, listener: impl FnMut(HistoryState) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Capture the store's current state before a mutation
    pub fn save_checkpoint(&mut self, store: &ModificationStore) {
        self.push_checkpoint(store.current_state());

        // New action invalidates the undone future
        self.redo_stack.clear();
        self.emit();
    }

    /// Restore the most recent checkpoint
    ///
    /// Returns `false` when there is nothing to undo. The live state is pushed
    /// onto the redo stack as-is: it is neither deduplicated nor bounded.
    pub fn undo(&mut self, store: &mut ModificationStore) -> bool {
        let Some(snapshot) = self.undo_stack.pop_back() else {
            return false;
        };

        self.redo_stack.push(store.current_state());
        store.restore(snapshot);

        debug!(undo = self.undo_stack.len(), redo = self.redo_stack.len(), "Undo applied");
        self.emit();
        true
    }

    /// Reapply the most recently undone state
    ///
    /// The live state is checkpointed first so the redo itself can be undone.
    /// Like any checkpoint this discards the rest of the redo stack, so only
    /// the latest undo can be redone.
    pub fn redo(&mut self, store: &mut ModificationStore) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };

        self.push_checkpoint(store.current_state());
        self.redo_stack.clear();
        store.restore(snapshot);

        debug!(undo = self.undo_stack.len(), redo = self.redo_stack.len(), "Redo applied");
        self.emit();
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Most recent checkpoint, if any
    pub fn peek_undo(&self) -> Option<&HistorySnapshot> {
        self.undo_stack.back()
    }

    pub fn state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.emit();
    }

    fn push_checkpoint(&mut self, snapshot: HistorySnapshot) {
        if self.undo_stack.back() != Some(&snapshot) {
            self.undo_stack.push_back(snapshot);
        }

        if self.max_depth > 0 && self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }

    fn emit(&mut self) {
        let state = self.state();
        if let Some(listener) = self.listener.as_mut() {
            listener(state);
        }
    }
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryConfigRepository;
    use pagebuilder_common::{BlockDescriptor, BlockKind, PageConfig};
    use std::sync::{Arc, Mutex};

    fn store() -> ModificationStore {
        ModificationStore::new(MemoryConfigRepository::new(PageConfig::new("/")))
    }

    fn edit(history: &mut HistoryManager, store: &mut ModificationStore, id: &str, index: usize) {
        history.save_checkpoint(store);
        store.record(BlockDescriptor::new(id, BlockKind::Text).with_index(index));
    }

    #[test]
    fn test_history_creation() {
        let history = HistoryManager::new();
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_checkpoint_dedup() {
        let store = store();
        let mut history = HistoryManager::new();

        history.save_checkpoint(&store);
        history.save_checkpoint(&store);

        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_undo_restores_checkpoint() {
        let mut store = store();
        let mut history = HistoryManager::new();
        let initial = store.current_state();

        edit(&mut history, &mut store, "a", 0);
        assert!(history.undo(&mut store));

        assert_eq!(store.current_state(), initial);
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 1);
    }

    #[test]
    fn test_undo_then_redo_returns_to_edit() {
        let mut store = store();
        let mut history = HistoryManager::new();

        edit(&mut history, &mut store, "a", 0);
        let edited = store.current_state();

        history.undo(&mut store);
        assert!(history.redo(&mut store));

        assert_eq!(store.current_state(), edited);
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut store = store();
        let mut history = HistoryManager::new();
        store.record(BlockDescriptor::new("a", BlockKind::Text));
        let before = store.current_state();

        assert!(!history.undo(&mut store));
        assert!(!history.redo(&mut store));
        assert_eq!(store.current_state(), before);
    }

    #[test]
    fn test_new_checkpoint_clears_redo() {
        let mut store = store();
        let mut history = HistoryManager::new();

        edit(&mut history, &mut store, "a", 0);
        history.undo(&mut store);
        assert_eq!(history.redo_len(), 1);

        edit(&mut history, &mut store, "b", 0);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_max_depth_enforced() {
        let mut store = store();
        let mut history = HistoryManager::with_max_depth(2);

        for i in 0..3 {
            edit(&mut history, &mut store, "a", i);
        }

        // Should only keep 2 (max depth)
        assert_eq!(history.undo_len(), 2);
        assert_eq!(
            history.peek_undo().unwrap().local().get("a").unwrap().index,
            Some(1)
        );
    }

    #[test]
    fn test_redo_discards_older_undone_states() {
        let mut store = store();
        let mut history = HistoryManager::new();

        edit(&mut history, &mut store, "a", 0);
        let first = store.current_state();
        edit(&mut history, &mut store, "b", 1);

        history.undo(&mut store);
        history.undo(&mut store);
        assert!(store.local().is_empty());
        assert_eq!(history.redo_len(), 2);

        assert!(history.redo(&mut store));
        assert_eq!(store.current_state(), first);
        assert_eq!(history.redo_len(), 0);
        assert_eq!(history.undo_len(), 1);

        // Second redo has nothing left
        assert!(!history.redo(&mut store));
        assert_eq!(store.current_state(), first);
    }

    #[test]
    fn test_listener_tracks_availability() {
        let mut store = store();
        let mut history = HistoryManager::new();
        let states = Arc::new(Mutex::new(Vec::new()));
        let sink = states.clone();
        history.set_listener(move |state| sink.lock().unwrap().push(state));

        edit(&mut history, &mut store, "a", 0);
        history.undo(&mut store);
        history.redo(&mut store);

        let states = states.lock().unwrap();
        assert_eq!(
            *states,
            vec![
                HistoryState { can_undo: true, can_redo: false },
                HistoryState { can_undo: false, can_redo: true },
                HistoryState { can_undo: true, can_redo: false },
            ]
        );
    }
}
