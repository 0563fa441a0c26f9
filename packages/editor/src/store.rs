//! # Modification Store
//!
//! Holds the pending block overrides for an editor session.
//!
//! Two sets are kept in lockstep:
//! - **global**: every override known for the page, stored in the page config
//!   behind a [`ConfigRepository`]
//! - **local**: only the blocks touched in this session, which is what the
//!   host needs to send to the persistence backend
//!
//! Every write goes to both sets and then notifies the registered listener
//! with the full local set so the host can mark the page as unsaved.

use crate::repository::ConfigRepository;
use crate::undo_stack::HistorySnapshot;
use pagebuilder_common::{BlockDescriptor, ModificationSet};
use tracing::debug;

/// Callback invoked with the local modification set after it changes
pub type ModificationsListener = Box<dyn FnMut(&ModificationSet) + Send>;

pub struct ModificationStore {
    repository: Box<dyn ConfigRepository>,
    local: ModificationSet,
    listener: Option<ModificationsListener>,
}

impl ModificationStore {
    pub fn new(repository: impl ConfigRepository + 'static) -> Self {
        Self {
            repository: Box::new(repository),
            local: ModificationSet::new(),
            listener: None,
        }
    }

    /// Register the "modifications changed" callback
    pub fn set_listener(&mut self, listener: impl FnMut(&ModificationSet) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Insert or replace `block` in both the global and local sets
    pub fn record(&mut self, block: BlockDescriptor) {
        debug!(block_id = %block.id, index = ?block.index, parent_id = ?block.parent_id, "Recording modification");

        let mut config = self.repository.get();
        config.modifications.upsert(block.clone());
        self.repository.set(config);

        self.local.upsert(block);
        self.notify();
    }

    /// Deep copy of both sets
    pub fn current_state(&self) -> HistorySnapshot {
        HistorySnapshot::new(self.global(), self.local.clone())
    }

    /// Replace both sets wholesale with the snapshot's contents
    pub fn restore(&mut self, snapshot: HistorySnapshot) {
        let (global, local) = snapshot.into_parts();

        let mut config = self.repository.get();
        config.modifications = global;
        self.repository.set(config);

        self.local = local;
        self.notify();
    }

    pub fn global(&self) -> ModificationSet {
        self.repository.get().modifications
    }

    pub fn local(&self) -> &ModificationSet {
        &self.local
    }

    /// Current override for `id` from the global set
    pub fn get(&self, id: &str) -> Option<BlockDescriptor> {
        self.repository.get().modifications.get(id).cloned()
    }

    fn notify(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.local);
        }
    }
}
