//! # Modification Sets
//!
//! An ordered collection of block overrides keyed by block id. Order is the
//! order in which each block was first recorded; replacing a block keeps its
//! slot so the serialized list stays stable across edits.

use crate::block::BlockDescriptor;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ModificationSet {
    entries: Vec<BlockDescriptor>,
}

impl ModificationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry with the same id (whole-record overwrite)
    pub fn upsert(&mut self, block: BlockDescriptor) {
        match self.position(&block.id) {
            Some(slot) => self.entries[slot] = block,
            None => self.entries.push(block),
        }
    }

    pub fn get(&self, id: &str) -> Option<&BlockDescriptor> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn remove(&mut self, id: &str) -> Option<BlockDescriptor> {
        self.position(id).map(|slot| self.entries.remove(slot))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BlockDescriptor> {
        self.entries.iter()
    }

    /// Non-deleted entries whose parent is `parent_id`, ordered by index
    pub fn children_of(&self, parent_id: &str) -> Vec<&BlockDescriptor> {
        let mut children: Vec<&BlockDescriptor> = self
            .entries
            .iter()
            .filter(|entry| entry.is_rendered() && entry.parent_id.as_deref() == Some(parent_id))
            .collect();
        children.sort_by_key(|entry| entry.index.unwrap_or(usize::MAX));
        children
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }
}

impl FromIterator<BlockDescriptor> for ModificationSet {
    fn from_iter<I: IntoIterator<Item = BlockDescriptor>>(iter: I) -> Self {
        let mut set = ModificationSet::new();
        for block in iter {
            set.upsert(block);
        }
        set
    }
}

/// Persisted lists may repeat an id; the later entry wins
impl<'de> Deserialize<'de> for ModificationSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<BlockDescriptor>::deserialize(deserializer).map(ModificationSet::from_iter)
    }
}

impl IntoIterator for ModificationSet {
    type Item = BlockDescriptor;
    type IntoIter = std::vec::IntoIter<BlockDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ModificationSet {
    type Item = &'a BlockDescriptor;
    type IntoIter = std::slice::Iter<'a, BlockDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
