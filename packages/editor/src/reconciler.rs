//! # Block Tree Reconciler
//!
//! Recomputes sibling ordering when a block is inserted or moved.
//!
//! ## Semantics
//!
//! - Every surviving sibling gets a fresh dense index (0..n-1) in display
//!   order, so indices never drift after repeated moves
//! - The moving block is never duplicated: its old slot is skipped and it is
//!   re-inserted next to the target
//! - A missing or unmatched target appends the moving block at the end
//! - Every sibling is re-parented to the destination, which is a no-op for
//!   same-parent reorders
//! - Drag cursors, id-less elements and deleted blocks do not take an index
//! - When a block leaves a container, the siblings it left behind are
//!   re-indexed too ([`close_gap`])

use crate::store::ModificationStore;
use pagebuilder_common::BlockDescriptor;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Side of the target the moving block lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Before,
    After,
}

/// One child of the destination container, in display order
#[derive(Debug, Clone, PartialEq)]
pub enum ChildSlot {
    Block(BlockDescriptor),

    /// Placeholder drawn by the drag-and-drop layer
    DragCursor,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    #[error("No parent resolvable for block {0}")]
    NoParent(String),

    #[error("Moving block has no id")]
    MissingId,
}

/// New ordering of a container's children
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub parent_id: String,

    /// Every sibling including the moving block, in new order
    pub siblings: Vec<BlockDescriptor>,

    /// Index assigned to the moving block
    pub moving_index: usize,
}

impl Placement {
    pub fn moving(&self) -> &BlockDescriptor {
        &self.siblings[self.moving_index]
    }

    pub fn ids(&self) -> Vec<&str> {
        self.siblings.iter().map(|block| block.id.as_str()).collect()
    }
}

/// Compute the new sibling list for `moving` placed next to `target` in `parent`
pub fn place_block(
    mut moving: BlockDescriptor,
    target: Option<&BlockDescriptor>,
    anchor: Anchor,
    parent: Option<&BlockDescriptor>,
    children: impl IntoIterator<Item = ChildSlot>,
) -> Result<Placement, ReconcileError> {
    if !moving.has_id() {
        return Err(ReconcileError::MissingId);
    }

    // A block is never its own parent
    let parent_id = match parent {
        Some(parent) if parent.has_id() && parent.id != moving.id => parent.id.clone(),
        _ => return Err(ReconcileError::NoParent(moving.id)),
    };
    let target_id = target.map(|target| target.id.as_str());

    moving.parent_id = Some(parent_id.clone());

    let mut siblings: Vec<BlockDescriptor> = Vec::new();
    let mut moving_index = None;

    for slot in children {
        let mut child = match slot {
            ChildSlot::Block(child) => child,
            ChildSlot::DragCursor => continue,
        };
        if !child.has_id() || child.id == moving.id || child.is_deleted {
            continue;
        }

        let is_target = target_id == Some(child.id.as_str());

        if is_target && anchor == Anchor::Before {
            moving_index = Some(siblings.len());
            siblings.push(moving.clone());
        }

        child.index = Some(siblings.len());
        child.parent_id = Some(parent_id.clone());
        siblings.push(child);

        if is_target && anchor == Anchor::After {
            moving_index = Some(siblings.len());
            siblings.push(moving.clone());
        }
    }

    let moving_index = match moving_index {
        Some(index) => index,
        None => {
            siblings.push(moving);
            siblings.len() - 1
        }
    };
    siblings[moving_index].index = Some(moving_index);

    Ok(Placement {
        parent_id,
        siblings,
        moving_index,
    })
}

/// Re-index the children a moved block left behind in its old container
///
/// Returns only the siblings whose index changed.
pub fn close_gap(
    parent_id: &str,
    moved_id: &str,
    children: impl IntoIterator<Item = ChildSlot>,
) -> Vec<BlockDescriptor> {
    let mut changed = Vec::new();
    let mut next_index = 0;

    for slot in children {
        let ChildSlot::Block(mut child) = slot else {
            continue;
        };
        if !child.has_id() || child.id == moved_id || child.is_deleted {
            continue;
        }

        if child.index != Some(next_index) || child.parent_id.as_deref() != Some(parent_id) {
            child.index = Some(next_index);
            child.parent_id = Some(parent_id.to_string());
            changed.push(child);
        }
        next_index += 1;
    }

    changed
}

/// Record every block touched by a placement
pub fn record_placement(placement: &Placement, store: &mut ModificationStore) {
    debug!(
        parent_id = %placement.parent_id,
        block_id = %placement.moving().id,
        index = placement.moving_index,
        siblings = placement.siblings.len(),
        "Recording placement"
    );

    for sibling in &placement.siblings {
        store.record(sibling.clone());
    }
}
