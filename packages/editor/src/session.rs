//! # Editor Session
//!
//! Composes the modification store, history, reconciler and block registry
//! for one page being edited.
//!
//! Every mutating entry point follows the same shape:
//! 1. Validate the request (invalid requests are logged and dropped)
//! 2. Checkpoint history
//! 3. Record the changed blocks
//! 4. Re-render all live blocks and let the drag-and-drop layer rescan
//!
//! Input events are serialized by the host, so a session is never entered
//! concurrently and needs no internal locking.

use crate::config::{EditorConfig, RefreshPolicy};
use crate::ids::IDGenerator;
use crate::reconciler::{close_gap, place_block, record_placement, Anchor, ChildSlot, Placement};
use crate::registry::{BlockHandle, BlockRegistry, Capability};
use crate::repository::ConfigRepository;
use crate::store::ModificationStore;
use crate::surface::{DragDropController, PageSurface};
use crate::undo_stack::{HistoryManager, HistoryState};
use crate::EditorError;
use pagebuilder_common::{BlockDescriptor, BlockKind, ModificationSet};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub struct EditorSession<S: PageSurface, D: DragDropController> {
    config: EditorConfig,
    store: ModificationStore,
    history: HistoryManager,
    registry: BlockRegistry,
    surface: S,
    drag_drop: D,
    ids: IDGenerator,
}

impl<S: PageSurface, D: DragDropController> EditorSession<S, D> {
    pub fn new(
        config: EditorConfig,
        repository: impl ConfigRepository + 'static,
        surface: S,
        drag_drop: D,
    ) -> Self {
        let route = repository.get().route;
        let ids = IDGenerator::new(&config.id_prefix, &route);
        info!(route = %route, history_depth = config.history_depth, "Editor session started");

        Self {
            history: HistoryManager::with_max_depth(config.history_depth),
            store: ModificationStore::new(repository),
            registry: BlockRegistry::new(),
            config,
            surface,
            drag_drop,
            ids,
        }
    }

    /// Callback for "page has unsaved changes"; receives the local set
    pub fn on_modifications_change(&mut self, listener: impl FnMut(&ModificationSet) + Send + 'static) {
        self.store.set_listener(listener);
    }

    /// Callback for undo/redo availability
    pub fn on_history_change(&mut self, listener: impl FnMut(HistoryState) + Send + 'static) {
        self.history.set_listener(listener);
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &ModificationStore {
        &self.store
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn history_state(&self) -> HistoryState {
        self.history.state()
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Attach the live handle for a rendered block
    pub fn register_block(&mut self, id: impl Into<String>, handle: Arc<dyn BlockHandle>) {
        self.registry.register(id, handle);
    }

    pub fn unregister_block(&mut self, id: &str) {
        self.registry.unregister(id);
    }

    pub fn set_capability(&mut self, id: impl Into<String>, capability: Capability, value: bool) {
        self.registry.set_capability(id, capability, value);
    }

    // Drag-and-drop queries

    pub fn can_insert_block(&self, container: &S::Element, moving: &S::Element, _next: Option<&S::Element>) -> bool {
        self.resolve(container).is_some() && self.resolve(moving).is_some()
    }

    pub fn can_drag_block(&self, element: &S::Element) -> bool {
        self.resolve(element)
            .map(|block| self.registry.can_drag(&block.id))
            .unwrap_or(false)
    }

    pub fn can_deselect_block(&self, element: &S::Element) -> bool {
        self.resolve(element)
            .map(|block| self.registry.can_deselect(&block.id))
            .unwrap_or(false)
    }

    pub fn on_block_selected(&self, element: &S::Element) {
        if let Some(block) = self.resolve(element) {
            self.registry.select(&block.id);
        }
    }

    pub fn on_block_deselected(&self, element: &S::Element) {
        if let Some(block) = self.resolve(element) {
            self.registry.deselect(&block.id);
        }
    }

    /// Drop callback: `moving` was dropped into `container` just before `next`
    #[instrument(skip_all)]
    pub async fn on_block_inserted(
        &mut self,
        container: &S::Element,
        moving: &S::Element,
        next: Option<&S::Element>,
    ) -> Result<Option<Placement>, EditorError> {
        let Some(moving) = self.resolve(moving) else {
            warn!("Dropped element does not resolve to a block");
            return Ok(None);
        };
        let target = next.and_then(|next| self.resolve(next));

        self.insert_into(moving, target.as_ref(), Anchor::Before, Some(container))
            .await
    }

    /// Place `moving` next to `target` and re-render
    ///
    /// Returns `None` when the insertion was rejected (no id, or no parent
    /// could be resolved for the target).
    pub async fn insert(
        &mut self,
        moving: BlockDescriptor,
        target: Option<&BlockDescriptor>,
        anchor: Anchor,
    ) -> Result<Option<Placement>, EditorError> {
        self.insert_into(moving, target, anchor, None).await
    }

    /// Like [`insert`](Self::insert), with a fallback container used when the
    /// target is absent or not rendered
    pub async fn insert_into(
        &mut self,
        moving: BlockDescriptor,
        target: Option<&BlockDescriptor>,
        anchor: Anchor,
        parent: Option<&S::Element>,
    ) -> Result<Option<Placement>, EditorError> {
        let Some(placement) = self.place(moving, target, anchor, parent) else {
            return Ok(None);
        };

        // The drag-and-drop layer rescans even when a refresh failed
        let rendered = self.rerender_all().await;
        self.drag_drop.update_blocks();
        rendered?;

        Ok(Some(placement))
    }

    /// Create a virtual block of `kind` right after `after`, then select it
    #[instrument(skip_all, fields(after = %after.id, kind = %kind))]
    pub async fn insert_new_after(
        &mut self,
        after: &BlockDescriptor,
        kind: BlockKind,
    ) -> Result<Option<String>, EditorError> {
        let block = BlockDescriptor::new_virtual(self.ids.new_id(), kind);
        let id = block.id.clone();

        if self.insert(block, Some(after), Anchor::After).await?.is_none() {
            return Ok(None);
        }

        self.drag_drop.select_block(&id);
        info!(block_id = %id, "Virtual block created");
        Ok(Some(id))
    }

    /// Tombstone a block; siblings keep their indices
    #[instrument(skip_all, fields(block_id = %block.id))]
    pub async fn delete(&mut self, mut block: BlockDescriptor) -> Result<bool, EditorError> {
        if !block.has_id() {
            warn!(error = %EditorError::InvalidBlock("missing id".to_string()), "Delete rejected");
            return Ok(false);
        }

        self.history.save_checkpoint(&self.store);

        block.is_deleted = true;
        self.store.record(block);

        let rendered = self.rerender_all().await;
        self.drag_drop.update_blocks();
        rendered?;
        Ok(true)
    }

    /// Record an edit made from a block's own menu (text, html, plugin settings)
    pub fn modify(&mut self, block: BlockDescriptor) -> bool {
        if !block.has_id() {
            warn!(error = %EditorError::InvalidBlock("missing id".to_string()), "Modification rejected");
            return false;
        }

        self.history.save_checkpoint(&self.store);
        self.store.record(block);
        true
    }

    pub async fn undo(&mut self) -> Result<bool, EditorError> {
        if !self.history.undo(&mut self.store) {
            return Ok(false);
        }
        self.rerender_all().await?;
        Ok(true)
    }

    pub async fn redo(&mut self) -> Result<bool, EditorError> {
        if !self.history.redo(&mut self.store) {
            return Ok(false);
        }
        self.rerender_all().await?;
        Ok(true)
    }

    /// Refresh every live block, waiting for all of them
    ///
    /// Under [`RefreshPolicy::Lenient`] failures are logged and the call
    /// succeeds; under [`RefreshPolicy::Strict`] they are returned.
    pub async fn rerender_all(&self) -> Result<(), EditorError> {
        match self.registry.refresh_all().await {
            Ok(refreshed) => {
                debug!(refreshed, "Re-render complete");
                Ok(())
            }
            Err(failures) => match self.config.refresh_policy {
                RefreshPolicy::Lenient => {
                    warn!(
                        failed = failures.failures.len(),
                        attempted = failures.attempted,
                        "Re-render partially failed"
                    );
                    Ok(())
                }
                RefreshPolicy::Strict => Err(failures.into()),
            },
        }
    }

    /// Refresh a single live block; `false` if it has no handle yet
    pub async fn rerender_block(&self, id: &str) -> Result<bool, EditorError> {
        match self.registry.refresh_one(id).await {
            Ok(refreshed) => Ok(refreshed),
            Err(failure) => match self.config.refresh_policy {
                RefreshPolicy::Lenient => Ok(false),
                RefreshPolicy::Strict => Err(crate::RefreshFailures {
                    failures: vec![failure],
                    attempted: 1,
                }
                .into()),
            },
        }
    }

    fn resolve(&self, element: &S::Element) -> Option<BlockDescriptor> {
        self.surface.descriptor(element).filter(BlockDescriptor::has_id)
    }

    fn child_slots(&self, parent: &S::Element) -> Vec<ChildSlot> {
        self.surface
            .children(parent)
            .iter()
            .filter_map(|child| {
                if self.surface.is_drag_cursor(child) {
                    Some(ChildSlot::DragCursor)
                } else {
                    self.surface.descriptor(child).map(ChildSlot::Block)
                }
            })
            .collect()
    }

    /// Whether `element` is the block `id` or one of its descendants
    fn is_within(&self, element: &S::Element, id: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = Some(element.clone());

        while let Some(element) = current {
            let Some(block) = self.surface.descriptor(&element) else {
                return false;
            };
            if block.id == id {
                return true;
            }
            // Stop on a cycle in the host's tree
            if !visited.insert(block.id) {
                return false;
            }
            current = self.surface.parent(&element);
        }
        false
    }

    /// Validate, checkpoint and record a placement; `None` if rejected
    fn place(
        &mut self,
        moving: BlockDescriptor,
        target: Option<&BlockDescriptor>,
        anchor: Anchor,
        fallback_parent: Option<&S::Element>,
    ) -> Option<Placement> {
        if !moving.has_id() {
            warn!(error = %EditorError::InvalidBlock("missing id".to_string()), "Insert rejected");
            return None;
        }

        let parent_element = target
            .and_then(|target| self.surface.element_by_id(&target.id))
            .and_then(|element| self.surface.parent(&element))
            .or_else(|| fallback_parent.cloned());
        let parent = parent_element
            .as_ref()
            .and_then(|element| self.resolve(element));

        let (Some(parent_element), Some(parent)) = (parent_element, parent) else {
            warn!(error = %EditorError::UnresolvableParent(moving.id.clone()), "Insert rejected");
            return None;
        };

        if self.is_within(&parent_element, &moving.id) {
            warn!(
                error = %EditorError::UnresolvableParent(moving.id.clone()),
                parent_id = %parent.id,
                "Insert rejected: block cannot be placed inside itself"
            );
            return None;
        }

        let previous_parent = moving
            .parent_id
            .clone()
            .filter(|previous| *previous != parent.id);
        let children = self.child_slots(&parent_element);

        let placement = match place_block(moving, target, anchor, Some(&parent), children) {
            Ok(placement) => placement,
            Err(err) => {
                warn!(error = %err, "Insert rejected");
                return None;
            }
        };

        self.history.save_checkpoint(&self.store);
        record_placement(&placement, &mut self.store);

        // Keep the container the block came from dense as well
        if let Some(previous_parent) = previous_parent {
            if let Some(element) = self.surface.element_by_id(&previous_parent) {
                let moved_id = placement.moving().id.clone();
                for sibling in close_gap(&previous_parent, &moved_id, self.child_slots(&element)) {
                    self.store.record(sibling);
                }
            }
        }

        debug!(
            block_id = %placement.moving().id,
            parent_id = %placement.parent_id,
            index = placement.moving_index,
            "Block placed"
        );
        Some(placement)
    }
}
