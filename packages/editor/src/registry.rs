//! # Block Registry
//!
//! Maps block ids to live handles registered by the rendering layer, plus
//! per-block capability overrides set from block menus. Handles register
//! asynchronously relative to block creation, so every lookup tolerates a
//! missing handle.

use crate::errors::{RefreshError, RefreshFailures};
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// Error returned by a live handle's refresh
pub type HandleError = Box<dyn std::error::Error + Send + Sync>;

/// Live, rendered instance of a block
#[async_trait]
pub trait BlockHandle: Send + Sync {
    /// Re-render the block from the current modification state
    async fn refresh(&self) -> Result<(), HandleError>;

    /// Show or hide the block's editing menu
    fn set_menu_visibility(&self, visible: bool);

    /// Block-type specific drag permission, if the block has an opinion
    fn can_drag(&self) -> Option<bool> {
        None
    }

    /// Block-type specific deselect permission, if the block has an opinion
    fn can_deselect(&self) -> Option<bool> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    CanDrag,
    CanDeselect,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CapabilityOverrides {
    can_drag: Option<bool>,
    can_deselect: Option<bool>,
}

#[derive(Default)]
pub struct BlockRegistry {
    handles: BTreeMap<String, Arc<dyn BlockHandle>>,
    overrides: HashMap<String, CapabilityOverrides>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the live handle for a block
    pub fn register(&mut self, id: impl Into<String>, handle: Arc<dyn BlockHandle>) {
        let id = id.into();
        debug!(block_id = %id, "Block handle registered");
        self.handles.insert(id, handle);
    }

    pub fn unregister(&mut self, id: &str) -> Option<Arc<dyn BlockHandle>> {
        self.handles.remove(id)
    }

    pub fn handle(&self, id: &str) -> Option<&Arc<dyn BlockHandle>> {
        self.handles.get(id)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn set_capability(&mut self, id: impl Into<String>, capability: Capability, value: bool) {
        let overrides = self.overrides.entry(id.into()).or_default();
        match capability {
            Capability::CanDrag => overrides.can_drag = Some(value),
            Capability::CanDeselect => overrides.can_deselect = Some(value),
        }
    }

    pub fn can_drag(&self, id: &str) -> bool {
        let from_instance = self.handles.get(id).and_then(|handle| handle.can_drag());
        let from_override = self.overrides.get(id).and_then(|o| o.can_drag);
        resolve_capability(from_instance, from_override)
    }

    pub fn can_deselect(&self, id: &str) -> bool {
        let from_instance = self.handles.get(id).and_then(|handle| handle.can_deselect());
        let from_override = self.overrides.get(id).and_then(|o| o.can_deselect);
        resolve_capability(from_instance, from_override)
    }

    pub fn select(&self, id: &str) {
        if let Some(handle) = self.handles.get(id) {
            handle.set_menu_visibility(true);
        }
    }

    pub fn deselect(&self, id: &str) {
        if let Some(handle) = self.handles.get(id) {
            handle.set_menu_visibility(false);
        }
    }

    /// Refresh every live handle and wait for all of them
    ///
    /// Every handle is awaited even when some fail; failures are logged and
    /// returned together. On success returns the number of refreshed handles.
    pub async fn refresh_all(&self) -> Result<usize, RefreshFailures> {
        let attempted = self.handles.len();
        let results = join_all(self.handles.iter().map(|(id, handle)| async move {
            (id, handle.refresh().await)
        }))
        .await;

        let failures: Vec<RefreshError> = results
            .into_iter()
            .filter_map(|(id, result)| result.err().map(|err| RefreshError::new(id.as_str(), err.to_string())))
            .collect();

        for failure in &failures {
            warn!(block_id = %failure.block_id, error = %failure.message, "Block refresh failed");
        }

        if failures.is_empty() {
            Ok(attempted)
        } else {
            Err(RefreshFailures { failures, attempted })
        }
    }

    /// Refresh a single block; a block without a handle is skipped
    pub async fn refresh_one(&self, id: &str) -> Result<bool, RefreshError> {
        let Some(handle) = self.handles.get(id) else {
            return Ok(false);
        };

        handle.refresh().await.map_err(|err| {
            let failure = RefreshError::new(id, err.to_string());
            warn!(block_id = %id, error = %failure.message, "Block refresh failed");
            failure
        })?;
        Ok(true)
    }
}

/// Both sources AND together; a lone source wins; default allows
fn resolve_capability(from_instance: Option<bool>, from_override: Option<bool>) -> bool {
    match (from_instance, from_override) {
        (Some(instance), Some(info)) => instance && info,
        (Some(value), None) | (None, Some(value)) => value,
        (None, None) => true,
    }
}
