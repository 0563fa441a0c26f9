//! # Page Builder Editor
//!
//! Block modification and history engine for the visual page builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ drag-and-drop layer: drop / select events   │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ EditorSession                               │
//! │  - Validate target, resolve parent          │
//! │  - Reconciler: dense sibling re-indexing    │
//! │  - ModificationStore: global + local sets   │
//! │  - HistoryManager: bounded undo/redo        │
//! │  - BlockRegistry: handles, capabilities     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ rendering layer: refresh live blocks        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Modifications are a diff**: the page source is never edited, only
//!    overridden block by block
//! 2. **Global and local move together**: every write lands in both sets
//! 3. **Checkpoint before mutate**: history snapshots are taken before a
//!    change is applied, never after
//! 4. **Invalid input is a no-op**: rejected edits are logged, not raised
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagebuilder_editor::{Anchor, EditorConfig, EditorSession, MemoryConfigRepository};
//!
//! let repository = MemoryConfigRepository::new(page_config);
//! let mut session = EditorSession::new(EditorConfig::default(), repository, surface, drag_drop);
//!
//! session.on_modifications_change(|local| schedule_save(local));
//!
//! // Move a block after its sibling
//! session.insert(moving, Some(&sibling), Anchor::After).await?;
//!
//! // Undo it
//! session.undo().await?;
//! ```

mod config;
mod errors;
mod ids;
mod reconciler;
mod registry;
mod renderer;
mod repository;
mod session;
mod store;
mod surface;
mod undo_stack;

pub use config::{EditorConfig, RefreshPolicy, DEFAULT_CONFIG_NAME, DEFAULT_HISTORY_DEPTH};
pub use errors::{EditorError, RefreshError, RefreshFailures};
pub use ids::{get_session_seed, IDGenerator};
pub use reconciler::{close_gap, place_block, record_placement, Anchor, ChildSlot, Placement, ReconcileError};
pub use registry::{BlockHandle, BlockRegistry, Capability, HandleError};
pub use renderer::{BlockRenderer, RendererRegistry};
pub use repository::{ConfigRepository, MemoryConfigRepository};
pub use session::EditorSession;
pub use store::{ModificationStore, ModificationsListener};
pub use surface::{DragDropController, NoopDragDrop, PageSurface};
pub use undo_stack::{HistoryListener, HistoryManager, HistorySnapshot, HistoryState};

// Re-export common types for convenience
pub use pagebuilder_common::{BlockDescriptor, BlockKind, ModificationSet, PageConfig};
