//! Shared fixtures: a page surface that renders from the live page config,
//! recording block handles, and a recording drag-and-drop controller.

#![allow(dead_code)]

use async_trait::async_trait;
use pagebuilder_editor::{
    BlockDescriptor, BlockHandle, BlockKind, DragDropController, EditorConfig, EditorSession,
    HandleError, MemoryConfigRepository, PageConfig, PageSurface,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ROOT: &str = "root";
pub const CURSOR: &str = "__drag_cursor__";

/// Page rendered from a base layout overlaid with the current modifications
pub struct LivePage {
    base: Vec<BlockDescriptor>,
    repository: MemoryConfigRepository,
    cursor: Mutex<Option<(String, usize)>>,
}

impl LivePage {
    pub fn new(base: Vec<BlockDescriptor>, repository: MemoryConfigRepository) -> Self {
        Self {
            base,
            repository,
            cursor: Mutex::new(None),
        }
    }

    /// Draw the drag cursor inside `parent` at display position `position`
    pub fn show_cursor(&self, parent: &str, position: usize) {
        *self.cursor.lock().unwrap() = Some((parent.to_string(), position));
    }

    fn merged(&self) -> HashMap<String, (usize, BlockDescriptor)> {
        let mut blocks: HashMap<String, (usize, BlockDescriptor)> = self
            .base
            .iter()
            .enumerate()
            .map(|(order, block)| (block.id.clone(), (order, block.clone())))
            .collect();

        let next_order = blocks.len();
        for (offset, block) in self.repository.snapshot().modifications.into_iter().enumerate() {
            let order = blocks.get(&block.id).map(|(order, _)| *order).unwrap_or(next_order + offset);
            blocks.insert(block.id.clone(), (order, block));
        }
        blocks
    }

    /// Ids of rendered children of `parent`, in display order
    pub fn child_ids(&self, parent: &str) -> Vec<String> {
        let mut children: Vec<(usize, BlockDescriptor)> = self
            .merged()
            .into_values()
            .filter(|(_, block)| !block.is_deleted && block.parent_id.as_deref() == Some(parent))
            .collect();
        children.sort_by_key(|(order, block)| (block.index.unwrap_or(usize::MAX), *order));
        children.into_iter().map(|(_, block)| block.id).collect()
    }
}

impl PageSurface for LivePage {
    type Element = String;

    fn descriptor(&self, element: &String) -> Option<BlockDescriptor> {
        self.merged().remove(element).map(|(_, block)| block)
    }

    fn element_by_id(&self, id: &str) -> Option<String> {
        self.descriptor(&id.to_string())
            .filter(|block| !block.is_deleted)
            .map(|block| block.id)
    }

    fn parent(&self, element: &String) -> Option<String> {
        self.descriptor(element).and_then(|block| block.parent_id)
    }

    fn children(&self, element: &String) -> Vec<String> {
        let mut children = self.child_ids(element);
        if let Some((parent, position)) = self.cursor.lock().unwrap().as_ref() {
            if parent == element {
                children.insert((*position).min(children.len()), CURSOR.to_string());
            }
        }
        children
    }

    fn is_drag_cursor(&self, element: &String) -> bool {
        element == CURSOR
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragDropEvent {
    UpdateBlocks,
    Select(String),
}

#[derive(Clone, Default)]
pub struct RecordingDragDrop {
    pub events: Arc<Mutex<Vec<DragDropEvent>>>,
}

impl RecordingDragDrop {
    pub fn events(&self) -> Vec<DragDropEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl DragDropController for RecordingDragDrop {
    fn update_blocks(&self) {
        self.events.lock().unwrap().push(DragDropEvent::UpdateBlocks);
    }

    fn select_block(&self, id: &str) {
        self.events.lock().unwrap().push(DragDropEvent::Select(id.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingHandle {
    pub refreshes: AtomicUsize,
    pub menu_visible: AtomicBool,
    pub fail: AtomicBool,
}

impl RecordingHandle {
    pub fn failing() -> Self {
        let handle = Self::default();
        handle.fail.store(true, Ordering::SeqCst);
        handle
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlockHandle for RecordingHandle {
    async fn refresh(&self) -> Result<(), HandleError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fail.load(Ordering::SeqCst) {
            return Err("render failed".into());
        }
        Ok(())
    }

    fn set_menu_visibility(&self, visible: bool) {
        self.menu_visible.store(visible, Ordering::SeqCst);
    }
}

pub fn text(id: &str, parent: &str, index: usize) -> BlockDescriptor {
    BlockDescriptor::new(id, BlockKind::Text)
        .with_parent(parent)
        .with_index(index)
}

pub fn container(id: &str, parent: Option<&str>, index: usize) -> BlockDescriptor {
    let block = BlockDescriptor::new(id, BlockKind::Container).with_index(index);
    match parent {
        Some(parent) => block.with_parent(parent),
        None => block,
    }
}

pub struct Fixture {
    pub session: EditorSession<LivePage, RecordingDragDrop>,
    pub repository: MemoryConfigRepository,
    pub drag_drop: RecordingDragDrop,
}

/// Session over `base`, with the page root container prepended
pub fn fixture(base: Vec<BlockDescriptor>) -> Fixture {
    fixture_with_config(EditorConfig::default(), base)
}

/// Route session logs to the test writer; `RUST_LOG=pagebuilder_editor=debug` to see them
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn fixture_with_config(config: EditorConfig, base: Vec<BlockDescriptor>) -> Fixture {
    init_tracing();
    let repository = MemoryConfigRepository::new(PageConfig::new("/test"));
    let drag_drop = RecordingDragDrop::default();

    let mut layout = vec![container(ROOT, None, 0)];
    layout.extend(base);

    let page = LivePage::new(layout, repository.clone());
    let session = EditorSession::new(config, repository.clone(), page, drag_drop.clone());

    Fixture {
        session,
        repository,
        drag_drop,
    }
}

/// Rendered descriptor for `id`
pub fn block(fixture: &Fixture, id: &str) -> BlockDescriptor {
    fixture
        .session
        .surface()
        .descriptor(&id.to_string())
        .unwrap_or_else(|| panic!("block {} not rendered", id))
}

/// Assert every container's rendered children have indices 0..n-1
pub fn assert_dense(fixture: &Fixture, parents: &[&str]) {
    for parent in parents {
        let ids = fixture.session.surface().child_ids(parent);
        let indices: Vec<Option<usize>> = ids.iter().map(|id| block(fixture, id).index).collect();
        let expected: Vec<Option<usize>> = (0..ids.len()).map(Some).collect();
        assert_eq!(indices, expected, "children of {} are not dense: {:?}", parent, ids);
    }
}
