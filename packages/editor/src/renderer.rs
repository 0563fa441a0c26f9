//! # Block Renderers
//!
//! Editing content is chosen per [`BlockKind`] through a registry instead of
//! branching on the type string. Kinds without a registered renderer fall
//! back to the rendering engine's default content.

use pagebuilder_common::{BlockDescriptor, BlockKind};
use std::collections::HashMap;

/// Produces editing content of type `C` for a block
pub trait BlockRenderer<C>: Send + Sync {
    fn render(&self, block: &BlockDescriptor) -> C;
}

impl<C, F> BlockRenderer<C> for F
where
    F: Fn(&BlockDescriptor) -> C + Send + Sync,
{
    fn render(&self, block: &BlockDescriptor) -> C {
        self(block)
    }
}

pub struct RendererRegistry<C> {
    renderers: HashMap<BlockKind, Box<dyn BlockRenderer<C>>>,
}

impl<C> RendererRegistry<C> {
    pub fn new() -> Self {
        Self {
            renderers: HashMap::new(),
        }
    }

    /// Register the renderer for a kind, replacing any previous one
    pub fn register(&mut self, kind: BlockKind, renderer: impl BlockRenderer<C> + 'static) {
        self.renderers.insert(kind, Box::new(renderer));
    }

    pub fn with(mut self, kind: BlockKind, renderer: impl BlockRenderer<C> + 'static) -> Self {
        self.register(kind, renderer);
        self
    }

    pub fn has_renderer(&self, kind: BlockKind) -> bool {
        self.renderers.contains_key(&kind)
    }

    /// Specialized content for the block, or `default_content` when none is registered
    pub fn content_for(&self, block: &BlockDescriptor, default_content: impl FnOnce() -> C) -> C {
        match self.renderers.get(&block.kind) {
            Some(renderer) => renderer.render(block),
            None => default_content(),
        }
    }
}

impl<C> Default for RendererRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}
