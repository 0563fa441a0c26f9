//! # Collaborator Interfaces
//!
//! The editor never touches rendered elements directly. The rendering layer
//! exposes the page through [`PageSurface`], and the drag-and-drop layer
//! receives refresh and selection requests through [`DragDropController`].

use pagebuilder_common::BlockDescriptor;

/// Identifier-to-descriptor lookup over the rendered page
pub trait PageSurface {
    /// Opaque handle for a rendered element
    type Element: Clone;

    /// Block data attached to an element (None if the element is not a block)
    fn descriptor(&self, element: &Self::Element) -> Option<BlockDescriptor>;

    /// Rendered element for a block id
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    /// Element that contains `element` in display order
    fn parent(&self, element: &Self::Element) -> Option<Self::Element>;

    /// Children of `element` in display order
    fn children(&self, element: &Self::Element) -> Vec<Self::Element>;

    /// Whether the element is the transient placeholder drawn while dragging
    fn is_drag_cursor(&self, element: &Self::Element) -> bool;
}

/// Requests from the editor to the drag-and-drop layer
pub trait DragDropController {
    /// Re-scan the page for draggable blocks and containers
    fn update_blocks(&self);

    /// Select the block with the given id as if the user clicked it
    fn select_block(&self, id: &str);
}

/// Controller for hosts without a drag-and-drop layer
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDragDrop;

impl DragDropController for NoopDragDrop {
    fn update_blocks(&self) {}

    fn select_block(&self, _id: &str) {}
}
