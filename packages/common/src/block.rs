//! # Block Descriptors
//!
//! A block descriptor is the override record for one content block on a page.
//! Descriptors travel to and from the host as camelCase JSON; fields the
//! editor does not understand are kept in `payload` and written back verbatim.

use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Kind of content block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Text,
    #[serde(alias = "HTML")]
    Html,
    Container,
    Plugin,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Text => "text",
            BlockKind::Html => "html",
            BlockKind::Container => "container",
            BlockKind::Plugin => "plugin",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockKind {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(BlockKind::Text),
            "html" | "HTML" => Ok(BlockKind::Html),
            "container" => Ok(BlockKind::Container),
            "plugin" => Ok(BlockKind::Plugin),
            other => Err(CommonError::UnknownBlockKind(other.to_string())),
        }
    }
}

/// Override record for a single block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDescriptor {
    /// Stable block identifier
    pub id: String,

    /// Block kind, fixed at creation
    #[serde(rename = "type")]
    pub kind: BlockKind,

    /// Containing block, unset only for the page root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Position among siblings (unset until the block is placed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,

    /// Created by the editor, absent from the page source
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_virtual: bool,

    /// Tombstone, excluded from rendering
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_deleted: bool,

    /// Type-specific fields, opaque to the editor
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl BlockDescriptor {
    pub fn new(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
            parent_id: None,
            index: None,
            is_virtual: false,
            is_deleted: false,
            payload: Map::new(),
        }
    }

    /// Editor-created block with no counterpart in the page source
    pub fn new_virtual(id: impl Into<String>, kind: BlockKind) -> Self {
        Self {
            is_virtual: true,
            ..Self::new(id, kind)
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_payload(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    /// Blocks without an id cannot be tracked
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// Whether the block takes part in rendering
    pub fn is_rendered(&self) -> bool {
        !self.is_deleted
    }
}
