//! Error types for the editor

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("No parent resolvable for block: {0}")]
    UnresolvableParent(String),

    #[error("Invalid block reference: {0}")]
    InvalidBlock(String),

    #[error("Reconcile error: {0}")]
    Reconcile(#[from] crate::reconciler::ReconcileError),

    #[error("{0}")]
    Refresh(#[from] RefreshFailures),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Common(#[from] pagebuilder_common::CommonError),
}

/// Failure reported by a single live block handle
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Refresh of block {block_id} failed: {message}")]
pub struct RefreshError {
    pub block_id: String,
    pub message: String,
}

impl RefreshError {
    pub fn new(block_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            block_id: block_id.into(),
            message: message.into(),
        }
    }
}

/// Every refresh that failed during one re-render fan-out
#[derive(Error, Debug, Clone, PartialEq)]
pub struct RefreshFailures {
    pub failures: Vec<RefreshError>,

    /// Number of handles that were asked to refresh
    pub attempted: usize,
}

impl fmt::Display for RefreshFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} block refreshes failed",
            self.failures.len(),
            self.attempted
        )?;
        for failure in &self.failures {
            write!(f, "; {}", failure)?;
        }
        Ok(())
    }
}

impl RefreshFailures {
    pub fn block_ids(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|failure| failure.block_id.as_str())
    }
}
