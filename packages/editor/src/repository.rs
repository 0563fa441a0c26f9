//! # Page Config Repository
//!
//! The persisted page configuration (and with it the global modification
//! set) is reached only through [`ConfigRepository`], owned by the
//! modification store for the lifetime of an editor session.

use pagebuilder_common::PageConfig;
use std::sync::{Arc, Mutex, MutexGuard};

/// Read/write access to the page configuration being edited
pub trait ConfigRepository: Send {
    fn get(&self) -> PageConfig;

    fn set(&mut self, config: PageConfig);
}

/// In-memory repository; clones share the same configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigRepository {
    config: Arc<Mutex<PageConfig>>,
}

impl MemoryConfigRepository {
    pub fn new(config: PageConfig) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
        }
    }

    pub fn snapshot(&self) -> PageConfig {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, PageConfig> {
        // A poisoned lock still holds a complete config value
        self.config.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ConfigRepository for MemoryConfigRepository {
    fn get(&self) -> PageConfig {
        self.snapshot()
    }

    fn set(&mut self, config: PageConfig) {
        *self.lock() = config;
    }
}
