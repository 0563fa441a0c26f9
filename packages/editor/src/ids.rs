use crc32fast::Hasher;
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a session seed from the page route and session start time using CRC32
pub fn get_session_seed(route: &str, started_at_nanos: u128) -> String {
    let mut hasher = Hasher::new();
    hasher.update(route.as_bytes());
    hasher.update(&started_at_nanos.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for editor-created blocks within one session
#[derive(Clone, Debug)]
pub struct IDGenerator {
    prefix: String, // "<idPrefix>_<route>"
    seed: String,   // Session seed (CRC32)
    count: u32,     // Sequential counter
}

impl IDGenerator {
    pub fn new(id_prefix: &str, route: &str) -> Self {
        Self::from_seed(id_prefix, route, get_session_seed(route, current_nanos()))
    }

    pub fn from_seed(id_prefix: &str, route: &str, seed: String) -> Self {
        Self {
            prefix: format!("{}_{}", id_prefix, route),
            seed,
            count: 0,
        }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}_{}-{}", self.prefix, self.seed, self.count)
    }

    /// Get session seed
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

fn current_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default()
}
