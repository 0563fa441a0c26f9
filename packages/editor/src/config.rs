use crate::EditorError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "pagebuilder.config.json";

/// Undo stack bound used when no config overrides it
pub const DEFAULT_HISTORY_DEPTH: usize = 10;

/// Editor configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of undo checkpoints kept
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,

    /// Prefix for ids of editor-created blocks
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,

    /// What a failing block refresh does to the calling operation
    #[serde(default)]
    pub refresh_policy: RefreshPolicy,
}

fn default_history_depth() -> usize {
    DEFAULT_HISTORY_DEPTH
}

fn default_id_prefix() -> String {
    "Editor".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPolicy {
    /// Log failed refreshes and let the operation complete
    #[default]
    Lenient,

    /// Surface failed refreshes as an error from the operation
    Strict,
}

impl EditorConfig {
    /// Load config from a directory
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, EditorError> {
        let config_path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            // Return default config if none exists
            Ok(Self::default())
        }
    }

    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_history_depth(mut self, depth: usize) -> Self {
        self.history_depth = depth;
        self
    }

    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: default_history_depth(),
            id_prefix: default_id_prefix(),
            refresh_policy: RefreshPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "historyDepth": 25,
            "idPrefix": "Builder",
            "refreshPolicy": "strict"
        }"#;

        let config = EditorConfig::from_json(json).unwrap();
        assert_eq!(config.history_depth, 25);
        assert_eq!(config.id_prefix, "Builder");
        assert_eq!(config.refresh_policy, RefreshPolicy::Strict);
    }

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.history_depth, 10);
        assert_eq!(config.id_prefix, "Editor");
        assert_eq!(config.refresh_policy, RefreshPolicy::Lenient);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = EditorConfig::from_json(r#"{ "historyDepth": 3 }"#).unwrap();
        assert_eq!(config.history_depth, 3);
        assert_eq!(config.id_prefix, "Editor");
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(EditorConfig::load(dir.path()).unwrap(), EditorConfig::default());

        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_NAME),
            r#"{ "refreshPolicy": "strict" }"#,
        )
        .unwrap();
        let config = EditorConfig::load(dir.path()).unwrap();
        assert_eq!(config.refresh_policy, RefreshPolicy::Strict);
    }

    #[test]
    fn test_invalid_config_is_error() {
        assert!(EditorConfig::from_json(r#"{ "historyDepth": "lots" }"#).is_err());
    }
}
