use crate::result::CommonResult;
use crate::modifications::ModificationSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Page configuration exchanged with the persistence layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    /// Route of the page being edited
    #[serde(default)]
    pub route: String,

    /// All known block overrides for the page
    #[serde(default)]
    pub modifications: ModificationSet,

    /// Props forwarded to the page component when rendered inside the admin panel
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub admin_panel_props: Map<String, Value>,
}

impl PageConfig {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            ..Self::default()
        }
    }

    pub fn with_modifications(mut self, modifications: ModificationSet) -> Self {
        self.modifications = modifications;
        self
    }

    pub fn from_json(json: &str) -> CommonResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> CommonResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
