//! Configuration for a review registry instance.

use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::ReviewRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Collection name reported to indexers
    pub name: String,
    /// Short collection symbol
    pub symbol: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name: "WebsiteReview".to_string(),
            symbol: "WREV".to_string(),
        }
    }
}

impl RegistryConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
