//! Adapter identity and options
//!
//! One `AdapterConfig` per registered adapter, constructed at startup and
//! immutable afterwards. A disabled adapter is excluded from the registry's
//! routing table and from manifest aggregation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::Metadata;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Registry name, e.g. `"mcp"` or `"webhook"`.
    pub name: String,

    /// Mount prefix for the adapter's routes, e.g. `"/mcp"`.
    pub url_prefix: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Adapter-specific options, carried opaquely.
    #[serde(default)]
    pub options: Metadata,
}

fn default_enabled() -> bool {
    true
}

impl AdapterConfig {
    pub fn new(name: impl Into<String>, url_prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_prefix: url_prefix.into(),
            enabled: true,
            options: Metadata::new(),
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enabled_by_default() {
        let config = AdapterConfig::new("mcp", "/mcp");
        assert!(config.enabled);
        assert!(!config.clone().disabled().enabled);
    }

    #[test]
    fn enabled_defaults_on_deserialization() {
        let config: AdapterConfig =
            serde_json::from_value(json!({"name": "a2a", "url_prefix": "/a2a"})).unwrap();
        assert!(config.enabled);
        assert!(config.options.is_empty());
    }
}
