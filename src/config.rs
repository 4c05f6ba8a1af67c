//! Source configuration
//!
//! An explicitly constructed config object passed into `AffinitySource`.
//! Nothing here is global: credential loading and CLI parsing live with the
//! caller.

use crate::error::{Error, Result};
use crate::source::ListReference;
use serde::{Deserialize, Serialize};

/// Default Affinity API base URL
pub const DEFAULT_API_BASE: &str = "https://api.affinity.co";

/// Configuration for an extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// API base URL (v1 endpoints live at the root, v2 under `/v2`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Affinity API key
    pub api_key: String,

    /// Lists and/or saved views whose entries should be extracted
    #[serde(default)]
    pub list_refs: Vec<ListReference>,

    /// Development-mode bound on top-level records per resource
    ///
    /// Applied by limiting how many ids/entries are fetched, so record
    /// shapes stay canonical. Auxiliary tables (dropdown options,
    /// interactions, field metadata) then only cover the sampled
    /// entities, a known limitation of sample runs.
    #[serde(default)]
    pub sample_limit: Option<usize>,

    /// How many detail batches to fetch concurrently
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,

    /// Retries per request before an upstream error surfaces
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Requests per second across the shared client
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_batch_concurrency() -> usize {
    4
}

fn default_max_retries() -> u32 {
    5
}

fn default_requests_per_second() -> u32 {
    10
}

impl SourceConfig {
    /// Create a config with defaults for everything but the API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            api_key: api_key.into(),
            list_refs: Vec::new(),
            sample_limit: None,
            batch_concurrency: default_batch_concurrency(),
            max_retries: default_max_retries(),
            requests_per_second: default_requests_per_second(),
        }
    }

    /// Set the API base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Add a list/view reference to extract
    #[must_use]
    pub fn with_list_ref(mut self, list_ref: ListReference) -> Self {
        self.list_refs.push(list_ref);
        self
    }

    /// Bound top-level records per resource (development mode)
    #[must_use]
    pub fn with_sample_limit(mut self, limit: usize) -> Self {
        self.sample_limit = Some(limit);
        self
    }

    /// Set detail-batch concurrency
    #[must_use]
    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency.max(1);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::missing_field("api_key"));
        }
        if self.base_url.is_empty() {
            return Err(Error::missing_field("base_url"));
        }
        if self.batch_concurrency == 0 {
            return Err(Error::config("batch_concurrency must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SourceConfig::new("key");
        assert_eq!(config.base_url, DEFAULT_API_BASE);
        assert_eq!(config.batch_concurrency, 4);
        assert_eq!(config.max_retries, 5);
        assert!(config.sample_limit.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_api_key() {
        let config = SourceConfig::new("");
        assert!(matches!(
            config.validate(),
            Err(Error::MissingConfigField { .. })
        ));
    }

    #[test]
    fn test_deserialization_with_defaults() {
        let config: SourceConfig = serde_json::from_str(
            r#"{
                "api_key": "secret",
                "list_refs": [
                    {"list_id": 248283},
                    {"list_id": 247888, "view_id": 1869904}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.list_refs.len(), 2);
        assert_eq!(config.list_refs[1].view_id, Some(1869904));
        assert_eq!(config.base_url, DEFAULT_API_BASE);
    }

    #[test]
    fn test_builders() {
        let config = SourceConfig::new("key")
            .with_base_url("https://mock.test")
            .with_list_ref(ListReference::new(1))
            .with_sample_limit(10)
            .with_batch_concurrency(2);

        assert_eq!(config.base_url, "https://mock.test");
        assert_eq!(config.list_refs.len(), 1);
        assert_eq!(config.sample_limit, Some(10));
        assert_eq!(config.batch_concurrency, 2);
    }
}
