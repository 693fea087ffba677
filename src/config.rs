//! Configuration types for the client and the table view
//!
//! Both configs deserialize from TOML with per-field defaults, so a config
//! file only needs to name what it changes:
//!
//! ```toml
//! base_url = "https://tables.example.com/api/v1/"
//! api_key = "sk_live_123"
//! timeout_seconds = 10
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

pub const ENV_URL: &str = "TABLEKIT_URL";
pub const ENV_API_KEY: &str = "TABLEKIT_API_KEY";
pub const ENV_TIMEOUT: &str = "TABLEKIT_TIMEOUT";

/// Strip one trailing slash from a base URL
pub fn normalize_base_url(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_string()
}

/// Connection settings for [`crate::Client`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the API, e.g. `https://tables.example.com/api/v1`
    pub base_url: String,

    /// API key sent as `X-API-Key`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("tablekit-sdk/{}", env!("CARGO_PKG_VERSION"))
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Base URL with the trailing slash removed
    pub fn normalized_base_url(&self) -> String {
        normalize_base_url(&self.base_url)
    }

    pub fn from_toml_str(content: &str) -> ApiResult<Self> {
        toml::from_str(content).map_err(|e| ApiError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> ApiResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Build a config from `TABLEKIT_URL`, `TABLEKIT_API_KEY` and `TABLEKIT_TIMEOUT`
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let base_url = lookup(ENV_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ApiError::Config(format!("{} is not set", ENV_URL)))?;
        let mut config = Self::new(base_url);
        config.api_key = lookup(ENV_API_KEY).filter(|v| !v.is_empty());
        if let Some(raw) = lookup(ENV_TIMEOUT) {
            config.timeout_seconds = raw.trim().parse().map_err(|_| {
                ApiError::Config(format!("{} must be a number of seconds, got {:?}", ENV_TIMEOUT, raw))
            })?;
        }
        Ok(config)
    }
}

/// Settings of one table view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewConfig {
    /// Rows per page
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Quiet period after the last search keystroke
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Minimum trimmed search length that triggers a filtered fetch
    #[serde(default = "default_min_search_chars")]
    pub min_search_chars: usize,
}

fn default_page_size() -> u64 {
    25
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_min_search_chars() -> usize {
    2
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            min_search_chars: default_min_search_chars(),
        }
    }
}

impl ViewConfig {
    /// Set the page size; zero is bumped to one
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_search_debounce_ms(mut self, ms: u64) -> Self {
        self.search_debounce_ms = ms;
        self
    }

    pub fn with_min_search_chars(mut self, chars: usize) -> Self {
        self.min_search_chars = chars;
        self
    }
}
