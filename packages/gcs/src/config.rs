//! Client configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//!
//! ```json
//! {
//!   "endpoint": "http://localhost:4443",
//!   "timeout_secs": 10,
//!   "page_size": 500,
//!   "default_headers": { "Authorization": "Bearer ..." }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Host of a storage emulator; the same variable Google's client libraries read.
pub const EMULATOR_HOST_VAR: &str = "STORAGE_EMULATOR_HOST";
pub const PAGE_SIZE_VAR: &str = "REMOTEPATH_GCS_PAGE_SIZE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GcsConfig {
    /// Base URL of the JSON API.
    pub endpoint: String,

    /// Per-request timeout.
    pub timeout_secs: u64,

    /// `maxResults` for listing; the server default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// Headers sent with every request.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub default_headers: HashMap<String, String>,
}

impl Default for GcsConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            page_size: None,
            default_headers: HashMap::new(),
        }
    }
}

impl GcsConfig {
    pub fn from_json_str(s: &str) -> Result<Self, Error> {
        let config: GcsConfig = serde_json::from_str(s).map_err(|e| Error::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("reading {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&contents)
    }

    /// Defaults overridden by `STORAGE_EMULATOR_HOST` and
    /// `REMOTEPATH_GCS_PAGE_SIZE`.
    pub fn from_env() -> Result<Self, Error> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        if let Some(host) = lookup(EMULATOR_HOST_VAR).filter(|h| !h.is_empty()) {
            self.endpoint = if host.contains("://") {
                host
            } else {
                format!("http://{}", host)
            };
        }

        if let Some(size) = lookup(PAGE_SIZE_VAR) {
            let size = size.parse().map_err(|e| Error::Config {
                message: format!("{}={:?}: {}", PAGE_SIZE_VAR, size, e),
            })?;
            self.page_size = Some(size);
        }

        self.validate()?;
        Ok(self)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.page_size == Some(0) {
            return Err(Error::Config {
                message: "page_size must be at least 1".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config {
                message: "timeout_secs must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
