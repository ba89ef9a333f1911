use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://meowfacts.herokuapp.com";
pub const DEFAULT_DATA_FILE: &str = "meowfacts_master_dataset.json";

#[derive(Debug, Clone)]
pub struct Config {
    // Upstream API
    pub base_url: String,

    // Dataset
    pub data_file: String,

    // Request behavior
    pub request_timeout: Duration,
    pub request_delay: Duration,
    pub max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_file: DEFAULT_DATA_FILE.to_string(),
            request_timeout: Duration::from_secs(10),
            request_delay: Duration::from_millis(200),
            max_attempts: 5,
        }
    }
}

impl Config {
    /// Build the configuration from the environment. Every setting is optional.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            base_url: std::env::var("MEOWFACTS_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),

            data_file: std::env::var("MEOWFACTS_DATA_FILE").unwrap_or(defaults.data_file),

            request_timeout: std::env::var("MEOWFACTS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            request_delay: std::env::var("MEOWFACTS_REQUEST_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_delay),
            max_attempts: std::env::var("MEOWFACTS_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &u32| *n >= 1)
                .unwrap_or(defaults.max_attempts),
        })
    }

    /// Endpoint returning one batch of facts for `lang`/`count`
    pub fn facts_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }

    /// Metadata endpoint listing the available languages
    pub fn options_url(&self) -> String {
        format!("{}/options", self.base_url.trim_end_matches('/'))
    }

    /// Shared HTTP client; every request is bounded by `request_timeout`
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .user_agent(concat!("meowfacts-collector/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")
    }
}
