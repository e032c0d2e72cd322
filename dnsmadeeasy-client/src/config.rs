//! Client configuration.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::http::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::utils::log_sanitizer::redact_key;

pub const PRODUCTION_BASE_URL: &str = "https://api.dnsmadeeasy.com/V2.0/";
pub const SANDBOX_BASE_URL: &str = "https://api.sandbox.dnsmadeeasy.com/V2.0/";

const DEFAULT_MEDIAN_FIRST_RETRY_DELAY_SECS: u64 = 10;
const DEFAULT_RETRY_COUNT: u32 = 5;

const fn default_true() -> bool {
    true
}

const fn default_median_first_retry_delay_secs() -> u64 {
    DEFAULT_MEDIAN_FIRST_RETRY_DELAY_SECS
}

const fn default_retry_count() -> u32 {
    DEFAULT_RETRY_COUNT
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

/// Settings for [`DnsMadeEasyClient::from_config`](crate::DnsMadeEasyClient::from_config).
///
/// Deserializes from camelCase keys; everything except the two keys is
/// optional:
///
/// ```json
/// { "apiKey": "...", "secretKey": "...", "sandbox": true, "retryCount": 3 }
/// ```
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub api_key: String,
    pub secret_key: String,
    /// Talk to the sandbox environment instead of production.
    #[serde(default)]
    pub sandbox: bool,
    /// When false, a rate-limited request fails on the first attempt.
    #[serde(default = "default_true")]
    pub retry_on_rate_limit: bool,
    #[serde(default = "default_median_first_retry_delay_secs")]
    pub median_first_retry_delay_secs: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            sandbox: false,
            retry_on_rate_limit: true,
            median_first_retry_delay_secs: DEFAULT_MEDIAN_FIRST_RETRY_DELAY_SECS,
            retry_count: DEFAULT_RETRY_COUNT,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }

    pub fn base_url(&self) -> &'static str {
        if self.sandbox {
            SANDBOX_BASE_URL
        } else {
            PRODUCTION_BASE_URL
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &redact_key(&self.api_key))
            .field("secret_key", &"****")
            .field("sandbox", &self.sandbox)
            .field("retry_on_rate_limit", &self.retry_on_rate_limit)
            .field(
                "median_first_retry_delay_secs",
                &self.median_first_retry_delay_secs,
            )
            .field("retry_count", &self.retry_count)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}
