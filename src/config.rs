//! Application configuration loaded from environment variables.

use std::time::Duration;

use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// Default RLM `AIScheduleConfirmation` endpoint.
pub const DEFAULT_RLM_API_URL: &str =
    "https://apiqa.ryder.com/rlm/ryderview/capacitymanagement/api/ScheduleAppointment/AIScheduleConfirmation";

/// Filter used by `--verbose`.
pub const VERBOSE_LOG_DIRECTIVES: &str = "rlm_relay=debug,tower_http=debug,info";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Upstream Credentials ===
    /// Value injected verbatim as the auth header. Empty means no header.
    #[serde(default)]
    pub api_header_value: String,

    /// Name of the auth header sent upstream.
    #[serde(default = "default_header_name")]
    pub api_header_name: String,

    // === Upstream Endpoint ===
    /// RLM endpoint every request is forwarded to.
    #[serde(default = "default_rlm_api_url")]
    pub rlm_api_url: String,

    /// Total timeout for one upstream round trip.
    #[serde(default = "default_timeout_secs")]
    pub rlm_timeout_secs: u64,

    // === Server Configuration ===
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Wrap relayed responses in the schedule envelope.
    #[serde(default)]
    pub response_envelope: bool,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_header_name() -> String {
    "Authorization".to_string()
}

fn default_rlm_api_url() -> String {
    DEFAULT_RLM_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_header_value: String::new(),
            api_header_name: default_header_name(),
            rlm_api_url: default_rlm_api_url(),
            rlm_timeout_secs: default_timeout_secs(),
            host: default_host(),
            port: default_port(),
            response_envelope: false,
            rust_log: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.rlm_api_url).map_err(|e| ConfigError::Invalid {
            var: "RLM_API_URL",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                var: "RLM_API_URL",
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        self.header_name()?;
        self.header_value()?;

        if self.rlm_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "RLM_TIMEOUT_SECS",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Parsed auth header name.
    pub fn header_name(&self) -> Result<HeaderName, ConfigError> {
        HeaderName::from_bytes(self.api_header_name.as_bytes()).map_err(|e| ConfigError::Invalid {
            var: "API_HEADER_NAME",
            reason: e.to_string(),
        })
    }

    /// Parsed auth header value, `None` when unset.
    pub fn header_value(&self) -> Result<Option<HeaderValue>, ConfigError> {
        if self.api_header_value.is_empty() {
            return Ok(None);
        }

        let mut value =
            HeaderValue::from_str(&self.api_header_value).map_err(|_| ConfigError::Invalid {
                var: "API_HEADER_VALUE",
                reason: "contains characters not allowed in a header value".to_string(),
            })?;
        value.set_sensitive(true);
        Ok(Some(value))
    }

    /// Tracing filter directives. `verbose` forces debug output for the relay.
    pub fn log_directives(&self, verbose: bool) -> String {
        if verbose {
            VERBOSE_LOG_DIRECTIVES.to_string()
        } else if self.rust_log.trim().is_empty() {
            default_log_level()
        } else {
            self.rust_log.clone()
        }
    }

    /// Whether an auth header will be sent upstream.
    pub fn has_credentials(&self) -> bool {
        !self.api_header_value.is_empty()
    }

    /// Upstream request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.rlm_timeout_secs)
    }

    /// Auth header value with everything but the last four characters hidden.
    pub fn masked_header_value(&self) -> String {
        let chars: Vec<char> = self.api_header_value.chars().collect();
        match chars.len() {
            0 => "(unset)".to_string(),
            n if n <= 4 => "*".repeat(n),
            n => {
                let tail: String = chars[n - 4..].iter().collect();
                format!("{}{}", "*".repeat(n - 4), tail)
            }
        }
    }
}
