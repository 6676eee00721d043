//! RLM API client wrapper.

use axum::body::Bytes;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use tracing::{debug, error, instrument, warn};

use crate::config::Config;
use crate::error::{RelayError, Result};

/// Raw upstream answer, relayed as-is or wrapped in an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    /// Upstream status code.
    pub status: u16,
    /// Upstream `Content-Type`, if any.
    pub content_type: Option<String>,
    /// Upstream body.
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Whether the upstream answered 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// RLM capacity management API client.
#[derive(Debug, Clone)]
pub struct RlmClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Endpoint every request is POSTed to.
    url: String,
    /// Auth header, absent when no value is configured.
    auth: Option<(HeaderName, HeaderValue)>,
    /// Total request timeout in seconds.
    timeout_secs: u64,
}

impl RlmClient {
    /// Create a new RLM client from config.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(std::time::Duration::from_secs(10))
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()?;

        let auth = match config.header_value()? {
            Some(value) => Some((config.header_name()?, value)),
            None => None,
        };

        Ok(Self {
            http,
            url: config.rlm_api_url.clone(),
            auth,
            timeout_secs: config.rlm_timeout_secs,
        })
    }

    /// Get the upstream endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether requests carry the auth header.
    pub fn has_auth(&self) -> bool {
        self.auth.is_some()
    }

    /// POST a JSON body upstream and collect the full response.
    ///
    /// Any upstream status is a successful round trip. Only transport
    /// failures are errors.
    #[instrument(skip(self, body), fields(url = %self.url, auth = self.auth.is_some()))]
    pub async fn forward<T>(&self, body: &T) -> Result<UpstreamResponse>
    where
        T: Serialize + ?Sized,
    {
        let mut request = self.http.post(&self.url).json(body);
        if let Some((name, value)) = &self.auth {
            request = request.header(name.clone(), value.clone());
        }

        let response = request.send().await.map_err(|e| self.classify_error(e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                self.classify_error(e)
            } else {
                error!(error = %e, "Failed to read upstream body");
                RelayError::UpstreamBody(e.to_string())
            }
        })?;

        let upstream = UpstreamResponse {
            status,
            content_type,
            body,
        };

        if upstream.is_success() {
            debug!(status, bytes = upstream.body.len(), "Upstream accepted request");
        } else {
            warn!(status, bytes = upstream.body.len(), "Upstream returned non-success status");
        }

        Ok(upstream)
    }

    /// Classify a transport error.
    fn classify_error(&self, error: reqwest::Error) -> RelayError {
        if error.is_timeout() {
            warn!(timeout_secs = self.timeout_secs, "Upstream request timed out");
            RelayError::UpstreamTimeout {
                timeout_secs: self.timeout_secs,
            }
        } else if error.is_connect() {
            warn!(error = %error, "Failed to connect to upstream");
            RelayError::UpstreamUnreachable(error.to_string())
        } else {
            error!(error = %error, "Upstream request failed");
            RelayError::UpstreamUnreachable(error.to_string())
        }
    }
}
