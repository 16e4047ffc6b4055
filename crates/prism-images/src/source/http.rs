//! HTTP(S) image source

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use prism_config::HttpSourceConfig;

use super::{ImageSource, ensure_blocking_context, is_http_reference};
use crate::error::ImageError;

/// Per-request timeout when none is configured
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent when none is configured
const DEFAULT_USER_AGENT: &str = concat!("prism/", env!("CARGO_PKG_VERSION"));

/// Fetches images over HTTP(S)
///
/// Uses an injected `reqwest::Client` when given one, otherwise builds
/// clients lazily on first use. The blocking client is only built when the
/// blocking API is used.
pub struct HttpImageSource {
    timeout: Duration,
    user_agent: String,
    client: OnceLock<reqwest::Client>,
    blocking_client: OnceLock<reqwest::blocking::Client>,
}

impl HttpImageSource {
    /// Source with default timeout and lazily built clients
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            client: OnceLock::new(),
            blocking_client: OnceLock::new(),
        }
    }

    /// Source sharing an externally managed async client
    ///
    /// The client's own timeout and pooling settings apply to async fetches.
    pub fn with_client(client: reqwest::Client) -> Self {
        let source = Self::new();
        let _ = source.client.set(client);
        source
    }

    /// Source built from configuration
    pub fn from_config(config: &HttpSourceConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            user_agent: config
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
            client: OnceLock::new(),
            blocking_client: OnceLock::new(),
        }
    }

    /// Override the per-request timeout for lazily built clients
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn client(&self, reference: &str) -> Result<&reqwest::Client, ImageError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| ImageError::fetch_failed(reference, e))?;

        Ok(self.client.get_or_init(|| client))
    }

    fn blocking_client(&self, reference: &str) -> Result<&reqwest::blocking::Client, ImageError> {
        if let Some(client) = self.blocking_client.get() {
            return Ok(client);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| ImageError::fetch_failed(reference, e))?;

        Ok(self.blocking_client.get_or_init(|| client))
    }
}

impl Default for HttpImageSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    fn name(&self) -> &str {
        "http"
    }

    fn can_handle(&self, reference: &str) -> bool {
        is_http_reference(reference)
    }

    fn get_image(&self, reference: &str) -> Result<Bytes, ImageError> {
        ensure_blocking_context(reference)?;

        let response = self
            .blocking_client(reference)?
            .get(reference)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| {
                tracing::warn!(reference, error = %e, "image download failed");
                ImageError::fetch_failed(reference, e)
            })?;

        let data = response.bytes().map_err(|e| ImageError::fetch_failed(reference, e))?;
        tracing::debug!(reference, bytes = data.len(), "downloaded image");
        Ok(data)
    }

    async fn get_image_async(&self, reference: &str) -> Result<Bytes, ImageError> {
        let response = self
            .client(reference)?
            .get(reference)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                tracing::warn!(reference, error = %e, "image download failed");
                ImageError::fetch_failed(reference, e)
            })?;

        let data = response.bytes().await.map_err(|e| ImageError::fetch_failed(reference, e))?;
        tracing::debug!(reference, bytes = data.len(), "downloaded image");
        Ok(data)
    }
}
