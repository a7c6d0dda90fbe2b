//! HTTP transport used to post webhook payloads.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

use crate::error::{ConfigError, TransportError};

/// Performs a single JSON POST to a webhook URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Posts `body` and returns the response status. The body is not read.
    async fn post(&self, url: &str, body: &[u8]) -> Result<StatusCode, TransportError>;
}

/// reqwest-backed transport with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookTransport for HttpTransport {
    async fn post(&self, url: &str, body: &[u8]) -> Result<StatusCode, TransportError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| {
                // The URL carries the webhook token.
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Http(e.without_url())
                }
            })?;

        Ok(response.status())
    }
}
