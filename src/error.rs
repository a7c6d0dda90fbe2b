//! Error types for the market alert notifier.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Configuration loading and notifier construction errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {message}")]
    ParseFailed { path: PathBuf, message: String },

    #[error("Config validation failed with {error_count} error(s)")]
    ValidationFailed { error_count: usize },

    #[error("No Discord webhook configured (set DISCORD_WEBHOOK_URL or pass one explicitly)")]
    MissingWebhook,

    #[error("Unknown time zone '{name}'")]
    InvalidTimezone { name: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Failure of a single HTTP POST, before any status code is known.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Webhook '{endpoint}' rejected the payload with HTTP {status}")]
    Rejected { endpoint: String, status: StatusCode },

    #[error("Webhook '{endpoint}' unreachable: {message}")]
    Unreachable { endpoint: String, message: String },

    #[error("All {} webhook(s) failed", .failures.len())]
    Exhausted { failures: Vec<NotificationError> },

    #[error("Failed to serialize webhook payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl NotificationError {
    /// Returns the per-endpoint failures behind an `Exhausted` error.
    pub fn failures(&self) -> &[NotificationError] {
        match self {
            Self::Exhausted { failures } => failures,
            _ => std::slice::from_ref(self),
        }
    }

    /// True when no endpoint could be reached at all.
    pub fn all_unreachable(&self) -> bool {
        let failures = self.failures();
        !failures.is_empty()
            && failures
                .iter()
                .all(|f| matches!(f, Self::Unreachable { .. }))
    }

    /// True when every endpoint answered but refused the payload.
    pub fn all_rejected(&self) -> bool {
        let failures = self.failures();
        !failures.is_empty() && failures.iter().all(|f| matches!(f, Self::Rejected { .. }))
    }
}
