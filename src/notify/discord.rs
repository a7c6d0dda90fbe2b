//! Discord webhook notifications with backup fallback.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::settings::{Endpoint, NotifierSettings};
use super::transport::{HttpTransport, WebhookTransport};
use crate::error::{ConfigError, NotificationError};

/// Title used when the caller does not provide one.
pub const DEFAULT_TITLE: &str = "Market Structure Change Alert";
/// Embed color used when the caller does not provide one.
pub const DEFAULT_COLOR: u32 = 3447003; // Blue

const FOOTER_TEXT: &str = "Market Structure Monitor";
const FOOTER_ICON_URL: &str = "https://cdn-icons-png.flaticon.com/512/2933/2933116.png";
const THUMBNAIL_URL: &str = "https://cdn-icons-png.flaticon.com/512/2936/2936775.png";
const TIME_FIELD_NAME: &str = "Time (NY)";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

// Discord message limits, in characters.
const CONTENT_LIMIT: usize = 2000;
const TITLE_LIMIT: usize = 256;
const DESCRIPTION_LIMIT: usize = 4096;

/// Optional parts of an alert.
#[derive(Debug, Clone, Default)]
pub struct MessageOptions {
    /// Embed title, defaults to [`DEFAULT_TITLE`].
    pub title: Option<String>,
    /// Embed color, defaults to [`DEFAULT_COLOR`].
    pub color: Option<u32>,
    /// Extra embeds appended after the generated one.
    pub embeds: Vec<Embed>,
}

impl MessageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }
}

/// Outcome of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Label of the endpoint that accepted the payload.
    pub endpoint: String,
    /// Number of endpoints tried, including the one that succeeded.
    pub attempts: usize,
}

/// Sends alerts to a primary Discord webhook, falling back to backups.
pub struct DiscordNotifier<T = HttpTransport> {
    /// Endpoints in delivery order, primary first.
    endpoints: Vec<Endpoint>,
    /// Zone used for the embed timestamp and time field.
    time_zone: Tz,
    /// HTTP transport.
    transport: T,
}

impl DiscordNotifier<HttpTransport> {
    /// Creates a notifier backed by reqwest.
    pub fn new(settings: &NotifierSettings) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(settings.timeout)?;
        Self::with_transport(settings, transport)
    }
}

impl<T: WebhookTransport> DiscordNotifier<T> {
    /// Creates a notifier over a custom transport.
    pub fn with_transport(settings: &NotifierSettings, transport: T) -> Result<Self, ConfigError> {
        let endpoints = settings.endpoints()?;
        let time_zone = settings.time_zone()?;

        info!(
            endpoints = endpoints.len(),
            time_zone = %time_zone,
            "Discord notifier configured"
        );

        Ok(Self {
            endpoints,
            time_zone,
            transport,
        })
    }

    /// Returns the endpoints in delivery order.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Returns the configured time zone.
    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// Sends an alert, returning whether any endpoint accepted it.
    ///
    /// Delivery failures never escape this method; they are logged and
    /// reported as `false`.
    pub async fn send_message(&self, message: &str, options: MessageOptions) -> bool {
        match self.deliver(message, options).await {
            Ok(_) => true,
            Err(NotificationError::Payload(e)) => {
                error!(error = %e, "Unexpected error building Discord notification");
                false
            }
            Err(_) => false,
        }
    }

    /// Sends an alert and reports which endpoint took it, or why all failed.
    pub async fn deliver(
        &self,
        message: &str,
        options: MessageOptions,
    ) -> Result<Delivery, NotificationError> {
        let payload = self.build_payload(message, &options, Utc::now());
        let body = serde_json::to_vec(&payload)?;

        let mut failures = Vec::new();

        for endpoint in self.endpoints.iter().filter(|e| !e.url().trim().is_empty()) {
            match self.transport.post(endpoint.url(), &body).await {
                Ok(status) if status.is_success() => {
                    info!(
                        endpoint = endpoint.label(),
                        status = %status,
                        attempts = failures.len() + 1,
                        "Discord notification sent"
                    );
                    return Ok(Delivery {
                        endpoint: endpoint.label().to_string(),
                        attempts: failures.len() + 1,
                    });
                }
                Ok(status) => {
                    warn!(
                        endpoint = endpoint.label(),
                        url = %endpoint.redacted(),
                        status = %status,
                        "Discord webhook rejected notification"
                    );
                    failures.push(NotificationError::Rejected {
                        endpoint: endpoint.label().to_string(),
                        status,
                    });
                }
                Err(e) => {
                    error!(
                        endpoint = endpoint.label(),
                        url = %endpoint.redacted(),
                        error = %e,
                        "Discord webhook request failed"
                    );
                    failures.push(NotificationError::Unreachable {
                        endpoint: endpoint.label().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        error!(attempts = failures.len(), "All Discord webhooks failed");
        Err(NotificationError::Exhausted { failures })
    }

    /// Builds the webhook payload for the instant `now`.
    pub fn build_payload(
        &self,
        message: &str,
        options: &MessageOptions,
        now: DateTime<Utc>,
    ) -> WebhookPayload {
        let title = options.title.as_deref().unwrap_or(DEFAULT_TITLE);
        let local = now.with_timezone(&self.time_zone);

        let embed = Embed {
            title: Some(truncate(title, TITLE_LIMIT)),
            description: Some(truncate(message, DESCRIPTION_LIMIT)),
            color: Some(options.color.unwrap_or(DEFAULT_COLOR)),
            timestamp: Some(local.to_rfc3339()),
            footer: Some(EmbedFooter {
                text: FOOTER_TEXT.to_string(),
                icon_url: Some(FOOTER_ICON_URL.to_string()),
            }),
            thumbnail: Some(EmbedImage {
                url: THUMBNAIL_URL.to_string(),
            }),
            fields: vec![EmbedField {
                name: TIME_FIELD_NAME.to_string(),
                value: local.format(TIME_FORMAT).to_string(),
                inline: true,
            }],
        };

        let mut embeds = Vec::with_capacity(1 + options.embeds.len());
        embeds.push(embed);
        embeds.extend(options.embeds.iter().cloned());

        WebhookPayload {
            content: truncate(&format!("🔔 **{}**\n{}", title, message), CONTENT_LIMIT),
            embeds,
        }
    }
}

/// Discord webhook payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookPayload {
    pub content: String,
    pub embeds: Vec<Embed>,
}

/// Discord embed structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    /// ISO-8601 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedImage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

/// Discord embed field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

/// Discord embed footer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

/// Discord embed image reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedImage {
    pub url: String,
}

/// Truncates a string to at most `max_chars` characters.
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
