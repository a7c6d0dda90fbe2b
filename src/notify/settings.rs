//! Webhook endpoint and time zone resolution for the notifier.

use std::fmt;
use std::time::Duration;

use chrono_tz::Tz;

use crate::error::ConfigError;

/// Environment variable holding the primary webhook URL.
pub const WEBHOOK_URL_ENV: &str = "DISCORD_WEBHOOK_URL";
/// Environment variable holding comma-separated backup webhook URLs.
pub const BACKUP_WEBHOOKS_ENV: &str = "DISCORD_BACKUP_WEBHOOKS";
/// Environment variable holding the IANA time zone for timestamps.
pub const TIMEZONE_ENV: &str = "ALERT_TIMEZONE";

pub const DEFAULT_TIMEZONE: &str = "America/New_York";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Raw notifier settings, before validation.
#[derive(Debug, Clone)]
pub struct NotifierSettings {
    /// Primary webhook URL.
    pub primary: Option<String>,
    /// Comma-separated backup webhook URLs.
    pub backups: Option<String>,
    /// IANA time zone name used for embed timestamps.
    pub timezone: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self {
            primary: None,
            backups: None,
            timezone: DEFAULT_TIMEZONE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl NotifierSettings {
    /// Creates settings with an explicit primary webhook.
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: Some(primary.into()),
            ..Self::default()
        }
    }

    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            primary: lookup(WEBHOOK_URL_ENV),
            backups: lookup(BACKUP_WEBHOOKS_ENV),
            timezone: lookup(TIMEZONE_ENV)
                .filter(|tz| !tz.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the backup webhook list.
    pub fn with_backups(mut self, backups: impl Into<String>) -> Self {
        self.backups = Some(backups.into());
        self
    }

    /// Sets the time zone name.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolves the ordered endpoint list, primary first.
    pub fn endpoints(&self) -> Result<Vec<Endpoint>, ConfigError> {
        let primary = self
            .primary
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::MissingWebhook)?;

        let mut endpoints = vec![Endpoint::new("primary", primary)];

        let backups = self
            .backups
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty());

        for (i, url) in backups.enumerate() {
            endpoints.push(Endpoint::new(format!("backup-{}", i + 1), url));
        }

        Ok(endpoints)
    }

    /// Parses the configured time zone.
    pub fn time_zone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .trim()
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone {
                name: self.timezone.clone(),
            })
    }
}

/// A single webhook destination.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    label: String,
    url: String,
}

impl Endpoint {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }

    /// Short name used in logs ("primary", "backup-1", ...).
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Full webhook URL, including its token.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// URL with the path stripped so the webhook token never reaches logs.
    pub fn redacted(&self) -> String {
        match reqwest::Url::parse(&self.url) {
            Ok(url) => match url.host_str() {
                Some(host) => format!("{}://{}/...", url.scheme(), host),
                None => format!("{}:...", url.scheme()),
            },
            Err(_) => "<invalid url>".to_string(),
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("label", &self.label)
            .field("url", &self.redacted())
            .finish()
    }
}
