//! Configuration data structures.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root of the asset monitoring configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Monitored symbols grouped by asset class (e.g. "crypto", "forex").
    pub assets: BTreeMap<String, Vec<String>>,

    /// Notification toggles.
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Monitoring loop settings.
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

impl AppConfig {
    /// Iterates over every `(asset class, symbol)` pair.
    pub fn symbols(&self) -> impl Iterator<Item = (&str, &str)> {
        self.assets.iter().flat_map(|(class, symbols)| {
            symbols
                .iter()
                .map(move |symbol| (class.as_str(), symbol.as_str()))
        })
    }

    /// Returns true if Discord alerts are turned on.
    pub fn discord_enabled(&self) -> bool {
        self.notification.discord.enabled
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NotificationConfig {
    /// Discord webhook toggles.
    #[serde(default)]
    pub discord: DiscordToggle,
}

/// Discord notification toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordToggle {
    /// Whether alerts are posted to Discord.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether to emit logs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Logging level (trace, debug, info, warning, error, critical).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LoggingConfig {
    /// Maps the configured level onto a tracing filter directive.
    pub fn filter_directive(&self) -> &'static str {
        match self.level.trim().to_ascii_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "warn" | "warning" => "warn",
            "error" | "critical" => "error",
            _ => "info",
        }
    }
}

/// Monitoring loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Seconds between market structure checks.
    #[serde(default = "default_interval", alias = "interval")]
    pub interval_seconds: u64,
}

// Default value functions

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_interval() -> u64 {
    900
}

impl Default for DiscordToggle {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval(),
        }
    }
}
