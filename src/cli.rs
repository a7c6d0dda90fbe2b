//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::notify::discord::{Embed, DEFAULT_COLOR, DEFAULT_TITLE};
use crate::notify::settings::{
    BACKUP_WEBHOOKS_ENV, DEFAULT_TIMEZONE, TIMEZONE_ENV, WEBHOOK_URL_ENV,
};

/// Discord alerting for market structure changes.
#[derive(Parser, Debug)]
#[command(name = "market-alert", version, about, long_about = None)]
pub struct Cli {
    /// Path to the asset configuration file.
    #[arg(short, long, default_value = "config/assets.yaml", env = "CONFIG_PATH", global = true)]
    pub config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Returns the log level forced by verbosity flags, if any.
    pub fn log_level(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a one-off alert to the configured webhooks.
    Send(SendArgs),

    /// Validate the configuration file.
    #[command(name = "config-validate")]
    ConfigValidate,

    /// Display the parsed configuration.
    #[command(name = "config-show")]
    ConfigShow,
}

/// Arguments for the send subcommand.
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Alert body text.
    pub message: String,

    /// Embed title.
    #[arg(long, default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Embed color as a decimal integer.
    #[arg(long, default_value_t = DEFAULT_COLOR)]
    pub color: u32,

    /// Extra embed as a JSON object; may be repeated.
    #[arg(long = "embed", value_parser = parse_embed)]
    pub embeds: Vec<Embed>,

    /// Primary webhook URL.
    #[arg(long, env = WEBHOOK_URL_ENV, hide_env_values = true)]
    pub webhook: Option<String>,

    /// Comma-separated backup webhook URLs.
    #[arg(long, env = BACKUP_WEBHOOKS_ENV, hide_env_values = true)]
    pub backup_webhooks: Option<String>,

    /// Time zone for the embed timestamp.
    #[arg(long, env = TIMEZONE_ENV, default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,

    /// Per-request timeout in seconds.
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Send even if Discord notifications are disabled in the config file.
    #[arg(long, default_value = "false")]
    pub force: bool,
}

fn parse_embed(raw: &str) -> Result<Embed, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid embed JSON: {}", e))
}
