//! Market Alert - Discord webhook alerting for market structure changes.
//!
//! This library formats market events into Discord embeds and delivers them
//! to a primary webhook with ordered fallback to backup webhooks. It also
//! loads and validates the asset monitoring configuration file.

pub mod cli;
pub mod config;
pub mod error;
pub mod notify;
pub mod validation;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::{Cli, Commands, SendArgs};
use crate::config::model::LoggingConfig;
use crate::config::AppConfig;
use crate::notify::{DiscordNotifier, MessageOptions, NotifierSettings};

/// Runs the CLI with the provided arguments.
pub async fn run(cli: Cli) -> Result<()> {
    // The config file is optional for `send`.
    let loaded = config::loader::load_from_path(&cli.config);
    setup_logging(&cli, loaded.as_ref().ok())?;

    match cli.command {
        Commands::Send(args) => {
            let config = match loaded {
                Ok(config) => Some(config),
                Err(e) => {
                    warn!(error = %e, "Config file unavailable, sending with defaults");
                    None
                }
            };
            send(args, config).await
        }
        Commands::ConfigValidate => validate_config(&cli.config),
        Commands::ConfigShow => show_config(&cli.config),
    }
}

/// Initializes the tracing subscriber for structured logging.
fn setup_logging(cli: &Cli, config: Option<&AppConfig>) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let Some(directive) =
        log_directive(rust_log, cli.log_level(), config.map(|c| &c.logging))
    else {
        return Ok(());
    };

    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = fmt()
        .with_env_filter(filter)
        .json()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .try_init();

    // An embedding process may already own the global subscriber.
    if let Err(e) = installed {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }

    Ok(())
}

/// Picks the log filter: `RUST_LOG`, then `-v` flags, then `logging.level`.
///
/// Returns `None` when the config turns logging off and neither `RUST_LOG`
/// nor `-v` asks for it.
fn log_directive(
    rust_log: Option<String>,
    verbosity: Option<&'static str>,
    logging: Option<&LoggingConfig>,
) -> Option<String> {
    if let Some(env) = rust_log.filter(|v| !v.trim().is_empty()) {
        return Some(env);
    }
    if let Some(level) = verbosity {
        return Some(level.to_string());
    }
    match logging {
        Some(logging) if !logging.enabled => None,
        Some(logging) => Some(logging.filter_directive().to_string()),
        None => Some("info".to_string()),
    }
}

/// Sends a single alert.
async fn send(args: SendArgs, config: Option<AppConfig>) -> Result<()> {
    if config.is_some_and(|c| !c.discord_enabled()) && !args.force {
        info!("Discord notifications disabled in config, not sending");
        return Ok(());
    }

    let settings = NotifierSettings {
        primary: args.webhook,
        backups: args.backup_webhooks,
        ..NotifierSettings::default()
    }
    .with_timezone(args.timezone)
    .with_timeout(Duration::from_secs(args.timeout_secs));

    let notifier = DiscordNotifier::new(&settings).context("Failed to configure Discord notifier")?;

    let options = MessageOptions {
        title: Some(args.title),
        color: Some(args.color),
        embeds: args.embeds,
    };

    let delivery = notifier
        .deliver(&args.message, options)
        .await
        .context("Alert was not delivered")?;
    println!(
        "Alert delivered via {} after {} attempt(s), timestamped in {}.",
        delivery.endpoint,
        delivery.attempts,
        notifier.time_zone()
    );

    Ok(())
}

/// Validates the configuration file and reports any issues.
fn validate_config(config_path: &Path) -> Result<()> {
    let config = config::loader::load_and_validate(config_path)?;
    let result = validation::validate_config(&config);

    println!("{}.", validation::report::format_brief_summary(&result));
    println!(
        "Found {} symbol(s) in {} asset class(es):",
        config.symbols().count(),
        config.assets.len()
    );
    for (class, symbols) in &config.assets {
        println!("  - {} ({}): {}", class, symbols.len(), symbols.join(", "));
    }
    println!(
        "Discord notifications: {}",
        if config.discord_enabled() { "enabled" } else { "disabled" }
    );

    Ok(())
}

/// Displays the parsed configuration.
fn show_config(config_path: &Path) -> Result<()> {
    let config = config::loader::load_and_validate(config_path)?;
    let yaml = serde_yaml::to_string(&config)?;
    println!("{}", yaml);
    Ok(())
}
