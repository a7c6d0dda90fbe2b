//! Semantic validation for configuration values.

use std::collections::HashMap;

use crate::config::model::{AppConfig, LoggingConfig, MonitoringConfig};

use super::{ValidationIssue, ValidationResult};

/// Accepted log level names, compared case-insensitively.
const VALID_LOG_LEVELS: &[&str] = &[
    "trace", "debug", "info", "warn", "warning", "error", "critical",
];

/// Intervals below this many seconds risk provider throttling.
const MIN_RECOMMENDED_INTERVAL: u64 = 60;

/// Validates semantic correctness of configuration values.
pub fn validate(config: &AppConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    validate_assets(config, &mut result);
    validate_logging(&config.logging, &mut result);
    validate_monitoring(&config.monitoring, &mut result);

    result
}

fn validate_assets(config: &AppConfig, result: &mut ValidationResult) {
    if config.assets.is_empty() {
        result.add(
            ValidationIssue::error("assets", "No assets configured")
                .with_suggestion("Add at least one asset class, e.g. `crypto: [BTC-USD]`"),
        );
        return;
    }

    // symbol -> first location it was seen
    let mut seen: HashMap<String, String> = HashMap::new();

    for (class, symbols) in &config.assets {
        let prefix = format!("assets.{}", class);

        if class.trim().is_empty() {
            result.add(ValidationIssue::error(&prefix, "Asset class name is empty"));
        }

        if symbols.is_empty() {
            result.add(ValidationIssue::error(
                &prefix,
                format!("Asset class '{}' has no symbols", class),
            ));
            continue;
        }

        for (i, symbol) in symbols.iter().enumerate() {
            let path = format!("{}[{}]", prefix, i);
            let symbol = symbol.trim();

            if symbol.is_empty() {
                result.add(ValidationIssue::error(&path, "Symbol is empty"));
                continue;
            }

            let key = symbol.to_ascii_uppercase();
            if let Some(first) = seen.get(&key) {
                result.add(
                    ValidationIssue::error(&path, format!("Duplicate symbol: '{}'", symbol))
                        .with_suggestion(format!("Already listed at {}", first)),
                );
            } else {
                seen.insert(key, path);
            }
        }
    }
}

fn validate_logging(logging: &LoggingConfig, result: &mut ValidationResult) {
    let level = logging.level.trim().to_ascii_lowercase();
    if !VALID_LOG_LEVELS.contains(&level.as_str()) {
        result.add(
            ValidationIssue::error(
                "logging.level",
                format!("Unknown log level '{}'", logging.level),
            )
            .with_suggestion(format!("Did you mean '{}'?", find_similar_level(&level))),
        );
    }
}

fn validate_monitoring(monitoring: &MonitoringConfig, result: &mut ValidationResult) {
    if monitoring.interval_seconds == 0 {
        result.add(ValidationIssue::error(
            "monitoring.interval_seconds",
            "Monitoring interval must be greater than 0",
        ));
    } else if monitoring.interval_seconds < MIN_RECOMMENDED_INTERVAL {
        result.add(
            ValidationIssue::warning(
                "monitoring.interval_seconds",
                format!(
                    "Interval of {}s is very short for 15 minute candles",
                    monitoring.interval_seconds
                ),
            )
            .with_suggestion(format!("Consider at least {} seconds", MIN_RECOMMENDED_INTERVAL)),
        );
    }
}

/// Finds the most similar log level using Levenshtein distance.
fn find_similar_level(input: &str) -> &'static str {
    VALID_LOG_LEVELS
        .iter()
        .min_by_key(|level| strsim::levenshtein(input, level))
        .copied()
        .unwrap_or("info")
}
