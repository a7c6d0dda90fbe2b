//! Asset configuration validation.

pub mod report;
pub mod semantic;

use crate::config::model::AppConfig;

/// How serious a validation issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSeverity {
    /// Config is rejected.
    Error,
    /// Logged, config still loads.
    Warning,
}

/// One problem found in the config file.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    /// Field path, e.g. "assets.crypto[1]" or "logging.level".
    pub path: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    fn new(severity: ValidationSeverity, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            path: path.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Error, path, message)
    }

    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Warning, path, message)
    }

    /// Attaches a hint for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Issues collected while checking a config.
#[derive(Debug, Default)]
pub struct ValidationResult {
    issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// True if nothing blocks loading. Warnings are allowed.
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(ValidationSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(ValidationSeverity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    fn with_severity(&self, severity: ValidationSeverity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }
}

/// Checks the asset config for errors and warnings.
pub fn validate_config(config: &AppConfig) -> ValidationResult {
    semantic::validate(config)
}
