//! Configuration validation for cql-tui.

use super::keys::KeySet;
use super::types::{AppConfig, ConnectionConfig, KeyBindings, TuiConfig};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.connection.validate());
        errors.extend(self.tui.validate());
        errors.extend(self.keys.validate());
        errors
    }
}

impl Validatable for ConnectionConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.addresses.is_empty() {
            errors.push(ConfigError::new(
                "connection.addresses",
                "at least one node address is required",
            ));
        }
        errors
    }
}

impl Validatable for TuiConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let valid_themes = ["dark", "light", "high-contrast"];
        if !valid_themes.contains(&self.theme.as_str()) {
            errors.push(ConfigError::new(
                "tui.theme",
                format!(
                    "Invalid theme '{}'. Valid options: {}",
                    self.theme,
                    valid_themes.join(", ")
                ),
            ));
        }
        if self.row_limit == 0 {
            errors.push(ConfigError::new("tui.row_limit", "must be at least 1"));
        }
        if !(10..=5000).contains(&self.tick_rate_ms) {
            errors.push(ConfigError::new(
                "tui.tick_rate_ms",
                "must be between 10 and 5000",
            ));
        }
        errors
    }
}

impl Validatable for KeyBindings {
    fn validate(&self) -> Vec<ConfigError> {
        let actions: [(&str, &Vec<String>); 6] = [
            ("keys.quit", &self.quit),
            ("keys.search", &self.search),
            ("keys.enter", &self.enter),
            ("keys.scan", &self.scan),
            ("keys.help", &self.help),
            ("keys.theme", &self.theme),
        ];

        let mut errors = Vec::new();
        for (field, labels) in actions {
            if labels.is_empty() {
                errors.push(ConfigError::new(field, "at least one key is required"));
                continue;
            }
            if let Err(e) = KeySet::parse(labels) {
                errors.push(ConfigError::new(field, e.to_string()));
            }
        }
        errors
    }
}
