//! Configuration types for cql-tui.

use serde::{Deserialize, Serialize};

/// Default contact point when neither the CLI nor the config file names one.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:9042";

// ============================================================================
// Application Configuration
// ============================================================================

/// Top-level configuration, loaded from a YAML file and overridden by CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Cluster connection settings
    pub connection: ConnectionConfig,
    /// TUI behavior settings
    pub tui: TuiConfig,
    /// Key bindings for controller actions
    pub keys: KeyBindings,
}

// ============================================================================
// Connection Configuration
// ============================================================================

/// Where and how to open the driver session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Contact points (host:port)
    pub addresses: Vec<String>,
    /// Keyspace to explore; resolved from the cluster when absent
    pub keyspace: Option<String>,
    /// Username for password authentication
    pub username: Option<String>,
    /// Password for password authentication
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            addresses: vec![DEFAULT_ADDRESS.to_string()],
            keyspace: None,
            username: None,
            password: None,
        }
    }
}

impl ConnectionConfig {
    /// Parse a comma-separated address list, dropping blanks.
    #[must_use]
    pub fn parse_addresses(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(String::from)
            .collect()
    }

    /// Credentials, only when both halves are present.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

// ============================================================================
// TUI Configuration
// ============================================================================

/// TUI-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TuiConfig {
    /// Theme name: "dark", "light", or "high-contrast"
    pub theme: String,
    /// Re-indent JSON values in the details pane
    pub pretty_json: bool,
    /// Maximum rows fetched when opening a table or view
    pub row_limit: u32,
    /// Event poll interval in milliseconds
    pub tick_rate_ms: u64,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            pretty_json: true,
            row_limit: 10,
            tick_rate_ms: 250,
        }
    }
}

// ============================================================================
// Key Bindings
// ============================================================================

/// Key labels for each controller action.
///
/// Labels are parsed by [`super::keys::KeySpec`], e.g. `"q"`, `"ctrl+c"`, `"enter"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct KeyBindings {
    pub quit: Vec<String>,
    pub search: Vec<String>,
    pub enter: Vec<String>,
    pub scan: Vec<String>,
    pub help: Vec<String>,
    pub theme: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        fn keys(labels: &[&str]) -> Vec<String> {
            labels.iter().map(|s| (*s).to_string()).collect()
        }
        Self {
            quit: keys(&["q", "ctrl+c"]),
            search: keys(&["/"]),
            enter: keys(&["enter", "space"]),
            scan: keys(&["r"]),
            help: keys(&["?"]),
            theme: keys(&["T"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_addresses() {
        assert_eq!(
            ConnectionConfig::parse_addresses("10.0.0.1:9042, 10.0.0.2:9042,,"),
            vec!["10.0.0.1:9042", "10.0.0.2:9042"]
        );
        assert!(ConnectionConfig::parse_addresses(" , ").is_empty());
    }

    #[test]
    fn test_credentials_require_both_halves() {
        let mut conn = ConnectionConfig {
            username: Some("cassandra".into()),
            ..ConnectionConfig::default()
        };
        assert!(conn.credentials().is_none());

        conn.password = Some("secret".into());
        assert_eq!(conn.credentials(), Some(("cassandra", "secret")));
    }

    #[test]
    fn test_yaml_defaults_fill_missing_sections() {
        let config: AppConfig = serde_yaml::from_str("tui:\n  row_limit: 3\n").unwrap();
        assert_eq!(config.tui.row_limit, 3);
        assert!(config.tui.pretty_json);
        assert_eq!(config.connection.addresses, vec![DEFAULT_ADDRESS]);
        assert_eq!(config.keys, KeyBindings::default());
    }
}
