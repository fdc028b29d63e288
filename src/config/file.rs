//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::AppConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".cql-tui.yaml",
    ".cql-tui.yml",
    "cql-tui.yaml",
    "cql-tui.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. User config directory (~/.config/cql-tui/)
/// 4. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if let Some(path) = find_config_in_dir(&cwd) {
            return Some(path);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        if let Some(path) = find_config_in_dir(&config_dir.join("cql-tui")) {
            return Some(path);
        }
    }

    dirs::home_dir().and_then(|home| find_config_in_dir(&home))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

/// Load configuration from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(ConfigFileError::Io)?;
    serde_yaml::from_str(&content).map_err(ConfigFileError::Parse)
}

/// Load configuration from the discovered file, or defaults when none exists.
///
/// An explicit path that does not exist is an error; a missing discovered file is not.
pub fn load_or_default(
    explicit_path: Option<&Path>,
) -> Result<(AppConfig, Option<PathBuf>), ConfigFileError> {
    if let Some(path) = explicit_path {
        if !path.exists() {
            return Err(ConfigFileError::NotFound(path.to_path_buf()));
        }
    }
    match discover_config_file(explicit_path) {
        Some(path) => {
            let config = load_config_file(&path)?;
            Ok((config, Some(path)))
        }
        None => Ok((AppConfig::default(), None)),
    }
}

/// Example config file content written by `--print-config`.
#[must_use]
pub fn generate_example_config() -> String {
    let config = AppConfig::default();
    let body = serde_yaml::to_string(&config).unwrap_or_default();
    format!("# cql-tui configuration\n# Place as .cql-tui.yaml or ~/.config/cql-tui/cql-tui.yaml\n{body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "connection:\n  addresses: [\"db1:9042\"]\n  keyspace: shop\ntui:\n  pretty_json: false"
        )
        .unwrap();

        let config = load_config_file(file.path()).unwrap();
        assert_eq!(config.connection.addresses, vec!["db1:9042"]);
        assert_eq!(config.connection.keyspace.as_deref(), Some("shop"));
        assert!(!config.tui.pretty_json);
    }

    #[test]
    fn test_missing_explicit_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(
            load_or_default(Some(&missing)),
            Err(ConfigFileError::NotFound(_))
        ));
    }

    #[test]
    fn test_find_config_in_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_config_in_dir(dir.path()).is_none());
        std::fs::write(dir.path().join("cql-tui.yml"), "{}").unwrap();
        assert_eq!(
            find_config_in_dir(dir.path()),
            Some(dir.path().join("cql-tui.yml"))
        );
    }

    #[test]
    fn test_example_config_parses_back() {
        let text = generate_example_config();
        let config: AppConfig = serde_yaml::from_str(&text).unwrap();
        assert_eq!(config.tui, AppConfig::default().tui);
    }
}
