//! Unified error types for cql-tui.
//!
//! Startup failures (`Connection`, `MetadataFetch`, `Config`) abort the process.
//! Once the UI is running, the controller turns every error into visible,
//! non-terminating state instead of propagating it.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error raised by the database driver.
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for cql-tui operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CqlTuiError {
    /// Opening the driver session failed or no usable keyspace exists
    #[error("Connection failed: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<DriverError>,
    },

    /// Reading the keyspace schema snapshot failed
    #[error("Failed to fetch metadata for keyspace '{keyspace}': {message}")]
    MetadataFetch {
        keyspace: String,
        message: String,
        #[source]
        source: Option<DriverError>,
    },

    /// Reading the rows of a selected entity failed
    #[error("Failed to fetch rows for {entity}: {message}")]
    DetailsFetch {
        entity: String,
        message: String,
        #[source]
        source: Option<DriverError>,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl CqlTuiError {
    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a driver failure raised while opening the session
    pub fn connection_from(source: impl Into<DriverError>) -> Self {
        let source = source.into();
        Self::Connection {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a metadata fetch error
    pub fn metadata(keyspace: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::MetadataFetch {
            keyspace: keyspace.into(),
            message: message.to_string(),
            source: None,
        }
    }

    /// Wrap a driver failure raised while reading the schema
    pub fn metadata_from(keyspace: impl Into<String>, source: impl Into<DriverError>) -> Self {
        let source = source.into();
        Self::MetadataFetch {
            keyspace: keyspace.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a details fetch error
    pub fn details(entity: impl std::fmt::Display, message: impl std::fmt::Display) -> Self {
        Self::DetailsFetch {
            entity: entity.to_string(),
            message: message.to_string(),
            source: None,
        }
    }

    /// Wrap a driver failure raised while reading an entity's rows
    pub fn details_from(entity: impl std::fmt::Display, source: impl Into<DriverError>) -> Self {
        let source = source.into();
        Self::DetailsFetch {
            entity: entity.to_string(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create an IO error with an optional path
    pub fn io(path: Option<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            message: source.to_string(),
            path,
            source,
        }
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, CqlTuiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CqlTuiError::metadata("shop", "timeout");
        assert_eq!(
            err.to_string(),
            "Failed to fetch metadata for keyspace 'shop': timeout"
        );

        let err = CqlTuiError::details("Tables/users", "unavailable");
        assert!(err.to_string().contains("Tables/users"));
    }

    #[test]
    fn test_driver_errors_keep_source() {
        let cause = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = CqlTuiError::metadata_from("shop", cause);
        assert!(err.to_string().ends_with("refused"));
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "refused");

        let err = CqlTuiError::connection_from("no nodes reachable");
        assert!(std::error::Error::source(&err).is_some());

        assert!(std::error::Error::source(&CqlTuiError::connection("plain")).is_none());
    }

    #[test]
    fn test_io_error_keeps_path() {
        let err = CqlTuiError::io(
            Some(PathBuf::from("/tmp/cql-tui.log")),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("cql-tui.log"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
