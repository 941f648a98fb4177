//! Error types for flap-track.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for flap-track operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Session log ===
    /// Reading or writing CSV failed.
    #[error("session log error: {0}")]
    Csv(#[from] csv::Error),

    /// The log file exists but does not look like a session log.
    #[error("malformed session log at {path}: {message}")]
    MalformedLog {
        /// Path to the log file.
        path: PathBuf,
        /// What is wrong with it.
        message: String,
    },

    // === Configuration ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O ===
    /// File system or terminal operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The audio device could not be opened.
    #[error("audio unavailable: {0}")]
    Audio(String),
}

/// A specialized Result type for flap-track operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a malformed-log error.
    #[must_use]
    pub fn malformed_log(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MalformedLog {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_log_display() {
        let err = Error::malformed_log("/tmp/game_log.csv", "missing column `score`");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/game_log.csv"));
        assert!(msg.contains("missing column `score`"));
    }

    #[test]
    fn test_invalid_config_display() {
        let err = Error::invalid_config("fps must be between 1 and 120");
        assert_eq!(
            err.to_string(),
            "invalid configuration: fps must be between 1 and 120"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied"),
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }
}
