//! Logging configuration for flap-track.
//!
//! While the game or dashboard owns the terminal, diagnostics go to a file;
//! plain commands log to stderr.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{Error, Result};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Suppress all output except errors.
    Quiet,
    /// Normal output level (info and above).
    #[default]
    Normal,
    /// Verbose output (debug and above).
    Verbose,
    /// Very verbose output (trace level).
    Trace,
}

impl Verbosity {
    /// Convert verbosity to tracing level filter.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    fn env_filter(self) -> EnvFilter {
        let default_filter = format!("flap_track={}", self.to_level_filter());
        // RUST_LOG takes precedence
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter))
    }
}

/// Initialize stderr logging. Calling it twice is harmless.
pub fn init_logging(verbosity: Verbosity) {
    let subscriber = tracing_subscriber::registry()
        .with(verbosity.env_filter())
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(false)
                .with_line_number(false),
        );

    let _ = subscriber.try_init();
}

/// Initialize logging into `path`, appending. The parent directory is created.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created.
pub fn init_file_logging(verbosity: Verbosity, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let subscriber = tracing_subscriber::registry()
        .with(verbosity.env_filter())
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        );

    let _ = subscriber.try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_to_level() {
        assert_eq!(Verbosity::Quiet.to_level_filter(), Level::ERROR);
        assert_eq!(Verbosity::Normal.to_level_filter(), Level::INFO);
        assert_eq!(Verbosity::Verbose.to_level_filter(), Level::DEBUG);
        assert_eq!(Verbosity::Trace.to_level_filter(), Level::TRACE);
    }

    #[test]
    fn test_verbosity_default() {
        assert_eq!(Verbosity::default(), Verbosity::Normal);
    }

    #[test]
    fn test_init_logging_does_not_panic() {
        init_logging(Verbosity::Normal);
        init_logging(Verbosity::Trace);
    }

    #[test]
    fn test_file_logging_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("flap-track.log");
        init_file_logging(Verbosity::Normal, &path).unwrap();
        assert!(path.exists());
    }
}
