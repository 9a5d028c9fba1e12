//! Logging setup
//!
//! Library code logs through `tracing`. The binary installs a subscriber that
//! writes to stderr in print mode, or to a log file while the terminal UI owns
//! the screen.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// File name used when logging to a file
pub const LOG_FILE_NAME: &str = "dailypoetry.log";

/// Errors that can occur while setting up logging
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log file could not be opened
    #[error("failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    /// A global subscriber was already installed
    #[error("failed to install log subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// How much to log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only
    Quiet,
    /// `RUST_LOG`, or info when unset
    #[default]
    Normal,
    /// Debug and above
    Verbose,
}

/// Where log lines go
#[derive(Debug, Clone, Copy)]
pub enum LogSink<'a> {
    Stderr,
    /// Append to `dailypoetry.log` inside this directory
    File(&'a Path),
    Disabled,
}

/// Builds the level filter for a verbosity
pub fn filter_for(verbosity: Verbosity) -> EnvFilter {
    match verbosity {
        Verbosity::Quiet => EnvFilter::new("error"),
        Verbosity::Verbose => EnvFilter::new("debug"),
        Verbosity::Normal => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::default().add_directive(Level::INFO.into())),
    }
}

/// Installs the global subscriber
pub fn init_logging(verbosity: Verbosity, sink: LogSink<'_>) -> Result<(), LoggingError> {
    let (stderr_layer, file_layer) = match sink {
        LogSink::Stderr => (
            Some(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            ),
            None,
        ),
        LogSink::File(dir) => {
            fs::create_dir_all(dir)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(LOG_FILE_NAME))?;
            (
                None,
                Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false)),
            )
        }
        LogSink::Disabled => return Ok(()),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .with(filter_for(verbosity))
        .try_init()?;

    Ok(())
}

/// Installs the global subscriber, giving up on file logging if the log file
/// cannot be opened
///
/// The log file lives in the cache directory, and an unusable cache directory
/// must not stop the program. The warning goes to stderr before the terminal
/// UI takes over the screen.
pub fn init_logging_or_disable(verbosity: Verbosity, sink: LogSink<'_>) -> Result<(), LoggingError> {
    match (sink, init_logging(verbosity, sink)) {
        (LogSink::File(dir), Err(LoggingError::Io(e))) => {
            eprintln!(
                "Warning: logging disabled, cannot write {}: {}",
                dir.join(LOG_FILE_NAME).display(),
                e
            );
            init_logging(verbosity, LogSink::Disabled)
        }
        (_, result) => result,
    }
}
