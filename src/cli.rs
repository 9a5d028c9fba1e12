//! Command-line interface parsing for Daily Poetry CLI
//!
//! This module handles parsing of CLI arguments using clap and turning them
//! into a validated `StartupConfig`.

use clap::Parser;
use reqwest::Url;
use std::path::PathBuf;
use thiserror::Error;

use crate::logging::Verbosity;
use crate::poetry::DEFAULT_ENDPOINT;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The endpoint is not an http(s) URL
    #[error("Invalid endpoint: '{0}'. Expected an http:// or https:// URL")]
    InvalidEndpoint(String),
}

/// Daily Poetry CLI - One classical Chinese poem a day
#[derive(Parser, Debug)]
#[command(name = "dailypoetry")]
#[command(about = "Shows a classical Chinese poem of the day, fetched at most once per day")]
#[command(version)]
pub struct Cli {
    /// Skip today's cached poem and fetch a new one
    #[arg(short, long)]
    pub refresh: bool,

    /// Print the poem and exit instead of opening the terminal UI
    #[arg(short, long)]
    pub print: bool,

    /// Poem API endpoint
    #[arg(long, value_name = "URL", env = "DAILYPOETRY_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Directory for the cached poem (defaults to the platform cache directory)
    #[arg(long, value_name = "DIR", env = "DAILYPOETRY_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// How the poem is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Interactive terminal UI
    #[default]
    Tui,
    /// Print to stdout and exit
    Print,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Whether the first operation bypasses the cache
    pub force_refresh: bool,
    /// How the poem is presented
    pub mode: OutputMode,
    /// Poem API endpoint
    pub endpoint: String,
    /// Cache directory override
    pub cache_dir: Option<PathBuf>,
    /// Logging verbosity
    pub verbosity: Verbosity,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            force_refresh: false,
            mode: OutputMode::default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            cache_dir: None,
            verbosity: Verbosity::default(),
        }
    }
}

/// Validates an endpoint argument.
///
/// # Returns
/// * `Ok(String)` if the string parses as an http or https URL
/// * `Err(CliError::InvalidEndpoint)` otherwise
pub fn parse_endpoint_arg(s: &str) -> Result<String, CliError> {
    match Url::parse(s) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(s.to_string()),
        _ => Err(CliError::InvalidEndpoint(s.to_string())),
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if an invalid endpoint was specified
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let endpoint = match &cli.endpoint {
            Some(endpoint) => parse_endpoint_arg(endpoint)?,
            None => DEFAULT_ENDPOINT.to_string(),
        };

        let verbosity = if cli.quiet {
            Verbosity::Quiet
        } else if cli.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        Ok(StartupConfig {
            force_refresh: cli.refresh,
            mode: if cli.print {
                OutputMode::Print
            } else {
                OutputMode::Tui
            },
            endpoint,
            cache_dir: cli.cache_dir.clone(),
            verbosity,
        })
    }
}
