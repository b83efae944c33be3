//! Logging configuration for silverhook
//!
//! Provides compact terminal output and optional file logging using tracing.
//! Lifecycle hooks run inside the package manager's own output, so normal
//! mode prints without timestamps or targets.

use crate::Result;
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are shown by default
const LOG_TARGETS: &[&str] = &[
    "silverhook",
    "silverhook_core",
    "silverhook_config",
    "silverhook_engine",
];

/// Initialize the logging system
///
/// # Arguments
/// * `verbose` - Enable debug level logging
/// * `log_file` - Optional path to write logs to a file
///
/// # Examples
/// ```ignore
/// // Basic usage with info level
/// init(false, None)?;
///
/// // Verbose mode with a debug log file
/// init(true, Some(Path::new("silverhook.log")))?;
/// ```
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    // RUST_LOG takes precedence over the verbosity flag
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(level))
            .map_err(|e| silverhook_core::Error::Config(format!("Invalid log filter: {e}")))?,
    };

    let stdout_layer = if verbose {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_ansi(true)
            .with_filter(env_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(false)
            .with_line_number(false)
            .without_time() // No timestamps in normal mode
            .compact()
            .with_ansi(true)
            .with_filter(env_filter)
            .boxed()
    };

    if let Some(log_path) = log_file {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .with_filter(EnvFilter::new("debug"));

        tracing_subscriber::registry()
            .with(stdout_layer)
            .with(file_layer)
            .try_init()
            .map_err(|e| silverhook_core::Error::Config(format!("Logging already set: {e}")))?;
    } else {
        tracing_subscriber::registry()
            .with(stdout_layer)
            .try_init()
            .map_err(|e| silverhook_core::Error::Config(format!("Logging already set: {e}")))?;
    }

    Ok(())
}

/// Build the default filter directives for the given level
fn default_directives(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_cover_all_crates() {
        let directives = default_directives("debug");
        assert!(directives.contains("silverhook=debug"));
        assert!(directives.contains("silverhook_engine=debug"));
        assert_eq!(directives.split(',').count(), LOG_TARGETS.len());
    }

    #[test]
    fn test_default_directives_parse() {
        assert!(EnvFilter::try_new(default_directives("info")).is_ok());
    }
}
