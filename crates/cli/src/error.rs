//! Error types for CLI commands
//!
//! Structured errors for the failures a lifecycle command reports on its
//! own; everything else is carried as `anyhow::Error` with context.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during command execution
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// The uninstalled package could not be found
    #[error("Package {name} not found in {}", manifest.display())]
    PackageNotFound {
        /// Requested package name
        name: String,
        /// Manifest that was searched
        manifest: PathBuf,
    },

    /// Document, manifest or configuration failure
    #[error(transparent)]
    Document(#[from] silverhook_core::Error),

    /// Generic error with context
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for command operations
pub type Result<T> = std::result::Result<T, CommandError>;

impl CommandError {
    /// Create a `PackageNotFound` error
    pub fn package_not_found(name: impl Into<String>, manifest: impl Into<PathBuf>) -> Self {
        Self::PackageNotFound {
            name: name.into(),
            manifest: manifest.into(),
        }
    }
}
