//! Base error types for silverhook
//!
//! This module provides the foundation error types that all crates can use.
//! Invalid or denylisted hook declarations are never errors; they are logged
//! and skipped by the engine. Everything here aborts the current pass.

use std::path::PathBuf;
use thiserror::Error;

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration document exists but could not be read
    #[error("Failed to read {}: {source}", path.display())]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration document is not valid YAML
    #[error("Failed to parse {}: {message}", path.display())]
    DocumentParse { path: PathBuf, message: String },

    /// The configuration document parsed but has an unexpected structure
    #[error("Unexpected structure in {}: {message}", path.display())]
    DocumentShape { path: PathBuf, message: String },

    /// The configuration document could not be written back
    #[error("Failed to write {}: {source}", path.display())]
    DocumentWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization of the in-memory document failed
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// A package manifest could not be read or understood
    #[error("Invalid package manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    /// Settings error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_document_parse_message_includes_path() {
        let err = Error::DocumentParse {
            path: PathBuf::from("pantheon.yml"),
            message: "did not find expected key".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("pantheon.yml"));
        assert!(msg.contains("did not find expected key"));
    }

    #[test]
    fn test_document_write_keeps_source() {
        use std::error::Error as _;

        let err = Error::DocumentWrite {
            path: PathBuf::from("/readonly/pantheon.yml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };

        assert!(err.source().is_some());
        assert!(err.to_string().contains("/readonly/pantheon.yml"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
