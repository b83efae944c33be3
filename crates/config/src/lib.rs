//! Configuration management for silverhook
//!
//! This crate handles:
//! - Settings loading from `silverhook.toml`
//! - Path resolution against the project root
//! - The environment kill switch
//! - Logging initialization

pub mod config;
pub mod logging;

// Re-export error types from core
pub use silverhook_core::{Error, Result};

// Re-export main types
pub use config::{
    CONFIG_FILE_NAME, Config, DocumentConfig, GeneralConfig, PackagesConfig, ScriptsConfig,
};
