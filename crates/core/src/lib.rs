//! Core types and utilities for silverhook
//!
//! This is the foundation crate (Layer 0) that all other silverhook crates depend on.
//! It provides:
//! - Base error types
//! - Package metadata records (`PackageRef`)
//! - Collaborator traits (`InstallLocator`, `PackageSource`)
//! - Slash-separated script path helpers
//!
//! This crate has no dependencies on other silverhook crates.

pub mod error;
pub mod package;
pub mod path;
pub mod traits;

pub use error::{Error, Result};
pub use package::PackageRef;
pub use traits::{InstallLocator, PackageSource};
