//! Collaborator traits for silverhook components
//!
//! The reconciliation logic depends on two things it does not own: where a
//! package's files are installed, and where package metadata comes from.
//! Both are abstracted here so the engine can be driven by Composer
//! manifests in production and by in-memory fixtures in tests.

use crate::{PackageRef, Result};
use std::path::PathBuf;

/// Resolves the directory a package's files were installed into
///
/// # Examples
///
/// ```ignore
/// fn script_dir(locator: &dyn InstallLocator, package: &PackageRef) -> PathBuf {
///     locator.install_dir(package)
/// }
/// ```
pub trait InstallLocator {
    /// Directory holding the package's files, relative to the project root
    fn install_dir(&self, package: &PackageRef) -> PathBuf;
}

/// Supplies the installed package set for one lifecycle invocation
pub trait PackageSource {
    /// All installed packages, in the order the host reports them
    fn packages(&self) -> Result<Vec<PackageRef>>;

    /// Look up a single package by exact name
    fn find(&self, name: &str) -> Result<Option<PackageRef>> {
        Ok(self.packages()?.into_iter().find(|p| p.name == name))
    }
}

impl PackageSource for Vec<PackageRef> {
    fn packages(&self) -> Result<Vec<PackageRef>> {
        Ok(self.clone())
    }
}
