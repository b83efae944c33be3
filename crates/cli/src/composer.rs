//! Composer metadata adapters
//!
//! Reads the installed package manifest, single package manifests and the
//! root project's `composer.json`, and resolves install locations the way
//! `composer/installers` does with `extra.installer-paths`.

use serde::Deserialize;
use serde_json::Value;
use silverhook_core::{Error, InstallLocator, PackageRef, PackageSource, Result};
use silverhook_engine::Denylist;
use std::fs;
use std::path::{Path, PathBuf};

/// The installed package list (`vendor/composer/installed.json`)
#[derive(Debug, Clone)]
pub struct InstalledManifest {
    path: PathBuf,
}

impl InstalledManifest {
    /// Create a source reading `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Manifest path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PackageSource for InstalledManifest {
    /// Read every package record
    ///
    /// Accepts the Composer 2 layout (`{"packages": [...]}`) and the
    /// Composer 1 layout (a top-level array). A missing manifest means no
    /// packages are installed. Records that are not packages are skipped.
    fn packages(&self) -> Result<Vec<PackageRef>> {
        if !self.path.exists() {
            tracing::debug!("{} does not exist, no packages installed", self.path.display());
            return Ok(Vec::new());
        }

        let manifest = read_json(&self.path)?;
        let records = match &manifest {
            Value::Array(records) => records,
            Value::Object(map) => match map.get("packages") {
                Some(Value::Array(records)) => records,
                _ => return Err(manifest_error(&self.path, "missing \"packages\" list")),
            },
            _ => return Err(manifest_error(&self.path, "expected an object or a list")),
        };

        let packages = records
            .iter()
            .filter_map(|record| match PackageRef::deserialize(record) {
                Ok(package) => Some(package),
                Err(e) => {
                    tracing::warn!("Skipping package record in {}: {e}", self.path.display());
                    None
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!("Read {} packages from {}", packages.len(), self.path.display());
        Ok(packages)
    }
}

/// Read a single package's `composer.json`
///
/// # Errors
///
/// Returns `Manifest` if the file cannot be read or is not a package record
pub fn read_package_manifest(path: &Path) -> Result<PackageRef> {
    let record = read_json(path)?;
    PackageRef::deserialize(&record).map_err(|e| manifest_error(path, &e.to_string()))
}

/// Settings taken from the root project's `composer.json`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootManifest {
    extra: Value,
}

impl RootManifest {
    /// Read the root manifest; a missing file has no settings
    ///
    /// # Errors
    ///
    /// Returns `Manifest` if the file exists but is not valid JSON
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("{} does not exist, no project settings", path.display());
            return Ok(Self::default());
        }

        let manifest = read_json(path)?;
        Ok(Self {
            extra: manifest.get("extra").cloned().unwrap_or(Value::Null),
        })
    }

    /// Create from an already parsed `extra` value
    #[must_use]
    pub fn from_extra(extra: Value) -> Self {
        Self { extra }
    }

    /// Denylist stored under `extra[key]`
    #[must_use]
    pub fn denylist(&self, key: &str) -> Denylist {
        self.extra
            .get(key)
            .map_or_else(Denylist::new, Denylist::from_json)
    }

    /// Install locator built from `extra.installer-paths`
    #[must_use]
    pub fn installer_paths(&self, fallback: &Path) -> InstallerPathsLocator {
        let rules = self
            .extra
            .get("installer-paths")
            .and_then(Value::as_object)
            .map(|paths| {
                paths
                    .iter()
                    .map(|(template, matchers)| InstallerPath {
                        template: template.clone(),
                        matchers: matchers
                            .as_array()
                            .map(|list| {
                                list.iter()
                                    .filter_map(Value::as_str)
                                    .map(str::to_string)
                                    .collect()
                            })
                            .unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        InstallerPathsLocator {
            rules,
            fallback: fallback.to_path_buf(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InstallerPath {
    template: String,
    matchers: Vec<String>,
}

/// Resolves install directories from `installer-paths` rules
///
/// A rule listing the exact package name wins over a `type:` rule, which
/// wins over a `vendor:` rule. Packages matching no rule are placed under
/// `<fallback>/<short name>`.
#[derive(Debug, Clone)]
pub struct InstallerPathsLocator {
    rules: Vec<InstallerPath>,
    fallback: PathBuf,
}

impl InstallerPathsLocator {
    fn matching_rule(&self, package: &PackageRef) -> Option<&InstallerPath> {
        let by_type = format!("type:{}", package.kind);
        let by_vendor = package.vendor().map(|vendor| format!("vendor:{vendor}"));

        let find = |wanted: &str| {
            self.rules
                .iter()
                .find(|rule| rule.matchers.iter().any(|m| m == wanted))
        };

        find(&package.name)
            .or_else(|| find(&by_type))
            .or_else(|| by_vendor.as_deref().and_then(find))
    }
}

impl InstallLocator for InstallerPathsLocator {
    fn install_dir(&self, package: &PackageRef) -> PathBuf {
        match self.matching_rule(package) {
            Some(rule) => {
                let path = rule
                    .template
                    .replace("{$name}", package.short_name())
                    .replace("{$vendor}", package.vendor().unwrap_or_default())
                    .replace("{$type}", &package.kind);
                PathBuf::from(path.trim_end_matches('/'))
            }
            None => self.fallback.join(package.short_name()),
        }
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| manifest_error(path, &e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| manifest_error(path, &e.to_string()))
}

fn manifest_error(path: &Path, message: &str) -> Error {
    Error::Manifest {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}
