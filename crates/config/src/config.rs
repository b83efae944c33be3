//! Configuration management
//!
//! This module handles loading silverhook settings from `silverhook.toml`.
//! Every field has a default, so a project without the file behaves exactly
//! like one whose file is empty.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the project root
pub const CONFIG_FILE_NAME: &str = "silverhook.toml";

/// General configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Environment variables that disable every reconciliation pass
    ///
    /// A variable counts as set unless it is empty, `0`, `false` or `no`.
    /// `PANTHEON_ENVIRONMENT` is present on the hosting platform itself, where
    /// the document is deployed rather than edited.
    #[serde(default = "default_disable_env", rename = "disableEnv")]
    pub disable_env: Vec<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            disable_env: default_disable_env(),
        }
    }
}

/// Configuration document section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Path of the hook configuration document
    #[serde(default = "default_document_path")]
    pub path: PathBuf,

    /// Template used when the document does not exist yet
    ///
    /// When unset, the template bundled with the engine is used.
    #[serde(default)]
    pub template: Option<PathBuf>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            path: default_document_path(),
            template: None,
        }
    }
}

/// Package metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagesConfig {
    /// Package types that may carry hook declarations
    #[serde(default = "default_package_types")]
    pub types: Vec<String>,

    /// Extras key holding hook declarations
    #[serde(default = "default_extras_key", rename = "extrasKey")]
    pub extras_key: String,

    /// Root project extras key holding the denylist
    #[serde(default = "default_denylist_key", rename = "denylistKey")]
    pub denylist_key: String,

    /// Installed package manifest written by the package manager
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// Root project manifest (denylist and installer paths)
    #[serde(default = "default_root_manifest", rename = "rootManifest")]
    pub root_manifest: PathBuf,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            types: default_package_types(),
            extras_key: default_extras_key(),
            denylist_key: default_denylist_key(),
            manifest: default_manifest(),
            root_manifest: default_root_manifest(),
        }
    }
}

/// Script resolution section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptsConfig {
    /// Install root used when no installer path matches a package
    ///
    /// Stays relative: script references in the document are relative to
    /// the project root.
    #[serde(default = "default_scripts_base_dir", rename = "baseDir")]
    pub base_dir: PathBuf,

    /// Suffix appended to the script identifier when no script is declared
    #[serde(default = "default_script_suffix")]
    pub suffix: String,

    /// Task type written into new entries
    #[serde(default = "default_task_type", rename = "taskType")]
    pub task_type: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            base_dir: default_scripts_base_dir(),
            suffix: default_script_suffix(),
            task_type: default_task_type(),
        }
    }
}

/// Silverhook configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General configuration section
    #[serde(default)]
    pub general: GeneralConfig,

    /// Configuration document section
    #[serde(default)]
    pub document: DocumentConfig,

    /// Package metadata section
    #[serde(default)]
    pub packages: PackagesConfig,

    /// Script resolution section
    #[serde(default)]
    pub scripts: ScriptsConfig,

    /// Base directory for resolving relative paths (not serialized)
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

fn default_disable_env() -> Vec<String> {
    vec![
        "SILVERHOOK_DISABLE".to_string(),
        "PANTHEON_ENVIRONMENT".to_string(),
    ]
}

fn default_document_path() -> PathBuf {
    PathBuf::from("pantheon.yml")
}

fn default_package_types() -> Vec<String> {
    vec![
        "quicksilver-script".to_string(),
        "quicksilver-module".to_string(),
    ]
}

fn default_extras_key() -> String {
    "quicksilver".to_string()
}

fn default_denylist_key() -> String {
    "quicksilver-denylist".to_string()
}

fn default_manifest() -> PathBuf {
    PathBuf::from("vendor/composer/installed.json")
}

fn default_root_manifest() -> PathBuf {
    PathBuf::from("composer.json")
}

fn default_scripts_base_dir() -> PathBuf {
    PathBuf::from("private/scripts/quicksilver")
}

fn default_script_suffix() -> String {
    ".php".to_string()
}

fn default_task_type() -> String {
    "webphp".to_string()
}

impl Config {
    /// Load configuration from a file
    ///
    /// Relative paths are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or TOML parsing fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            silverhook_core::Error::Config(format!(
                "Failed to read config file {}: {e}",
                path.as_ref().display()
            ))
        })?;

        let base_dir = path.as_ref().parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&content, base_dir)
    }

    /// Load configuration from TOML string
    ///
    /// Paths are resolved relative to `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns error if TOML parsing fails
    pub fn from_toml_str(toml_content: &str, base_dir: &Path) -> Result<Self> {
        let mut config: Self = toml::from_str(toml_content).map_err(|e| {
            silverhook_core::Error::Config(format!("Failed to parse config TOML: {e}"))
        })?;
        config.base_dir = Some(base_dir.to_path_buf());
        Ok(config)
    }

    /// Load configuration for a project directory
    ///
    /// An explicitly given file must exist. Otherwise `silverhook.toml` in the
    /// project root is used when present, and defaults when it is not.
    ///
    /// # Errors
    ///
    /// Returns error if an existing config file cannot be read or parsed, or
    /// if an explicitly requested file is missing
    pub fn load_for_project(project_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let mut config = Self::load(path)?;
            // Document and manifest paths stay relative to the project root
            config.base_dir = Some(project_dir.to_path_buf());
            return Ok(config);
        }

        let config_path = project_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            return Self::load(&config_path);
        }

        tracing::debug!(
            "No {} in {}, using defaults",
            CONFIG_FILE_NAME,
            project_dir.display()
        );
        Ok(Self::default().with_base_dir(project_dir))
    }

    /// Set the directory relative paths are resolved against
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: &Path) -> Self {
        self.base_dir = Some(base_dir.to_path_buf());
        self
    }

    /// Directory relative paths are resolved against
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        self.base_dir.as_deref().unwrap_or_else(|| Path::new("."))
    }

    /// Absolute (or base-relative) path of the configuration document
    #[must_use]
    pub fn document_path(&self) -> PathBuf {
        self.resolve(&self.document.path)
    }

    /// Path of a custom document template, if configured
    #[must_use]
    pub fn template_path(&self) -> Option<PathBuf> {
        self.document.template.as_ref().map(|p| self.resolve(p))
    }

    /// Path of the installed package manifest
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.packages.manifest)
    }

    /// Path of the root project manifest
    #[must_use]
    pub fn root_manifest_path(&self) -> PathBuf {
        self.resolve(&self.packages.root_manifest)
    }

    /// Name of the first kill-switch variable that is set, if any
    #[must_use]
    pub fn disabled_by(&self) -> Option<&str> {
        self.disabled_by_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::disabled_by`] with a custom variable lookup
    pub fn disabled_by_lookup<F>(&self, lookup: F) -> Option<&str>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.general
            .disable_env
            .iter()
            .find(|name| lookup(name).is_some_and(|value| flag_is_truthy(&value)))
            .map(String::as_str)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir().join(path)
        }
    }
}

/// Check whether a flag value counts as set
fn flag_is_truthy(value: &str) -> bool {
    let value = value.trim().to_ascii_lowercase();
    !matches!(value.as_str(), "" | "0" | "false" | "no")
}
