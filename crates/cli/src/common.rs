//! Common utilities and types shared across CLI commands

use crate::composer::{InstalledManifest, InstallerPathsLocator, RootManifest};
use silverhook_config::Config;
use silverhook_core::Result;
use silverhook_engine::{
    CatalogSettings, Denylist, DocumentStore, HookCatalogBuilder, SchemaCatalog,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Runtime context for CLI commands
///
/// Holds the configuration shared by all commands and the project root the
/// lifecycle event was fired for.
#[derive(Clone)]
pub struct RuntimeContext {
    /// Shared configuration (uses Arc to avoid cloning)
    pub config: Arc<Config>,
    project_dir: PathBuf,
}

impl RuntimeContext {
    /// Create a new runtime context
    #[must_use]
    pub fn new(config: Config, project_dir: &Path) -> Self {
        Self {
            config: Arc::new(config),
            project_dir: project_dir.to_path_buf(),
        }
    }

    /// Project root directory
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Store for the configured document
    #[must_use]
    pub fn document_store(&self) -> DocumentStore {
        DocumentStore::new(self.config.document_path(), self.config.template_path())
    }

    /// The installed package manifest
    #[must_use]
    pub fn installed(&self) -> InstalledManifest {
        InstalledManifest::new(self.config.manifest_path())
    }

    /// The root project's manifest
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest exists but cannot be parsed
    pub fn root_manifest(&self) -> Result<RootManifest> {
        RootManifest::load(&self.config.root_manifest_path())
    }
}

/// Everything needed to turn package metadata into a hook catalog
pub struct HookSetup {
    schema: SchemaCatalog,
    locator: InstallerPathsLocator,
    settings: CatalogSettings,
    /// Project denylist
    pub denylist: Denylist,
}

impl HookSetup {
    /// Assemble schema, locator, settings and denylist for a project
    ///
    /// # Errors
    ///
    /// Returns an error if the root manifest cannot be parsed
    pub fn load(context: &RuntimeContext) -> Result<Self> {
        let root = context.root_manifest()?;
        let config = context.config.as_ref();

        Ok(Self {
            schema: SchemaCatalog::bundled()?,
            locator: root.installer_paths(&config.scripts.base_dir),
            settings: CatalogSettings::from(config),
            denylist: root.denylist(&config.packages.denylist_key),
        })
    }

    /// Catalog builder borrowing this setup
    #[must_use]
    pub fn builder(&self) -> HookCatalogBuilder<'_> {
        HookCatalogBuilder::new(&self.schema, &self.locator, &self.settings)
    }
}
