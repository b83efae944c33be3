//! Hook catalog construction
//!
//! Scans installed packages for hook declarations, validates them against
//! the schema and resolves each one to a script path. Problems with one
//! declaration are logged and skipped so other packages are unaffected.

use super::declaration::{HookCatalog, HookDeclaration, RawDeclaration};
use super::schema::SchemaCatalog;
use serde_json::Value;
use silverhook_config::Config;
use silverhook_core::path::join_slash;
use silverhook_core::{InstallLocator, PackageRef};
use std::path::PathBuf;

/// Settings that control how extras are read and scripts are named
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Extras key holding the declaration block
    pub extras_key: String,
    /// Package types that may declare hooks; empty accepts every type
    pub package_types: Vec<String>,
    /// Suffix appended to the script identifier when no script is named
    pub suffix: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for CatalogSettings {
    fn from(config: &Config) -> Self {
        Self {
            extras_key: config.packages.extras_key.clone(),
            package_types: config.packages.types.clone(),
            suffix: config.scripts.suffix.clone(),
        }
    }
}

impl CatalogSettings {
    fn accepts(&self, kind: &str) -> bool {
        self.package_types.is_empty() || self.package_types.iter().any(|t| t == kind)
    }
}

/// Installs every package into `<base_dir>/<short name>`
#[derive(Debug, Clone)]
pub struct BaseDirLocator {
    base_dir: PathBuf,
}

impl BaseDirLocator {
    /// Create a locator rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl InstallLocator for BaseDirLocator {
    fn install_dir(&self, package: &PackageRef) -> PathBuf {
        self.base_dir.join(package.short_name())
    }
}

/// Builds a [`HookCatalog`] from package metadata
pub struct HookCatalogBuilder<'a> {
    schema: &'a SchemaCatalog,
    locator: &'a dyn InstallLocator,
    settings: &'a CatalogSettings,
}

impl<'a> HookCatalogBuilder<'a> {
    /// Create a builder
    #[must_use]
    pub fn new(
        schema: &'a SchemaCatalog,
        locator: &'a dyn InstallLocator,
        settings: &'a CatalogSettings,
    ) -> Self {
        Self {
            schema,
            locator,
            settings,
        }
    }

    /// Build the catalog for the whole installed package set
    ///
    /// Each hook type group is sorted by weight; equal weights keep the
    /// order in which packages and declarations were discovered.
    #[must_use]
    pub fn build(&self, packages: &[PackageRef]) -> HookCatalog {
        let mut catalog = HookCatalog::new();
        for package in packages {
            self.collect(package, &mut catalog);
        }
        catalog.sort_by_weight();

        tracing::debug!(
            "Built hook catalog with {} declarations from {} packages",
            catalog.total(),
            packages.len()
        );
        catalog
    }

    /// Build the catalog fragment of a single package
    #[must_use]
    pub fn build_for(&self, package: &PackageRef) -> HookCatalog {
        self.build(std::slice::from_ref(package))
    }

    fn collect(&self, package: &PackageRef, catalog: &mut HookCatalog) {
        if !self.settings.accepts(&package.kind) {
            tracing::trace!("Skipping {} (type {})", package.name, package.kind);
            return;
        }

        let Some(block) = package.extra(&self.settings.extras_key) else {
            tracing::debug!("{} declares no hooks", package.name);
            return;
        };
        let Some(scripts) = block.as_object() else {
            tracing::warn!(
                "Ignoring hooks of {}: extra.{} is not a map of script identifiers",
                package.name,
                self.settings.extras_key
            );
            return;
        };

        let install_dir = self.locator.install_dir(package);
        for (script_id, items) in scripts {
            let Some(items) = items.as_array() else {
                tracing::warn!(
                    "Ignoring hooks of {} for script {script_id}: expected a list of declarations",
                    package.name
                );
                continue;
            };

            for item in items {
                if let Some(declaration) = self.declaration(package, script_id, item) {
                    let file = declaration
                        .script
                        .clone()
                        .unwrap_or_else(|| format!("{script_id}{}", self.settings.suffix));
                    Self::push(package, declaration, join_slash(&install_dir, &file), catalog);
                }
            }
        }
    }

    fn declaration(
        &self,
        package: &PackageRef,
        script_id: &str,
        item: &Value,
    ) -> Option<RawDeclaration> {
        let Some(raw) = RawDeclaration::from_value(item) else {
            tracing::warn!(
                "Skipping hook of {} for script {script_id}: declaration is not a map",
                package.name
            );
            return None;
        };

        if !self.schema.validate(&raw) {
            tracing::warn!(
                "Skipping invalid hook {} declared by {} for script {script_id}",
                raw.label(),
                package.name
            );
            return None;
        }

        Some(raw)
    }

    fn push(
        package: &PackageRef,
        raw: RawDeclaration,
        script: String,
        catalog: &mut HookCatalog,
    ) {
        let weight = match raw.weight() {
            Ok(weight) => weight,
            Err(reason) => {
                tracing::warn!(
                    "Skipping hook {} declared by {}: {reason}",
                    raw.label(),
                    package.name
                );
                return;
            }
        };

        let (Some(wf_type), Some(stage)) = (raw.wf_type, raw.stage) else {
            return;
        };

        if catalog.contains(&package.name, &wf_type, &stage) {
            tracing::warn!(
                "Skipping duplicate hook {wf_type}/{stage} declared by {}; only the first is kept",
                package.name
            );
            return;
        }

        tracing::debug!(
            "Discovered hook {wf_type}/{stage} (weight {weight}) from {}: {script}",
            package.name
        );
        catalog.push(HookDeclaration {
            wf_type,
            stage,
            weight,
            script,
            package_name: package.name.clone(),
            package_description: package.description.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use serde_json::json;

    fn package(name: &str, extras: Value) -> PackageRef {
        PackageRef::new(name, "quicksilver-script", "Test package").with_extras(extras)
    }

    fn build(packages: &[PackageRef]) -> HookCatalog {
        let schema = SchemaCatalog::bundled().unwrap();
        let locator = BaseDirLocator::new("private/scripts/quicksilver");
        let settings = CatalogSettings::default();
        HookCatalogBuilder::new(&schema, &locator, &settings).build(packages)
    }

    #[test]
    fn test_default_script_name() {
        let catalog = build(&[package(
            "acme/cache-warm",
            json!({"quicksilver": {"cache-warm": [
                {"wf_type": "deploy", "stage": "after", "weight": 5}
            ]}}),
        )]);

        let hooks = catalog.get("deploy");
        assert_eq!(hooks.len(), 1);
        assert_eq!(
            hooks[0].script,
            "private/scripts/quicksilver/cache-warm/cache-warm.php"
        );
        assert_eq!(hooks[0].weight, 5);
        assert_eq!(hooks[0].package_name, "acme/cache-warm");
        assert_eq!(hooks[0].package_description, "Test package");
    }

    #[test]
    fn test_explicit_script_name() {
        let catalog = build(&[package(
            "acme/notify",
            json!({"quicksilver": {"notify": [
                {"wf_type": "sync_code", "stage": "after", "script": "bin/slack.php"}
            ]}}),
        )]);

        assert_eq!(
            catalog.get("sync_code")[0].script,
            "private/scripts/quicksilver/notify/bin/slack.php"
        );
    }

    #[test]
    fn test_non_hook_package_type_is_ignored() {
        let library = PackageRef::new("acme/lib", "library", "").with_extras(json!({
            "quicksilver": {"lib": [{"wf_type": "deploy", "stage": "after"}]}
        }));
        assert!(build(&[library]).is_empty());
    }

    #[test]
    fn test_empty_type_list_accepts_every_package() {
        let schema = SchemaCatalog::bundled().unwrap();
        let locator = BaseDirLocator::new("scripts");
        let settings = CatalogSettings {
            package_types: Vec::new(),
            ..CatalogSettings::default()
        };
        let library = PackageRef::new("acme/lib", "library", "").with_extras(json!({
            "quicksilver": {"lib": [{"wf_type": "deploy", "stage": "after"}]}
        }));

        let catalog = HookCatalogBuilder::new(&schema, &locator, &settings).build(&[library]);
        assert_eq!(catalog.total(), 1);
    }

    #[test]
    fn test_package_without_extras_contributes_nothing() {
        assert!(build(&[package("acme/empty", Value::Null)]).is_empty());
        assert!(build(&[package("acme/other", json!({"branch-alias": {}}))]).is_empty());
    }

    #[test]
    fn test_invalid_declarations_do_not_stop_others() {
        let catalog = build(&[
            package(
                "acme/broken",
                json!({"quicksilver": {
                    "a": [
                        {"wf_type": "deploy"},
                        {"wf_type": "launch", "stage": "after"},
                        {"wf_type": "deploy", "stage": "after", "weight": "heavy"},
                        "deploy"
                    ],
                    "b": {"wf_type": "deploy", "stage": "after"},
                    "c": [{"wf_type": "clear_cache", "stage": "before"}]
                }}),
            ),
            package(
                "acme/good",
                json!({"quicksilver": {"good": [{"wf_type": "deploy", "stage": "after"}]}}),
            ),
        ]);

        assert_eq!(catalog.total(), 2);
        assert_eq!(catalog.get("clear_cache")[0].package_name, "acme/broken");
        assert_eq!(catalog.get("deploy")[0].package_name, "acme/good");
    }

    #[test]
    fn test_duplicate_stage_keeps_first() {
        let catalog = build(&[package(
            "acme/twice",
            json!({"quicksilver": {
                "one": [{"wf_type": "deploy", "stage": "after", "weight": 1}],
                "two": [{"wf_type": "deploy", "stage": "after", "weight": 2}]
            }}),
        )]);

        let hooks = catalog.get("deploy");
        assert_eq!(hooks.len(), 1);
        assert!(hooks[0].script.ends_with("one.php"));
    }

    #[test]
    fn test_groups_sorted_by_weight_with_stable_ties() {
        let hook = |weight: i64| json!({"quicksilver": {"s": [{"wf_type": "deploy", "stage": "after", "weight": weight}]}});
        let catalog = build(&[
            package("acme/a", hook(10)),
            package("acme/b", hook(0)),
            package("acme/c", hook(10)),
            package("acme/d", hook(-5)),
        ]);

        let order: Vec<&str> = catalog
            .get("deploy")
            .iter()
            .map(|d| d.package_name.as_str())
            .collect();
        assert_eq!(order, vec!["acme/d", "acme/b", "acme/a", "acme/c"]);
    }

    #[test]
    fn test_build_for_single_package() {
        let schema = SchemaCatalog::bundled().unwrap();
        let locator = BaseDirLocator::new("private/scripts/quicksilver");
        let settings = CatalogSettings::default();
        let builder = HookCatalogBuilder::new(&schema, &locator, &settings);

        let fragment = builder.build_for(&package(
            "acme/cache-warm",
            json!({"quicksilver": {"cache-warm": [
                {"wf_type": "deploy", "stage": "after"},
                {"wf_type": "clear_cache", "stage": "after"}
            ]}}),
        ));
        assert_eq!(fragment.total(), 2);
    }
}
