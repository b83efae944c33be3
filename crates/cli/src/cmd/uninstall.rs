//! Removal pass (`post-package-uninstall`)

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;
use silverhook_core::{PackageRef, PackageSource};
use silverhook_engine::{ReconcileReport, ReconciliationEngine};
use std::path::PathBuf;
use tracing::info;

use super::{WritePolicy, finish};
use crate::command::Command;
use crate::common::{HookSetup, RuntimeContext};
use crate::composer::read_package_manifest;
use crate::error::CommandError;

/// Uninstall command
#[derive(Debug, Args)]
pub struct UninstallCommand {
    /// Name of the package being removed (vendor/name)
    pub package: String,

    /// The package's own composer.json, for when it is already gone from
    /// the installed manifest
    #[arg(long, value_name = "PATH")]
    pub package_manifest: Option<PathBuf>,

    /// Show the resulting changes without writing the document
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl Command for UninstallCommand {
    type Output = ReconcileReport;
    fn execute(&self, context: &RuntimeContext) -> crate::error::Result<ReconcileReport> {
        let package = self.resolve_package(context)?;
        run_impl(context, &package, self.dry_run).map_err(Into::into)
    }
}

impl UninstallCommand {
    fn resolve_package(&self, context: &RuntimeContext) -> crate::error::Result<PackageRef> {
        if let Some(path) = &self.package_manifest {
            let package = read_package_manifest(path)?;
            if package.name != self.package {
                tracing::warn!(
                    "{} describes {}, not {}",
                    path.display(),
                    package.name,
                    self.package
                );
            }
            return Ok(package);
        }

        let installed = context.installed();
        installed.find(&self.package)?.ok_or_else(|| {
            CommandError::package_not_found(&self.package, installed.path().to_path_buf())
        })
    }
}

/// Remove the entries of one package
fn run_impl(context: &RuntimeContext, package: &PackageRef, dry_run: bool) -> Result<ReconcileReport> {
    // The builder applies the same package-type filter as the update pass
    let setup = HookSetup::load(context)?;
    let fragment = setup.builder().build_for(package);
    if fragment.is_empty() {
        info!("{} ({}) contributes no hooks", package.name, package.kind);
        return Ok(ReconcileReport::default());
    }

    let store = context.document_store();
    if !store.exists() {
        info!("{} does not exist, nothing to remove", store.path().display());
        return Ok(ReconcileReport::default());
    }

    let (mut document, ledger) = store
        .load()
        .with_context(|| format!("Failed to load hooks for removal of {}", package.name))?;
    let report = ReconciliationEngine::remove(&fragment, &mut document)?;

    if report.removed > 0 {
        println!(
            "{} Removing {} hooks of {}",
            "ℹ".cyan(),
            report.removed,
            package.name.bold()
        );
    }
    info!("Removal pass: {report}");

    finish(
        &store,
        &document,
        &ledger,
        report.is_changed(),
        WritePolicy::ChangedOnly,
        dry_run,
    )?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use crate::cmd::update::UpdateCommand;
    use silverhook_config::Config;
    use std::fs;
    use tempfile::TempDir;

    const INSTALLED: &str = r#"{"packages": [
        {
            "name": "acme/cache-warm",
            "type": "quicksilver-script",
            "description": "Warms the page cache",
            "extra": {"quicksilver": {"cache-warm": [
                {"wf_type": "deploy", "stage": "after"}
            ]}}
        },
        {
            "name": "acme/notify",
            "type": "quicksilver-script",
            "description": "Posts to chat",
            "extra": {"quicksilver": {"notify": [
                {"wf_type": "deploy", "stage": "after", "weight": 10}
            ]}}
        },
        {"name": "acme/lib", "type": "library"}
    ]}"#;

    fn project() -> (TempDir, RuntimeContext) {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("vendor/composer")).unwrap();
        fs::write(temp.path().join("vendor/composer/installed.json"), INSTALLED).unwrap();

        let config = Config::default().with_base_dir(temp.path());
        let context = RuntimeContext::new(config, temp.path());
        UpdateCommand { dry_run: false }.execute(&context).unwrap();
        (temp, context)
    }

    fn uninstall(package: &str) -> UninstallCommand {
        UninstallCommand {
            package: package.to_string(),
            package_manifest: None,
            dry_run: false,
        }
    }

    #[test]
    fn test_uninstall_removes_only_that_package() {
        let (temp, context) = project();

        let report = uninstall("acme/cache-warm").execute(&context).unwrap();
        assert_eq!(report.removed, 1);

        let text = fs::read_to_string(temp.path().join("pantheon.yml")).unwrap();
        assert!(!text.contains("acme/cache-warm"));
        assert!(text.contains("[acme/notify] Posts to chat (default)"));
    }

    #[test]
    fn test_uninstall_from_package_manifest() {
        let (temp, context) = project();
        let manifest = temp.path().join("notify.json");
        fs::write(
            &manifest,
            r#"{
                "name": "acme/notify",
                "type": "quicksilver-script",
                "extra": {"quicksilver": {"notify": [
                    {"wf_type": "deploy", "stage": "after"}
                ]}}
            }"#,
        )
        .unwrap();

        let command = UninstallCommand {
            package: "acme/notify".to_string(),
            package_manifest: Some(manifest),
            dry_run: false,
        };
        assert_eq!(command.execute(&context).unwrap().removed, 1);

        let text = fs::read_to_string(temp.path().join("pantheon.yml")).unwrap();
        assert!(!text.contains("acme/notify"));
        assert!(text.contains("acme/cache-warm"));
    }

    #[test]
    fn test_uninstall_non_hook_package_is_noop() {
        let (temp, context) = project();
        let path = temp.path().join("pantheon.yml");
        let before = fs::read_to_string(&path).unwrap();

        let report = uninstall("acme/lib").execute(&context).unwrap();
        assert!(!report.is_changed());
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_uninstall_with_unrestricted_package_types() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("vendor/composer")).unwrap();
        fs::write(
            temp.path().join("vendor/composer/installed.json"),
            r#"{"packages": [{
                "name": "acme/cache-warm",
                "type": "library",
                "description": "Warm",
                "extra": {"quicksilver": {"cache-warm": [
                    {"wf_type": "deploy", "stage": "after"}
                ]}}
            }]}"#,
        )
        .unwrap();

        let mut config = Config::default().with_base_dir(temp.path());
        config.packages.types.clear();
        let context = RuntimeContext::new(config, temp.path());

        let report = UpdateCommand { dry_run: false }.execute(&context).unwrap();
        assert_eq!(report.inserted, 1);
        let path = temp.path().join("pantheon.yml");
        assert!(fs::read_to_string(&path).unwrap().contains("[acme/cache-warm] Warm (default)"));

        let report = uninstall("acme/cache-warm").execute(&context).unwrap();
        assert_eq!(report.removed, 1);
        assert!(!fs::read_to_string(&path).unwrap().contains("acme/cache-warm"));
    }

    #[test]
    fn test_uninstall_unknown_package() {
        let (_temp, context) = project();

        let err = uninstall("acme/missing").execute(&context).unwrap_err();
        assert!(matches!(err, CommandError::PackageNotFound { .. }));
    }

    #[test]
    fn test_uninstall_dry_run_keeps_file() {
        let (temp, context) = project();
        let path = temp.path().join("pantheon.yml");
        let before = fs::read_to_string(&path).unwrap();

        let mut command = uninstall("acme/cache-warm");
        command.dry_run = true;
        assert_eq!(command.execute(&context).unwrap().removed, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }
}
