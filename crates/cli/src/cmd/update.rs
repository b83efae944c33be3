//! Update pass (`post-install` and `post-update`)
//!
//! Reconciles the document against every installed package.

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;
use silverhook_core::PackageSource;
use silverhook_engine::{ReconcileReport, ReconciliationEngine};
use tracing::info;

use super::{WritePolicy, finish};
use crate::command::Command;
use crate::common::{HookSetup, RuntimeContext};

/// Update command
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Show the resulting changes without writing the document
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl Command for UpdateCommand {
    type Output = ReconcileReport;
    fn execute(&self, context: &RuntimeContext) -> crate::error::Result<ReconcileReport> {
        run_impl(context, self.dry_run).map_err(Into::into)
    }
}

/// Run the update pass
fn run_impl(context: &RuntimeContext, dry_run: bool) -> Result<ReconcileReport> {
    let installed = context.installed();
    let packages = installed
        .packages()
        .with_context(|| format!("Failed to read {}", installed.path().display()))?;

    let setup = HookSetup::load(context)?;
    let catalog = setup.builder().build(&packages);
    info!(
        "Found {} hook declarations in {} installed packages",
        catalog.total(),
        packages.len()
    );

    let store = context.document_store();
    let (mut document, ledger) = store.load()?;
    let original = document.clone();

    let engine = ReconciliationEngine::new(
        &catalog,
        &setup.denylist,
        context.config.scripts.task_type.as_str(),
    );
    let report = engine.update(&mut document)?;

    if report.suppressed > 0 {
        println!(
            "{} {} hooks skipped by the project denylist",
            "ℹ".cyan(),
            report.suppressed
        );
    }
    info!("Update pass: {report}");

    finish(
        &store,
        &document,
        &ledger,
        document.changed_since(&original),
        WritePolicy::Bootstrap,
        dry_run,
    )?;
    Ok(report)
}
