//! List the hooks declared by installed packages

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;
use serde_json::Value;
use silverhook_core::PackageSource;
use silverhook_engine::{Denylist, HookCatalog, HookDeclaration};
use std::path::Path;

use crate::command::Command;
use crate::common::{HookSetup, RuntimeContext};

/// List command
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format: simple or json
    #[arg(short, long, default_value = "simple")]
    pub format: String,
}

impl Command for ListCommand {
    type Output = HookCatalog;
    fn execute(&self, context: &RuntimeContext) -> crate::error::Result<HookCatalog> {
        run_impl(context, &self.format).map_err(Into::into)
    }
}

fn run_impl(context: &RuntimeContext, format: &str) -> Result<HookCatalog> {
    let installed = context.installed();
    let packages = installed
        .packages()
        .with_context(|| format!("Failed to read {}", installed.path().display()))?;

    let setup = HookSetup::load(context)?;
    let catalog = setup.builder().build(&packages);
    let document = context.config.document_path();

    match format {
        "json" => {
            let json = to_json(&catalog, &setup.denylist, &document);
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        _ => print_simple(&catalog, &setup.denylist, &document),
    }

    Ok(catalog)
}

/// JSON view of the catalog
fn to_json(catalog: &HookCatalog, denylist: &Denylist, document: &Path) -> Value {
    let denylisted: Vec<Value> = catalog
        .declarations()
        .filter(|d| denylist.suppresses(&d.wf_type, &d.stage, &d.package_name))
        .map(|d| {
            serde_json::json!({
                "package": d.package_name,
                "wf_type": d.wf_type,
                "stage": d.stage,
            })
        })
        .collect();

    serde_json::json!({
        "document": document.display().to_string(),
        "hooks": catalog,
        "denylisted": denylisted,
    })
}

fn print_simple(catalog: &HookCatalog, denylist: &Denylist, document: &Path) {
    println!("Document: {}", document.display().cyan());
    println!();

    if catalog.is_empty() {
        println!("{}", "No installed package declares hooks.".yellow());
        return;
    }

    for (wf_type, declarations) in catalog.iter() {
        println!("{} ({} hooks)", wf_type.bold(), declarations.len());
        for d in declarations {
            let denylisted = denylist.suppresses(&d.wf_type, &d.stage, &d.package_name);
            println!("  • {}", entry_line(d, denylisted));
        }
    }
}

/// One catalog entry, dimmed when the denylist suppresses it
fn entry_line(d: &HookDeclaration, denylisted: bool) -> String {
    let line = format!(
        "{} {} {} (weight: {})",
        d.stage, d.package_name, d.script, d.weight
    );
    if denylisted {
        format!("{} {}", line.dimmed(), "[denylisted]".dimmed())
    } else {
        line
    }
}
