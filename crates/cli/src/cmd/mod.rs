//! CLI command implementations
//!
//! One module per lifecycle trigger plus the `init` and `list` helpers.

pub mod init;
pub mod list;
pub mod uninstall;
pub mod update;

use crate::ui;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use silverhook_engine::{CommentLedger, ConfigurationDocument, DocumentStore};
use std::fs;

/// When to write the document at the end of a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WritePolicy {
    /// Write when changed, or when the document does not exist yet
    Bootstrap,
    /// Write only when changed
    ChangedOnly,
}

/// Write the document, or print what would be written on a dry run
///
/// Returns `true` when the file was written.
pub(crate) fn finish(
    store: &DocumentStore,
    document: &ConfigurationDocument,
    ledger: &CommentLedger,
    changed: bool,
    policy: WritePolicy,
    dry_run: bool,
) -> Result<bool> {
    let exists = store.exists();
    let needed = changed || (policy == WritePolicy::Bootstrap && !exists);
    let label = store.path().display();

    if !needed {
        println!("{} {label} is up to date", "✓".green());
        return Ok(false);
    }

    if dry_run {
        let old = if exists {
            fs::read_to_string(store.path())
                .with_context(|| format!("Failed to read {label}"))?
        } else {
            String::new()
        };
        let new = store.render(document, ledger)?;
        let old_label = if exists {
            format!("a/{label}")
        } else {
            "/dev/null".to_string()
        };

        println!("{} {label} would change (dry run)", "ℹ".cyan());
        ui::print_colored_diff(&ui::unified_diff(
            &old,
            &new,
            &old_label,
            &format!("b/{label}"),
        ));
        return Ok(false);
    }

    store.write(document, ledger)?;
    println!("{} Updated {label}", "✓".green());
    Ok(true)
}
