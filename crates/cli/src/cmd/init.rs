//! Create the configuration document if it is missing

use anyhow::Result;
use clap::Args;

use super::{WritePolicy, finish};
use crate::command::Command;
use crate::common::RuntimeContext;

/// Init command
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Show the document that would be created without writing it
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

impl Command for InitCommand {
    type Output = bool;
    fn execute(&self, context: &RuntimeContext) -> crate::error::Result<bool> {
        run_impl(context, self.dry_run).map_err(Into::into)
    }
}

/// Seed the document from the template and make sure it has a workflows map
///
/// Returns `true` when the file was written.
fn run_impl(context: &RuntimeContext, dry_run: bool) -> Result<bool> {
    let store = context.document_store();
    let (mut document, ledger) = store.load()?;
    let changed = document.ensure_workflows()?;

    finish(&store, &document, &ledger, changed, WritePolicy::Bootstrap, dry_run)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use silverhook_config::Config;
    use std::fs;
    use tempfile::TempDir;

    fn context(temp: &TempDir) -> RuntimeContext {
        RuntimeContext::new(Config::default().with_base_dir(temp.path()), temp.path())
    }

    #[test]
    fn test_init_creates_document_from_template() {
        let temp = TempDir::new().unwrap();

        assert!(InitCommand { dry_run: false }.execute(&context(&temp)).unwrap());

        let text = fs::read_to_string(temp.path().join("pantheon.yml")).unwrap();
        assert!(text.starts_with('#'));
        assert!(text.contains("api_version: 1\n"));
        assert!(text.contains("workflows: {}\n"));
    }

    #[test]
    fn test_init_adds_workflows_to_existing_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pantheon.yml");
        fs::write(&path, "# site settings\napi_version: 1\nphp_version: 8.1\n").unwrap();

        assert!(InitCommand { dry_run: false }.execute(&context(&temp)).unwrap());

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "# site settings\napi_version: 1\nphp_version: 8.1\nworkflows: {}\n"
        );
    }

    #[test]
    fn test_init_leaves_complete_document_alone() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pantheon.yml");
        fs::write(&path, "api_version: 1\nworkflows: {}\n").unwrap();

        assert!(!InitCommand { dry_run: false }.execute(&context(&temp)).unwrap());
    }

    #[test]
    fn test_init_dry_run() {
        let temp = TempDir::new().unwrap();

        assert!(!InitCommand { dry_run: true }.execute(&context(&temp)).unwrap());
        assert!(!temp.path().join("pantheon.yml").exists());
    }

    #[test]
    fn test_init_custom_template() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("base.yml"), "api_version: 1\nenforce_https: full\n").unwrap();
        let config = Config::from_toml_str("[document]\ntemplate = \"base.yml\"\n", temp.path()).unwrap();
        let context = RuntimeContext::new(config, temp.path());

        InitCommand { dry_run: false }.execute(&context).unwrap();

        let text = fs::read_to_string(temp.path().join("pantheon.yml")).unwrap();
        assert_eq!(text, "api_version: 1\nenforce_https: full\nworkflows: {}\n");
    }
}
