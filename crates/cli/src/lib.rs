//! Silverhook CLI library
//!
//! Entry points for the Composer lifecycle scripts that keep a site's
//! `pantheon.yml` workflow hooks in sync with its installed packages.

pub mod cmd;
pub mod command;
pub mod common;
pub mod composer;
pub mod error;
pub mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use silverhook_config::Config;
use std::path::PathBuf;

use command::Command;
use common::RuntimeContext;

/// Silverhook - workflow hook reconciliation for Composer-managed sites
#[derive(Parser)]
#[command(name = "silverhook")]
#[command(about = "Keep pantheon.yml workflow hooks in sync with installed packages")]
#[command(version)]
#[command(long_about = "Keep pantheon.yml workflow hooks in sync with installed packages

Packages declare hooks under extra.quicksilver in their composer.json.
Wire the lifecycle commands into the root project's scripts section:

  \"scripts\": {
    \"post-install-cmd\": \"silverhook post-install\",
    \"post-update-cmd\": \"silverhook post-update\",
    \"post-package-uninstall\": \"silverhook post-package-uninstall\"
  }

Hand-written entries and comments in the document are kept.")]
pub struct Cli {
    /// Project root (directory holding composer.json)
    #[arg(long, env = "SILVERHOOK_PROJECT_DIR", value_name = "DIR")]
    pub project: Option<PathBuf>,

    /// Path to the config file
    #[arg(long, env = "SILVERHOOK_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "SILVERHOOK_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for silverhook CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile hooks after `composer install`
    #[command(name = "post-install")]
    PostInstall(cmd::update::UpdateCommand),

    /// Reconcile hooks after `composer update`
    #[command(name = "post-update")]
    PostUpdate(cmd::update::UpdateCommand),

    /// Remove the hooks of a package that is being uninstalled
    #[command(name = "post-package-uninstall")]
    PostPackageUninstall(cmd::uninstall::UninstallCommand),

    /// Create the configuration document if it is missing
    Init(cmd::init::InitCommand),

    /// List hooks declared by installed packages
    List(cmd::list::ListCommand),
}

impl Commands {
    /// Whether the command can modify the document
    fn writes_document(&self) -> bool {
        !matches!(self, Self::List(_))
    }
}

fn execute_command(command: Commands, context: &RuntimeContext) -> Result<()> {
    match command {
        Commands::PostInstall(update_cmd) | Commands::PostUpdate(update_cmd) => {
            update_cmd.execute(context)?;
        }
        Commands::PostPackageUninstall(uninstall_cmd) => {
            uninstall_cmd.execute(context)?;
        }
        Commands::Init(init_cmd) => {
            init_cmd.execute(context)?;
        }
        Commands::List(list_cmd) => {
            list_cmd.execute(context)?;
        }
    }

    Ok(())
}

/// Main entry point for the CLI application
///
/// # Errors
///
/// Returns an error if logging or configuration cannot be set up, or if the
/// command fails
pub fn run(cli: Cli) -> Result<()> {
    // Initialize logging based on verbosity
    silverhook_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let project_dir = match cli.project {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    let config = Config::load_for_project(&project_dir, cli.config.as_deref())
        .context("Failed to load configuration")?;

    if cli.command.writes_document()
        && let Some(variable) = config.disabled_by()
    {
        println!(
            "{} Skipping workflow hook sync: {variable} is set",
            "ℹ".cyan()
        );
        return Ok(());
    }

    let context = RuntimeContext::new(config, &project_dir);
    execute_command(cli.command, &context)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_lifecycle_commands() {
        let cli = Cli::try_parse_from(["silverhook", "post-update", "--dry-run"]).unwrap();
        assert!(matches!(cli.command, Commands::PostUpdate(ref c) if c.dry_run));

        let cli = Cli::try_parse_from([
            "silverhook",
            "--project",
            "/srv/site",
            "post-package-uninstall",
            "acme/cache-warm",
        ])
        .unwrap();
        assert_eq!(cli.project, Some(PathBuf::from("/srv/site")));
        match cli.command {
            Commands::PostPackageUninstall(c) => {
                assert_eq!(c.package, "acme/cache-warm");
                assert!(c.package_manifest.is_none());
            }
            _ => panic!("expected post-package-uninstall"),
        }
    }

    #[test]
    fn test_uninstall_requires_package() {
        assert!(Cli::try_parse_from(["silverhook", "post-package-uninstall"]).is_err());
    }

    #[test]
    fn test_list_is_read_only() {
        let cli = Cli::try_parse_from(["silverhook", "list", "--format", "json"]).unwrap();
        assert!(!cli.command.writes_document());

        let cli = Cli::try_parse_from(["silverhook", "init"]).unwrap();
        assert!(cli.command.writes_document());
    }
}
