//! Command trait for silverhook CLI
//!
//! Every lifecycle command implements [`Command`], receiving the shared
//! [`RuntimeContext`] instead of loose parameters.

use crate::common::RuntimeContext;
use crate::error::Result;

/// Trait for all silverhook commands
///
/// # Example
///
/// ```rust,ignore
/// use crate::command::Command;
/// use crate::common::RuntimeContext;
/// use crate::error::Result;
/// use clap::Args;
///
/// #[derive(Debug, Args)]
/// pub struct MyCommand {
///     #[arg(short = 'n', long)]
///     pub dry_run: bool,
/// }
///
/// impl Command for MyCommand {
///     type Output = ();
///
///     fn execute(&self, context: &RuntimeContext) -> Result<()> {
///         let store = context.document_store();
///         Ok(())
///     }
/// }
/// ```
pub trait Command {
    /// The type returned by this command
    type Output;

    /// Execute the command with the given runtime context
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` if the command fails. Skipped or denylisted
    /// hook declarations are not failures.
    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output>;
}
