//! Command trait definition for CLI commands.

use anyhow::Result;

/// Trait implemented by ampclip CLI commands.
///
/// The `command_line` parameter contains the full command invocation for @PG records.
pub trait Command {
    #[allow(clippy::missing_errors_doc)]
    fn execute(&self, command_line: &str) -> Result<()>;
}
