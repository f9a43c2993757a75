//! CLI command dispatch and handlers.
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod run;
pub mod tools;
pub mod validate;
pub mod workflow;

use crate::cli::args::{Cli, Commands};
use crate::error::CyberdrillError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli) -> Result<(), CyberdrillError> {
    match cli.command {
        Commands::Run(args) => run::run(&args).await,
        Commands::Workflow(args) => workflow::run(&args).await,
        Commands::Validate(args) => validate::run(&args),
        Commands::Tools => {
            tools::run();
            Ok(())
        }
    }
}
