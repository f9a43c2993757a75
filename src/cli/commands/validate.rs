//! The `validate` command: check a scenario file without running it.

use crate::cli::args::ValidateArgs;
use crate::config;
use crate::error::CyberdrillError;

/// Loads and validates the scenario, printing a short summary.
///
/// # Errors
///
/// Returns an error when the scenario fails to load or validate; the
/// error lists every issue found.
pub fn run(args: &ValidateArgs) -> Result<(), CyberdrillError> {
    let scenario = config::load(&args.config)?;
    println!(
        "{}: ok ({} red, {} blue, {} workflow nodes)",
        args.config.display(),
        scenario.agents.red.len(),
        scenario.agents.blue.len(),
        scenario.workflow.nodes.len(),
    );
    Ok(())
}
