//! The `tools` command: list the registered tools.

use crate::tools;

/// Prints every registered tool with its description.
pub fn run() {
    for (name, spec) in tools::registry() {
        println!("{name}: {}", spec.description);
    }
}
