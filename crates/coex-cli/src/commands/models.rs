//! Models command implementation.

use anyhow::Result;
use console::style;

use coex_prop::{KNOWN_MODELS, ModelRegistry};

use super::common::Context;

/// Execute the models command.
pub fn execute(ctx: &Context) -> Result<()> {
    let registry = ModelRegistry::with_builtins();
    let configured = ctx.run_config().ok().map(|c| c.propagation.model);

    println!("{} Propagation models:\n", style("Coex").cyan().bold());
    for name in KNOWN_MODELS {
        let available = registry.has_model(name);
        let marker = if available {
            style("●").green()
        } else {
            style("○").dim()
        };
        let note = if available {
            "bundled"
        } else {
            "needs terrain data, not bundled"
        };
        let current = if configured.as_deref() == Some(*name) {
            " (configured)"
        } else {
            ""
        };
        println!("  {} {} - {}{}", marker, style(name).bold(), note, current);
    }

    Ok(())
}
