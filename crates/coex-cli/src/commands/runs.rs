//! Runs command implementation.

use anyhow::Result;
use console::style;

use coex_store::CheckpointStore;

use super::common::Context;

/// Execute the runs command.
pub async fn execute(ctx: &Context, delete: Option<&str>) -> Result<()> {
    let store = ctx.store().await?;

    if let Some(run) = delete {
        let removed = store.delete_run(run).await?;
        if removed == 0 {
            anyhow::bail!("Run '{run}' not found");
        }
        println!(
            "{} Deleted {} ({} files)",
            style("✓").green().bold(),
            style(run).green(),
            removed
        );
        return Ok(());
    }

    let runs = store.list_runs().await?;
    if runs.is_empty() {
        println!("No runs in {}", store.base_dir().display());
        return Ok(());
    }

    println!(
        "{} Runs in {}:\n",
        style("Coex").cyan().bold(),
        store.base_dir().display()
    );
    println!(
        "  {:<24} {:>8} {:>10} {:<10} {}",
        "RUN", "DEVICES", "EDGES", "MODEL", "CREATED"
    );
    for run in runs {
        let Some(manifest) = store.load_manifest(&run).await? else {
            continue;
        };
        println!(
            "  {:<24} {:>8} {:>10} {:<10} {}",
            style(&manifest.prefix).green(),
            manifest.device_count,
            manifest.edge_count,
            manifest.model.as_deref().unwrap_or("-"),
            manifest.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }

    Ok(())
}
