//! Color command implementation.

use anyhow::{Context as _, Result};
use console::style;

use coex_sas::{ColoringEngine, assign_channels};
use coex_store::{ColoringRecord, save_run};

use super::common::{Context, require_edges, spinner};

/// Execute the color command.
pub async fn execute(ctx: &Context, run: &str, threshold: Option<f64>) -> Result<()> {
    let config = ctx.run_config()?;
    let coloring = config.coloring_config();
    let engine = ColoringEngine::new(coloring)?;

    match threshold {
        Some(th) => println!(
            "{} Coloring {} at threshold {}",
            style("→").cyan().bold(),
            style(run).green(),
            style(th).yellow()
        ),
        None => println!(
            "{} Coloring {} from threshold {} in steps of {}",
            style("→").cyan().bold(),
            style(run).green(),
            style(coloring.th_start).yellow(),
            coloring.th_step
        ),
    }

    let (store, mut snapshot) = ctx.load(run).await?;
    let table = require_edges(&snapshot, run)?;
    let ids = snapshot.devices.ids();
    println!("  Loaded: {} devices, {} edges", ids.len(), table.len());

    let progress = spinner("Partitioning and coloring...");
    let result = match threshold {
        Some(th) => engine.color_all_at(&ids, &snapshot.devices, table, th),
        None => engine.color_all(&ids, &snapshot.devices, table),
    };
    progress.finish_and_clear();
    let outcome = result.context("Coloring failed")?;

    snapshot.devices.clear_assignments();
    assign_channels(
        &mut snapshot.devices,
        &outcome.components,
        &config.channels.available,
        config.coloring.partial_assign,
    )?;
    snapshot.coloring = Some(
        outcome
            .components
            .iter()
            .map(|c| ColoringRecord::from_component(c, coloring.max_colors))
            .collect(),
    );
    save_run(&store, run, &snapshot).await?;

    let max_chromatic = outcome
        .components
        .iter()
        .map(|c| c.chromatic)
        .max()
        .unwrap_or(0);
    println!("{} Coloring complete", style("✓").green().bold());
    println!(
        "  Result: {} components, up to {} colors, escalation level {}",
        outcome.components.len(),
        max_chromatic,
        outcome.max_level()
    );

    if !outcome.is_satisfied() {
        println!(
            "\n{} {} components need more colors than the {} channels:",
            style("!").yellow().bold(),
            outcome.unsatisfied.len(),
            coloring.max_colors
        );
        for u in outcome.unsatisfied.iter().take(10) {
            println!(
                "  at {}: {} devices, {} colors at threshold {:.3}",
                style(&u.first_member).cyan(),
                u.size,
                u.chromatic,
                u.threshold
            );
        }
        if !config.coloring.partial_assign {
            println!("  These devices got no channels; set partial_assign to hand out single channels.");
        }
    }

    Ok(())
}
