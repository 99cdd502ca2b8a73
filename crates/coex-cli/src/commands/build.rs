//! Build command implementation.

use anyhow::{Context as _, Result};
use console::style;

use coex_ir::Coordination;
use coex_prop::{Area, AreaGrid, EdgeWeightBuilder, prepare_coverage};
use coex_store::{RunSnapshot, coverage_record, save_run};

use super::common::{Context, create_model, spinner};

/// Execute the build command.
///
/// Coloring results of the run are discarded since they refer to the
/// previous table.
pub async fn execute(ctx: &Context, run: &str) -> Result<()> {
    let config = ctx.run_config()?;
    let model = create_model(&config)?;
    let coordination = config.propagation.coordination;

    println!(
        "{} Building edge weights for {} ({} model, {} coordination)",
        style("→").cyan().bold(),
        style(run).green(),
        style(model.name()).yellow(),
        coordination
    );

    let (store, snapshot) = ctx.load(run).await?;
    let mut devices = snapshot.devices;
    devices.clear_assignments();
    println!("  Loaded: {} devices", devices.len());

    let area = match snapshot.area.map(|grid| grid.area) {
        Some(area) => Some(area),
        None => Area::enclosing(
            devices.iter().map(|d| d.location),
            config.propagation.grid_size_km,
        ),
    };

    let mut grid = None;
    if coordination == Coordination::Area {
        let area =
            area.ok_or_else(|| anyhow::anyhow!("Run '{run}' has no devices to build a grid for"))?;
        let area_grid = AreaGrid::new(area, config.propagation.grid_size_km)?;

        let progress = spinner(format!(
            "Computing coverage over {} cells...",
            area_grid.len()
        ));
        let result = prepare_coverage(
            model.as_ref(),
            &mut devices,
            &area_grid,
            config.propagation.rx_min,
        );
        progress.finish_and_clear();
        result.context("Coverage computation failed")?;
        println!("  Coverage: {} cells per device map", area_grid.len());
        grid = Some(area_grid);
    } else {
        for device in devices.iter_mut() {
            device.coverage = None;
        }
    }

    let builder = EdgeWeightBuilder::new(model.as_ref(), config.edge_weight_config());
    let pairs = devices.len() * devices.len().saturating_sub(1) / 2;
    let progress = spinner(format!("Evaluating {pairs} device pairs..."));
    let result = builder.build(&devices);
    progress.finish_and_clear();
    let table = result.context("Edge-weight build failed")?;

    let coverage = Some(coverage_record(&devices)).filter(|c| !c.is_empty());
    let snapshot = RunSnapshot {
        manifest: None,
        devices,
        edges: Some(table),
        coverage,
        area: grid.or_else(|| {
            area.and_then(|a| AreaGrid::new(a, config.propagation.grid_size_km).ok())
        }),
        coloring: None,
    };
    let manifest = save_run(&store, run, &snapshot).await?;

    println!("{} Edge weights built", style("✓").green().bold());
    println!(
        "  Result: {} edges over {} pairs",
        manifest.edge_count, pairs
    );

    Ok(())
}
