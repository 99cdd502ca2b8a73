//! Generate command implementation.

use anyhow::{Context as _, Result};
use console::style;

use coex_prop::AreaGrid;
use coex_scenario::{
    LandCover, LandCoverClass, ScenarioConfig, ScenarioGenerator, SyntheticNlcd,
    UniformLandCover, assign_coex_groups,
};
use coex_store::{CheckpointStore, RunSnapshot, save_run};

use super::common::Context;

/// Execute the generate command.
pub async fn execute(
    ctx: &Context,
    scenario: Option<&str>,
    prefix: &str,
    seed: u64,
    land_cover: &str,
    dump_scenario: bool,
) -> Result<()> {
    let config = match scenario {
        Some(path) => ScenarioConfig::from_file(path)
            .with_context(|| format!("Failed to load scenario file: {path}"))?,
        None => ScenarioConfig::default(),
    };

    if dump_scenario {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let cover = parse_land_cover(land_cover, seed)?;
    println!(
        "{} Generating {} locations over {}×{} km ({} land cover, seed {})",
        style("→").cyan().bold(),
        config.location_count(),
        config.width_km,
        config.length_km,
        style(land_cover).yellow(),
        seed
    );

    let num_groups = config.num_coex_groups;
    let mut generator = ScenarioGenerator::new(config, seed)?;
    let mut generated = generator.generate(cover.as_ref())?;
    assign_coex_groups(&mut generated.devices, num_groups, seed);

    let grid_size_km = ctx.run_config()?.propagation.grid_size_km;
    let mut snapshot = RunSnapshot::new(generated.devices);
    snapshot.area = Some(AreaGrid::new(generated.area, grid_size_km)?);

    let store = ctx.store().await?;
    let prefix = store.next_free_prefix(prefix).await?;
    let manifest = save_run(&store, &prefix, &snapshot).await?;

    println!("{} Generated run {}", style("✓").green().bold(), style(&prefix).green());
    println!("  Devices: {}", manifest.device_count);
    println!("  Coexistence groups: 0..={num_groups}");
    println!("  Stored in: {}", store.base_dir().display());

    Ok(())
}

/// Land-cover source for a command-line name.
pub fn parse_land_cover(name: &str, seed: u64) -> Result<Box<dyn LandCover>> {
    let class = match name.to_lowercase().as_str() {
        "synthetic" | "nlcd" => return Ok(Box::new(SyntheticNlcd::new(seed))),
        "dense-urban" | "dense_urban" => LandCoverClass::DenseUrban,
        "urban" => LandCoverClass::Urban,
        "suburban" => LandCoverClass::Suburban,
        "rural" => LandCoverClass::Rural,
        other => {
            anyhow::bail!(
                "Unknown land cover: '{other}'. Available: synthetic, dense-urban, urban, suburban, rural"
            );
        }
    };
    Ok(Box::new(UniformLandCover(class)))
}
