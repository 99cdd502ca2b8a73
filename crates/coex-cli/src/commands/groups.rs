//! Groups command implementation.

use anyhow::Result;
use console::style;

use coex_scenario::assign_coex_groups;
use coex_store::{RunSnapshot, save_run};

use super::common::Context;

/// Execute the groups command.
///
/// Downstream records no longer match the new groups, so only the devices
/// are kept.
pub async fn execute(ctx: &Context, run: &str, num: u32, seed: u64) -> Result<()> {
    println!(
        "{} Assigning {} to groups 0..={}",
        style("→").cyan().bold(),
        style(run).green(),
        num
    );

    let (store, snapshot) = ctx.load(run).await?;
    let mut devices = snapshot.devices;
    devices.clear_assignments();
    assign_coex_groups(&mut devices, num, seed);

    let mut counts = std::collections::BTreeMap::new();
    for device in devices.iter() {
        *counts.entry(device.coex_group).or_insert(0_usize) += 1;
    }

    let mut updated = RunSnapshot::new(devices);
    updated.edges = snapshot.edges;
    updated.coverage = snapshot.coverage;
    updated.area = snapshot.area;
    save_run(&store, run, &updated).await?;

    println!("{} Groups assigned", style("✓").green().bold());
    for (group, count) in counts {
        println!("  CxG {group}: {count} devices");
    }
    if updated.edges.is_some() {
        println!(
            "  {} Coloring results dropped; run `coex color {run}` again",
            style("!").yellow().bold()
        );
    }

    Ok(())
}
