//! Cluster command implementation.

use std::fs;

use anyhow::{Context as _, Result};
use console::style;

use coex_sas::{approach3_bandwidth, estimate_all};

use super::common::{Context, require_edges};

/// Execute the cluster command.
pub async fn execute(
    ctx: &Context,
    run: &str,
    threshold: Option<f64>,
    export: Option<&str>,
) -> Result<()> {
    let config = ctx.run_config()?;
    let threshold = threshold.unwrap_or(config.coloring.th_start);

    println!(
        "{} Estimating clusters of {} at threshold {}",
        style("→").cyan().bold(),
        style(run).green(),
        style(threshold).yellow()
    );

    let (_, snapshot) = ctx.load(run).await?;
    let table = require_edges(&snapshot, run)?;
    let estimates = estimate_all(&snapshot.devices, table, threshold)?;
    let bandwidth = approach3_bandwidth(&estimates, config.total_bandwidth_mhz());

    let mut histogram = std::collections::BTreeMap::new();
    for estimate in estimates.values() {
        *histogram.entry(estimate.cluster_size).or_insert(0_usize) += 1;
    }
    let with_neighbors = estimates
        .values()
        .filter(|e| !e.potential_neighbors.is_empty())
        .count();
    let mean_bw = bandwidth.values().sum::<f64>() / bandwidth.len().max(1) as f64;

    println!("{} Clusters estimated", style("✓").green().bold());
    for (size, count) in &histogram {
        println!("  Cluster size {size}: {count} devices");
    }
    println!("  Devices with potential neighbors: {with_neighbors}");
    println!("  Mean bandwidth bound: {mean_bw:.1} MHz");

    if let Some(path) = export {
        let json = serde_json::to_string_pretty(&estimates)?;
        fs::write(path, json).with_context(|| format!("Failed to write file: {path}"))?;
        println!("  Output: {}", style(path).green());
    }

    Ok(())
}
