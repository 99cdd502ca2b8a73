//! Evaluate command implementation.

use std::collections::BTreeMap;
use std::fs;

use anyhow::{Context as _, Result};
use console::style;
use serde::Serialize;
use tracing::warn;

use coex_ir::DeviceId;
use coex_sas::{
    BandwidthReport, ColoredComponent, approach3_bandwidth, bandwidth_report, channel_utilization,
    estimate_all, residual_interference,
};
use coex_store::ColoringRecord;

use super::common::{Context, create_model, require_edges};

/// Metrics of one colored run.
#[derive(Debug, Serialize)]
struct EvaluationReport {
    run: String,
    threshold: f64,
    utilization: BTreeMap<u32, f64>,
    bandwidth: BandwidthReport,
    approach3_mhz: BTreeMap<DeviceId, f64>,
    residual_dbm: Option<BTreeMap<DeviceId, f64>>,
}

/// Execute the evaluate command.
pub async fn execute(
    ctx: &Context,
    run: &str,
    threshold: Option<f64>,
    export: Option<&str>,
) -> Result<()> {
    let config = ctx.run_config()?;
    let threshold = threshold.unwrap_or(config.coloring.th_start);

    println!(
        "{} Evaluating {}",
        style("→").cyan().bold(),
        style(run).green()
    );

    let (_, snapshot) = ctx.load(run).await?;
    let table = require_edges(&snapshot, run)?;
    let records = snapshot.coloring.as_ref().ok_or_else(|| {
        anyhow::anyhow!("Run '{run}' has no coloring results; run `coex color {run}` first")
    })?;
    let components: Vec<ColoredComponent> =
        records.iter().map(ColoringRecord::to_component).collect();

    let channels = &config.channels;
    let utilization = channel_utilization(&snapshot.devices, &channels.available);
    let bandwidth = bandwidth_report(
        &snapshot.devices,
        &components,
        channels.available.len(),
        channels.bandwidth_mhz,
    )?;

    let estimates = estimate_all(&snapshot.devices, table, threshold)?;
    let approach3_mhz = approach3_bandwidth(&estimates, config.total_bandwidth_mhz());

    let residual_dbm = match create_model(&config) {
        Ok(model) => Some(residual_interference(model.as_ref(), &snapshot.devices, &estimates)?),
        Err(e) => {
            warn!("Skipping residual interference: {:#}", e);
            None
        }
    };

    let report = EvaluationReport {
        run: run.to_string(),
        threshold,
        utilization,
        bandwidth,
        approach3_mhz,
        residual_dbm,
    };
    print_report(&report);

    if let Some(path) = export {
        let json = serde_json::to_string_pretty(&report)?;
        fs::write(path, json).with_context(|| format!("Failed to write file: {path}"))?;
        println!("  Output: {}", style(path).green());
    }

    Ok(())
}

fn print_report(report: &EvaluationReport) {
    println!(
        "\n{} Channel utilization ({} devices):",
        style("✓").green().bold(),
        report.bandwidth.devices.len()
    );
    for (channel, share) in &report.utilization {
        let bar: String = "█".repeat((share * 40.0).round() as usize);
        println!(
            "  ch {:>3}: {:>5.1}% {}",
            style(channel).cyan(),
            share * 100.0,
            style(bar).green()
        );
    }

    let approach3_mean =
        report.approach3_mhz.values().sum::<f64>() / report.approach3_mhz.len().max(1) as f64;
    println!("\nBandwidth per device:");
    println!("  Assigned:    {:>7.1} MHz", report.bandwidth.mean_actual_mhz);
    println!("  Even share:  {:>7.1} MHz", report.bandwidth.mean_theoretical_mhz);
    println!(
        "  Approach 3:  {:>7.1} MHz (threshold {})",
        approach3_mean, report.threshold
    );

    if let Some(residual) = &report.residual_dbm {
        let finite: Vec<f64> = residual.values().copied().filter(|v| v.is_finite()).collect();
        match finite.iter().copied().reduce(f64::max) {
            Some(worst) => println!(
                "  Residual interference: {} devices exposed, worst {:.1} dBm",
                finite.len(),
                worst
            ),
            None => println!("  Residual interference: none"),
        }
    }
}
