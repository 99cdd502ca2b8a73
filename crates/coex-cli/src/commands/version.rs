//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - coexistence channel assignment for shared spectrum",
        style("Coex").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  coex-ir        Devices, edge-weight table and interference graph");
    println!("  coex-prop      Propagation models, coverage grids, edge weights");
    println!("  coex-sas       Partitioning, coloring, channels, Approach-3");
    println!("  coex-store     Run checkpoints");
    println!("  coex-scenario  Random deployments");
    println!("  coex-cli       Command-line interface");
    println!();
    println!("License:    {}", style("Apache-2.0").dim());
}
