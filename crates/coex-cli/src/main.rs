//! Coex Command-Line Interface
//!
//! Runs the coexistence pipeline phase by phase. Every phase reads the
//! checkpoint written by the previous one and writes its own result under the
//! same run prefix:
//!
//! ```text
//!   generate ──▶ groups ──▶ build ──▶ color ──▶ evaluate
//!   (.cbsd)      (.cbsd)    (.ewt      (.gc,
//!                            .cvg       .cbsd)
//!                            .area)
//!                              └──────▶ cluster
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::Context;
use commands::{build, cluster, color, evaluate, generate, groups, models, runs, version};

/// Coex - coexistence channel assignment for shared spectrum
#[derive(Parser)]
#[command(name = "coex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Run configuration file (YAML)
    #[arg(short, long, global = true, env = "COEX_CONFIG")]
    config: Option<String>,

    /// Checkpoint directory (defaults to ~/.coex/runs)
    #[arg(long, global = true, env = "COEX_DATA_DIR")]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random deployment and save it as a new run
    Generate {
        /// Scenario file (YAML); the reference deployment if omitted
        #[arg(short, long)]
        scenario: Option<String>,

        /// Run prefix; a free `<prefix>-N` is picked if it exists
        #[arg(short, long, default_value = "scenario")]
        prefix: String,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Land cover (synthetic, dense-urban, urban, suburban, rural)
        #[arg(long, default_value = "synthetic")]
        land_cover: String,

        /// Print the effective scenario settings as YAML and exit
        #[arg(long)]
        dump_scenario: bool,
    },

    /// Reassign coexistence groups of a run
    Groups {
        /// Run prefix
        run: String,

        /// Devices are spread over groups 0..=NUM
        #[arg(short, long, default_value = "3")]
        num: u32,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Build the edge-weight table of a run
    Build {
        /// Run prefix
        run: String,
    },

    /// Color a run and assign channels
    Color {
        /// Run prefix
        run: String,

        /// Color once at this threshold instead of escalating
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Estimate Approach-3 clusters of a run
    Cluster {
        /// Run prefix
        run: String,

        /// Effective-edge threshold (defaults to th_start)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Output file for the estimates (JSON)
        #[arg(short, long)]
        export: Option<String>,
    },

    /// Evaluate the channel assignment of a run
    Evaluate {
        /// Run prefix
        run: String,

        /// Threshold for the Approach-3 comparison (defaults to th_start)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Output file for the JSON report (stdout summary only if omitted)
        #[arg(short, long)]
        export: Option<String>,
    },

    /// List stored runs
    Runs {
        /// Delete this run instead of listing
        #[arg(long)]
        delete: Option<String>,
    },

    /// List propagation models
    Models,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let ctx = Context::new(cli.config, cli.data_dir);

    // Execute command
    let result = match cli.command {
        Commands::Generate {
            scenario,
            prefix,
            seed,
            land_cover,
            dump_scenario,
        } => {
            generate::execute(
                &ctx,
                scenario.as_deref(),
                &prefix,
                seed,
                &land_cover,
                dump_scenario,
            )
            .await
        }

        Commands::Groups { run, num, seed } => groups::execute(&ctx, &run, num, seed).await,

        Commands::Build { run } => build::execute(&ctx, &run).await,

        Commands::Color { run, threshold } => color::execute(&ctx, &run, threshold).await,

        Commands::Cluster {
            run,
            threshold,
            export,
        } => cluster::execute(&ctx, &run, threshold, export.as_deref()).await,

        Commands::Evaluate {
            run,
            threshold,
            export,
        } => evaluate::execute(&ctx, &run, threshold, export.as_deref()).await,

        Commands::Runs { delete } => runs::execute(&ctx, delete.as_deref()).await,

        Commands::Models => models::execute(&ctx),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
