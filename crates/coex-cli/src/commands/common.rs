//! Shared helpers for CLI commands.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use indicatif::{ProgressBar, ProgressStyle};

use coex_ir::EdgeWeightTable;
use coex_prop::{ModelRegistry, PropagationModel};
use coex_sas::RunConfig;
use coex_store::{JsonStore, RunSnapshot, load_run};

/// Settings shared by all commands.
pub struct Context {
    config_file: Option<String>,
    data_dir: Option<String>,
}

impl Context {
    pub fn new(config_file: Option<String>, data_dir: Option<String>) -> Self {
        Self {
            config_file,
            data_dir,
        }
    }

    /// Load and validate the run configuration.
    pub fn run_config(&self) -> Result<RunConfig> {
        RunConfig::load(self.config_file.as_deref()).with_context(|| match &self.config_file {
            Some(path) => format!("Failed to load run configuration from {path}"),
            None => "Failed to load run configuration".to_string(),
        })
    }

    /// Open the checkpoint store.
    pub async fn store(&self) -> Result<JsonStore> {
        let dir = match &self.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };
        JsonStore::new(&dir)
            .await
            .with_context(|| format!("Failed to open checkpoint directory: {}", dir.display()))
    }

    /// Load a stored run.
    pub async fn load(&self, run: &str) -> Result<(JsonStore, RunSnapshot)> {
        let store = self.store().await?;
        let snapshot = load_run(&store, run)
            .await
            .with_context(|| format!("Failed to load run '{run}'"))?;
        Ok((store, snapshot))
    }
}

/// Return the default checkpoint directory (~/.coex/runs/).
pub fn default_data_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    Ok(home.join(".coex").join("runs"))
}

/// Create the propagation model named in the configuration.
pub fn create_model(config: &RunConfig) -> Result<Box<dyn PropagationModel>> {
    let name = &config.propagation.model;
    ModelRegistry::with_builtins()
        .create(name, config.model_config())
        .with_context(|| format!("Failed to create propagation model '{name}'"))
}

/// The edge table of a run, which `build` writes.
pub fn require_edges<'a>(snapshot: &'a RunSnapshot, run: &str) -> Result<&'a EdgeWeightTable> {
    snapshot.edges.as_ref().ok_or_else(|| {
        anyhow::anyhow!("Run '{run}' has no edge-weight table; run `coex build {run}` first")
    })
}

/// Spinner for a long-running phase.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
