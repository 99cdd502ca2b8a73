//! Run configuration.
//!
//! Supports loading configuration from:
//! 1. Configuration files (YAML)
//! 2. Environment variables (with COEX_ prefix)
//! 3. .env files
//!
//! Environment variables take precedence over the file, which takes
//! precedence over the defaults.

use std::collections::BTreeSet;
use std::path::Path;

use coex_ir::Coordination;
use coex_prop::builder::{DEFAULT_I_MAX, DEFAULT_I_MIN, DEFAULT_MAX_RANGE_KM, DEFAULT_RX_MIN};
use coex_prop::{EdgeWeightConfig, KNOWN_MODELS, ModelConfig};
use serde::{Deserialize, Serialize};

use crate::engine::ColoringConfig;

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Propagation and edge-weight settings
    #[serde(default)]
    pub propagation: PropagationSection,

    /// Coloring settings
    #[serde(default)]
    pub coloring: ColoringSection,

    /// Channel plan
    #[serde(default)]
    pub channels: ChannelSection,
}

/// Propagation and edge-weight settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationSection {
    /// Propagation model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Point or area coordination
    #[serde(default)]
    pub coordination: Coordination,

    /// Carrier frequency in MHz
    #[serde(default = "default_frequency")]
    pub frequency_mhz: f64,

    /// Pairs at or beyond this distance never interfere
    #[serde(default = "default_max_range")]
    pub max_range_km: f64,

    /// Received power mapped to weight 0, in dBm
    #[serde(default = "default_i_min")]
    pub i_min: f64,

    /// Received power mapped to weight 1, in dBm
    #[serde(default = "default_i_max")]
    pub i_max: f64,

    /// Coverage cut-off, in dBm
    #[serde(default = "default_rx_min")]
    pub rx_min: f64,

    /// Coverage grid cell size in km
    #[serde(default = "default_grid_size")]
    pub grid_size_km: f64,
}

/// Threshold escalation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColoringSection {
    /// Starting threshold
    #[serde(default = "default_th_start")]
    pub th_start: f64,

    /// Escalation step
    #[serde(default = "default_th_step")]
    pub th_step: f64,

    /// Hand out single channels when a component has more colors than channels
    #[serde(default)]
    pub partial_assign: bool,
}

/// Channel plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSection {
    /// Channel numbers available for assignment
    #[serde(default = "default_channels")]
    pub available: Vec<u32>,

    /// Width of one channel in MHz
    #[serde(default = "default_bandwidth")]
    pub bandwidth_mhz: f64,
}

fn default_model() -> String {
    "freespace".to_string()
}

fn default_frequency() -> f64 {
    3550.0
}

fn default_max_range() -> f64 {
    DEFAULT_MAX_RANGE_KM
}

fn default_i_min() -> f64 {
    DEFAULT_I_MIN
}

fn default_i_max() -> f64 {
    DEFAULT_I_MAX
}

fn default_rx_min() -> f64 {
    DEFAULT_RX_MIN
}

fn default_grid_size() -> f64 {
    0.1
}

fn default_th_start() -> f64 {
    0.2
}

fn default_th_step() -> f64 {
    0.1
}

fn default_channels() -> Vec<u32> {
    (1..=8).collect()
}

fn default_bandwidth() -> f64 {
    10.0
}

impl Default for PropagationSection {
    fn default() -> Self {
        PropagationSection {
            model: default_model(),
            coordination: Coordination::default(),
            frequency_mhz: default_frequency(),
            max_range_km: default_max_range(),
            i_min: default_i_min(),
            i_max: default_i_max(),
            rx_min: default_rx_min(),
            grid_size_km: default_grid_size(),
        }
    }
}

impl Default for ColoringSection {
    fn default() -> Self {
        ColoringSection {
            th_start: default_th_start(),
            th_step: default_th_step(),
            partial_assign: false,
        }
    }
}

impl Default for ChannelSection {
    fn default() -> Self {
        ChannelSection {
            available: default_channels(),
            bandwidth_mhz: default_bandwidth(),
        }
    }
}

impl RunConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        let config: RunConfig = serde_yaml_ng::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration with the following precedence:
    /// 1. Load .env file if it exists
    /// 2. Load from file if provided
    /// 3. Apply environment variable overrides
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = if let Some(path) = config_file {
            Self::from_file(path)?
        } else {
            RunConfig::default()
        };

        let config = config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Merge environment variables into this configuration.
    ///
    /// Only variables that are set override the current values. A variable
    /// that is set but cannot be parsed is a parse error.
    pub fn merge_env(mut self) -> Result<Self, ConfigError> {
        // Propagation
        if let Ok(v) = std::env::var("COEX_MODEL") {
            self.propagation.model = v;
        }
        if let Ok(v) = std::env::var("COEX_COORDINATION") {
            self.propagation.coordination = v
                .parse()
                .map_err(|e: String| ConfigError::ParseError(format!("COEX_COORDINATION: {e}")))?;
        }
        if let Some(v) = env_number("COEX_FREQUENCY_MHZ")? {
            self.propagation.frequency_mhz = v;
        }
        if let Some(v) = env_number("COEX_MAX_RANGE_KM")? {
            self.propagation.max_range_km = v;
        }
        if let Some(v) = env_number("COEX_I_MIN")? {
            self.propagation.i_min = v;
        }
        if let Some(v) = env_number("COEX_I_MAX")? {
            self.propagation.i_max = v;
        }
        if let Some(v) = env_number("COEX_RX_MIN")? {
            self.propagation.rx_min = v;
        }
        if let Some(v) = env_number("COEX_GRID_SIZE_KM")? {
            self.propagation.grid_size_km = v;
        }

        // Coloring
        if let Some(v) = env_number("COEX_TH_START")? {
            self.coloring.th_start = v;
        }
        if let Some(v) = env_number("COEX_TH_STEP")? {
            self.coloring.th_step = v;
        }
        if let Ok(v) = std::env::var("COEX_PARTIAL_ASSIGN") {
            self.coloring.partial_assign = parse_bool(&v)
                .ok_or_else(|| ConfigError::ParseError(format!("COEX_PARTIAL_ASSIGN: '{v}'")))?;
        }

        // Channels
        if let Ok(v) = std::env::var("COEX_CHANNELS") {
            self.channels.available = parse_channel_list(&v)?;
        }
        if let Some(v) = env_number("COEX_CHANNEL_BANDWIDTH_MHZ")? {
            self.channels.bandwidth_mhz = v;
        }

        Ok(self)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.propagation;

        if !KNOWN_MODELS.contains(&p.model.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "Unknown propagation model: {} (known: {})",
                p.model,
                KNOWN_MODELS.join(", ")
            )));
        }

        if !(p.frequency_mhz.is_finite() && p.frequency_mhz > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "frequency_mhz must be positive, got {}",
                p.frequency_mhz
            )));
        }

        if !(p.max_range_km.is_finite() && p.max_range_km > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "max_range_km must be positive, got {}",
                p.max_range_km
            )));
        }

        if p.i_min >= p.i_max {
            return Err(ConfigError::ValidationError(format!(
                "i_min ({}) must be below i_max ({})",
                p.i_min, p.i_max
            )));
        }

        if !(p.grid_size_km.is_finite() && p.grid_size_km > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "grid_size_km must be positive, got {}",
                p.grid_size_km
            )));
        }

        self.coloring_config()
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        if self.channels.available.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one channel must be available".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        if let Some(dup) = self.channels.available.iter().find(|ch| !seen.insert(**ch)) {
            return Err(ConfigError::ValidationError(format!(
                "channel {dup} listed more than once"
            )));
        }

        if !(self.channels.bandwidth_mhz.is_finite() && self.channels.bandwidth_mhz > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "bandwidth_mhz must be positive, got {}",
                self.channels.bandwidth_mhz
            )));
        }

        Ok(())
    }

    /// Settings for the edge-weight builder.
    pub fn edge_weight_config(&self) -> EdgeWeightConfig {
        let p = &self.propagation;
        EdgeWeightConfig {
            coordination: p.coordination,
            max_range_km: p.max_range_km,
            i_min: p.i_min,
            i_max: p.i_max,
            rx_min: p.rx_min,
        }
    }

    /// Settings for the coloring engine.
    pub fn coloring_config(&self) -> ColoringConfig {
        ColoringConfig {
            th_start: self.coloring.th_start,
            th_step: self.coloring.th_step,
            max_colors: self.channels.available.len(),
        }
    }

    /// Settings for the propagation model factory.
    pub fn model_config(&self) -> ModelConfig {
        ModelConfig::new(&self.propagation.model).with_frequency(self.propagation.frequency_mhz)
    }

    /// Combined bandwidth of all channels in MHz.
    pub fn total_bandwidth_mhz(&self) -> f64 {
        self.channels.available.len() as f64 * self.channels.bandwidth_mhz
    }
}

fn env_number(key: &str) -> Result<Option<f64>, ConfigError> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::ParseError(format!("{key}: '{v}' is not a number"))),
        Err(_) => Ok(None),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a comma separated channel list such as `"1,2,3"`.
pub fn parse_channel_list(value: &str) -> Result<Vec<u32>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| ConfigError::ParseError(format!("invalid channel number '{s}'")))
        })
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
