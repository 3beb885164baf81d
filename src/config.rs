use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level gcmqm configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GcmqmConfig {
    /// Inclusive longitude range `[min, max]`.
    pub lon_bnds: [f64; 2],

    /// Inclusive latitude range `[min, max]`.
    pub lat_bnds: [f64; 2],

    /// Name of the experiment fitted against observations.
    #[serde(default = "default_historical")]
    pub historical: String,

    /// Observation window `[start, end]` as `YYYY-MM-DD`.
    #[serde(default = "default_obs_time_bnds")]
    pub obs_time_bnds: [String; 2],

    /// Fail instead of warning when the historical run pairs with nothing.
    #[serde(default)]
    pub strict_alignment: bool,

    /// GCMs, as names or `{ name, collapse_duplicates }` tables.
    pub gcms: Vec<GcmToml>,

    /// Variables to correct.
    pub variables: Vec<VariableToml>,

    /// Experiments, processed in order.
    pub experiments: Vec<ExperimentToml>,

    /// Input and output directories.
    #[serde(default)]
    pub paths: PathsToml,
}

fn default_historical() -> String {
    gcmqm_pipeline::DEFAULT_HISTORICAL.to_string()
}
fn default_obs_time_bnds() -> [String; 2] {
    ["1971-01-01".to_string(), "2000-12-31".to_string()]
}

/// A GCM entry: either a bare name or a table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GcmToml {
    Name(String),
    Detailed(GcmDetailToml),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GcmDetailToml {
    pub name: String,
    /// Defaults to on for `HadGEM2`, off otherwise.
    #[serde(default)]
    pub collapse_duplicates: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableToml {
    pub name: String,
    #[serde(default)]
    pub add: Option<f64>,
    #[serde(default)]
    pub mult: Option<f64>,
    #[serde(default)]
    pub obs_name: Option<String>,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub wet_day: Option<f64>,
    #[serde(default = "default_qstep")]
    pub qstep: f64,
    #[serde(default = "default_min_pairs")]
    pub min_pairs: usize,
    #[serde(default = "default_extrapolation")]
    pub extrapolation: String,
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_method() -> String {
    "empirical".to_string()
}
fn default_qstep() -> f64 {
    0.01
}
fn default_min_pairs() -> usize {
    10
}
fn default_extrapolation() -> String {
    "constant".to_string()
}
fn default_fallback() -> String {
    "identity".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperimentToml {
    pub name: String,
    /// `[start, end]` as `YYYY-MM-DD`.
    pub time_bnds: [String; 2],
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsToml {
    #[serde(default = "default_obs_input")]
    pub obs_input: PathBuf,
    #[serde(default = "default_model_input")]
    pub model_input: PathBuf,
    #[serde(default = "default_obs_output")]
    pub obs_output: PathBuf,
    #[serde(default = "default_model_output")]
    pub model_output: PathBuf,
    #[serde(default = "default_bc_output")]
    pub bc_output: PathBuf,
}

impl Default for PathsToml {
    fn default() -> Self {
        Self {
            obs_input: default_obs_input(),
            model_input: default_model_input(),
            obs_output: default_obs_output(),
            model_output: default_model_output(),
            bc_output: default_bc_output(),
        }
    }
}

fn default_obs_input() -> PathBuf {
    PathBuf::from("input/aphro")
}
fn default_model_input() -> PathBuf {
    PathBuf::from("input/mod")
}
fn default_obs_output() -> PathBuf {
    PathBuf::from("output/aphro")
}
fn default_model_output() -> PathBuf {
    PathBuf::from("output/mod")
}
fn default_bc_output() -> PathBuf {
    PathBuf::from("output/bc")
}

/// Reads and parses a TOML configuration file.
pub fn load(path: &Path) -> Result<GcmqmConfig> {
    let toml_str = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    toml::from_str(&toml_str).context("failed to parse TOML config")
}
