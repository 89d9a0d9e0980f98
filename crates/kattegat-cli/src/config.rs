//! Configuration file handling.
//! The file lives at ~/.kattegat/config.toml unless `--config` points elsewhere.

use anyhow::{anyhow, Context, Result};
use kattegat_scenarios::ModelParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct KattegatConfig {
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Starting values for the nine model inputs
    #[serde(default)]
    pub defaults: ModelParams,
    #[serde(default)]
    pub map: MapConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SolverConfig {
    /// OPF method: dc or economic
    #[serde(default = "default_method")]
    pub method: String,
    /// LP backend: clarabel or highs
    #[serde(default = "default_lp_solver")]
    pub lp_solver: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Enables load shedding when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_of_lost_load: Option<f64>,
    #[serde(default)]
    pub marginal_prices: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            lp_solver: default_lp_solver(),
            timeout_seconds: default_timeout(),
            value_of_lost_load: None,
            marginal_prices: false,
        }
    }
}

fn default_method() -> String {
    "dc".to_string()
}

fn default_lp_solver() -> String {
    "clarabel".to_string()
}

fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapConfig {
    #[serde(default = "default_map_width")]
    pub width: usize,
    #[serde(default = "default_map_height")]
    pub height: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: default_map_width(),
            height: default_map_height(),
        }
    }
}

fn default_map_width() -> usize {
    kattegat_viz::map::DEFAULT_WIDTH
}

fn default_map_height() -> usize {
    kattegat_viz::map::DEFAULT_HEIGHT
}

/// ~/.kattegat
pub fn kattegat_home() -> Result<PathBuf> {
    dirs::home_dir()
        .ok_or_else(|| anyhow!("Cannot determine home directory"))
        .map(|h| h.join(".kattegat"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(kattegat_home()?.join("config.toml"))
}

/// `explicit` if given, else the default location.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path(),
    }
}

/// Read the configuration. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<KattegatConfig> {
    if !path.exists() {
        return Ok(KattegatConfig::default());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config '{}'", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parsing config '{}'", path.display()))
}

pub fn save_config(path: &Path, config: &KattegatConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating config directory '{}'", dir.display()))?;
    }
    let contents = toml::to_string_pretty(config)?;
    fs::write(path, contents).with_context(|| format!("writing config '{}'", path.display()))?;
    Ok(())
}
