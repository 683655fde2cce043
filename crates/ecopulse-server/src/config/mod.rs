//! Service config loader (strict parsing).

pub mod schema;

use std::fs;

use ecopulse_core::error::{EcoPulseError, Result};

pub use schema::{EcoPulseConfig, FeedConfig, FeedKind, ServerSection, SimulatorSection, Trigger};

/// Env var naming the config file.
pub const CONFIG_ENV: &str = "ECOPULSE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "ecopulse.yaml";

pub fn load_from_file(path: &str) -> Result<EcoPulseConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| EcoPulseError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<EcoPulseConfig> {
    let cfg: EcoPulseConfig = serde_yaml::from_str(s)
        .map_err(|e| EcoPulseError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Path from `ECOPULSE_CONFIG`, else `ecopulse.yaml`.
pub fn config_path() -> String {
    std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}
