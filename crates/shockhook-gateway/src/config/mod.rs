//! Relay config loader (strict YAML plus environment overrides).

pub mod schema;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use shockhook_core::error::{Result, ShockhookError};

pub use schema::{OpenShockSection, RelayConfig, ServerSection, StateSection};

/// Names the optional YAML config file.
pub const CONFIG_ENV: &str = "SHOCKHOOK_CONFIG";
pub const STATE_DIRECTORY_ENV: &str = "STATE_DIRECTORY";

/// Load from `$SHOCKHOOK_CONFIG` (if set), apply env overrides, validate.
pub fn load() -> Result<RelayConfig> {
    let path = std::env::var(CONFIG_ENV).ok().filter(|p| !p.is_empty());
    load_with(path.as_deref(), |k| std::env::var(k).ok())
}

pub fn load_with(
    path: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<RelayConfig> {
    let mut cfg = match path {
        Some(p) => parse_file(p)?,
        None => RelayConfig::default(),
    };
    apply_env(&mut cfg, env)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_file(path: &str) -> Result<RelayConfig> {
    let cfg = parse_file(path)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<RelayConfig> {
    let cfg = parse_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

fn parse_file(path: &str) -> Result<RelayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| ShockhookError::Internal(format!("read config {path} failed: {e}")))?;
    parse_str(&s)
}

fn parse_str(s: &str) -> Result<RelayConfig> {
    serde_yaml::from_str(s).map_err(|e| ShockhookError::BadRequest(format!("invalid yaml: {e}")))
}

fn apply_env(cfg: &mut RelayConfig, env: impl Fn(&str) -> Option<String>) -> Result<()> {
    let set = |k: &str| env(k).filter(|v| !v.is_empty());

    if let Some(v) = set("OPENSHOCK_API_TOKEN") {
        cfg.openshock.api_token = v;
    }
    if let Some(v) = set("OPENSHOCK_API_SERVER") {
        cfg.openshock.api_server = v;
    }
    if let Some(v) = set("OPENSHOCK_SHOCKER_ID") {
        cfg.openshock.shocker_id = v.parse().map_err(|e| {
            ShockhookError::BadRequest(format!("OPENSHOCK_SHOCKER_ID is not a UUID: {e}"))
        })?;
    }
    if let Some(v) = set("SHOCKHOOK_ADDR") {
        cfg.server.listen = v;
    }
    if let Some(v) = set("SHOCKHOOK_SECRET") {
        cfg.server.webhook_secret = v;
    }
    if let Some(v) = set(STATE_DIRECTORY_ENV) {
        cfg.state.dir = Some(PathBuf::from(v));
    }
    Ok(())
}

impl RelayConfig {
    /// Configured state directory, else `<user config dir>/shockhook`.
    pub fn state_dir(&self) -> PathBuf {
        match &self.state.dir {
            Some(dir) => dir.clone(),
            None => dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("shockhook"),
        }
    }

    pub fn forward_timeout(&self) -> Duration {
        Duration::from_millis(self.server.forward_timeout_ms)
    }
}
