//! Gateway config loader (strict parsing + environment overrides).
//!
//! Resolution order: built-in defaults, then the YAML file (if any), then the
//! `TABLE_NAME` / `COUNTER_ID` environment variables.

pub mod schema;

use std::fs;
use std::io::ErrorKind;

use visitcount_core::error::{Result, VisitCountError};

pub use schema::{CounterSection, GatewayConfig, GatewaySection, StoreBackend, StoreSection};

/// Env var naming the YAML config file.
pub const CONFIG_PATH_ENV: &str = "VISITCOUNT_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "visitcount.yaml";

pub const TABLE_NAME_ENV: &str = "TABLE_NAME";
pub const COUNTER_ID_ENV: &str = "COUNTER_ID";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| VisitCountError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| VisitCountError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load config for the running process.
///
/// An explicitly named file must exist; the default file is optional.
pub fn load() -> Result<GatewayConfig> {
    let cfg = match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => load_from_file(&path)?,
        Err(_) => match fs::read_to_string(DEFAULT_CONFIG_PATH) {
            Ok(s) => load_from_str(&s)?,
            Err(e) if e.kind() == ErrorKind::NotFound => GatewayConfig::default(),
            Err(e) => {
                return Err(VisitCountError::Internal(format!(
                    "read config failed: {e}"
                )))
            }
        },
    };
    with_overrides(cfg, |k| std::env::var(k).ok())
}

/// Apply `TABLE_NAME` / `COUNTER_ID` from `lookup`, then re-validate.
pub fn with_overrides<F>(mut cfg: GatewayConfig, lookup: F) -> Result<GatewayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(table) = lookup(TABLE_NAME_ENV) {
        cfg.counter.table = table;
    }
    if let Some(id) = lookup(COUNTER_ID_ENV) {
        cfg.counter.id = id;
    }
    cfg.validate()?;
    Ok(cfg)
}
