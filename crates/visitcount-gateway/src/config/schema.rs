use std::net::SocketAddr;

use serde::Deserialize;
use visitcount_core::error::{Result, VisitCountError};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub counter: CounterSection,

    #[serde(default)]
    pub store: StoreSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            counter: CounterSection::default(),
            store: StoreSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(VisitCountError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.counter.validate()?;
        self.store.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            VisitCountError::BadRequest(format!(
                "gateway.listen must be a valid socket address ({}): {e}",
                self.listen
            ))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

/// Where the single counter record lives.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CounterSection {
    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_counter_id")]
    pub id: String,
}

impl Default for CounterSection {
    fn default() -> Self {
        Self {
            table: default_table(),
            id: default_counter_id(),
        }
    }
}

impl CounterSection {
    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(VisitCountError::BadRequest(
                "counter.table must not be empty".into(),
            ));
        }
        if self.id.trim().is_empty() {
            return Err(VisitCountError::BadRequest(
                "counter.id must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_table() -> String {
    "cv-visitor-counter".into()
}
fn default_counter_id() -> String {
    "cv.brtz1.com".into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process memory; lost on restart.
    Memory,
    /// SQLite file at `store.path`.
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_store_path(),
        }
    }
}

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if self.backend == StoreBackend::Sqlite && self.path.trim().is_empty() {
            return Err(VisitCountError::BadRequest(
                "store.path must not be empty for the sqlite backend".into(),
            ));
        }
        Ok(())
    }
}

fn default_backend() -> StoreBackend {
    StoreBackend::Sqlite
}
fn default_store_path() -> String {
    "visitcount.db".into()
}
