//! Key-value store seam.
//!
//! The counter handler only ever talks to a [`KvStore`]; the backing store is
//! injected at startup. Implementations must make `atomic_add` a single
//! indivisible read-or-default-then-add so concurrent increments are never
//! lost.

pub mod memory;
pub mod sqlite;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use visitcount_core::error::Result;

use crate::config::{StoreBackend, StoreSection};

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

/// Attribute value held in a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Str(String),
    Num(u64),
}

impl AttrValue {
    pub fn as_num(&self) -> Option<u64> {
        match self {
            AttrValue::Num(n) => Some(*n),
            AttrValue::Str(_) => None,
        }
    }
}

/// One record: attribute name -> value. The key attribute is stored too.
pub type Record = HashMap<String, AttrValue>;

/// Name of the key attribute written into records created by `atomic_add`.
pub const KEY_ATTR: &str = "id";

#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch a record. `None` when the key has never been written.
    async fn get(&self, table: &str, key: &str) -> Result<Option<Record>>;

    /// Atomically set `field = (field or default_if_absent) + delta`, creating
    /// the record if needed. Returns the updated value.
    async fn atomic_add(
        &self,
        table: &str,
        key: &str,
        field: &str,
        delta: u64,
        default_if_absent: u64,
    ) -> Result<u64>;
}

/// Build the store selected by config.
pub fn open(cfg: &StoreSection) -> Result<Arc<dyn KvStore>> {
    match cfg.backend {
        StoreBackend::Memory => {
            tracing::warn!("memory store selected; counts are lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreBackend::Sqlite => Ok(Arc::new(SqliteStore::open(&cfg.path)?)),
    }
}
