use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use visitcount_core::error::{Result, VisitCountError};

use super::{AttrValue, KvStore, Record, KEY_ATTR};

/// In-process store. `atomic_add` holds the shard lock for the whole
/// read-modify-write, which is what makes it atomic.
#[derive(Default)]
pub struct InMemoryStore {
    records: DashMap<(String, String), Record>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Overwrite a record wholesale. Seeding only; the counter never calls this.
    pub fn put(&self, table: impl Into<String>, key: impl Into<String>, record: Record) {
        self.records.insert((table.into(), key.into()), record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl KvStore for InMemoryStore {
    async fn get(&self, table: &str, key: &str) -> Result<Option<Record>> {
        Ok(self
            .records
            .get(&(table.to_string(), key.to_string()))
            .map(|r| r.value().clone()))
    }

    async fn atomic_add(
        &self,
        table: &str,
        key: &str,
        field: &str,
        delta: u64,
        default_if_absent: u64,
    ) -> Result<u64> {
        match self.records.entry((table.to_string(), key.to_string())) {
            Entry::Occupied(mut e) => {
                let record = e.get_mut();
                let current = match record.get(field) {
                    None => default_if_absent,
                    Some(v) => v.as_num().ok_or_else(|| {
                        VisitCountError::MalformedRecord(format!(
                            "{table}/{key}: field `{field}` is not a number"
                        ))
                    })?,
                };
                let next = add(current, delta, table, key, field)?;
                record.insert(field.to_string(), AttrValue::Num(next));
                Ok(next)
            }
            Entry::Vacant(e) => {
                let next = add(default_if_absent, delta, table, key, field)?;
                let mut record = Record::new();
                record.insert(KEY_ATTR.to_string(), AttrValue::Str(key.to_string()));
                record.insert(field.to_string(), AttrValue::Num(next));
                e.insert(record);
                Ok(next)
            }
        }
    }
}

fn add(current: u64, delta: u64, table: &str, key: &str, field: &str) -> Result<u64> {
    current.checked_add(delta).ok_or_else(|| {
        VisitCountError::Store(format!("{table}/{key}: field `{field}` overflow"))
    })
}
