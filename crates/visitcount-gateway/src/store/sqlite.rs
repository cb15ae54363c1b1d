//! SQLite-backed store (durable, embedded).
//!
//! Each record attribute is one row keyed by `(tbl, key, name)`. Numbers live
//! in `num`, strings in `str`. `atomic_add` runs inside an `IMMEDIATE`
//! transaction, so the read-or-default-then-add is one indivisible step even
//! when several processes share the file.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use visitcount_core::error::{Result, VisitCountError};

use super::{AttrValue, KvStore, Record, KEY_ATTR};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS attrs (
    tbl  TEXT NOT NULL,
    key  TEXT NOT NULL,
    name TEXT NOT NULL,
    num  INTEGER,
    str  TEXT,
    PRIMARY KEY (tbl, key, name)
);";

pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(store_err)?;
        let store = Self::bootstrap(conn)?;
        tracing::info!(path = %path.display(), "sqlite store opened");
        Ok(store)
    }

    /// Private in-memory database. Not durable; tests only.
    pub fn open_in_memory() -> Result<Self> {
        Self::bootstrap(Connection::open_in_memory().map_err(store_err)?)
    }

    fn bootstrap(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5)).map_err(store_err)?;
        conn.execute_batch(SCHEMA).map_err(store_err)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` on the connection off the async runtime.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            // Poisoned => an earlier call panicked; its transaction was rolled back.
            let mut guard = match conn.lock() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            f(&mut *guard)
        })
        .await
        .map_err(|e| VisitCountError::Internal(format!("sqlite worker failed: {e}")))?
    }
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get(&self, table: &str, key: &str) -> Result<Option<Record>> {
        let (table, key) = (table.to_string(), key.to_string());
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare_cached("SELECT name, num, str FROM attrs WHERE tbl = ?1 AND key = ?2")
                .map_err(store_err)?;
            let rows = stmt
                .query_map(params![table, key], |r| {
                    Ok((
                        r.get::<_, String>(0)?,
                        r.get::<_, Option<i64>>(1)?,
                        r.get::<_, Option<String>>(2)?,
                    ))
                })
                .map_err(store_err)?;

            let mut record = Record::new();
            for row in rows {
                let (name, num, text) = row.map_err(store_err)?;
                let value = match (num, text) {
                    (Some(n), _) => AttrValue::Num(to_u64(n, &table, &key, &name)?),
                    (None, Some(s)) => AttrValue::Str(s),
                    (None, None) => continue,
                };
                record.insert(name, value);
            }
            Ok((!record.is_empty()).then_some(record))
        })
        .await
    }

    async fn atomic_add(
        &self,
        table: &str,
        key: &str,
        field: &str,
        delta: u64,
        default_if_absent: u64,
    ) -> Result<u64> {
        let (table, key, field) = (table.to_string(), key.to_string(), field.to_string());
        self.with_conn(move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(store_err)?;

            let existing: Option<(Option<i64>, Option<String>)> = tx
                .query_row(
                    "SELECT num, str FROM attrs WHERE tbl = ?1 AND key = ?2 AND name = ?3",
                    params![table, key, field],
                    |r| Ok((r.get(0)?, r.get(1)?)),
                )
                .optional()
                .map_err(store_err)?;

            let current = match existing {
                None | Some((None, None)) => default_if_absent,
                Some((Some(n), _)) => to_u64(n, &table, &key, &field)?,
                Some((None, Some(_))) => {
                    return Err(VisitCountError::MalformedRecord(format!(
                        "{table}/{key}: field `{field}` is not a number"
                    )))
                }
            };
            let overflow =
                || VisitCountError::Store(format!("{table}/{key}: field `{field}` overflow"));
            let next = current.checked_add(delta).ok_or_else(overflow)?;
            let stored = i64::try_from(next).map_err(|_| overflow())?;

            // Key attribute only when the record is being created.
            tx.execute(
                "INSERT INTO attrs (tbl, key, name, str)
                 SELECT ?1, ?2, ?3, ?2
                 WHERE NOT EXISTS (SELECT 1 FROM attrs WHERE tbl = ?1 AND key = ?2)",
                params![table, key, KEY_ATTR],
            )
            .map_err(store_err)?;
            tx.execute(
                "INSERT INTO attrs (tbl, key, name, num) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (tbl, key, name) DO UPDATE SET num = excluded.num, str = NULL",
                params![table, key, field, stored],
            )
            .map_err(store_err)?;
            tx.commit().map_err(store_err)?;

            Ok(next)
        })
        .await
    }
}

fn store_err(e: rusqlite::Error) -> VisitCountError {
    VisitCountError::Store(format!("sqlite: {e}"))
}

fn to_u64(n: i64, table: &str, key: &str, field: &str) -> Result<u64> {
    u64::try_from(n).map_err(|_| {
        VisitCountError::MalformedRecord(format!("{table}/{key}: field `{field}` is negative"))
    })
}
