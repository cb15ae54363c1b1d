use std::sync::Arc;

use visitcount_core::error::{Result, VisitCountError};
use visitcount_core::protocol::{CounterBody, HandlerResponse, Method, RequestDescriptor};

use crate::config::CounterSection;
use crate::store::KvStore;

/// Record attribute holding the count.
pub const COUNT_FIELD: &str = "count";

/// Maps one request descriptor to one response. Holds no counter state of its
/// own; every read and increment goes to the injected store.
pub struct CounterHandler {
    store: Arc<dyn KvStore>,
    table: String,
    counter_id: String,
}

impl CounterHandler {
    pub fn new(
        store: Arc<dyn KvStore>,
        table: impl Into<String>,
        counter_id: impl Into<String>,
    ) -> Self {
        Self {
            store,
            table: table.into(),
            counter_id: counter_id.into(),
        }
    }

    pub fn from_config(store: Arc<dyn KvStore>, cfg: &CounterSection) -> Self {
        Self::new(store, cfg.table.clone(), cfg.id.clone())
    }

    pub fn counter_id(&self) -> &str {
        &self.counter_id
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Handle one invocation. Store errors are returned as-is.
    pub async fn handle(&self, req: &RequestDescriptor) -> Result<HandlerResponse> {
        let method = req.method();
        tracing::debug!(method = %method.as_str(), "counter request");

        match method {
            Method::Options => Ok(HandlerResponse::no_content()),
            Method::Get => {
                let count = self.read_count().await?;
                self.counter_response(count)
            }
            Method::Post => {
                let count = self.increment().await?;
                tracing::info!(id = %self.counter_id, count, "counter incremented");
                self.counter_response(count)
            }
            Method::Other(m) => {
                tracing::debug!(method = %m, "method not allowed");
                HandlerResponse::method_not_allowed()
            }
        }
    }

    /// Current count; 0 when the record or its field is absent. Never writes.
    pub async fn read_count(&self) -> Result<u64> {
        let Some(record) = self.store.get(&self.table, &self.counter_id).await? else {
            return Ok(0);
        };
        match record.get(COUNT_FIELD) {
            None => Ok(0),
            Some(v) => v.as_num().ok_or_else(|| {
                VisitCountError::MalformedRecord(format!(
                    "{}/{}: field `{COUNT_FIELD}` is not a number",
                    self.table, self.counter_id
                ))
            }),
        }
    }

    /// One atomic add of 1 (starting from 0). Returns the new count.
    pub async fn increment(&self) -> Result<u64> {
        self.store
            .atomic_add(&self.table, &self.counter_id, COUNT_FIELD, 1, 0)
            .await
    }

    fn counter_response(&self, count: u64) -> Result<HandlerResponse> {
        HandlerResponse::json(
            200,
            &CounterBody {
                id: self.counter_id.clone(),
                count,
            },
        )
    }
}
