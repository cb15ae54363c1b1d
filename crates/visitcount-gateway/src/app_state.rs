//! Shared application state for the visitcount gateway.
//!
//! Built once at startup from config plus an injected store, then cloned into
//! every axum handler.

use std::sync::Arc;
use std::time::Instant;

use visitcount_core::error::{Result, VisitCountError};
use visitcount_core::protocol::{HandlerResponse, Method, RequestDescriptor};

use crate::config::GatewayConfig;
use crate::counter::CounterHandler;
use crate::obs::GatewayMetrics;
use crate::store::KvStore;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<GatewayMetrics>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    counter: CounterHandler,
}

impl AppState {
    /// Build application state. Rejects an invalid config instead of panicking.
    pub fn new(cfg: GatewayConfig, store: Arc<dyn KvStore>) -> Result<Self> {
        cfg.validate()?;
        let counter = CounterHandler::from_config(store, &cfg.counter);
        tracing::info!(table = %counter.table(), id = %counter.counter_id(), "counter configured");

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, counter }),
            metrics: Arc::new(GatewayMetrics::default()),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn counter(&self) -> &CounterHandler {
        &self.inner.counter
    }

    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    pub fn set_draining(&self) {
        self.metrics.set_draining();
    }

    /// Run the counter handler and record request metrics around it.
    pub async fn handle(&self, req: &RequestDescriptor) -> Result<HandlerResponse> {
        let method = req.method();
        let started = Instant::now();
        let out = self.inner.counter.handle(req).await;

        let method_label = metric_method(&method);
        self.metrics
            .handle_duration
            .observe(&[("method", method_label)], started.elapsed());

        match &out {
            Ok(resp) => {
                let status = resp.status_code.to_string();
                self.metrics
                    .requests
                    .inc(&[("method", method_label), ("status", status.as_str())]);
            }
            Err(e) => {
                self.metrics
                    .requests
                    .inc(&[("method", method_label), ("status", "error")]);
                if is_store_failure(e) {
                    let op = if method == Method::Post { "atomic_add" } else { "get" };
                    self.metrics.store_errors.inc(&[("op", op)]);
                }
                tracing::warn!(method = %method.as_str(), error = %e, "counter request failed");
            }
        }
        out
    }
}

/// Unknown methods share one label so callers cannot grow the metric set.
fn metric_method(method: &Method) -> &'static str {
    match method {
        Method::Options => "OPTIONS",
        Method::Get => "GET",
        Method::Post => "POST",
        Method::Other(_) => "OTHER",
    }
}

fn is_store_failure(e: &VisitCountError) -> bool {
    matches!(
        e,
        VisitCountError::Store(_) | VisitCountError::MalformedRecord(_)
    )
}
