//! Lightweight in-process metrics.
//!
//! Counters and a latency histogram stored as atomics behind `DashMap`,
//! rendered in Prometheus text format by the `/metrics` handler.

pub mod metrics;

pub use metrics::GatewayMetrics;
