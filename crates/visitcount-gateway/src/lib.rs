//! visitcount gateway library entry.
//!
//! Wires config, the injected key-value store, the counter handler, and the
//! HTTP surface into one service. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod counter;
pub mod obs;
pub mod ops;
pub mod router;
pub mod store;
pub mod transport;
