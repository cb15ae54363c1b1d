//! Visitor counter: method dispatch over a single store record.

pub mod handler;

pub use handler::{CounterHandler, COUNT_FIELD};
