//! Transport layer (HTTP).
//!
//! Turns inbound HTTP into request descriptors and renders handler responses
//! back out.

pub mod http;
