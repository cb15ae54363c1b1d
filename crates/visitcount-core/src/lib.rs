//! visitcount core: transport-agnostic request/response contracts and errors.
//!
//! This crate defines the invocation descriptor a hosting platform hands to the
//! counter handler, the structured response it expects back, and the error
//! surface shared with the gateway. It carries no transport or runtime
//! dependencies so the contracts can be reused by other front ends.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths surface as `VisitCountError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{Result, VisitCountError};
