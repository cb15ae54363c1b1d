//! Shared error type across visitcount crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request or config.
    BadRequest,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Backing store failed.
    StoreUnavailable,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::StoreUnavailable => "STORE_UNAVAILABLE",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, VisitCountError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum VisitCountError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("store error: {0}")]
    Store(String),
    #[error("malformed record: {0}")]
    MalformedRecord(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl VisitCountError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            VisitCountError::BadRequest(_) => ClientCode::BadRequest,
            VisitCountError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            VisitCountError::Store(_) => ClientCode::StoreUnavailable,
            VisitCountError::MalformedRecord(_) | VisitCountError::Internal(_) => {
                ClientCode::Internal
            }
        }
    }
}
