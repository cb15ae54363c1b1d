//! Structured response handed back to the hosting platform.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VisitCountError};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

/// Fixed message for unsupported methods.
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";

/// `{statusCode, headers, body}`; `body` is JSON text or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
}

impl HandlerResponse {
    /// 204 with no headers and an empty body (preflight acknowledgement).
    pub fn no_content() -> Self {
        Self {
            status_code: 204,
            headers: BTreeMap::new(),
            body: String::new(),
        }
    }

    /// JSON response with `Content-Type: application/json`.
    pub fn json<T: Serialize>(status_code: u16, body: &T) -> Result<Self> {
        let body = serde_json::to_string(body)
            .map_err(|e| VisitCountError::Internal(format!("encode response body: {e}")))?;
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
        Ok(Self {
            status_code,
            headers,
            body,
        })
    }

    /// 405 with the fixed error body.
    pub fn method_not_allowed() -> Result<Self> {
        Self::json(
            405,
            &ErrorBody {
                error: METHOD_NOT_ALLOWED.to_string(),
            },
        )
    }
}

/// Success body: `{"id": ..., "count": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterBody {
    pub id: String,
    pub count: u64,
}

/// Error body: `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
