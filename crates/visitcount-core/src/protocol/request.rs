//! Request descriptor (JSON).
//!
//! Hosting platforms disagree on where the HTTP method lives. Function-URL and
//! HTTP API v2 events nest it under `requestContext.http.method`; REST API v1
//! events put it at the top level as `httpMethod`. Both are optional here and
//! resolved by [`RequestDescriptor::method`]. Unknown fields are ignored since
//! platform events carry far more than the handler reads.

use serde::{Deserialize, Deserializer, Serialize};

/// Method assumed when the descriptor carries none.
pub const DEFAULT_METHOD: &str = "GET";

/// Inbound invocation descriptor.
///
/// Method fields are `Option<Option<String>>`: the outer layer records whether
/// the key was present at all, the inner one whether it held a string. A
/// present `null` still takes precedence and resolves to an empty method.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    /// Transport-specific context (nested method lives here).
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_context: Option<RequestContext>,
    /// Top-level method field.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub http_method: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestContext {
    #[serde(
        default,
        deserialize_with = "non_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub http: Option<HttpContext>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpContext {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub method: Option<Option<String>>,
}

/// Key present (even as `null`) => `Some`. Absent keys never reach here.
fn present<'de, D>(d: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(d).map(Some)
}

/// Key present must hold an object; `null` is a malformed descriptor.
fn non_null<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(d).map(Some)
}

impl RequestDescriptor {
    /// Descriptor with only the nested transport method set.
    pub fn with_transport_method(method: impl Into<String>) -> Self {
        Self {
            request_context: Some(RequestContext {
                http: Some(HttpContext {
                    method: Some(Some(method.into())),
                }),
            }),
            http_method: None,
        }
    }

    /// Descriptor with only the top-level method set.
    pub fn with_http_method(method: impl Into<String>) -> Self {
        Self {
            request_context: None,
            http_method: Some(Some(method.into())),
        }
    }

    /// Resolve the method name: nested transport field, then top-level field,
    /// then `GET`. A field that is present but `null` resolves to `""`.
    pub fn method_name(&self) -> &str {
        let nested = self
            .request_context
            .as_ref()
            .and_then(|rc| rc.http.as_ref())
            .and_then(|http| http.method.as_ref());

        match nested.or(self.http_method.as_ref()) {
            Some(field) => field.as_deref().unwrap_or(""),
            None => DEFAULT_METHOD,
        }
    }

    /// Resolved method, classified.
    pub fn method(&self) -> Method {
        Method::parse(self.method_name())
    }
}

/// Methods the counter distinguishes. Matching is exact; `"get"` is `Other`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Options,
    Get,
    Post,
    Other(String),
}

impl Method {
    pub fn parse(s: &str) -> Self {
        match s {
            "OPTIONS" => Method::Options,
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Options => "OPTIONS",
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Other(s) => s.as_str(),
        }
    }
}
