//! HTTP front ends for the counter.
//!
//! - `ANY /`        : native HTTP; the request method becomes the descriptor's
//!                    transport method and the response descriptor is rendered
//!                    as a real response.
//! - `POST /invoke` : platform-style invocation; takes a request descriptor as
//!                    JSON and returns the response descriptor as JSON.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{self, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use visitcount_core::error::{Result, VisitCountError};
use visitcount_core::protocol::{HandlerResponse, RequestDescriptor};

use crate::app_state::AppState;

/// Error surfaced to HTTP callers. Anything but a bad request is a 500.
#[derive(Debug)]
pub struct HttpError(pub VisitCountError);

impl From<VisitCountError> for HttpError {
    fn from(e: VisitCountError) -> Self {
        Self(e)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            VisitCountError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({
            "error": self.0.client_code().as_str(),
            "message": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}

pub async fn counter(
    State(app): State<AppState>,
    method: Method,
) -> std::result::Result<Response, HttpError> {
    let req = RequestDescriptor::with_transport_method(method.as_str());
    let resp = app.handle(&req).await?;
    Ok(render(resp)?)
}

/// The body is decoded here rather than by `Json` so malformed descriptors
/// get the same error shape as every other failure. No content type required.
pub async fn invoke(
    State(app): State<AppState>,
    body: Bytes,
) -> std::result::Result<Json<HandlerResponse>, HttpError> {
    let req = decode_descriptor(&body)?;
    let resp = app.handle(&req).await?;
    Ok(Json(resp))
}

/// An empty body is an empty descriptor (method defaults to `GET`).
pub fn decode_descriptor(body: &[u8]) -> Result<RequestDescriptor> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RequestDescriptor::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "invoke body rejected");
        VisitCountError::BadRequest(format!("invalid request descriptor: {e}"))
    })
}

/// Render a response descriptor as an HTTP response.
pub fn render(resp: HandlerResponse) -> Result<Response> {
    let status = StatusCode::from_u16(resp.status_code).map_err(|e| {
        VisitCountError::Internal(format!("invalid status {}: {e}", resp.status_code))
    })?;

    let mut builder = http::Response::builder().status(status);
    for (name, value) in &resp.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
        .body(Body::from(resp.body))
        .map_err(|e| VisitCountError::Internal(format!("build response: {e}")))
}
