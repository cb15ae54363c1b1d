//! Invocation contracts between a hosting platform and the counter handler.
//!
//! - `request`: typed request descriptor and method resolution.
//! - `response`: structured response (`statusCode`, `headers`, `body`) and the
//!   two JSON body shapes.

pub mod request;
pub mod response;

pub use request::{HttpContext, Method, RequestContext, RequestDescriptor};
pub use response::{CounterBody, ErrorBody, HandlerResponse};
