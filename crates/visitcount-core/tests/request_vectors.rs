//! Request descriptor vector tests (method resolution).

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use visitcount_core::protocol::{Method, RequestDescriptor};

fn load(name: &str) -> RequestDescriptor {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

#[test]
fn nested_transport_method() {
    let req = load("function_url_post.json");
    assert_eq!(req.method(), Method::Post);
}

#[test]
fn top_level_method_when_context_has_no_http() {
    let req = load("rest_v1_get.json");
    assert_eq!(req.method_name(), "GET");
    assert_eq!(req.method(), Method::Get);
}

#[test]
fn nested_wins_over_top_level() {
    let req = load("mixed_precedence.json");
    assert_eq!(req.method(), Method::Other("DELETE".into()));
}

#[test]
fn absent_method_defaults_to_get() {
    let req = load("empty.json");
    assert_eq!(req.method(), Method::Get);
    assert_eq!(RequestDescriptor::default().method_name(), "GET");
}

#[test]
fn present_null_nested_method_still_wins() {
    let req = load("null_nested_method.json");
    assert_eq!(req.method_name(), "");
    assert_eq!(req.method(), Method::Other(String::new()));
}

#[test]
fn present_null_top_level_method_is_not_get() {
    let req: RequestDescriptor = serde_json::from_str(r#"{"httpMethod": null}"#).unwrap();
    assert_eq!(req.method(), Method::Other(String::new()));
}

#[test]
fn context_without_method_key_falls_through() {
    let req: RequestDescriptor = serde_json::from_str(
        r#"{"requestContext": {"http": {"path": "/"}}, "httpMethod": "OPTIONS"}"#,
    )
    .unwrap();
    assert_eq!(req.method(), Method::Options);
}

#[test]
fn null_context_objects_are_rejected() {
    for raw in [
        r#"{"requestContext": null, "httpMethod": "GET"}"#,
        r#"{"requestContext": {"http": null}, "httpMethod": "GET"}"#,
    ] {
        assert!(serde_json::from_str::<RequestDescriptor>(raw).is_err(), "{raw}");
    }
}

#[test]
fn non_string_method_is_rejected() {
    assert!(serde_json::from_str::<RequestDescriptor>(r#"{"httpMethod": 5}"#).is_err());
}

#[test]
fn method_match_is_case_sensitive() {
    let req = RequestDescriptor::with_http_method("post");
    assert_eq!(req.method(), Method::Other("post".into()));
    assert_eq!(req.method().as_str(), "post");
}

#[test]
fn transport_constructor_round_trips_through_json() {
    let req = RequestDescriptor::with_transport_method("PUT");
    let s = serde_json::to_string(&req).unwrap();
    assert_eq!(s, r#"{"requestContext":{"http":{"method":"PUT"}}}"#);
}
