//! Content negotiation through the full dispatch path
//!
//! # Test Coverage
//!
//! - Quality-ordered Accept headers choose the response Content-Type
//! - Wildcard Accept entries resolve to the first produced type they match
//! - Missing or blank Accept headers fall back to the first produced type
//! - Operations that declare no produced types answer in `text/plain`
//! - JSON-family media types (`+json`, parameters) get JSON encoding

mod common;

use http::Method;
use restwire::dispatcher::{Dispatcher, Resolution};
use restwire::handler::HandlerCall;
use restwire::operation::OperationBuilder;
use restwire::server::Request;
use serde_json::{json, Value};

fn report_dispatcher(produces: &[&str]) -> Dispatcher {
    let mut builder = OperationBuilder::new("report").path("/report").method(Method::GET);
    for media_type in produces {
        builder = builder.produces(media_type);
    }
    let mut d = common::dispatcher();
    d.register(builder.build()).unwrap();
    unsafe {
        d.register_handler("report", |_call: HandlerCall| -> anyhow::Result<Value> {
            Ok(json!("quarterly"))
        });
    }
    d
}

fn negotiated(d: &Dispatcher, accept: Option<&str>) -> Option<String> {
    let mut builder = Request::builder(Method::GET, "/report");
    if let Some(accept) = accept {
        builder = builder.header("Accept", accept);
    }
    match d.resolve(&builder.build()) {
        Resolution::Matched(selection) => Some(selection.media_type),
        Resolution::Fallback(..) => None,
    }
}

#[test]
fn test_highest_quality_wins() {
    let d = report_dispatcher(&["text/html", "application/json"]);
    assert_eq!(
        negotiated(&d, Some("text/html;q=0.5, application/json;q=0.9")).as_deref(),
        Some("application/json")
    );
    assert_eq!(
        negotiated(&d, Some("text/html, application/json;q=0.9")).as_deref(),
        Some("text/html")
    );
}

#[test]
fn test_equal_quality_keeps_header_order() {
    let d = report_dispatcher(&["text/html", "application/json"]);
    assert_eq!(
        negotiated(&d, Some("application/json, text/html")).as_deref(),
        Some("application/json")
    );
}

#[test]
fn test_wildcard_resolves_to_first_matching_produced_type() {
    let d = report_dispatcher(&["text/plain", "application/xml", "application/json"]);
    assert_eq!(negotiated(&d, Some("application/*")).as_deref(), Some("application/xml"));
    assert_eq!(negotiated(&d, Some("*/*")).as_deref(), Some("text/plain"));
}

#[test]
fn test_missing_or_blank_accept_uses_first_produced() {
    let d = report_dispatcher(&["application/xml", "application/json"]);
    assert_eq!(negotiated(&d, None).as_deref(), Some("application/xml"));
    assert_eq!(negotiated(&d, Some("  ")).as_deref(), Some("application/xml"));
}

#[test]
fn test_no_produced_types_defaults_to_text_plain() {
    let d = report_dispatcher(&[]);
    assert_eq!(negotiated(&d, None).as_deref(), Some("text/plain"));

    let resp = d.handle_request(Request::builder(Method::GET, "/report").build());
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.header("content-type"), Some("text/plain"));
    assert_eq!(resp.payload(), Some("quarterly"));
}

#[test]
fn test_unmatched_accept_is_406() {
    let d = report_dispatcher(&["application/json"]);
    assert_eq!(negotiated(&d, Some("image/*")), None);
    let resp = d.handle_request(
        Request::builder(Method::GET, "/report")
            .header("Accept", "text/csv")
            .build(),
    );
    assert_eq!(resp.status(), 406);
}

#[test]
fn test_json_family_types_are_json_encoded() {
    let d = report_dispatcher(&["application/problem+json"]);
    let resp = d.handle_request(
        Request::builder(Method::GET, "/report")
            .header("Accept", "application/problem+json")
            .build(),
    );
    assert_eq!(resp.header("Content-Type"), Some("application/problem+json"));
    assert_eq!(resp.payload(), Some("\"quarterly\""));
}

#[test]
fn test_string_result_is_quoted_only_for_json() {
    let d = report_dispatcher(&["text/plain", "application/json"]);

    let plain = d.handle_request(
        Request::builder(Method::GET, "/report")
            .header("Accept", "text/plain")
            .build(),
    );
    assert_eq!(plain.payload(), Some("quarterly"));

    let as_json = d.handle_request(
        Request::builder(Method::GET, "/report")
            .header("Accept", "application/json")
            .build(),
    );
    assert_eq!(as_json.payload(), Some("\"quarterly\""));
}
