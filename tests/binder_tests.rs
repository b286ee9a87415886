//! Argument binding tests
//!
//! Binds one operation declaring every parameter kind against hand-built requests and
//! checks extraction, conversion and the configuration errors that stop a dispatch.

mod common;

use http::Method;
use restwire::binder::{build_arguments, Argument, BindError};
use restwire::operation::{
    ContextTypeRef, DeclaredType, OperationBuilder, OperationDescriptor, ParameterDescriptor,
    ParameterKind,
};
use restwire::router::{PathMatchOptions, PathMatcher};
use restwire::server::{ParamVec, Request};
use serde_json::json;
use std::sync::Arc;

fn every_kind() -> OperationDescriptor {
    OperationBuilder::new("everything")
        .path("/orgs/:org/users/:id")
        .method(Method::POST)
        .param(ParameterDescriptor::path("id", DeclaredType::Number))
        .param(ParameterDescriptor::query("q", DeclaredType::String))
        .param(ParameterDescriptor::header("X-Dry-Run", DeclaredType::Boolean))
        .param(ParameterDescriptor::cookie("session", DeclaredType::String))
        .param(ParameterDescriptor::matrix("color", DeclaredType::String))
        .param(ParameterDescriptor::form("count", DeclaredType::Number))
        .param(ParameterDescriptor::body(DeclaredType::String))
        .param(ParameterDescriptor::context(ContextTypeRef::request()))
        .build()
}

fn bind(descriptor: &OperationDescriptor, request: Request) -> Result<Vec<Argument>, BindError> {
    let matcher = PathMatcher::compile(&descriptor.resource_path, PathMatchOptions::default())
        .unwrap();
    let captures: ParamVec = matcher.captures(request.path()).unwrap_or_default();
    build_arguments(descriptor, &Arc::new(request), &captures)
}

#[test]
fn test_every_kind_is_bound_in_order() {
    common::setup();
    let request = Request::builder(Method::POST, "/orgs/acme/users;color=blue/42?q=hello%20world")
        .header("X-Dry-Run", "True")
        .header("Cookie", "session=abc123")
        .header("Content-Type", "application/x-www-form-urlencoded; charset=utf-8")
        .payload("count=7&other=x")
        .build();

    let args = bind(&every_kind(), request).unwrap();
    assert_eq!(args.len(), 8);
    assert_eq!(args[0], Argument::Number(42));
    assert_eq!(args[1], Argument::String("hello world".into()));
    assert_eq!(args[2], Argument::Boolean(true));
    assert_eq!(args[3], Argument::String("abc123".into()));
    assert_eq!(args[4], Argument::String("blue".into()));
    assert_eq!(args[5], Argument::Number(7));
    assert_eq!(args[6], Argument::String("count=7&other=x".into()));
    assert_eq!(args[7].as_request().map(Request::path), Some("/orgs/acme/users/42"));
}

#[test]
fn test_missing_sources_are_absent() {
    common::setup();
    let args = bind(&every_kind(), Request::builder(Method::POST, "/orgs/acme/users/1").build())
        .unwrap();
    assert_eq!(args[0], Argument::Number(1));
    for (index, arg) in args.iter().enumerate().skip(1).take(6) {
        assert!(arg.is_absent(), "argument {index} should be absent");
    }
    assert!(args[7].as_request().is_some());
}

#[test]
fn test_empty_values_are_absent() {
    common::setup();
    let descriptor = OperationBuilder::new("h")
        .path("/")
        .param(ParameterDescriptor::query("n", DeclaredType::Number))
        .param(ParameterDescriptor::header("X-Flag", DeclaredType::Boolean))
        .build();
    let args = bind(
        &descriptor,
        Request::builder(Method::GET, "/?n=").header("X-Flag", "").build(),
    )
    .unwrap();
    assert_eq!(args, vec![Argument::Absent, Argument::Absent]);
}

#[test]
fn test_boolean_only_true_is_true() {
    common::setup();
    let descriptor = OperationBuilder::new("h")
        .param(ParameterDescriptor::query("a", DeclaredType::Boolean))
        .param(ParameterDescriptor::query("b", DeclaredType::Boolean))
        .param(ParameterDescriptor::query("c", DeclaredType::Boolean))
        .build();
    let args = bind(&descriptor, Request::builder(Method::GET, "/?a=TRUE&b=yes&c=1").build())
        .unwrap();
    assert_eq!(
        args,
        vec![Argument::Boolean(true), Argument::Boolean(false), Argument::Boolean(false)]
    );
}

#[test]
fn test_invalid_number_is_client_error() {
    common::setup();
    let descriptor = OperationBuilder::new("h")
        .param(ParameterDescriptor::query("limit", DeclaredType::Number))
        .build();
    let err = bind(&descriptor, Request::builder(Method::GET, "/?limit=ten").build()).unwrap_err();
    assert!(err.is_client_error());
    assert!(matches!(
        err,
        BindError::InvalidNumber { kind: ParameterKind::Query, ref name, ref value }
            if name == "limit" && value == "ten"
    ));
}

#[test]
fn test_complex_body_parses_json() {
    common::setup();
    let descriptor = OperationBuilder::new("h")
        .param(ParameterDescriptor::body(DeclaredType::Complex("Order".into())))
        .build();
    let args = bind(
        &descriptor,
        Request::builder(Method::POST, "/").payload(r#"{"qty":3}"#).build(),
    )
    .unwrap();
    assert_eq!(args[0].as_json(), Some(&json!({ "qty": 3 })));

    let args = bind(&descriptor, Request::builder(Method::POST, "/").build()).unwrap();
    assert!(args[0].is_absent());
}

#[test]
fn test_complex_non_payload_is_rejected() {
    common::setup();
    let descriptor = OperationBuilder::new("h")
        .param(ParameterDescriptor::query("filter", DeclaredType::Complex("Filter".into())))
        .build();
    let err = bind(&descriptor, Request::builder(Method::GET, "/?filter=x").build()).unwrap_err();
    assert!(!err.is_client_error());
    assert!(err
        .to_string()
        .starts_with("complex non-payload parameters not implemented"));
}

#[test]
fn test_unknown_context_is_rejected() {
    common::setup();
    let descriptor = OperationBuilder::new("h")
        .param(ParameterDescriptor::context(ContextTypeRef::new("Principal")))
        .build();
    let err = bind(&descriptor, Request::builder(Method::GET, "/").build()).unwrap_err();
    assert!(matches!(err, BindError::UnknownContext { ref context_type } if context_type == "Principal"));
    assert!(err.to_string().contains("unknown context class"));
}

#[test]
fn test_repeated_capture_name_binds_last_segment() {
    common::setup();
    let descriptor = OperationBuilder::new("h")
        .path("/a/:id/b/:id")
        .param(ParameterDescriptor::path("id", DeclaredType::String))
        .build();
    let args = bind(&descriptor, Request::builder(Method::GET, "/a/first/b/second").build())
        .unwrap();
    assert_eq!(args[0], Argument::String("second".into()));
}

#[test]
fn test_no_parameters_binds_nothing() {
    common::setup();
    let descriptor = OperationBuilder::new("h").build();
    assert!(bind(&descriptor, Request::builder(Method::GET, "/").build())
        .unwrap()
        .is_empty());
}
