//! Manifest loading tests
//!
//! Operations declared in YAML, TOML and JSON files must produce identical descriptors,
//! merge their enclosing endpoint's prefix and metadata, and dispatch once registered.

mod common;

use common::temp_files;
use http::Method;
use restwire::handler::HandlerCall;
use restwire::operation::{load_manifest, DeclaredType, OperationDescriptor, ParameterKind};
use restwire::server::Request;
use serde_json::{json, Value};

const YAML: &str = r#"
endpoints:
  - path: /pets
    produces: [application/json]
    operations:
      - handler: list_pets
        methods: [GET]
        parameters:
          - { kind: query, name: limit, type: number }
      - handler: get_pet
        path: /:id
        methods: [get]
        parameters:
          - { kind: path, name: id, type: number }
          - { kind: header, name: X-Verbose, type: boolean }
      - handler: add_pet
        methods: [POST]
        consumes: [application/json]
        parameters:
          - { kind: body, type: Pet }
          - { kind: context, context: Request }
"#;

const TOML: &str = r#"
[[endpoints]]
path = "/pets"
produces = ["application/json"]

[[endpoints.operations]]
handler = "list_pets"
methods = ["GET"]
parameters = [{ kind = "query", name = "limit", type = "number" }]

[[endpoints.operations]]
handler = "get_pet"
path = "/:id"
methods = ["get"]
parameters = [
    { kind = "path", name = "id", type = "number" },
    { kind = "header", name = "X-Verbose", type = "boolean" },
]

[[endpoints.operations]]
handler = "add_pet"
methods = ["POST"]
consumes = ["application/json"]
parameters = [{ kind = "body", type = "Pet" }, { kind = "context", context = "Request" }]
"#;

const JSON: &str = r#"{
  "endpoints": [{
    "path": "/pets",
    "produces": ["application/json"],
    "operations": [
      { "handler": "list_pets", "methods": ["GET"],
        "parameters": [{ "kind": "query", "name": "limit", "type": "number" }] },
      { "handler": "get_pet", "path": "/:id", "methods": ["get"],
        "parameters": [
          { "kind": "path", "name": "id", "type": "number" },
          { "kind": "header", "name": "X-Verbose", "type": "boolean" }
        ] },
      { "handler": "add_pet", "methods": ["POST"], "consumes": ["application/json"],
        "parameters": [{ "kind": "body", "type": "Pet" }, { "kind": "context", "context": "Request" }] }
    ]
  }]
}"#;

fn assert_pet_store(ops: &[OperationDescriptor]) {
    assert_eq!(ops.len(), 3);

    assert_eq!(ops[0].handler.as_str(), "list_pets");
    assert_eq!(ops[0].resource_path, "/pets");
    assert_eq!(ops[0].http_methods, vec![Method::GET]);
    assert!(ops[0].produced_media_types.contains("application/json"));
    assert_eq!(ops[0].parameters[0].kind, ParameterKind::Query);
    assert_eq!(ops[0].parameters[0].declared_type, DeclaredType::Number);

    assert_eq!(ops[1].resource_path, "/pets/:id");
    assert_eq!(ops[1].parameters.len(), 2);
    assert_eq!(ops[1].parameters[1].key(), Some("X-Verbose"));
    assert_eq!(ops[1].parameters[1].declared_type, DeclaredType::Boolean);

    assert_eq!(ops[2].http_methods, vec![Method::POST]);
    assert!(ops[2].consumed_media_types.contains("application/json"));
    assert_eq!(ops[2].parameters[0].kind, ParameterKind::Body);
    assert_eq!(ops[2].parameters[0].declared_type, DeclaredType::Complex("Pet".into()));
    assert_eq!(ops[2].parameters[1].kind, ParameterKind::Context);

    for op in ops {
        assert!(op.validate().is_empty(), "{}", op.handler);
    }
}

#[test]
fn test_yaml_manifest() {
    let file = temp_files::manifest(YAML, "yaml");
    assert_pet_store(&load_manifest(file.path()).unwrap());
}

#[test]
fn test_toml_manifest() {
    let file = temp_files::manifest(TOML, "toml");
    assert_pet_store(&load_manifest(file.path()).unwrap());
}

#[test]
fn test_json_manifest() {
    let file = temp_files::manifest(JSON, "json");
    assert_pet_store(&load_manifest(file.path()).unwrap());
}

#[test]
fn test_missing_file_reports_path() {
    let err = load_manifest("/definitely/not/here.yaml").unwrap_err();
    assert!(format!("{err:#}").contains("/definitely/not/here.yaml"));
}

#[test]
fn test_unknown_field_is_rejected() {
    let file = temp_files::manifest("endpoints:\n  - pth: /typo\n", "yaml");
    assert!(load_manifest(file.path()).is_err());
}

#[test]
fn test_invalid_method_is_rejected() {
    let file = temp_files::manifest(
        "endpoints:\n  - operations:\n      - { handler: h, methods: [\"GE T\"] }\n",
        "yaml",
    );
    assert!(load_manifest(file.path()).is_err());
}

#[test]
fn test_manifest_operations_dispatch() {
    let file = temp_files::manifest(YAML, "yml");
    let mut d = common::dispatcher();
    d.register_endpoints(load_manifest(file.path()).unwrap())
        .unwrap();
    unsafe {
        d.register_handler("get_pet", |call: HandlerCall| -> anyhow::Result<Value> {
            Ok(json!({ "id": call.arg(0).as_i64(), "verbose": call.arg(1).as_bool() }))
        });
        d.register_handler("add_pet", |call: HandlerCall| -> anyhow::Result<Value> {
            let name = call
                .arg(0)
                .as_json()
                .and_then(|pet| pet.get("name"))
                .cloned()
                .unwrap_or(Value::Null);
            let has_request = call.arg(1).as_request().is_some();
            Ok(json!({ "name": name, "request": has_request }))
        });
    }

    let resp = d.handle_request(
        Request::builder(Method::GET, "/pets/5")
            .header("X-Verbose", "TRUE")
            .build(),
    );
    assert_eq!(resp.status(), 200);
    let body: Value = serde_json::from_str(resp.payload().unwrap()).unwrap();
    assert_eq!(body, json!({ "id": 5, "verbose": true }));

    let resp = d.handle_request(
        Request::builder(Method::POST, "/pets")
            .header("Content-Type", "application/json")
            .payload(r#"{"name":"Tom"}"#)
            .build(),
    );
    let body: Value = serde_json::from_str(resp.payload().unwrap()).unwrap();
    assert_eq!(body, json!({ "name": "Tom", "request": true }));

    // list_pets has no handler registered
    let resp = d.handle_request(Request::builder(Method::GET, "/pets").build());
    assert_eq!(resp.status(), 501);

    let resp = d.handle_request(Request::builder(Method::DELETE, "/pets/5").build());
    assert_eq!(resp.status(), 405);
}
