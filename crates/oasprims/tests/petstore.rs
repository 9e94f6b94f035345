use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use oasprims::message::{Location, MessageError, RawRequest, RawResponse};
use oasprims::schema::{FormatRegistry, TypedValue, UnmarshalerConfig};
use oasprims::spec::Spec;
use oasprims::{OasError, OasValidator};
use serde_json::{json, Value};

fn petstore() -> Value {
    json!({
        "openapi": "3.0.2",
        "info": {"title": "Petstore", "version": "1.0.0"},
        "servers": [{"url": "http://localhost/api/v1"}],
        "paths": {
            "/pets": {
                "get": {
                    "parameters": [
                        {"name": "limit", "in": "query", "schema": {"type": "integer", "maximum": 100, "default": 20}},
                        {"name": "born-after", "in": "query", "schema": {"type": "string", "format": "date"}}
                    ],
                    "responses": {
                        "200": {
                            "headers": {"X-Total": {"required": true, "schema": {"type": "integer"}}},
                            "content": {
                                "application/json": {
                                    "schema": {"type": "array", "items": {"type": "object"}}
                                }
                            }
                        }
                    }
                },
                "post": {
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "allOf": [
                                        {
                                            "type": "object",
                                            "properties": {
                                                "name": {"type": "string"},
                                                "birthday": {"type": "string", "format": "date"}
                                            },
                                            "required": ["name"]
                                        },
                                        {
                                            "type": "object",
                                            "properties": {
                                                "tag": {"type": "string", "nullable": true},
                                                "birthday": {"type": "string"}
                                            }
                                        }
                                    ]
                                }
                            }
                        }
                    },
                    "responses": {
                        "201": {
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "id": {"type": "integer"},
                                            "name": {"type": "string"}
                                        },
                                        "required": ["id", "name"]
                                    }
                                }
                            }
                        },
                        "default": {"description": "unexpected error"}
                    }
                }
            },
            "/pets/{pet_id}": {
                "parameters": [
                    {"name": "pet_id", "in": "path", "required": true, "schema": {"type": "integer"}}
                ],
                "get": {
                    "parameters": [
                        {"name": "X-Verbose", "in": "header", "schema": {"type": "boolean"}}
                    ],
                    "responses": {
                        "200": {
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "id": {"type": "integer"},
                                            "name": {"type": "string"}
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}

fn validator() -> OasValidator {
    OasValidator::new(Spec::from_value(petstore()).expect("petstore should index"))
}

#[test]
fn post_pet_unmarshals_body_with_merged_all_of() {
    let request = RawRequest::new("POST", "/api/v1/pets").with_json(
        "application/json; charset=utf-8",
        json!({"name": "c", "birthday": "2019-05-04", "tag": null}),
    );

    let result = validator()
        .unmarshal_request(&request)
        .expect("request should be valid");
    let body = result.body.expect("body should be present");

    assert_eq!(body.get("name"), Some(&TypedValue::String("c".into())));
    assert_eq!(
        body.get("birthday").and_then(TypedValue::as_date),
        NaiveDate::from_ymd_opt(2019, 5, 4)
    );
    assert_eq!(body.get("tag"), Some(&TypedValue::Null));
    assert!(result.parameters.is_empty());
}

#[test]
fn post_pet_without_body_is_rejected_with_required_violation() {
    let request = RawRequest::new("post", "/api/v1/pets");

    let err = validator()
        .unmarshal_request(&request)
        .expect_err("missing body should fail");
    assert_eq!(err.status_code(), 400);

    let OasError::Message(MessageError::Unmarshal(err)) = err else {
        panic!("expected unmarshal error");
    };
    assert!(err.parameter_errors.is_empty());
    assert_eq!(err.request_body_errors.len(), 1);
    assert_eq!(err.request_body_errors[0].message, "Request body is required");
    assert_eq!(
        err.request_body_errors[0].schema_path.to_string(),
        "/requestBody/required"
    );
}

#[test]
fn list_pets_applies_defaults_and_formats() {
    let request = RawRequest::new("get", "/api/v1/pets").with_query("born-after", "2018-01-02");

    let result = validator()
        .unmarshal_request(&request)
        .expect("request should be valid");

    assert_eq!(
        result.parameters.get(Location::Query, "limit"),
        Some(&TypedValue::from(json!(20)))
    );
    assert_eq!(
        result
            .parameters
            .get(Location::Query, "born-after")
            .and_then(TypedValue::as_date),
        NaiveDate::from_ymd_opt(2018, 1, 2)
    );
    assert_eq!(result.body, None);
}

#[test]
fn list_pets_reports_every_parameter_problem() {
    let request = RawRequest::new("get", "/api/v1/pets")
        .with_query("limit", "1000")
        .with_query("born-after", "yesterday");

    let err = validator()
        .unmarshal_request(&request)
        .expect_err("parameters should fail");
    let OasError::Message(MessageError::Unmarshal(err)) = err else {
        panic!("expected unmarshal error");
    };

    let mut paths: Vec<String> = err
        .parameter_errors
        .iter()
        .map(|v| v.schema_path.to_string())
        .collect();
    paths.sort();
    assert_eq!(
        paths,
        vec![
            "/parameters/0/schema/maximum".to_string(),
            "/parameters/1/schema/format".to_string(),
        ]
    );
}

#[test]
fn pet_item_merges_path_level_parameters() {
    let request = RawRequest::new("get", "/api/v1/pets/{pet_id}")
        .with_path("pet_id", "2")
        .with_header("x-verbose", "yes");

    let result = validator()
        .unmarshal_request(&request)
        .expect("request should be valid");

    assert_eq!(result.parameters.get(Location::Path, "pet_id").and_then(TypedValue::as_i64), Some(2));
    assert_eq!(
        result.parameters.get(Location::Header, "X-Verbose").and_then(TypedValue::as_bool),
        Some(true)
    );
}

#[test]
fn pet_item_with_bad_id_points_at_path_parameter() {
    let request = RawRequest::new("get", "/api/v1/pets/{pet_id}").with_path("pet_id", "rex");

    let err = validator()
        .unmarshal_request(&request)
        .expect_err("non-integer id should fail");
    let OasError::Message(MessageError::Unmarshal(err)) = err else {
        panic!("expected unmarshal error");
    };

    assert_eq!(err.parameter_errors.len(), 1);
    let violation = &err.parameter_errors[0];
    assert_eq!(violation.validator, "type");
    assert_eq!(violation.message, "\"rex\" is not of type \"integer\"");
    assert_eq!(violation.path.to_string(), "/path/pet_id");
    assert_eq!(violation.schema_path.to_string(), "/parameters/0/schema/type");
}

#[test]
fn routing_failures_map_to_404_and_405() {
    let validator = validator();

    let unknown = RawRequest::new("get", "/api/v1/owners");
    let err = validator.unmarshal_request(&unknown).expect_err("unknown path");
    assert_eq!(err.status_code(), 404);

    let wrong_method = RawRequest::new("delete", "/api/v1/pets");
    let err = validator
        .unmarshal_request(&wrong_method)
        .expect_err("unsupported method");
    assert_eq!(err.status_code(), 405);

    let unrouted = RawRequest::unmatched("get");
    let err = validator.unmarshal_request(&unrouted).expect_err("no route");
    assert!(matches!(err, OasError::Unrouted));
}

#[test]
fn undocumented_media_type_is_a_client_error() {
    let request =
        RawRequest::new("post", "/api/v1/pets").with_json("application/xml", json!("<pet/>"));

    let err = validator()
        .unmarshal_request(&request)
        .expect_err("xml is not documented");
    assert!(matches!(
        err,
        OasError::Message(MessageError::UndocumentedMediaType { .. })
    ));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn created_response_is_validated() {
    let validator = validator();

    let ok = RawResponse::new(201).with_json("application/json", json!({"id": 3, "name": "c"}));
    validator
        .validate_response("/api/v1/pets", "post", &ok)
        .expect("response should be valid");

    let bad = RawResponse::new(201).with_json("application/json", json!({"id": "3"}));
    let err = validator
        .validate_response("/api/v1/pets", "post", &bad)
        .expect_err("response should fail");
    let OasError::Message(MessageError::Validation(err)) = err else {
        panic!("expected validation error");
    };
    assert_eq!(err.errors.len(), 2);
    assert!(err.errors.iter().all(|v| v
        .schema_path
        .to_string()
        .starts_with("/responses/201/content/application~1json/schema")));
}

#[test]
fn default_response_accepts_anything() {
    let response = RawResponse::new(503);
    validator()
        .validate_response("/api/v1/pets", "post", &response)
        .expect("default response has no constraints");
}

#[test]
fn list_response_requires_header() {
    let response = RawResponse::new(200).with_json("application/json", json!([]));
    let err = validator()
        .validate_response("/api/v1/pets", "get", &response)
        .expect_err("missing header");
    let OasError::Message(MessageError::Validation(err)) = err else {
        panic!("expected validation error");
    };
    assert_eq!(
        err.errors[0].schema_path.to_string(),
        "/responses/200/headers/0/required"
    );
    assert_eq!(err.errors[0].path.to_string(), "/header/X-Total");
}

#[test]
fn undocumented_status_is_a_server_error() {
    let response = RawResponse::new(404);
    let err = validator()
        .validate_response("/api/v1/pets/{pet_id}", "get", &response)
        .expect_err("404 is not documented");
    assert_eq!(err.status_code(), 500);
}

#[test]
fn strict_mode_rejects_undocumented_properties() {
    let validator = OasValidator::from_document(
        petstore(),
        FormatRegistry::default(),
        UnmarshalerConfig {
            strict_mode: true,
            ..UnmarshalerConfig::default()
        },
    )
    .expect("petstore should index");

    let response = RawResponse::new(200)
        .with_json("application/json", json!({"id": 1, "name": "a", "owner": "x"}));
    let err = validator
        .validate_response("/api/v1/pets/{pet_id}", "get", &response)
        .expect_err("owner is undocumented");
    let OasError::Message(MessageError::Validation(err)) = err else {
        panic!("expected validation error");
    };
    assert_eq!(err.errors[0].validator, "additionalProperties");
}

#[test]
fn validator_is_shared_between_threads() {
    let validator = Arc::new(validator());

    let handles: Vec<_> = (1..=4)
        .map(|id| {
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                let request = RawRequest::new("get", "/api/v1/pets/{pet_id}")
                    .with_path("pet_id", id.to_string());
                validator
                    .unmarshal_request(&request)
                    .expect("request should be valid")
                    .parameters
                    .get(Location::Path, "pet_id")
                    .and_then(TypedValue::as_i64)
            })
        })
        .collect();

    let ids: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread should not panic"))
        .collect();
    assert_eq!(ids, vec![Some(1), Some(2), Some(3), Some(4)]);
}
