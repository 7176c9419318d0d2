//! Integration tests covering the concrete scenarios seeded in
//! `spec.md` §8: alternative path validations resolving to a single
//! resource, `allOf` schema composition, `patternProperties` with
//! `additionalProperties: false`, and document-level required response
//! headers.

use std::collections::HashMap;

use restdoc::restdoc::{Response, Validator};
use serde_json::json;

fn resource1_document() -> Validator {
    Validator::new(
        restdoc::Document::from_value(json!({
            "schemas": {
                "inline_object_1": {
                    "type": "inline",
                    "schema": {
                        "type": "object",
                        "properties": {
                            "prop1": { "type": "integer", "maximum": 51 },
                            "prop3": { "type": "integer", "maximum": 51 }
                        }
                    }
                },
                "inline_object_2": {
                    "type": "inline",
                    "schema": {
                        "type": "object",
                        "properties": {
                            "prop2": { "type": "string", "maxLength": 6 }
                        }
                    }
                },
                "inline_combined": {
                    "type": "inline",
                    "schema": {
                        "allOf": [
                            { "$ref": "inline_object_1" },
                            { "$ref": "inline_object_2" }
                        ]
                    }
                },
                "inline_empty": {
                    "type": "inline",
                    "schema": { "type": "string", "maxLength": 0 }
                },
                "uuid_keyed_map": {
                    "type": "inline",
                    "schema": {
                        "type": "object",
                        "patternProperties": {
                            "^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$": {
                                "type": "string"
                            }
                        },
                        "additionalProperties": false
                    }
                }
            },
            "headers": {
                "response": {
                    "Cache-Control": { "required": true },
                    "Content-Type": { "required": true },
                    "Vary": { "required": true }
                }
            },
            "resources": [
                {
                    "id": "resource1",
                    "path": "/resource1/{resource_id}{?param1,param2}",
                    "params": {
                        "resource_id": {
                            "validations": [
                                { "type": "match", "pattern": "^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$" },
                                { "type": "match", "pattern": "^(alt1|alt2)$" },
                                { "type": "match", "pattern": "^(alt3|alt4)$" }
                            ]
                        }
                    },
                    "methods": {
                        "GET": {
                            "statusCodes": {
                                "200": {
                                    "response": {
                                        "types": [{ "type": "application/json", "schema": "inline_combined" }],
                                        "headers": {
                                            "Cache-Control": { "required": true },
                                            "Content-Type": { "required": true },
                                            "Vary": { "required": true }
                                        }
                                    }
                                },
                                "304": {
                                    "response": {
                                        "types": [{ "type": "text/plain", "schema": "inline_empty" }],
                                        "headers": {
                                            "Cache-Control": { "required": true },
                                            "Content-Type": { "required": true },
                                            "Vary": { "required": true }
                                        }
                                    }
                                }
                            }
                        }
                    }
                },
                {
                    "id": "resource_map",
                    "path": "/resource_map",
                    "methods": {
                        "POST": {
                            "accepts": [{ "type": "application/json", "schema": "uuid_keyed_map" }],
                            "statusCodes": {
                                "200": { "response": { "types": [] } }
                            }
                        }
                    }
                }
            ]
        }))
        .unwrap(),
    )
    .unwrap()
}

fn headers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn alternative_path_validations_all_resolve_to_resource1() {
    let validator = resource1_document();
    for path in [
        "/resource1/4f71b22f-e7ea-4afe-b822-a83bce4c248f",
        "/resource1/alt1",
        "/resource1/alt4?param2=42&param1=test",
    ] {
        let request = restdoc::restdoc::Request {
            method: "GET",
            path,
            headers: HashMap::new(),
            body: None,
        };
        let (resource, _, _) = validator.validate_request(&request, false).unwrap();
        assert_eq!(resource.display_name(), "resource1");
    }
}

#[test]
fn paths_outside_every_alternative_do_not_resolve() {
    let validator = resource1_document();
    let request = restdoc::restdoc::Request {
        method: "GET",
        path: "/resource1/foo",
        headers: HashMap::new(),
        body: None,
    };
    assert!(validator.validate_request(&request, false).is_err());
}

#[test]
fn all_of_schema_requires_both_branches() {
    let validator = resource1_document();
    let response = Response {
        method: "GET",
        path: "/resource1/alt1",
        status: 200,
        headers: headers(&[
            ("Cache-Control", "no-cache"),
            ("Content-Type", "application/json"),
            ("Vary", "*"),
        ]),
        body: Some(json!({ "prop1": 0, "prop2": "test" })),
    };
    assert!(validator.validate_response(&response, false).is_ok());

    let over_max = Response {
        body: Some(json!({ "prop1": 0, "prop3": 52, "prop2": "test" })),
        ..response_template()
    };
    assert!(validator.validate_response(&over_max, false).is_err());

    let wrong_type = Response {
        body: Some(json!({ "prop1": 0, "prop3": "51", "prop2": "test" })),
        ..response_template()
    };
    assert!(validator.validate_response(&wrong_type, false).is_err());

    let too_long = Response {
        body: Some(json!({ "prop1": 0, "prop2": "1234567" })),
        ..response_template()
    };
    assert!(validator.validate_response(&too_long, false).is_err());
}

fn response_template() -> Response<'static> {
    Response {
        method: "GET",
        path: "/resource1/alt1",
        status: 200,
        headers: headers(&[
            ("Cache-Control", "no-cache"),
            ("Content-Type", "application/json"),
            ("Vary", "*"),
        ]),
        body: None,
    }
}

#[test]
fn missing_required_response_headers_is_rejected() {
    let validator = resource1_document();
    let response = Response {
        method: "GET",
        path: "/resource1/alt1",
        status: 200,
        headers: HashMap::new(),
        body: Some(json!({ "prop1": 0, "prop2": "test" })),
    };
    assert!(matches!(
        validator.validate_response(&response, false),
        Err(restdoc::RestdocError::MissingRequiredHeader { .. })
    ));
}

#[test]
fn empty_body_validates_against_inline_empty_on_304() {
    let validator = resource1_document();
    let ok = Response {
        method: "GET",
        path: "/resource1/alt1",
        status: 304,
        headers: headers(&[
            ("Cache-Control", "no-cache"),
            ("Content-Type", "text/plain"),
            ("Vary", "*"),
        ]),
        body: Some(json!("")),
    };
    assert!(validator.validate_response(&ok, false).is_ok());

    let non_empty = Response {
        body: Some(json!("not empty")),
        ..ok
    };
    assert!(validator.validate_response(&non_empty, false).is_err());
}

#[test]
fn pattern_properties_accepts_only_uuid_shaped_keys() {
    let validator = resource1_document();
    let mut headers = HashMap::new();
    headers.insert("X-Ignored".to_string(), "x".to_string());
    let good = restdoc::restdoc::Request {
        method: "POST",
        path: "/resource_map",
        headers: headers.clone(),
        body: Some(json!({ "4f71b22f-e7ea-4afe-b822-a83bce4c248f": "value" })),
    };
    assert!(validator.validate_request(&good, false).is_ok());

    let bad = restdoc::restdoc::Request {
        method: "POST",
        path: "/resource_map",
        headers,
        body: Some(json!({ "not-a-uuid": "value" })),
    };
    assert!(validator.validate_request(&bad, false).is_err());
}
