//! # Request/Response Validator (C8)
//!
//! Orchestrates the resource resolver (C6) and schema façade (C7)
//! into the two operations external callers actually want:
//! "does this request match a declared resource and conform to it"
//! and "does this response conform to what that resource declares for
//! the status it returned". Neither mutates the document — per §9 Open
//! Question 3, `statusCodes` merging builds a fresh local map on every
//! call rather than caching a merged view on the document itself.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::error::RestdocError;

use super::document::{Document, MediaTypeEntry, MethodSpec, Resource, StatusEntry};
use super::resolver::ResourceResolver;
use super::schema::{FormatValidatorFn, JsonschemaBackend, SchemaBackend, SchemaResolver};

/// An inbound request to validate.
pub struct Request<'a> {
    /// The HTTP method, e.g. `"GET"`.
    pub method: &'a str,
    /// The request path, with no scheme/host/query-string stripped —
    /// whatever the resource's `path` template would expand to.
    pub path: &'a str,
    /// Request headers. Names are matched case-insensitively (§2).
    pub headers: HashMap<String, String>,
    /// The decoded request body, if any.
    pub body: Option<JsonValue>,
}

/// An outbound response to validate, against the resource and method a
/// matching request resolved to.
pub struct Response<'a> {
    /// The HTTP method the originating request used, e.g. `"GET"`.
    pub method: &'a str,
    /// The request path that produced this response.
    pub path: &'a str,
    /// The HTTP status code returned.
    pub status: u16,
    /// Response headers. Names are matched case-insensitively (§2).
    pub headers: HashMap<String, String>,
    /// The decoded response body, if any.
    pub body: Option<JsonValue>,
}

/// Validates requests and responses against a [`Document`].
///
/// The resource resolver (C6) — and with it every resource's compiled
/// regex set — is built exactly once, in [`Validator::new`], per §5's
/// "state is read-only post-construction" invariant. Nothing about a
/// prior call is reused across `validate_request`/`validate_response`
/// beyond that shared, immutable compiled state.
pub struct Validator {
    resolver: ResourceResolver,
    backend: Arc<dyn SchemaBackend>,
}

impl Validator {
    /// Builds a validator over an already-parsed document, validating
    /// schemas with the default [`JsonschemaBackend`]. Fails if any
    /// resource's `path` and parameter validations don't compile to a
    /// valid set of recognizer regexes (§4.5).
    pub fn new(document: Document) -> Result<Self, RestdocError> {
        Self::with_schema_backend(document, Arc::new(JsonschemaBackend::new()))
    }

    /// Builds a validator using a custom [`SchemaBackend`] — the
    /// pluggable `validator_class` half of §6's configuration surface.
    pub fn with_schema_backend(
        document: Document,
        backend: Arc<dyn SchemaBackend>,
    ) -> Result<Self, RestdocError> {
        Ok(Self {
            resolver: ResourceResolver::new(document)?,
            backend,
        })
    }

    /// Builds a validator with the default [`JsonschemaBackend`],
    /// extended with custom `format` keyword callbacks — the
    /// `format_validators` half of §6's configuration surface.
    pub fn with_format_validators(
        document: Document,
        format_validators: Vec<(String, FormatValidatorFn)>,
    ) -> Result<Self, RestdocError> {
        Self::with_schema_backend(
            document,
            Arc::new(JsonschemaBackend::with_format_validators(format_validators)),
        )
    }

    /// Parses `json` as a RestDoc document and builds a validator over it.
    pub fn from_json(json: &str) -> Result<Self, RestdocError> {
        Self::new(Document::from_json(json)?)
    }

    /// Parses `yaml` as a RestDoc document and builds a validator over it.
    pub fn from_yaml(yaml: &str) -> Result<Self, RestdocError> {
        Self::new(Document::from_yaml(yaml)?)
    }

    /// The document's declared resources, in document order.
    pub fn resources(&self) -> &[Resource] {
        &self.resolver.document().resources
    }

    /// The document's named schemas.
    pub fn schemas(&self) -> &IndexMap<String, super::document::SchemaEntry> {
        &self.resolver.document().schemas
    }

    /// Resolves `request.path` to a resource, checks the method is
    /// declared, checks required headers, and — if the method declares
    /// `accepts` candidates — validates the body against the first one
    /// that accepts it (§4.7 `validateRequest`).
    ///
    /// `lazy_schema_matching` loosens the façade's unknown-schema
    /// policy (§4.6 steps 1-2) for every candidate tried; it never
    /// suppresses an actual schema mismatch.
    ///
    /// Returns the resolved resource, its captured path/query
    /// parameters, and the `accepts` entry that matched — `None` when
    /// the method declares no `accepts` at all (§4.7 step 4: an
    /// absent `accepts` makes a null matching schema acceptable).
    #[allow(clippy::type_complexity)]
    pub fn validate_request<'doc>(
        &'doc self,
        request: &Request,
        lazy_schema_matching: bool,
    ) -> Result<
        (
            &'doc Resource,
            HashMap<String, Vec<String>>,
            Option<&'doc MediaTypeEntry>,
        ),
        RestdocError,
    > {
        let resolved = self.resolver.resolve(request.path)?;

        let method_spec = method_spec_or_missing(resolved.resource, request.method)?;
        let method_name = format!("{} {}", request.method, resolved.resource.display_name());

        for name in required_header_names(&self.resolver.document().headers.request, &method_spec.headers) {
            if !header_present(&request.headers, &name) {
                return Err(RestdocError::MissingRequiredHeader {
                    method_name: method_name.clone(),
                    header: name,
                });
            }
        }

        if method_spec.accepts.is_empty() {
            return Ok((resolved.resource, resolved.params, None));
        }

        let body = request.body.clone().unwrap_or(JsonValue::Null);
        let schema_resolver = SchemaResolver::new(&self.resolver.document().schemas, self.backend.as_ref());
        let mut errors = Vec::new();
        for candidate in &method_spec.accepts {
            match schema_resolver.check(candidate.schema.as_deref(), &body, lazy_schema_matching) {
                Ok(()) => {
                    tracing::debug!(
                        method_name,
                        schema = candidate.schema.as_deref().unwrap_or("(none)"),
                        "request body accepted"
                    );
                    return Ok((resolved.resource, resolved.params, Some(candidate)));
                }
                Err(candidate_errors) => {
                    let label = candidate.schema.as_deref().unwrap_or(&candidate.media_type);
                    errors.push(format!("{label}: {}", candidate_errors.join(", ")));
                }
            }
        }

        tracing::debug!(method_name, "no accepts candidate matched request body");
        Err(RestdocError::RequestBodyRejected {
            method_name,
            errors: errors.join(" | "),
        })
    }

    /// Resolves `response.path` to a resource, merges document- and
    /// method-level `statusCodes` into a fresh map, checks the status
    /// is declared, checks required headers, and validates the body
    /// against the status's (then the method's) declared response
    /// types — first success wins (§4.7 `validateResponse`).
    ///
    /// `lazy_schema_matching` has the same effect as in
    /// [`Validator::validate_request`].
    #[allow(clippy::type_complexity)]
    pub fn validate_response<'doc>(
        &'doc self,
        response: &Response,
        lazy_schema_matching: bool,
    ) -> Result<
        (
            &'doc Resource,
            HashMap<String, Vec<String>>,
            &'doc MediaTypeEntry,
        ),
        RestdocError,
    > {
        let resolved = self.resolver.resolve(response.path)?;

        let method_spec = method_spec_or_missing(resolved.resource, response.method)?;
        let method_name = format!("{} {}", response.method, resolved.resource.display_name());

        let merged = merge_status_codes(&self.resolver.document().status_codes, &method_spec.status_codes);
        if merged.is_empty() {
            return Err(RestdocError::MissingStatusCodes { method_name });
        }
        let status_key = response.status.to_string();
        let status_entry = merged
            .get(&status_key)
            .ok_or_else(|| RestdocError::InvalidStatusCode {
                method_name: method_name.clone(),
                status: response.status,
            })?;

        let mut required_response_headers: Vec<String> = self
            .resolver
            .document()
            .headers
            .response
            .iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name.clone())
            .collect();
        if let Some(status_response) = &status_entry.response {
            required_response_headers.extend(
                status_response
                    .headers
                    .iter()
                    .filter(|(_, spec)| spec.required)
                    .map(|(name, _)| name.clone()),
            );
        }
        if let Some(method_response) = &method_spec.response {
            required_response_headers.extend(
                method_response
                    .headers
                    .iter()
                    .filter(|(_, spec)| spec.required)
                    .map(|(name, _)| name.clone()),
            );
        }
        for name in required_response_headers {
            if !header_present(&response.headers, &name) {
                return Err(RestdocError::MissingRequiredHeader {
                    method_name,
                    header: name,
                });
            }
        }

        let mut candidates: Vec<&MediaTypeEntry> = Vec::new();
        if let Some(status_response) = &status_entry.response {
            candidates.extend(status_response.types.iter());
        }
        if let Some(method_response) = &method_spec.response {
            candidates.extend(method_response.types.iter());
        }

        if candidates.is_empty() {
            return Err(RestdocError::ResponseBodyRejected {
                method_name,
                errors: "no response types declared for this status".to_string(),
            });
        }

        let body = response.body.clone().unwrap_or(JsonValue::Null);
        let schema_resolver = SchemaResolver::new(&self.resolver.document().schemas, self.backend.as_ref());
        let mut errors = Vec::new();
        for candidate in candidates {
            match schema_resolver.check(candidate.schema.as_deref(), &body, lazy_schema_matching) {
                Ok(()) => {
                    tracing::debug!(
                        method_name,
                        status = response.status,
                        schema = candidate.schema.as_deref().unwrap_or("(none)"),
                        "response body accepted"
                    );
                    return Ok((resolved.resource, resolved.params, candidate));
                }
                Err(candidate_errors) => {
                    let label = candidate.schema.as_deref().unwrap_or(&candidate.media_type);
                    errors.push(format!("{label}: {}", candidate_errors.join(", ")));
                }
            }
        }

        tracing::debug!(method_name, status = response.status, "no response type matched body");
        Err(RestdocError::ResponseBodyRejected {
            method_name,
            errors: errors.join(" | "),
        })
    }
}

/// Union of globally required header names and method-scoped required
/// header names.
fn required_header_names(
    global: &IndexMap<String, super::document::HeaderSpec>,
    method: &IndexMap<String, super::document::HeaderSpec>,
) -> Vec<String> {
    global
        .iter()
        .chain(method.iter())
        .filter(|(_, spec)| spec.required)
        .map(|(name, _)| name.clone())
        .collect()
}

/// Case-insensitive header presence check (§2 original_source supplement).
fn header_present(headers: &HashMap<String, String>, name: &str) -> bool {
    headers.keys().any(|k| k.eq_ignore_ascii_case(name))
}

/// Merges a document's `statusCodes` with a method's own, into a fresh
/// map — the method's entries win on key conflict. Never mutates
/// either input (§9 Open Question 3).
fn merge_status_codes(
    document_level: &IndexMap<String, StatusEntry>,
    method_level: &IndexMap<String, StatusEntry>,
) -> IndexMap<String, StatusEntry> {
    let mut merged = document_level.clone();
    for (status, entry) in method_level {
        merged.insert(status.clone(), entry.clone());
    }
    merged
}

fn method_spec_or_missing<'a>(
    resource: &'a Resource,
    method: &str,
) -> Result<&'a MethodSpec, RestdocError> {
    resource
        .methods
        .get(method)
        .ok_or_else(|| RestdocError::MethodNotDeclared {
            resource: resource.display_name().to_string(),
            method: method.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Document {
        Document::from_value(json!({
            "schemas": {
                "Widget": {
                    "type": "inline",
                    "schema": {
                        "type": "object",
                        "required": ["name"],
                        "properties": { "name": { "type": "string" } }
                    }
                }
            },
            "statusCodes": {
                "500": { "description": "server error", "response": { "types": [] } }
            },
            "headers": {
                "request": { "X-Request-Id": { "required": true } }
            },
            "resources": [{
                "id": "widget",
                "path": "/widgets/{id}",
                "methods": {
                    "POST": {
                        "accepts": [{ "type": "application/json", "schema": "Widget" }],
                        "statusCodes": {
                            "201": {
                                "response": {
                                    "types": [{ "type": "application/json", "schema": "Widget" }]
                                }
                            },
                            "500": {
                                "response": {
                                    "types": [{ "type": "text/plain" }]
                                }
                            }
                        }
                    }
                }
            }]
        }))
        .unwrap()
    }

    #[test]
    fn accepts_valid_request_body() {
        let validator = Validator::new(document()).unwrap();
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), "abc".to_string());
        let request = Request {
            method: "POST",
            path: "/widgets/1",
            headers,
            body: Some(json!({ "name": "gear" })),
        };
        let (resource, params, matching) = validator.validate_request(&request, false).unwrap();
        assert_eq!(resource.display_name(), "widget");
        assert_eq!(params.get("id").unwrap(), &vec!["1".to_string()]);
        assert_eq!(matching.unwrap().schema.as_deref(), Some("Widget"));
    }

    #[test]
    fn rejects_missing_required_header() {
        let validator = Validator::new(document()).unwrap();
        let request = Request {
            method: "POST",
            path: "/widgets/1",
            headers: HashMap::new(),
            body: Some(json!({ "name": "gear" })),
        };
        assert!(matches!(
            validator.validate_request(&request, false),
            Err(RestdocError::MissingRequiredHeader { .. })
        ));
    }

    #[test]
    fn rejects_invalid_request_body() {
        let validator = Validator::new(document()).unwrap();
        let mut headers = HashMap::new();
        headers.insert("X-Request-Id".to_string(), "abc".to_string());
        let request = Request {
            method: "POST",
            path: "/widgets/1",
            headers,
            body: Some(json!({})),
        };
        assert!(matches!(
            validator.validate_request(&request, false),
            Err(RestdocError::RequestBodyRejected { .. })
        ));
    }

    #[test]
    fn validates_response_against_merged_status_codes() {
        let validator = Validator::new(document()).unwrap();
        let response = Response {
            method: "POST",
            path: "/widgets/1",
            status: 201,
            headers: HashMap::new(),
            body: Some(json!({ "name": "gear" })),
        };
        let (resource, params, matching) = validator.validate_response(&response, false).unwrap();
        assert_eq!(resource.display_name(), "widget");
        assert_eq!(params.get("id").unwrap(), &vec!["1".to_string()]);
        assert_eq!(matching.schema.as_deref(), Some("Widget"));
    }

    #[test]
    fn response_type_with_no_schema_name_is_rejected_unless_lazy() {
        let validator = Validator::new(document()).unwrap();
        let error_response = Response {
            method: "POST",
            path: "/widgets/1",
            status: 500,
            headers: HashMap::new(),
            body: None,
        };
        assert!(matches!(
            validator.validate_response(&error_response, false),
            Err(RestdocError::ResponseBodyRejected { .. })
        ));
        assert!(validator.validate_response(&error_response, true).is_ok());
    }

    #[test]
    fn rejects_undeclared_status_code() {
        let validator = Validator::new(document()).unwrap();
        let response = Response {
            method: "POST",
            path: "/widgets/1",
            status: 404,
            headers: HashMap::new(),
            body: None,
        };
        assert!(matches!(
            validator.validate_response(&response, false),
            Err(RestdocError::InvalidStatusCode { .. })
        ));
    }
}
