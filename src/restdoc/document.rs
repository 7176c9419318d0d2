//! # RestDoc Document Model (§3, §6)
//!
//! The structured value a [`crate::restdoc::Validator`] is constructed
//! from. Order-preserving maps (`IndexMap`, matching the teacher
//! crate's own `indexmap`-with-`preserve_order` pairing for OpenAPI
//! documents) are used throughout so that `accepts` / `response.types`
//! first-success iteration order matches document authoring order —
//! required by §4.7 — and so round-tripping a document back to JSON/YAML
//! preserves key order for the humans reading it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::RestdocError;

/// A single `match` validation on a path/query parameter. Multiple
/// `match` validations on the same parameter are alternatives (§3).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Validation {
    /// Validation kind; only `"match"` carries meaning today.
    #[serde(rename = "type")]
    pub kind: String,
    /// The ECMA-compatible regex body, optionally anchored.
    pub pattern: Option<String>,
}

/// Describes one path/query/header parameter referenced by a
/// resource's `path` template.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ParamSpec {
    /// Human-readable description (not consulted by validation).
    pub description: Option<String>,
    /// Default value. Carried for document fidelity; never consulted
    /// by the resolver or validator (see SPEC_FULL.md §2).
    pub default: Option<JsonValue>,
    /// Alternative `match` validations, in declared order.
    #[serde(default)]
    pub validations: Vec<Validation>,
}

impl ParamSpec {
    /// The parameter's alternative `match.pattern` strings, in
    /// declared order, ignoring non-`match` validation entries.
    pub fn match_patterns(&self) -> Vec<String> {
        self.validations
            .iter()
            .filter(|v| v.kind == "match")
            .filter_map(|v| v.pattern.clone())
            .collect()
    }
}

/// Whether a header is required; only `required: true` is meaningful
/// — the spec never distinguishes "explicitly optional" from "absent".
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HeaderSpec {
    /// Human-readable description.
    pub description: Option<String>,
    /// Whether the header must be present.
    #[serde(default)]
    pub required: bool,
}

/// One entry in an `accepts` or `response.types` list: a media type
/// label plus the name of the schema (if any) that validates it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaTypeEntry {
    /// The declared media type, e.g. `"application/json"`. Not
    /// consulted by validation — entries are tried in declared order
    /// regardless of any request/response `Content-Type` header (§4.7).
    #[serde(rename = "type")]
    pub media_type: String,
    /// Name of the schema (a key into the document's `schemas` map)
    /// that validates bodies of this type, if any.
    pub schema: Option<String>,
}

/// `{ types: [...], headers: {...} }`, used for both a status code's
/// `response` and a method's own `response`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResponseSpec {
    /// Candidate schemas, tried in declared order, first success wins.
    #[serde(default)]
    pub types: Vec<MediaTypeEntry>,
    /// Headers required to be present on responses of this shape.
    #[serde(default)]
    pub headers: IndexMap<String, HeaderSpec>,
}

/// One status code's documentation: description plus its response shape.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StatusEntry {
    /// Human-readable description.
    pub description: Option<String>,
    /// The response shape for this status, if documented.
    pub response: Option<ResponseSpec>,
}

/// One HTTP method on a resource.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MethodSpec {
    /// Human-readable description.
    pub description: Option<String>,
    /// Status codes this method can respond with. Merged with the
    /// document-level `statusCodes` at validation time (method wins on
    /// key conflict) — always into a fresh map, never in place (§9
    /// Open Question 3).
    #[serde(rename = "statusCodes", default)]
    pub status_codes: IndexMap<String, StatusEntry>,
    /// Headers required on requests to this method.
    #[serde(default)]
    pub headers: IndexMap<String, HeaderSpec>,
    /// Candidate request-body schemas, tried in declared order.
    #[serde(default)]
    pub accepts: Vec<MediaTypeEntry>,
    /// A method-level response shape, checked in addition to (after)
    /// the status-specific one (§4.7 step 5).
    pub response: Option<ResponseSpec>,
}

/// One declared API endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Resource {
    /// Stable identifier. Falls back to `path` in error messages when
    /// absent (`_getResourceName` in the original).
    pub id: Option<String>,
    /// Human-readable description.
    pub description: Option<String>,
    /// The URI Template this resource is reached through.
    pub path: String,
    /// Parameters referenced by `path`'s varspecs, by name.
    #[serde(default)]
    pub params: IndexMap<String, ParamSpec>,
    /// Permitted HTTP methods, by verb (`"GET"`, `"POST"`, ...).
    pub methods: IndexMap<String, MethodSpec>,
}

impl Resource {
    /// The resource's id, or its path if it has none, or a
    /// placeholder — matching `_getResourceName` exactly.
    pub fn display_name(&self) -> &str {
        self.id.as_deref().unwrap_or_else(|| self.path.as_str())
    }
}

/// `{ request: {...}, response: {...} }` document-level required headers.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DocumentHeaders {
    /// Headers required on every request, regardless of resource/method.
    #[serde(default)]
    pub request: IndexMap<String, HeaderSpec>,
    /// Headers required on every response, regardless of resource/method/status.
    #[serde(default)]
    pub response: IndexMap<String, HeaderSpec>,
}

/// A named, addressable JSON-schema fragment, or an opaque reference
/// to one (§3 Schema; only `type == "inline"` with a present `schema`
/// is ever validatable — see C7).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchemaEntry {
    /// `"inline"` for an embedded fragment; any other value (`"url"`,
    /// etc.) marks the entry opaque.
    #[serde(rename = "type")]
    pub kind: String,
    /// The embedded JSON-schema fragment, present only for `"inline"`.
    pub schema: Option<JsonValue>,
}

impl SchemaEntry {
    /// Whether this entry can actually be validated against (§4.6
    /// steps 1–2): `type == "inline"` and `schema` present.
    pub fn is_inline(&self) -> bool {
        self.kind == "inline" && self.schema.is_some()
    }
}

/// The full RestDoc document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Document {
    /// Named schema fragments, addressable by `$ref` and by the
    /// `schema` field of a [`MediaTypeEntry`].
    #[serde(default)]
    pub schemas: IndexMap<String, SchemaEntry>,
    /// Document-level status code documentation, merged with each
    /// method's own `statusCodes` at validation time.
    #[serde(rename = "statusCodes", default)]
    pub status_codes: IndexMap<String, StatusEntry>,
    /// Document-level required headers.
    #[serde(default)]
    pub headers: DocumentHeaders,
    /// The declared resources.
    pub resources: Vec<Resource>,
}

impl Document {
    /// Parses a document from an already-decoded [`JsonValue`],
    /// running the same basic structural checks the original performs
    /// before any deeper construction work (§6, §7): `resources` must
    /// exist and be an array; each resource must have `path` and
    /// `methods`.
    pub fn from_value(value: JsonValue) -> Result<Self, RestdocError> {
        validate_structure(&value)?;
        serde_json::from_value(value)
            .map_err(|e| RestdocError::InvalidDocument(format!("malformed RestDoc document: {e}")))
    }

    /// Parses a document from a JSON string.
    pub fn from_json(s: &str) -> Result<Self, RestdocError> {
        let value: JsonValue = serde_json::from_str(s)
            .map_err(|e| RestdocError::InvalidDocument(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Parses a document from a YAML string.
    pub fn from_yaml(s: &str) -> Result<Self, RestdocError> {
        let value: JsonValue = serde_yaml::from_str(s)
            .map_err(|e| RestdocError::InvalidDocument(format!("invalid YAML: {e}")))?;
        Self::from_value(value)
    }
}

fn validate_structure(value: &JsonValue) -> Result<(), RestdocError> {
    let obj = value
        .as_object()
        .ok_or_else(|| RestdocError::InvalidDocument("Restdoc must be a dictionary.".to_string()))?;

    let resources = obj
        .get("resources")
        .ok_or_else(|| RestdocError::InvalidDocument("Restdoc missing 'resources'.".to_string()))?;
    let resources = resources
        .as_array()
        .ok_or_else(|| RestdocError::InvalidDocument("Resources must be a list.".to_string()))?;

    for resource in resources {
        let resource = resource.as_object().ok_or_else(|| {
            RestdocError::InvalidDocument("Resource must be a dictionary".to_string())
        })?;
        let name = resource
            .get("id")
            .and_then(JsonValue::as_str)
            .or_else(|| resource.get("path").and_then(JsonValue::as_str))
            .unwrap_or("(no id)");
        if !resource.contains_key("path") {
            return Err(RestdocError::InvalidDocument(format!(
                "Resource '{name}' has no path."
            )));
        }
        if !resource.contains_key("methods") {
            return Err(RestdocError::InvalidDocument(format!(
                "Resource '{name}' has no methods."
            )));
        }
    }

    Ok(())
}
