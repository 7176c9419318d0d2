//! # Schema Façade (C7)
//!
//! Wraps the [`jsonschema`] crate to validate request/response bodies
//! against a named entry in a document's `schemas` map, adding the one
//! thing the crate doesn't do out of the box: resolving `$ref` values
//! that are bare schema names (`"Widget"`) rather than the JSON
//! Pointer / URI references the JSON Schema spec expects. Resolution
//! walks the schema tree once up front and inlines every such `$ref`
//! into a fully self-contained document, the way the teacher crate's
//! own document registry resolves component references by name before
//! handing a schema to its validator (`core/src/oas/registry.rs`).

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::document::SchemaEntry;

/// A custom JSON-Schema `format` keyword callback: given the string
/// value under test, reports whether it satisfies the format.
pub type FormatValidatorFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// The external collaborator that actually runs a resolved schema
/// against an instance, standing in for `validictory`'s pluggable
/// `validator_cls` (§1, §6). [`JsonschemaBackend`] is the crate's own
/// implementation on top of [`jsonschema`]; anything else implementing
/// this trait can be swapped in via
/// [`crate::restdoc::Validator::with_schema_backend`].
pub trait SchemaBackend: Send + Sync {
    /// Validates `instance` against the already `$ref`-resolved
    /// `schema`, returning the collected error messages (empty iff
    /// valid).
    fn validate(&self, schema: &JsonValue, instance: &JsonValue) -> Vec<String>;
}

/// The default [`SchemaBackend`], built on the [`jsonschema`] crate.
///
/// Holds a table of custom `format` keyword callbacks (the
/// `format_validators` half of §6's configuration surface); an empty
/// table reproduces `jsonschema`'s own built-in format handling.
#[derive(Default)]
pub struct JsonschemaBackend {
    format_validators: Vec<(String, FormatValidatorFn)>,
}

impl fmt::Debug for JsonschemaBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonschemaBackend")
            .field(
                "format_validators",
                &self.format_validators.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl JsonschemaBackend {
    /// A backend with no custom format callbacks.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend that additionally validates the `format` keyword
    /// `name` via `f`, overriding `jsonschema`'s own handling (or
    /// adding support for a format it doesn't know) for that name.
    pub fn with_format_validators(format_validators: Vec<(String, FormatValidatorFn)>) -> Self {
        Self { format_validators }
    }
}

impl SchemaBackend for JsonschemaBackend {
    fn validate(&self, schema: &JsonValue, instance: &JsonValue) -> Vec<String> {
        let mut options = jsonschema::options();
        for (name, f) in &self.format_validators {
            let f = f.clone();
            options.with_format(name.clone(), move |s: &str| f(s));
        }

        let validator = match options.build(schema) {
            Ok(v) => v,
            Err(e) => return vec![format!("invalid schema: {e}")],
        };

        validator
            .iter_errors(instance)
            .map(|e| e.to_string())
            .collect()
    }
}

/// Validates instances against named entries of a document's
/// `schemas` map.
pub struct SchemaResolver<'doc> {
    schemas: &'doc IndexMap<String, SchemaEntry>,
    backend: &'doc dyn SchemaBackend,
}

impl<'doc> SchemaResolver<'doc> {
    /// Builds a resolver over `schemas`, validating through `backend`.
    /// Borrowed, not copied — the resolver is cheap to construct and is
    /// meant to be built fresh per validation call (see
    /// [`crate::restdoc::Validator`]).
    pub fn new(schemas: &'doc IndexMap<String, SchemaEntry>, backend: &'doc dyn SchemaBackend) -> Self {
        Self { schemas, backend }
    }

    /// Validates `instance` against the named schema, returning the
    /// collected validation error messages (empty iff valid).
    ///
    /// An unknown schema name, a non-inline schema entry, or an
    /// unresolvable `$ref` is itself reported as a single validation
    /// error rather than panicking — callers fold this into the same
    /// "did this candidate accept the body" decision as a normal
    /// schema mismatch (§4.6, §4.7).
    pub fn validate(&self, schema_name: &str, instance: &JsonValue) -> Vec<String> {
        let resolved = match self.resolve_named(schema_name) {
            Ok(v) => v,
            Err(e) => return vec![e],
        };

        self.backend.validate(&resolved, instance)
    }

    /// The full façade policy of §4.6: given a media-type entry's
    /// optional `schema` name, decides whether `instance` is accepted.
    ///
    /// An absent schema name, an unknown schema name, or a non-inline
    /// schema entry all fall under the same "unresolvable" policy
    /// (steps 1-2): rejected by default, accepted unconditionally when
    /// `lazy` is set. A resolvable schema (step 3) is always actually
    /// validated against — `lazy` never suppresses a real mismatch.
    pub fn check(
        &self,
        schema_name: Option<&str>,
        instance: &JsonValue,
        lazy: bool,
    ) -> Result<(), Vec<String>> {
        let name = match schema_name {
            Some(name) => name,
            None => {
                tracing::trace!(lazy, "media type entry declares no schema");
                return if lazy {
                    Ok(())
                } else {
                    Err(vec!["media type entry declares no schema".to_string()])
                };
            }
        };
        let entry = match self.schemas.get(name) {
            Some(entry) => entry,
            None => {
                tracing::trace!(schema = name, lazy, "unknown schema reference");
                return if lazy {
                    Ok(())
                } else {
                    Err(vec![format!("unknown schema '{name}'")])
                };
            }
        };
        if !entry.is_inline() {
            tracing::trace!(schema = name, lazy, "schema entry is not inline");
            return if lazy {
                Ok(())
            } else {
                Err(vec![format!(
                    "schema '{name}' is not inline and cannot be validated against"
                )])
            };
        }

        let errors = self.validate(name, instance);
        if errors.is_empty() {
            tracing::trace!(schema = name, "schema accepted body");
            Ok(())
        } else {
            tracing::debug!(schema = name, errors = errors.len(), "schema rejected body");
            Err(errors)
        }
    }

    fn resolve_named(&self, schema_name: &str) -> Result<JsonValue, String> {
        let entry = self
            .schemas
            .get(schema_name)
            .ok_or_else(|| format!("unknown schema '{schema_name}'"))?;
        if !entry.is_inline() {
            return Err(format!(
                "schema '{schema_name}' is not inline and cannot be validated against"
            ));
        }
        let mut seen = HashSet::new();
        seen.insert(schema_name.to_string());
        let mut resolved =
            self.resolve_refs(entry.schema.as_ref().expect("checked by is_inline"), &mut seen)?;
        disallow_unknown_properties(&mut resolved, false);
        Ok(resolved)
    }

    /// Recursively inlines every bare-name `$ref` found in `value`.
    /// `seen` guards against reference cycles.
    fn resolve_refs(&self, value: &JsonValue, seen: &mut HashSet<String>) -> Result<JsonValue, String> {
        match value {
            JsonValue::Object(map) => {
                if let Some(JsonValue::String(target)) = map.get("$ref") {
                    if is_bare_name(target) {
                        return self.inline_ref(target, seen);
                    }
                }
                let mut out = JsonMap::with_capacity(map.len());
                for (k, v) in map {
                    out.insert(k.clone(), self.resolve_refs(v, seen)?);
                }
                Ok(JsonValue::Object(out))
            }
            JsonValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.resolve_refs(item, seen)?);
                }
                Ok(JsonValue::Array(out))
            }
            other => Ok(other.clone()),
        }
    }

    fn inline_ref(&self, target: &str, seen: &mut HashSet<String>) -> Result<JsonValue, String> {
        if !seen.insert(target.to_string()) {
            return Err(format!("cyclic $ref: '{target}'"));
        }
        let entry = self
            .schemas
            .get(target)
            .ok_or_else(|| format!("unresolvable $ref: '{target}'"))?;
        if !entry.is_inline() {
            return Err(format!("$ref '{target}' does not resolve to an inline schema"));
        }
        let resolved = self.resolve_refs(entry.schema.as_ref().expect("checked by is_inline"), seen)?;
        seen.remove(target);
        Ok(resolved)
    }
}

/// A `$ref` value is a bare schema name (our non-standard extension)
/// when it has none of the trappings of a JSON Pointer or URI
/// reference: no fragment, no path separator, no scheme.
fn is_bare_name(r: &str) -> bool {
    !r.starts_with('#') && !r.contains('/') && !r.contains(':')
}

/// Enforces §4.6 step 3's `disallow_unknown_properties = true`: an
/// object schema that doesn't already declare `additionalProperties`
/// gets `additionalProperties: false` injected, so a body carrying a
/// property the schema never mentions is rejected rather than
/// silently passed through.
///
/// `in_allof_branch` exempts a schema's own top level from injection
/// when it's reached as one branch of an `allOf` — each branch
/// validates independently against the *whole* instance, so a branch
/// that only describes `prop1` must not reject the sibling branch's
/// `prop2`. Nested `properties`/`patternProperties` schemas are
/// standalone regardless of how their parent was reached, so the flag
/// resets to `false` when recursing into them.
fn disallow_unknown_properties(value: &mut JsonValue, in_allof_branch: bool) {
    let JsonValue::Object(map) = value else {
        return;
    };

    if let Some(JsonValue::Array(branches)) = map.get_mut("allOf") {
        for branch in branches {
            disallow_unknown_properties(branch, true);
        }
    }

    let looks_like_object_schema = matches!(map.get("type"), Some(JsonValue::String(t)) if t == "object")
        || map.contains_key("properties")
        || map.contains_key("patternProperties");

    if looks_like_object_schema && !in_allof_branch && !map.contains_key("additionalProperties") {
        map.insert("additionalProperties".to_string(), JsonValue::Bool(false));
    }

    for key in ["properties", "patternProperties"] {
        if let Some(JsonValue::Object(props)) = map.get_mut(key) {
            for nested in props.values_mut() {
                disallow_unknown_properties(nested, false);
            }
        }
    }
}
