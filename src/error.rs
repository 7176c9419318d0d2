//! # Error Handling
//!
//! Two fatal-error kinds, matching the two cores this crate
//! implements: [`UriTemplateError`] for template syntax and
//! regex-synthesis failures, [`RestdocError`] for resolution and
//! request/response validation failures. Both carry a human-readable
//! message and whatever structured context the message needs; neither
//! is meant to be matched on by variant beyond logging/reporting.

use thiserror::Error;

/// Errors raised while expanding a URI Template or synthesizing its
/// recognizer regexes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UriTemplateError {
    /// A `{` was never closed by a matching `}`.
    #[error("Mismatched {{}}: {remainder}")]
    MismatchedBraces {
        /// The unparsed remainder of the template starting at the
        /// unmatched `{`.
        remainder: String,
    },

    /// A parameter's `match` validation pattern failed to compile as a
    /// regular expression.
    #[error("Invalid validation pattern for parameter '{name}' ({cause}): {pattern}")]
    InvalidValidationPattern {
        /// Name of the parameter whose pattern is invalid.
        name: String,
        /// The offending pattern (after anchor stripping).
        pattern: String,
        /// The underlying regex compiler error message.
        cause: String,
    },

    /// `expand_regex` was asked to synthesize a regex for a varspec
    /// using the explode (`*`) modifier. `expand_template` supports
    /// explode; regex synthesis deliberately does not.
    #[error("Explode modifier not supported")]
    ExplodeNotSupported,
}

/// Errors raised while resolving a request path to a resource, or
/// while validating a request or response against a RestDoc document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RestdocError {
    /// The document failed basic structural validation at construction
    /// time (e.g. a resource missing `path` or `methods`).
    #[error("{0}")]
    InvalidDocument(String),

    /// A resource's `path` template or parameter validations could not
    /// be compiled into recognizer regexes.
    #[error("Invalid validation regex ({cause}): {pattern}")]
    InvalidResourceRegex {
        /// The synthesized regex source that failed to compile.
        pattern: String,
        /// The underlying regex compiler error message.
        cause: String,
    },

    /// More than one resource's compiled regex matched the path.
    #[error("Multiple resources match path '{path}': {}", .matches.join(", "))]
    AmbiguousPath {
        /// The path that was resolved.
        path: String,
        /// The distinct resource paths that matched.
        matches: Vec<String>,
    },

    /// No resource's compiled regex matched the path.
    #[error("No resource found matching path '{path}'")]
    NoResourceFound {
        /// The path that was resolved.
        path: String,
    },

    /// The resource does not declare the given HTTP method.
    #[error("Resource '{resource}' does not have method '{method}'")]
    MethodNotDeclared {
        /// The resource's id (or path, if it has no id).
        resource: String,
        /// The HTTP method that was requested.
        method: String,
    },

    /// A header marked `required: true` (globally, per-method, or
    /// per-status) was absent from the request or response.
    #[error("Method '{method_name}' requires header '{header}'")]
    MissingRequiredHeader {
        /// `"{method} {resource}"`, matching the original's message shape.
        method_name: String,
        /// The missing header's name.
        header: String,
    },

    /// None of the declared `accepts` schemas matched the request body.
    #[error("Method '{method_name}' does not accept given body. Errors: {errors}")]
    RequestBodyRejected {
        /// `"{method} {resource}"`.
        method_name: String,
        /// Collected per-schema validation error messages.
        errors: String,
    },

    /// The method has no `statusCodes` definition.
    #[error("Method '{method_name}' missing statusCodes definition")]
    MissingStatusCodes {
        /// `"{method} {resource}"`.
        method_name: String,
    },

    /// The response status code is not declared by the method (merged
    /// with document-level `statusCodes`).
    #[error("Method '{method_name}' responding with invalid status code '{status}'")]
    InvalidStatusCode {
        /// `"{method} {resource}"`.
        method_name: String,
        /// The rejected status code.
        status: u16,
    },

    /// None of the declared response schemas (status-level or
    /// method-level) matched the response body.
    #[error("Method '{method_name}' responded with invalid body. Errors: {errors}")]
    ResponseBodyRejected {
        /// `"{method} {resource}"`.
        method_name: String,
        /// Collected per-schema validation error messages.
        errors: String,
    },
}
