//! # RestDoc Document Validator
//!
//! A RestDoc document (§3, [`document::Document`]) declares resources
//! reached through URI Templates (`uritemplate::compile_template`
//! provides the recognizer regexes, C5), each with HTTP methods
//! describing the headers, request bodies and response bodies/status
//! codes they accept. [`Validator`] ties resource resolution (C6,
//! [`resolver::ResourceResolver`]) and JSON-schema checking (C7,
//! [`schema::SchemaResolver`]) together into the two operations a
//! caller actually performs: validate a request, then validate the
//! response it got back (C8).

mod document;
mod resolver;
mod schema;
mod validator;

pub use document::{
    Document, DocumentHeaders, HeaderSpec, MediaTypeEntry, MethodSpec, ParamSpec, Resource,
    ResponseSpec, SchemaEntry, StatusEntry, Validation,
};
pub use resolver::{ResolvedRequest, ResourceResolver};
pub use schema::{FormatValidatorFn, JsonschemaBackend, SchemaBackend, SchemaResolver};
pub use validator::{Request, Response, Validator};
