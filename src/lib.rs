//! URI Template (RFC 6570) expansion and regex synthesis, plus a
//! RestDoc document validator built on top of it.
//!
//! The two halves are deliberately decoupled: [`uritemplate`] knows
//! nothing about RestDoc's document model — it expands templates
//! against a generic [`context::Context`] and compiles templates plus
//! a plain `name -> patterns` map into recognizer regexes. [`restdoc`]
//! is the only module that understands resources, schemas, headers
//! and status codes, and it consumes `uritemplate` through that same
//! generic interface.

pub mod context;
pub mod error;
pub mod restdoc;
pub mod uritemplate;

pub use context::{Context, Value};
pub use error::{RestdocError, UriTemplateError};
pub use restdoc::{Document, Request, Response, Validator};
pub use uritemplate::{expand_regex, expand_template};
