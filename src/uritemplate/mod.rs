//! # URI Template engine (RFC 6570)
//!
//! A complete implementation of the URI Template grammar: [`expand`]
//! renders a template against a [`crate::context::Context`] into a
//! concrete URI string (C1–C4); [`regex`] compiles a template plus a
//! per-parameter validation schema into the set of regular expressions
//! that recognize concrete URIs and bind their parameters (C5).

mod encode;
mod expand;
mod operator;
mod regex_synth;
mod varspec;

pub use expand::expand_template;
pub use regex_synth::{compile_template, expand_regex, CaptureBinding, SynthesizedRegex};
pub use varspec::{parse_varspecs, VarSpec};
pub use operator::Operator;
