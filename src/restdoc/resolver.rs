//! # Resource Resolver (C6)
//!
//! Compiles every resource's `path` template, plus its parameters'
//! `match` validations, into the regexes [`crate::uritemplate::compile_template`]
//! synthesizes, then matches an incoming request path against all of
//! them to find the (unique) resource it addresses.
//!
//! Per §4.5 / §9 Open Question 1, every compiled regex of every
//! resource is tried — there is no short-circuit on first match — so
//! that two resources whose path templates both accept a given
//! concrete path are reported as an ambiguity rather than silently
//! resolved to whichever happened to be declared first.

use std::collections::HashMap;

use regex::Regex;

use crate::error::RestdocError;
use crate::uritemplate::{compile_template, CaptureBinding};

use super::document::{Document, Resource};

struct CompiledRegex {
    regex: Regex,
    bindings: Vec<CaptureBinding>,
}

struct CompiledResource {
    index: usize,
    regexes: Vec<CompiledRegex>,
}

/// A successfully resolved request: the matched resource plus its
/// path/query parameters, keyed by RestDoc parameter name.
///
/// Per §6's "parameter return shape", every declared parameter is
/// always present, mapped to a (possibly empty) list of captured
/// values — never a bare optional scalar. A parameter referenced by
/// more than one varspec occurrence (e.g. appearing both in the path
/// and in a query expression) collects one entry per occurrence that
/// actually participated in the winning match.
pub struct ResolvedRequest<'doc> {
    /// The resource the path resolved to.
    pub resource: &'doc Resource,
    /// Captured parameter values, by RestDoc parameter name.
    pub params: HashMap<String, Vec<String>>,
}

/// Compiles every resource's path once and resolves concrete request
/// paths against the compiled set.
///
/// Owns the [`Document`] it was built from (rather than borrowing it)
/// so that a [`crate::restdoc::Validator`] can build this exactly once
/// at construction and keep reusing it across calls, per §5's "state is
/// read-only post-construction" invariant — a resolver rebuilt per call
/// would recompile every resource's regex set (the one genuinely
/// expensive step per §5) on every single validation.
pub struct ResourceResolver {
    document: Document,
    compiled: Vec<CompiledResource>,
}

impl ResourceResolver {
    /// Compiles every resource of `document`. Fails fast on the first
    /// resource whose path/validations don't compile to a valid regex.
    pub fn new(document: Document) -> Result<Self, RestdocError> {
        let mut compiled = Vec::with_capacity(document.resources.len());
        let mut total_regexes = 0usize;
        for (index, resource) in document.resources.iter().enumerate() {
            let validations: HashMap<String, Vec<String>> = resource
                .params
                .iter()
                .map(|(name, spec)| (name.clone(), spec.match_patterns()))
                .collect();

            let synthesized = compile_template(&resource.path, &validations).map_err(|e| {
                RestdocError::InvalidResourceRegex {
                    pattern: resource.path.clone(),
                    cause: e.to_string(),
                }
            })?;

            let mut regexes = Vec::with_capacity(synthesized.len());
            for s in synthesized {
                let regex = Regex::new(&s.pattern).map_err(|e| RestdocError::InvalidResourceRegex {
                    pattern: s.pattern.clone(),
                    cause: e.to_string(),
                })?;
                regexes.push(CompiledRegex {
                    regex,
                    bindings: s.bindings,
                });
            }

            total_regexes += regexes.len();
            tracing::debug!(
                resource = resource.display_name(),
                alternatives = regexes.len(),
                "compiled resource path"
            );
            compiled.push(CompiledResource { index, regexes });
        }

        tracing::info!(
            resources = compiled.len(),
            regexes = total_regexes,
            "resource resolver constructed"
        );
        Ok(Self { document, compiled })
    }

    /// The document this resolver was built from.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Resolves `path` to the unique resource that accepts it.
    ///
    /// Every compiled regex of every resource is evaluated regardless
    /// of earlier matches (§4.5, §9 Open Question 1 context). Zero
    /// matching resources is [`RestdocError::NoResourceFound`]; more
    /// than one distinct matching resource is
    /// [`RestdocError::AmbiguousPath`]. When a resource has more than
    /// one alternative regex and several match the same path, the
    /// *last* one encountered supplies the captured parameters (§4.5
    /// step 4).
    pub fn resolve(&self, path: &str) -> Result<ResolvedRequest<'_>, RestdocError> {
        let mut matched: Vec<(usize, HashMap<String, Vec<String>>)> = Vec::new();

        for compiled in &self.compiled {
            let mut last_match: Option<HashMap<String, Vec<String>>> = None;
            for cr in &compiled.regexes {
                if let Some(caps) = cr.regex.captures(path) {
                    let mut params = seed_empty_params(&self.document.resources[compiled.index]);
                    for binding in &cr.bindings {
                        if let Some(m) = caps.name(&binding.group_name) {
                            params
                                .entry(binding.param_name.clone())
                                .or_default()
                                .push(m.as_str().to_string());
                        }
                    }
                    last_match = Some(params);
                }
            }
            if let Some(params) = last_match {
                matched.push((compiled.index, params));
            }
        }

        match matched.len() {
            0 => {
                tracing::trace!(path, "no resource matched");
                Err(RestdocError::NoResourceFound {
                    path: path.to_string(),
                })
            }
            1 => {
                let (index, params) = matched.into_iter().next().unwrap();
                let resource = &self.document.resources[index];
                tracing::trace!(path, resource = resource.display_name(), "resolved path");
                Ok(ResolvedRequest { resource, params })
            }
            _ => {
                let matches: Vec<String> = matched
                    .iter()
                    .map(|(index, _)| self.document.resources[*index].display_name().to_string())
                    .collect();
                tracing::warn!(path, ?matches, "ambiguous path resolution");
                Err(RestdocError::AmbiguousPath {
                    path: path.to_string(),
                    matches,
                })
            }
        }
    }
}

/// Pre-seeds the parameter map with an empty list for every parameter
/// the resource declares, so an optional parameter that never
/// captured a value is still present as `name -> []` rather than
/// absent entirely (§6 "Parameter return shape").
fn seed_empty_params(resource: &Resource) -> HashMap<String, Vec<String>> {
    resource
        .params
        .keys()
        .map(|name| (name.clone(), Vec::new()))
        .collect()
}
