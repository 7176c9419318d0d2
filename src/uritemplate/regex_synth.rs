//! # Regex Synthesizer (C5)
//!
//! Translates a template plus a per-parameter validation schema into
//! the finite list of concrete regexes that recognize the URIs the
//! template can expand to, binding named captures to variable names.
//!
//! Implemented as an odometer over each varspec occurrence's
//! alternative validation patterns (§4.4, §9 design notes), rather
//! than the Python-%-dict substitution trick the source this crate is
//! modeled on uses: the regex skeleton is built once with private-use
//! Unicode delimiters marking each placeholder, and every combination
//! is rendered by string-replacing each placeholder with one of its
//! alternatives.

use std::collections::HashMap;

use crate::error::UriTemplateError;
use crate::uritemplate::operator::Operator;
use crate::uritemplate::varspec::{parse_varspecs, VarSpec};

const PH_OPEN: char = '\u{E000}';
const PH_CLOSE: char = '\u{E001}';

/// One named-capture group in a synthesized regex, and the parameter
/// name / occurrence index it binds — the capture group's own name
/// may be sanitized for the regex engine's identifier rules, so this
/// mapping is kept explicit rather than re-derived from the group name
/// at match time (contrast with the `_`-splitting convention the
/// original relies on; see DESIGN.md).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureBinding {
    /// The sanitized name used inside the compiled regex's `(?P<...>)`.
    pub group_name: String,
    /// The original RestDoc parameter name.
    pub param_name: String,
    /// Zero-based index of the enclosing expression within the
    /// template (the "occurrence" index referenced throughout §3/§4.4).
    pub occurrence: usize,
}

/// One synthesized regex alternative: its source string plus the
/// capture-group bindings needed to recover parameter values from a
/// successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedRegex {
    /// The anchored (`^...$`) regex source.
    pub pattern: String,
    /// Capture-group bindings present in `pattern`.
    pub bindings: Vec<CaptureBinding>,
}

struct CompiledParam {
    key: String,
    alternatives: Vec<String>,
}

/// Synthesizes the cartesian product of concrete regexes for
/// `template`, given each parameter's `match` validation patterns (raw,
/// as authored — anchors and compiling are handled here).
///
/// `validations` maps parameter name to its alternative `match.pattern`
/// strings, in declared order; a name absent from the map (or present
/// with no patterns) gets the default `[^glue]+` body.
pub fn compile_template(
    template: &str,
    validations: &HashMap<String, Vec<String>>,
) -> Result<Vec<SynthesizedRegex>, UriTemplateError> {
    let chars: Vec<char> = template.chars().collect();
    let end = chars.len();
    let mut regex_template = String::from("^");
    let mut params: Vec<CompiledParam> = Vec::new();
    let mut bindings: Vec<CaptureBinding> = Vec::new();
    let mut expr_idx = 0usize;
    let mut i = 0;
    while i < end {
        let c = chars[i];
        if c == '{' {
            let mut j = i;
            while j < end && chars[j] != '}' {
                j += 1;
            }
            if j >= end {
                return Err(UriTemplateError::MismatchedBraces {
                    remainder: chars[i..end].iter().collect(),
                });
            }
            let body: String = chars[i + 1..j].iter().collect();
            let (operator, rest) = split_operator(&body);
            let varspecs = parse_varspecs(rest);
            let (frag, frag_params, frag_bindings) =
                build_expression_fragment(operator, &varspecs, validations, expr_idx)?;
            regex_template.push_str(&frag);
            params.extend(frag_params);
            bindings.extend(frag_bindings);
            expr_idx += 1;
            i = j;
        } else {
            regex_template.push_str(&regex::escape(&c.to_string()));
        }
        i += 1;
    }
    regex_template.push('$');

    Ok(enumerate_regexes(&regex_template, &params, &bindings))
}

/// Public external interface (§6): the concrete regex source strings
/// only, without the internal capture-group bookkeeping.
pub fn expand_regex(
    template: &str,
    validations: &HashMap<String, Vec<String>>,
) -> Result<Vec<String>, UriTemplateError> {
    Ok(compile_template(template, validations)?
        .into_iter()
        .map(|r| r.pattern)
        .collect())
}

fn split_operator(expr: &str) -> (Operator, &str) {
    match expr.chars().next().and_then(Operator::from_sigil) {
        Some(op) => {
            let skip = expr.chars().next().map(|c| c.len_utf8()).unwrap_or(0);
            (op, &expr[skip..])
        }
        None => (Operator::Simple, expr),
    }
}

fn placeholder(key: &str) -> String {
    format!("{PH_OPEN}{key}{PH_CLOSE}")
}

fn sanitize_group_name(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
        out.insert(0, '_');
    }
    out
}

#[allow(clippy::type_complexity)]
fn build_expression_fragment(
    op: Operator,
    varspecs: &[VarSpec],
    validations: &HashMap<String, Vec<String>>,
    expr_idx: usize,
) -> Result<(String, Vec<CompiledParam>, Vec<CaptureBinding>), UriTemplateError> {
    let mut frag = String::new();
    if !op.leader().is_empty() {
        frag.push_str(&regex::escape(op.leader()));
        frag.push('?');
    }
    frag.push_str("(?:");

    let mut alt_strs = Vec::with_capacity(varspecs.len());
    let mut params = Vec::with_capacity(varspecs.len());
    let mut bindings = Vec::with_capacity(varspecs.len());

    for vs in varspecs {
        if vs.explode {
            return Err(UriTemplateError::ExplodeNotSupported);
        }

        let key = format!("{}_{}", vs.name, expr_idx);
        let group_name = sanitize_group_name(&key);

        let mut piece = String::new();
        piece.push_str(&regex::escape(op.glue()));
        piece.push('?');
        if op.keep_name() {
            piece.push_str(&regex::escape(&vs.name));
            piece.push_str("=?");
        }
        piece.push_str("(?P<");
        piece.push_str(&group_name);
        piece.push('>');
        piece.push_str(&placeholder(&key));
        piece.push_str(")()");
        alt_strs.push(piece);

        let alternatives = build_param_alternatives(&vs.name, validations, op.glue())?;
        params.push(CompiledParam {
            key,
            alternatives,
        });
        bindings.push(CaptureBinding {
            group_name,
            param_name: vs.name.clone(),
            occurrence: expr_idx,
        });
    }

    frag.push_str(&alt_strs.join("|"));
    frag.push_str(&format!("){{0,{}}}", varspecs.len()));
    Ok((frag, params, bindings))
}

/// Builds the alternative BODY patterns for one parameter (§4.4 step
/// 3): one per `match` validation, anchor-stripped and padded with
/// `[^glue]*` on any side that wasn't anchored; `[^glue]+` if there are
/// no validations at all.
fn build_param_alternatives(
    name: &str,
    validations: &HashMap<String, Vec<String>>,
    glue: &str,
) -> Result<Vec<String>, UriTemplateError> {
    let valid = format!("[^{}]", char_class_escape(glue));

    let patterns = validations.get(name).cloned().unwrap_or_default();
    if patterns.is_empty() {
        return Ok(vec![format!("{valid}+")]);
    }

    let mut out = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let mut p = pattern.as_str();
        let mut prefix = String::new();
        let mut suffix = String::new();

        if let Some(stripped) = p.strip_prefix('^') {
            p = stripped;
        } else {
            prefix = format!("{valid}*");
        }
        if let Some(stripped) = p.strip_suffix('$') {
            p = stripped;
        } else {
            suffix = format!("{valid}*");
        }

        let body = if p.is_empty() {
            format!("{valid}+")
        } else {
            p.to_string()
        };

        if let Err(e) = regex::Regex::new(p) {
            return Err(UriTemplateError::InvalidValidationPattern {
                name: name.to_string(),
                pattern: p.to_string(),
                cause: e.to_string(),
            });
        }

        out.push(format!("{prefix}{body}{suffix}"));
    }
    Ok(out)
}

/// Escapes a (short, single-codepoint-per-char) glue string for safe
/// use inside a `[^...]` character class.
fn char_class_escape(glue: &str) -> String {
    glue.chars()
        .map(|c| {
            if c == '\\' || c == ']' || c == '^' || c == '-' {
                format!("\\{c}")
            } else {
                c.to_string()
            }
        })
        .collect()
}

fn enumerate_regexes(
    regex_template: &str,
    params: &[CompiledParam],
    bindings: &[CaptureBinding],
) -> Vec<SynthesizedRegex> {
    if params.is_empty() {
        return vec![SynthesizedRegex {
            pattern: regex_template.to_string(),
            bindings: bindings.to_vec(),
        }];
    }

    let mut indices = vec![0usize; params.len()];
    let mut out = Vec::new();
    loop {
        let mut rendered = regex_template.to_string();
        for (p, idx) in params.iter().zip(indices.iter()) {
            rendered = rendered.replace(&placeholder(&p.key), &p.alternatives[*idx]);
        }
        out.push(SynthesizedRegex {
            pattern: rendered,
            bindings: bindings.to_vec(),
        });

        let mut i = 0;
        loop {
            indices[i] += 1;
            if indices[i] == params[i].alternatives.len() {
                indices[i] = 0;
                i += 1;
                if i == params.len() {
                    return out;
                }
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_validations() -> HashMap<String, Vec<String>> {
        HashMap::new()
    }

    #[test]
    fn literal_only_template_has_one_regex() {
        let regexes = compile_template("/a/b/c", &no_validations()).unwrap();
        assert_eq!(regexes.len(), 1);
        let re = regex::Regex::new(&regexes[0].pattern).unwrap();
        assert!(re.is_match("/a/b/c"));
        assert!(!re.is_match("/a/b/c/d"));
    }

    #[test]
    fn default_body_matches_simple_segment() {
        let regexes = compile_template("/widgets/{id}", &no_validations()).unwrap();
        assert_eq!(regexes.len(), 1);
        let re = regex::Regex::new(&regexes[0].pattern).unwrap();
        let caps = re.captures("/widgets/42").unwrap();
        let binding = &regexes[0].bindings[0];
        assert_eq!(caps.name(&binding.group_name).unwrap().as_str(), "42");
    }

    #[test]
    fn explode_is_rejected() {
        let err = compile_template("/widgets{?tags*}", &no_validations()).unwrap_err();
        assert_eq!(err, UriTemplateError::ExplodeNotSupported);
    }

    #[test]
    fn alternative_patterns_produce_cartesian_product() {
        let mut v = HashMap::new();
        v.insert(
            "resource_id".to_string(),
            vec!["^[0-9a-f-]{36}$".to_string(), "^(alt1|alt2)$".to_string()],
        );
        let regexes = compile_template("/resource1/{resource_id}", &v).unwrap();
        assert_eq!(regexes.len(), 2);
        let res: Vec<bool> = regexes
            .iter()
            .map(|r| regex::Regex::new(&r.pattern).unwrap().is_match("/resource1/alt1"))
            .collect();
        assert!(res.iter().any(|&b| b));
    }

    #[test]
    fn invalid_pattern_is_rejected_at_synthesis() {
        let mut v = HashMap::new();
        v.insert("id".to_string(), vec!["^(unterminated".to_string()]);
        let err = compile_template("/x/{id}", &v).unwrap_err();
        assert!(matches!(
            err,
            UriTemplateError::InvalidValidationPattern { .. }
        ));
    }

    #[test]
    fn query_expression_binds_optional_param() {
        let regexes = compile_template("/x{?a,b}", &no_validations()).unwrap();
        let re = regex::Regex::new(&regexes[0].pattern).unwrap();
        assert!(re.is_match("/x"));
        assert!(re.is_match("/x?a=1"));
        assert!(re.is_match("/x?a=1&b=2"));
    }
}
