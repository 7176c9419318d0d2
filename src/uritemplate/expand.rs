//! # Template Expander (C4)
//!
//! Walks a template string left to right, copying literal bytes
//! verbatim and dispatching each `{...}` expression to its operator
//! with the variable-binding [`Context`], concatenating the result.
//! Percent-encoding happens only inside value encoding (C1); the
//! overall expansion result is never re-encoded.

use crate::context::{Context, Value};
use crate::error::UriTemplateError;
use crate::uritemplate::encode::encode;
use crate::uritemplate::operator::Operator;
use crate::uritemplate::varspec::{parse_varspecs, VarSpec};

/// Expands `template` against `context`, per §4.3.
///
/// A template with no `{...}` expressions expands to itself
/// byte-for-byte (literal idempotence, §8).
pub fn expand_template(template: &str, context: &Context) -> Result<String, UriTemplateError> {
    let chars: Vec<char> = template.chars().collect();
    let end = chars.len();
    let mut out = String::new();
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
            out.push_str(&expand_expression(&body, context));
            i = j;
        } else {
            out.push(c);
        }
        i += 1;
    }
    Ok(out)
}

/// Expands a single expression body (the content between `{` and `}`,
/// sigil included).
fn expand_expression(expr: &str, context: &Context) -> String {
    let (operator, rest) = split_operator(expr);
    let varspecs = parse_varspecs(rest);

    let mut expanded = Vec::with_capacity(varspecs.len());
    for vs in &varspecs {
        if let Some(s) = expand_varspec(operator, vs, context.get(&vs.name)) {
            expanded.push(s);
        }
    }

    if expanded.is_empty() {
        String::new()
    } else {
        format!("{}{}", operator.leader(), expanded.join(operator.glue()))
    }
}

fn split_operator(expr: &str) -> (Operator, &str) {
    match expr.chars().next().and_then(Operator::from_sigil) {
        Some(op) => (op, &expr[op_sigil_len(expr)..]),
        None => (Operator::Simple, expr),
    }
}

fn op_sigil_len(expr: &str) -> usize {
    expr.chars().next().map(|c| c.len_utf8()).unwrap_or(0)
}

fn expand_varspec(op: Operator, vs: &VarSpec, value: &Value) -> Option<String> {
    match value {
        Value::Undefined => None,
        Value::Scalar(s) => Some(expand_scalar(op, vs, s)),
        Value::List(items) => {
            let defined: Vec<&str> = items.iter().filter_map(|o| o.as_deref()).collect();
            expand_list(op, vs, &defined)
        }
        Value::Map(map) => {
            // BTreeMap::iter is already key-sorted.
            let pairs: Vec<(&str, &str)> = map
                .iter()
                .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
                .collect();
            expand_pairs(op, vs, &pairs)
        }
        Value::Pairs(pairs) => {
            let pairs: Vec<(&str, &str)> = pairs
                .iter()
                .filter_map(|(k, v)| v.as_deref().map(|v| (k.as_str(), v)))
                .collect();
            expand_pairs(op, vs, &pairs)
        }
    }
}

/// Scalar prefix truncation happens by Unicode scalar count, matching
/// the original's Python string slicing — before encoding.
fn expand_scalar(op: Operator, vs: &VarSpec, s: &str) -> String {
    let truncated = match vs.prefix {
        Some(n) => s.chars().take(n).collect::<String>(),
        None => s.to_string(),
    };
    let escaped = encode(&truncated, op.encode_reserved());

    if op.keep_name() {
        if escaped.is_empty() {
            if op.form_style() {
                format!("{}=", vs.name)
            } else {
                vs.name.clone()
            }
        } else {
            format!("{}={}", vs.name, escaped)
        }
    } else {
        escaped
    }
}

/// Prefix truncation does not apply to list/pair elements — only to
/// scalars (§3 Varspec; see SPEC_FULL.md §2 for the original_source
/// cross-check).
fn expand_list(op: Operator, vs: &VarSpec, defined: &[&str]) -> Option<String> {
    if defined.is_empty() {
        return None;
    }
    if op.keep_name() {
        if vs.explode {
            let parts: Vec<String> = defined
                .iter()
                .map(|v| format!("{}={}", vs.name, encode(v, op.encode_reserved())))
                .collect();
            Some(parts.join(op.glue()))
        } else {
            let parts: Vec<String> = defined
                .iter()
                .map(|v| encode(v, op.encode_reserved()))
                .collect();
            Some(format!("{}={}", vs.name, parts.join(",")))
        }
    } else {
        let glue = if vs.explode { op.glue() } else { "," };
        let parts: Vec<String> = defined
            .iter()
            .map(|v| encode(v, op.encode_reserved()))
            .collect();
        Some(parts.join(glue))
    }
}

fn expand_pairs(op: Operator, vs: &VarSpec, defined: &[(&str, &str)]) -> Option<String> {
    if defined.is_empty() {
        return None;
    }
    let glue = if vs.explode { op.glue() } else { "," };
    let parts: Vec<String> = defined
        .iter()
        .map(|(k, v)| expand_pair(op, vs, k, v))
        .collect();
    let joined = parts.join(glue);
    if op.keep_name() && !vs.explode {
        Some(format!("{}={}", vs.name, joined))
    } else {
        Some(joined)
    }
}

fn expand_pair(op: Operator, vs: &VarSpec, k: &str, v: &str) -> String {
    if vs.explode && v.is_empty() {
        if op.keep_name() && op.form_style() {
            format!("{}=", k)
        } else {
            k.to_string()
        }
    } else {
        let pairglue = if vs.explode { "=" } else { "," };
        format!("{}{}{}", k, pairglue, encode(v, op.encode_reserved()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn ctx(pairs: &[(&str, Value)]) -> Context {
        let mut c = Context::new();
        for (k, v) in pairs {
            c.insert(*k, v.clone());
        }
        c
    }

    #[test]
    fn literal_idempotence() {
        let c = Context::new();
        assert_eq!(expand_template("/a/b/c", &c).unwrap(), "/a/b/c");
    }

    #[test]
    fn simple_scalar() {
        let c = ctx(&[("var", Value::Scalar("value".into()))]);
        assert_eq!(expand_template("{var}", &c).unwrap(), "value");
    }

    #[test]
    fn simple_scalar_encodes_space_and_bang() {
        let c = ctx(&[("hello", Value::Scalar("Hello World!".into()))]);
        assert_eq!(expand_template("{hello}", &c).unwrap(), "Hello%20World%21");
    }

    #[test]
    fn reserved_scalar_passes_bang_through() {
        let c = ctx(&[("hello", Value::Scalar("Hello World!".into()))]);
        assert_eq!(expand_template("{+hello}", &c).unwrap(), "Hello%20World!");
    }

    #[test]
    fn fragment_with_multiple_varspecs() {
        let c = ctx(&[
            ("path", Value::Scalar("/foo/bar".into())),
            ("x", Value::Scalar("1024".into())),
        ]);
        assert_eq!(
            expand_template("{#path,x}/here", &c).unwrap(),
            "#/foo/bar,1024/here"
        );
    }

    #[test]
    fn query_with_empty_scalar() {
        let c = ctx(&[
            ("x", Value::Scalar("1024".into())),
            ("y", Value::Scalar("768".into())),
            ("empty", Value::Scalar("".into())),
        ]);
        assert_eq!(
            expand_template("{?x,y,empty}", &c).unwrap(),
            "?x=1024&y=768&empty="
        );
    }

    #[test]
    fn exploded_path_segment_list() {
        let c = ctx(&[(
            "list",
            Value::List(
                ["red", "green", "blue", "Hello World!"]
                    .iter()
                    .map(|s| Some(s.to_string()))
                    .collect(),
            ),
        )]);
        assert_eq!(
            expand_template("{/list*}", &c).unwrap(),
            "/red/green/blue/Hello%20World%21"
        );
    }

    #[test]
    fn undefined_suppresses_expression() {
        let c = Context::new();
        assert_eq!(expand_template("{?a,b}", &c).unwrap(), "");
        assert_eq!(expand_template("/x{?a,b}/y", &c).unwrap(), "/x/y");
    }

    #[test]
    fn mismatched_braces_is_an_error() {
        let c = Context::new();
        assert!(matches!(
            expand_template("/a/{b", &c),
            Err(UriTemplateError::MismatchedBraces { .. })
        ));
    }

    #[test]
    fn matrix_params_bare_name_on_empty() {
        let c = ctx(&[("empty", Value::Scalar("".into()))]);
        assert_eq!(expand_template("{;empty}", &c).unwrap(), ";empty");
    }

    #[test]
    fn sorted_map_keys_are_sorted_lexicographically() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), Some("2".to_string()));
        map.insert("a".to_string(), Some("1".to_string()));
        let c = ctx(&[("keys", Value::Map(map))]);
        assert_eq!(expand_template("{?keys*}", &c).unwrap(), "?a=1&b=2");
    }

    #[test]
    fn ordered_pairs_preserve_insertion_order() {
        let c = ctx(&[(
            "keys",
            Value::Pairs(vec![
                ("b".to_string(), Some("2".to_string())),
                ("a".to_string(), Some("1".to_string())),
            ]),
        )]);
        assert_eq!(expand_template("{?keys*}", &c).unwrap(), "?b=2&a=1");
    }

    #[test]
    fn prefix_truncates_scalar_before_encoding() {
        let c = ctx(&[("var", Value::Scalar("value".into()))]);
        assert_eq!(expand_template("{var:3}", &c).unwrap(), "val");
    }

    #[test]
    fn percent_encoding_totality_no_stray_percent() {
        let c = ctx(&[("v", Value::Scalar("50% off".into()))]);
        let out = expand_template("{+v}", &c).unwrap();
        let bytes = out.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' {
                assert!(i + 2 < bytes.len());
                assert!(bytes[i + 1].is_ascii_hexdigit());
                assert!(bytes[i + 2].is_ascii_hexdigit());
            }
            i += 1;
        }
    }
}
