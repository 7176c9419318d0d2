//! # Variable Spec Parser (C3)
//!
//! Splits an expression body on `,` into varspec strings, each
//! decomposed into `(name, explode, prefix)` by matching a trailing
//! `*` and then an optional `:N` suffix.

/// A single parsed varspec: `name`, `name*`, or `name:N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarSpec {
    /// The variable name, with any `*`/`:N` suffix stripped.
    pub name: String,
    /// Whether the `*` explode modifier was present.
    pub explode: bool,
    /// The `:N` prefix length, if present and in range 1..=9999.
    /// Values outside the range or non-integer `N` cause the prefix
    /// to be silently dropped rather than failing (§3).
    pub prefix: Option<usize>,
}

/// Splits an expression body (the part after any operator sigil) on
/// `,` into varspecs.
///
/// Malformed variable names (failing the `varname` grammar of §4.2)
/// are accepted and used verbatim as a context lookup key, per the
/// original implementation's leniency (see SPEC_FULL.md §2) — this
/// parser never fails.
pub fn parse_varspecs(body: &str) -> Vec<VarSpec> {
    body.split(',').map(parse_one).collect()
}

fn parse_one(raw: &str) -> VarSpec {
    let (name, explode) = match raw.strip_suffix('*') {
        Some(rest) => (rest, true),
        None => (raw, false),
    };

    if let Some(colon) = name.rfind(':') {
        let (head, tail) = (&name[..colon], &name[colon + 1..]);
        if let Ok(n) = tail.parse::<i64>() {
            if (1..=9999).contains(&n) {
                return VarSpec {
                    name: head.to_string(),
                    explode,
                    prefix: Some(n as usize),
                };
            }
        }
    }

    VarSpec {
        name: name.to_string(),
        explode,
        prefix: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name() {
        let v = parse_one("var");
        assert_eq!(v.name, "var");
        assert!(!v.explode);
        assert_eq!(v.prefix, None);
    }

    #[test]
    fn explode_modifier() {
        let v = parse_one("list*");
        assert_eq!(v.name, "list");
        assert!(v.explode);
    }

    #[test]
    fn prefix_modifier() {
        let v = parse_one("var:3");
        assert_eq!(v.name, "var");
        assert_eq!(v.prefix, Some(3));
    }

    #[test]
    fn prefix_out_of_range_is_dropped() {
        let v = parse_one("var:10000");
        assert_eq!(v.name, "var:10000");
        assert_eq!(v.prefix, None);
    }

    #[test]
    fn prefix_non_integer_is_dropped() {
        let v = parse_one("var:abc");
        assert_eq!(v.name, "var:abc");
        assert_eq!(v.prefix, None);
    }

    #[test]
    fn multiple_varspecs_split_on_comma() {
        let specs = parse_varspecs("a,b*,c:5");
        assert_eq!(specs.len(), 3);
        assert_eq!(specs[0].name, "a");
        assert!(specs[1].explode);
        assert_eq!(specs[2].prefix, Some(5));
    }
}
