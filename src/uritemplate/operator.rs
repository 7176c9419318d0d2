//! # Operator Table (C2)
//!
//! The eight RFC 6570 expression operators as a tagged enum sharing one
//! behavioral record, rather than a class hierarchy — composition of
//! the record fields below plus two boolean policy flags, per the
//! design note on operator polymorphism.

/// One of the eight URI Template operators, including the empty
/// (default) sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// The default, sigil-less expression: `{var}`.
    Simple,
    /// `{+var}` — reserved-expansion, passes reserved characters through.
    Reserved,
    /// `{#var}` — fragment expansion; reserved-pass with a `#` leader.
    Fragment,
    /// `{.var}` — label expansion (dot-prefixed path segment).
    Label,
    /// `{/var}` — path-segment expansion.
    PathSegment,
    /// `{;var}` — path-style parameter expansion (matrix parameters).
    PathParam,
    /// `{?var}` — form-style query expansion.
    Query,
    /// `{&var}` — form-style query continuation.
    QueryContinuation,
}

impl Operator {
    /// Selects the operator for a given sigil byte, if any; `None`
    /// means the expression had no recognized sigil and the caller
    /// should *not* consume the first byte — use [`Operator::Simple`].
    pub fn from_sigil(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Reserved),
            '#' => Some(Operator::Fragment),
            '.' => Some(Operator::Label),
            '/' => Some(Operator::PathSegment),
            ';' => Some(Operator::PathParam),
            '?' => Some(Operator::Query),
            '&' => Some(Operator::QueryContinuation),
            _ => None,
        }
    }

    /// Prefix emitted once, iff at least one varspec produced output.
    pub fn leader(self) -> &'static str {
        match self {
            Operator::Simple | Operator::Reserved => "",
            Operator::Fragment => "#",
            Operator::Label => ".",
            Operator::PathSegment => "/",
            Operator::PathParam => ";",
            Operator::Query => "?",
            Operator::QueryContinuation => "&",
        }
    }

    /// Separator between varspec outputs (and, when exploded, between
    /// list elements / key-value pairs).
    pub fn glue(self) -> &'static str {
        match self {
            Operator::Simple | Operator::Reserved => ",",
            Operator::Fragment => ",",
            Operator::Label => ".",
            Operator::PathSegment => "/",
            Operator::PathParam => ";",
            Operator::Query => "&",
            Operator::QueryContinuation => "&",
        }
    }

    /// Whether `name=value` form is emitted (the `;`, `?`, `&` family).
    pub fn keep_name(self) -> bool {
        matches!(
            self,
            Operator::PathParam | Operator::Query | Operator::QueryContinuation
        )
    }

    /// Whether an empty scalar keeps a trailing `=` (the `?`, `&`
    /// family); `;` instead emits the bare name.
    pub fn form_style(self) -> bool {
        matches!(self, Operator::Query | Operator::QueryContinuation)
    }

    /// Whether reserved characters and already-valid `%HH` triplets
    /// pass through unencoded (the `+`, `#` family).
    pub fn encode_reserved(self) -> bool {
        matches!(self, Operator::Reserved | Operator::Fragment)
    }
}
