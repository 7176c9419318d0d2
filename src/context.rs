//! # Variable Binding Context
//!
//! A [`Context`] maps variable names to [`Value`]s for template
//! expansion. `Value` is an explicit five-shape tagged union — no
//! runtime type sniffing beyond what's listed here, per the design
//! notes on dynamic value shapes: undefined, scalar, ordered list,
//! sorted mapping, and order-preserving pairs. The distinction between
//! a sorted mapping and ordered pairs is observable in expansion output
//! (`{?...}` over a `HashMap`-like value sorts keys; over a `Vec<(K,
//! V)>` it doesn't) and must be preserved end to end.

use std::collections::BTreeMap;

/// A value bound to a variable name in a [`Context`].
///
/// Non-string scalars (booleans, integers, floats) are stringified by
/// the caller before insertion — see the `From` impls below — rather
/// than inside the percent-encoder, so the encoder only ever deals in
/// `&str`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Absent or explicitly null. Suppresses the varspec entirely.
    Undefined,
    /// A single string-like value.
    Scalar(String),
    /// An ordered list of values. `None` entries (originating from a
    /// null/undefined list element) are dropped during expansion.
    List(Vec<Option<String>>),
    /// An unordered mapping. Keys are sorted lexicographically at
    /// expansion time, matching `dict.items()` + `.sort()` in the
    /// source this crate is modeled on.
    Map(BTreeMap<String, Option<String>>),
    /// An ordered sequence of key/value pairs. Insertion order is
    /// preserved, never sorted.
    Pairs(Vec<(String, Option<String>)>),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        // Stable, locale-independent stringification (spec §4.1);
        // mirrors the original's `str(True)` / `str(False)`.
        Value::Scalar(if b { "True".to_string() } else { "False".to_string() })
    }
}

macro_rules! impl_value_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Scalar(n.to_string())
            }
        })*
    };
}

impl_value_from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Scalar(n.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Undefined,
        }
    }
}

impl<T: Into<String>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(|v| Some(v.into())).collect())
    }
}

/// A variable binding used by [`crate::uritemplate::expand_template`].
///
/// Construct with [`Context::new`] and [`Context::insert`], or build a
/// `BTreeMap<String, Value>` directly and convert with `Context::from`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: BTreeMap<String, Value>,
}

impl Context {
    /// An empty context; every lookup resolves to [`Value::Undefined`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`, replacing any previous binding.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Looks up a variable by name. Names absent from the context are
    /// indistinguishable from names explicitly bound to
    /// [`Value::Undefined`] — both suppress the varspec.
    pub fn get(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&Value::Undefined)
    }
}

impl From<BTreeMap<String, Value>> for Context {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }
}

impl FromIterator<(String, Value)> for Context {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
