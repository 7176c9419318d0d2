//! # Percent-Encoder (C1)
//!
//! Two encoding modes: strict (every byte outside `ALPHA / DIGIT / "-"
//! / "." / "_" / "~"` is encoded) and reserved-pass (`unreserved ∪
//! reserved ∪ already-valid %HH` survive unencoded; any stray `%` that
//! doesn't introduce a valid 2-hex-digit triplet is repaired to
//! `%25`). Built on `percent_encoding`'s `AsciiSet`, matching the
//! reserved/fragment operator's allowance for already-pct-encoded
//! triplets the way the teacher crate leans on well-known external
//! crates for RFC-3986-adjacent concerns rather than hand-rolling them.

use percent_encoding::{percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// `unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"` is the
/// complement of `NON_ALPHANUMERIC` minus the four punctuation
/// characters URI Templates keep unencoded everywhere.
const STRICT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// `unreserved ∪ reserved` where `reserved = gen-delims / sub-delims`:
/// `: / ? # [ ] @ ! $ & ' ( ) * + , ; =`
const RESERVED_PASS: &AsciiSet = &STRICT
    .remove(b':')
    .remove(b'/')
    .remove(b'?')
    .remove(b'#')
    .remove(b'[')
    .remove(b']')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b'%');

/// Encodes `value` (already truncated to any `:N` prefix by the
/// caller) according to the operator's encoding policy.
///
/// Strict mode never leaves a `%` unencoded: every byte outside the
/// unreserved set becomes a `%HH` triplet, including pre-existing `%`
/// bytes in `value`. Reserved-pass mode lets already-valid `%HH`
/// triplets and the reserved character set through unencoded, then
/// repairs any remaining stray `%` (one that isn't immediately
/// followed by two hex digits) to `%25` — mirroring the two-pass
/// structure of the source this crate is modeled on.
pub fn encode(value: &str, reserved_pass: bool) -> String {
    if !reserved_pass {
        return percent_encode(value.as_bytes(), STRICT).to_string();
    }
    let escaped = percent_encode(value.as_bytes(), RESERVED_PASS).to_string();
    repair_stray_percent(&escaped)
}

/// Replaces every `%` not followed by exactly two hex digits with
/// `%25`, leaving valid `%HH` triplets untouched.
fn repair_stray_percent(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let is_triplet = bytes.len() >= i + 3
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if is_triplet {
                out.push('%');
            } else {
                out.push_str("%25");
            }
        } else {
            out.push(bytes[i] as char);
        }
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_encodes_space_and_punctuation() {
        assert_eq!(encode("Hello World!", false), "Hello%20World%21");
    }

    #[test]
    fn reserved_pass_keeps_reserved_characters() {
        assert_eq!(encode("Hello World!", true), "Hello%20World!");
    }

    #[test]
    fn reserved_pass_keeps_valid_triplets() {
        assert_eq!(encode("100%25", true), "100%25");
    }

    #[test]
    fn reserved_pass_repairs_stray_percent() {
        assert_eq!(encode("50% off", true), "50%25%20off");
    }

    #[test]
    fn strict_encodes_unreserved_set_untouched() {
        assert_eq!(encode("abc-._~XYZ019", false), "abc-._~XYZ019");
    }
}
