//! Missing-value conventions.
//!
//! Numeric and categorical variables mark missing observations with negative
//! codes. Some exports store the codes -1..-9 as unsigned 32-bit integers
//! (`2^32 - k`); those are translated back before any classification.
//! Text variables use a looser rule, see [`is_missing_text`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Unsigned sentinel encodings and the signed codes they stand for.
pub const SENTINEL_CODES: [(i64, i64); 9] = [
    (4_294_967_287, -9),
    (4_294_967_288, -8),
    (4_294_967_289, -7),
    (4_294_967_290, -6),
    (4_294_967_291, -5),
    (4_294_967_292, -4),
    (4_294_967_293, -3),
    (4_294_967_294, -2),
    (4_294_967_295, -1),
];

// Missing codes embedded in free text - compiled once
static EMBEDDED_MISSING_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-[123]").expect("Invalid regex: embedded missing code"));

/// The sentinel translation table, ordered by sentinel.
pub fn sentinel_table() -> &'static [(i64, i64)] {
    &SENTINEL_CODES
}

/// Map an unsigned sentinel to its signed code; other values pass through.
pub fn translate_sentinel(code: i64) -> i64 {
    SENTINEL_CODES
        .iter()
        .find(|(sentinel, _)| *sentinel == code)
        .map_or(code, |(_, canonical)| *canonical)
}

/// Float variant of [`translate_sentinel`]. Values outside the sentinel range
/// are returned unchanged.
pub fn canonical_value(value: f64) -> f64 {
    let (first, _) = SENTINEL_CODES[0];
    let (last, _) = SENTINEL_CODES[SENTINEL_CODES.len() - 1];
    if value.fract() == 0.0 && (first as f64..=last as f64).contains(&value) {
        translate_sentinel(value as i64) as f64
    } else {
        value
    }
}

/// Whether a numeric observation is a missing code.
///
/// NaN compares false and is therefore never a missing code.
pub fn is_missing_code(value: f64) -> bool {
    canonical_value(value) < 0.0
}

/// Whether a text observation counts as missing.
///
/// Absent values, `""`, `"."`, and anything embedding `-1`, `-2` or `-3`
/// are missing. The substring match is intentionally loose: `"-10"` and
/// `"a-2b"` are missing too.
pub fn is_missing_text(value: Option<&str>) -> bool {
    match value {
        None | Some("") | Some(".") => true,
        Some(text) => EMBEDDED_MISSING_CODE.is_match(text),
    }
}

/// Whether a text observation is empty for the purpose of valid/invalid
/// counting. Narrower than [`is_missing_text`].
pub fn is_blank_text(value: Option<&str>) -> bool {
    matches!(value, None | Some("") | Some("."))
}
