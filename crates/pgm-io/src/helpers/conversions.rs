//! Checked numeric conversions for document cells.
//!
//! JSON numbers arrive as `i64`, `u64` or `f64`. Integer attributes only
//! accept integral numbers that fit the target width; real attributes accept
//! any number plus the textual infinities `"inf"`, `"+inf"` and `"-inf"`.
//!
//! Use these instead of `as` casts when decoding external data.

/// Convert to `i32`, rejecting values outside `[i32::MIN, i32::MAX]`.
///
/// ```
/// use pgm_io::helpers::safe_i64_to_i32;
///
/// assert_eq!(safe_i64_to_i32(42), Some(42));
/// assert_eq!(safe_i64_to_i32(3_000_000_000), None);
/// ```
pub fn safe_i64_to_i32(value: i64) -> Option<i32> {
    i32::try_from(value).ok()
}

/// Convert to `i8`, rejecting values outside `[i8::MIN, i8::MAX]`.
///
/// ```
/// use pgm_io::helpers::safe_i64_to_i8;
///
/// assert_eq!(safe_i64_to_i8(-1), Some(-1));
/// assert_eq!(safe_i64_to_i8(200), None);
/// ```
pub fn safe_i64_to_i8(value: i64) -> Option<i8> {
    i8::try_from(value).ok()
}

/// Parse the textual infinities accepted for real attributes.
///
/// ```
/// use pgm_io::helpers::parse_infinity;
///
/// assert_eq!(parse_infinity("-inf"), Some(f64::NEG_INFINITY));
/// assert_eq!(parse_infinity("nan"), None);
/// ```
pub fn parse_infinity(text: &str) -> Option<f64> {
    match text {
        "inf" | "+inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}
