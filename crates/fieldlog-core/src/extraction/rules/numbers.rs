//! Numeric coercion for segment counts and distances.
//!
//! A capture that does not convert yields `None`; conversion never panics.

use super::patterns::LEADING_DIGITS;

/// Parse a segment count, keeping only the leading digit run (`70+` -> 70).
pub fn parse_segments(s: &str) -> Option<i64> {
    LEADING_DIGITS
        .find(s.trim())
        .and_then(|m| m.as_str().parse().ok())
}

/// Parse a driving distance in kilometres.
pub fn parse_distance(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|d| d.is_finite())
}
