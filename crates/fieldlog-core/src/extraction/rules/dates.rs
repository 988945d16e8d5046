//! Collection date normalization.

use super::patterns::MONTH_DAY;

/// Year assumed for `M.D` shorthand dates unless configured otherwise.
pub const DEFAULT_YEAR: i32 = 2025;

/// Normalize a captured date.
///
/// Bare `month.day` shorthand (`8.10`) becomes `YYYY-MM-DD` using
/// `default_year`. Anything else is returned verbatim; no calendar validation
/// is performed.
pub fn normalize_date(raw: &str, default_year: i32) -> String {
    let raw = raw.trim();

    match MONTH_DAY.captures(raw) {
        Some(caps) => format!("{:04}-{:0>2}-{:0>2}", default_year, &caps[1], &caps[2]),
        None => raw.to_string(),
    }
}
