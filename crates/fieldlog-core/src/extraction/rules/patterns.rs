//! Common regex patterns for field-collection report extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Separator between a label and its value (full-width or ASCII colon).
pub const LABEL_SEPARATOR: &str = r"[：:]";

/// Horizontal padding between a separator and the value. Never crosses a line.
pub const PADDING: &str = r"[^\S\n]*";

/// Characters that always end a free-text value.
pub const TEXT_DELIMITERS: &str = r"[，,\n]";

/// Free-text value, shortest run that reaches a delimiter or the next label.
pub const TEXT_VALUE: &str = r"[^，,\n]+?";

/// Leading digit run; trailing qualifiers such as `+` stay outside the capture.
pub const INTEGER_VALUE: &str = r"\d+";

/// Decimal number (`273`, `120.5`).
pub const DECIMAL_VALUE: &str = r"[0-9.]+";

/// Date as written in reports (`2025-01-10`, `2025/1/10`, `8.10`).
pub const DATE_VALUE: &str = r"[0-9./\-]+";

/// Generic segment count fallback: `采集了6段`.
pub const SEGMENTS_FALLBACK: &str = r"(\d+)\s*段";

/// Generic distance fallback: `156.8公里`.
pub const DISTANCE_FALLBACK: &str = r"([0-9.]+)\s*公里";

lazy_static! {
    // Bare month.day shorthand, e.g. "8.10"
    pub static ref MONTH_DAY: Regex = Regex::new(
        r"^(\d{1,2})\.(\d{1,2})$"
    ).unwrap();

    // Leading digits of a segment capture
    pub static ref LEADING_DIGITS: Regex = Regex::new(
        r"^\d+"
    ).unwrap();
}
