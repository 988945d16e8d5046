//! Report field extraction module.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, ReportExtractor};

use crate::models::report::ExtractedReport;

/// Trait for report parsers.
///
/// Parsing never fails: fields without a match are left unset.
pub trait ReportParser {
    /// Extract the structured report from raw text.
    fn extract(&self, text: &str) -> ExtractedReport;

    /// Extract the report with per-field diagnostics.
    fn parse(&self, text: &str) -> ExtractionResult;
}
