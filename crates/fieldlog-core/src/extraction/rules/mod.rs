//! Rule-based field extractors for field-collection reports.

pub mod cascade;
pub mod dates;
pub mod numbers;
pub mod patterns;
pub mod period;
pub mod profiles;
pub mod ruleset;

pub use cascade::{Cascade, ValueClass};
pub use dates::{normalize_date, DEFAULT_YEAR};
pub use numbers::{parse_distance, parse_segments};
pub use period::TimePeriodDetector;
pub use profiles::Profile;
pub use ruleset::{RuleDef, RuleSet, RuleSetDef};

use crate::models::report::Field;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Every candidate match, in priority order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A field value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Field the value belongs to.
    pub field: Field,
    /// Extracted value.
    pub value: T,
    /// Index of the rule (or keyword) that produced the value.
    pub rule: usize,
    /// Byte span in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(field: Field, value: T, rule: usize, source: impl Into<String>) -> Self {
        Self {
            field,
            value,
            rule,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    /// Replace the value, keeping provenance.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExtractionMatch<U> {
        ExtractionMatch {
            field: self.field,
            value: f(self.value),
            rule: self.rule,
            position: self.position,
            source: self.source,
        }
    }
}
