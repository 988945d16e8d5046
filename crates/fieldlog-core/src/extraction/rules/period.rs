//! Day/night detection by keyword presence.

use crate::models::report::{Field, TimePeriod};

use super::{ExtractionMatch, FieldExtractor};

/// Infers the collection time period from keyword presence.
///
/// Day keywords are checked first; night keywords only when no day keyword
/// occurs anywhere in the text.
#[derive(Debug, Clone, Default)]
pub struct TimePeriodDetector {
    day: Vec<String>,
    night: Vec<String>,
}

impl TimePeriodDetector {
    pub fn new(day: Vec<String>, night: Vec<String>) -> Self {
        let keep = |v: Vec<String>| -> Vec<String> { v.into_iter().filter(|k| !k.is_empty()).collect() };
        Self {
            day: keep(day),
            night: keep(night),
        }
    }

    fn find(
        &self,
        text: &str,
        period: TimePeriod,
        keywords: &[String],
        offset: usize,
    ) -> Option<ExtractionMatch<TimePeriod>> {
        keywords.iter().enumerate().find_map(|(i, keyword)| {
            text.find(keyword.as_str()).map(|start| {
                ExtractionMatch::new(Field::CollectionTimePeriod, period, offset + i, keyword)
                    .with_position(start, start + keyword.len())
            })
        })
    }
}

impl FieldExtractor for TimePeriodDetector {
    type Output = ExtractionMatch<TimePeriod>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.find(text, TimePeriod::Day, &self.day, 0)
            .or_else(|| self.find(text, TimePeriod::Night, &self.night, self.day.len()))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.find(text, TimePeriod::Day, &self.day, 0)
            .into_iter()
            .chain(self.find(text, TimePeriod::Night, &self.night, self.day.len()))
            .collect()
    }
}
