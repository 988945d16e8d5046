//! Prioritized pattern cascades.
//!
//! A cascade is an ordered list of compiled rules for one field. Rules are
//! tried in order and the first one that matches anywhere in the text wins;
//! later rules are never consulted once an earlier rule has matched.

use regex::Regex;
use tracing::trace;

use crate::error::RuleError;
use crate::models::report::Field;

use super::patterns::{
    DATE_VALUE, DECIMAL_VALUE, INTEGER_VALUE, LABEL_SEPARATOR, PADDING, TEXT_DELIMITERS,
    TEXT_VALUE,
};
use super::ruleset::RuleDef;
use super::{ExtractionMatch, FieldExtractor};

/// Shape of the value a labelled rule captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueClass {
    /// Free text, bounded by delimiters and the next known label.
    Text,
    /// Leading digit run.
    Integer,
    /// Decimal number.
    Decimal,
    /// Date as written.
    Date,
}

impl ValueClass {
    /// The value class of an extracted field.
    pub fn of(field: Field) -> Self {
        match field {
            Field::CollectionSegments => Self::Integer,
            Field::DrivingDistance => Self::Decimal,
            Field::CollectionDate => Self::Date,
            _ => Self::Text,
        }
    }

    fn value_pattern(&self) -> &'static str {
        match self {
            Self::Text => TEXT_VALUE,
            Self::Integer => INTEGER_VALUE,
            Self::Decimal => DECIMAL_VALUE,
            Self::Date => DATE_VALUE,
        }
    }
}

/// Build the regex source for a labelled rule.
///
/// `boundary` is an alternation of every label known to the rule set; text
/// values stop right before the first of them followed by a separator.
pub fn labelled_pattern(label: &str, class: ValueClass, boundary: Option<&str>) -> String {
    let head = format!(
        "{}{}{}({})",
        regex::escape(label),
        LABEL_SEPARATOR,
        PADDING,
        class.value_pattern()
    );

    match (class, boundary) {
        (ValueClass::Text, Some(labels)) => format!(
            "{head}{PADDING}(?:(?:{labels}){LABEL_SEPARATOR}|{TEXT_DELIMITERS}|$)"
        ),
        (ValueClass::Text, None) => format!("{head}{PADDING}(?:{TEXT_DELIMITERS}|$)"),
        _ => head,
    }
}

/// Build the label alternation used to bound free-text values.
pub fn label_boundary<'a>(labels: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut labels: Vec<&str> = labels.into_iter().filter(|l| !l.is_empty()).collect();
    if labels.is_empty() {
        return None;
    }
    labels.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    labels.dedup();

    Some(
        labels
            .iter()
            .map(|l| regex::escape(l))
            .collect::<Vec<_>>()
            .join("|"),
    )
}

/// Ordered, compiled rules for a single field.
#[derive(Debug, Clone)]
pub struct Cascade {
    field: Field,
    class: ValueClass,
    rules: Vec<Regex>,
}

impl Cascade {
    /// Compile a cascade from its rule definitions.
    pub fn compile(
        field: Field,
        defs: &[RuleDef],
        boundary: Option<&str>,
    ) -> Result<Self, RuleError> {
        let class = ValueClass::of(field);
        let mut rules = Vec::with_capacity(defs.len());

        for def in defs {
            let source = match def {
                RuleDef::Label { label } => {
                    if label.trim().is_empty() {
                        return Err(RuleError::EmptyLabel { field });
                    }
                    labelled_pattern(label.trim(), class, boundary)
                }
                RuleDef::Pattern { pattern } => pattern.clone(),
            };

            let regex = Regex::new(&source).map_err(|e| RuleError::InvalidPattern {
                field,
                pattern: source.clone(),
                reason: e.to_string(),
            })?;

            if regex.captures_len() < 2 {
                return Err(RuleError::MissingCapture {
                    field,
                    pattern: source,
                });
            }

            rules.push(regex);
        }

        Ok(Self {
            field,
            class,
            rules,
        })
    }

    /// The field this cascade extracts.
    pub fn field(&self) -> Field {
        self.field
    }

    /// Number of rules in the cascade.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the cascade has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First non-empty capture of a single rule.
    fn match_rule(&self, index: usize, text: &str) -> Option<ExtractionMatch<String>> {
        let regex = &self.rules[index];

        for caps in regex.captures_iter(text) {
            let Some(group) = caps.get(1) else {
                continue;
            };
            let value = group.as_str().trim();
            if value.is_empty() {
                // Whitespace-only text capture; look further along.
                continue;
            }

            return Some(
                ExtractionMatch::new(self.field, value.to_string(), index, group.as_str())
                    .with_position(group.start(), group.end()),
            );
        }

        None
    }
}

impl FieldExtractor for Cascade {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        for index in 0..self.rules.len() {
            if let Some(m) = self.match_rule(index, text) {
                trace!(field = %self.field, rule = index, class = ?self.class, "cascade hit");
                return Some(m);
            }
        }
        None
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        (0..self.rules.len())
            .filter_map(|index| self.match_rule(index, text))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(list: &[&str]) -> Vec<RuleDef> {
        list.iter().map(|l| RuleDef::label(*l)).collect()
    }

    #[test]
    fn test_first_rule_wins() {
        let cascade =
            Cascade::compile(Field::CollectionLocation, &labels(&["采集地点", "地点"]), None)
                .unwrap();

        let m = cascade.extract("地点：上海\n采集地点：北京").unwrap();
        assert_eq!(m.value, "北京");
        assert_eq!(m.rule, 0);
    }

    #[test]
    fn test_fallback_rule() {
        let cascade =
            Cascade::compile(Field::CollectionLocation, &labels(&["采集地点", "地点"]), None)
                .unwrap();

        let m = cascade.extract("地点：广州").unwrap();
        assert_eq!(m.value, "广州");
        assert_eq!(m.rule, 1);
    }

    #[test]
    fn test_text_stops_at_next_label() {
        let boundary = label_boundary(["采集员", "车辆编号", "采集任务"]);
        let cascade =
            Cascade::compile(Field::DriverName, &labels(&["采集员"]), boundary.as_deref())
                .unwrap();

        let m = cascade.extract("采集员：方少东车辆编号：LY-005").unwrap();
        assert_eq!(m.value, "方少东");
    }

    #[test]
    fn test_text_stops_at_delimiter() {
        let cascade = Cascade::compile(Field::DriverName, &labels(&["司机"]), None).unwrap();

        assert_eq!(cascade.extract("司机：王五，车牌：粤C11111").unwrap().value, "王五");
        assert_eq!(cascade.extract("司机:  孙八  \n").unwrap().value, "孙八");
    }

    #[test]
    fn test_padding_does_not_cross_lines() {
        let cascade =
            Cascade::compile(Field::DriverName, &labels(&["采集员", "姓名"]), None).unwrap();

        let m = cascade.extract("采集员：\n姓名：赵六").unwrap();
        assert_eq!(m.value, "赵六");
        assert_eq!(m.rule, 1);
    }

    #[test]
    fn test_integer_ignores_qualifier() {
        let cascade =
            Cascade::compile(Field::CollectionSegments, &labels(&["采集段数"]), None).unwrap();

        assert_eq!(cascade.extract("采集段数：70+").unwrap().value, "70");
    }

    #[test]
    fn test_raw_pattern_rule() {
        let defs = vec![RuleDef::label("行驶里程"), RuleDef::pattern(r"([0-9.]+)\s*公里")];
        let cascade = Cascade::compile(Field::DrivingDistance, &defs, None).unwrap();

        let m = cascade.extract("今天跑了 85.7 公里").unwrap();
        assert_eq!(m.value, "85.7");
        assert_eq!(m.rule, 1);

        let all = cascade.extract_all("行驶里程：200.3公里");
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_invalid_pattern() {
        let defs = vec![RuleDef::pattern("(unclosed")];
        let err = Cascade::compile(Field::DrivingDistance, &defs, None).unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { .. }));
    }

    #[test]
    fn test_pattern_without_capture() {
        let defs = vec![RuleDef::pattern(r"\d+公里")];
        let err = Cascade::compile(Field::DrivingDistance, &defs, None).unwrap_err();
        assert!(matches!(err, RuleError::MissingCapture { .. }));
    }

    #[test]
    fn test_empty_label() {
        let err = Cascade::compile(Field::DriverName, &labels(&["  "]), None).unwrap_err();
        assert!(matches!(err, RuleError::EmptyLabel { .. }));
    }
}
