//! Cascade-driven report extractor.

use std::sync::Arc;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

use tracing::{debug, info};

use crate::models::report::{ExtractedReport, Field};

use super::rules::{
    normalize_date, parse_distance, parse_segments, ExtractionMatch, FieldExtractor, Profile,
    RuleSet, DEFAULT_YEAR,
};
use super::ReportParser;

/// Result of report extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted report.
    pub report: ExtractedReport,
    /// Winning match per extracted field, values as captured.
    pub matches: Vec<ExtractionMatch<String>>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Extracts reports using one compiled rule set.
#[derive(Debug, Clone)]
pub struct ReportExtractor {
    /// Compiled field cascades and time period keywords.
    rules: Arc<RuleSet>,
    /// Year assumed for `M.D` shorthand dates.
    default_year: i32,
}

impl ReportExtractor {
    /// Create an extractor with the standard profile and default year.
    pub fn new() -> Self {
        Self {
            rules: Profile::Standard.rules(),
            default_year: DEFAULT_YEAR,
        }
    }

    /// Use a built-in profile.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.rules = profile.rules();
        self
    }

    /// Use a custom compiled rule set.
    pub fn with_rules(mut self, rules: Arc<RuleSet>) -> Self {
        self.rules = rules;
        self
    }

    /// Set the year used when normalizing `M.D` dates.
    pub fn with_default_year(mut self, year: i32) -> Self {
        self.default_year = year;
        self
    }

    /// Name of the active rule set.
    pub fn rules_name(&self) -> &str {
        self.rules.name()
    }

    /// The configured default year.
    pub fn default_year(&self) -> i32 {
        self.default_year
    }

    fn capture(&self, field: Field, text: &str) -> Option<ExtractionMatch<String>> {
        self.rules.cascade(field).and_then(|c| c.extract(text))
    }

    /// Run every cascade, returning the report, winning matches and warnings.
    fn extract_fields(
        &self,
        text: &str,
    ) -> (ExtractedReport, Vec<ExtractionMatch<String>>, Vec<String>) {
        let mut report = ExtractedReport::new(text);
        let mut matches = Vec::new();
        let mut warnings = Vec::new();
        let mut unconverted = Vec::new();

        info!(
            "Extracting report from {} characters with '{}' rules",
            text.len(),
            self.rules.name()
        );

        for field in Field::ALL {
            if field == Field::CollectionTimePeriod {
                if let Some(m) = self.rules.period().extract(text) {
                    report.collection_time_period = Some(m.value);
                    matches.push(m.map(|p| p.label().to_string()));
                }
                continue;
            }

            let Some(m) = self.capture(field, text) else {
                continue;
            };

            let assigned = match field {
                Field::DriverName => {
                    report.driver_name = Some(m.value.clone());
                    true
                }
                Field::VehicleNumber => {
                    report.vehicle_number = Some(m.value.clone());
                    true
                }
                Field::CollectionTask => {
                    report.collection_task = Some(m.value.clone());
                    true
                }
                Field::CollectionLocation => {
                    report.collection_location = Some(m.value.clone());
                    true
                }
                Field::CollectionDate => {
                    report.collection_date = Some(normalize_date(&m.value, self.default_year));
                    true
                }
                Field::CollectionSegments => {
                    report.collection_segments = parse_segments(&m.value);
                    report.collection_segments.is_some()
                }
                Field::DrivingDistance => {
                    report.driving_distance = parse_distance(&m.value);
                    report.driving_distance.is_some()
                }
                Field::CollectionTimePeriod => false,
            };

            if assigned {
                matches.push(m);
            } else {
                warnings.push(format!("{field}: '{}' is not a number", m.value));
                unconverted.push(field);
            }
        }

        let missing = report.missing_fields();
        for field in missing.iter().filter(|f| !unconverted.contains(f)) {
            warnings.push(format!("Could not extract {field}"));
        }

        debug!(
            "Extracted {} of {} fields",
            Field::ALL.len() - missing.len(),
            Field::ALL.len()
        );

        (report, matches, warnings)
    }
}

impl Default for ReportExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportParser for ReportExtractor {
    fn extract(&self, text: &str) -> ExtractedReport {
        self.extract_fields(text).0
    }

    fn parse(&self, text: &str) -> ExtractionResult {
        // std has no clock on wasm32-unknown-unknown.
        #[cfg(not(target_arch = "wasm32"))]
        let start = Instant::now();

        let (report, matches, warnings) = self.extract_fields(text);

        #[cfg(not(target_arch = "wasm32"))]
        let processing_time_ms = start.elapsed().as_millis() as u64;
        #[cfg(target_arch = "wasm32")]
        let processing_time_ms = 0;

        ExtractionResult {
            report,
            matches,
            warnings,
            processing_time_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::rules::{RuleDef, RuleSetDef};
    use crate::models::report::TimePeriod;
    use pretty_assertions::assert_eq;

    const SINGLE_LINE: &str = "采集员：方少东车辆编号：LY-005-31781采集任务：黄灯闪烁路口/与行人二轮车交互采集段数：70+采集地点：合肥采集日期：8.10采集时段：白天行驶里程:  273";

    const MULTI_LINE: &str = r#"
        采集员：张三
        车辆编号：京A12345
        采集任务：北京市区道路采集
        采集段数：5
        采集地点：北京
        采集日期：2025-01-10
        采集时段：白天
        行驶里程：120.5公里
    "#;

    #[test]
    fn test_single_line_report() {
        let report = ReportExtractor::new().extract(SINGLE_LINE);

        assert_eq!(
            report,
            ExtractedReport {
                driver_name: Some("方少东".to_string()),
                vehicle_number: Some("LY-005-31781".to_string()),
                collection_task: Some("黄灯闪烁路口/与行人二轮车交互".to_string()),
                collection_segments: Some(70),
                collection_location: Some("合肥".to_string()),
                collection_date: Some("2025-08-10".to_string()),
                collection_time_period: Some(TimePeriod::Day),
                driving_distance: Some(273.0),
                raw_text: SINGLE_LINE.to_string(),
            }
        );
    }

    #[test]
    fn test_multi_line_report() {
        let report = ReportExtractor::new().extract(MULTI_LINE);

        assert_eq!(report.driver_name.as_deref(), Some("张三"));
        assert_eq!(report.vehicle_number.as_deref(), Some("京A12345"));
        assert_eq!(report.collection_task.as_deref(), Some("北京市区道路采集"));
        assert_eq!(report.collection_segments, Some(5));
        assert_eq!(report.collection_location.as_deref(), Some("北京"));
        assert_eq!(report.collection_date.as_deref(), Some("2025-01-10"));
        assert_eq!(report.collection_time_period, Some(TimePeriod::Day));
        assert_eq!(report.driving_distance, Some(120.5));
        assert_eq!(report.raw_text, MULTI_LINE);
    }

    #[test]
    fn test_empty_input() {
        let result = ReportExtractor::new().parse("");

        assert_eq!(result.report, ExtractedReport::new(""));
        assert!(result.matches.is_empty());
        assert_eq!(result.warnings.len(), Field::ALL.len());
    }

    #[test]
    fn test_unrecognized_text() {
        let text = "今天天气不错，没有什么要汇报的。";
        let report = ReportExtractor::new().extract(text);

        assert_eq!(report, ExtractedReport::new(text));
    }

    #[test]
    fn test_idempotent() {
        let extractor = ReportExtractor::new();
        assert_eq!(extractor.extract(SINGLE_LINE), extractor.extract(SINGLE_LINE));
    }

    #[test]
    fn test_day_priority() {
        let report = ReportExtractor::new().extract("采集时段：夜晚转白天");
        assert_eq!(report.collection_time_period, Some(TimePeriod::Day));
    }

    #[test]
    fn test_labelled_distance_beats_fallback() {
        let text = "途经150公里高速\n行驶里程：88.8公里";
        let result = ReportExtractor::new().parse(text);

        assert_eq!(result.report.driving_distance, Some(88.8));
        let m = result
            .matches
            .iter()
            .find(|m| m.field == Field::DrivingDistance)
            .unwrap();
        assert_eq!(m.rule, 0);
    }

    #[test]
    fn test_distance_fallback() {
        let report = ReportExtractor::new().extract("今天共跑了 156.8 公里");
        assert_eq!(report.driving_distance, Some(156.8));
    }

    #[test]
    fn test_unparseable_number_left_unset() {
        let result = ReportExtractor::new().parse("行驶里程：1.2.3公里");

        assert_eq!(result.report.driving_distance, None);
        let distance_warnings: Vec<&String> = result
            .warnings
            .iter()
            .filter(|w| w.contains("driving_distance"))
            .collect();
        assert_eq!(distance_warnings.len(), 1);
        assert!(distance_warnings[0].contains("not a number"));
        assert_eq!(result.warnings.len(), Field::ALL.len());
    }

    #[test]
    fn test_text_stops_at_time_period_label() {
        for profile in Profile::ALL {
            let extractor = ReportExtractor::new().with_profile(profile);

            let report = extractor.extract("采集地点：合肥采集时段：白天行驶里程: 273");
            assert_eq!(report.collection_location.as_deref(), Some("合肥"));
            assert_eq!(report.collection_time_period, Some(TimePeriod::Day));
            assert_eq!(report.driving_distance, Some(273.0));

            let report = extractor.extract("采集员：方少东采集时段：夜晚");
            assert_eq!(report.driver_name.as_deref(), Some("方少东"));
            assert_eq!(report.collection_time_period, Some(TimePeriod::Night));

            let report = extractor.extract("采集任务：黄灯闪烁路口采集时段：白天");
            assert_eq!(report.collection_task.as_deref(), Some("黄灯闪烁路口"));

            let report = extractor.extract("车辆编号：LY-005时段：白天");
            assert_eq!(report.vehicle_number.as_deref(), Some("LY-005"));
        }
    }

    #[test]
    fn test_default_year_injected() {
        let report = ReportExtractor::new()
            .with_default_year(2024)
            .extract("采集日期：3.7");
        assert_eq!(report.collection_date.as_deref(), Some("2024-03-07"));
    }

    #[test]
    fn test_extended_profile() {
        let text = r#"
        司机：王五
        车牌：粤C11111
        项目：广州市区智驾测试
        段数：3
        位置：广州
        时间：2025-01-12
        上午采集
        距离：85.7公里
        "#;

        let standard = ReportExtractor::new().extract(text);
        assert_eq!(standard.driver_name, None);
        assert_eq!(standard.collection_time_period, None);
        assert_eq!(standard.driving_distance, Some(85.7));

        let report = ReportExtractor::new()
            .with_profile(Profile::Extended)
            .extract(text);
        assert_eq!(report.driver_name.as_deref(), Some("王五"));
        assert_eq!(report.vehicle_number.as_deref(), Some("粤C11111"));
        assert_eq!(report.collection_task.as_deref(), Some("广州市区智驾测试"));
        assert_eq!(report.collection_segments, Some(3));
        assert_eq!(report.collection_location.as_deref(), Some("广州"));
        assert_eq!(report.collection_date.as_deref(), Some("2025-01-12"));
        assert_eq!(report.collection_time_period, Some(TimePeriod::Day));
        assert_eq!(report.driving_distance, Some(85.7));
    }

    #[test]
    fn test_extended_segment_fallback() {
        let report = ReportExtractor::new()
            .with_profile(Profile::Extended)
            .extract("北京环路，采集了6段，夜间作业");

        assert_eq!(report.collection_segments, Some(6));
        assert_eq!(report.collection_time_period, Some(TimePeriod::Night));
    }

    #[test]
    fn test_custom_rules() {
        let def = RuleSetDef {
            name: "custom".into(),
            driver_name: vec![RuleDef::label("Driver")],
            driving_distance: vec![RuleDef::pattern(r"(\d+(?:\.\d+)?)\s*km")],
            night_keywords: vec!["night".into()],
            ..Default::default()
        };
        let rules = Arc::new(RuleSet::compile(&def).unwrap());

        let extractor = ReportExtractor::new().with_rules(rules);
        let report = extractor.extract("Driver: Li Wei, 42.5 km at night");

        assert_eq!(extractor.rules_name(), "custom");
        assert_eq!(report.driver_name.as_deref(), Some("Li Wei"));
        assert_eq!(report.driving_distance, Some(42.5));
        assert_eq!(report.collection_time_period, Some(TimePeriod::Night));
    }
}
