//! Corpus-level statistics over stored reports.
//!
//! The reporter never owns the records: it reads them from a [`ReportSource`]
//! (the persistence collaborator) in a single pass. A failed read is turned
//! into a [`SummaryOutcome::Failed`] value instead of being propagated.

mod distribution;

pub use distribution::Distribution;

use std::collections::HashSet;

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::report::{serialize_timestamp, StoredReport};

/// Message carried by the empty-corpus sentinel.
pub const NO_DATA_MESSAGE: &str = "暂无数据";

/// Read access to previously stored reports.
pub trait ReportSource {
    /// Load every stored report.
    fn load_all(&self) -> Result<Vec<StoredReport>, StoreError>;
}

impl ReportSource for [StoredReport] {
    fn load_all(&self) -> Result<Vec<StoredReport>, StoreError> {
        Ok(self.to_vec())
    }
}

impl ReportSource for Vec<StoredReport> {
    fn load_all(&self) -> Result<Vec<StoredReport>, StoreError> {
        Ok(self.clone())
    }
}

/// Aggregate statistics over a non-empty set of reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Number of reports.
    pub total_reports: usize,
    /// Distinct driver names.
    pub total_drivers: usize,
    /// Sum of segment counts where set.
    pub total_segments: i64,
    /// Sum of distances where set.
    pub total_distance: f64,
    /// Location occurrence counts, most frequent first.
    pub locations: Distribution,
    /// Time period occurrence counts, most frequent first.
    pub time_periods: Distribution,
    /// Most recent storage timestamp.
    #[serde(serialize_with = "serialize_timestamp")]
    pub latest_update: Option<NaiveDateTime>,
}

/// Outcome of a summary request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SummaryOutcome {
    /// Statistics over at least one report.
    Ready(Summary),
    /// The corpus is empty.
    NoData { message: String },
    /// Reading from the store failed.
    Failed { error: String },
}

impl SummaryOutcome {
    /// The empty-corpus sentinel.
    pub fn no_data() -> Self {
        Self::NoData {
            message: NO_DATA_MESSAGE.to_string(),
        }
    }

    /// A read failure carrying the underlying message.
    pub fn failed(err: &StoreError) -> Self {
        Self::Failed {
            error: format!("collaborator read failed: {err}"),
        }
    }

    /// The summary, if there is one.
    pub fn summary(&self) -> Option<&Summary> {
        match self {
            Self::Ready(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData { .. })
    }
}

/// Summarize a set of stored reports.
pub fn summarize(records: &[StoredReport]) -> SummaryOutcome {
    if records.is_empty() {
        return SummaryOutcome::no_data();
    }

    let drivers: HashSet<&str> = records
        .iter()
        .filter_map(|r| r.report.driver_name.as_deref())
        .collect();

    let total_segments: i64 = records
        .iter()
        .filter_map(|r| r.report.collection_segments)
        .sum();

    let total_distance: f64 = records
        .iter()
        .filter_map(|r| r.report.driving_distance)
        .fold(0.0, |acc, d| acc + d);

    let locations = Distribution::count(
        records
            .iter()
            .filter_map(|r| r.report.collection_location.as_deref()),
    );

    let time_periods = Distribution::count(
        records
            .iter()
            .filter_map(|r| r.report.collection_time_period.map(|p| p.label())),
    );

    let latest_update = records.iter().map(|r| r.created_at).max();

    debug!(
        "Summarized {} reports from {} drivers",
        records.len(),
        drivers.len()
    );

    SummaryOutcome::Ready(Summary {
        total_reports: records.len(),
        total_drivers: drivers.len(),
        total_segments,
        total_distance,
        locations,
        time_periods,
        latest_update,
    })
}

/// Read every report from `source` and summarize it.
pub fn collection_summary<S: ReportSource + ?Sized>(source: &S) -> SummaryOutcome {
    match source.load_all() {
        Ok(records) => summarize(&records),
        Err(e) => {
            warn!("Failed to read reports for summary: {}", e);
            SummaryOutcome::failed(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::{ExtractedReport, TimePeriod};
    use pretty_assertions::assert_eq;

    fn stored(id: i64, at: &str, report: ExtractedReport) -> StoredReport {
        StoredReport {
            id,
            created_at: NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M:%S").unwrap(),
            report,
        }
    }

    fn sample() -> Vec<StoredReport> {
        vec![
            stored(
                1,
                "2025-01-11 08:00:00",
                ExtractedReport {
                    driver_name: Some("李四".into()),
                    collection_segments: Some(8),
                    collection_location: Some("上海".into()),
                    collection_time_period: Some(TimePeriod::Night),
                    driving_distance: Some(200.3),
                    ..ExtractedReport::new("a")
                },
            ),
            stored(
                2,
                "2025-01-12 09:30:00",
                ExtractedReport {
                    driver_name: Some("王五".into()),
                    collection_segments: Some(3),
                    collection_location: Some("广州".into()),
                    collection_time_period: Some(TimePeriod::Day),
                    driving_distance: Some(85.7),
                    ..ExtractedReport::new("b")
                },
            ),
            stored(
                3,
                "2025-01-10 23:59:00",
                ExtractedReport {
                    driver_name: Some("李四".into()),
                    collection_location: Some("广州".into()),
                    collection_time_period: Some(TimePeriod::Day),
                    ..ExtractedReport::new("c")
                },
            ),
        ]
    }

    #[test]
    fn test_empty_is_no_data() {
        let outcome = summarize(&[]);
        assert!(outcome.is_no_data());
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!({"message": "暂无数据"})
        );
    }

    #[test]
    fn test_all_unset_is_not_no_data() {
        let records = vec![stored(1, "2025-01-01 00:00:00", ExtractedReport::new("?"))];
        let summary = summarize(&records).summary().cloned().unwrap();

        assert_eq!(summary.total_reports, 1);
        assert_eq!(summary.total_drivers, 0);
        assert_eq!(summary.total_segments, 0);
        assert_eq!(summary.total_distance, 0.0);
        assert!(summary.locations.is_empty());
    }

    #[test]
    fn test_totals() {
        let outcome = summarize(&sample());
        let summary = outcome.summary().unwrap();

        assert_eq!(summary.total_reports, 3);
        assert_eq!(summary.total_drivers, 2);
        assert_eq!(summary.total_segments, 11);
        assert!((summary.total_distance - 286.0).abs() < 1e-9);
        assert_eq!(
            summary.latest_update.unwrap().to_string(),
            "2025-01-12 09:30:00"
        );
    }

    #[test]
    fn test_latest_update_json_format() {
        let json = serde_json::to_value(summarize(&sample())).unwrap();
        assert_eq!(json["latest_update"], "2025-01-12 09:30:00");
    }

    #[test]
    fn test_distributions_descending() {
        let outcome = summarize(&sample());
        let summary = outcome.summary().unwrap();

        assert_eq!(
            summary.locations.entries(),
            &[("广州".to_string(), 2), ("上海".to_string(), 1)]
        );
        assert_eq!(
            summary.time_periods.entries(),
            &[("白天".to_string(), 2), ("夜晚".to_string(), 1)]
        );
    }

    struct BrokenSource;

    impl ReportSource for BrokenSource {
        fn load_all(&self) -> Result<Vec<StoredReport>, StoreError> {
            Err(StoreError::Other("disk on fire".into()))
        }
    }

    #[test]
    fn test_read_failure_is_reported() {
        let outcome = collection_summary(&BrokenSource);

        match &outcome {
            SummaryOutcome::Failed { error } => assert!(error.contains("disk on fire")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(serde_json::to_value(&outcome).unwrap()["error"].is_string());
    }

    #[test]
    fn test_summary_from_vec_source() {
        let records = sample();
        assert_eq!(collection_summary(&records), summarize(&records));
    }
}
