//! Driver field-collection report data models.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};

/// Format SQLite's `CURRENT_TIMESTAMP` produces (UTC).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Serialize an optional timestamp in [`TIMESTAMP_FORMAT`].
pub fn serialize_timestamp<S>(at: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match at {
        Some(at) => serializer.collect_str(&at.format(TIMESTAMP_FORMAT)),
        None => serializer.serialize_none(),
    }
}

/// Structured fields extracted from one free-text report.
///
/// Every field is independently optional; `raw_text` always holds the exact
/// input the record was extracted from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedReport {
    /// Driver / collector name.
    pub driver_name: Option<String>,

    /// Vehicle number or plate.
    pub vehicle_number: Option<String>,

    /// Collection task description.
    pub collection_task: Option<String>,

    /// Number of collected segments.
    pub collection_segments: Option<i64>,

    /// Collection location.
    pub collection_location: Option<String>,

    /// Collection date, `YYYY-MM-DD` when normalized from `M.D` shorthand.
    pub collection_date: Option<String>,

    /// Day or night collection.
    pub collection_time_period: Option<TimePeriod>,

    /// Distance driven, in kilometres.
    pub driving_distance: Option<f64>,

    /// Original report text.
    pub raw_text: String,
}

impl ExtractedReport {
    /// Create an empty report holding only the raw text.
    pub fn new(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            ..Default::default()
        }
    }

    /// Whether the given field carries a value.
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::DriverName => self.driver_name.is_some(),
            Field::VehicleNumber => self.vehicle_number.is_some(),
            Field::CollectionTask => self.collection_task.is_some(),
            Field::CollectionSegments => self.collection_segments.is_some(),
            Field::CollectionLocation => self.collection_location.is_some(),
            Field::CollectionDate => self.collection_date.is_some(),
            Field::CollectionTimePeriod => self.collection_time_period.is_some(),
            Field::DrivingDistance => self.driving_distance.is_some(),
        }
    }

    /// Fields that were not extracted.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL.iter().copied().filter(|f| !self.has(*f)).collect()
    }
}

/// Time of day a collection run took place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimePeriod {
    /// Daytime (白天).
    Day,
    /// Night-time (夜晚).
    Night,
}

impl TimePeriod {
    /// Label used in storage and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Day => "白天",
            Self::Night => "夜晚",
        }
    }

    /// Parse from a stored label or the English name.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "白天" | "day" => Some(Self::Day),
            "夜晚" | "night" => Some(Self::Night),
            _ => None,
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The extracted fields of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    DriverName,
    VehicleNumber,
    CollectionTask,
    CollectionSegments,
    CollectionLocation,
    CollectionDate,
    CollectionTimePeriod,
    DrivingDistance,
}

impl Field {
    /// All fields in storage column order.
    pub const ALL: [Field; 8] = [
        Field::DriverName,
        Field::VehicleNumber,
        Field::CollectionTask,
        Field::CollectionSegments,
        Field::CollectionLocation,
        Field::CollectionDate,
        Field::CollectionTimePeriod,
        Field::DrivingDistance,
    ];

    /// Storage column name.
    pub fn column(&self) -> &'static str {
        match self {
            Self::DriverName => "driver_name",
            Self::VehicleNumber => "vehicle_number",
            Self::CollectionTask => "collection_task",
            Self::CollectionSegments => "collection_segments",
            Self::CollectionLocation => "collection_location",
            Self::CollectionDate => "collection_date",
            Self::CollectionTimePeriod => "collection_time_period",
            Self::DrivingDistance => "driving_distance",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A report as held by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReport {
    /// Identifier assigned by the store.
    pub id: i64,

    /// Creation timestamp assigned by the store.
    pub created_at: NaiveDateTime,

    /// The extracted report.
    #[serde(flatten)]
    pub report: ExtractedReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_period_labels() {
        assert_eq!(TimePeriod::Day.label(), "白天");
        assert_eq!(TimePeriod::from_label("夜晚"), Some(TimePeriod::Night));
        assert_eq!(TimePeriod::from_label("Day"), Some(TimePeriod::Day));
        assert_eq!(TimePeriod::from_label("dusk"), None);
    }

    #[test]
    fn test_missing_fields() {
        let mut report = ExtractedReport::new("采集员：张三");
        report.driver_name = Some("张三".to_string());

        let missing = report.missing_fields();
        assert_eq!(missing.len(), 7);
        assert!(!missing.contains(&Field::DriverName));
    }

    #[test]
    fn test_stored_report_json_is_flat() {
        let stored = StoredReport {
            id: 7,
            created_at: NaiveDateTime::parse_from_str("2025-08-10 09:30:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            report: ExtractedReport {
                collection_time_period: Some(TimePeriod::Night),
                ..ExtractedReport::new("夜晚")
            },
        };

        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["collection_time_period"], "night");
        assert_eq!(json["raw_text"], "夜晚");
    }
}
