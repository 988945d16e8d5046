//! SQLite persistence for extracted reports.

use std::path::Path;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::report::{ExtractedReport, StoredReport, TimePeriod};
use crate::summary::ReportSource;

pub use crate::models::report::TIMESTAMP_FORMAT;

const SELECT_COLUMNS: &str = "SELECT id, driver_name, vehicle_number, collection_task, \
     collection_segments, collection_location, collection_date, collection_time_period, \
     driving_distance, raw_text, created_at FROM driver_reports";

/// Append-only store of extracted reports.
pub struct ReportStore {
    conn: Connection,
}

impl ReportStore {
    /// Opens (or creates) the report database at the given path.
    ///
    /// Creates the `driver_reports` table if it doesn't already exist.
    pub fn open_or_create(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        info!("Opened report store at {}", path.display());
        Self::init(conn)
    }

    /// In-memory database, mainly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS driver_reports (
                id                     INTEGER PRIMARY KEY AUTOINCREMENT,
                driver_name            TEXT,
                vehicle_number         TEXT,
                collection_task        TEXT,
                collection_segments    INTEGER,
                collection_location    TEXT,
                collection_date        TEXT,
                collection_time_period TEXT,
                driving_distance       REAL,
                raw_text               TEXT,
                created_at             TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_driver_reports_created ON driver_reports(created_at);",
        )?;

        Ok(Self { conn })
    }

    /// Append a report. The store assigns the id and creation timestamp.
    pub fn insert(&self, report: &ExtractedReport) -> Result<StoredReport, StoreError> {
        self.conn.execute(
            "INSERT INTO driver_reports
                (driver_name, vehicle_number, collection_task, collection_segments,
                 collection_location, collection_date, collection_time_period,
                 driving_distance, raw_text)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                report.driver_name,
                report.vehicle_number,
                report.collection_task,
                report.collection_segments,
                report.collection_location,
                report.collection_date,
                report.collection_time_period.map(|p| p.label()),
                report.driving_distance,
                report.raw_text,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Stored report {}", id);

        self.get(id)?.ok_or(StoreError::NotFound(id))
    }

    /// Fetch a report by id.
    pub fn get(&self, id: i64) -> Result<Option<StoredReport>, StoreError> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let row = self
            .conn
            .query_row(&sql, params![id], read_row)
            .optional()?;

        row.map(into_stored).transpose()
    }

    /// Every stored report, in insertion order.
    pub fn list_all(&self) -> Result<Vec<StoredReport>, StoreError> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY id ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(into_stored).collect()
    }

    /// Number of stored reports.
    pub fn count(&self) -> Result<u64, StoreError> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM driver_reports", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

impl ReportSource for ReportStore {
    fn load_all(&self) -> Result<Vec<StoredReport>, StoreError> {
        self.list_all()
    }
}

/// A row as read, before the timestamp is parsed.
struct RawRow {
    id: i64,
    report: ExtractedReport,
    created_at: String,
}

fn read_row(row: &Row) -> rusqlite::Result<RawRow> {
    let period: Option<String> = row.get(7)?;

    Ok(RawRow {
        id: row.get(0)?,
        report: ExtractedReport {
            driver_name: row.get(1)?,
            vehicle_number: row.get(2)?,
            collection_task: row.get(3)?,
            collection_segments: row.get(4)?,
            collection_location: row.get(5)?,
            collection_date: row.get(6)?,
            collection_time_period: period.as_deref().and_then(TimePeriod::from_label),
            driving_distance: row.get(8)?,
            raw_text: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
        },
        created_at: row.get(10)?,
    })
}

fn into_stored(raw: RawRow) -> Result<StoredReport, StoreError> {
    let created_at = NaiveDateTime::parse_from_str(&raw.created_at, TIMESTAMP_FORMAT)
        .map_err(|_| StoreError::Timestamp {
            id: raw.id,
            value: raw.created_at.clone(),
        })?;

    Ok(StoredReport {
        id: raw.id,
        created_at,
        report: raw.report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::{ReportExtractor, ReportParser};
    use crate::summary::{collection_summary, SummaryOutcome};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, ReportStore) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("driver_data.db");
        let store = ReportStore::open_or_create(&path).unwrap();
        (dir, store)
    }

    #[test]
    fn creates_empty_store() {
        let (_dir, store) = test_store();
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn idempotent_creation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("driver_data.db");

        let first = ReportStore::open_or_create(&path).unwrap();
        first.insert(&ExtractedReport::new("x")).unwrap();
        drop(first);

        let second = ReportStore::open_or_create(&path).unwrap();
        assert_eq!(second.count().unwrap(), 1);
    }

    #[test]
    fn insert_round_trips_fields() {
        let (_dir, store) = test_store();
        let text = "采集员：钱七\n采集段数：4\n采集时段：白天\n行驶里程：98.2公里";
        let report = ReportExtractor::new().extract(text);

        let stored = store.insert(&report).unwrap();
        assert_eq!(stored.id, 1);
        assert_eq!(stored.report, report);
        assert_eq!(stored.report.raw_text, text);

        let fetched = store.get(stored.id).unwrap().unwrap();
        assert_eq!(fetched, stored);
    }

    #[test]
    fn ids_increase() {
        let store = ReportStore::open_in_memory().unwrap();
        let a = store.insert(&ExtractedReport::new("a")).unwrap();
        let b = store.insert(&ExtractedReport::new("b")).unwrap();

        assert!(b.id > a.id);
        let ids: Vec<i64> = store.list_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn missing_report_is_none() {
        let store = ReportStore::open_in_memory().unwrap();
        assert!(store.get(42).unwrap().is_none());
    }

    #[test]
    fn time_period_stored_as_label() {
        let store = ReportStore::open_in_memory().unwrap();
        let mut report = ExtractedReport::new("夜间");
        report.collection_time_period = Some(TimePeriod::Night);
        store.insert(&report).unwrap();

        let label: String = store
            .conn
            .query_row(
                "SELECT collection_time_period FROM driver_reports",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(label, "夜晚");
    }

    #[test]
    fn bad_timestamp_is_an_error() {
        let store = ReportStore::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO driver_reports (raw_text, created_at) VALUES ('x', 'yesterday')",
                [],
            )
            .unwrap();

        assert!(matches!(
            store.list_all(),
            Err(StoreError::Timestamp { .. })
        ));
        assert!(matches!(
            collection_summary(&store),
            SummaryOutcome::Failed { .. }
        ));
    }

    #[test]
    fn summary_over_store() {
        let store = ReportStore::open_in_memory().unwrap();
        assert!(collection_summary(&store).is_no_data());

        let extractor = ReportExtractor::new();
        store
            .insert(&extractor.extract("采集员：李四\n采集地点：上海\n行驶里程：200.3公里"))
            .unwrap();
        store
            .insert(&extractor.extract("姓名：王五\n地点：广州\n里程：85.7"))
            .unwrap();
        store.insert(&extractor.extract("采集员：李四")).unwrap();

        let outcome = collection_summary(&store);
        let summary = outcome.summary().unwrap();
        assert_eq!(summary.total_reports, 3);
        assert_eq!(summary.total_drivers, 2);
        assert!((summary.total_distance - 286.0).abs() < 1e-9);
        assert!(summary.latest_update.is_some());
    }
}
