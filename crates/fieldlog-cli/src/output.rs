//! Report, summary and export formatting.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use fieldlog_core::models::report::{ExtractedReport, Field, StoredReport};
use fieldlog_core::store::TIMESTAMP_FORMAT;
use fieldlog_core::summary::SummaryOutcome;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for per-report output files.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SummaryFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

/// A field's value as a display string, empty when unset.
pub fn field_value(report: &ExtractedReport, field: Field) -> String {
    match field {
        Field::DriverName => report.driver_name.clone().unwrap_or_default(),
        Field::VehicleNumber => report.vehicle_number.clone().unwrap_or_default(),
        Field::CollectionTask => report.collection_task.clone().unwrap_or_default(),
        Field::CollectionSegments => report
            .collection_segments
            .map(|n| n.to_string())
            .unwrap_or_default(),
        Field::CollectionLocation => report.collection_location.clone().unwrap_or_default(),
        Field::CollectionDate => report.collection_date.clone().unwrap_or_default(),
        Field::CollectionTimePeriod => report
            .collection_time_period
            .map(|p| p.label().to_string())
            .unwrap_or_default(),
        Field::DrivingDistance => report
            .driving_distance
            .map(|d| d.to_string())
            .unwrap_or_default(),
    }
}

pub fn format_report(report: &ExtractedReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Csv => format_csv(report),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

fn format_csv(report: &ExtractedReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(Field::ALL.iter().map(|f| f.column()))?;
    wtr.write_record(Field::ALL.iter().map(|f| field_value(report, *f)))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &ExtractedReport) -> String {
    let mut output = String::new();

    for field in Field::ALL {
        let value = field_value(report, field);
        let shown = if value.is_empty() { "-" } else { value.as_str() };
        output.push_str(&format!("{:<24}{}\n", field.column(), shown));
    }

    output
}

pub fn format_summary(outcome: &SummaryOutcome, format: SummaryFormat) -> anyhow::Result<String> {
    match format {
        SummaryFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        SummaryFormat::Text => Ok(format_summary_text(outcome)),
    }
}

fn format_summary_text(outcome: &SummaryOutcome) -> String {
    let summary = match outcome {
        SummaryOutcome::Ready(summary) => summary,
        SummaryOutcome::NoData { message } => return format!("{message}\n"),
        SummaryOutcome::Failed { error } => return format!("error: {error}\n"),
    };

    let mut output = String::new();

    output.push_str(&format!("Reports:   {}\n", summary.total_reports));
    output.push_str(&format!("Drivers:   {}\n", summary.total_drivers));
    output.push_str(&format!("Segments:  {}\n", summary.total_segments));
    output.push_str(&format!("Distance:  {:.1} km\n", summary.total_distance));
    if let Some(latest) = summary.latest_update {
        output.push_str(&format!("Updated:   {}\n", latest.format(TIMESTAMP_FORMAT)));
    }

    output.push_str("\nLocations:\n");
    for (location, count) in summary.locations.iter() {
        output.push_str(&format!("  {location}: {count}\n"));
    }

    output.push_str("\nTime periods:\n");
    for (period, count) in summary.time_periods.iter() {
        output.push_str(&format!("  {period}: {count}\n"));
    }

    output
}

/// Export file name for a given moment.
pub fn export_filename(at: NaiveDateTime) -> String {
    format!("driver_reports_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

/// Write every stored report as CSV.
pub fn write_export<W: Write>(
    records: &[StoredReport],
    mut writer: W,
    include_bom: bool,
) -> anyhow::Result<()> {
    if include_bom {
        writer.write_all(UTF8_BOM)?;
    }

    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["id"];
    header.extend(Field::ALL.iter().map(|f| f.column()));
    header.extend(["raw_text", "created_at"]);
    wtr.write_record(&header)?;

    for record in records {
        let mut row = vec![record.id.to_string()];
        row.extend(Field::ALL.iter().map(|f| field_value(&record.report, *f)));
        row.push(record.report.raw_text.clone());
        row.push(record.created_at.format(TIMESTAMP_FORMAT).to_string());
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Export stored reports to a timestamped CSV file in `dir`.
pub fn export_csv(
    records: &[StoredReport],
    dir: &Path,
    include_bom: bool,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_filename(Local::now().naive_local()));

    let file = File::create(&path)?;
    write_export(records, file, include_bom)?;

    Ok(path)
}
