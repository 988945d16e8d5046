//! Data models for reports and configuration.

pub mod config;
pub mod report;

pub use config::FieldlogConfig;
pub use report::{ExtractedReport, Field, StoredReport, TimePeriod};
