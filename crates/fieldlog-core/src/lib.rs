//! Core library for driver field-collection reports.
//!
//! This crate provides:
//! - Rule-cascade field extraction from free-text reports
//! - Built-in and JSON-defined rule sets
//! - Corpus summaries over stored reports
//! - SQLite report storage (feature `native`)

pub mod error;
pub mod extraction;
pub mod models;
pub mod summary;

#[cfg(feature = "native")]
pub mod store;

pub use error::{FieldlogError, Result, RuleError, StoreError};
pub use extraction::rules::{normalize_date, Profile, RuleDef, RuleSet, RuleSetDef, DEFAULT_YEAR};
pub use extraction::{ExtractionResult, ReportExtractor, ReportParser};
pub use models::{ExtractedReport, Field, FieldlogConfig, StoredReport, TimePeriod};
pub use summary::{collection_summary, summarize, Distribution, ReportSource, Summary, SummaryOutcome};

#[cfg(feature = "native")]
pub use store::ReportStore;
