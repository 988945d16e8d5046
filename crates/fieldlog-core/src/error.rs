//! Error types for the fieldlog-core library.
//!
//! Extraction itself has no error channel: an unmatched field is simply left
//! unset. Errors only arise when compiling rule sets, loading configuration,
//! or talking to the report store.

use thiserror::Error;

use crate::models::report::Field;

/// Main error type for the fieldlog library.
#[derive(Error, Debug)]
pub enum FieldlogError {
    /// Rule set compilation error.
    #[error("rule error: {0}")]
    Rules(#[from] RuleError),

    /// Report store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while compiling a rule set definition.
#[derive(Error, Debug)]
pub enum RuleError {
    /// A rule's regular expression does not compile.
    #[error("invalid pattern for {field}: {pattern}: {reason}")]
    InvalidPattern {
        field: Field,
        pattern: String,
        reason: String,
    },

    /// A raw pattern rule has no capture group to take the value from.
    #[error("pattern for {field} has no capture group: {pattern}")]
    MissingCapture { field: Field, pattern: String },

    /// A label rule with an empty label.
    #[error("empty label in {field} cascade")]
    EmptyLabel { field: Field },

    /// Unknown built-in profile name.
    #[error("unknown profile: {0}")]
    UnknownProfile(String),
}

/// Errors related to the report store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying SQLite failure.
    #[cfg(feature = "native")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A stored timestamp could not be parsed.
    #[error("invalid timestamp in row {id}: {value}")]
    Timestamp { id: i64, value: String },

    /// No report with the given id.
    #[error("report {0} not found")]
    NotFound(i64),

    /// Any other backend failure.
    #[error("{0}")]
    Other(String),
}

/// Result type for the fieldlog library.
pub type Result<T> = std::result::Result<T, FieldlogError>;
