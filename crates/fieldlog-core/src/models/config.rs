//! Configuration structures for extraction, storage and export.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{FieldlogError, Result};
use crate::extraction::rules::{Profile, RuleSet, RuleSetDef, DEFAULT_YEAR};
use crate::extraction::ReportExtractor;

/// Main configuration for fieldlog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldlogConfig {
    /// Extraction rules configuration.
    pub extraction: ExtractionConfig,

    /// Report database configuration.
    pub storage: StorageConfig,

    /// CSV export configuration.
    pub export: ExportConfig,

    /// HTTP server configuration.
    pub serve: ServeConfig,
}

/// Extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Built-in rule set profile.
    pub profile: Profile,

    /// Year assumed for `M.D` shorthand dates.
    pub default_year: i32,

    /// Custom JSON rule set; takes precedence over `profile`.
    pub rules_file: Option<PathBuf>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            default_year: DEFAULT_YEAR,
            rules_file: None,
        }
    }
}

/// Report database configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite database file.
    pub database: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("driver_data.db"),
        }
    }
}

/// CSV export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory export files are written to.
    pub output_dir: PathBuf,

    /// Prefix files with a UTF-8 BOM so spreadsheets detect the encoding.
    pub include_bom: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            include_bom: true,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Address to bind.
    pub bind: String,

    /// Port to listen on.
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl FieldlogConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            FieldlogError::Config(format!("invalid config {}: {}", path.display(), e))
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| FieldlogError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build an extractor from the extraction section.
    ///
    /// A configured rules file is loaded and compiled here, so a bad pattern
    /// fails at startup rather than during extraction.
    pub fn build_extractor(&self) -> Result<ReportExtractor> {
        let extractor = match &self.extraction.rules_file {
            Some(path) => {
                let def = RuleSetDef::from_file(path)?;
                ReportExtractor::new().with_rules(Arc::new(RuleSet::compile(&def)?))
            }
            None => ReportExtractor::new().with_profile(self.extraction.profile),
        };

        Ok(extractor.with_default_year(self.extraction.default_year))
    }
}
