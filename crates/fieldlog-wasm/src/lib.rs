//! WASM bindings for driver field-collection reports.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! Storage stays on the JS side; summaries take stored records as plain arrays.

use std::sync::Arc;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use fieldlog_core::extraction::rules::{Profile, RuleSet, RuleSetDef};
use fieldlog_core::extraction::{ReportExtractor as CoreExtractor, ReportParser};
use fieldlog_core::models::report::{ExtractedReport, Field, StoredReport};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Names of the built-in rule set profiles.
#[wasm_bindgen]
pub fn profiles() -> js_sys::Array {
    Profile::ALL
        .iter()
        .map(|p| JsValue::from_str(p.name()))
        .collect()
}

/// Extract a report from text with the standard profile.
#[wasm_bindgen]
pub fn extract_report(text: &str) -> Result<JsValue, JsValue> {
    to_js(&CoreExtractor::new().extract(text))
}

/// Normalize an `M.D` date to `YYYY-MM-DD`; other forms pass through.
#[wasm_bindgen]
pub fn normalize_date(raw: &str, year: i32) -> String {
    fieldlog_core::normalize_date(raw, year)
}

/// Summarize an array of stored reports.
///
/// Returns `{"message": "暂无数据"}` for an empty array.
#[wasm_bindgen]
pub fn summarize(records: JsValue) -> Result<JsValue, JsValue> {
    let records: Vec<StoredReport> = serde_wasm_bindgen::from_value(records)
        .map_err(|e| JsValue::from_str(&format!("invalid records: {}", e)))?;

    to_js(&fieldlog_core::summarize(&records))
}

/// Report extractor class for browser use.
#[wasm_bindgen]
pub struct ReportExtractor {
    inner: CoreExtractor,
}

#[wasm_bindgen]
impl ReportExtractor {
    /// Create an extractor with the standard profile.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: CoreExtractor::new(),
        }
    }

    /// Switch to a built-in profile by name.
    #[wasm_bindgen]
    pub fn set_profile(&mut self, name: &str) -> Result<(), JsValue> {
        let profile: Profile = name.parse().map_err(|e| js_error(&e))?;
        self.inner = self.inner.clone().with_profile(profile);
        Ok(())
    }

    /// Use a custom rule set given as JSON.
    #[wasm_bindgen]
    pub fn set_rules(&mut self, json: &str) -> Result<(), JsValue> {
        let def: RuleSetDef = serde_json::from_str(json).map_err(|e| js_error(&e))?;
        let rules = RuleSet::compile(&def).map_err(|e| js_error(&e))?;
        self.inner = self.inner.clone().with_rules(Arc::new(rules));
        Ok(())
    }

    /// Set the year used for `M.D` dates.
    #[wasm_bindgen]
    pub fn set_default_year(&mut self, year: i32) {
        self.inner = self.inner.clone().with_default_year(year);
    }

    /// Name of the active rule set.
    #[wasm_bindgen(getter)]
    pub fn rules(&self) -> String {
        self.inner.rules_name().to_string()
    }

    /// Extract a report from text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.inner.extract(text))
    }

    /// Extract a report along with the rule that matched each field.
    #[wasm_bindgen]
    pub fn extract_with_matches(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.inner.parse(text);

        #[derive(Serialize)]
        struct MatchJs {
            field: Field,
            value: String,
            rule: usize,
            source: String,
        }

        #[derive(Serialize)]
        struct ExtractResult {
            report: ExtractedReport,
            matches: Vec<MatchJs>,
            warnings: Vec<String>,
            processing_time_ms: u64,
        }

        let output = ExtractResult {
            report: result.report,
            matches: result
                .matches
                .into_iter()
                .map(|m| MatchJs {
                    field: m.field,
                    value: m.value,
                    rule: m.rule,
                    source: m.source,
                })
                .collect(),
            warnings: result.warnings,
            processing_time_ms: result.processing_time_ms,
        };

        to_js(&output)
    }
}

impl Default for ReportExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| js_error(&e))
}

fn js_error(err: &dyn std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
