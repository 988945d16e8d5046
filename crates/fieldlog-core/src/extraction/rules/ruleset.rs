//! Rule set definitions and their compiled form.
//!
//! A rule set is plain data: one ordered cascade per field plus the day and
//! night keyword lists. Report variants differ only in their rule set, never
//! in code.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FieldlogError, RuleError};
use crate::models::report::Field;

use super::cascade::{label_boundary, Cascade};
use super::period::TimePeriodDetector;

/// One entry in a field cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleDef {
    /// `<label>：<value>`, value shaped by the field's value class.
    Label { label: String },
    /// Raw regular expression; capture group 1 is the value.
    Pattern { pattern: String },
}

impl RuleDef {
    pub fn label(label: impl Into<String>) -> Self {
        Self::Label {
            label: label.into(),
        }
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
        }
    }
}

/// Serializable rule set definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSetDef {
    /// Rule set name, for logs and diagnostics.
    pub name: String,
    pub driver_name: Vec<RuleDef>,
    pub vehicle_number: Vec<RuleDef>,
    pub collection_task: Vec<RuleDef>,
    pub collection_segments: Vec<RuleDef>,
    pub collection_location: Vec<RuleDef>,
    pub collection_date: Vec<RuleDef>,
    pub driving_distance: Vec<RuleDef>,
    /// Keywords indicating a daytime run, checked first.
    pub day_keywords: Vec<String>,
    /// Keywords indicating a night run.
    pub night_keywords: Vec<String>,
    /// Labels with no cascade of their own that still end a text value.
    pub stop_labels: Vec<String>,
}

impl RuleSetDef {
    /// Load a rule set definition from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, FieldlogError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            FieldlogError::Config(format!("invalid rule set {}: {}", path.display(), e))
        })
    }

    /// Save the definition as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), FieldlogError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| FieldlogError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Pattern cascades, in field order. Time period is keyword-driven and absent.
    pub fn cascades(&self) -> [(Field, &[RuleDef]); 7] {
        [
            (Field::DriverName, self.driver_name.as_slice()),
            (Field::VehicleNumber, self.vehicle_number.as_slice()),
            (Field::CollectionTask, self.collection_task.as_slice()),
            (Field::CollectionSegments, self.collection_segments.as_slice()),
            (Field::CollectionLocation, self.collection_location.as_slice()),
            (Field::CollectionDate, self.collection_date.as_slice()),
            (Field::DrivingDistance, self.driving_distance.as_slice()),
        ]
    }

    /// Every label used anywhere in the rule set, stop labels included.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cascades()
            .into_iter()
            .flat_map(|(_, rules)| rules.iter())
            .filter_map(|rule| match rule {
                RuleDef::Label { label } => Some(label.trim()),
                RuleDef::Pattern { .. } => None,
            })
            .chain(self.stop_labels.iter().map(|l| l.trim()))
    }
}

/// Compiled rule set, ready for extraction.
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: String,
    cascades: Vec<Cascade>,
    period: TimePeriodDetector,
}

impl RuleSet {
    /// Compile a rule set definition.
    pub fn compile(def: &RuleSetDef) -> Result<Self, RuleError> {
        let boundary = label_boundary(def.labels());

        let cascades = def
            .cascades()
            .into_iter()
            .map(|(field, rules)| Cascade::compile(field, rules, boundary.as_deref()))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Compiled rule set '{}' with {} rules",
            def.name,
            cascades.iter().map(Cascade::len).sum::<usize>()
        );

        Ok(Self {
            name: def.name.clone(),
            cascades,
            period: TimePeriodDetector::new(def.day_keywords.clone(), def.night_keywords.clone()),
        })
    }

    /// Rule set name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The cascade for a pattern-extracted field.
    pub fn cascade(&self, field: Field) -> Option<&Cascade> {
        self.cascades.iter().find(|c| c.field() == field)
    }

    /// The time period detector.
    pub fn period(&self) -> &TimePeriodDetector {
        &self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::rules::FieldExtractor;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rule_def_json() {
        let json = r#"[
            {"kind": "label", "label": "采集员"},
            {"kind": "pattern", "pattern": "(\\d+)\\s*段"}
        ]"#;

        let rules: Vec<RuleDef> = serde_json::from_str(json).unwrap();
        assert_eq!(
            rules,
            vec![RuleDef::label("采集员"), RuleDef::pattern(r"(\d+)\s*段")]
        );
    }

    #[test]
    fn test_partial_definition_defaults() {
        let def: RuleSetDef = serde_json::from_str(
            r#"{"name": "names-only", "driver_name": [{"kind": "label", "label": "名字"}]}"#,
        )
        .unwrap();

        let rules = RuleSet::compile(&def).unwrap();
        assert_eq!(rules.name(), "names-only");
        assert!(rules.cascade(Field::DrivingDistance).unwrap().is_empty());

        let m = rules
            .cascade(Field::DriverName)
            .unwrap()
            .extract("名字：小林")
            .unwrap();
        assert_eq!(m.value, "小林");
    }

    #[test]
    fn test_labels_bound_each_other() {
        let def = RuleSetDef {
            name: "pair".into(),
            driver_name: vec![RuleDef::label("司机")],
            vehicle_number: vec![RuleDef::label("车牌")],
            ..Default::default()
        };

        let rules = RuleSet::compile(&def).unwrap();
        let text = "司机：王五车牌：粤C11111";

        assert_eq!(
            rules.cascade(Field::DriverName).unwrap().extract(text).unwrap().value,
            "王五"
        );
        assert_eq!(
            rules.cascade(Field::VehicleNumber).unwrap().extract(text).unwrap().value,
            "粤C11111"
        );
    }

    #[test]
    fn test_stop_labels_end_text() {
        let def = RuleSetDef {
            name: "stops".into(),
            collection_location: vec![RuleDef::label("地点")],
            stop_labels: vec!["时段".into()],
            ..Default::default()
        };

        let rules = RuleSet::compile(&def).unwrap();
        let m = rules
            .cascade(Field::CollectionLocation)
            .unwrap()
            .extract("地点：合肥时段：白天")
            .unwrap();
        assert_eq!(m.value, "合肥");
        assert_eq!(def.labels().last(), Some("时段"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rules.json");

        let def = RuleSetDef {
            name: "saved".into(),
            day_keywords: vec!["日间".into()],
            ..Default::default()
        };
        def.save(&path).unwrap();

        assert_eq!(RuleSetDef::from_file(&path).unwrap(), def);
    }
}
