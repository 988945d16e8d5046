//! Built-in rule set profiles.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::RuleError;

use super::patterns::{DISTANCE_FALLBACK, SEGMENTS_FALLBACK};
use super::ruleset::{RuleDef, RuleSet, RuleSetDef};

lazy_static! {
    static ref STANDARD_RULES: Arc<RuleSet> = Arc::new(
        RuleSet::compile(&Profile::Standard.definition()).unwrap()
    );

    static ref EXTENDED_RULES: Arc<RuleSet> = Arc::new(
        RuleSet::compile(&Profile::Extended.definition()).unwrap()
    );
}

/// Named built-in rule sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    /// Two labels per field; the template drivers fill in on one line or many.
    #[default]
    Standard,
    /// Three labels per field plus bare-number fallbacks, for looser reports.
    Extended,
}

impl Profile {
    pub const ALL: [Profile; 2] = [Profile::Standard, Profile::Extended];

    /// Profile name as used in configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Extended => "extended",
        }
    }

    /// The rule set definition for this profile.
    pub fn definition(&self) -> RuleSetDef {
        match self {
            Self::Standard => RuleSetDef {
                name: self.name().to_string(),
                driver_name: labels(&["采集员", "姓名"]),
                vehicle_number: labels(&["车辆编号", "车牌"]),
                collection_task: labels(&["采集任务", "任务"]),
                collection_segments: labels(&["采集段数", "段数"]),
                collection_location: labels(&["采集地点", "地点"]),
                collection_date: labels(&["采集日期", "日期"]),
                driving_distance: with_fallback(&["行驶里程", "里程"], DISTANCE_FALLBACK),
                day_keywords: keywords(&["白天", "白"]),
                night_keywords: keywords(&["夜晚", "夜"]),
                stop_labels: keywords(&["采集时段", "时段"]),
            },
            Self::Extended => RuleSetDef {
                name: self.name().to_string(),
                driver_name: labels(&["采集员", "姓名", "司机"]),
                vehicle_number: labels(&["车辆编号", "车牌", "车号"]),
                collection_task: labels(&["采集任务", "任务", "项目"]),
                collection_segments: with_fallback(&["采集段数", "段数"], SEGMENTS_FALLBACK),
                collection_location: labels(&["采集地点", "地点", "位置"]),
                collection_date: labels(&["采集日期", "日期", "时间"]),
                driving_distance: with_fallback(
                    &["行驶里程", "里程", "距离"],
                    DISTANCE_FALLBACK,
                ),
                day_keywords: keywords(&["白天", "白", "上午", "下午"]),
                night_keywords: keywords(&["夜晚", "夜", "晚上"]),
                stop_labels: keywords(&["采集时段", "时段"]),
            },
        }
    }

    /// Shared compiled rule set for this profile.
    pub fn rules(&self) -> Arc<RuleSet> {
        match self {
            Self::Standard => Arc::clone(&STANDARD_RULES),
            Self::Extended => Arc::clone(&EXTENDED_RULES),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Profile {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "default" => Ok(Self::Standard),
            "extended" => Ok(Self::Extended),
            other => Err(RuleError::UnknownProfile(other.to_string())),
        }
    }
}

fn labels(list: &[&str]) -> Vec<RuleDef> {
    list.iter().map(|l| RuleDef::label(*l)).collect()
}

// Labelled rules first, the bare-number heuristic strictly last.
fn with_fallback(list: &[&str], fallback: &str) -> Vec<RuleDef> {
    let mut rules = labels(list);
    rules.push(RuleDef::pattern(fallback));
    rules
}

fn keywords(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}
