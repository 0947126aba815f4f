use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const SUGGESTION_HIGH: &str = "reduce stocking/feeding activity, increase monitoring";
pub const SUGGESTION_MEDIUM: &str = "monitor conditions, avoid overfeeding";
pub const SUGGESTION_DEFAULT: &str = "proceed normally.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Low" => Ok(RiskLevel::Low),
            "Medium" => Ok(RiskLevel::Medium),
            "High" => Ok(RiskLevel::High),
            other => anyhow::bail!("unknown risk level: {other:?}"),
        }
    }
}

/// Advice text for a risk level. Stored on every record and written into exports.
pub fn suggestion(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => SUGGESTION_HIGH,
        RiskLevel::Medium => SUGGESTION_MEDIUM,
        RiskLevel::Low => SUGGESTION_DEFAULT,
    }
}

/// Same rule keyed by the raw label; unrecognised labels get the default advice.
pub fn suggestion_for_label(label: &str) -> &'static str {
    label
        .parse::<RiskLevel>()
        .map(suggestion)
        .unwrap_or(SUGGESTION_DEFAULT)
}

/// One validated per-date result from the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    pub date: String,
    pub am_transparency: f64,
    pub pm_transparency: f64,
    pub predicted_survival: f64,
    pub risk_level: RiskLevel,
}
