use crate::domain::prediction::{suggestion, PredictionEntry, RiskLevel};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const UNKNOWN: &str = "unknown";

/// Per-date aggregate kept in the report store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub date: String,
    pub fish_count: u32,
    pub am_transparency: f64,
    pub pm_transparency: f64,
    pub predicted_survival: f64,
    pub risk_level: RiskLevel,
    pub temperature: String,
    pub rainfall: String,
    pub suggestion: String,
}

impl ReportRecord {
    pub fn from_entry(entry: PredictionEntry, fish_count: u32, conditions: Option<&Conditions>) -> Self {
        let temperature = conditions
            .and_then(|c| c.temperature.clone())
            .unwrap_or_else(|| UNKNOWN.to_string());
        let rainfall = conditions
            .and_then(|c| c.rainfall.clone())
            .unwrap_or_else(|| UNKNOWN.to_string());

        Self {
            suggestion: suggestion(entry.risk_level).to_string(),
            date: entry.date,
            fish_count,
            am_transparency: entry.am_transparency,
            pm_transparency: entry.pm_transparency,
            predicted_survival: entry.predicted_survival,
            risk_level: entry.risk_level,
            temperature,
            rainfall,
        }
    }

    pub fn is_high_risk(&self) -> bool {
        self.risk_level == RiskLevel::High
    }
}

/// Weather context for one date, taken from the normalization payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conditions {
    pub temperature: Option<String>,
    pub rainfall: Option<String>,
}

/// Indexes the `forecast` array of a normalization payload by date.
///
/// Payloads without a forecast (or with unexpected shapes) yield an empty index.
pub fn conditions_by_date(payload: &Value) -> BTreeMap<String, Conditions> {
    let mut out = BTreeMap::new();
    let Some(days) = payload.get("forecast").and_then(Value::as_array) else {
        return out;
    };

    for day in days {
        let Some(date) = day.get("date").and_then(Value::as_str) else {
            continue;
        };
        out.insert(date.to_string(), conditions_for_day(day));
    }

    out
}

fn conditions_for_day(day: &Value) -> Conditions {
    let temperature = text_field(day, "temperature").or_else(|| {
        let max = day.get("max_air_temp").and_then(Value::as_f64);
        let min = day.get("min_air_temp").and_then(Value::as_f64);
        match (max, min) {
            (Some(max), Some(min)) => Some(format!("{max:.0}°F / {min:.0}°F")),
            (Some(t), None) | (None, Some(t)) => Some(format!("{t:.0}°F")),
            (None, None) => None,
        }
    });

    let rainfall = text_field(day, "rainfall").or_else(|| {
        let dec = day.get("dec_rain").and_then(Value::as_f64);
        let calmar = day.get("calmar_rain").and_then(Value::as_f64);
        if dec.is_none() && calmar.is_none() {
            return None;
        }
        let total = dec.unwrap_or(0.0) + calmar.unwrap_or(0.0);
        Some(format!("{total:.1} mm"))
    });

    Conditions {
        temperature,
        rainfall,
    }
}

fn text_field(day: &Value, key: &str) -> Option<String> {
    match day.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::SUGGESTION_HIGH;
    use serde_json::json;

    fn entry(date: &str, risk: RiskLevel) -> PredictionEntry {
        PredictionEntry {
            date: date.to_string(),
            am_transparency: 41.234,
            pm_transparency: 38.5,
            predicted_survival: 99.9532,
            risk_level: risk,
        }
    }

    #[test]
    fn defaults_conditions_to_unknown() {
        let record = ReportRecord::from_entry(entry("2024-06-01", RiskLevel::High), 500, None);
        assert_eq!(record.temperature, UNKNOWN);
        assert_eq!(record.rainfall, UNKNOWN);
        assert_eq!(record.suggestion, SUGGESTION_HIGH);
        assert_eq!(record.fish_count, 500);
        assert!(record.is_high_risk());
    }

    #[test]
    fn reads_conditions_from_forecast_days() {
        let payload = json!({
            "fish_count": "500",
            "history": [{"date": "2024-05-31", "max_air_temp": 70, "min_air_temp": 50}],
            "forecast": [
                {"date": "2024-06-01", "max_air_temp": 78, "min_air_temp": 55, "dec_rain": 1.2, "calmar_rain": 0.3},
                {"date": "2024-06-02", "temperature": "cool", "rainfall": 4},
                {"date": "2024-06-03"}
            ]
        });

        let index = conditions_by_date(&payload);
        assert_eq!(index.len(), 3);
        assert!(!index.contains_key("2024-05-31"));

        let first = &index["2024-06-01"];
        assert_eq!(first.temperature.as_deref(), Some("78°F / 55°F"));
        assert_eq!(first.rainfall.as_deref(), Some("1.5 mm"));

        let second = &index["2024-06-02"];
        assert_eq!(second.temperature.as_deref(), Some("cool"));
        assert_eq!(second.rainfall.as_deref(), Some("4"));

        let record = ReportRecord::from_entry(
            entry("2024-06-03", RiskLevel::Low),
            10,
            index.get("2024-06-03"),
        );
        assert_eq!(record.temperature, UNKNOWN);
        assert_eq!(record.rainfall, UNKNOWN);
    }

    #[test]
    fn payload_without_forecast_has_no_conditions() {
        let payload = json!({"start_date": "2024-06-01", "end_date": "2024-06-03", "date_range": 3});
        assert!(conditions_by_date(&payload).is_empty());
    }
}
