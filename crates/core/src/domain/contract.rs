use crate::domain::prediction::{PredictionEntry, RiskLevel};
use crate::error::ReportError;
use anyhow::{bail, ensure};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Body of the date-normalization request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeRequest {
    pub start_date: String,
    pub end_date: String,
    pub fish_count: String,
}

/// Prediction entry as it arrives on the wire; every field may be missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPredictionEntry {
    pub date: Option<String>,
    pub am_transparency: Option<f64>,
    pub pm_transparency: Option<f64>,
    pub predicted_survival: Option<f64>,
    pub risk_level: Option<String>,
}

/// Interprets a prediction-service body.
///
/// Arrays become validated entries in received order. Any other shape is an
/// error payload and its `error` field becomes the [`ReportError::Request`] message.
pub fn parse_prediction_response(body: Value) -> anyhow::Result<Vec<PredictionEntry>> {
    let items = match body {
        Value::Array(items) => items,
        other => return Err(ReportError::Request(error_message(&other)).into()),
    };

    let raw: Vec<RawPredictionEntry> = serde_json::from_value(Value::Array(items))
        .map_err(|e| ReportError::Request(format!("malformed prediction response: {e}")))?;

    validate_entries(raw).map_err(|e| ReportError::Request(format!("{e:#}")).into())
}

/// Extracts the human-readable message from an error-shaped body.
pub fn error_message(body: &Value) -> String {
    match body.get("error") {
        Some(Value::String(msg)) => msg.clone(),
        Some(Value::Null) | None => format!("unexpected response from prediction service: {body}"),
        Some(other) => other.to_string(),
    }
}

fn validate_entries(raw: Vec<RawPredictionEntry>) -> anyhow::Result<Vec<PredictionEntry>> {
    ensure!(!raw.is_empty(), "prediction service returned no entries");

    let mut seen_dates = BTreeSet::<String>::new();
    let mut out = Vec::with_capacity(raw.len());
    for (idx, item) in raw.into_iter().enumerate() {
        let entry = item
            .validate_and_into_entry(&mut seen_dates)
            .map_err(|e| e.context(format!("malformed prediction entry #{idx}")))?;
        out.push(entry);
    }
    Ok(out)
}

impl RawPredictionEntry {
    fn validate_and_into_entry(
        self,
        seen_dates: &mut BTreeSet<String>,
    ) -> anyhow::Result<PredictionEntry> {
        let date = self.date.map(|s| s.trim().to_string()).unwrap_or_default();
        ensure!(!date.is_empty(), "date must be non-empty");
        ensure!(seen_dates.insert(date.clone()), "duplicate date: {date}");

        let am_transparency = finite("am_transparency", self.am_transparency)?;
        let pm_transparency = finite("pm_transparency", self.pm_transparency)?;
        let predicted_survival = finite("predicted_survival", self.predicted_survival)?;

        let Some(label) = self.risk_level else {
            bail!("risk_level is missing");
        };
        let risk_level = label.parse::<RiskLevel>()?;

        Ok(PredictionEntry {
            date,
            am_transparency,
            pm_transparency,
            predicted_survival,
            risk_level,
        })
    }
}

fn finite(field: &str, value: Option<f64>) -> anyhow::Result<f64> {
    match value {
        Some(v) if v.is_finite() => Ok(v),
        Some(v) => bail!("{field} must be finite (got {v})"),
        None => bail!("{field} is missing"),
    }
}
