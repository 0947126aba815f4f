use crate::domain::report::ReportRecord;
use crate::render::chart::ChartSpec;
use anyhow::ensure;
use chrono::{DateTime, Utc};

pub const TITLE: &str = "Fish Survival Prediction Report";
pub const CHART_SECTION: &str = "Transparency Chart";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub file_name: String,
    pub body: String,
}

pub fn file_name(date: &str) -> String {
    format!("FishReport-{date}.txt")
}

/// Fixed-layout text document for one record.
///
/// The chart section is appended only when `chart` is given.
pub fn render(
    record: &ReportRecord,
    chart: Option<&ChartSpec>,
    generated_at: DateTime<Utc>,
) -> anyhow::Result<ReportDocument> {
    ensure!(!record.date.trim().is_empty(), "report date must be non-empty");
    ensure!(
        !record.date.contains(['/', '\\']) && !record.date.contains(".."),
        "report date is not usable in a file name: {:?}",
        record.date
    );

    let fields: [(&str, String); 9] = [
        ("Date", record.date.clone()),
        ("Fish Count", record.fish_count.to_string()),
        ("AM Transparency", record.am_transparency.to_string()),
        ("PM Transparency", record.pm_transparency.to_string()),
        ("Survival Rate", format!("{}%", record.predicted_survival)),
        ("Risk Level", record.risk_level.to_string()),
        ("Temperature", record.temperature.clone()),
        ("Rainfall", record.rainfall.clone()),
        ("Suggestion", record.suggestion.clone()),
    ];

    let mut body = String::new();
    body.push_str(TITLE);
    body.push('\n');
    body.push_str(&"=".repeat(TITLE.len()));
    body.push('\n');
    body.push_str(&format!(
        "Generated: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    for (label, value) in fields {
        body.push_str(&format!("{label}: {value}\n"));
    }

    if let Some(chart) = chart {
        body.push('\n');
        body.push_str(CHART_SECTION);
        body.push('\n');
        body.push_str(&"-".repeat(CHART_SECTION.len()));
        body.push('\n');
        body.push_str(&chart.rasterize());
    }

    Ok(ReportDocument {
        file_name: file_name(&record.date),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::{RiskLevel, SUGGESTION_MEDIUM};
    use crate::store::tests::record;
    use chrono::TimeZone;

    #[test]
    fn fields_follow_fixed_label_order() {
        let generated_at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap();
        let doc = render(&record("2024-06-02", 99.5, RiskLevel::Medium), None, generated_at).unwrap();

        let labels: Vec<&str> = doc
            .body
            .lines()
            .filter_map(|l| l.split_once(": ").map(|(label, _)| label))
            .collect();
        assert_eq!(
            labels,
            [
                "Generated",
                "Date",
                "Fish Count",
                "AM Transparency",
                "PM Transparency",
                "Survival Rate",
                "Risk Level",
                "Temperature",
                "Rainfall",
                "Suggestion",
            ]
        );
        assert!(doc.body.contains("Generated: 2024-06-01 09:30:00 UTC"));
        assert!(doc.body.contains(&format!("Suggestion: {SUGGESTION_MEDIUM}")));
        assert!(doc.body.contains("Temperature: unknown"));
    }

    #[test]
    fn rejects_dates_unusable_as_file_names() {
        let mut bad = record("2024-06-02", 99.5, RiskLevel::Low);
        bad.date = "../etc".to_string();
        assert!(render(&bad, None, Utc::now()).is_err());
    }
}
