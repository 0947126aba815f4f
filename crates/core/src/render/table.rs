use crate::domain::report::ReportRecord;
use serde::Serialize;

pub const HIGH_RISK_TAG: &str = "high-risk";
pub const HEADERS: [&str; 5] = [
    "Date",
    "AM Transparency",
    "PM Transparency",
    "Predicted Survival (%)",
    "Risk Level",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub date: String,
    pub am_transparency: String,
    pub pm_transparency: String,
    pub predicted_survival: String,
    pub risk_level: String,
    /// `Some(HIGH_RISK_TAG)` on High rows.
    pub tag: Option<&'static str>,
}

impl TableRow {
    pub fn from_record(record: &ReportRecord) -> Self {
        Self {
            date: record.date.clone(),
            am_transparency: format!("{:.2}", record.am_transparency),
            pm_transparency: format!("{:.2}", record.pm_transparency),
            predicted_survival: format!("{:.2}", record.predicted_survival),
            risk_level: record.risk_level.to_string(),
            tag: record.is_high_risk().then_some(HIGH_RISK_TAG),
        }
    }

    fn cells(&self) -> [&str; 5] {
        [
            &self.date,
            &self.am_transparency,
            &self.pm_transparency,
            &self.predicted_survival,
            &self.risk_level,
        ]
    }
}

pub fn rows(records: &[ReportRecord]) -> Vec<TableRow> {
    records.iter().map(TableRow::from_record).collect()
}

/// Fixed-width text rendering. High-risk rows are marked with a trailing `!`.
pub fn to_text(rows: &[TableRow]) -> String {
    let mut widths = HEADERS.map(str::len);
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.cells()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, HEADERS, &widths, "");
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, rule.iter().map(String::as_str), &widths, "");
    for row in rows {
        let marker = if row.tag.is_some() { " !" } else { "" };
        push_line(&mut out, row.cells(), &widths, marker);
    }
    out
}

fn push_line<'a>(
    out: &mut String,
    cells: impl IntoIterator<Item = &'a str>,
    widths: &[usize; 5],
    marker: &str,
) {
    let padded: Vec<String> = cells
        .into_iter()
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:<w$}"))
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push_str(marker);
    out.push('\n');
}
