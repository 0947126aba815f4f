use crate::domain::report::ReportRecord;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub inserted: usize,
    pub replaced: usize,
}

/// In-memory date → report mapping for one session.
///
/// Iteration follows encounter order; replacing a date keeps its original slot.
#[derive(Debug, Clone, Default)]
pub struct ReportStore {
    records: Vec<ReportRecord>,
    index: HashMap<String, usize>,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, date: &str) -> Option<&ReportRecord> {
        self.index.get(date).map(|&i| &self.records[i])
    }

    pub fn records(&self) -> &[ReportRecord] {
        &self.records
    }

    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.date.as_str())
    }

    /// Upserts a batch. Dates outside the batch are left untouched.
    pub fn merge(&mut self, batch: Vec<ReportRecord>) -> MergeSummary {
        let mut summary = MergeSummary::default();
        for record in batch {
            match self.index.get(&record.date) {
                Some(&i) => {
                    self.records[i] = record;
                    summary.replaced += 1;
                }
                None => {
                    self.index.insert(record.date.clone(), self.records.len());
                    self.records.push(record);
                    summary.inserted += 1;
                }
            }
        }
        summary
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::prediction::{PredictionEntry, RiskLevel};

    pub(crate) fn record(date: &str, survival: f64, risk: RiskLevel) -> ReportRecord {
        ReportRecord::from_entry(
            PredictionEntry {
                date: date.to_string(),
                am_transparency: 40.0,
                pm_transparency: 35.5,
                predicted_survival: survival,
                risk_level: risk,
            },
            500,
            None,
        )
    }

    #[test]
    fn merge_overwrites_only_overlapping_dates() {
        let mut store = ReportStore::new();
        let first = store.merge(vec![
            record("2024-06-01", 99.1, RiskLevel::Low),
            record("2024-06-02", 99.2, RiskLevel::Low),
            record("2024-06-03", 99.3, RiskLevel::Low),
        ]);
        assert_eq!(first, MergeSummary { inserted: 3, replaced: 0 });

        let second = store.merge(vec![
            record("2024-06-03", 80.0, RiskLevel::High),
            record("2024-06-04", 99.4, RiskLevel::Medium),
        ]);
        assert_eq!(second, MergeSummary { inserted: 1, replaced: 1 });

        assert_eq!(store.len(), 4);
        assert_eq!(store.get("2024-06-01").unwrap().predicted_survival, 99.1);
        assert_eq!(store.get("2024-06-02").unwrap().predicted_survival, 99.2);
        assert_eq!(store.get("2024-06-03").unwrap().predicted_survival, 80.0);
        assert_eq!(store.get("2024-06-03").unwrap().risk_level, RiskLevel::High);

        let dates: Vec<_> = store.dates().collect();
        assert_eq!(dates, ["2024-06-01", "2024-06-02", "2024-06-03", "2024-06-04"]);
    }

    #[test]
    fn clear_empties_store() {
        let mut store = ReportStore::new();
        store.merge(vec![record("2024-06-01", 99.0, RiskLevel::Low)]);
        store.clear();
        assert!(store.is_empty());
        assert!(store.get("2024-06-01").is_none());

        store.merge(vec![record("2024-06-05", 99.0, RiskLevel::Low)]);
        assert_eq!(store.records()[0].date, "2024-06-05");
    }
}
