use crate::domain::report::ReportRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

pub const LINE_CHART_ID: &str = "lineChart";
pub const BAR_CHART_ID: &str = "barChart";

const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartSpec {
    /// AM/PM transparency over date.
    pub fn transparency(kind: ChartKind, records: &[ReportRecord]) -> Self {
        Self {
            kind,
            labels: records.iter().map(|r| r.date.clone()).collect(),
            datasets: vec![
                Dataset {
                    label: "AM Transparency".to_string(),
                    data: records.iter().map(|r| r.am_transparency).collect(),
                },
                Dataset {
                    label: "PM Transparency".to_string(),
                    data: records.iter().map(|r| r.pm_transparency).collect(),
                },
            ],
        }
    }

    /// Text raster of the chart: one sparkline per dataset on a shared scale.
    pub fn rasterize(&self) -> String {
        let values = self.datasets.iter().flat_map(|d| d.data.iter().copied());
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

        let label_width = self
            .datasets
            .iter()
            .map(|d| d.label.chars().count())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for dataset in &self.datasets {
            let line: String = dataset.data.iter().map(|&v| level(v, min, max)).collect();
            out.push_str(&format!("{:<label_width$}  {line}\n", dataset.label));
        }

        if let (Some(first), Some(last)) = (self.labels.first(), self.labels.last()) {
            out.push_str(&format!("{:<label_width$}  {first} .. {last}\n", "Dates"));
        }
        if min.is_finite() && max.is_finite() {
            out.push_str(&format!("{:<label_width$}  {min:.2} to {max:.2}\n", "Scale"));
        }
        out
    }
}

fn level(v: f64, min: f64, max: f64) -> char {
    if max <= min {
        return LEVELS[LEVELS.len() / 2];
    }
    let top = (LEVELS.len() - 1) as f64;
    let idx = (((v - min) / (max - min)) * top).round().clamp(0.0, top) as usize;
    LEVELS[idx]
}

/// A chart bound to an identifier. A fresh `handle_id` is minted on every replace.
#[derive(Debug, Clone, Serialize)]
pub struct ChartHandle {
    pub chart_id: String,
    pub handle_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub spec: ChartSpec,
}

/// Chart identifier → current handle.
///
/// Replacement disposes the old handle before the new one is installed, under a
/// single lock.
#[derive(Debug, Default)]
pub struct ChartRegistry {
    slots: Mutex<HashMap<String, ChartHandle>>,
    disposed: AtomicU64,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, chart_id: &str, spec: ChartSpec) -> ChartHandle {
        let mut slots = self.slots();
        if let Some(old) = slots.remove(chart_id) {
            self.record_disposal(&old);
        }

        let handle = ChartHandle {
            chart_id: chart_id.to_string(),
            handle_id: Uuid::new_v4(),
            created_at: Utc::now(),
            spec,
        };
        slots.insert(chart_id.to_string(), handle.clone());
        handle
    }

    pub fn dispose(&self, chart_id: &str) -> bool {
        let removed = self.slots().remove(chart_id);
        match removed {
            Some(old) => {
                self.record_disposal(&old);
                true
            }
            None => false,
        }
    }

    pub fn dispose_all(&self) {
        let drained: Vec<ChartHandle> = self.slots().drain().map(|(_, h)| h).collect();
        for old in &drained {
            self.record_disposal(old);
        }
    }

    pub fn get(&self, chart_id: &str) -> Option<ChartHandle> {
        self.slots().get(chart_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of handles released so far.
    pub fn disposed_count(&self) -> u64 {
        self.disposed.load(Ordering::SeqCst)
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, ChartHandle>> {
        lock(&self.slots)
    }

    fn record_disposal(&self, old: &ChartHandle) {
        self.disposed.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(chart_id = %old.chart_id, handle_id = %old.handle_id, "chart disposed");
    }
}

// A panic while holding the lock leaves the map itself consistent.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
