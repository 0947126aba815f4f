pub mod chart;
pub mod table;

use crate::domain::report::ReportRecord;
use crate::render::chart::{ChartKind, ChartRegistry, ChartSpec, BAR_CHART_ID, LINE_CHART_ID};
use crate::render::table::TableRow;
use serde::Serialize;

pub const MSG_LOADING: &str = "Fetching prediction...";
pub const MSG_FAILED: &str = "Failed to generate prediction";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ViewStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl ViewStatus {
    /// Inline text shown in place of the table body.
    pub fn message(&self) -> Option<&str> {
        match self {
            ViewStatus::Loading => Some(MSG_LOADING),
            ViewStatus::Failed(msg) => Some(msg),
            ViewStatus::Idle | ViewStatus::Ready => None,
        }
    }
}

/// What the user currently sees: table rows, the date selector and a status line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub status: ViewStatus,
    pub rows: Vec<TableRow>,
    pub selector: Vec<String>,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            status: ViewStatus::Idle,
            rows: Vec::new(),
            selector: Vec::new(),
        }
    }
}

/// Projects records into the view and the two transparency charts.
#[derive(Debug, Default)]
pub struct Renderer {
    view: DashboardView,
    charts: ChartRegistry,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn charts(&self) -> &ChartRegistry {
        &self.charts
    }

    pub fn set_loading(&mut self) {
        self.view.status = ViewStatus::Loading;
        self.view.rows.clear();
    }

    /// A message (a service error payload or a request failure's cause) shows
    /// as `Error: <message>`; `None` shows the generic failure line. Rows are
    /// cleared; the selector keeps its dates since the store still holds them.
    pub fn set_failed(&mut self, service_message: Option<&str>) {
        let message = match service_message {
            Some(msg) => format!("Error: {msg}"),
            None => MSG_FAILED.to_string(),
        };
        self.view.status = ViewStatus::Failed(message);
        self.view.rows.clear();
    }

    /// Replaces rows and both charts with a projection of `records`.
    /// Calling it twice with the same input yields the same state.
    pub fn render(&mut self, records: &[ReportRecord]) {
        self.view.rows = table::rows(records);
        for record in records {
            if !self.view.selector.iter().any(|d| d == &record.date) {
                self.view.selector.push(record.date.clone());
            }
        }
        self.view.status = ViewStatus::Ready;

        self.charts
            .replace(LINE_CHART_ID, ChartSpec::transparency(ChartKind::Line, records));
        self.charts
            .replace(BAR_CHART_ID, ChartSpec::transparency(ChartKind::Bar, records));

        tracing::debug!(rows = self.view.rows.len(), "dashboard rendered");
    }

    pub fn reset(&mut self) {
        self.view = DashboardView::default();
        self.charts.dispose_all();
    }
}
