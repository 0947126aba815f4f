pub mod archive;
pub mod document;

use crate::error::ReportError;
use crate::render::chart::{ChartRegistry, LINE_CHART_ID};
use crate::store::ReportStore;
use archive::ReportArchive;
use chrono::{DateTime, Utc};
use document::ReportDocument;

/// One document for `date`, with the current line chart embedded when one is registered.
pub fn export_one(
    store: &ReportStore,
    charts: &ChartRegistry,
    date: &str,
    generated_at: DateTime<Utc>,
) -> anyhow::Result<ReportDocument> {
    let record = store.get(date).ok_or_else(|| ReportError::NotFound {
        date: date.to_string(),
    })?;

    let chart = charts.get(LINE_CHART_ID);
    let doc = document::render(record, chart.as_ref().map(|h| &h.spec), generated_at)?;
    tracing::info!(%date, with_chart = chart.is_some(), "report exported");
    Ok(doc)
}

/// Every stored record, in store order, bundled into one archive.
pub fn export_all(store: &ReportStore, generated_at: DateTime<Utc>) -> anyhow::Result<ReportArchive> {
    if store.is_empty() {
        return Err(ReportError::Empty.into());
    }
    let bundle = archive::build(store.records(), generated_at)?;
    tracing::info!(entries = bundle.entries.len(), bytes = bundle.bytes.len(), "report archive exported");
    Ok(bundle)
}
