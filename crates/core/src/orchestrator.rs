use crate::domain::contract::parse_prediction_response;
use crate::domain::report::{conditions_by_date, ReportRecord};
use crate::error::ReportError;
use crate::service::PredictionBackend;
use crate::store::ReportStore;
use crate::time::range::PredictionRequest;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

pub type SharedStore = Arc<RwLock<ReportStore>>;

/// Sequences the date-normalization and prediction calls and merges the result
/// into the store.
///
/// Each run takes a fresh generation number. A run that finds a newer generation
/// after one of its awaits gives up with [`ReportError::Superseded`] and leaves the
/// store alone, so a slow run can never overwrite a newer one.
pub struct Orchestrator {
    backend: Arc<dyn PredictionBackend>,
    store: SharedStore,
    generation: AtomicU64,
    max_range_days: Option<u32>,
}

impl Orchestrator {
    pub fn new(
        backend: Arc<dyn PredictionBackend>,
        store: SharedStore,
        max_range_days: Option<u32>,
    ) -> Self {
        Self {
            backend,
            store,
            generation: AtomicU64::new(0),
            max_range_days,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Retires every in-flight run; each one fails with
    /// [`ReportError::Superseded`] at its next check.
    pub fn invalidate(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn validate(
        &self,
        start_date: &str,
        end_date: &str,
        fish_count: &str,
    ) -> anyhow::Result<PredictionRequest> {
        PredictionRequest::validate(start_date, end_date, fish_count, self.max_range_days)
    }

    pub fn validate_picker_range(
        &self,
        range: &str,
        fish_count: &str,
    ) -> anyhow::Result<PredictionRequest> {
        PredictionRequest::validate_picker_range(range, fish_count, self.max_range_days)
    }

    pub async fn run_prediction(
        &self,
        start_date: &str,
        end_date: &str,
        fish_count: &str,
    ) -> anyhow::Result<Vec<ReportRecord>> {
        let request = self.validate(start_date, end_date, fish_count)?;
        self.run(&request).await
    }

    /// Runs an already validated request.
    pub async fn run(&self, request: &PredictionRequest) -> anyhow::Result<Vec<ReportRecord>> {
        let generation = self.invalidate();
        let run_id = Uuid::new_v4();
        let wire = request.to_wire();

        tracing::info!(
            %run_id,
            generation,
            backend = self.backend.backend_name(),
            start_date = %wire.start_date,
            end_date = %wire.end_date,
            fish_count = request.fish_count,
            "prediction run started"
        );

        // A stale run reports Superseded even when its call failed.
        let payload = self.backend.process_dates(&wire).await;
        self.ensure_current(generation)?;
        let payload = payload.map_err(into_request_error)?;

        let body = self.backend.predict(&payload).await;
        self.ensure_current(generation)?;
        let body = body.map_err(into_request_error)?;

        let entries = parse_prediction_response(body)?;
        let conditions = conditions_by_date(&payload);
        let records: Vec<ReportRecord> = entries
            .into_iter()
            .map(|entry| {
                let found = conditions.get(&entry.date);
                ReportRecord::from_entry(entry, request.fish_count, found)
            })
            .collect();

        let summary = {
            let mut store = self.store.write().await;
            // Re-check under the write lock so a superseded run cannot slip in a merge.
            self.ensure_current(generation)?;
            store.merge(records.clone())
        };

        tracing::info!(
            %run_id,
            generation,
            entries = records.len(),
            inserted = summary.inserted,
            replaced = summary.replaced,
            "prediction run merged"
        );

        Ok(records)
    }

    fn ensure_current(&self, generation: u64) -> anyhow::Result<()> {
        let current = self.current_generation();
        if current != generation {
            tracing::warn!(generation, current, "dropping superseded prediction run");
            return Err(ReportError::Superseded { generation }.into());
        }
        Ok(())
    }
}

fn into_request_error(err: anyhow::Error) -> anyhow::Error {
    if ReportError::of(&err).is_some() {
        return err;
    }
    ReportError::Request(format!("{err:#}")).into()
}
