use crate::config::Settings;
use crate::domain::report::ReportRecord;
use crate::error::ReportError;
use crate::export::{self, archive::ReportArchive, document::ReportDocument};
use crate::orchestrator::{Orchestrator, SharedStore};
use crate::render::chart::ChartHandle;
use crate::render::{DashboardView, Renderer};
use crate::service::PredictionBackend;
use crate::store::ReportStore;
use crate::time::range::PredictionRequest;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// One user's working state: the report store, the rendered view and its charts.
///
/// Created when the front end starts and dropped with it; [`Session::clear`]
/// starts over without restarting.
pub struct Session {
    orchestrator: Orchestrator,
    renderer: Mutex<Renderer>,
}

impl Session {
    pub fn new(backend: Arc<dyn PredictionBackend>, settings: &Settings) -> Self {
        let store: SharedStore = Arc::new(RwLock::new(ReportStore::new()));
        Self {
            orchestrator: Orchestrator::new(backend, store, settings.max_range_days),
            renderer: Mutex::new(Renderer::new()),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub async fn predict(
        &self,
        start_date: &str,
        end_date: &str,
        fish_count: &str,
    ) -> anyhow::Result<Vec<ReportRecord>> {
        let request = self.orchestrator.validate(start_date, end_date, fish_count)?;
        self.predict_validated(&request).await
    }

    pub async fn predict_range(
        &self,
        range: &str,
        fish_count: &str,
    ) -> anyhow::Result<Vec<ReportRecord>> {
        let request = self.orchestrator.validate_picker_range(range, fish_count)?;
        self.predict_validated(&request).await
    }

    async fn predict_validated(
        &self,
        request: &PredictionRequest,
    ) -> anyhow::Result<Vec<ReportRecord>> {
        self.renderer.lock().await.set_loading();

        match self.orchestrator.run(request).await {
            Ok(records) => {
                let store = self.orchestrator.store().read().await;
                self.renderer.lock().await.render(store.records());
                Ok(records)
            }
            // A newer run owns the view now.
            Err(err) if matches!(ReportError::of(&err), Some(ReportError::Superseded { .. })) => {
                Err(err)
            }
            Err(err) => {
                let service_message = match ReportError::of(&err) {
                    Some(ReportError::Request(msg)) => Some(msg.as_str()),
                    _ => None,
                };
                tracing::warn!(error = %format!("{err:#}"), "prediction failed");
                self.renderer.lock().await.set_failed(service_message);
                Err(err)
            }
        }
    }

    pub async fn view(&self) -> DashboardView {
        self.renderer.lock().await.view().clone()
    }

    pub async fn records(&self) -> Vec<ReportRecord> {
        self.orchestrator.store().read().await.records().to_vec()
    }

    pub async fn chart(&self, chart_id: &str) -> Option<ChartHandle> {
        self.renderer.lock().await.charts().get(chart_id)
    }

    pub async fn export_one(&self, date: &str) -> anyhow::Result<ReportDocument> {
        let store = self.orchestrator.store().read().await;
        let renderer = self.renderer.lock().await;
        export::export_one(&store, renderer.charts(), date, chrono::Utc::now())
    }

    pub async fn export_all(&self) -> anyhow::Result<ReportArchive> {
        let store = self.orchestrator.store().read().await;
        export::export_all(&store, chrono::Utc::now())
    }

    /// Empties the store and the view. Runs still in flight are retired so
    /// none of them can merge into the cleared store.
    pub async fn clear(&self) {
        let mut store = self.orchestrator.store().write().await;
        let generation = self.orchestrator.invalidate();
        let dropped = store.len();
        store.clear();
        self.renderer.lock().await.reset();
        tracing::info!(dropped, generation, "session cleared");
    }
}
