pub mod http;

use crate::domain::contract::DateRangeRequest;
use serde_json::Value;

/// The two external services a prediction run depends on.
///
/// Implementations return the decoded JSON body; interpreting error payloads is
/// left to the orchestrator.
#[async_trait::async_trait]
pub trait PredictionBackend: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Turns a date range into the weather payload the prediction service expects.
    async fn process_dates(&self, request: &DateRangeRequest) -> anyhow::Result<Value>;

    /// Runs the model on a payload produced by [`PredictionBackend::process_dates`].
    async fn predict(&self, payload: &Value) -> anyhow::Result<Value>;
}
