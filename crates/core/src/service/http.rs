use crate::config::Settings;
use crate::domain::contract::{error_message, DateRangeRequest};
use crate::service::PredictionBackend;
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpPredictionBackend {
    http: reqwest::Client,
    base_url: String,
    process_dates_path: String,
    predict_path: String,
}

impl HttpPredictionBackend {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .context("failed to build prediction http client")?;

        Ok(Self {
            http,
            base_url: settings.base_url().to_string(),
            process_dates_path: settings.process_dates_path.clone(),
            predict_path: settings.predict_path.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        stage: &'static str,
        path: &str,
        body: &B,
    ) -> Result<(StatusCode, Value)> {
        let url = self.url(path);
        let t0 = std::time::Instant::now();

        let res = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("{stage} request failed"))?;

        let status = res.status();
        let text = res
            .text()
            .await
            .with_context(|| format!("failed to read {stage} response"))?;

        tracing::debug!(
            stage,
            %url,
            %status,
            elapsed_ms = t0.elapsed().as_millis(),
            "backend call finished"
        );

        Ok((status, decode_body(stage, status, &text)?))
    }
}

#[async_trait::async_trait]
impl PredictionBackend for HttpPredictionBackend {
    fn backend_name(&self) -> &'static str {
        "http_json"
    }

    async fn process_dates(&self, request: &DateRangeRequest) -> Result<Value> {
        let (status, body) = self
            .post_json("process_dates", &self.process_dates_path, request)
            .await?;
        interpret_process_dates(status, body)
    }

    async fn predict(&self, payload: &Value) -> Result<Value> {
        let (status, body) = self.post_json("predict", &self.predict_path, payload).await?;
        interpret_predict(status, body)
    }
}

fn decode_body(stage: &str, status: StatusCode, text: &str) -> Result<Value> {
    serde_json::from_str::<Value>(text)
        .with_context(|| format!("{stage} response is not valid JSON (HTTP {status}): {text}"))
}

/// Accepts only a successful, error-free JSON object; that object is forwarded
/// verbatim to the prediction service.
fn interpret_process_dates(status: StatusCode, body: Value) -> Result<Value> {
    if !status.is_success() {
        anyhow::bail!("process_dates HTTP {status}: {}", error_message(&body));
    }
    anyhow::ensure!(
        body.is_object(),
        "process_dates returned a non-object payload: {body}"
    );
    if body.get("error").is_some_and(|e| !e.is_null()) {
        anyhow::bail!("process_dates failed: {}", error_message(&body));
    }
    Ok(body)
}

// Error bodies ({"error": ...}) are interpreted by the caller; a non-2xx array
// is not something the service ever sends.
fn interpret_predict(status: StatusCode, body: Value) -> Result<Value> {
    if !status.is_success() && body.is_array() {
        anyhow::bail!("predict HTTP {status}");
    }
    Ok(body)
}

fn join_url(base_url: &str, path: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    format!("{}{}", base_url.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joins_base_and_path() {
        assert_eq!(
            join_url("http://localhost:5001/", "process_dates"),
            "http://localhost:5001/process_dates"
        );
        assert_eq!(
            join_url("http://localhost:5001", "/predict_api"),
            "http://localhost:5001/predict_api"
        );
    }

    #[test]
    fn builds_from_default_settings() {
        let backend = HttpPredictionBackend::from_settings(&Settings::default()).unwrap();
        assert_eq!(backend.url(&backend.predict_path), "http://127.0.0.1:5001/predict_api");
        assert_eq!(
            backend.url(&backend.process_dates_path),
            "http://127.0.0.1:5001/process_dates"
        );
    }

    #[test]
    fn process_dates_server_error_keeps_service_message() {
        let body = json!({"error": "Failed to retrieve weather data"});
        let err = interpret_process_dates(StatusCode::INTERNAL_SERVER_ERROR, body).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("500"), "{msg}");
        assert!(msg.contains("Failed to retrieve weather data"), "{msg}");
    }

    #[test]
    fn process_dates_error_object_fails_even_on_success_status() {
        let body = json!({"error": "start_date is required"});
        let err = interpret_process_dates(StatusCode::OK, body).unwrap_err();
        assert!(format!("{err:#}").contains("start_date is required"));

        // A null error field is just an absent one.
        let body = json!({"error": null, "date_range": 1});
        assert!(interpret_process_dates(StatusCode::OK, body).is_ok());
    }

    #[test]
    fn process_dates_rejects_non_object_payloads() {
        for body in [json!([1, 2]), json!("ok"), json!(null)] {
            let err = interpret_process_dates(StatusCode::OK, body).unwrap_err();
            assert!(format!("{err:#}").contains("non-object payload"));
        }
    }

    #[test]
    fn process_dates_passes_payload_through() {
        let body = json!({"start_date": "2024-06-01", "date_range": 3, "forecast": []});
        let got = interpret_process_dates(StatusCode::OK, body.clone()).unwrap();
        assert_eq!(got, body);
    }

    #[test]
    fn non_json_bodies_name_stage_and_status() {
        let err = decode_body("process_dates", StatusCode::BAD_GATEWAY, "<html>bad gateway</html>")
            .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("process_dates response is not valid JSON (HTTP 502"), "{msg}");
        assert!(msg.contains("<html>bad gateway</html>"), "{msg}");

        assert_eq!(
            decode_body("predict", StatusCode::OK, "[]").unwrap(),
            json!([])
        );
    }

    #[test]
    fn predict_leaves_error_objects_to_the_caller() {
        let body = json!({"error": "model unavailable"});
        let got = interpret_predict(StatusCode::INTERNAL_SERVER_ERROR, body.clone()).unwrap();
        assert_eq!(got, body);

        assert!(interpret_predict(StatusCode::SERVICE_UNAVAILABLE, json!([])).is_err());
        assert!(interpret_predict(StatusCode::OK, json!([])).is_ok());
    }
}
