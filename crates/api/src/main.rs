use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use fishcast_core::domain::report::ReportRecord;
use fishcast_core::error::ReportError;
use fishcast_core::render::chart::ChartHandle;
use fishcast_core::render::DashboardView;
use fishcast_core::service::http::HttpPredictionBackend;
use fishcast_core::session::Session;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = fishcast_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let backend = Arc::new(HttpPredictionBackend::from_settings(&settings)?);
    let state = AppState {
        session: Arc::new(Session::new(backend, &settings)),
    };

    let port = settings.port.unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, base_url = settings.base_url(), "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/predictions", axum::routing::post(post_prediction))
        .route("/reports", get(get_reports).delete(clear_reports))
        .route("/reports/archive", get(get_archive))
        .route("/reports/:date/document", get(get_document))
        .route("/charts/:chart_id", get(get_chart))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    session: Arc<Session>,
}

#[derive(Debug, Deserialize)]
struct PredictionBody {
    #[serde(default)]
    start_date: String,
    #[serde(default)]
    end_date: String,
    /// Accepted as a string or a number.
    #[serde(default)]
    fish_count: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: &'static str,
    error: String,
}

/// Error response: status plus `{kind, error}` body.
struct ApiError(anyhow::Error);

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = match ReportError::of(&self.0) {
            Some(e @ ReportError::Validation(_)) => (StatusCode::BAD_REQUEST, e.kind()),
            Some(e @ (ReportError::NotFound { .. } | ReportError::Empty)) => {
                (StatusCode::NOT_FOUND, e.kind())
            }
            Some(e @ ReportError::Superseded { .. }) => (StatusCode::CONFLICT, e.kind()),
            Some(e @ ReportError::Request(_)) => (StatusCode::BAD_GATEWAY, e.kind()),
            None => {
                sentry_anyhow::capture_anyhow(&self.0);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };

        let body = ErrorBody {
            kind,
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn post_prediction(
    State(state): State<AppState>,
    Json(body): Json<PredictionBody>,
) -> Result<Json<Vec<ReportRecord>>, ApiError> {
    let fish_count = match &body.fish_count {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    };

    let records = state
        .session
        .predict(&body.start_date, &body.end_date, &fish_count)
        .await
        .map_err(|err| {
            if matches!(ReportError::of(&err), Some(ReportError::Request(_))) {
                sentry_anyhow::capture_anyhow(&err);
            }
            err
        })?;

    Ok(Json(records))
}

async fn get_reports(State(state): State<AppState>) -> Json<DashboardView> {
    Json(state.session.view().await)
}

async fn clear_reports(State(state): State<AppState>) -> StatusCode {
    state.session.clear().await;
    StatusCode::NO_CONTENT
}

async fn get_document(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Response, ApiError> {
    let doc = state.session.export_one(&date).await?;
    Ok(attachment("text/plain; charset=utf-8", &doc.file_name, doc.body.into_bytes()))
}

async fn get_archive(State(state): State<AppState>) -> Result<Response, ApiError> {
    let bundle = state.session.export_all().await?;
    Ok(attachment("application/zip", &bundle.file_name, bundle.bytes))
}

async fn get_chart(
    State(state): State<AppState>,
    Path(chart_id): Path<String>,
) -> Result<Json<ChartHandle>, StatusCode> {
    state
        .session
        .chart(&chart_id)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

fn attachment(content_type: &'static str, file_name: &str, bytes: Vec<u8>) -> Response {
    let disposition = format!("attachment; filename=\"{file_name}\"");
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &fishcast_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ReportError) -> StatusCode {
        ApiError(err.into()).into_response().status()
    }

    #[test]
    fn maps_report_errors_to_statuses() {
        assert_eq!(status_of(ReportError::Validation("bad".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ReportError::NotFound { date: "2024-06-01".into() }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(ReportError::Empty), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ReportError::Superseded { generation: 2 }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ReportError::Request("model unavailable".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn attachment_sets_download_headers() {
        let res = attachment("application/zip", "FishReports.zip", vec![1, 2, 3]);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/zip");
        assert_eq!(
            res.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"FishReports.zip\""
        );
    }
}
