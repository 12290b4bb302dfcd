//! HTTP route handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::state::AppState;
use crate::agents::TemplateInputs;
use crate::format::reflow;

const INDEX_HTML: &str = include_str!("index.html");

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub model: String,
    pub search_configured: bool,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        model: state.model.clone(),
        search_configured: state.search_configured,
    })
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub topic: String,
    pub report: String,
    pub elapsed_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

#[derive(Debug)]
pub enum ApiError {
    InvalidBody { status: StatusCode, message: String },
    InvalidTopic,
    Pipeline(String),
    Format(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::InvalidBody { status, message } => (
                status,
                ErrorResponse {
                    error: message,
                    code: "INVALID_BODY",
                },
            ),
            ApiError::InvalidTopic => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Please enter a valid topic.".to_string(),
                    code: "INVALID_TOPIC",
                },
            ),
            ApiError::Pipeline(message) => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse {
                    error: format!("Report generation failed: {message}"),
                    code: "PIPELINE_ERROR",
                },
            ),
            ApiError::Format(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    error: message,
                    code: "FORMAT_ERROR",
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Run the crew for one topic and return the reflowed report.
pub async fn create_report(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<ReportResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::InvalidBody {
        status: rejection.status(),
        message: rejection.body_text(),
    })?;
    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err(ApiError::InvalidTopic);
    }

    info!(%topic, "Received report request");
    let started = Instant::now();

    let inputs = TemplateInputs::from([("topic".to_string(), topic.to_string())]);
    let raw = state.pipeline.run(&inputs).await.map_err(|err| {
        error!(?err, %topic, "Report pipeline failed");
        ApiError::Pipeline(err.to_string())
    })?;

    let report =
        reflow(&raw, state.wrap_width).map_err(|err| ApiError::Format(err.to_string()))?;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(%topic, elapsed_ms, report_len = report.len(), "Report ready");

    Ok(Json(ReportResponse {
        topic: topic.to_string(),
        report,
        elapsed_ms,
    }))
}
