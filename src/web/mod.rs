//! Browser-facing surface for the report crew.
//!
//! - `GET /` - topic form
//! - `POST /api/v1/reports` - run the crew for `{ "topic": ... }`
//! - `GET /health` - liveness and backend info

pub mod routes;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/api/v1/reports", post(routes::create_report))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> anyhow::Result<()> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Serving report form");

    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::agents::TemplateInputs;
    use crate::crew::{Crew, ReportPipeline};
    use crate::llm_client::testing::ScriptedLlmClient;

    struct StubPipeline {
        reply: Option<String>,
    }

    #[async_trait]
    impl ReportPipeline for StubPipeline {
        async fn run(&self, inputs: &TemplateInputs) -> anyhow::Result<String> {
            let topic = inputs.get("topic").cloned().unwrap_or_default();
            match &self.reply {
                Some(reply) => Ok(format!("{topic}: {reply}")),
                None => Err(anyhow!("backend unavailable")
                    .context("task report_writing failed")),
            }
        }
    }

    async fn start_test_server(pipeline: Arc<dyn ReportPipeline>, width: usize) -> String {
        let state = Arc::new(AppState::new(pipeline, width, "stub-model"));
        let router = create_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{addr}")
    }

    async fn post_report(base: &str, body: Value) -> (u16, Value) {
        let resp = reqwest::Client::new()
            .post(format!("{base}/api/v1/reports"))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        let body = resp.json::<Value>().await.unwrap();
        (status, body)
    }

    fn stub(reply: Option<&str>) -> Arc<dyn ReportPipeline> {
        Arc::new(StubPipeline {
            reply: reply.map(str::to_string),
        })
    }

    #[tokio::test]
    async fn index_serves_the_topic_form() {
        let base = start_test_server(stub(Some("ok")), 80).await;
        let resp = reqwest::get(format!("{base}/")).await.unwrap();
        assert_eq!(resp.status().as_u16(), 200);

        let body = resp.text().await.unwrap();
        assert!(body.contains("Medical Diagnosis and Report System"));
        assert!(body.contains("Start Diagnosis"));
    }

    #[tokio::test]
    async fn health_reports_the_model() {
        let base = start_test_server(stub(Some("ok")), 80).await;
        let body: Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"], "stub-model");
    }

    #[tokio::test]
    async fn report_is_reflowed_to_the_configured_width() {
        let long_reply = "finding ".repeat(20);
        let base = start_test_server(stub(Some(long_reply.trim())), 40).await;

        let (status, body) = post_report(&base, json!({ "topic": "  Asthma " })).await;
        assert_eq!(status, 200);
        assert_eq!(body["topic"], "Asthma");

        let report = body["report"].as_str().expect("report is a string");
        assert!(report.starts_with("Asthma: finding"));
        assert!(report.lines().count() > 1);
        assert!(report.lines().all(|line| line.chars().count() <= 40));
        assert_eq!(report.matches("finding").count(), 20);
    }

    #[tokio::test]
    async fn blank_topic_is_rejected() {
        let base = start_test_server(stub(Some("ok")), 80).await;

        let (status, body) = post_report(&base, json!({ "topic": "   " })).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"], "Please enter a valid topic.");
        assert_eq!(body["code"], "INVALID_TOPIC");

        let (status, _) = post_report(&base, json!({})).await;
        assert_eq!(status, 400);
    }

    #[tokio::test]
    async fn pipeline_failure_maps_to_bad_gateway() {
        let base = start_test_server(stub(None), 80).await;

        let (status, body) = post_report(&base, json!({ "topic": "Gout" })).await;
        assert_eq!(status, 502);
        assert_eq!(body["code"], "PIPELINE_ERROR");
        let message = body["error"].as_str().unwrap_or_default();
        assert_eq!(message, "Report generation failed: task report_writing failed");
        assert!(!message.contains("backend unavailable"));
    }

    #[tokio::test]
    async fn malformed_body_gets_a_json_error() {
        let base = start_test_server(stub(Some("ok")), 80).await;
        let client = reqwest::Client::new();

        let resp = client
            .post(format!("{base}/api/v1/reports"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 400);
        let body = resp.json::<Value>().await.unwrap();
        assert_eq!(body["code"], "INVALID_BODY");
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));

        let resp = client
            .post(format!("{base}/api/v1/reports"))
            .body("topic=Gout")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 415);
        let body = resp.json::<Value>().await.unwrap();
        assert_eq!(body["code"], "INVALID_BODY");

        let (status, body) = post_report(&base, json!({ "topic": 42 })).await;
        assert_eq!(status, 422);
        assert_eq!(body["code"], "INVALID_BODY");
    }

    #[tokio::test]
    async fn medical_crew_serves_end_to_end() {
        let crew = Crew::medical(Arc::new(ScriptedLlmClient::default())).expect("valid crew");
        let base = start_test_server(Arc::new(crew), 80).await;

        let (status, body) = post_report(&base, json!({ "topic": "Diabetes" })).await;
        assert_eq!(status, 200);
        assert_eq!(body["report"], "reply-2");
    }
}
