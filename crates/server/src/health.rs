//! Liveness and readiness probes.

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::store::QuotationStore;

const SERVICE_NAME: &str = "proquote-api";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub quotations_in_store: usize,
    pub timestamp: DateTime<Utc>,
}

pub fn router(store: QuotationStore) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/health/ready", get(ready))
        .with_state(store)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })
}

/// Readiness touches the store lock so a wedged store surfaces here
/// instead of on the first real request.
async fn ready(State(store): State<QuotationStore>) -> Json<ReadinessResponse> {
    Json(ReadinessResponse {
        status: "ready",
        quotations_in_store: store.len().await,
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::store::QuotationStore;

    use super::router;

    #[tokio::test]
    async fn health_reports_service_and_version() {
        let response = router(QuotationStore::default())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request runs");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let body: Value = serde_json::from_slice(&bytes).expect("body is json");
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "proquote-api");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn readiness_reports_store_size() {
        let response = router(QuotationStore::default())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health/ready")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request runs");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let body: Value = serde_json::from_slice(&bytes).expect("body is json");
        assert_eq!(body["status"], "ready");
        assert_eq!(body["quotations_in_store"], 0);
    }
}
