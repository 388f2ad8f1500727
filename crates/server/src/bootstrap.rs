//! Wires configuration, the in-memory store, the agent pipeline and the
//! HTTP routers into a single serveable application.

use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use proquote_agents::{build_registry, QuotationSupervisor};
use proquote_core::config::AppConfig;

use crate::agents_api::{self, AgentsState};
use crate::health;
use crate::quotations::{self, ApiState};
use crate::store::QuotationStore;

pub struct Application {
    pub config: Arc<AppConfig>,
    pub router: Router,
}

impl Application {
    pub fn build(config: AppConfig) -> Self {
        let config = Arc::new(config);
        let store = QuotationStore::default();
        let supervisor = Arc::new(QuotationSupervisor::new(&config));
        let registry = Arc::new(build_registry(&config));

        let api_state = ApiState {
            config: Arc::clone(&config),
            store: store.clone(),
            supervisor,
        };

        let router = Router::new()
            .route("/", get(banner))
            .merge(quotations::router(api_state))
            .merge(agents_api::router(AgentsState::new(registry)))
            .merge(health::router(store))
            .layer(CorsLayer::permissive());

        Self { config, router }
    }
}

async fn banner() -> Json<Value> {
    Json(json!({
        "service": "ProQuote API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/api/v1",
    }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use proquote_core::config::AppConfig;

    use super::Application;

    #[tokio::test]
    async fn built_application_serves_the_banner() {
        let app = Application::build(AppConfig::default());
        let response = app
            .router
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request builds"))
            .await
            .expect("request runs");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn built_application_mounts_all_route_groups() {
        let app = Application::build(AppConfig::default());
        for uri in ["/api/v1/quotations", "/api/v1/agents", "/api/v1/health"] {
            let response = app
                .router
                .clone()
                .oneshot(
                    Request::builder().uri(uri).body(Body::empty()).expect("request builds"),
                )
                .await
                .expect("request runs");
            assert_eq!(response.status(), StatusCode::OK, "route {uri} should be mounted");
        }
    }
}
