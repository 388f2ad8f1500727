//! Agent roster and direct-execution routes.
//!
//! - `GET  /api/v1/agents`         — list registered agents with usage stats
//! - `GET  /api/v1/agents/types`   — the agent kinds the registry knows about
//! - `GET  /api/v1/agents/{name}`  — one agent's card
//! - `POST /api/v1/agents/execute` — run a single agent outside the pipeline

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use proquote_agents::{AgentKind, AgentRegistry};
use proquote_core::errors::{AgentError, ApplicationError, InterfaceError};

use crate::responses::{error_response, ApiError};

/// Per-agent usage counters, updated on every direct execution.
#[derive(Clone, Copy, Debug, Default)]
struct AgentStats {
    tasks_completed: u64,
    last_active: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct AgentsState {
    registry: Arc<AgentRegistry>,
    stats: Arc<RwLock<HashMap<&'static str, AgentStats>>>,
}

impl AgentsState {
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self { registry, stats: Arc::new(RwLock::new(HashMap::new())) }
    }
}

#[derive(Debug, Serialize)]
pub struct AgentCard {
    pub name: &'static str,
    pub kind: &'static str,
    pub description: &'static str,
    pub tasks_completed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct AgentTypeCard {
    pub kind: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub agent_name: String,
    #[serde(default)]
    pub input_data: Value,
}

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub agent_name: String,
    pub status: &'static str,
    pub result: Value,
}

pub fn router(state: AgentsState) -> Router {
    Router::new()
        .route("/api/v1/agents", get(list_agents))
        .route("/api/v1/agents/types", get(agent_types))
        .route("/api/v1/agents/execute", post(execute_agent))
        .route("/api/v1/agents/{name}", get(get_agent))
        .with_state(state)
}

async fn list_agents(State(state): State<AgentsState>) -> Json<Vec<AgentCard>> {
    let stats = state.stats.read().await;
    let cards = state
        .registry
        .iter()
        .map(|agent| {
            let usage = stats.get(agent.name()).copied().unwrap_or_default();
            AgentCard {
                name: agent.name(),
                kind: agent.kind().as_str(),
                description: agent.kind().description(),
                tasks_completed: usage.tasks_completed,
                last_active: usage.last_active,
            }
        })
        .collect();
    Json(cards)
}

async fn agent_types() -> Json<Vec<AgentTypeCard>> {
    let types = [AgentKind::Simple, AgentKind::Workflow]
        .iter()
        .map(|kind| AgentTypeCard { kind: kind.as_str(), description: kind.description() })
        .collect();
    Json(types)
}

async fn get_agent(
    State(state): State<AgentsState>,
    Path(name): Path<String>,
) -> Result<Json<AgentCard>, ApiError> {
    let correlation = Uuid::new_v4().to_string();
    let agent = state.registry.get(&name).ok_or_else(|| {
        error_response(InterfaceError::NotFound {
            message: format!("agent {name:?} is not registered"),
            correlation_id: correlation,
        })
    })?;

    let usage = state.stats.read().await.get(agent.name()).copied().unwrap_or_default();
    Ok(Json(AgentCard {
        name: agent.name(),
        kind: agent.kind().as_str(),
        description: agent.kind().description(),
        tasks_completed: usage.tasks_completed,
        last_active: usage.last_active,
    }))
}

async fn execute_agent(
    State(state): State<AgentsState>,
    Json(request): Json<ExecuteRequest>,
) -> Result<Json<ExecuteResponse>, ApiError> {
    let correlation = Uuid::new_v4().to_string();
    let input = if request.input_data.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        request.input_data
    };

    let result = state.registry.execute(&request.agent_name, input).await.map_err(|error| {
        let interface = match error {
            AgentError::UnknownAgent(name) => InterfaceError::NotFound {
                message: format!("agent {name:?} is not registered"),
                correlation_id: correlation.clone(),
            },
            other => ApplicationError::from(other).into_interface(&*correlation),
        };
        error_response(interface)
    })?;

    if let Some(agent) = state.registry.get(&request.agent_name) {
        let mut stats = state.stats.write().await;
        let usage = stats.entry(agent.name()).or_default();
        usage.tasks_completed += 1;
        usage.last_active = Some(Utc::now());
    }

    info!(
        event_name = "api.agent.executed",
        agent_name = %request.agent_name,
        correlation_id = %correlation,
        "agent executed directly"
    );

    Ok(Json(ExecuteResponse {
        agent_name: request.agent_name,
        status: "completed",
        result,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use proquote_agents::build_registry;
    use proquote_core::config::AppConfig;

    use super::{router, AgentsState};

    fn test_state() -> AgentsState {
        AgentsState::new(Arc::new(build_registry(&AppConfig::default())))
    }

    async fn response_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("body is json")
    }

    #[tokio::test]
    async fn listing_returns_all_four_agents() {
        let response = router(test_state())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/agents")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request runs");

        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        let names: Vec<&str> = body
            .as_array()
            .expect("list")
            .iter()
            .map(|card| card["name"].as_str().expect("name"))
            .collect();
        assert_eq!(
            names,
            vec!["CompanyInfoAgent", "FooterAgent", "HeaderAgent", "ProjectInfoAgent"]
        );
    }

    #[tokio::test]
    async fn unknown_agent_card_is_404() {
        let response = router(test_state())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/agents/PricingAgent")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request runs");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn execute_runs_the_agent_and_bumps_stats() {
        let state = test_state();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/agents/execute")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "agent_name": "HeaderAgent",
                    "input_data": {"company_name": "Acme", "prepared_by": "Tester"}
                })
                .to_string(),
            ))
            .expect("request builds");

        let response = router(state.clone()).oneshot(request).await.expect("request runs");
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["status"], "completed");
        assert!(body["result"]["quote_number"]
            .as_str()
            .expect("quote number")
            .starts_with("QT-"));

        let response = router(state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/agents/HeaderAgent")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request runs");
        let card = response_json(response).await;
        assert_eq!(card["tasks_completed"], 1);
    }

    #[tokio::test]
    async fn execute_with_invalid_input_is_a_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/agents/execute")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"agent_name": "HeaderAgent", "input_data": {}}).to_string(),
            ))
            .expect("request builds");

        let response = router(test_state()).oneshot(request).await.expect("request runs");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn execute_unknown_agent_is_not_found() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/agents/execute")
            .header("content-type", "application/json")
            .body(Body::from(json!({"agent_name": "NopeAgent"}).to_string()))
            .expect("request builds");

        let response = router(test_state()).oneshot(request).await.expect("request runs");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response_json(response).await;
        assert!(body["detail"].as_str().expect("detail").contains("NopeAgent"));
    }

    #[tokio::test]
    async fn types_lists_both_agent_kinds() {
        let response = router(test_state())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/agents/types")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("request runs");

        let body = response_json(response).await;
        let kinds: Vec<&str> = body
            .as_array()
            .expect("list")
            .iter()
            .map(|card| card["kind"].as_str().expect("kind"))
            .collect();
        assert_eq!(kinds, vec!["simple", "workflow"]);
    }
}
