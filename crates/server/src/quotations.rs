//! Quotation lifecycle routes.
//!
//! - `POST   /api/v1/quotations`                — create a draft quotation
//! - `GET    /api/v1/quotations`                — list (status filter, skip/limit)
//! - `GET    /api/v1/quotations/{id}`           — fetch one
//! - `PATCH  /api/v1/quotations/{id}`           — partial update
//! - `DELETE /api/v1/quotations/{id}`           — delete
//! - `POST   /api/v1/quotations/{id}/generate`  — run the agent pipeline in the background
//! - `GET    /api/v1/quotations/{id}/status`    — generation status plus produced data
//! - `GET    /api/v1/quotations/{id}/document`  — assembled quotation document

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use proquote_agents::QuotationSupervisor;
use proquote_core::config::AppConfig;
use proquote_core::domain::quotation::{Quotation, QuotationId, QuotationStatus};
use proquote_core::errors::{ApplicationError, InterfaceError};
use proquote_core::state::{ClientInfo, ProjectInputs, QuotationState};

use crate::responses::{error_response, ApiError};
use crate::store::{GeneratedDocument, QuotationStore};

#[derive(Clone)]
pub struct ApiState {
    pub config: Arc<AppConfig>,
    pub store: QuotationStore,
    pub supervisor: Arc<QuotationSupervisor>,
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct QuotationCreate {
    pub company_name: String,
    pub prepared_by: String,
    pub client_name: Option<String>,
    pub client_contact: Option<String>,
    pub project_name: Option<String>,
    pub project_description: Option<String>,
    pub validity_days: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct QuotationResponse {
    pub id: String,
    pub quote_number: String,
    pub company_name: String,
    pub prepared_by: String,
    pub status: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_description: Option<String>,
    pub validity_days: u32,
}

impl From<Quotation> for QuotationResponse {
    fn from(record: Quotation) -> Self {
        Self {
            id: record.id.to_string(),
            quote_number: record.quote_number,
            company_name: record.company_name,
            prepared_by: record.prepared_by,
            status: record.status.as_str(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            client_name: record.client_name,
            client_contact: record.client_contact,
            project_name: record.project_name,
            project_description: record.project_description,
            validity_days: record.validity_days,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct QuotationUpdate {
    pub status: Option<String>,
    pub client_name: Option<String>,
    pub client_contact: Option<String>,
    pub project_name: Option<String>,
    pub project_description: Option<String>,
    pub validity_days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message: &'static str,
    pub quotation_id: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub quotation_id: String,
    pub status: &'static str,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_data: Option<GeneratedDocument>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn not_found(id: &QuotationId, correlation_id: &str) -> ApiError {
    error_response(
        ApplicationError::QuotationNotFound(id.to_string()).into_interface(correlation_id),
    )
}

fn bad_request(message: impl Into<String>, correlation_id: &str) -> ApiError {
    error_response(InterfaceError::BadRequest {
        message: message.into(),
        correlation_id: correlation_id.to_string(),
    })
}

fn correlation_id() -> String {
    Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/v1/quotations", post(create_quotation).get(list_quotations))
        .route(
            "/api/v1/quotations/{id}",
            get(get_quotation).patch(update_quotation).delete(delete_quotation),
        )
        .route("/api/v1/quotations/{id}/generate", post(generate_quotation))
        .route("/api/v1/quotations/{id}/status", get(generation_status))
        .route("/api/v1/quotations/{id}/document", get(quotation_document))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn create_quotation(
    State(state): State<ApiState>,
    Json(payload): Json<QuotationCreate>,
) -> Result<(StatusCode, Json<QuotationResponse>), ApiError> {
    let correlation = correlation_id();
    if payload.company_name.trim().is_empty() || payload.prepared_by.trim().is_empty() {
        return Err(bad_request("company_name and prepared_by are required", &correlation));
    }

    let now = Utc::now();
    let id = QuotationId::generate(now);
    let prefix = &state.config.quotation.quote_number_prefix;
    let record = Quotation {
        id: id.clone(),
        quote_number: format!("{prefix}-{}-0001", now.format("%Y%m%d")),
        company_name: payload.company_name,
        prepared_by: payload.prepared_by,
        status: QuotationStatus::Draft,
        client_name: payload.client_name,
        client_contact: payload.client_contact,
        project_name: payload.project_name,
        project_description: payload.project_description,
        validity_days: payload
            .validity_days
            .unwrap_or(state.config.quotation.default_validity_days),
        created_at: now,
        updated_at: now,
    };

    state.store.insert(record.clone()).await;
    info!(
        event_name = "api.quotation.created",
        quotation_id = %id,
        correlation_id = %correlation,
        "quotation created"
    );

    Ok((StatusCode::CREATED, Json(record.into())))
}

async fn list_quotations(
    State(state): State<ApiState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<QuotationResponse>>, ApiError> {
    let correlation = correlation_id();
    let status = match query.status.as_deref() {
        Some(raw) => Some(
            raw.parse::<QuotationStatus>()
                .map_err(|error| bad_request(error.to_string(), &correlation))?,
        ),
        None => None,
    };

    let records = state
        .store
        .list(status, query.skip.unwrap_or(0), query.limit.unwrap_or(100))
        .await;
    Ok(Json(records.into_iter().map(QuotationResponse::from).collect()))
}

async fn get_quotation(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<QuotationResponse>, ApiError> {
    let correlation = correlation_id();
    let id = QuotationId(id);
    let stored = state.store.get(&id).await.ok_or_else(|| not_found(&id, &correlation))?;
    Ok(Json(stored.record.into()))
}

async fn update_quotation(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(update): Json<QuotationUpdate>,
) -> Result<Json<QuotationResponse>, ApiError> {
    let correlation = correlation_id();
    let id = QuotationId(id);

    let next_status = match update.status.as_deref() {
        Some(raw) => Some(
            raw.parse::<QuotationStatus>()
                .map_err(|error| bad_request(error.to_string(), &correlation))?,
        ),
        None => None,
    };

    let record = state
        .store
        .update(&id, |record| {
            if let Some(status) = next_status {
                record.transition_to(status)?;
            }
            if let Some(client_name) = update.client_name {
                record.client_name = Some(client_name);
            }
            if let Some(client_contact) = update.client_contact {
                record.client_contact = Some(client_contact);
            }
            if let Some(project_name) = update.project_name {
                record.project_name = Some(project_name);
            }
            if let Some(project_description) = update.project_description {
                record.project_description = Some(project_description);
            }
            if let Some(validity_days) = update.validity_days {
                record.validity_days = validity_days;
            }
            Ok(())
        })
        .await
        .map_err(|error| error_response(error.into_interface(&*correlation)))?;

    Ok(Json(record.into()))
}

async fn delete_quotation(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let correlation = correlation_id();
    let id = QuotationId(id);
    if state.store.delete(&id).await {
        info!(
            event_name = "api.quotation.deleted",
            quotation_id = %id,
            correlation_id = %correlation,
            "quotation deleted"
        );
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&id, &correlation))
    }
}

async fn generate_quotation(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<GenerateResponse>), ApiError> {
    let correlation = correlation_id();
    let id = QuotationId(id);

    let record = state
        .store
        .mark_processing(&id)
        .await
        .map_err(|error| error_response(error.into_interface(&*correlation)))?;

    let pipeline_state = initial_state(&id, &record);
    let store = state.store.clone();
    let supervisor = Arc::clone(&state.supervisor);
    let task_id = id.clone();
    tokio::spawn(async move {
        let final_state = supervisor.generate(pipeline_state).await;
        store.store_result(&task_id, &final_state).await;
    });

    info!(
        event_name = "api.quotation.generation_started",
        quotation_id = %id,
        correlation_id = %correlation,
        "quotation generation dispatched to background task"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(GenerateResponse {
            message: "Quotation generation started",
            quotation_id: id.to_string(),
            status: QuotationStatus::Processing.as_str(),
        }),
    ))
}

fn initial_state(id: &QuotationId, record: &Quotation) -> QuotationState {
    let mut pipeline_state = QuotationState::new(id.clone(), record.prepared_by.clone());
    pipeline_state.status = QuotationStatus::Processing;
    pipeline_state.company_name = Some(record.company_name.clone());
    pipeline_state.client = ClientInfo {
        name: record.client_name.clone().unwrap_or_default(),
        email: record.client_contact.clone().unwrap_or_default(),
    };
    pipeline_state.project = ProjectInputs {
        name: record.project_name.clone().unwrap_or_default(),
        description: record.project_description.clone().unwrap_or_default(),
        location: None,
        start_date: None,
        duration: None,
    };
    pipeline_state.validity_days = record.validity_days;
    pipeline_state
}

async fn generation_status(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let correlation = correlation_id();
    let id = QuotationId(id);
    let stored = state.store.get(&id).await.ok_or_else(|| not_found(&id, &correlation))?;

    Ok(Json(StatusResponse {
        quotation_id: id.to_string(),
        status: stored.record.status.as_str(),
        updated_at: stored.record.updated_at,
        generated_data: stored.generated,
        error: stored.generation_error,
    }))
}

async fn quotation_document(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let correlation = correlation_id();
    let id = QuotationId(id);
    let stored = state.store.get(&id).await.ok_or_else(|| not_found(&id, &correlation))?;

    if stored.record.status != QuotationStatus::Generated {
        return Err(bad_request(
            format!(
                "quotation is not ready, current status: {}",
                stored.record.status.as_str()
            ),
            &correlation,
        ));
    }

    let Some(generated) = stored.generated else {
        error!(
            event_name = "api.quotation.document_missing",
            quotation_id = %id,
            correlation_id = %correlation,
            "quotation marked generated but no document snapshot was stored"
        );
        return Err(error_response(InterfaceError::Internal {
            message: "generated data not found".to_string(),
            correlation_id: correlation,
        }));
    };

    let record = stored.record;
    let document = json!({
        "quotation_id": id.to_string(),
        "document": {
            "header": generated.header,
            "company_info": generated.company_info,
            "client_info": {
                "name": record.client_name,
                "contact": record.client_contact,
                "project": record.project_name,
            },
            "project_info": generated.project_info,
            "terms_and_conditions": generated.terms_and_conditions,
            "footer": generated.footer,
        },
        "metadata": {
            "generated_at": record.updated_at,
            "prepared_by": record.prepared_by,
            "quote_number": generated.quote_number,
        },
    });

    Ok(Json(document))
}
