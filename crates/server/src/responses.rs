//! Shared JSON error envelope for the HTTP surface.

use axum::{http::StatusCode, Json};
use serde::Serialize;

use proquote_core::errors::InterfaceError;

/// Body returned for every non-2xx response. `error` is the safe
/// user-facing summary; `detail` carries the specific failure and
/// `correlation_id` ties the response to the server logs.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
    pub correlation_id: String,
}

pub type ApiError = (StatusCode, Json<ErrorBody>);

pub fn error_response(interface: InterfaceError) -> ApiError {
    let status = match &interface {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::Conflict { .. } => StatusCode::CONFLICT,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let (detail, correlation_id) = match &interface {
        InterfaceError::BadRequest { message, correlation_id }
        | InterfaceError::NotFound { message, correlation_id }
        | InterfaceError::Conflict { message, correlation_id }
        | InterfaceError::Internal { message, correlation_id } => {
            (message.clone(), correlation_id.clone())
        }
    };

    (status, Json(ErrorBody { error: interface.user_message(), detail, correlation_id }))
}
