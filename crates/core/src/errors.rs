use thiserror::Error;

use crate::domain::quotation::QuotationStatus;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid quotation transition from {from:?} to {to:?}")]
    InvalidStatusTransition { from: QuotationStatus, to: QuotationStatus },
    #[error("unknown quotation status `{0}`")]
    UnknownStatus(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

/// Failure raised by a single section agent. The supervisor records these in
/// the execution log instead of aborting the pipeline.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error("{agent}: missing required fields: {fields}")]
    MissingInput { agent: &'static str, fields: String },
    #[error("{agent}: invalid input: {message}")]
    InvalidInput { agent: &'static str, message: String },
    #[error("{agent}: template rendering failed: {message}")]
    Rendering { agent: &'static str, message: String },
    #[error("unknown agent `{0}`")]
    UnknownAgent(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("quotation {0} not found")]
    QuotationNotFound(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("conflict: {message}")]
    Conflict { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::NotFound { .. } => "The requested quotation or agent does not exist.",
            Self::Conflict { .. } => "The quotation is not in a state that allows this action.",
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Conflict { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(DomainError::InvalidStatusTransition { from, to }) => {
                Self::Conflict {
                    message: format!("cannot move quotation from {from:?} to {to:?}"),
                    correlation_id: "unassigned".to_owned(),
                }
            }
            ApplicationError::Domain(_) | ApplicationError::Agent(_) => Self::BadRequest {
                message: "validation failed".to_owned(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::QuotationNotFound(id) => Self::NotFound {
                message: format!("quotation {id} not found"),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}
