pub mod config;
pub mod domain;
pub mod errors;
pub mod extract;
pub mod state;

pub use config::{AppConfig, CompanyProfile, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::quotation::{Quotation, QuotationId, QuotationStatus};
pub use errors::{AgentError, ApplicationError, DomainError, InterfaceError};
pub use state::{
    AgentExecution, AgentRunStatus, ClientInfo, ProjectInputs, QuotationState, StateError,
};
