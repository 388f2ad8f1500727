use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::quotation::{QuotationId, QuotationStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRunStatus {
    Success,
    Failed,
    Skipped,
}

/// One entry in the append-only pipeline execution log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentExecution {
    pub agent: String,
    pub status: AgentRunStatus,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Client-side details captured at quotation creation time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub email: String,
}

/// Project inputs the project-info agent works from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInputs {
    pub name: String,
    pub description: String,
    pub location: Option<Value>,
    pub start_date: Option<String>,
    pub duration: Option<String>,
}

/// The shared mutable record threaded through the agent pipeline. Each agent
/// reads what it needs, and the supervisor copies the agent's section output
/// back in. Section payloads stay as JSON values because their shapes belong
/// to the individual agents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuotationState {
    pub quotation_id: QuotationId,
    pub quote_number: Option<String>,
    pub status: QuotationStatus,

    pub prepared_by: String,
    pub company_name: Option<String>,
    pub client: ClientInfo,
    pub project: ProjectInputs,
    pub validity_days: u32,
    pub custom_terms: Option<String>,

    pub header: Option<Value>,
    pub company: Option<Value>,
    pub project_section: Option<Value>,
    pub footer: Option<Value>,
    pub terms_and_conditions: String,

    pub execution_log: Vec<AgentExecution>,
    pub errors: Vec<StateError>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateError {
    pub agent: String,
    pub error: String,
    pub recorded_at: DateTime<Utc>,
}

impl QuotationState {
    pub fn new(quotation_id: QuotationId, prepared_by: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            quotation_id,
            quote_number: None,
            status: QuotationStatus::Draft,
            prepared_by: prepared_by.into(),
            company_name: None,
            client: ClientInfo::default(),
            project: ProjectInputs::default(),
            validity_days: 30,
            custom_terms: None,
            header: None,
            company: None,
            project_section: None,
            footer: None,
            terms_and_conditions: String::new(),
            execution_log: Vec::new(),
            errors: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append an execution log entry. The log is append-only; every pipeline
    /// step leaves exactly one entry whether it succeeded or not.
    pub fn log_execution(
        &mut self,
        agent: impl Into<String>,
        status: AgentRunStatus,
        duration_ms: u64,
        error: Option<String>,
    ) {
        self.execution_log.push(AgentExecution {
            agent: agent.into(),
            status,
            duration_ms,
            error,
            recorded_at: Utc::now(),
        });
        self.touch();
    }

    pub fn record_error(&mut self, agent: impl Into<String>, error: impl Into<String>) {
        self.errors.push(StateError {
            agent: agent.into(),
            error: error.into(),
            recorded_at: Utc::now(),
        });
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn has_failures(&self) -> bool {
        self.execution_log.iter().any(|entry| entry.status == AgentRunStatus::Failed)
    }
}
