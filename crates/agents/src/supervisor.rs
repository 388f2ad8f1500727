use std::time::Instant;

use serde_json::{json, Map, Value};
use tracing::{info, warn};

use proquote_core::config::AppConfig;
use proquote_core::domain::quotation::QuotationStatus;
use proquote_core::state::{AgentRunStatus, QuotationState};

use crate::agent::{AgentRegistry, SectionAgent};
use crate::company::CompanyInfoAgent;
use crate::footer::FooterAgent;
use crate::header::HeaderAgent;
use crate::project::ProjectInfoAgent;

/// Drives the fixed agent sequence header → company → project → footer
/// against a shared [`QuotationState`].
///
/// Each step is isolated: a failure is appended to the execution log with
/// the error string and the remaining steps still run. There is no rollback;
/// sections produced before a failure stay in the state.
pub struct QuotationSupervisor {
    header: HeaderAgent,
    company: CompanyInfoAgent,
    project: ProjectInfoAgent,
    footer: FooterAgent,
    default_company_name: String,
}

impl QuotationSupervisor {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            header: HeaderAgent::new(config.quotation.quote_number_prefix.clone()),
            company: CompanyInfoAgent::new(config.company.clone()),
            project: ProjectInfoAgent,
            footer: FooterAgent::new(config.company.clone()),
            default_company_name: config.company.name.clone(),
        }
    }

    /// Run the whole pipeline. Always returns the (possibly partially
    /// populated) state; the overall outcome is reflected in its status.
    pub async fn generate(&self, mut state: QuotationState) -> QuotationState {
        info!(
            event_name = "pipeline.started",
            quotation_id = %state.quotation_id,
            "starting quotation generation"
        );
        state.touch();

        let header_input = self.header_input(&state);
        self.run_step(&self.header, header_input, &mut state, |state, output| {
            state.quote_number =
                output.get("quote_number").and_then(Value::as_str).map(str::to_string);
            state.header = Some(output);
        })
        .await;

        self.run_step(&self.company, json!({}), &mut state, |state, output| {
            state.company = Some(output);
        })
        .await;

        let project_input = Self::project_input(&state);
        self.run_step(&self.project, project_input, &mut state, |state, output| {
            state.project_section = Some(output);
        })
        .await;

        let footer_input = Self::footer_input(&state);
        self.run_step(&self.footer, footer_input, &mut state, |state, output| {
            state.terms_and_conditions = output
                .get("terms_and_conditions")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            state.footer = Some(output);
        })
        .await;

        state.status = if state.has_failures() {
            QuotationStatus::Failed
        } else {
            QuotationStatus::Generated
        };
        state.touch();

        info!(
            event_name = "pipeline.completed",
            quotation_id = %state.quotation_id,
            status = state.status.as_str(),
            steps = state.execution_log.len(),
            failures = state.errors.len(),
            "quotation generation finished"
        );

        state
    }

    async fn run_step<F>(
        &self,
        agent: &dyn SectionAgent,
        input: Value,
        state: &mut QuotationState,
        apply: F,
    ) where
        F: FnOnce(&mut QuotationState, Value),
    {
        let started = Instant::now();
        match agent.process(input).await {
            Ok(output) => {
                apply(state, output);
                let duration_ms = started.elapsed().as_millis() as u64;
                state.log_execution(agent.name(), AgentRunStatus::Success, duration_ms, None);
                info!(
                    event_name = "pipeline.step_completed",
                    quotation_id = %state.quotation_id,
                    agent = agent.name(),
                    duration_ms,
                    "agent step completed"
                );
            }
            Err(error) => {
                let message = error.to_string();
                state.log_execution(agent.name(), AgentRunStatus::Failed, 0, Some(message.clone()));
                state.record_error(agent.name(), message.clone());
                warn!(
                    event_name = "pipeline.step_failed",
                    quotation_id = %state.quotation_id,
                    agent = agent.name(),
                    error = %message,
                    "agent step failed, continuing with remaining steps"
                );
            }
        }
    }

    fn header_input(&self, state: &QuotationState) -> Value {
        let mut input = Map::new();
        input.insert(
            "company_name".to_string(),
            Value::String(
                state.company_name.clone().unwrap_or_else(|| self.default_company_name.clone()),
            ),
        );
        input.insert("prepared_by".to_string(), Value::String(state.prepared_by.clone()));
        input.insert("validity_days".to_string(), Value::from(state.validity_days));
        insert_non_empty(&mut input, "client_name", &state.client.name);
        insert_non_empty(&mut input, "client_contact", &state.client.email);
        insert_non_empty(&mut input, "project_name", &state.project.name);
        Value::Object(input)
    }

    fn project_input(state: &QuotationState) -> Value {
        let mut input = Map::new();
        insert_non_empty(&mut input, "project_name", &state.project.name);
        insert_non_empty(&mut input, "project_description", &state.project.description);
        if let Some(location) = &state.project.location {
            input.insert("location".to_string(), location.clone());
        }
        if let Some(start_date) = &state.project.start_date {
            input.insert("start_date".to_string(), Value::String(start_date.clone()));
        }
        if let Some(duration) = &state.project.duration {
            input.insert("duration".to_string(), Value::String(duration.clone()));
        }
        Value::Object(input)
    }

    fn footer_input(state: &QuotationState) -> Value {
        let mut input = Map::new();
        input.insert("quotation_id".to_string(), Value::String(state.quotation_id.to_string()));
        input.insert("validity_days".to_string(), Value::from(state.validity_days));
        if let Some(custom_terms) = &state.custom_terms {
            input.insert("custom_terms".to_string(), Value::String(custom_terms.clone()));
        }
        Value::Object(input)
    }
}

fn insert_non_empty(input: &mut Map<String, Value>, key: &str, value: &str) {
    if !value.is_empty() {
        input.insert(key.to_string(), Value::String(value.to_string()));
    }
}

/// Build the agent registry that backs the `/agents` API surface.
pub fn build_registry(config: &AppConfig) -> AgentRegistry {
    let mut registry = AgentRegistry::default();
    registry.register(HeaderAgent::new(config.quotation.quote_number_prefix.clone()));
    registry.register(CompanyInfoAgent::new(config.company.clone()));
    registry.register(ProjectInfoAgent);
    registry.register(FooterAgent::new(config.company.clone()));
    registry
}
