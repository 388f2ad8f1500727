use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use proquote_core::errors::AgentError;

use crate::agent::{AgentKind, SectionAgent};

const AGENT_NAME: &str = "HeaderAgent";
const DEFAULT_VALIDITY_DAYS: u32 = 30;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct HeaderInput {
    pub company_name: Option<String>,
    pub prepared_by: Option<String>,
    pub client_name: Option<String>,
    pub client_contact: Option<String>,
    pub project_name: Option<String>,
    pub validity_days: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeaderSection {
    pub quote_number: String,
    pub company_name: String,
    pub quote_date: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub prepared_by: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

/// Produces the quotation header: quote number, issue/validity dates, and
/// the parties involved.
pub struct HeaderAgent {
    quote_number_prefix: String,
}

impl Default for HeaderAgent {
    fn default() -> Self {
        Self::new("QT")
    }
}

impl HeaderAgent {
    pub fn new(quote_number_prefix: impl Into<String>) -> Self {
        Self { quote_number_prefix: quote_number_prefix.into() }
    }

    pub fn generate(&self, input: &HeaderInput) -> Result<HeaderSection, AgentError> {
        let mut missing = Vec::new();
        let company_name = required(&input.company_name, "company_name", &mut missing);
        let prepared_by = required(&input.prepared_by, "prepared_by", &mut missing);
        if !missing.is_empty() {
            return Err(AgentError::MissingInput { agent: AGENT_NAME, fields: missing.join(", ") });
        }

        let quote_date = Utc::now();
        // Sequence is a placeholder until numbering moves to a shared counter.
        let quote_number =
            format!("{}-{}-0001", self.quote_number_prefix, quote_date.format("%Y%m%d"));

        let validity_days = input.validity_days.unwrap_or(DEFAULT_VALIDITY_DAYS);
        let valid_until = quote_date + Duration::days(i64::from(validity_days));

        Ok(HeaderSection {
            quote_number,
            company_name,
            quote_date,
            valid_until,
            prepared_by,
            status: "draft".to_string(),
            client_name: input.client_name.clone(),
            client_contact: input.client_contact.clone(),
            project_name: input.project_name.clone(),
        })
    }
}

fn required(value: &Option<String>, field: &'static str, missing: &mut Vec<&'static str>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            missing.push(field);
            String::new()
        }
    }
}

#[async_trait]
impl SectionAgent for HeaderAgent {
    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Simple
    }

    async fn process(&self, input: Value) -> Result<Value, AgentError> {
        let input: HeaderInput = serde_json::from_value(input).map_err(|error| {
            AgentError::InvalidInput { agent: AGENT_NAME, message: error.to_string() }
        })?;
        let section = self.generate(&input)?;
        serde_json::to_value(section).map_err(|error| AgentError::Rendering {
            agent: AGENT_NAME,
            message: error.to_string(),
        })
    }
}
