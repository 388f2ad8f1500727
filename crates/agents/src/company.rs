use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use proquote_core::config::CompanyProfile;
use proquote_core::errors::AgentError;

use crate::agent::{AgentKind, SectionAgent};

const AGENT_NAME: &str = "CompanyInfoAgent";

/// All fields optional: anything absent falls back to the configured
/// company profile, so empty input is always valid.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CompanyInput {
    pub company_name: Option<String>,
    pub company_logo_url: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub registration_number: Option<String>,
    pub tax_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyContact {
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyLegal {
    pub registration_number: String,
    pub tax_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanySection {
    pub name: String,
    pub contact: CompanyContact,
    pub legal: CompanyLegal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompanyOutput {
    pub company_section: CompanySection,
    pub display_text: String,
}

/// Fills in the issuing company block, merging per-quotation overrides over
/// the configured profile.
pub struct CompanyInfoAgent {
    profile: CompanyProfile,
}

impl CompanyInfoAgent {
    pub fn new(profile: CompanyProfile) -> Self {
        Self { profile }
    }

    pub fn generate(&self, input: &CompanyInput) -> CompanyOutput {
        let name = input.company_name.clone().unwrap_or_else(|| self.profile.name.clone());
        let contact = CompanyContact {
            address: input.address.clone().unwrap_or_else(|| self.profile.address.clone()),
            phone: input.phone.clone().unwrap_or_else(|| self.profile.phone.clone()),
            email: input.email.clone().unwrap_or_else(|| self.profile.email.clone()),
            website: input.website.clone().unwrap_or_else(|| self.profile.website.clone()),
        };
        let legal = CompanyLegal {
            registration_number: input
                .registration_number
                .clone()
                .unwrap_or_else(|| self.profile.registration_number.clone()),
            tax_id: input.tax_id.clone().unwrap_or_else(|| self.profile.tax_id.clone()),
        };
        let logo_url = input.company_logo_url.clone().or_else(|| self.profile.logo_url.clone());

        let section = CompanySection { name, contact, legal, logo_url };
        let display_text = format_display_text(&section);

        CompanyOutput { company_section: section, display_text }
    }
}

fn format_display_text(section: &CompanySection) -> String {
    let mut lines = vec![
        section.name.clone(),
        section.contact.address.clone(),
        format!("Phone: {}", section.contact.phone),
        format!("Email: {}", section.contact.email),
        format!("Website: {}", section.contact.website),
    ];

    if !section.legal.registration_number.is_empty() {
        lines.push(format!("Reg. No: {}", section.legal.registration_number));
    }
    if !section.legal.tax_id.is_empty() {
        lines.push(format!("Tax ID: {}", section.legal.tax_id));
    }

    lines.join("\n")
}

#[async_trait]
impl SectionAgent for CompanyInfoAgent {
    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Simple
    }

    async fn process(&self, input: Value) -> Result<Value, AgentError> {
        let input: CompanyInput = serde_json::from_value(input).map_err(|error| {
            AgentError::InvalidInput { agent: AGENT_NAME, message: error.to_string() }
        })?;
        serde_json::to_value(self.generate(&input)).map_err(|error| AgentError::Rendering {
            agent: AGENT_NAME,
            message: error.to_string(),
        })
    }
}
