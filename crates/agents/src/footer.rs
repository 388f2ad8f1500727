use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tera::{Context, Tera};

use proquote_core::config::CompanyProfile;
use proquote_core::errors::AgentError;

use crate::agent::{AgentKind, SectionAgent};

const AGENT_NAME: &str = "FooterAgent";
const DEFAULT_VALIDITY_DAYS: u32 = 30;

const DEFAULT_TERMS: &str = "\
Terms & Conditions:
1. This quotation is valid for {{ validity_days }} days from the date of issue.
2. Prices are subject to change based on material availability.
3. Payment terms: 50% deposit upon acceptance, 50% upon completion.
4. All work will be performed in accordance with NEC 2023 standards.
5. Warranty: 1 year on workmanship, manufacturer's warranty on materials.
";

const DEFAULT_DISCLAIMER: &str = "\
Disclaimer:
This quotation is based on the information provided and site conditions observed.
Any changes to scope, specifications, or unforeseen conditions may result in
additional charges. Permits and inspection fees are not included unless specified.
";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FooterInput {
    pub quotation_id: Option<String>,
    pub validity_days: Option<u32>,
    pub custom_terms: Option<String>,
    pub custom_disclaimer: Option<String>,
    pub custom_signature_block: Option<SignatureBlock>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignatureBlock {
    pub acceptance_text: String,
    pub client_signature: String,
    pub company_signature: String,
}

impl Default for SignatureBlock {
    fn default() -> Self {
        Self {
            acceptance_text: "By signing below, you accept this quotation and agree to the \
                              terms and conditions."
                .to_string(),
            client_signature: "Client Signature: _______________________  Date: ___________"
                .to_string(),
            company_signature:
                "Company Representative: _______________________  Date: ___________".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FooterContactInfo {
    pub phone: String,
    pub email: String,
    pub website: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FooterSections {
    pub contact_info: FooterContactInfo,
    pub license_info: String,
    pub insurance_info: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FooterSection {
    pub quotation_id: String,
    pub terms_and_conditions: String,
    pub disclaimer: String,
    pub signature_block: SignatureBlock,
    pub footer_sections: FooterSections,
    pub page_template: String,
    pub generated_at: DateTime<Utc>,
}

/// Produces the footer: terms and conditions (templated on validity days),
/// legal disclaimer, signature block, and contact/license lines drawn from
/// the configured company profile.
pub struct FooterAgent {
    profile: CompanyProfile,
}

impl FooterAgent {
    pub fn new(profile: CompanyProfile) -> Self {
        Self { profile }
    }

    pub fn generate(&self, input: &FooterInput) -> Result<FooterSection, AgentError> {
        let quotation_id = input
            .quotation_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AgentError::MissingInput {
                agent: AGENT_NAME,
                fields: "quotation_id".to_string(),
            })?
            .to_string();

        let validity_days = input.validity_days.unwrap_or(DEFAULT_VALIDITY_DAYS);

        let mut context = Context::new();
        context.insert("validity_days", &validity_days);

        let terms_template = input.custom_terms.as_deref().unwrap_or(DEFAULT_TERMS);
        let terms_and_conditions = render(terms_template, &context)?;

        let disclaimer_template = input.custom_disclaimer.as_deref().unwrap_or(DEFAULT_DISCLAIMER);
        let disclaimer = render(disclaimer_template, &context)?;

        let signature_block = input.custom_signature_block.clone().unwrap_or_default();

        Ok(FooterSection {
            quotation_id,
            terms_and_conditions,
            disclaimer,
            signature_block,
            footer_sections: FooterSections {
                contact_info: FooterContactInfo {
                    phone: self.profile.phone.clone(),
                    email: self.profile.email.clone(),
                    website: self.profile.website.clone(),
                },
                license_info: format!(
                    "Licensed Electrical Contractor #{}",
                    self.profile.registration_number
                ),
                insurance_info: "Fully Insured and Bonded".to_string(),
            },
            page_template: "Page {page_num} of {total_pages}".to_string(),
            generated_at: Utc::now(),
        })
    }
}

fn render(template: &str, context: &Context) -> Result<String, AgentError> {
    Tera::one_off(template, context, false)
        .map_err(|error| AgentError::Rendering { agent: AGENT_NAME, message: error.to_string() })
}

#[async_trait]
impl SectionAgent for FooterAgent {
    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Simple
    }

    async fn process(&self, input: Value) -> Result<Value, AgentError> {
        let input: FooterInput = serde_json::from_value(input).map_err(|error| {
            AgentError::InvalidInput { agent: AGENT_NAME, message: error.to_string() }
        })?;
        serde_json::to_value(self.generate(&input)?).map_err(|error| AgentError::Rendering {
            agent: AGENT_NAME,
            message: error.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use proquote_core::config::AppConfig;
    use proquote_core::errors::AgentError;

    use crate::agent::SectionAgent;

    use super::{FooterAgent, FooterInput, SignatureBlock};

    fn agent() -> FooterAgent {
        FooterAgent::new(AppConfig::default().company)
    }

    fn input() -> FooterInput {
        FooterInput { quotation_id: Some("quot_1".to_string()), ..FooterInput::default() }
    }

    #[test]
    fn default_terms_render_validity_days() {
        let section = agent().generate(&input()).expect("footer generates");

        assert!(section.terms_and_conditions.contains("valid for 30 days"));
        assert!(section.disclaimer.starts_with("Disclaimer:"));
        assert_eq!(section.quotation_id, "quot_1");
    }

    #[test]
    fn custom_validity_flows_into_terms() {
        let mut data = input();
        data.validity_days = Some(45);

        let section = agent().generate(&data).expect("footer generates");
        assert!(section.terms_and_conditions.contains("valid for 45 days"));
    }

    #[test]
    fn custom_terms_are_templated_too() {
        let mut data = input();
        data.custom_terms = Some("Offer stands for {{ validity_days }} days only.".to_string());

        let section = agent().generate(&data).expect("footer generates");
        assert_eq!(section.terms_and_conditions, "Offer stands for 30 days only.");
    }

    #[test]
    fn custom_signature_block_is_passed_through() {
        let mut data = input();
        data.custom_signature_block = Some(SignatureBlock {
            acceptance_text: "Sign here.".to_string(),
            client_signature: "X: ____".to_string(),
            company_signature: "Y: ____".to_string(),
        });

        let section = agent().generate(&data).expect("footer generates");
        assert_eq!(section.signature_block.acceptance_text, "Sign here.");
    }

    #[test]
    fn contact_lines_come_from_the_company_profile() {
        let section = agent().generate(&input()).expect("footer generates");

        assert_eq!(section.footer_sections.contact_info.email, "info@proquote.com");
        assert_eq!(
            section.footer_sections.license_info,
            "Licensed Electrical Contractor #REG-2024-001"
        );
        assert_eq!(section.page_template, "Page {page_num} of {total_pages}");
    }

    #[test]
    fn missing_quotation_id_is_rejected() {
        let error = agent().generate(&FooterInput::default()).expect_err("must reject");
        assert!(matches!(
            error,
            AgentError::MissingInput { agent: "FooterAgent", ref fields } if fields == "quotation_id"
        ));
    }

    #[test]
    fn broken_custom_template_is_a_rendering_error() {
        let mut data = input();
        data.custom_terms = Some("{{ validity_days".to_string());

        let error = agent().generate(&data).expect_err("template must fail");
        assert!(matches!(error, AgentError::Rendering { .. }));
    }

    #[tokio::test]
    async fn process_round_trips_through_json() {
        let output = agent()
            .process(json!({"quotation_id": "quot_9", "validity_days": 15}))
            .await
            .expect("footer processes");

        assert_eq!(output["quotation_id"], "quot_9");
        assert!(output["terms_and_conditions"]
            .as_str()
            .expect("terms are a string")
            .contains("valid for 15 days"));
    }
}
