use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use proquote_core::errors::AgentError;
use proquote_core::extract;

use crate::agent::{AgentKind, SectionAgent};

const AGENT_NAME: &str = "ProjectInfoAgent";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProjectInput {
    pub project_name: Option<String>,
    pub project_title: Option<String>,
    pub project_description: Option<String>,
    pub raw_text: Option<String>,
    /// Either a bare address string or a structured map.
    pub location: Option<Value>,
    pub start_date: Option<String>,
    pub duration: Option<String>,
    pub estimated_duration: Option<String>,
    pub specifications: Option<Vec<String>>,
    #[serde(default)]
    pub permit_required: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectTimeline {
    pub start_date: DateTime<Utc>,
    pub estimated_duration: String,
    pub completion_date: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TechnicalDetails {
    pub square_footage: Option<u32>,
    pub voltage_requirements: Option<String>,
    pub permit_required: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectSection {
    pub project_name: String,
    pub project_type: String,
    pub location: Value,
    pub timeline: ProjectTimeline,
    pub technical_details: TechnicalDetails,
    pub specifications: Vec<String>,
    pub project_summary: String,
}

/// Derives structured project information from free-text descriptions using
/// the ordered rule tables in `proquote_core::extract`.
#[derive(Default)]
pub struct ProjectInfoAgent;

impl ProjectInfoAgent {
    fn validate(input: &ProjectInput) -> Result<(), AgentError> {
        let has_text = [&input.project_description, &input.project_name, &input.raw_text]
            .into_iter()
            .any(|field| field.as_deref().is_some_and(|value| !value.trim().is_empty()));

        if has_text {
            Ok(())
        } else {
            Err(AgentError::MissingInput {
                agent: AGENT_NAME,
                fields: "project_description, project_name, or raw_text".to_string(),
            })
        }
    }

    pub fn generate(&self, input: &ProjectInput) -> Result<ProjectSection, AgentError> {
        Self::validate(input)?;
        let now = Utc::now();

        let text = [&input.project_description, &input.raw_text, &input.project_name]
            .into_iter()
            .find_map(|field| field.clone().filter(|value| !value.is_empty()))
            .unwrap_or_default();

        let project_name = input
            .project_name
            .clone()
            .or_else(|| input.project_title.clone())
            .unwrap_or_else(|| format!("Project-{}", now.format("%Y%m%d")));

        let project_type = extract::project_type(&text).to_string();
        let location = normalize_location(input.location.as_ref());

        // Explicit start date wins; anything unparseable falls back to a week out.
        let start_date = input
            .start_date
            .as_deref()
            .and_then(parse_start_date)
            .unwrap_or_else(|| now + Duration::days(7));

        let duration_text = input
            .duration
            .clone()
            .or_else(|| input.estimated_duration.clone())
            .filter(|value| !value.is_empty())
            .or_else(|| extract::duration_hint(&text));
        let duration_days = duration_text
            .as_deref()
            .map(extract::parse_duration_days)
            .unwrap_or(extract::DEFAULT_DURATION_DAYS);

        let square_footage = extract::square_footage(&text);
        let voltage_requirements = extract::voltage_requirements(&text);

        let mut specifications = extract::specifications(&text);
        if specifications.is_empty() {
            if let Some(provided) = &input.specifications {
                specifications = provided.clone();
            }
        }

        let permit_required =
            matches!(project_type.as_str(), "commercial" | "industrial" | "new_construction")
                || text.to_lowercase().contains("permit")
                || input.permit_required;

        let technical_details =
            TechnicalDetails { square_footage, voltage_requirements, permit_required };
        let timeline = ProjectTimeline {
            start_date,
            estimated_duration: format!("{duration_days} days"),
            completion_date: start_date + Duration::days(i64::from(duration_days)),
        };

        let project_summary = summarize(
            &project_name,
            &project_type,
            &location,
            &technical_details,
            duration_days,
        );

        Ok(ProjectSection {
            project_name,
            project_type,
            location,
            timeline,
            technical_details,
            specifications,
            project_summary,
        })
    }
}

fn parse_start_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            // Date-only inputs like `2026-02-01` are common in API payloads.
            chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

fn normalize_location(location: Option<&Value>) -> Value {
    match location {
        Some(Value::String(address)) => json!({ "address": address }),
        Some(value @ Value::Object(_)) => value.clone(),
        _ => json!({ "address": "To be determined" }),
    }
}

fn summarize(
    project_name: &str,
    project_type: &str,
    location: &Value,
    technical: &TechnicalDetails,
    duration_days: u32,
) -> String {
    let mut parts = vec![format!("{} project: {project_name}", title_case(project_type))];

    let address =
        location.get("address").and_then(Value::as_str).unwrap_or("Location TBD");
    parts.push(format!("Location: {address}"));

    if let Some(square_footage) = technical.square_footage {
        parts.push(format!("Size: {} sq ft", group_thousands(square_footage)));
    }
    if let Some(voltage) = &technical.voltage_requirements {
        parts.push(format!("Voltage: {voltage}"));
    }
    parts.push(format!("Duration: {duration_days} days"));
    if technical.permit_required {
        parts.push("Permit required".to_string());
    }

    parts.join(" | ")
}

fn title_case(label: &str) -> String {
    label
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn group_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[async_trait]
impl SectionAgent for ProjectInfoAgent {
    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    fn kind(&self) -> AgentKind {
        AgentKind::Workflow
    }

    async fn process(&self, input: Value) -> Result<Value, AgentError> {
        let input: ProjectInput = serde_json::from_value(input).map_err(|error| {
            AgentError::InvalidInput { agent: AGENT_NAME, message: error.to_string() }
        })?;
        serde_json::to_value(self.generate(&input)?).map_err(|error| AgentError::Rendering {
            agent: AGENT_NAME,
            message: error.to_string(),
        })
    }
}
