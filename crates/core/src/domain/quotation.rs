use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuotationId(pub String);

impl QuotationId {
    /// Generate an identifier in the `quot_<timestamp>_<seq>` form the API
    /// hands out. The process-wide sequence keeps ids created within the
    /// same second distinct.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let sequence = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("quot_{}_{sequence:04}", now.format("%Y%m%d%H%M%S")))
    }
}

impl std::fmt::Display for QuotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationStatus {
    Draft,
    Processing,
    Generated,
    Failed,
    Sent,
    Accepted,
    Rejected,
    Expired,
    Cancelled,
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Processing => "processing",
            Self::Generated => "generated",
            Self::Failed => "failed",
            Self::Sent => "sent",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for QuotationStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "processing" => Ok(Self::Processing),
            "generated" => Ok(Self::Generated),
            "failed" => Ok(Self::Failed),
            "sent" => Ok(Self::Sent),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(DomainError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Quotation lifecycle record as held by the store. Section content produced
/// by the pipeline lives in [`crate::state::QuotationState`]; this is the
/// CRUD-facing shell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quotation {
    pub id: QuotationId,
    pub quote_number: String,
    pub company_name: String,
    pub prepared_by: String,
    pub status: QuotationStatus,
    pub client_name: Option<String>,
    pub client_contact: Option<String>,
    pub project_name: Option<String>,
    pub project_description: Option<String>,
    pub validity_days: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quotation {
    pub fn can_transition_to(&self, next: QuotationStatus) -> bool {
        use QuotationStatus::{
            Accepted, Cancelled, Draft, Expired, Failed, Generated, Processing, Rejected, Sent,
        };

        matches!(
            (self.status, next),
            (Draft, Processing)
                | (Processing, Generated)
                | (Processing, Failed)
                | (Failed, Processing)
                | (Generated, Processing)
                | (Generated, Sent)
                | (Sent, Accepted)
                | (Sent, Rejected)
                | (Sent, Expired)
                | (_, Cancelled)
        )
    }

    pub fn transition_to(&mut self, next: QuotationStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            self.status = next;
            self.updated_at = Utc::now();
            return Ok(());
        }

        Err(DomainError::InvalidStatusTransition { from: self.status, to: next })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{Quotation, QuotationId, QuotationStatus};

    fn quotation(status: QuotationStatus) -> Quotation {
        let now = Utc::now();
        Quotation {
            id: QuotationId("quot_20260101120000".to_string()),
            quote_number: "QT-20260101-0001".to_string(),
            company_name: "ProQuote Electrical".to_string(),
            prepared_by: "Test User".to_string(),
            status,
            client_name: None,
            client_contact: None,
            project_name: None,
            project_description: None,
            validity_days: 30,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn allows_draft_into_processing() {
        let mut record = quotation(QuotationStatus::Draft);
        record.transition_to(QuotationStatus::Processing).expect("draft -> processing");
        assert_eq!(record.status, QuotationStatus::Processing);
    }

    #[test]
    fn blocks_draft_straight_to_sent() {
        let mut record = quotation(QuotationStatus::Draft);
        let error =
            record.transition_to(QuotationStatus::Sent).expect_err("draft -> sent should fail");
        assert!(matches!(error, crate::errors::DomainError::InvalidStatusTransition { .. }));
        assert_eq!(record.status, QuotationStatus::Draft);
    }

    #[test]
    fn failed_generation_can_be_retried() {
        let mut record = quotation(QuotationStatus::Failed);
        record.transition_to(QuotationStatus::Processing).expect("failed -> processing");
        record.transition_to(QuotationStatus::Generated).expect("processing -> generated");
        assert_eq!(record.status, QuotationStatus::Generated);
    }

    #[test]
    fn any_state_can_be_cancelled() {
        for status in [QuotationStatus::Draft, QuotationStatus::Sent, QuotationStatus::Failed] {
            let mut record = quotation(status);
            record.transition_to(QuotationStatus::Cancelled).expect("cancel always allowed");
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        let parsed: QuotationStatus = "Generated".parse().expect("parse known status");
        assert_eq!(parsed, QuotationStatus::Generated);
        assert_eq!(parsed.as_str(), "generated");

        let unknown = "archived".parse::<QuotationStatus>();
        assert!(unknown.is_err());
    }

    #[test]
    fn generated_ids_carry_the_quot_prefix() {
        let id = QuotationId::generate(Utc::now());
        assert!(id.0.starts_with("quot_"));
    }

    #[test]
    fn ids_generated_in_the_same_second_are_distinct() {
        let now = Utc::now();
        let first = QuotationId::generate(now);
        let second = QuotationId::generate(now);
        assert_ne!(first, second);
    }
}
