//! Process-local quotation storage.
//!
//! The product references external databases but the quotation lifecycle
//! itself is served from this in-memory map; nothing survives a restart.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use proquote_core::domain::quotation::{Quotation, QuotationId, QuotationStatus};
use proquote_core::errors::{ApplicationError, DomainError};
use proquote_core::state::{AgentExecution, QuotationState, StateError};

/// Snapshot of what the pipeline produced for a quotation, stored alongside
/// the CRUD record once a generation run finishes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    pub quote_number: Option<String>,
    pub header: Option<Value>,
    pub company_info: Option<Value>,
    pub project_info: Option<Value>,
    pub footer: Option<Value>,
    pub terms_and_conditions: String,
    pub agent_logs: Vec<AgentExecution>,
    pub errors: Vec<StateError>,
}

impl GeneratedDocument {
    pub fn from_state(state: &QuotationState) -> Self {
        Self {
            quote_number: state.quote_number.clone(),
            header: state.header.clone(),
            company_info: state.company.clone(),
            project_info: state.project_section.clone(),
            footer: state.footer.clone(),
            terms_and_conditions: state.terms_and_conditions.clone(),
            agent_logs: state.execution_log.clone(),
            errors: state.errors.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredQuotation {
    pub record: Quotation,
    pub generated: Option<GeneratedDocument>,
    pub generation_error: Option<String>,
}

#[derive(Clone, Default)]
pub struct QuotationStore {
    inner: Arc<RwLock<HashMap<QuotationId, StoredQuotation>>>,
}

impl QuotationStore {
    pub async fn insert(&self, record: Quotation) {
        let mut quotations = self.inner.write().await;
        quotations.insert(
            record.id.clone(),
            StoredQuotation { record, generated: None, generation_error: None },
        );
    }

    pub async fn get(&self, id: &QuotationId) -> Option<StoredQuotation> {
        self.inner.read().await.get(id).cloned()
    }

    /// List records, optionally filtered by status, in creation order with
    /// skip/limit pagination.
    pub async fn list(
        &self,
        status: Option<QuotationStatus>,
        skip: usize,
        limit: usize,
    ) -> Vec<Quotation> {
        let quotations = self.inner.read().await;
        let mut records: Vec<Quotation> = quotations
            .values()
            .filter(|stored| status.map_or(true, |wanted| stored.record.status == wanted))
            .map(|stored| stored.record.clone())
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
        records.into_iter().skip(skip).take(limit).collect()
    }

    pub async fn update<F>(&self, id: &QuotationId, mutate: F) -> Result<Quotation, ApplicationError>
    where
        F: FnOnce(&mut Quotation) -> Result<(), DomainError>,
    {
        let mut quotations = self.inner.write().await;
        let stored = quotations
            .get_mut(id)
            .ok_or_else(|| ApplicationError::QuotationNotFound(id.to_string()))?;
        mutate(&mut stored.record)?;
        stored.record.updated_at = Utc::now();
        Ok(stored.record.clone())
    }

    pub async fn delete(&self, id: &QuotationId) -> bool {
        self.inner.write().await.remove(id).is_some()
    }

    /// Flip a quotation into `Processing` ahead of a background generation
    /// run, enforcing the lifecycle guard.
    pub async fn mark_processing(&self, id: &QuotationId) -> Result<Quotation, ApplicationError> {
        self.update(id, |record| record.transition_to(QuotationStatus::Processing)).await
    }

    /// Persist the outcome of a pipeline run. The final status comes from the
    /// state itself (`Generated` or `Failed`).
    pub async fn store_result(&self, id: &QuotationId, state: &QuotationState) {
        let mut quotations = self.inner.write().await;
        // The quotation may have been deleted while generation was running;
        // in that case the result is simply dropped.
        if let Some(stored) = quotations.get_mut(id) {
            stored.record.status = state.status;
            stored.record.updated_at = Utc::now();
            if let Some(quote_number) = &state.quote_number {
                stored.record.quote_number = quote_number.clone();
            }
            stored.generated = Some(GeneratedDocument::from_state(state));
            stored.generation_error = state
                .errors
                .first()
                .map(|error| format!("{}: {}", error.agent, error.error));
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use proquote_core::domain::quotation::{Quotation, QuotationId, QuotationStatus};
    use proquote_core::errors::ApplicationError;
    use proquote_core::state::QuotationState;

    use super::QuotationStore;

    fn quotation(id: &str, minutes_ago: i64) -> Quotation {
        let created_at = Utc::now() - Duration::minutes(minutes_ago);
        Quotation {
            id: QuotationId(id.to_string()),
            quote_number: format!("QT-{id}"),
            company_name: "ProQuote Electrical".to_string(),
            prepared_by: "Test User".to_string(),
            status: QuotationStatus::Draft,
            client_name: None,
            client_contact: None,
            project_name: None,
            project_description: None,
            validity_days: 30,
            created_at,
            updated_at: created_at,
        }
    }

    #[tokio::test]
    async fn insert_get_delete_round_trip() {
        let store = QuotationStore::default();
        store.insert(quotation("a", 0)).await;

        let stored = store.get(&QuotationId("a".to_string())).await.expect("present");
        assert_eq!(stored.record.quote_number, "QT-a");
        assert!(stored.generated.is_none());

        assert!(store.delete(&QuotationId("a".to_string())).await);
        assert!(!store.delete(&QuotationId("a".to_string())).await);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn list_orders_by_creation_and_paginates() {
        let store = QuotationStore::default();
        store.insert(quotation("c", 1)).await;
        store.insert(quotation("a", 3)).await;
        store.insert(quotation("b", 2)).await;

        let all = store.list(None, 0, 100).await;
        assert_eq!(
            all.iter().map(|q| q.id.0.as_str()).collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );

        let page = store.list(None, 1, 1).await;
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id.0, "b");
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let store = QuotationStore::default();
        store.insert(quotation("a", 2)).await;
        store.insert(quotation("b", 1)).await;
        store
            .update(&QuotationId("b".to_string()), |record| {
                record.transition_to(QuotationStatus::Processing)
            })
            .await
            .expect("update succeeds");

        let processing = store.list(Some(QuotationStatus::Processing), 0, 100).await;
        assert_eq!(processing.len(), 1);
        assert_eq!(processing[0].id.0, "b");

        let drafts = store.list(Some(QuotationStatus::Draft), 0, 100).await;
        assert_eq!(drafts.len(), 1);
    }

    #[tokio::test]
    async fn update_of_missing_quotation_is_not_found() {
        let store = QuotationStore::default();
        let error = store
            .update(&QuotationId("ghost".to_string()), |_| Ok(()))
            .await
            .expect_err("must fail");
        assert!(matches!(error, ApplicationError::QuotationNotFound(_)));
    }

    #[tokio::test]
    async fn mark_processing_enforces_the_lifecycle_guard() {
        let store = QuotationStore::default();
        store.insert(quotation("a", 0)).await;
        let id = QuotationId("a".to_string());

        let record = store.mark_processing(&id).await.expect("draft -> processing");
        assert_eq!(record.status, QuotationStatus::Processing);

        // Already processing: a second generate request must be rejected.
        let error = store.mark_processing(&id).await.expect_err("processing -> processing");
        assert!(matches!(error, ApplicationError::Domain(_)));
    }

    #[tokio::test]
    async fn store_result_snapshots_the_pipeline_state() {
        let store = QuotationStore::default();
        store.insert(quotation("a", 0)).await;
        let id = QuotationId("a".to_string());
        store.mark_processing(&id).await.expect("mark processing");

        let mut state = QuotationState::new(id.clone(), "Test User");
        state.status = QuotationStatus::Generated;
        state.quote_number = Some("QT-20260101-0001".to_string());
        state.terms_and_conditions = "terms".to_string();

        store.store_result(&id, &state).await;

        let stored = store.get(&id).await.expect("present");
        assert_eq!(stored.record.status, QuotationStatus::Generated);
        assert_eq!(stored.record.quote_number, "QT-20260101-0001");
        let generated = stored.generated.expect("document snapshot present");
        assert_eq!(generated.terms_and_conditions, "terms");
        assert!(stored.generation_error.is_none());
    }

    #[tokio::test]
    async fn store_result_for_deleted_quotation_is_dropped() {
        let store = QuotationStore::default();
        let id = QuotationId("gone".to_string());
        let state = QuotationState::new(id.clone(), "Test User");

        store.store_result(&id, &state).await;
        assert!(store.get(&id).await.is_none());
    }
}
