use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tenant_verify::workflows::screening::{
    apply_update_in_place, attach_document_in_place, AlertError, AlertPublisher, ApplicationId,
    ApplicationRecord, ApplicationRepository, ApplicationStatus, AttachedDocument, DocumentId,
    RepositoryError, ScreeningAlert, VerificationUpdate,
};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local application store. Every write bumps the record version.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.application_id) {
            return Err(RepositoryError::AlreadyExists(format!(
                "application {}",
                record.application_id.0
            )));
        }
        guard.insert(record.application_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn find_document(&self, id: &DocumentId) -> Result<Option<AttachedDocument>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .flat_map(|record| record.documents.iter())
            .find(|document| &document.document_id == id)
            .cloned())
    }

    fn attach_document(
        &self,
        document: AttachedDocument,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard
            .get_mut(&document.application_id)
            .ok_or(RepositoryError::NotFound)?;
        attach_document_in_place(record, document)?;
        Ok(record.clone())
    }

    fn apply_verification(
        &self,
        id: &ApplicationId,
        update: VerificationUpdate,
    ) -> Result<ApplicationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        apply_update_in_place(record, &update)?;
        Ok(record.clone())
    }

    fn append_audit_step(
        &self,
        id: &ApplicationId,
        step: ApplicationStatus,
    ) -> Result<bool, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        Ok(record.completed_steps.append(step))
    }
}

/// Keeps dispatched alerts in memory; a mail or webhook transport would replace it.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAlertPublisher {
    events: Arc<Mutex<Vec<ScreeningAlert>>>,
}

impl AlertPublisher for InMemoryAlertPublisher {
    fn publish(&self, alert: ScreeningAlert) -> Result<(), AlertError> {
        debug!(template = %alert.template, application_id = %alert.application_id.0, "alert queued");
        let mut guard = self.events.lock().expect("alert mutex poisoned");
        guard.push(alert);
        Ok(())
    }
}

impl InMemoryAlertPublisher {
    pub(crate) fn events(&self) -> Vec<ScreeningAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
