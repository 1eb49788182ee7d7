use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::workflows::screening::{
    apply_update_in_place, attach_document_in_place, verification_router, AlertError,
    AlertPublisher, ApplicationForm, ApplicationId, ApplicationRecord, ApplicationRepository,
    ApplicationStatus, AttachedDocument, BankStatementDocument, DocumentId, FieldValue,
    FixedClock, GuarantorAgreement, GuarantorInformation, IdentityDocument, MatchingTolerances,
    PayslipDocument, RepositoryError, ScreeningAlert, Transaction, TransactionType,
    VerificationDocumentType, VerificationService, VerificationUpdate,
};

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
}

pub(super) fn form() -> ApplicationForm {
    ApplicationForm {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        date_of_birth: "1990-01-01".to_string(),
        address_line1: "221B Baker Street".to_string(),
        zip_code: "NW1 6XE".to_string(),
    }
}

pub(super) fn identity(expiry: &str) -> IdentityDocument {
    IdentityDocument {
        full_name: Some("Jane Q Doe".to_string()),
        date_of_birth: Some("1990-01-01".to_string()),
        expiry_date: Some(expiry.to_string()),
    }
}

pub(super) fn payslip(net_income: &str, pay_date: &str) -> PayslipDocument {
    PayslipDocument {
        employee_name: Some("Jane Doe".to_string()),
        employer_name: Some("Acme Ltd".to_string()),
        net_income: Some(FieldValue::from(net_income)),
        pay_date: Some(pay_date.to_string()),
    }
}

pub(super) fn credit(amount: f64, date: &str) -> Transaction {
    Transaction {
        date: Some(date.to_string()),
        amount: Some(FieldValue::from(amount)),
        kind: Some(TransactionType::Credit),
        description: Some("ACME LTD SALARY".to_string()),
    }
}

pub(super) fn statement(transactions: Vec<Transaction>) -> BankStatementDocument {
    BankStatementDocument {
        account_holder_name: Some("Ms Jane Doe".to_string()),
        transactions,
    }
}

pub(super) fn guarantor_information() -> GuarantorInformation {
    GuarantorInformation {
        full_name: "John Michael Smith".to_string(),
        date_of_birth: Some("1965-07-21".to_string()),
        national_insurance_number: Some("QQ123456C".to_string()),
    }
}

pub(super) fn guarantor_agreement() -> GuarantorAgreement {
    GuarantorAgreement {
        first_name: "John".to_string(),
        middle_name: Some("Michael".to_string()),
        last_name: "Smith".to_string(),
        date_of_birth: Some("1965-07-21T00:00:00.000Z".to_string()),
        national_insurance_number: Some(" qq123456c ".to_string()),
    }
}

pub(super) fn record(id: &str) -> ApplicationRecord {
    ApplicationRecord::new(ApplicationId(id.to_string()), form())
}

pub(super) fn attachment(
    application: &str,
    document: &str,
    verification_type: Option<VerificationDocumentType>,
) -> AttachedDocument {
    AttachedDocument {
        document_id: DocumentId(document.to_string()),
        application_id: ApplicationId(application.to_string()),
        name: format!("{document}.pdf"),
        verification_type,
    }
}

pub(super) const EVERY_DOCUMENT: [VerificationDocumentType; 10] = [
    VerificationDocumentType::EmploymentLetter,
    VerificationDocumentType::PayStub,
    VerificationDocumentType::TaxReturn,
    VerificationDocumentType::BankStatement,
    VerificationDocumentType::CreditReport,
    VerificationDocumentType::BackgroundCheck,
    VerificationDocumentType::LandlordReference,
    VerificationDocumentType::GuarantorIncome,
    VerificationDocumentType::GuarantorEmployment,
    VerificationDocumentType::RefereeConfirmation,
];

pub(super) fn build_service() -> (
    VerificationService<MemoryRepository, MemoryAlerts>,
    Arc<MemoryRepository>,
    Arc<MemoryAlerts>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let alerts = Arc::new(MemoryAlerts::default());
    let service = VerificationService::with_clock(
        repository.clone(),
        alerts.clone(),
        MatchingTolerances::default(),
        Arc::new(FixedClock(today())),
    );
    (service, repository, alerts)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ApplicationId, ApplicationRecord>>>,
}

impl ApplicationRepository for MemoryRepository {
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

    fn find_document(
        &self,
        id: &DocumentId,
    ) -> Result<Option<AttachedDocument>, RepositoryError> {
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

#[derive(Default, Clone)]
pub(super) struct MemoryAlerts {
    events: Arc<Mutex<Vec<ScreeningAlert>>>,
}

impl MemoryAlerts {
    pub(super) fn events(&self) -> Vec<ScreeningAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

impl AlertPublisher for MemoryAlerts {
    fn publish(&self, alert: ScreeningAlert) -> Result<(), AlertError> {
        self.events
            .lock()
            .expect("alert mutex poisoned")
            .push(alert);
        Ok(())
    }
}

/// Repository whose stored record always moves underneath the writer.
pub(super) struct ConflictRepository {
    pub(super) inner: MemoryRepository,
}

impl ApplicationRepository for ConflictRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn find_document(
        &self,
        id: &DocumentId,
    ) -> Result<Option<AttachedDocument>, RepositoryError> {
        self.inner.find_document(id)
    }

    fn attach_document(
        &self,
        document: AttachedDocument,
    ) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.attach_document(document)
    }

    fn apply_verification(
        &self,
        id: &ApplicationId,
        mut update: VerificationUpdate,
    ) -> Result<ApplicationRecord, RepositoryError> {
        update.expected_version += 1;
        self.inner.apply_verification(id, update)
    }

    fn append_audit_step(
        &self,
        id: &ApplicationId,
        step: ApplicationStatus,
    ) -> Result<bool, RepositoryError> {
        self.inner.append_audit_step(id, step)
    }
}

/// Repository whose first verification write loses an optimistic version race.
pub(super) struct RacedOnceRepository {
    pub(super) inner: MemoryRepository,
    pub(super) raced: AtomicBool,
}

impl ApplicationRepository for RacedOnceRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn find_document(
        &self,
        id: &DocumentId,
    ) -> Result<Option<AttachedDocument>, RepositoryError> {
        self.inner.find_document(id)
    }

    fn attach_document(
        &self,
        document: AttachedDocument,
    ) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.attach_document(document)
    }

    fn apply_verification(
        &self,
        id: &ApplicationId,
        update: VerificationUpdate,
    ) -> Result<ApplicationRecord, RepositoryError> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            return Err(RepositoryError::Conflict);
        }
        self.inner.apply_verification(id, update)
    }

    fn append_audit_step(
        &self,
        id: &ApplicationId,
        step: ApplicationStatus,
    ) -> Result<bool, RepositoryError> {
        self.inner.append_audit_step(id, step)
    }
}

/// Alert publisher whose transport is down for the first `failures` publishes.
#[derive(Default)]
pub(super) struct FlakyAlerts {
    pub(super) failures: AtomicUsize,
    pub(super) delivered: MemoryAlerts,
}

impl AlertPublisher for FlakyAlerts {
    fn publish(&self, alert: ScreeningAlert) -> Result<(), AlertError> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(AlertError::Transport("smtp relay refused".to_string()));
        }
        self.delivered.publish(alert)
    }
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_document(
        &self,
        _id: &DocumentId,
    ) -> Result<Option<AttachedDocument>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn attach_document(
        &self,
        _document: AttachedDocument,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn apply_verification(
        &self,
        _id: &ApplicationId,
        _update: VerificationUpdate,
    ) -> Result<ApplicationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn append_audit_step(
        &self,
        _id: &ApplicationId,
        _step: ApplicationStatus,
    ) -> Result<bool, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn router_with_service(
    service: VerificationService<MemoryRepository, MemoryAlerts>,
) -> axum::Router {
    verification_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
