use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationForm, ApplicationId, DocumentId, EmployeeReference, EmploymentInformation,
    GuarantorAgreement, GuarantorInformation, LandlordReference, ResidentialInformation,
};
use super::status::{
    ApplicationStatus, AuditTrail, VerificationDocumentType, VerificationField,
    VerificationStatus, YesNo,
};

/// Supporting document attached to an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedDocument {
    pub document_id: DocumentId,
    pub application_id: ApplicationId,
    pub name: String,
    pub verification_type: Option<VerificationDocumentType>,
}

/// Repository record carrying everything verification reads and writes.
///
/// `version` increases on every write so concurrent verification runs can be detected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub application_id: ApplicationId,
    pub version: u64,
    pub status: ApplicationStatus,
    pub form: ApplicationForm,
    pub verification: VerificationStatus,
    pub completed_steps: AuditTrail,
    pub documents: Vec<AttachedDocument>,
    pub guarantor_information: Option<GuarantorInformation>,
    pub guarantor_agreement: Option<GuarantorAgreement>,
    pub employment_information: Option<EmploymentInformation>,
    pub employee_reference: Option<EmployeeReference>,
    pub residential_information: Option<ResidentialInformation>,
    pub landlord_reference: Option<LandlordReference>,
}

impl ApplicationRecord {
    pub fn new(application_id: ApplicationId, form: ApplicationForm) -> Self {
        Self {
            application_id,
            version: 0,
            status: ApplicationStatus::Pending,
            form,
            verification: VerificationStatus::default(),
            completed_steps: AuditTrail::default(),
            documents: Vec::new(),
            guarantor_information: None,
            guarantor_agreement: None,
            employment_information: None,
            employee_reference: None,
            residential_information: None,
            landlord_reference: None,
        }
    }

    /// Declared types of every attached document, in attachment order.
    pub fn attached_types(&self) -> Vec<VerificationDocumentType> {
        self.documents
            .iter()
            .filter_map(|document| document.verification_type)
            .collect()
    }

    pub fn verification_view(&self) -> VerificationView {
        let fields = VerificationField::ALL
            .iter()
            .map(|field| (field.label(), self.verification.get(*field)))
            .collect();

        VerificationView {
            application_id: self.application_id.clone(),
            status: self.status.label(),
            fully_verified: self.verification.is_fully_verified(),
            fields,
            outstanding: self
                .verification
                .outstanding()
                .into_iter()
                .map(VerificationField::label)
                .collect(),
            completed_steps: self
                .completed_steps
                .steps()
                .iter()
                .map(|step| step.label())
                .collect(),
        }
    }
}

/// Write applied after a verification run.
///
/// The repository must reject the update with [`RepositoryError::Conflict`] when the
/// stored record's version differs from `expected_version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationUpdate {
    pub expected_version: u64,
    pub verified: Vec<VerificationField>,
    pub status: Option<ApplicationStatus>,
}

/// Storage abstraction so the verification service can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    /// Store a new record. A known application id is [`RepositoryError::AlreadyExists`].
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn find_document(&self, id: &DocumentId)
        -> Result<Option<AttachedDocument>, RepositoryError>;
    /// Attach a document, bumping the record version. Identical re-attaches succeed unchanged.
    fn attach_document(
        &self,
        document: AttachedDocument,
    ) -> Result<ApplicationRecord, RepositoryError>;
    /// Set the named fields to YES (and optionally move the lifecycle status) under an
    /// optimistic version check.
    fn apply_verification(
        &self,
        id: &ApplicationId,
        update: VerificationUpdate,
    ) -> Result<ApplicationRecord, RepositoryError>;
    /// Append a step to the audit trail. Returns `false` when the step was already present.
    fn append_audit_step(
        &self,
        id: &ApplicationId,
        step: ApplicationStatus,
    ) -> Result<bool, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record was modified concurrently; retry the operation")]
    Conflict,
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, RepositoryError::Conflict)
    }
}

/// Apply a [`VerificationUpdate`] to an in-memory record, enforcing the version check.
///
/// Shared by in-process repository adapters.
pub fn apply_update_in_place(
    record: &mut ApplicationRecord,
    update: &VerificationUpdate,
) -> Result<(), RepositoryError> {
    if record.version != update.expected_version {
        return Err(RepositoryError::Conflict);
    }

    for field in &update.verified {
        record.verification.set(*field, YesNo::Yes);
    }
    if let Some(status) = update.status {
        record.status = status;
    }
    record.version += 1;
    Ok(())
}

/// Attach a document to an in-memory record.
///
/// Re-attaching an identical document is a no-op so a client can safely retry an attach whose
/// follow-up verification failed. A different document under a known id is rejected.
pub fn attach_document_in_place(
    record: &mut ApplicationRecord,
    document: AttachedDocument,
) -> Result<(), RepositoryError> {
    if let Some(existing) = record
        .documents
        .iter()
        .find(|existing| existing.document_id == document.document_id)
    {
        if *existing == document {
            return Ok(());
        }
        return Err(RepositoryError::AlreadyExists(format!(
            "document {}",
            document.document_id.0
        )));
    }

    record.documents.push(document);
    record.version += 1;
    Ok(())
}

/// Trait describing outbound notification hooks (e-mail, landlord dashboard, ...).
pub trait AlertPublisher: Send + Sync {
    fn publish(&self, alert: ScreeningAlert) -> Result<(), AlertError>;
}

/// Notification payload emitted when an application changes verification state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningAlert {
    pub template: String,
    pub application_id: ApplicationId,
    pub details: BTreeMap<String, String>,
}

/// Alert dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("alert transport unavailable: {0}")]
    Transport(String),
}

/// Sanitized representation of an application's verification state.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationView {
    pub application_id: ApplicationId,
    pub status: &'static str,
    pub fully_verified: bool,
    pub fields: BTreeMap<&'static str, YesNo>,
    pub outstanding: Vec<&'static str>,
    pub completed_steps: Vec<&'static str>,
}
