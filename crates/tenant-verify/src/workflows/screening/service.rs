use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::aggregator::recompute;
use super::checks::{
    validate_address, validate_id_against_form, validate_income, MatchingTolerances,
};
use super::clock::{Clock, SystemClock};
use super::documents::DocumentBundle;
use super::domain::{ApplicationForm, ApplicationId, DocumentId, ValidationResult};
use super::repository::{
    AlertError, AlertPublisher, ApplicationRecord, ApplicationRepository, AttachedDocument,
    RepositoryError, ScreeningAlert, VerificationUpdate,
};
use super::screeners::{employment_screener, guarantor_screener, landlord_screener};
use super::status::{ApplicationStatus, VerificationField};

/// Verdicts for one bundle of extracted documents.
///
/// A check is `None` when the bundle lacked the documents it needs; those checks are listed
/// in `missing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentCheckReport {
    pub identity: Option<ValidationResult>,
    pub income: Option<ValidationResult>,
    pub address: Option<ValidationResult>,
    pub missing: Vec<&'static str>,
}

impl DocumentCheckReport {
    pub fn passed(&self) -> bool {
        self.missing.is_empty()
            && [&self.identity, &self.income, &self.address]
                .into_iter()
                .flatten()
                .all(|result| result.passed)
    }
}

/// Service composing the document checks, screeners, and verification aggregator over a
/// repository.
pub struct VerificationService<R, A> {
    repository: Arc<R>,
    alerts: Arc<A>,
    clock: Arc<dyn Clock>,
    tolerances: MatchingTolerances,
}

impl<R, A> VerificationService<R, A>
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    pub fn new(repository: Arc<R>, alerts: Arc<A>, tolerances: MatchingTolerances) -> Self {
        Self::with_clock(repository, alerts, tolerances, Arc::new(SystemClock))
    }

    pub fn with_clock(
        repository: Arc<R>,
        alerts: Arc<A>,
        tolerances: MatchingTolerances,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            alerts,
            clock,
            tolerances,
        }
    }

    pub fn tolerances(&self) -> &MatchingTolerances {
        &self.tolerances
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Store a new application record.
    pub fn register(
        &self,
        record: ApplicationRecord,
    ) -> Result<ApplicationRecord, VerificationServiceError> {
        Ok(self.repository.insert(record)?)
    }

    pub fn get(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, VerificationServiceError> {
        let record = self
            .repository
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Attach a document and immediately re-evaluate the status field it feeds.
    pub fn attach_document(
        &self,
        document: AttachedDocument,
    ) -> Result<ApplicationRecord, VerificationServiceError> {
        let document_id = document.document_id.clone();
        self.repository.attach_document(document)?;
        self.verify_document(&document_id)
    }

    /// Re-evaluate the status field fed by an attached document's declared type.
    ///
    /// Documents without a declared type leave the application untouched.
    pub fn verify_document(
        &self,
        document_id: &DocumentId,
    ) -> Result<ApplicationRecord, VerificationServiceError> {
        let document = self
            .repository
            .find_document(document_id)?
            .ok_or_else(|| VerificationServiceError::DocumentNotFound(document_id.0.clone()))?;
        let record = self.get(&document.application_id)?;

        match document.verification_type {
            Some(document_type) => {
                self.apply(record, Some(VerificationField::for_document(document_type)))
            }
            None => Ok(record),
        }
    }

    /// Re-evaluate all six status fields. Running it again without new documents changes
    /// nothing.
    pub fn recompute(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, VerificationServiceError> {
        let record = self.get(application_id)?;
        self.apply(record, None)
    }

    /// Mark the guarantor verified once both guarantor documents are attached.
    pub fn verify_guarantor(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, VerificationServiceError> {
        let record = self.get(application_id)?;
        if record.guarantor_information.is_none() {
            return Err(VerificationServiceError::missing(
                application_id,
                "guarantor information",
            ));
        }
        self.apply(record, Some(VerificationField::Guarantor))
    }

    /// Check the guarantor agreement against the guarantor information on file.
    pub fn screen_guarantor(
        &self,
        application_id: &ApplicationId,
    ) -> Result<bool, VerificationServiceError> {
        let record = self.get(application_id)?;
        let information = record.guarantor_information.as_ref().ok_or_else(|| {
            VerificationServiceError::missing(application_id, "guarantor information")
        })?;
        let agreement = record.guarantor_agreement.as_ref().ok_or_else(|| {
            VerificationServiceError::missing(application_id, "guarantor agreement")
        })?;

        let matched = guarantor_screener(information, agreement);
        debug!(application_id = %application_id.0, matched, "guarantor screened");
        Ok(matched)
    }

    /// Check the employer reference against declared employment. Missing records fail.
    pub fn screen_employment(
        &self,
        application_id: &ApplicationId,
    ) -> Result<bool, VerificationServiceError> {
        let record = self.get(application_id)?;
        let matched = match (&record.employment_information, &record.employee_reference) {
            (Some(information), Some(reference)) => employment_screener(information, reference),
            _ => false,
        };
        debug!(application_id = %application_id.0, matched, "employment screened");
        Ok(matched)
    }

    /// Check the landlord reference against declared residence. Missing records fail.
    pub fn screen_landlord(
        &self,
        application_id: &ApplicationId,
    ) -> Result<bool, VerificationServiceError> {
        let record = self.get(application_id)?;
        let matched = match (&record.residential_information, &record.landlord_reference) {
            (Some(residence), Some(reference)) => {
                landlord_screener(residence, reference, &record.form.first_name)
            }
            _ => false,
        };
        debug!(application_id = %application_id.0, matched, "landlord screened");
        Ok(matched)
    }

    /// Run the identity, income, and address checks against a stored application form.
    pub fn run_document_checks(
        &self,
        application_id: &ApplicationId,
        bundle: &DocumentBundle,
    ) -> Result<DocumentCheckReport, VerificationServiceError> {
        let record = self.get(application_id)?;
        Ok(self.check_documents(&record.form, bundle))
    }

    /// Run every check the bundle has documents for.
    pub fn check_documents(
        &self,
        form: &ApplicationForm,
        bundle: &DocumentBundle,
    ) -> DocumentCheckReport {
        let mut missing = Vec::new();

        let identity = match bundle.identity() {
            Some(id) => Some(validate_id_against_form(id, form, self.clock.today())),
            None => {
                missing.push("identity");
                None
            }
        };

        let payslips = bundle.payslips();
        let income = match bundle.bank_statement() {
            Some(statement) if !payslips.is_empty() => {
                Some(validate_income(payslips, statement, &self.tolerances))
            }
            _ => {
                missing.push("income");
                None
            }
        };

        let address = match bundle.proof_of_address() {
            Some(document) => Some(validate_address(document, form)),
            None => {
                missing.push("address");
                None
            }
        };

        for (check, result) in [("identity", &identity), ("income", &income), ("address", &address)]
        {
            if let Some(result) = result {
                debug!(check, passed = result.passed, details = %result.details, "document check");
            }
        }

        DocumentCheckReport {
            identity,
            income,
            address,
            missing,
        }
    }

    fn apply(
        &self,
        record: ApplicationRecord,
        scope: Option<VerificationField>,
    ) -> Result<ApplicationRecord, VerificationServiceError> {
        let attached = record.attached_types();
        let transition = recompute(
            &record.verification,
            &record.completed_steps,
            &attached,
            scope,
        );

        if transition.is_noop() {
            return Ok(record);
        }

        let application_id = record.application_id.clone();
        let update = VerificationUpdate {
            expected_version: record.version,
            verified: transition.newly_verified.clone(),
            status: transition
                .completes_screening
                .then_some(ApplicationStatus::ScreeningComplete),
        };
        let updated = self.repository.apply_verification(&application_id, update)?;

        for field in &transition.newly_verified {
            info!(
                application_id = %application_id.0,
                field = field.label(),
                "verification requirement satisfied"
            );
        }

        if !transition.completes_screening {
            return Ok(updated);
        }

        // Audit step only after a successful publish; until then completion stays pending.
        let mut details = BTreeMap::new();
        details.insert(
            "status".to_string(),
            ApplicationStatus::ScreeningComplete.label().to_string(),
        );
        self.alerts.publish(ScreeningAlert {
            template: "screening_complete".to_string(),
            application_id: application_id.clone(),
            details,
        })?;

        let appended = self
            .repository
            .append_audit_step(&application_id, ApplicationStatus::ScreeningComplete)?;
        if appended {
            info!(application_id = %application_id.0, "screening complete");
        } else {
            warn!(
                application_id = %application_id.0,
                "screening completion already recorded by a concurrent run"
            );
        }

        self.get(&application_id)
    }
}

/// Error raised by the verification service.
#[derive(Debug, thiserror::Error)]
pub enum VerificationServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Alert(#[from] AlertError),
    #[error("application {application_id} has no {record}")]
    MissingRecord {
        application_id: String,
        record: &'static str,
    },
    #[error("document {0} not found")]
    DocumentNotFound(String),
}

impl VerificationServiceError {
    fn missing(application_id: &ApplicationId, record: &'static str) -> Self {
        Self::MissingRecord {
            application_id: application_id.0.clone(),
            record,
        }
    }

    /// Whether the caller may retry the same operation unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            VerificationServiceError::Repository(error) => error.is_retryable(),
            VerificationServiceError::Alert(_) => true,
            _ => false,
        }
    }
}
