//! Applicant and guarantor verification.
//!
//! Extracted document fields are cross-checked against the application form (identity,
//! income, address), third-party reference forms are screened against what the applicant
//! declared, and attached supporting documents drive the six verification status flags
//! towards SCREENING_COMPLETE.

pub mod aggregator;
pub mod checks;
pub mod clock;
pub mod documents;
pub mod domain;
pub mod matching;
pub mod repository;
pub mod router;
pub mod screeners;
pub mod service;
pub mod status;

#[cfg(test)]
mod tests;

pub use aggregator::{recompute, VerificationTransition};
pub use checks::{validate_address, validate_id_against_form, validate_income, MatchingTolerances};
pub use clock::{Clock, FixedClock, SystemClock};
pub use documents::{
    AddressDocument, BankStatementDocument, DocumentBundle, ExtractedDocument, FieldValue,
    IdentityDocument, PayslipDocument, Transaction, TransactionType,
};
pub use domain::{
    ApplicationForm, ApplicationId, DocumentId, EmployeeReference, EmploymentInformation,
    ExternalLandlord, GuarantorAgreement, GuarantorInformation, LandlordReference,
    PreviousAddress, ResidentialInformation, TenancyHistory, TenantConduct, ValidationResult,
};
pub use matching::is_name_match;
pub use repository::{
    apply_update_in_place, attach_document_in_place, AlertError, AlertPublisher,
    ApplicationRecord, ApplicationRepository, AttachedDocument, RepositoryError, ScreeningAlert,
    VerificationUpdate, VerificationView,
};
pub use router::verification_router;
pub use screeners::{employment_screener, guarantor_screener, landlord_screener};
pub use service::{DocumentCheckReport, VerificationService, VerificationServiceError};
pub use status::{
    ApplicationStatus, AuditTrail, VerificationDocumentType, VerificationField,
    VerificationStatus, YesNo,
};
