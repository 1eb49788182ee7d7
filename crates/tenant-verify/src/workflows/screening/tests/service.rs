use std::sync::atomic::{AtomicBool, AtomicUsize};
use std::sync::Arc;

use super::common::*;

use crate::workflows::screening::{
    AddressDocument, ApplicationId, ApplicationRepository, ApplicationStatus, DocumentBundle,
    DocumentId, EmployeeReference, EmploymentInformation, ExtractedDocument, FixedClock,
    MatchingTolerances, RepositoryError, VerificationDocumentType, VerificationField,
    VerificationService, VerificationServiceError, YesNo,
};

fn attach_all(service: &VerificationService<MemoryRepository, MemoryAlerts>, id: &str) {
    for (index, document_type) in EVERY_DOCUMENT.iter().enumerate() {
        service
            .attach_document(attachment(id, &format!("doc-{index}"), Some(*document_type)))
            .expect("attach succeeds");
    }
}

#[test]
fn single_document_only_touches_its_own_field() {
    let (service, _, alerts) = build_service();
    service.register(record("app-1")).expect("register");

    let updated = service
        .attach_document(attachment(
            "app-1",
            "letter",
            Some(VerificationDocumentType::EmploymentLetter),
        ))
        .expect("attach succeeds");

    assert_eq!(updated.verification.employment, YesNo::Yes);
    assert_eq!(
        updated.verification.outstanding().len(),
        VerificationField::ALL.len() - 1
    );
    assert_eq!(updated.status, ApplicationStatus::Pending);
    assert!(alerts.events().is_empty());
}

#[test]
fn income_waits_for_every_required_document() {
    let (service, _, _) = build_service();
    service.register(record("app-1")).expect("register");

    for (document, document_type) in [
        ("payslip", VerificationDocumentType::PayStub),
        ("tax", VerificationDocumentType::TaxReturn),
    ] {
        let updated = service
            .attach_document(attachment("app-1", document, Some(document_type)))
            .expect("attach succeeds");
        assert_eq!(updated.verification.income, YesNo::No);
    }

    let updated = service
        .attach_document(attachment(
            "app-1",
            "statement",
            Some(VerificationDocumentType::BankStatement),
        ))
        .expect("attach succeeds");
    assert_eq!(updated.verification.income, YesNo::Yes);
}

#[test]
fn untyped_documents_leave_status_untouched() {
    let (service, _, _) = build_service();
    service.register(record("app-1")).expect("register");

    let updated = service
        .attach_document(attachment("app-1", "selfie", None))
        .expect("attach succeeds");

    assert_eq!(
        updated.verification.outstanding().len(),
        VerificationField::ALL.len()
    );
    assert_eq!(updated.documents.len(), 1);
}

#[test]
fn full_document_set_completes_screening_once() {
    let (service, _, alerts) = build_service();
    service.register(record("app-1")).expect("register");

    attach_all(&service, "app-1");

    let record = service
        .get(&ApplicationId("app-1".to_string()))
        .expect("record exists");
    assert!(record.verification.is_fully_verified());
    assert_eq!(record.status, ApplicationStatus::ScreeningComplete);
    assert_eq!(
        record.completed_steps.steps(),
        &[ApplicationStatus::ScreeningComplete]
    );

    let events = alerts.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].template, "screening_complete");
    assert_eq!(events[0].application_id.0, "app-1");
}

#[test]
fn recompute_is_idempotent() {
    let (service, repository, alerts) = build_service();
    service.register(record("app-1")).expect("register");
    for (index, document_type) in EVERY_DOCUMENT.iter().enumerate() {
        repository
            .attach_document(attachment("app-1", &format!("doc-{index}"), Some(*document_type)))
            .expect("attach succeeds");
    }

    let id = ApplicationId("app-1".to_string());
    let first = service.recompute(&id).expect("first run");
    let second = service.recompute(&id).expect("second run");

    assert_eq!(first.verification, second.verification);
    assert_eq!(first.version, second.version);
    assert_eq!(second.completed_steps.steps().len(), 1);
    assert_eq!(alerts.events().len(), 1);
}

#[test]
fn verify_document_reports_unknown_documents() {
    let (service, _, _) = build_service();
    service.register(record("app-1")).expect("register");

    let error = service
        .verify_document(&DocumentId("missing".to_string()))
        .expect_err("unknown document");
    assert!(matches!(error, VerificationServiceError::DocumentNotFound(id) if id == "missing"));
}

#[test]
fn verify_guarantor_needs_guarantor_information() {
    let (service, _, _) = build_service();
    service.register(record("app-1")).expect("register");

    let error = service
        .verify_guarantor(&ApplicationId("app-1".to_string()))
        .expect_err("missing guarantor");
    assert!(matches!(
        error,
        VerificationServiceError::MissingRecord {
            record: "guarantor information",
            ..
        }
    ));
}

#[test]
fn verify_guarantor_sets_flag_once_both_documents_are_attached() {
    let (service, repository, _) = build_service();
    let mut application = record("app-1");
    application.guarantor_information = Some(guarantor_information());
    service.register(application).expect("register");

    let id = ApplicationId("app-1".to_string());
    repository
        .attach_document(attachment(
            "app-1",
            "g-income",
            Some(VerificationDocumentType::GuarantorIncome),
        ))
        .expect("attach");
    let pending = service.verify_guarantor(&id).expect("verify runs");
    assert_eq!(pending.verification.guarantor, YesNo::No);

    repository
        .attach_document(attachment(
            "app-1",
            "g-employment",
            Some(VerificationDocumentType::GuarantorEmployment),
        ))
        .expect("attach");
    let verified = service.verify_guarantor(&id).expect("verify runs");
    assert_eq!(verified.verification.guarantor, YesNo::Yes);
}

#[test]
fn screen_guarantor_uses_stored_records() {
    let (service, _, _) = build_service();
    let mut application = record("app-1");
    application.guarantor_information = Some(guarantor_information());
    application.guarantor_agreement = Some(guarantor_agreement());
    service.register(application).expect("register");

    let matched = service
        .screen_guarantor(&ApplicationId("app-1".to_string()))
        .expect("screening runs");
    assert!(matched);
}

#[test]
fn screen_guarantor_without_agreement_is_an_error() {
    let (service, _, _) = build_service();
    let mut application = record("app-1");
    application.guarantor_information = Some(guarantor_information());
    service.register(application).expect("register");

    let error = service
        .screen_guarantor(&ApplicationId("app-1".to_string()))
        .expect_err("agreement missing");
    assert!(error.to_string().contains("guarantor agreement"));
}

#[test]
fn reference_screeners_fail_closed_without_records() {
    let (service, _, _) = build_service();
    let mut application = record("app-1");
    application.employment_information = Some(EmploymentInformation::default());
    service.register(application).expect("register");

    let id = ApplicationId("app-1".to_string());
    assert!(!service.screen_employment(&id).expect("runs"));
    assert!(!service.screen_landlord(&id).expect("runs"));
}

#[test]
fn employment_screening_reads_both_records() {
    let (service, _, _) = build_service();
    let mut application = record("app-1");
    application.employment_information = Some(EmploymentInformation {
        employer_company: Some("Acme Ltd".to_string()),
        position_title: Some("Analyst".to_string()),
        employer_email: None,
        start_date: Some("2021-04-01".to_string()),
    });
    application.employee_reference = Some(EmployeeReference {
        employee_name: Some("Acme Ltd".to_string()),
        job_title: Some("Analyst".to_string()),
        company_name: Some("Acme Ltd".to_string()),
        email_address: None,
        employment_start_date: Some("2021-04-01".to_string()),
    });
    service.register(application).expect("register");

    assert!(service
        .screen_employment(&ApplicationId("app-1".to_string()))
        .expect("runs"));
}

#[test]
fn document_checks_cover_every_supplied_document() {
    let (service, _, _) = build_service();
    service.register(record("app-1")).expect("register");

    let bundle = DocumentBundle::new(vec![
        ExtractedDocument::Identity(identity("2030-01-01")),
        ExtractedDocument::Payslip(payslip("1000.00", "2024-01-10")),
        ExtractedDocument::BankStatement(statement(vec![credit(1000.5, "2024-01-12")])),
        ExtractedDocument::ProofOfAddress(AddressDocument {
            address: Some("221B Baker Street, NW16XE".to_string()),
        }),
    ]);

    let report = service
        .run_document_checks(&ApplicationId("app-1".to_string()), &bundle)
        .expect("checks run");

    assert!(report.passed(), "{report:?}");
    assert!(report.missing.is_empty());
}

#[test]
fn document_checks_list_what_could_not_run() {
    let (service, _, _) = build_service();

    let bundle = DocumentBundle::new(vec![
        ExtractedDocument::Identity(identity("2030-01-01")),
        ExtractedDocument::BankStatement(statement(Vec::new())),
    ]);
    let report = service.check_documents(&form(), &bundle);

    assert!(report.identity.as_ref().is_some_and(|result| result.passed));
    assert!(report.income.is_none());
    assert_eq!(report.missing, vec!["income", "address"]);
    assert!(!report.passed());
}

#[test]
fn identity_check_uses_the_injected_clock() {
    let repository = Arc::new(MemoryRepository::default());
    let alerts = Arc::new(MemoryAlerts::default());
    let later = VerificationService::with_clock(
        repository,
        alerts,
        MatchingTolerances::default(),
        Arc::new(FixedClock(
            chrono::NaiveDate::from_ymd_opt(2031, 1, 1).expect("valid date"),
        )),
    );

    let bundle = DocumentBundle::new(vec![ExtractedDocument::Identity(identity("2030-01-01"))]);
    let report = later.check_documents(&form(), &bundle);

    let identity = report.identity.expect("identity checked");
    assert!(!identity.passed);
    assert!(identity.details.contains("expired"));
}

#[test]
fn concurrent_writes_surface_retryable_conflicts() {
    let inner = MemoryRepository::default();
    let repository = Arc::new(ConflictRepository {
        inner: inner.clone(),
    });
    let service = VerificationService::with_clock(
        repository,
        Arc::new(MemoryAlerts::default()),
        MatchingTolerances::default(),
        Arc::new(FixedClock(today())),
    );
    service.register(record("app-1")).expect("register");

    let error = service
        .attach_document(attachment(
            "app-1",
            "report",
            Some(VerificationDocumentType::RefereeConfirmation),
        ))
        .expect_err("version moved");

    assert!(matches!(
        error,
        VerificationServiceError::Repository(RepositoryError::Conflict)
    ));
    assert!(error.is_retryable());

    let stored = inner
        .fetch(&ApplicationId("app-1".to_string()))
        .expect("fetch")
        .expect("record exists");
    assert_eq!(stored.verification.referee, YesNo::No);
}

#[test]
fn retried_attach_after_a_lost_race_verifies_the_field() {
    let service = VerificationService::with_clock(
        Arc::new(RacedOnceRepository {
            inner: MemoryRepository::default(),
            raced: AtomicBool::new(false),
        }),
        Arc::new(MemoryAlerts::default()),
        MatchingTolerances::default(),
        Arc::new(FixedClock(today())),
    );
    service.register(record("app-1")).expect("register");
    let letter = attachment(
        "app-1",
        "letter",
        Some(VerificationDocumentType::EmploymentLetter),
    );

    let error = service
        .attach_document(letter.clone())
        .expect_err("first write races");
    assert!(error.is_retryable());

    let retried = service.attach_document(letter).expect("retry succeeds");
    assert_eq!(retried.verification.employment, YesNo::Yes);
    assert_eq!(retried.documents.len(), 1);
}

#[test]
fn duplicate_registration_is_final() {
    let (service, _, _) = build_service();
    service.register(record("app-1")).expect("register");

    let error = service.register(record("app-1")).expect_err("duplicate");
    assert!(matches!(
        error,
        VerificationServiceError::Repository(RepositoryError::AlreadyExists(_))
    ));
    assert!(!error.is_retryable());
}

#[test]
fn failed_completion_alert_is_sent_on_the_next_run() {
    let repository = Arc::new(MemoryRepository::default());
    let alerts = Arc::new(FlakyAlerts {
        failures: AtomicUsize::new(1),
        delivered: MemoryAlerts::default(),
    });
    let service = VerificationService::with_clock(
        repository,
        alerts.clone(),
        MatchingTolerances::default(),
        Arc::new(FixedClock(today())),
    );
    service.register(record("app-1")).expect("register");

    let documents = EVERY_DOCUMENT;
    let (last, rest) = documents.split_last().expect("documents");
    for (index, document_type) in rest.iter().enumerate() {
        service
            .attach_document(attachment("app-1", &format!("doc-{index}"), Some(*document_type)))
            .expect("attach succeeds");
    }

    let error = service
        .attach_document(attachment("app-1", "doc-last", Some(*last)))
        .expect_err("alert transport down");
    assert!(matches!(error, VerificationServiceError::Alert(_)));
    assert!(error.is_retryable());

    let id = ApplicationId("app-1".to_string());
    let pending = service.get(&id).expect("record exists");
    assert!(pending.verification.is_fully_verified());
    assert!(pending.completed_steps.steps().is_empty());
    assert!(alerts.delivered.events().is_empty());

    let completed = service.recompute(&id).expect("retry succeeds");
    assert_eq!(completed.status, ApplicationStatus::ScreeningComplete);
    assert_eq!(
        completed.completed_steps.steps(),
        &[ApplicationStatus::ScreeningComplete]
    );
    assert_eq!(alerts.delivered.events().len(), 1);

    service.recompute(&id).expect("settled");
    assert_eq!(alerts.delivered.events().len(), 1);
}

#[test]
fn unavailable_storage_is_not_retryable() {
    let service = VerificationService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryAlerts::default()),
        MatchingTolerances::default(),
    );

    let error = service
        .recompute(&ApplicationId("app-1".to_string()))
        .expect_err("storage offline");
    assert!(!error.is_retryable());
}

#[test]
fn unknown_application_is_not_found() {
    let (service, _, _) = build_service();

    let error = service
        .recompute(&ApplicationId("ghost".to_string()))
        .expect_err("no record");
    assert!(matches!(
        error,
        VerificationServiceError::Repository(RepositoryError::NotFound)
    ));
}
