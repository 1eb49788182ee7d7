use crate::check::{render_verdict, CheckInput};
use crate::infra::{InMemoryAlertPublisher, InMemoryApplicationRepository};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::sync::Arc;
use tenant_verify::error::AppError;
use tenant_verify::workflows::screening::{
    ApplicationId, ApplicationRecord, AttachedDocument, DocumentId, FixedClock,
    MatchingTolerances, VerificationDocumentType, VerificationField, VerificationService, YesNo,
};

const SAMPLE_APPLICANT: &str = include_str!("../fixtures/applicant_bundle.json");

const DEMO_ATTACHMENTS: [(&str, VerificationDocumentType); 10] = [
    ("employment-letter.pdf", VerificationDocumentType::EmploymentLetter),
    ("payslip-jan.pdf", VerificationDocumentType::PayStub),
    ("sa302-2024.pdf", VerificationDocumentType::TaxReturn),
    ("bank-statement-q1.pdf", VerificationDocumentType::BankStatement),
    ("credit-report.pdf", VerificationDocumentType::CreditReport),
    ("background-check.pdf", VerificationDocumentType::BackgroundCheck),
    ("landlord-reference.pdf", VerificationDocumentType::LandlordReference),
    ("guarantor-payslip.pdf", VerificationDocumentType::GuarantorIncome),
    ("guarantor-employer.pdf", VerificationDocumentType::GuarantorEmployment),
    ("referee-confirmation.pdf", VerificationDocumentType::RefereeConfirmation),
];

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date used for ID expiry (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Stop after the document checks and skip the status walkthrough.
    #[arg(long)]
    pub(crate) skip_status: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, skip_status } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let input: CheckInput = serde_json::from_str(SAMPLE_APPLICANT)?;
    let repository = Arc::new(InMemoryApplicationRepository::default());
    let alerts = Arc::new(InMemoryAlertPublisher::default());
    let service = VerificationService::with_clock(
        repository,
        alerts.clone(),
        MatchingTolerances::default(),
        Arc::new(FixedClock(today)),
    );

    println!("Applicant verification demo (as of {today})");

    let application_id = ApplicationId("demo-application".to_string());
    let mut record = ApplicationRecord::new(application_id.clone(), input.form.clone());
    if let Some(pair) = &input.guarantor {
        record.guarantor_information = Some(pair.information.clone());
        record.guarantor_agreement = Some(pair.agreement.clone());
    }
    service.register(record)?;
    println!(
        "- Registered application {} for {}",
        application_id.0,
        input.form.full_name()
    );

    println!("\nDocument checks");
    let report = service.run_document_checks(&application_id, &input.bundle)?;
    render_verdict("identity", report.identity.as_ref());
    render_verdict("income", report.income.as_ref());
    render_verdict("address", report.address.as_ref());
    if !report.missing.is_empty() {
        println!("- not run: {}", report.missing.join(", "));
    }

    match service.screen_guarantor(&application_id) {
        Ok(matched) => println!(
            "- guarantor agreement: {}",
            if matched { "MATCH" } else { "MISMATCH" }
        ),
        Err(err) => println!("- guarantor agreement unavailable: {err}"),
    }

    if skip_status {
        return Ok(());
    }

    println!("\nSupporting documents");
    for (index, (name, document_type)) in DEMO_ATTACHMENTS.iter().enumerate() {
        let before = service.get(&application_id)?.verification;
        let updated = service.attach_document(AttachedDocument {
            document_id: DocumentId(format!("demo-doc-{index}")),
            application_id: application_id.clone(),
            name: (*name).to_string(),
            verification_type: Some(*document_type),
        })?;

        let flipped: Vec<&str> = before
            .outstanding()
            .into_iter()
            .filter(|field| updated.verification.get(*field) == YesNo::Yes)
            .map(VerificationField::label)
            .collect();

        if flipped.is_empty() {
            println!("- {name}: waiting on related documents");
        } else {
            println!("- {name}: {} -> YES", flipped.join(", "));
        }
    }

    let rerun = service.recompute(&application_id)?;
    let view = rerun.verification_view();
    println!(
        "\nApplication status {} ({} audit step(s))",
        view.status,
        view.completed_steps.len()
    );
    match serde_json::to_string_pretty(&view) {
        Ok(json) => println!("Verification payload:\n{json}"),
        Err(err) => println!("Verification payload unavailable: {err}"),
    }

    let events = alerts.events();
    if events.is_empty() {
        println!("External alerts: none dispatched");
    } else {
        println!("External alerts:");
        for alert in events {
            println!(
                "  - template={} -> {}",
                alert.template, alert.application_id.0
            );
        }
    }

    Ok(())
}
