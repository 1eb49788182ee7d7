use chrono::{Local, NaiveDate};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tenant_verify::config::AppConfig;
use tenant_verify::error::AppError;
use tenant_verify::workflows::screening::{
    guarantor_screener, ApplicationForm, DocumentBundle, DocumentCheckReport, FixedClock,
    GuarantorAgreement, GuarantorInformation, MatchingTolerances, ValidationResult,
    VerificationService,
};

use crate::infra::{InMemoryAlertPublisher, InMemoryApplicationRepository};

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    /// JSON file holding `form`, extracted `documents`, and an optional `guarantor` pair
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Date used for ID expiry (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the verdicts as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

/// Extracted documents for one applicant, as produced upstream.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CheckInput {
    pub(crate) form: ApplicationForm,
    #[serde(flatten)]
    pub(crate) bundle: DocumentBundle,
    #[serde(default)]
    pub(crate) guarantor: Option<GuarantorPair>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GuarantorPair {
    pub(crate) information: GuarantorInformation,
    pub(crate) agreement: GuarantorAgreement,
}

#[derive(Debug, Serialize)]
pub(crate) struct CheckOutcome {
    pub(crate) today: NaiveDate,
    pub(crate) documents: DocumentCheckReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) guarantor_matched: Option<bool>,
}

impl CheckOutcome {
    pub(crate) fn passed(&self) -> bool {
        self.documents.passed() && self.guarantor_matched.unwrap_or(true)
    }
}

pub(crate) fn evaluate(
    input: &CheckInput,
    today: NaiveDate,
    tolerances: MatchingTolerances,
) -> CheckOutcome {
    let service = VerificationService::with_clock(
        Arc::new(InMemoryApplicationRepository::default()),
        Arc::new(InMemoryAlertPublisher::default()),
        tolerances,
        Arc::new(FixedClock(today)),
    );

    CheckOutcome {
        today,
        documents: service.check_documents(&input.form, &input.bundle),
        guarantor_matched: input
            .guarantor
            .as_ref()
            .map(|pair| guarantor_screener(&pair.information, &pair.agreement)),
    }
}

pub(crate) fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let CheckArgs { input, today, json } = args;

    let raw = std::fs::read_to_string(&input)?;
    let input: CheckInput = serde_json::from_str(&raw)?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let tolerances = AppConfig::load()?.matching;

    let outcome = evaluate(&input, today, tolerances);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("Document checks as of {}", outcome.today);
    render_verdict("identity", outcome.documents.identity.as_ref());
    render_verdict("income", outcome.documents.income.as_ref());
    render_verdict("address", outcome.documents.address.as_ref());
    if !outcome.documents.missing.is_empty() {
        println!(
            "- not run (documents missing): {}",
            outcome.documents.missing.join(", ")
        );
    }
    if let Some(matched) = outcome.guarantor_matched {
        println!(
            "- guarantor: {}",
            if matched { "MATCH" } else { "MISMATCH" }
        );
    }
    println!(
        "Overall: {}",
        if outcome.passed() { "PASS" } else { "REVIEW" }
    );

    Ok(())
}

pub(crate) fn render_verdict(check: &str, result: Option<&ValidationResult>) {
    if let Some(result) = result {
        let verdict = if result.passed { "PASS" } else { "FAIL" };
        println!("- {check}: {verdict} | {}", result.details);
    }
}
