use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::checks::{validate_address, validate_id_against_form, validate_income};
use super::documents::{
    AddressDocument, BankStatementDocument, DocumentBundle, IdentityDocument, PayslipDocument,
};
use super::domain::{
    ApplicationForm, ApplicationId, DocumentId, EmployeeReference, EmploymentInformation,
    GuarantorAgreement, GuarantorInformation, LandlordReference, ResidentialInformation,
};
use super::repository::{
    AlertPublisher, ApplicationRecord, ApplicationRepository, AttachedDocument,
};
use super::screeners::guarantor_screener;
use super::service::{VerificationService, VerificationServiceError};
use super::status::VerificationDocumentType;
use crate::error::AppError;

type SharedService<R, A> = Arc<VerificationService<R, A>>;

/// Router builder exposing the stateless checks and the per-application verification flow.
pub fn verification_router<R, A>(service: SharedService<R, A>) -> Router
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    Router::new()
        .route("/api/v1/screening/identity", post(identity_handler::<R, A>))
        .route("/api/v1/screening/income", post(income_handler::<R, A>))
        .route("/api/v1/screening/address", post(address_handler::<R, A>))
        .route("/api/v1/screening/guarantor", post(guarantor_handler::<R, A>))
        .route("/api/v1/applications", post(register_handler::<R, A>))
        .route(
            "/api/v1/applications/:application_id/documents",
            post(attach_handler::<R, A>),
        )
        .route(
            "/api/v1/applications/:application_id/documents/:document_id/verify",
            post(verify_document_handler::<R, A>),
        )
        .route(
            "/api/v1/applications/:application_id/checks",
            post(document_checks_handler::<R, A>),
        )
        .route(
            "/api/v1/applications/:application_id/verification",
            get(verification_handler::<R, A>),
        )
        .route(
            "/api/v1/applications/:application_id/verification/recompute",
            post(recompute_handler::<R, A>),
        )
        .route(
            "/api/v1/applications/:application_id/guarantor/verify",
            post(verify_guarantor_handler::<R, A>),
        )
        .route(
            "/api/v1/applications/:application_id/screening",
            get(screening_handler::<R, A>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityCheckRequest {
    pub document: IdentityDocument,
    pub form: ApplicationForm,
    /// Overrides the server clock for the expiry comparison.
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeCheckRequest {
    #[serde(default)]
    pub payslips: Vec<PayslipDocument>,
    pub bank_statement: BankStatementDocument,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressCheckRequest {
    pub document: AddressDocument,
    pub form: ApplicationForm,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuarantorCheckRequest {
    pub information: GuarantorInformation,
    pub agreement: GuarantorAgreement,
}

/// New application plus whatever reference records are already on file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterApplicationRequest {
    pub application_id: String,
    pub form: ApplicationForm,
    #[serde(default)]
    pub guarantor_information: Option<GuarantorInformation>,
    #[serde(default)]
    pub guarantor_agreement: Option<GuarantorAgreement>,
    #[serde(default)]
    pub employment_information: Option<EmploymentInformation>,
    #[serde(default)]
    pub employee_reference: Option<EmployeeReference>,
    #[serde(default)]
    pub residential_information: Option<ResidentialInformation>,
    #[serde(default)]
    pub landlord_reference: Option<LandlordReference>,
}

impl RegisterApplicationRequest {
    fn into_record(self) -> ApplicationRecord {
        let mut record = ApplicationRecord::new(ApplicationId(self.application_id), self.form);
        record.guarantor_information = self.guarantor_information;
        record.guarantor_agreement = self.guarantor_agreement;
        record.employment_information = self.employment_information;
        record.employee_reference = self.employee_reference;
        record.residential_information = self.residential_information;
        record.landlord_reference = self.landlord_reference;
        record
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachDocumentRequest {
    pub document_id: String,
    pub name: String,
    #[serde(default)]
    pub verification_type: Option<VerificationDocumentType>,
}

fn error_response(error: VerificationServiceError) -> Response {
    AppError::from(error).into_response()
}

pub(crate) async fn identity_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    axum::Json(request): axum::Json<IdentityCheckRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    let today = request.today.unwrap_or_else(|| service.today());
    let result = validate_id_against_form(&request.document, &request.form, today);
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn income_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    axum::Json(request): axum::Json<IncomeCheckRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    let result = validate_income(
        &request.payslips,
        &request.bank_statement,
        service.tolerances(),
    );
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn address_handler<R, A>(
    State(_service): State<SharedService<R, A>>,
    axum::Json(request): axum::Json<AddressCheckRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    let result = validate_address(&request.document, &request.form);
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn guarantor_handler<R, A>(
    State(_service): State<SharedService<R, A>>,
    axum::Json(request): axum::Json<GuarantorCheckRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    let matched = guarantor_screener(&request.information, &request.agreement);
    (StatusCode::OK, axum::Json(json!({ "matched": matched }))).into_response()
}

pub(crate) async fn register_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    axum::Json(request): axum::Json<RegisterApplicationRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.register(request.into_record()) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.verification_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn attach_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Path(application_id): Path<String>,
    axum::Json(request): axum::Json<AttachDocumentRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    let document = AttachedDocument {
        document_id: DocumentId(request.document_id),
        application_id: ApplicationId(application_id),
        name: request.name,
        verification_type: request.verification_type,
    };

    match service.attach_document(document) {
        Ok(record) => (StatusCode::OK, axum::Json(record.verification_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn verify_document_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Path((application_id, document_id)): Path<(String, String)>,
) -> Response
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    let application_id = ApplicationId(application_id);
    let document_id = DocumentId(document_id);

    let belongs = service.get(&application_id).map(|record| {
        record
            .documents
            .iter()
            .any(|document| document.document_id == document_id)
    });
    match belongs {
        Ok(true) => {}
        Ok(false) => {
            return error_response(VerificationServiceError::DocumentNotFound(document_id.0))
        }
        Err(error) => return error_response(error),
    }

    match service.verify_document(&document_id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.verification_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn document_checks_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Path(application_id): Path<String>,
    axum::Json(bundle): axum::Json<DocumentBundle>,
) -> Response
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.run_document_checks(&ApplicationId(application_id), &bundle) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn verification_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.get(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.verification_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn recompute_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.recompute(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.verification_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn verify_guarantor_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    match service.verify_guarantor(&ApplicationId(application_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.verification_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn screening_handler<R, A>(
    State(service): State<SharedService<R, A>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    A: AlertPublisher + 'static,
{
    let id = ApplicationId(application_id);

    let guarantor = match service.screen_guarantor(&id) {
        Ok(matched) => Some(matched),
        Err(VerificationServiceError::MissingRecord { .. }) => None,
        Err(error) => return error_response(error),
    };
    let employment = match service.screen_employment(&id) {
        Ok(matched) => matched,
        Err(error) => return error_response(error),
    };
    let landlord = match service.screen_landlord(&id) {
        Ok(matched) => matched,
        Err(error) => return error_response(error),
    };

    let payload = json!({
        "application_id": id.0,
        "guarantor": guarantor,
        "employment": employment,
        "landlord": landlord,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}
