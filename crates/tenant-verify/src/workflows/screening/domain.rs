use serde::{Deserialize, Serialize};

/// Identifier wrapper for rental applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for documents attached to an application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

/// Applicant-submitted identity and address details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationForm {
    pub first_name: String,
    pub last_name: String,
    /// `YYYY-MM-DD`
    pub date_of_birth: String,
    pub address_line1: String,
    pub zip_code: String,
}

impl ApplicationForm {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Verdict produced by every document cross-check.
///
/// `details` always carries text: the success sentence when `passed` is true, otherwise
/// one or more failure clauses separated by a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub details: String,
}

impl ValidationResult {
    pub fn pass(details: impl Into<String>) -> Self {
        Self {
            passed: true,
            details: details.into(),
        }
    }

    pub fn fail(details: impl Into<String>) -> Self {
        Self {
            passed: false,
            details: details.into(),
        }
    }
}

/// Guarantor details captured with the original application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuarantorInformation {
    pub full_name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub national_insurance_number: Option<String>,
}

/// Guarantor details captured later when the guarantor signs the agreement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuarantorAgreement {
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub national_insurance_number: Option<String>,
}

/// Employment details declared by the applicant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentInformation {
    #[serde(default)]
    pub employer_company: Option<String>,
    #[serde(default)]
    pub position_title: Option<String>,
    #[serde(default)]
    pub employer_email: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
}

/// Reference form returned by the applicant's employer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeReference {
    #[serde(default)]
    pub employee_name: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub employment_start_date: Option<String>,
}

/// Current residence and landlord contact declared by the applicant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentialInformation {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub length_of_residence: Option<String>,
    #[serde(default)]
    pub reason_for_leaving: Option<String>,
    #[serde(default)]
    pub landlord_or_agency_name: Option<String>,
    #[serde(default)]
    pub landlord_or_agency_phone_number: Option<String>,
    #[serde(default)]
    pub landlord_or_agency_email: Option<String>,
    #[serde(default)]
    pub prev_addresses: Vec<PreviousAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviousAddress {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub length_of_residence: Option<String>,
}

/// Reference form returned by the applicant's current landlord.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandlordReference {
    #[serde(default)]
    pub tenancy_reference_history: Option<TenancyHistory>,
    #[serde(default)]
    pub external_landlord: Option<ExternalLandlord>,
    #[serde(default)]
    pub conduct: Option<TenantConduct>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenancyHistory {
    #[serde(default)]
    pub tenant_name: Option<String>,
    #[serde(default)]
    pub current_address: Option<String>,
    #[serde(default)]
    pub reason_for_leaving: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalLandlord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantConduct {
    #[serde(default)]
    pub rent_on_time: Option<bool>,
}
