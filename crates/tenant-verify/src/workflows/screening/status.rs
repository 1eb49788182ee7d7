use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum YesNo {
    Yes,
    #[default]
    No,
}

/// Declared purpose of a document attached to an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationDocumentType {
    EmploymentLetter,
    PayStub,
    TaxReturn,
    BankStatement,
    CreditReport,
    BackgroundCheck,
    LandlordReference,
    GuarantorIncome,
    GuarantorEmployment,
    RefereeConfirmation,
}

/// One of the six per-application verification flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationField {
    Employment,
    Income,
    CreditCheck,
    Landlord,
    Guarantor,
    Referee,
}

impl VerificationField {
    pub const ALL: [VerificationField; 6] = [
        VerificationField::Employment,
        VerificationField::Income,
        VerificationField::CreditCheck,
        VerificationField::Landlord,
        VerificationField::Guarantor,
        VerificationField::Referee,
    ];

    /// The status field a document of the given type contributes to.
    pub const fn for_document(document_type: VerificationDocumentType) -> Self {
        use VerificationDocumentType as Doc;

        match document_type {
            Doc::EmploymentLetter => VerificationField::Employment,
            Doc::PayStub | Doc::TaxReturn | Doc::BankStatement => VerificationField::Income,
            Doc::CreditReport | Doc::BackgroundCheck => VerificationField::CreditCheck,
            Doc::LandlordReference => VerificationField::Landlord,
            Doc::GuarantorIncome | Doc::GuarantorEmployment => VerificationField::Guarantor,
            Doc::RefereeConfirmation => VerificationField::Referee,
        }
    }

    /// Every document type that must be attached before the field can flip to YES.
    pub const fn required_documents(self) -> &'static [VerificationDocumentType] {
        use VerificationDocumentType as Doc;

        match self {
            VerificationField::Employment => &[Doc::EmploymentLetter],
            VerificationField::Income => &[Doc::PayStub, Doc::TaxReturn, Doc::BankStatement],
            VerificationField::CreditCheck => &[Doc::CreditReport, Doc::BackgroundCheck],
            VerificationField::Landlord => &[Doc::LandlordReference],
            VerificationField::Guarantor => &[Doc::GuarantorIncome, Doc::GuarantorEmployment],
            VerificationField::Referee => &[Doc::RefereeConfirmation],
        }
    }

    pub fn is_satisfied_by(self, attached: &[VerificationDocumentType]) -> bool {
        self.required_documents()
            .iter()
            .all(|required| attached.contains(required))
    }

    pub const fn label(self) -> &'static str {
        match self {
            VerificationField::Employment => "employmentVerificationStatus",
            VerificationField::Income => "incomeVerificationStatus",
            VerificationField::CreditCheck => "creditCheckStatus",
            VerificationField::Landlord => "landlordVerificationStatus",
            VerificationField::Guarantor => "guarantorVerificationStatus",
            VerificationField::Referee => "refereeVerificationStatus",
        }
    }
}

/// The six YES/NO verification flags carried by an application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStatus {
    #[serde(rename = "employmentVerificationStatus", default)]
    pub employment: YesNo,
    #[serde(rename = "incomeVerificationStatus", default)]
    pub income: YesNo,
    #[serde(rename = "creditCheckStatus", default)]
    pub credit_check: YesNo,
    #[serde(rename = "landlordVerificationStatus", default)]
    pub landlord: YesNo,
    #[serde(rename = "guarantorVerificationStatus", default)]
    pub guarantor: YesNo,
    #[serde(rename = "refereeVerificationStatus", default)]
    pub referee: YesNo,
}

impl VerificationStatus {
    pub fn get(&self, field: VerificationField) -> YesNo {
        match field {
            VerificationField::Employment => self.employment,
            VerificationField::Income => self.income,
            VerificationField::CreditCheck => self.credit_check,
            VerificationField::Landlord => self.landlord,
            VerificationField::Guarantor => self.guarantor,
            VerificationField::Referee => self.referee,
        }
    }

    pub fn set(&mut self, field: VerificationField, value: YesNo) {
        let slot = match field {
            VerificationField::Employment => &mut self.employment,
            VerificationField::Income => &mut self.income,
            VerificationField::CreditCheck => &mut self.credit_check,
            VerificationField::Landlord => &mut self.landlord,
            VerificationField::Guarantor => &mut self.guarantor,
            VerificationField::Referee => &mut self.referee,
        };
        *slot = value;
    }

    pub fn is_fully_verified(&self) -> bool {
        VerificationField::ALL
            .iter()
            .all(|field| self.get(*field) == YesNo::Yes)
    }

    pub fn outstanding(&self) -> Vec<VerificationField> {
        VerificationField::ALL
            .into_iter()
            .filter(|field| self.get(*field) == YesNo::No)
            .collect()
    }
}

/// Lifecycle status of a rental application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Submitted,
    LandlordReference,
    ScreeningComplete,
    #[serde(rename = "MAKEPAYMENT")]
    MakePayment,
    Accepted,
    Declined,
    Completed,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Submitted => "SUBMITTED",
            ApplicationStatus::LandlordReference => "LANDLORD_REFERENCE",
            ApplicationStatus::ScreeningComplete => "SCREENING_COMPLETE",
            ApplicationStatus::MakePayment => "MAKEPAYMENT",
            ApplicationStatus::Accepted => "ACCEPTED",
            ApplicationStatus::Declined => "DECLINED",
            ApplicationStatus::Completed => "COMPLETED",
        }
    }
}

/// Ordered, de-duplicated record of completed workflow steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditTrail(Vec<ApplicationStatus>);

impl AuditTrail {
    pub fn contains(&self, step: ApplicationStatus) -> bool {
        self.0.contains(&step)
    }

    /// Append `step` unless it is already recorded. Returns whether it was appended.
    pub fn append(&mut self, step: ApplicationStatus) -> bool {
        if self.contains(step) {
            return false;
        }
        self.0.push(step);
        true
    }

    pub fn steps(&self) -> &[ApplicationStatus] {
        &self.0
    }
}

impl FromIterator<ApplicationStatus> for AuditTrail {
    fn from_iter<I: IntoIterator<Item = ApplicationStatus>>(iter: I) -> Self {
        let mut trail = AuditTrail::default();
        for step in iter {
            trail.append(step);
        }
        trail
    }
}
