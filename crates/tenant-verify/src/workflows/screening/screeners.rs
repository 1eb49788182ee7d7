//! Cross-checks between records the applicant supplied and records returned by third
//! parties (guarantor, employer, landlord). Each screener yields a plain pass/fail.

use super::domain::{
    EmployeeReference, EmploymentInformation, GuarantorAgreement, GuarantorInformation,
    LandlordReference, ResidentialInformation,
};
use super::matching::parse_date;

/// Prove the guarantor agreement and the guarantor information describe the same person.
///
/// The stored full name must equal one of the reconstructions of the agreement's name
/// parts exactly (after trimming and lower-casing). Dates of birth must both be present and
/// fall on the same day; national insurance numbers must both be present and equal ignoring
/// case and surrounding whitespace.
pub fn guarantor_screener(
    information: &GuarantorInformation,
    agreement: &GuarantorAgreement,
) -> bool {
    guarantor_name_matches(information, agreement)
        && same_day(
            information.date_of_birth.as_deref(),
            agreement.date_of_birth.as_deref(),
        )
        && same_insurance_number(
            information.national_insurance_number.as_deref(),
            agreement.national_insurance_number.as_deref(),
        )
}

fn guarantor_name_matches(
    information: &GuarantorInformation,
    agreement: &GuarantorAgreement,
) -> bool {
    let full_name = information.full_name.trim().to_lowercase();
    if full_name.is_empty() {
        return false;
    }

    let first = agreement.first_name.trim().to_lowercase();
    let middle = agreement
        .middle_name
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    let last = agreement.last_name.trim().to_lowercase();

    let candidates = [
        format!("{first} {last}"),
        format!("{first} {middle} {last}"),
        format!("{first} {middle}"),
        first.clone(),
        last.clone(),
    ];

    candidates
        .iter()
        .any(|candidate| candidate.trim() == full_name)
}

fn same_day(left: Option<&str>, right: Option<&str>) -> bool {
    match (left.and_then(parse_date), right.and_then(parse_date)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

fn same_insurance_number(left: Option<&str>, right: Option<&str>) -> bool {
    let normalize = |value: &str| value.trim().to_uppercase();
    match (left.map(normalize), right.map(normalize)) {
        (Some(left), Some(right)) => !left.is_empty() && left == right,
        _ => false,
    }
}

/// Compare the applicant's declared employment with the employer's reference form.
///
/// Text fields compare trimmed and case-insensitively; a field missing on both sides counts
/// as equal. The employment start dates must both be present and fall on the same day.
pub fn employment_screener(
    information: &EmploymentInformation,
    reference: &EmployeeReference,
) -> bool {
    let employee_name_match = same_text(
        reference.employee_name.as_deref(),
        information.employer_company.as_deref(),
    );
    let job_title_match = same_text(
        reference.job_title.as_deref(),
        information.position_title.as_deref(),
    );
    let company_match = same_text(
        reference.company_name.as_deref(),
        information.employer_company.as_deref(),
    );
    let email_match = same_text(
        reference.email_address.as_deref(),
        information.employer_email.as_deref(),
    );
    let start_date_match = same_day(
        reference.employment_start_date.as_deref(),
        information.start_date.as_deref(),
    );

    employee_name_match && job_title_match && company_match && email_match && start_date_match
}

/// Compare the applicant's residential history with the current landlord's reference.
///
/// Fails when the reference lacks tenancy history or landlord details, or when the landlord
/// did not confirm on-time rent.
pub fn landlord_screener(
    residence: &ResidentialInformation,
    reference: &LandlordReference,
    applicant_first_name: &str,
) -> bool {
    let (Some(history), Some(landlord)) = (
        reference.tenancy_reference_history.as_ref(),
        reference.external_landlord.as_ref(),
    ) else {
        return false;
    };

    let landlord_name_match = same_text(
        residence.landlord_or_agency_name.as_deref(),
        landlord.name.as_deref(),
    );
    let landlord_phone_match = same_text(
        residence.landlord_or_agency_phone_number.as_deref(),
        landlord.contact_number.as_deref(),
    );
    let landlord_email_match = same_text(
        residence.landlord_or_agency_email.as_deref(),
        landlord.email_address.as_deref(),
    );
    let tenant_name_match = same_text(history.tenant_name.as_deref(), Some(applicant_first_name));
    let address_match = same_text(
        history.current_address.as_deref(),
        residence.address.as_deref(),
    );
    let residence_length_match = residence.prev_addresses.iter().any(|previous| {
        same_text(
            previous.length_of_residence.as_deref(),
            residence.length_of_residence.as_deref(),
        )
    });
    let leaving_reason_match = same_text(
        residence.reason_for_leaving.as_deref(),
        history.reason_for_leaving.as_deref(),
    );
    let rent_on_time = reference
        .conduct
        .as_ref()
        .and_then(|conduct| conduct.rent_on_time)
        == Some(true);

    landlord_name_match
        && landlord_phone_match
        && landlord_email_match
        && tenant_name_match
        && address_match
        && residence_length_match
        && leaving_reason_match
        && rent_on_time
}

fn same_text(left: Option<&str>, right: Option<&str>) -> bool {
    let normalize = |value: Option<&str>| value.unwrap_or_default().trim().to_lowercase();
    normalize(left) == normalize(right)
}
