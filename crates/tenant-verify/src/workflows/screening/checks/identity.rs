use chrono::NaiveDate;

use super::super::documents::IdentityDocument;
use super::super::domain::{ApplicationForm, ValidationResult};
use super::super::matching::{dates_match, is_name_match, parse_date};

const IDENTITY_VERIFIED: &str = "ID is valid, unexpired, and matches application details.";

/// Check an identity document for expiry and agreement with the application form.
///
/// Expiry, name, and date of birth are all evaluated so every failing clause is reported.
/// An ID expiring on `today` is still valid. A missing or unreadable expiry date is noted
/// but does not fail the check on its own.
pub fn validate_id_against_form(
    id: &IdentityDocument,
    form: &ApplicationForm,
    today: NaiveDate,
) -> ValidationResult {
    let mut passed = true;
    let mut notes: Vec<String> = Vec::new();

    match id
        .expiry_date
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
    {
        Some(raw) => match parse_date(raw) {
            Some(expiry) if expiry < today => {
                passed = false;
                notes.push(format!("ID Document is expired (Expiry: {raw})."));
            }
            Some(_) => {}
            None => notes.push(format!("Invalid expiry date format ({raw}).")),
        },
        None => notes.push("Expiry date not detected.".to_string()),
    }

    let id_name = id.full_name.as_deref().unwrap_or_default();
    let form_name = form.full_name();
    if !is_name_match(id_name, &form_name) {
        passed = false;
        notes.push(format!(
            "Name mismatch (ID: \"{id_name}\" vs Form: \"{form_name}\")."
        ));
    }

    let id_dob = id.date_of_birth.as_deref().unwrap_or_default();
    if !dates_match(id_dob, &form.date_of_birth) {
        passed = false;
        notes.push(format!(
            "DOB mismatch (ID: {id_dob} vs Form: {}).",
            form.date_of_birth
        ));
    }

    if passed {
        ValidationResult::pass(IDENTITY_VERIFIED)
    } else {
        ValidationResult::fail(notes.join(" ").trim_end())
    }
}
