use super::super::documents::AddressDocument;
use super::super::domain::{ApplicationForm, ValidationResult};

/// Check that a proof-of-address document mentions the declared zip code and street.
///
/// Matching is substring containment over lower-cased alphanumerics, using only the first
/// token of the declared street line (usually the house number or name). A blank form value
/// is contained in every address and so does not block a pass.
pub fn validate_address(document: &AddressDocument, form: &ApplicationForm) -> ValidationResult {
    let raw_address = document.address.as_deref().unwrap_or_default();
    let document_address = alphanumeric(raw_address);

    let zip_code = alphanumeric(&form.zip_code);
    let street = form
        .address_line1
        .split_whitespace()
        .next()
        .map(alphanumeric)
        .unwrap_or_default();

    let zip_match = document_address.contains(&zip_code);
    let street_match = document_address.contains(&street);

    if zip_match && street_match {
        return ValidationResult::pass("Address document matches application details.");
    }

    ValidationResult::fail(format!(
        "Address mismatch. Document address \"{raw_address}\" does not sufficiently match form details."
    ))
}

fn alphanumeric(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter(|ch| ch.is_alphanumeric())
        .collect()
}
