//! Document cross-checks. Every check returns a [`ValidationResult`]; malformed fields are
//! reported in `details` rather than raised.
//!
//! [`ValidationResult`]: super::domain::ValidationResult

mod address;
mod identity;
mod income;

pub use address::validate_address;
pub use identity::validate_id_against_form;
pub use income::{validate_income, MatchingTolerances};
