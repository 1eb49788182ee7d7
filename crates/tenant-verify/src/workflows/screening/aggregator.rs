use serde::Serialize;

use super::status::{
    ApplicationStatus, AuditTrail, VerificationDocumentType, VerificationField,
    VerificationStatus, YesNo,
};

/// Outcome of re-evaluating an application's verification flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationTransition {
    /// Fields that flip from NO to YES.
    pub newly_verified: Vec<VerificationField>,
    /// Flags after the transition is applied.
    pub status: VerificationStatus,
    /// Whether the application reaches SCREENING_COMPLETE with this transition.
    pub completes_screening: bool,
}

impl VerificationTransition {
    pub fn is_noop(&self) -> bool {
        self.newly_verified.is_empty() && !self.completes_screening
    }
}

/// Work out which verification flags the attached documents now satisfy.
///
/// With a `scope` only that field is considered; without one all six are. Flags never move
/// from YES back to NO. Screening completes once every flag is YES and the audit trail does
/// not already record it, so re-running with the same inputs is a no-op.
pub fn recompute(
    current: &VerificationStatus,
    completed_steps: &AuditTrail,
    attached: &[VerificationDocumentType],
    scope: Option<VerificationField>,
) -> VerificationTransition {
    let candidates: Vec<VerificationField> = match scope {
        Some(field) => vec![field],
        None => VerificationField::ALL.to_vec(),
    };

    let mut status = *current;
    let mut newly_verified = Vec::new();

    for field in candidates {
        if status.get(field) == YesNo::Yes || !field.is_satisfied_by(attached) {
            continue;
        }
        status.set(field, YesNo::Yes);
        newly_verified.push(field);
    }

    let completes_screening = status.is_fully_verified()
        && !completed_steps.contains(ApplicationStatus::ScreeningComplete);

    VerificationTransition {
        newly_verified,
        status,
        completes_screening,
    }
}
