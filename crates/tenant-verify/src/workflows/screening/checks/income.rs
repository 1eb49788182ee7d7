use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::super::documents::{BankStatementDocument, FieldValue, PayslipDocument, Transaction};
use super::super::domain::ValidationResult;
use super::super::matching::{is_name_match, parse_date};

const DEFAULT_AMOUNT_TOLERANCE: f64 = 1.5;
const DEFAULT_EARLY_DAYS: i64 = 3;
const DEFAULT_LATE_DAYS: i64 = 5;

/// Slack allowed when pairing a payslip with a bank deposit.
///
/// A deposit matches when its amount differs from net pay by strictly less than
/// `amount_tolerance` and it posted between `early_days` before and `late_days` after the
/// pay date, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchingTolerances {
    pub amount_tolerance: f64,
    pub early_days: i64,
    pub late_days: i64,
}

impl Default for MatchingTolerances {
    fn default() -> Self {
        Self {
            amount_tolerance: DEFAULT_AMOUNT_TOLERANCE,
            early_days: DEFAULT_EARLY_DAYS,
            late_days: DEFAULT_LATE_DAYS,
        }
    }
}

impl MatchingTolerances {
    fn accepts(&self, transaction: &Transaction, net_pay: f64, pay_date: NaiveDate) -> bool {
        if !transaction.is_credit() {
            return false;
        }

        let Some(posted) = transaction.date.as_deref().and_then(parse_date) else {
            return false;
        };
        let Some(amount) = transaction.amount.as_ref().and_then(FieldValue::as_decimal) else {
            return false;
        };

        let offset = (posted - pay_date).num_days();
        (amount - net_pay).abs() < self.amount_tolerance
            && offset >= -self.early_days
            && offset <= self.late_days
    }
}

/// Reconcile payslip net pay against credits on a bank statement.
///
/// The first payslip's employee name is checked against the account holder first; a
/// mismatch ends the check immediately. Each payslip then needs one credit inside the
/// tolerance window. The first qualifying transaction in statement order is taken and the
/// same transaction may satisfy several payslips.
pub fn validate_income<'a, I>(
    payslips: I,
    statement: &BankStatementDocument,
    tolerances: &MatchingTolerances,
) -> ValidationResult
where
    I: IntoIterator<Item = &'a PayslipDocument>,
{
    let payslips: Vec<&PayslipDocument> = payslips.into_iter().collect();
    let holder = present(statement.account_holder_name.as_deref());

    if let Some(first) = payslips.first() {
        let employee = present(first.employee_name.as_deref());
        if let (Some(employee), Some(holder)) = (employee, holder) {
            if !is_name_match(employee, holder) {
                warn!(employee, holder, "payslip and bank statement names disagree");
                return ValidationResult::fail(format!(
                    "Name mismatch between Payslip ({employee}) and Bank Statement ({holder})."
                ));
            }
        }
    }

    let mut mismatches: Vec<String> = Vec::new();
    let mut matched = 0usize;

    for payslip in payslips {
        let pay_date_label = payslip.pay_date.as_deref().unwrap_or("unknown date");

        let Some(net_pay) = payslip.net_income.as_ref().and_then(FieldValue::as_decimal) else {
            warn!(pay_date = pay_date_label, "payslip net income unreadable");
            mismatches.push(format!(
                "Could not parse net income from payslip dated {pay_date_label}."
            ));
            continue;
        };

        let deposit = payslip
            .pay_date
            .as_deref()
            .and_then(parse_date)
            .and_then(|pay_date| {
                statement
                    .transactions
                    .iter()
                    .find(|transaction| tolerances.accepts(transaction, net_pay, pay_date))
            });

        match deposit {
            Some(_) => matched += 1,
            None => mismatches.push(format!(
                "No matching deposit of {net_pay} found around {pay_date_label}."
            )),
        }
    }

    if !mismatches.is_empty() {
        return ValidationResult::fail(format!(
            "Income verification issues: {}",
            mismatches.join(" ")
        ));
    }

    ValidationResult::pass(format!(
        "Successfully verified {matched} payslip payments against bank statement transactions."
    ))
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
