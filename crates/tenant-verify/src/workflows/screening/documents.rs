//! Typed views over the fields produced by upstream document extraction.
//!
//! Extraction output is loosely shaped: any field may be missing, null, or of the wrong JSON
//! type, and numeric values arrive either as JSON numbers or as strings. Text fields keep the
//! textual form of scalars and drop anything else, lists treat null as empty and skip entries
//! that do not parse, and unrecognised documents are skipped. A malformed field therefore
//! shows up as a failed or skipped check rather than a rejected bundle.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Extracted fields from one uploaded document, tagged by document kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractedDocument {
    Identity(IdentityDocument),
    Payslip(PayslipDocument),
    BankStatement(BankStatementDocument),
    ProofOfAddress(AddressDocument),
}

impl ExtractedDocument {
    pub const fn kind_label(&self) -> &'static str {
        match self {
            ExtractedDocument::Identity(_) => "identity",
            ExtractedDocument::Payslip(_) => "payslip",
            ExtractedDocument::BankStatement(_) => "bank_statement",
            ExtractedDocument::ProofOfAddress(_) => "proof_of_address",
        }
    }
}

/// Passport, driving licence, or national ID card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDocument {
    #[serde(default, deserialize_with = "lenient_text")]
    pub full_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub expiry_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayslipDocument {
    #[serde(default, deserialize_with = "lenient_text")]
    pub employee_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub employer_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub net_income: Option<FieldValue>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub pay_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankStatementDocument {
    #[serde(default, deserialize_with = "lenient_text")]
    pub account_holder_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub transactions: Vec<Transaction>,
}

/// Utility bill, council tax letter, or similar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDocument {
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
}

/// Single bank statement line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub amount: Option<FieldValue>,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub kind: Option<TransactionType>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
}

impl Transaction {
    pub fn is_credit(&self) -> bool {
        matches!(self.kind, Some(TransactionType::Credit))
    }
}

/// Direction of a bank statement line. Unknown labels are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransactionType {
    Credit,
    Debit,
    Other(String),
}

impl From<String> for TransactionType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "CREDIT" => Self::Credit,
            "DEBIT" => Self::Debit,
            _ => Self::Other(value),
        }
    }
}

impl From<TransactionType> for String {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Credit => "CREDIT".to_string(),
            TransactionType::Debit => "DEBIT".to_string(),
            TransactionType::Other(label) => label,
        }
    }
}

/// Numeric field that extraction may deliver as a number or as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Parse the value as a decimal amount, tolerating currency symbols and
    /// thousands separators in text values.
    pub fn as_decimal(&self) -> Option<f64> {
        let value = match self {
            FieldValue::Number(number) => *number,
            FieldValue::Text(text) => {
                let cleaned: String = text
                    .trim()
                    .chars()
                    .filter(|ch| !matches!(ch, '£' | '$' | '€' | ',' | ' '))
                    .collect();
                cleaned.parse::<f64>().ok()?
            }
        };

        value.is_finite().then_some(value)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(number) => write!(f, "{number}"),
            FieldValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// The documents an applicant uploaded for one round of checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentBundle {
    #[serde(default, deserialize_with = "lenient_list")]
    pub documents: Vec<ExtractedDocument>,
}

impl DocumentBundle {
    pub fn new(documents: Vec<ExtractedDocument>) -> Self {
        Self { documents }
    }

    /// First identity document in upload order.
    pub fn identity(&self) -> Option<&IdentityDocument> {
        self.documents.iter().find_map(|document| match document {
            ExtractedDocument::Identity(identity) => Some(identity),
            _ => None,
        })
    }

    pub fn payslips(&self) -> Vec<&PayslipDocument> {
        self.documents
            .iter()
            .filter_map(|document| match document {
                ExtractedDocument::Payslip(payslip) => Some(payslip),
                _ => None,
            })
            .collect()
    }

    pub fn bank_statement(&self) -> Option<&BankStatementDocument> {
        self.documents.iter().find_map(|document| match document {
            ExtractedDocument::BankStatement(statement) => Some(statement),
            _ => None,
        })
    }

    pub fn proof_of_address(&self) -> Option<&AddressDocument> {
        self.documents.iter().find_map(|document| match document {
            ExtractedDocument::ProofOfAddress(address) => Some(address),
            _ => None,
        })
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| T::deserialize(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
