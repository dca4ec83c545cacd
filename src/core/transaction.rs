use chrono::NaiveDate;
use fintax_derive::CsvSchema;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;

use super::fiscal::FiscalYear;
use super::input;
use super::schema::CsvField;
use super::tax::TaxError;

/// Data-quality problems found in transaction records
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("transaction {record}: confidence {confidence} is outside 0..=100")]
    ConfidenceOutOfRange { record: String, confidence: i64 },
    #[error("transaction {record}: amount {amount} is negative")]
    NegativeAmount { record: String, amount: Decimal },
    #[error(transparent)]
    Tax(#[from] TaxError),
}

/// Whether money came in or went out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
}

/// Input root for transaction JSON
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TransactionInput {
    pub transactions: Vec<TransactionRecord>,
}

/// A single bank or manually entered transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, CsvSchema)]
pub struct TransactionRecord {
    /// Identifier from the source system
    #[serde(default)]
    pub id: Option<String>,
    /// Transaction date (YYYY-MM-DD)
    #[serde(rename = "date")]
    #[schemars(with = "String")]
    pub occurred_on: NaiveDate,
    /// income or expense
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Amount in rupees
    #[schemars(with = "f64")]
    pub amount: Decimal,
    /// Category id (salary, business, interest, food, ...)
    pub category: String,
    /// Verification confidence 0-100, 0 means unverified manual entry
    #[serde(default, deserialize_with = "deserialize_confidence")]
    #[schemars(with = "i64")]
    pub confidence: i64,
    /// Free-text narration
    #[serde(default)]
    pub description: Option<String>,
}

impl TransactionRecord {
    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }

    pub fn is_verified(&self) -> bool {
        self.confidence > 0
    }

    /// Label used in error messages: the id when present, else date and amount
    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("{} {}", self.occurred_on, self.amount),
        }
    }

    pub fn fiscal_year(&self) -> FiscalYear {
        FiscalYear::from_date(self.occurred_on)
    }

    /// Reject records whose amount or confidence would distort the audit score
    pub fn validate(&self) -> Result<(), RecordError> {
        if !(0..=100).contains(&self.confidence) {
            return Err(RecordError::ConfidenceOutOfRange {
                record: self.label(),
                confidence: self.confidence,
            });
        }
        if self.amount < Decimal::ZERO {
            return Err(RecordError::NegativeAmount {
                record: self.label(),
                amount: self.amount,
            });
        }
        Ok(())
    }
}

// An empty CSV cell or JSON null counts as an unverified entry
fn deserialize_confidence<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

fn amount_mut(record: &mut TransactionRecord) -> &mut Decimal {
    &mut record.amount
}

/// Read transactions from CSV
pub fn read_csv<R: Read>(reader: R) -> anyhow::Result<Vec<TransactionRecord>> {
    let mut records = input::read_rows(reader, "amount", amount_mut)?;
    records.sort_by_key(|r| r.occurred_on);
    Ok(records)
}

/// Read transactions from JSON
pub fn read_json<R: Read>(reader: R) -> anyhow::Result<Vec<TransactionRecord>> {
    let input: TransactionInput = serde_json::from_reader(reader)?;
    let mut records = input.transactions;
    records.sort_by_key(|r| r.occurred_on);
    Ok(records)
}

/// Records dated inside the given fiscal year
pub fn filter_fiscal_year(
    records: &[TransactionRecord],
    fiscal_year: FiscalYear,
) -> Vec<TransactionRecord> {
    records
        .iter()
        .filter(|r| fiscal_year.contains(r.occurred_on))
        .cloned()
        .collect()
}

/// Fiscal year of the most recent record, if any
pub fn latest_fiscal_year(records: &[TransactionRecord]) -> Option<FiscalYear> {
    records
        .iter()
        .map(|r| r.occurred_on)
        .max()
        .map(FiscalYear::from_date)
}
