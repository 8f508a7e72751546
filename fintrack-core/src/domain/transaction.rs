//! Income and expense records
//!
//! Records come back from the finance API; the `New*` and `*Update` payloads
//! are what the client sends. Payloads are validated before they leave the
//! process so the user gets field-level messages without a round trip.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};

use super::result::{Error, Result};

const NAME_REQUIRED: &str = "Name is required";
const AMOUNT_POSITIVE: &str = "Amount must be positive";
const DESCRIPTION_REQUIRED: &str = "Description is required";
const SOURCE_REQUIRED: &str = "Source is required";
const UPDATE_EMPTY: &str = "At least one field must be provided for update";

fn require_text(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(message));
    }
    Ok(())
}

fn require_positive(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::validation(AMOUNT_POSITIVE));
    }
    Ok(())
}

/// Record dates arrive either as `2024-05-02` or as a full timestamp such as
/// `2024-05-02T00:00:00.000Z`; timestamps are reduced to their UTC date.
fn deserialize_record_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|timestamp| timestamp.with_timezone(&Utc).date_naive())
        .map_err(|_| de::Error::custom(format!("invalid record date '{}'", raw)))
}

/// Which side of the ledger an entry belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[default]
    Expense,
    Income,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }

    /// The other kind; mirrors the expense/income toggle on the entry form
    pub fn toggled(self) -> Self {
        match self {
            TransactionKind::Expense => TransactionKind::Income,
            TransactionKind::Income => TransactionKind::Expense,
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expense" => Ok(TransactionKind::Expense),
            "income" => Ok(TransactionKind::Income),
            other => Err(Error::validation(format!(
                "Unknown transaction type '{}': expected 'income' or 'expense'",
                other
            ))),
        }
    }
}

/// An income record owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub description: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(deserialize_with = "deserialize_record_date")]
    pub date: NaiveDate,
    pub user_id: String,
    #[serde(default)]
    pub category_ids: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// An expense record owned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub description: String,
    #[serde(deserialize_with = "deserialize_record_date")]
    pub date: NaiveDate,
    pub user_id: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating an income
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncome {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub category_ids: Vec<String>,
}

impl NewIncome {
    pub fn validate(&self) -> Result<()> {
        require_text(&self.name, NAME_REQUIRED)?;
        require_positive(self.amount)?;
        require_text(&self.description, DESCRIPTION_REQUIRED)?;
        if let Some(source) = &self.source {
            require_text(source, SOURCE_REQUIRED)?;
        }
        Ok(())
    }
}

/// Payload for creating an expense
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub category_ids: Vec<String>,
}

impl NewExpense {
    pub fn validate(&self) -> Result<()> {
        require_text(&self.name, NAME_REQUIRED)?;
        require_positive(self.amount)?;
        require_text(&self.description, DESCRIPTION_REQUIRED)
    }
}

/// Partial update of an income; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added_category_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed_category_ids: Vec<String>,
}

impl IncomeUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.amount.is_none()
            && self.description.is_none()
            && self.source.is_none()
            && self.date.is_none()
            && self.added_category_ids.is_empty()
            && self.removed_category_ids.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::validation(UPDATE_EMPTY));
        }
        if let Some(name) = &self.name {
            require_text(name, NAME_REQUIRED)?;
        }
        if let Some(amount) = self.amount {
            require_positive(amount)?;
        }
        if let Some(description) = &self.description {
            require_text(description, DESCRIPTION_REQUIRED)?;
        }
        if let Some(source) = &self.source {
            require_text(source, SOURCE_REQUIRED)?;
        }
        Ok(())
    }
}

/// Partial update of an expense; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added_category_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub removed_category_ids: Vec<String>,
}

impl ExpenseUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.amount.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.added_category_ids.is_empty()
            && self.removed_category_ids.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::validation(UPDATE_EMPTY));
        }
        if let Some(name) = &self.name {
            require_text(name, NAME_REQUIRED)?;
        }
        if let Some(amount) = self.amount {
            require_positive(amount)?;
        }
        if let Some(description) = &self.description {
            require_text(description, DESCRIPTION_REQUIRED)?;
        }
        Ok(())
    }
}

/// Unified entry form for a new income or expense
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub kind: TransactionKind,
    pub name: String,
    pub amount: Decimal,
    pub description: String,
    pub source: Option<String>,
    pub date: NaiveDate,
    pub category_ids: Vec<String>,
}

/// A validated draft, ready to send
#[derive(Debug, Clone, PartialEq)]
pub enum NewTransaction {
    Income(NewIncome),
    Expense(NewExpense),
}

impl TransactionDraft {
    /// Validate and convert into the payload for the draft's kind
    ///
    /// A blank `source` is treated as absent, matching an untouched form field.
    pub fn into_new_transaction(self) -> Result<NewTransaction> {
        let source = self
            .source
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        match self.kind {
            TransactionKind::Income => {
                let income = NewIncome {
                    name: self.name.trim().to_string(),
                    amount: self.amount,
                    description: self.description.trim().to_string(),
                    source,
                    date: self.date,
                    category_ids: self.category_ids,
                };
                income.validate()?;
                Ok(NewTransaction::Income(income))
            }
            TransactionKind::Expense => {
                if source.is_some() {
                    return Err(Error::validation("Expenses do not have a source"));
                }
                let expense = NewExpense {
                    name: self.name.trim().to_string(),
                    amount: self.amount,
                    description: self.description.trim().to_string(),
                    date: self.date,
                    category_ids: self.category_ids,
                };
                expense.validate()?;
                Ok(NewTransaction::Expense(expense))
            }
        }
    }
}
