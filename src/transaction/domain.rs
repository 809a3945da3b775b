//! Core transaction domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

use crate::{
    Error,
    database_id::{CategoryId, TransactionId},
    user::UserID,
};

/// Whether money was earned or spent.
///
/// The amount of a transaction carries no sign, the direction of the money is
/// given by the type alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money that was earned.
    Income,
    /// Money that was spent.
    Expense,
}

impl TransactionType {
    /// The name of the type as stored and sent to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::Validation(format!(
                "\"{other}\" is not a valid transaction type, expected \"income\" or \"expense\""
            ))),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// Parse the date of a transaction.
///
/// Accepts either a calendar date, e.g. "2024-01-15", which is taken to be
/// midnight UTC, or an RFC 3339 date-time, e.g. "2024-01-15T09:30:00+13:00".
///
/// # Errors
///
/// Returns an [Error::Validation] if `raw_date` is in neither format.
pub fn parse_transaction_date(raw_date: &str) -> Result<OffsetDateTime, Error> {
    let raw_date = raw_date.trim();

    if let Ok(date_time) = OffsetDateTime::parse(raw_date, &Rfc3339) {
        return Ok(date_time);
    }

    Date::parse(raw_date, format_description!("[year]-[month]-[day]"))
        .map(|date| date.midnight().assume_utc())
        .map_err(|_| {
            Error::Validation(format!(
                "\"{raw_date}\" is not a valid date, expected YYYY-MM-DD or an RFC 3339 date-time"
            ))
        })
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// The category the transaction belongs to, owned by the same user.
    pub category_id: CategoryId,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// The amount of money spent or earned, see [TransactionType].
    pub amount: Decimal,
    /// Whether the money was spent or earned.
    pub transaction_type: TransactionType,
    /// When the transaction happened.
    pub date: OffsetDateTime,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
}

/// The fields needed to create a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// The category to file the transaction under, must be owned by the same user.
    pub category_id: CategoryId,
    /// A text description of what the transaction was for.
    pub description: Option<String>,
    /// The amount of money spent or earned.
    pub amount: Decimal,
    /// Whether the money was spent or earned.
    pub transaction_type: TransactionType,
    /// When the transaction happened.
    pub date: OffsetDateTime,
}

/// A partial update of a transaction, `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    pub category_id: Option<CategoryId>,
    /// `Some(None)` removes the description.
    pub description: Option<Option<String>>,
    pub amount: Option<Decimal>,
    pub transaction_type: Option<TransactionType>,
    pub date: Option<OffsetDateTime>,
}

impl TransactionUpdate {
    /// Apply the update to `transaction`.
    pub fn apply(self, mut transaction: Transaction) -> Transaction {
        if let Some(category_id) = self.category_id {
            transaction.category_id = category_id;
        }

        if let Some(description) = self.description {
            transaction.description = description;
        }

        if let Some(amount) = self.amount {
            transaction.amount = amount;
        }

        if let Some(transaction_type) = self.transaction_type {
            transaction.transaction_type = transaction_type;
        }

        if let Some(date) = self.date {
            transaction.date = date;
        }

        transaction
    }
}

#[cfg(test)]
mod transaction_type_tests {
    use crate::{Error, transaction::TransactionType};

    #[test]
    fn parses_known_types() {
        assert_eq!("income".parse(), Ok(TransactionType::Income));
        assert_eq!("expense".parse(), Ok(TransactionType::Expense));
    }

    #[test]
    fn rejects_unknown_types() {
        let result = "refund".parse::<TransactionType>();

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn serializes_as_lowercase() {
        let json = serde_json::to_string(&TransactionType::Expense).unwrap();

        assert_eq!(json, "\"expense\"");
    }
}
