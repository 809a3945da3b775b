//! The JSON structures sent back to clients.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    Error,
    category::Category,
    database_id::{CategoryId, TransactionId},
    error::ErrorCode,
    summary::{CategoryTotal, Summary},
    transaction::{Transaction, TransactionType},
    user::{User, UserID},
};

/// The envelope of a successful response: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// The envelope of a failed response:
/// `{"data": null, "errors": [{"message": ..., "extensions": {"code": ...}}]}`.
#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorResponse {
    pub data: Option<()>,
    pub errors: Vec<ApiError>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ApiError {
    pub message: String,
    pub extensions: ErrorExtensions,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorExtensions {
    pub code: ErrorCode,
}

impl ErrorResponse {
    /// Build the response body for `error`, hiding the details of internal errors.
    pub fn from_error(error: &Error) -> Self {
        Self {
            data: None,
            errors: vec![ApiError {
                message: error.client_message(),
                extensions: ErrorExtensions { code: error.code() },
            }],
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserID,
    pub email: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<TransactionResponse>>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.to_string(),
            name: user.name.clone(),
            created_at: user.created_at,
            categories: None,
            transactions: None,
        }
    }
}

/// A category, optionally with the transactions that belong to it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: CategoryId,
    pub user_id: UserID,
    pub name: String,
    pub color: String,
    pub icon: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions: Option<Vec<TransactionResponse>>,
}

impl CategoryResponse {
    /// Embed `transactions` in the response.
    pub fn with_transactions(mut self, transactions: &[Transaction]) -> Self {
        self.transactions = Some(transactions.iter().map(TransactionResponse::from).collect());
        self
    }
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            user_id: category.user_id,
            name: category.name.to_string(),
            color: category.color.clone(),
            icon: category.icon.clone(),
            created_at: category.created_at,
            transactions: None,
        }
    }
}

/// A transaction, optionally with the category it belongs to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub id: TransactionId,
    pub user_id: UserID,
    pub description: Option<String>,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub category_id: CategoryId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Box<CategoryResponse>>,
}

impl TransactionResponse {
    /// Embed `category` in the response.
    pub fn with_category(mut self, category: &Category) -> Self {
        self.category = Some(Box::new(CategoryResponse::from(category)));
        self
    }
}

impl From<&Transaction> for TransactionResponse {
    fn from(transaction: &Transaction) -> Self {
        Self {
            id: transaction.id,
            user_id: transaction.user_id,
            description: transaction.description.clone(),
            amount: transaction.amount,
            transaction_type: transaction.transaction_type,
            date: transaction.date,
            category_id: transaction.category_id,
            created_at: transaction.created_at,
            category: None,
        }
    }
}

/// The result of signing up or logging in.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotalResponse {
    pub id: CategoryId,
    pub name: String,
    pub color: String,
    pub icon: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total: Decimal,
}

impl From<CategoryTotal> for CategoryTotalResponse {
    fn from(total: CategoryTotal) -> Self {
        Self {
            id: total.category_id,
            name: total.name,
            color: total.color,
            icon: total.icon,
            total: total.total,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_income: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub total_expense: Decimal,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub balance: Decimal,
    pub transaction_count: usize,
    pub expenses_by_category: Vec<CategoryTotalResponse>,
}

impl From<Summary> for SummaryResponse {
    fn from(summary: Summary) -> Self {
        Self {
            total_income: summary.total_income,
            total_expense: summary.total_expense,
            balance: summary.balance,
            transaction_count: summary.transaction_count,
            expenses_by_category: summary
                .expenses_by_category
                .into_iter()
                .map(CategoryTotalResponse::from)
                .collect(),
        }
    }
}
