//! Defines the app level error type and its conversion to API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::api::ErrorResponse;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry a valid bearer token, or the token refers to
    /// a user that no longer exists.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The email and password did not match a registered user.
    ///
    /// The same error is used for an unknown email and a wrong password so
    /// that clients cannot find out which email addresses are registered.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// A user with the email already exists.
    #[error("User already exists")]
    DuplicateEmail,

    /// The user already has a category with this name (ignoring case and
    /// surrounding whitespace).
    #[error("a category named \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// The requested resource was not found.
    ///
    /// This is also returned when the resource exists but belongs to another
    /// user, so that users cannot find out whether another user's resource
    /// exists.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The category referenced by a transaction does not exist or belongs to
    /// another user.
    #[error("Category not found")]
    CategoryNotFound,

    /// The request was missing a required field or a field had an invalid
    /// value.
    #[error("{0}")]
    Validation(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The signed token could not be created.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

/// The machine readable category of an [Error] that is sent to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No identity could be resolved for the request.
    Unauthenticated,
    /// Log in failed.
    InvalidCredentials,
    /// A unique value (email, category name) is already taken.
    AlreadyExists,
    /// The resource does not exist or is not owned by the caller.
    NotFound,
    /// A transaction referenced an invalid category.
    CategoryNotFound,
    /// The request was malformed.
    ValidationError,
    /// Something went wrong on the server.
    InternalError,
}

impl Error {
    /// Get the machine readable category for the error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Unauthenticated => ErrorCode::Unauthenticated,
            Error::InvalidCredentials => ErrorCode::InvalidCredentials,
            Error::DuplicateEmail | Error::DuplicateCategoryName(_) => ErrorCode::AlreadyExists,
            Error::NotFound => ErrorCode::NotFound,
            Error::CategoryNotFound => ErrorCode::CategoryNotFound,
            Error::Validation(_) => ErrorCode::ValidationError,
            Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError => ErrorCode::InternalError,
        }
    }

    /// The HTTP status code to send along with the error.
    pub fn status_code(&self) -> StatusCode {
        match self.code() {
            ErrorCode::Unauthenticated | ErrorCode::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ErrorCode::AlreadyExists => StatusCode::CONFLICT,
            ErrorCode::NotFound | ErrorCode::CategoryNotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message that is safe to show to the client.
    ///
    /// Internal errors are replaced with a generic message, the details should
    /// only be logged on the server.
    pub fn client_message(&self) -> String {
        match self.code() {
            ErrorCode::InternalError => {
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            _ => self.to_string(),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.code() == ErrorCode::InternalError {
            tracing::error!("An unexpected error occurred: {}", self);
        }

        (self.status_code(), ErrorResponse::from_error(&self)).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::{Error, ErrorCode};

    #[test]
    fn already_exists_covers_emails_and_category_names() {
        assert_eq!(Error::DuplicateEmail.code(), ErrorCode::AlreadyExists);
        assert_eq!(
            Error::DuplicateCategoryName("Food".to_owned()).code(),
            ErrorCode::AlreadyExists
        );
    }

    #[test]
    fn internal_errors_hide_details_from_clients() {
        let error = Error::HashingError("bcrypt exploded".to_owned());

        assert_eq!(error.code(), ErrorCode::InternalError);
        assert!(!error.client_message().contains("bcrypt"));
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }

    #[test]
    fn error_response_uses_mapped_status_code() {
        let response = Error::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = Error::CategoryNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = Error::Validation("name is required".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
