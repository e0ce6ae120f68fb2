//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{category::CategoryId, source::SourceId};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination did not match a registered user.
    #[error("Invalid Credentials")]
    InvalidCredentials,

    /// The request did not carry a valid bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// The current password given when changing passwords was wrong.
    #[error("Invalid password")]
    IncorrectPassword,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// A user with the email address is already registered.
    #[error("User already exists")]
    DuplicateEmail,

    /// An empty string was used to create a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// An empty string was used to create a source name.
    #[error("Source name cannot be empty")]
    EmptySourceName,

    /// A recurring category was requested without a start month, or with a
    /// month outside 1 to 12.
    #[error("start month must be a number from 1 to 12, got {0:?}")]
    InvalidStartMonth(Option<u8>),

    /// A reference date in a request could not be parsed.
    #[error("could not parse \"{0}\" as a date")]
    InvalidDate(String),

    /// The category ID used for a transaction does not refer to one of the
    /// user's categories.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(CategoryId),

    /// The source ID used for a transaction does not refer to one of the
    /// user's sources.
    #[error("the source ID {0} does not refer to a valid source")]
    InvalidSource(SourceId),

    /// The user already has a source with the same name.
    #[error("Source already exists")]
    DuplicateSource,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The category does not exist, is deleted, or belongs to another user.
    #[error("Category not found")]
    CategoryNotFound,

    /// The transaction does not exist, is deleted, or belongs to another user.
    #[error("Transaction not found")]
    TransactionNotFound,

    /// The source does not exist, is deleted, or belongs to another user.
    #[error("Source not found")]
    SourceNotFound,

    /// The email verification token does not match any user.
    #[error("Invalid token")]
    InvalidVerificationToken,

    /// The email verification token has expired.
    ///
    /// `resent` is true if a fresh token was sent to the caller.
    #[error("{}", expired_token_message(.resent))]
    VerificationTokenExpired {
        /// Whether a new verification email was sent.
        resent: bool,
    },

    /// An auth token could not be created.
    #[error("could not create auth token: {0}")]
    TokenCreation(String),

    /// An email could not be handed to the mailer.
    #[error("could not send email: {0}")]
    EmailError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

fn expired_token_message(resent: &bool) -> &'static str {
    if *resent {
        "Verification code expired, We have sent a new one."
    } else {
        "Login and resend code again"
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

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::IncorrectPassword
            | Error::TooWeak(_)
            | Error::InvalidEmail(_)
            | Error::EmptyCategoryName
            | Error::EmptySourceName
            | Error::InvalidStartMonth(_)
            | Error::InvalidDate(_)
            | Error::InvalidCategory(_)
            | Error::InvalidSource(_)
            | Error::InvalidVerificationToken
            | Error::VerificationTokenExpired { .. } => StatusCode::BAD_REQUEST,
            Error::DuplicateEmail | Error::DuplicateSource => StatusCode::CONFLICT,
            Error::NotFound
            | Error::CategoryNotFound
            | Error::TransactionNotFound
            | Error::SourceNotFound => StatusCode::NOT_FOUND,
            Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::EmailError(_)
            | Error::SqlError(_)
            | Error::InvalidTimezoneError(_)
            | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            // Internal details are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "Something went wrong, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}
