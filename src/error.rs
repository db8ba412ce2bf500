//! Defines the app level error type and the single policy for turning errors into JSON responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{auth::UserID, validation::FieldErrors};

/// The message sent to clients when something went wrong on the server.
const INTERNAL_ERROR_MSG: &str = "Internal server error";

/// The message sent for a log-in attempt with an unknown username or the wrong password.
pub const INVALID_CREDENTIALS_MSG: &str = "Invalid username or password";

/// The message sent when a protected route is requested without a valid session.
pub const AUTHENTICATION_REQUIRED_MSG: &str = "Authentication required";

/// The field error for a username that belongs to another user.
pub const DUPLICATE_USERNAME_MSG: &str = "A user with that username already exists.";

/// The message sent when a registered user has no profile.
pub const MISSING_PROFILE_MSG: &str = "User profile not found. Please contact support.";

/// The message sent when a profile lookup fails.
pub const PROFILE_NOT_FOUND_MSG: &str = "Profile not found";

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more fields of the request failed validation.
    ///
    /// The client should fix the listed fields and try again.
    #[error("invalid input: {0}")]
    Validation(FieldErrors),

    /// The request body or query string could not be parsed into the expected shape.
    #[error("malformed request: {0}")]
    MalformedBody(String),

    /// The username does not exist or the password does not match.
    ///
    /// These two cases are deliberately not distinguished.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The request did not carry a valid, unexpired auth token.
    #[error("authentication required")]
    Unauthenticated,

    /// The auth token cookie is missing from the cookie jar in the request.
    #[error("no auth token in the cookie jar")]
    CookieMissing,

    /// The auth token could not be serialized into a cookie.
    #[error("could not serialize the auth token: {0}")]
    TokenFormat(String),

    /// The username is empty, too long or contains characters that are not allowed.
    #[error("{0}")]
    InvalidUsername(&'static str),

    /// The category name is empty or too long.
    #[error("{0}")]
    InvalidCategoryName(&'static str),

    /// The amount is not a decimal number with at most 10 digits and 2 decimal places.
    #[error("{0}")]
    InvalidAmount(&'static str),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The username is already taken by another user.
    #[error("the username is already in use")]
    DuplicateUsername,

    /// A category with the same name already exists.
    #[error("the category name is already in use")]
    DuplicateCategoryName,

    /// A row referenced a category or user that does not exist.
    #[error("a foreign key does not refer to an existing row")]
    InvalidForeignKey,

    /// The requested resource was not found.
    ///
    /// Internally, this error occurs when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// There is no profile for the requested user ID.
    #[error("the profile could not be found")]
    ProfileNotFound,

    /// A user passed authentication but has no profile.
    ///
    /// This signals that the data needs repairing rather than a client mistake.
    #[error("user {0} has no profile")]
    MissingProfile(UserID),

    /// The category does not exist.
    #[error("the category could not be found")]
    CategoryNotFound,

    /// The expense does not exist for the given user.
    #[error("the expense could not be found")]
    ExpenseNotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A response body could not be buffered for logging.
    #[error("could not read the response body: {0}")]
    ResponseBody(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.username") =>
            {
                Error::DuplicateUsername
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("category.name") =>
            {
                Error::DuplicateCategoryName
            }
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, _) if sql_error.extended_code == 787 => {
                Error::InvalidForeignKey
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::MalformedBody(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::MalformedBody(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Could not parse path parameters: {rejection}");
        Error::NotFound
    }
}

fn message_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            Error::DuplicateUsername => {
                Error::Validation(FieldErrors::single("username", DUPLICATE_USERNAME_MSG))
                    .into_response()
            }
            Error::DuplicateCategoryName => Error::Validation(FieldErrors::single(
                "name",
                "category with this name already exists.",
            ))
            .into_response(),
            Error::TooWeak(feedback) => {
                Error::Validation(FieldErrors::single("password", &feedback)).into_response()
            }
            Error::MalformedBody(description) => {
                message_response(StatusCode::BAD_REQUEST, &description)
            }
            Error::InvalidUsername(description) => {
                Error::Validation(FieldErrors::single("username", description)).into_response()
            }
            Error::InvalidCategoryName(description) => {
                Error::Validation(FieldErrors::single("name", description)).into_response()
            }
            Error::InvalidAmount(description) => {
                Error::Validation(FieldErrors::single("amount", description)).into_response()
            }
            Error::InvalidForeignKey => message_response(
                StatusCode::BAD_REQUEST,
                "The referenced category or user does not exist.",
            ),
            Error::InvalidCredentials => {
                message_response(StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS_MSG)
            }
            Error::Unauthenticated | Error::CookieMissing => {
                message_response(StatusCode::UNAUTHORIZED, AUTHENTICATION_REQUIRED_MSG)
            }
            Error::NotFound => message_response(StatusCode::NOT_FOUND, "Not found."),
            Error::ProfileNotFound => message_response(StatusCode::NOT_FOUND, PROFILE_NOT_FOUND_MSG),
            Error::MissingProfile(user_id) => {
                tracing::error!("User {user_id} authenticated but has no profile.");
                message_response(StatusCode::NOT_FOUND, MISSING_PROFILE_MSG)
            }
            Error::CategoryNotFound => message_response(
                StatusCode::NOT_FOUND,
                "No Category matches the given query.",
            ),
            Error::ExpenseNotFound => message_response(
                StatusCode::NOT_FOUND,
                "No Expense matches the given query.",
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                message_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MSG)
            }
        }
    }
}
