//! Converts untyped request input into typed, constraint-checked values.
//!
//! Validation functions record problems in a [FieldErrors] map instead of
//! returning early so that a client gets every problem with its request in a
//! single response.

use std::{collections::BTreeMap, fmt::Display};

use axum::extract::{FromRequest, FromRequestParts};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::UserID};

/// Message for a required field that was not sent.
pub const REQUIRED_MSG: &str = "This field is required.";
/// Message for a required text field that only contains whitespace.
pub const BLANK_MSG: &str = "This field may not be blank.";
/// Message for an ID that is not an integer.
pub const INVALID_INTEGER_MSG: &str = "A valid integer is required.";

/// Field-level validation errors, keyed by field name.
///
/// Serializes as `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Create an empty set of errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set of errors with a single message for `field`.
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Record `message` against `field`.
    pub fn add(&mut self, field: &str, message: impl ToString) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.to_string());
    }

    /// Whether no errors have been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The messages recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields = self
            .0
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
            .collect::<Vec<_>>();

        write!(f, "{}", fields.join("; "))
    }
}

/// A JSON request body whose parse errors are reported through [Error].
///
/// Use this instead of [axum::Json] so that malformed bodies get the same
/// JSON error shape as every other client error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// A path parameter, such as a record ID, where a value that cannot be parsed means the
/// resource does not exist.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct IdPath<T>(pub T);

/// Query string parameters whose parse errors are reported through [Error].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct QueryParams<T>(pub T);

/// A scalar that clients may send either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NumberOrText {
    /// A JSON integer, e.g. `12`.
    Integer(i64),
    /// A JSON number with a fractional part, e.g. `12.5`.
    Float(f64),
    /// A JSON string, e.g. `"12.50"`.
    Text(String),
}

impl Display for NumberOrText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumberOrText::Integer(integer) => write!(f, "{integer}"),
            NumberOrText::Float(float) => write!(f, "{float}"),
            NumberOrText::Text(text) => write!(f, "{text}"),
        }
    }
}

/// The `user_id` query parameter shared by the expense and profile endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct UserIdQuery {
    /// The raw value, validated by [require_user_id].
    pub user_id: Option<String>,
}

/// Validate a required text field, trimming surrounding whitespace.
///
/// Returns `None` and records an error if the field is missing, blank or
/// longer than `max_length` characters.
pub fn require_text(
    field: &str,
    value: Option<&str>,
    max_length: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    let Some(value) = value else {
        errors.add(field, REQUIRED_MSG);
        return None;
    };

    let value = value.trim();

    if value.is_empty() {
        errors.add(field, BLANK_MSG);
        return None;
    }

    check_length(field, value, max_length, errors)
}

/// Validate an optional text field.
///
/// A missing field is `None`; otherwise the trimmed value is returned if it is
/// no longer than `max_length` characters.
pub fn optional_text(
    field: &str,
    value: Option<&str>,
    max_length: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    value.and_then(|value| check_length(field, value.trim(), max_length, errors))
}

fn check_length(
    field: &str,
    value: &str,
    max_length: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    if value.chars().count() > max_length {
        errors.add(
            field,
            format!("Ensure this field has no more than {max_length} characters."),
        );
        return None;
    }

    Some(value.to_owned())
}

/// Validate a required integer ID sent as a JSON number or a numeric string.
pub fn require_id(
    field: &str,
    value: Option<&NumberOrText>,
    errors: &mut FieldErrors,
) -> Option<i64> {
    let parsed = match value {
        None => {
            errors.add(field, REQUIRED_MSG);
            return None;
        }
        Some(NumberOrText::Integer(integer)) => Some(*integer),
        Some(NumberOrText::Float(_)) => None,
        Some(NumberOrText::Text(text)) => text.trim().parse().ok(),
    };

    if parsed.is_none() {
        errors.add(field, INVALID_INTEGER_MSG);
    }

    parsed
}

/// Validate the `user_id` query parameter.
///
/// # Errors
///
/// Returns an [Error::Validation] naming `user_id` if the parameter is missing,
/// empty or not an integer.
pub fn require_user_id(query: &UserIdQuery) -> Result<UserID, Error> {
    match query.user_id.as_deref().map(str::trim) {
        None | Some("") => Err(Error::Validation(FieldErrors::single(
            "user_id",
            REQUIRED_MSG,
        ))),
        Some(raw_id) => raw_id.parse().map(UserID::new).map_err(|_| {
            Error::Validation(FieldErrors::single("user_id", INVALID_INTEGER_MSG))
        }),
    }
}
