//! A collection that reports emptiness with a message instead of an empty list.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Serialize, Serializer};
use serde_json::json;

/// A list of items, or a message explaining that there are none.
///
/// As a response, an empty listing is a 404 with `{"message": ...}`. Nested in
/// another response body it serializes to the bare message string.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    /// At least one item.
    Items(Vec<T>),
    /// No items, described by the message.
    Empty(&'static str),
}

impl<T> Listing<T> {
    /// Wrap `items`, using `empty_message` when there are none.
    pub fn new(items: Vec<T>, empty_message: &'static str) -> Self {
        if items.is_empty() {
            Self::Empty(empty_message)
        } else {
            Self::Items(items)
        }
    }
}

impl<T: Serialize> Serialize for Listing<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Listing::Items(items) => items.serialize(serializer),
            Listing::Empty(message) => serializer.serialize_str(message),
        }
    }
}

impl<T: Serialize> IntoResponse for Listing<T> {
    fn into_response(self) -> Response {
        match self {
            Listing::Items(items) => Json(items).into_response(),
            Listing::Empty(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "message": message }))).into_response()
            }
        }
    }
}
