//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    validation::{BLANK_MSG, FieldErrors, REQUIRED_MSG},
};

/// The maximum number of characters in a category name.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidCategoryName] if `name` is blank or longer
    /// than [MAX_CATEGORY_NAME_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::InvalidCategoryName(BLANK_MSG))
        } else if name.chars().count() > MAX_CATEGORY_NAME_LENGTH {
            Err(Error::InvalidCategoryName(
                "Ensure this field has no more than 100 characters.",
            ))
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a category.
pub type CategoryId = i64;

/// A label for grouping expenses (e.g., 'Groceries', 'Rent').
///
/// Categories are shared by all users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
}

/// Request body for creating and renaming a category.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CategoryData {
    pub name: Option<String>,
}

impl CategoryData {
    /// Validate the name, reporting problems as field errors.
    pub fn validate(&self) -> Result<CategoryName, Error> {
        let Some(raw_name) = self.name.as_deref() else {
            return Err(Error::Validation(FieldErrors::single("name", REQUIRED_MSG)));
        };

        CategoryName::new(raw_name).map_err(|error| match error {
            Error::InvalidCategoryName(message) => {
                Error::Validation(FieldErrors::single("name", message))
            }
            error => error,
        })
    }
}
