//! Core expense domain types.

use std::fmt::Display;

use rusqlite::Connection;
use serde::{Deserialize, Serialize, Serializer};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::{UserID, user_exists},
    category::{CategoryId, category_exists},
    validation::{FieldErrors, NumberOrText, REQUIRED_MSG, require_id},
};

/// The maximum number of digits in an amount.
pub const MAX_AMOUNT_DIGITS: usize = 10;
/// The maximum number of digits after the decimal point in an amount.
pub const MAX_AMOUNT_DECIMAL_PLACES: usize = 2;

/// A sum of money stored as a whole number of cents.
///
/// Serializes as a decimal string with two decimal places, e.g. `"10.50"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Parse a decimal amount such as `"10.5"` or `"-3"`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidAmount] if `text` is not a decimal number, has more than
    /// [MAX_AMOUNT_DIGITS] digits or more than [MAX_AMOUNT_DECIMAL_PLACES] decimal places.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let text = text.trim();
        let (is_negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        let is_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());

        if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction)
        {
            return Err(Error::InvalidAmount("A valid number is required."));
        }

        let whole = whole.trim_start_matches('0');
        let max_whole_digits = MAX_AMOUNT_DIGITS - MAX_AMOUNT_DECIMAL_PLACES;

        if whole.len() + fraction.len() > MAX_AMOUNT_DIGITS {
            return Err(Error::InvalidAmount(
                "Ensure that there are no more than 10 digits in total.",
            ));
        }

        if fraction.len() > MAX_AMOUNT_DECIMAL_PLACES {
            return Err(Error::InvalidAmount(
                "Ensure that there are no more than 2 decimal places.",
            ));
        }

        if whole.len() > max_whole_digits {
            return Err(Error::InvalidAmount(
                "Ensure that there are no more than 8 digits before the decimal point.",
            ));
        }

        // At most 8 whole digits and 2 fraction digits, so neither parse can overflow.
        let whole_cents = if whole.is_empty() {
            0
        } else {
            whole
                .parse::<i64>()
                .map_err(|_| Error::InvalidAmount("A valid number is required."))?
                * 100
        };
        let fraction_cents = format!("{fraction:0<2}")
            .parse::<i64>()
            .map_err(|_| Error::InvalidAmount("A valid number is required."))?;

        let cents = whole_cents + fraction_cents;

        Ok(Self(if is_negative { -cents } else { cents }))
    }

    /// Create an amount from a whole number of cents.
    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount as a whole number of cents.
    pub fn cents(&self) -> i64 {
        self.0
    }

    /// The amount in dollars as a floating point number.
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl TryFrom<&NumberOrText> for Amount {
    type Error = Error;

    fn try_from(value: &NumberOrText) -> Result<Self, Self::Error> {
        match value {
            NumberOrText::Integer(integer) => Self::parse(&integer.to_string()),
            NumberOrText::Float(float) if float.is_finite() => Self::parse(&float.to_string()),
            NumberOrText::Float(_) => Err(Error::InvalidAmount("A valid number is required.")),
            NumberOrText::Text(text) => Self::parse(text),
        }
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();

        write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// A single amount of money spent by a user in a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub amount: Amount,
    /// The ID of the category the expense belongs to.
    pub category: CategoryId,
    /// The ID of the user that spent the money.
    pub user: UserID,
    /// When the expense was recorded, in UTC.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The validated fields of an expense that is about to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub amount: Amount,
    pub category_id: CategoryId,
    pub user_id: UserID,
}

/// Request body for creating and replacing an expense.
///
/// IDs and the amount may be sent as JSON numbers or strings.
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseData {
    pub amount: Option<NumberOrText>,
    pub category: Option<NumberOrText>,
    pub user: Option<NumberOrText>,
}

impl ExpenseData {
    /// Check every field, including that the category and user exist.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] holding every problem found, or an SQL error if the
    /// existence checks failed.
    pub fn validate(&self, connection: &Connection) -> Result<NewExpense, Error> {
        let mut errors = FieldErrors::new();

        let amount = match self.amount.as_ref().map(Amount::try_from) {
            None => {
                errors.add("amount", REQUIRED_MSG);
                None
            }
            Some(Ok(amount)) => Some(amount),
            Some(Err(Error::InvalidAmount(message))) => {
                errors.add("amount", message);
                None
            }
            Some(Err(error)) => return Err(error),
        };

        let category_id = require_id("category", self.category.as_ref(), &mut errors);
        let category_id = match category_id {
            Some(id) if !category_exists(id, connection)? => {
                errors.add("category", missing_object_message(id));
                None
            }
            id => id,
        };

        let user_id = require_id("user", self.user.as_ref(), &mut errors);
        let user_id = match user_id {
            Some(id) if !user_exists(id, connection)? => {
                errors.add("user", missing_object_message(id));
                None
            }
            id => id,
        };

        match (amount, category_id, user_id) {
            (Some(amount), Some(category_id), Some(user_id)) if errors.is_empty() => {
                Ok(NewExpense {
                    amount,
                    category_id,
                    user_id: UserID::new(user_id),
                })
            }
            _ => Err(Error::Validation(errors)),
        }
    }
}

fn missing_object_message(id: i64) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}
