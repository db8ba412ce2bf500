//! Spending summary for the logged-in user.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Serialize, Serializer};

use crate::{
    AppState, Error,
    analytics::{CategoryTotal, get_category_totals, get_total_expense},
    auth::UserID,
    db::lock_connection,
    expense::Amount,
    listing::Listing,
};

/// The marker sent in place of an empty category breakdown.
pub const NO_EXPENSES_MSG: &str = "No expenses found";

/// The state needed for the analytics endpoint.
#[derive(Debug, Clone)]
pub struct AnalyticsState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AnalyticsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The response body of the analytics endpoint.
#[derive(Debug, Serialize)]
pub struct Analytics {
    /// The sum of all of the user's expenses.
    ///
    /// Sent as a number of dollars, or the integer `0` when there is nothing to sum.
    #[serde(serialize_with = "serialize_total")]
    pub total_expense: Amount,
    /// Per-category sums, or [NO_EXPENSES_MSG].
    pub category_expenses: Listing<CategoryTotal>,
}

/// Summarise the spending of the user whose session cookie was sent.
///
/// Must be routed behind [crate::auth::auth_guard], which provides the user ID.
pub async fn get_analytics(
    State(state): State<AnalyticsState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Analytics>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    let total_expense = get_total_expense(user_id, &connection)?;
    let category_totals = get_category_totals(user_id, &connection)?;

    Ok(Json(Analytics {
        total_expense,
        category_expenses: Listing::new(category_totals, NO_EXPENSES_MSG),
    }))
}

fn serialize_total<S: Serializer>(total: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
    if total.cents() == 0 {
        serializer.serialize_i64(0)
    } else {
        serializer.serialize_f64(total.as_f64())
    }
}
