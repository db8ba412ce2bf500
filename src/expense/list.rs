//! Expense listing endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::lock_connection,
    expense::{Expense, get_expenses_by_user},
    validation::{QueryParams, UserIdQuery, require_user_id},
};

/// The state needed for listing expenses.
#[derive(Debug, Clone)]
pub struct ListExpensesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListExpensesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the expenses of the user named by the `user_id` query parameter.
///
/// A user without expenses gets an empty list.
pub async fn list_expenses_endpoint(
    State(state): State<ListExpensesState>,
    QueryParams(query): QueryParams<UserIdQuery>,
) -> Result<Json<Vec<Expense>>, Error> {
    let user_id = require_user_id(&query)?;
    let connection = lock_connection(&state.db_connection)?;

    get_expenses_by_user(user_id, &connection).map(Json)
}
