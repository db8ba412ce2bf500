//! Endpoints for fetching and replacing a single expense.
//!
//! The expense is looked up among the expenses of the user named by the `user_id` query
//! parameter.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::lock_connection,
    expense::{Expense, ExpenseData, ExpenseId, get_expense, update_expense},
    validation::{IdPath, JsonBody, QueryParams, UserIdQuery, require_user_id},
};

/// The state needed for the expense detail endpoints.
#[derive(Debug, Clone)]
pub struct EditExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Return a single expense of the user in the query.
pub async fn get_expense_endpoint(
    State(state): State<EditExpenseState>,
    IdPath(expense_id): IdPath<ExpenseId>,
    QueryParams(query): QueryParams<UserIdQuery>,
) -> Result<Json<Expense>, Error> {
    let user_id = require_user_id(&query)?;
    let connection = lock_connection(&state.db_connection)?;

    get_expense(expense_id, user_id, &connection).map(Json)
}

/// Replace every field of an expense of the user in the query.
pub async fn update_expense_endpoint(
    State(state): State<EditExpenseState>,
    IdPath(expense_id): IdPath<ExpenseId>,
    QueryParams(query): QueryParams<UserIdQuery>,
    JsonBody(data): JsonBody<ExpenseData>,
) -> Result<Json<Expense>, Error> {
    let user_id = require_user_id(&query)?;
    let connection = lock_connection(&state.db_connection)?;
    get_expense(expense_id, user_id, &connection)?;

    let new_expense = data.validate(&connection)?;

    update_expense(expense_id, user_id, &new_expense, &connection).map(Json)
}
