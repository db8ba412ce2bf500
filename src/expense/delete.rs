//! Expense deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::lock_connection,
    expense::{ExpenseId, delete_expense},
    validation::{IdPath, QueryParams, UserIdQuery, require_user_id},
};

/// The state needed for deleting an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete an expense of the user named by the `user_id` query parameter.
pub async fn delete_expense_endpoint(
    State(state): State<DeleteExpenseState>,
    IdPath(expense_id): IdPath<ExpenseId>,
    QueryParams(query): QueryParams<UserIdQuery>,
) -> Result<StatusCode, Error> {
    let user_id = require_user_id(&query)?;
    let connection = lock_connection(&state.db_connection)?;
    delete_expense(expense_id, user_id, &connection)?;
    tracing::debug!("Deleted expense {expense_id} of user {user_id}");

    Ok(StatusCode::NO_CONTENT)
}
