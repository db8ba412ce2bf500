//! Expense creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::lock_connection,
    expense::{Expense, ExpenseData, create_expense},
    validation::JsonBody,
};

/// The state needed for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Record an expense for the user named in the body.
///
/// The caller's session is not checked against `user`.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    JsonBody(data): JsonBody<ExpenseData>,
) -> Result<(StatusCode, Json<Expense>), Error> {
    let connection = lock_connection(&state.db_connection)?;
    let new_expense = data.validate(&connection)?;

    let expense = create_expense(&new_expense, &connection)?;
    tracing::debug!("Created expense {} for user {}", expense.id, expense.user);

    Ok((StatusCode::CREATED, Json(expense)))
}

#[cfg(test)]
mod create_expense_endpoint_tests {
    use axum::{extract::State, http::StatusCode, response::IntoResponse};
    use serde_json::json;

    use crate::{
        category::{CategoryName, create_category},
        expense::ExpenseData,
        test_utils::{
            assert_status, get_test_shared_connection, insert_test_user, parse_json_body,
        },
        validation::{JsonBody, NumberOrText},
    };

    use super::{CreateExpenseState, create_expense_endpoint};

    #[tokio::test]
    async fn can_create_expense() {
        let state = CreateExpenseState {
            db_connection: get_test_shared_connection(),
        };
        let (user_id, category_id) = {
            let connection = state.db_connection.lock().unwrap();
            let user = insert_test_user("alice", "averystrongandsecurepassword", &connection);
            let category =
                create_category(CategoryName::new_unchecked("Food"), &connection).unwrap();
            (user.id.as_i64(), category.id)
        };
        let data = ExpenseData {
            amount: Some(NumberOrText::Text("10.5".to_owned())),
            category: Some(NumberOrText::Integer(category_id)),
            user: Some(NumberOrText::Integer(user_id)),
        };

        let response = create_expense_endpoint(State(state), JsonBody(data))
            .await
            .into_response();

        assert_status(&response, StatusCode::CREATED);
        let json = parse_json_body(response).await;
        assert_eq!(json["amount"], "10.50");
        assert_eq!(json["category"], category_id);
        assert_eq!(json["user"], user_id);
        assert!(json["id"].is_i64());
        assert!(json["created_at"].is_string());
    }

    #[tokio::test]
    async fn rejects_unknown_references() {
        let state = CreateExpenseState {
            db_connection: get_test_shared_connection(),
        };
        let data = ExpenseData {
            amount: Some(NumberOrText::Float(3.5)),
            category: Some(NumberOrText::Integer(1)),
            user: Some(NumberOrText::Integer(2)),
        };

        let response = create_expense_endpoint(State(state), JsonBody(data))
            .await
            .into_response();

        assert_status(&response, StatusCode::BAD_REQUEST);
        assert_eq!(
            parse_json_body(response).await,
            json!({
                "category": ["Invalid pk \"1\" - object does not exist."],
                "user": ["Invalid pk \"2\" - object does not exist."],
            })
        );
    }

    #[tokio::test]
    async fn rejects_invalid_amount() {
        let state = CreateExpenseState {
            db_connection: get_test_shared_connection(),
        };
        let data = ExpenseData {
            amount: Some(NumberOrText::Text("ten".to_owned())),
            ..Default::default()
        };

        let response = create_expense_endpoint(State(state), JsonBody(data))
            .await
            .into_response();

        assert_status(&response, StatusCode::BAD_REQUEST);
        assert_eq!(
            parse_json_body(response).await,
            json!({
                "amount": ["A valid number is required."],
                "category": ["This field is required."],
                "user": ["This field is required."],
            })
        );
    }
}
