//! Category deletion endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{CategoryId, delete_category},
    db::lock_connection,
    validation::IdPath,
};

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Delete a category and, through the foreign key cascade, every expense in it.
pub async fn delete_category_endpoint(
    State(state): State<DeleteCategoryState>,
    IdPath(category_id): IdPath<CategoryId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;
    delete_category(category_id, &connection)?;
    tracing::debug!("Deleted category {category_id}");

    Ok(StatusCode::NO_CONTENT)
}
