//! Endpoints for fetching and renaming a single category.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, CategoryData, CategoryId, get_category, update_category},
    db::lock_connection,
    validation::{IdPath, JsonBody},
};

/// The state needed for the category detail endpoints.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Return the category with the ID in the path.
pub async fn get_category_endpoint(
    State(state): State<EditCategoryState>,
    IdPath(category_id): IdPath<CategoryId>,
) -> Result<Json<Category>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_category(category_id, &connection).map(Json)
}

/// Rename the category with the ID in the path.
pub async fn update_category_endpoint(
    State(state): State<EditCategoryState>,
    IdPath(category_id): IdPath<CategoryId>,
    JsonBody(data): JsonBody<CategoryData>,
) -> Result<Json<Category>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    // Check existence first so that a missing category is a 404 even when the body is invalid.
    get_category(category_id, &connection)?;

    let name = data.validate()?;

    update_category(category_id, name, &connection).map(Json)
}
