//! Category creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, CategoryData, create_category},
    db::lock_connection,
    validation::JsonBody,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Create a category from the JSON body `{"name": ...}`.
///
/// Categories are global, so any client may create one.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    JsonBody(data): JsonBody<CategoryData>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let name = data.validate()?;
    let connection = lock_connection(&state.db_connection)?;

    let category = create_category(name, &connection)?;
    tracing::debug!("Created category {} ({})", category.name, category.id);

    Ok((StatusCode::CREATED, Json(category)))
}
