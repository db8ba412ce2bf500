//! Category listing endpoint.

use std::sync::{Arc, Mutex};

use axum::extract::{FromRef, State};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, get_all_categories},
    db::lock_connection,
    listing::Listing,
};

/// The message sent instead of an empty category list.
pub const NO_CATEGORIES_MSG: &str = "No Data Found";

/// The state needed for listing categories.
#[derive(Debug, Clone)]
pub struct ListCategoriesState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListCategoriesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List every category ordered by name.
///
/// Responds with 404 and [NO_CATEGORIES_MSG] when there are no categories.
pub async fn list_categories_endpoint(
    State(state): State<ListCategoriesState>,
) -> Result<Listing<Category>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let categories = get_all_categories(&connection)?;

    Ok(Listing::new(categories, NO_CATEGORIES_MSG))
}
