//! Profile lookup endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::lock_connection,
    profile::{UserProfile, get_profile_by_user_id},
    validation::{QueryParams, UserIdQuery, require_user_id},
};

/// The state needed for fetching a profile.
#[derive(Debug, Clone)]
pub struct GetProfileState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GetProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Return the profile of the user named by the `user_id` query parameter.
///
/// Any client may read any profile. The caller's session is not checked.
pub async fn get_profile_endpoint(
    State(state): State<GetProfileState>,
    QueryParams(query): QueryParams<UserIdQuery>,
) -> Result<Json<UserProfile>, Error> {
    let user_id = require_user_id(&query)?;
    let connection = lock_connection(&state.db_connection)?;

    get_profile_by_user_id(user_id, &connection).map(Json)
}

#[cfg(test)]
mod get_profile_endpoint_tests {
    use axum::{
        extract::State,
        http::StatusCode,
        response::IntoResponse,
    };
    use serde_json::json;

    use crate::{
        test_utils::{
            assert_status, get_test_shared_connection, insert_test_user, parse_json_body,
        },
        validation::{QueryParams, UserIdQuery},
    };

    use super::{GetProfileState, get_profile_endpoint};

    fn get_state() -> GetProfileState {
        GetProfileState {
            db_connection: get_test_shared_connection(),
        }
    }

    fn query(user_id: Option<&str>) -> QueryParams<UserIdQuery> {
        QueryParams(UserIdQuery {
            user_id: user_id.map(str::to_owned),
        })
    }

    #[tokio::test]
    async fn returns_profile() {
        let state = get_state();
        let user = insert_test_user(
            "alice",
            "averystrongandsecurepassword",
            &state.db_connection.lock().unwrap(),
        );

        let response = get_profile_endpoint(State(state), query(Some(&user.id.to_string())))
            .await
            .into_response();

        assert_status(&response, StatusCode::OK);
        assert_eq!(
            parse_json_body(response).await,
            json!({
                "user": user.id.as_i64(),
                "first_name": null,
                "last_name": null,
                "username": "alice",
            })
        );
    }

    #[tokio::test]
    async fn missing_user_id_is_bad_request() {
        let response = get_profile_endpoint(State(get_state()), query(None))
            .await
            .into_response();

        assert_status(&response, StatusCode::BAD_REQUEST);
        assert_eq!(
            parse_json_body(response).await,
            json!({ "user_id": ["This field is required."] })
        );
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let response = get_profile_endpoint(State(get_state()), query(Some("99")))
            .await
            .into_response();

        assert_status(&response, StatusCode::NOT_FOUND);
        assert_eq!(
            parse_json_body(response).await,
            json!({ "message": "Profile not found" })
        );
    }
}
