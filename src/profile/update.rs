//! Profile update endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::UserID,
    db::lock_connection,
    profile::{MAX_NAME_LENGTH, ProfileUpdate, update_profile},
    validation::{FieldErrors, JsonBody, NumberOrText, optional_text, require_id},
};

/// The state needed for updating a profile.
#[derive(Debug, Clone)]
pub struct UpdateProfileState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw request body for a profile update.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdateData {
    pub user_id: Option<NumberOrText>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

impl ProfileUpdateData {
    fn validate(&self) -> Result<(UserID, ProfileUpdate), Error> {
        let mut errors = FieldErrors::new();

        let user_id = require_id("user_id", self.user_id.as_ref(), &mut errors);
        let update = ProfileUpdate {
            first_name: optional_text(
                "first_name",
                self.first_name.as_deref(),
                MAX_NAME_LENGTH,
                &mut errors,
            ),
            last_name: optional_text(
                "last_name",
                self.last_name.as_deref(),
                MAX_NAME_LENGTH,
                &mut errors,
            ),
            username: optional_text(
                "username",
                self.username.as_deref(),
                MAX_NAME_LENGTH,
                &mut errors,
            ),
        };

        match user_id {
            Some(user_id) if errors.is_empty() => Ok((UserID::new(user_id), update)),
            _ => Err(Error::Validation(errors)),
        }
    }
}

/// Overwrite the supplied profile fields of the user named by `user_id` in the body.
///
/// Omitted and null fields keep their stored values. The caller's session is not checked.
pub async fn update_profile_endpoint(
    State(state): State<UpdateProfileState>,
    JsonBody(data): JsonBody<ProfileUpdateData>,
) -> Result<Json<Value>, Error> {
    let (user_id, update) = data.validate()?;
    let connection = lock_connection(&state.db_connection)?;

    update_profile(user_id, &update, &connection)?;
    tracing::info!("Updated profile for user {user_id}");

    Ok(Json(json!({ "message": "Profile updated successfully" })))
}

#[cfg(test)]
mod update_profile_endpoint_tests {
    use axum::{extract::State, http::StatusCode, response::IntoResponse};
    use serde_json::json;

    use crate::{
        profile::get_profile_by_user_id,
        test_utils::{
            assert_status, get_test_shared_connection, insert_test_user, parse_json_body,
        },
        validation::{JsonBody, NumberOrText},
    };

    use super::{ProfileUpdateData, UpdateProfileState, update_profile_endpoint};

    fn get_state() -> UpdateProfileState {
        UpdateProfileState {
            db_connection: get_test_shared_connection(),
        }
    }

    #[tokio::test]
    async fn updates_only_supplied_fields() {
        let state = get_state();
        let user = insert_test_user(
            "alice",
            "averystrongandsecurepassword",
            &state.db_connection.lock().unwrap(),
        );
        let data = ProfileUpdateData {
            user_id: Some(NumberOrText::Integer(user.id.as_i64())),
            first_name: Some("Alice".to_owned()),
            ..Default::default()
        };

        let response = update_profile_endpoint(State(state.clone()), JsonBody(data))
            .await
            .into_response();

        assert_status(&response, StatusCode::OK);
        assert_eq!(
            parse_json_body(response).await,
            json!({ "message": "Profile updated successfully" })
        );
        let profile = get_profile_by_user_id(user.id, &state.db_connection.lock().unwrap())
            .unwrap();
        assert_eq!(profile.first_name.as_deref(), Some("Alice"));
        assert_eq!(profile.last_name, None);
        assert_eq!(profile.username.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn accepts_user_id_as_string() {
        let state = get_state();
        let user = insert_test_user(
            "alice",
            "averystrongandsecurepassword",
            &state.db_connection.lock().unwrap(),
        );
        let data = ProfileUpdateData {
            user_id: Some(NumberOrText::Text(user.id.to_string())),
            last_name: Some("Liddell".to_owned()),
            ..Default::default()
        };

        let response = update_profile_endpoint(State(state), JsonBody(data))
            .await
            .into_response();

        assert_status(&response, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_user_id_is_bad_request() {
        let data = ProfileUpdateData {
            first_name: Some("Alice".to_owned()),
            ..Default::default()
        };

        let response = update_profile_endpoint(State(get_state()), JsonBody(data))
            .await
            .into_response();

        assert_status(&response, StatusCode::BAD_REQUEST);
        assert_eq!(
            parse_json_body(response).await,
            json!({ "user_id": ["This field is required."] })
        );
    }

    #[tokio::test]
    async fn unknown_profile_is_not_found() {
        let data = ProfileUpdateData {
            user_id: Some(NumberOrText::Integer(99)),
            ..Default::default()
        };

        let response = update_profile_endpoint(State(get_state()), JsonBody(data))
            .await
            .into_response();

        assert_status(&response, StatusCode::NOT_FOUND);
        assert_eq!(
            parse_json_body(response).await,
            json!({ "message": "Profile not found" })
        );
    }
}
