//! This file defines the endpoint for handling log-in requests.
//! The auth module handles the lower level authentication and cookie auth logic.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::{Value, json};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{PasswordHash, User, get_user_by_username, set_auth_cookie},
    db::lock_connection,
    profile::get_profile_by_user_id,
    validation::{BLANK_MSG, FieldErrors, JsonBody, REQUIRED_MSG, require_text},
};

/// A bcrypt hash checked against when the username is unknown, so that an unknown username takes
/// as long to reject as a wrong password.
const DUMMY_PASSWORD_HASH: &str = "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm";

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LoginState> for Key {
    fn from_ref(state: &LoginState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw credentials sent by the client.
///
/// The password is kept as a plain string. There is no need for validation here since
/// it will be compared against the password hash in the database.
#[derive(Clone, Default, Deserialize)]
pub struct LogInData {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LogInData {
    fn validate(&self) -> Result<(String, &str), Error> {
        let mut errors = FieldErrors::new();

        let username = require_text("username", self.username.as_deref(), usize::MAX, &mut errors);
        let password = match self.password.as_deref() {
            Some(password) if !password.is_empty() => Some(password),
            Some(_) => {
                errors.add("password", BLANK_MSG);
                None
            }
            None => {
                errors.add("password", REQUIRED_MSG);
                None
            }
        };

        match (username, password) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(Error::Validation(errors)),
        }
    }
}

/// Handler for log-in requests via the POST method.
///
/// On a successful log-in request, the auth cookie is set and the user's profile details are
/// returned.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - A field is missing.
/// - The username does not exist or the password is not correct. Both give the same error.
/// - The user has no profile.
/// - An internal error occurred when verifying the password.
pub async fn post_log_in(
    State(state): State<LoginState>,
    jar: PrivateCookieJar,
    JsonBody(user_data): JsonBody<LogInData>,
) -> Result<(PrivateCookieJar, Json<Value>), Error> {
    let (username, password) = user_data.validate()?;

    let user = match get_user_by_username(&username, &*lock_connection(&state.db_connection)?) {
        Ok(user) => Some(user),
        Err(Error::NotFound) => None,
        Err(error) => return Err(error),
    };

    let user = match user {
        Some(user) => verify_password(user, password)?,
        None => {
            // Keep the response time the same as for a wrong password.
            let _ = PasswordHash::new_unchecked(DUMMY_PASSWORD_HASH).verify(password);
            tracing::warn!("Log-in attempt for unknown user {username}");
            return Err(Error::InvalidCredentials);
        }
    };

    let profile = match get_profile_by_user_id(user.id, &*lock_connection(&state.db_connection)?)
    {
        Ok(profile) => profile,
        Err(Error::ProfileNotFound) => return Err(Error::MissingProfile(user.id)),
        Err(error) => return Err(error),
    };

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;
    tracing::info!("User {} logged in", user.id);

    Ok((
        jar,
        Json(json!({
            "user_id": user.id,
            "username": user.username,
            "first_name": profile.first_name,
            "last_name": profile.last_name,
            "message": "Login successful",
        })),
    ))
}

fn verify_password(user: User, password: &str) -> Result<User, Error> {
    match user.password_hash.verify(password) {
        Ok(true) => Ok(user),
        Ok(false) => {
            tracing::warn!("Wrong password for user {}", user.id);
            Err(Error::InvalidCredentials)
        }
        Err(error) => Err(Error::HashingError(error.to_string())),
    }
}
