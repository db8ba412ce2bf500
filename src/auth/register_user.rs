//! Registration endpoint for creating a user together with their profile.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use email_address::EmailAddress;
use rusqlite::{Connection, TransactionBehavior};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState, Error,
    auth::{PasswordHash, Username, ValidatedPassword, create_user, user::username_exists},
    db::lock_connection,
    error::DUPLICATE_USERNAME_MSG,
    profile::{MAX_NAME_LENGTH, ProfileUpdate, create_profile},
    validation::{BLANK_MSG, FieldErrors, JsonBody, REQUIRED_MSG, optional_text},
};

/// The state needed for registering a user.
#[derive(Debug, Clone)]
pub struct RegisterState {
    /// The bcrypt cost for hashing the new user's password.
    pub password_cost: u32,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegisterState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            password_cost: state.password_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw data sent by a client to register.
#[derive(Debug, Default, Deserialize)]
pub struct RegistrationData {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A registration request whose fields have passed validation.
struct NewUser {
    username: Username,
    password: ValidatedPassword,
    email: Option<EmailAddress>,
    profile: ProfileUpdate,
}

impl RegistrationData {
    /// Check every field, including whether the username is taken, and collect all problems.
    fn validate(&self, connection: &Connection) -> Result<NewUser, Error> {
        let mut errors = FieldErrors::new();

        let username = match self.username.as_deref().map(Username::new) {
            None => {
                errors.add("username", REQUIRED_MSG);
                None
            }
            Some(Ok(username)) if username_exists(&username, connection)? => {
                errors.add("username", DUPLICATE_USERNAME_MSG);
                None
            }
            Some(Ok(username)) => Some(username),
            Some(Err(error)) => {
                errors.add("username", error);
                None
            }
        };

        let email = match self.email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw_email) => match EmailAddress::from_str(raw_email) {
                Ok(email) => Some(email),
                Err(_) => {
                    errors.add("email", "Enter a valid email address.");
                    None
                }
            },
        };

        let first_name = optional_text(
            "first_name",
            self.first_name.as_deref(),
            MAX_NAME_LENGTH,
            &mut errors,
        );
        let last_name = optional_text(
            "last_name",
            self.last_name.as_deref(),
            MAX_NAME_LENGTH,
            &mut errors,
        );

        let password = match self.password.as_deref() {
            None => {
                errors.add("password", REQUIRED_MSG);
                None
            }
            Some("") => {
                errors.add("password", BLANK_MSG);
                None
            }
            Some(raw_password) => {
                let user_inputs: Vec<&str> = [
                    self.username.as_deref(),
                    self.email.as_deref(),
                    first_name.as_deref(),
                    last_name.as_deref(),
                ]
                .into_iter()
                .flatten()
                .collect();

                match ValidatedPassword::new(raw_password, &user_inputs) {
                    Ok(password) => Some(password),
                    Err(Error::TooWeak(feedback)) => {
                        errors.add("password", feedback);
                        None
                    }
                    Err(error) => {
                        errors.add("password", error);
                        None
                    }
                }
            }
        };

        match (username, password) {
            (Some(username), Some(password)) if errors.is_empty() => Ok(NewUser {
                profile: ProfileUpdate {
                    first_name,
                    last_name,
                    username: Some(username.to_string()),
                },
                username,
                password,
                email,
            }),
            _ => Err(Error::Validation(errors)),
        }
    }
}

/// Register a new user and create their profile.
///
/// The user and the profile are written in one SQL transaction, so a failure leaves neither
/// behind.
///
/// # Errors
///
/// Returns an [Error::Validation] listing every invalid field, including a username that is
/// already taken.
pub async fn register_user(
    State(state): State<RegisterState>,
    JsonBody(data): JsonBody<RegistrationData>,
) -> Result<(StatusCode, Json<Value>), Error> {
    let new_user = data.validate(&*lock_connection(&state.db_connection)?)?;

    // A concurrent registration of the same username fails the UNIQUE constraint below.
    let password_hash = PasswordHash::new(new_user.password, state.password_cost)?;

    let mut connection = lock_connection(&state.db_connection)?;
    let transaction = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let user = create_user(
        &new_user.username,
        new_user.email.as_ref(),
        &password_hash,
        &transaction,
    )?;
    create_profile(user.id, &new_user.profile, &transaction)?;

    transaction.commit()?;

    tracing::info!("Registered user {} with ID {}", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user_id": user.id,
        })),
    ))
}

#[cfg(test)]
mod register_user_tests {
    use axum::{extract::State, http::StatusCode, response::IntoResponse};
    use serde_json::json;

    use crate::{
        auth::get_user_by_username,
        profile::get_profile_by_user_id,
        test_utils::{
            TEST_PASSWORD_COST, assert_status, get_test_shared_connection, insert_test_user,
            parse_json_body,
        },
        validation::JsonBody,
    };

    use super::{RegisterState, RegistrationData, register_user};

    fn get_state() -> RegisterState {
        RegisterState {
            password_cost: TEST_PASSWORD_COST,
            db_connection: get_test_shared_connection(),
        }
    }

    fn registration(username: &str, password: &str) -> RegistrationData {
        RegistrationData {
            username: Some(username.to_owned()),
            password: Some(password.to_owned()),
            ..Default::default()
        }
    }

    fn count_rows(table: &str, state: &RegisterState) -> i64 {
        state
            .db_connection
            .lock()
            .unwrap()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .unwrap()
    }

    #[tokio::test]
    async fn register_creates_user_and_profile() {
        let state = get_state();
        let data = RegistrationData {
            first_name: Some("Alice".to_owned()),
            last_name: Some("Liddell".to_owned()),
            email: Some("alice@example.com".to_owned()),
            ..registration("alice", "averystrongandsecurepassword")
        };

        let response = register_user(State(state.clone()), JsonBody(data))
            .await
            .into_response();

        assert_status(&response, StatusCode::CREATED);
        let body = parse_json_body(response).await;
        let connection = state.db_connection.lock().unwrap();
        let user = get_user_by_username("alice", &connection).unwrap();
        assert_eq!(
            body,
            json!({ "message": "User registered successfully", "user_id": user.id.as_i64() })
        );
        assert_eq!(user.email.map(|email| email.to_string()).as_deref(), Some("alice@example.com"));
        assert!(user.password_hash.verify("averystrongandsecurepassword").unwrap());

        let profile = get_profile_by_user_id(user.id, &connection).unwrap();
        assert_eq!(profile.first_name.as_deref(), Some("Alice"));
        assert_eq!(profile.last_name.as_deref(), Some("Liddell"));
        assert_eq!(profile.username.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn register_fails_on_duplicate_username() {
        let state = get_state();
        insert_test_user(
            "alice",
            "averystrongandsecurepassword",
            &state.db_connection.lock().unwrap(),
        );

        let response = register_user(
            State(state.clone()),
            JsonBody(registration("alice", "anotherverystrongpassword")),
        )
        .await
        .into_response();

        assert_status(&response, StatusCode::BAD_REQUEST);
        assert_eq!(
            parse_json_body(response).await,
            json!({ "username": ["A user with that username already exists."] })
        );
        assert_eq!(count_rows("user", &state), 1);
        assert_eq!(count_rows("user_profile", &state), 1);
    }

    #[tokio::test]
    async fn register_reports_all_missing_fields() {
        let state = get_state();

        let response = register_user(State(state.clone()), JsonBody(RegistrationData::default()))
            .await
            .into_response();

        assert_status(&response, StatusCode::BAD_REQUEST);
        assert_eq!(
            parse_json_body(response).await,
            json!({
                "password": ["This field is required."],
                "username": ["This field is required."],
            })
        );
        assert_eq!(count_rows("user", &state), 0);
    }

    #[tokio::test]
    async fn register_reports_duplicate_username_with_other_errors() {
        let state = get_state();
        insert_test_user(
            "alice",
            "averystrongandsecurepassword",
            &state.db_connection.lock().unwrap(),
        );

        let response = register_user(State(state), JsonBody(registration("alice", "")))
            .await
            .into_response();

        assert_status(&response, StatusCode::BAD_REQUEST);
        assert_eq!(
            parse_json_body(response).await,
            json!({
                "password": ["This field may not be blank."],
                "username": ["A user with that username already exists."],
            })
        );
    }

    #[tokio::test]
    async fn register_fails_on_weak_password() {
        let state = get_state();

        let response = register_user(State(state.clone()), JsonBody(registration("alice", "password")))
            .await
            .into_response();

        assert_status(&response, StatusCode::BAD_REQUEST);
        let body = parse_json_body(response).await;
        assert!(body["password"].is_array(), "want password error, got {body}");
        assert_eq!(count_rows("user", &state), 0);
    }

    #[tokio::test]
    async fn register_fails_on_invalid_email_and_username() {
        let state = get_state();
        let data = RegistrationData {
            email: Some("not an email".to_owned()),
            ..registration("alice smith", "averystrongandsecurepassword")
        };

        let response = register_user(State(state), JsonBody(data))
            .await
            .into_response();

        assert_status(&response, StatusCode::BAD_REQUEST);
        let body = parse_json_body(response).await;
        assert_eq!(body["email"], json!(["Enter a valid email address."]));
        assert!(body["username"].is_array(), "want username error, got {body}");
    }

    #[tokio::test]
    async fn failed_profile_insert_leaves_no_user() {
        let state = get_state();
        state
            .db_connection
            .lock()
            .unwrap()
            .execute("DROP TABLE user_profile", ())
            .unwrap();

        let response = register_user(
            State(state.clone()),
            JsonBody(registration("alice", "averystrongandsecurepassword")),
        )
        .await
        .into_response();

        assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(count_rows("user", &state), 0);
    }
}
