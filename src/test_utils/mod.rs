#![allow(missing_docs)]

pub(crate) mod http;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    AppState, PasswordHash, User, Username,
    auth::create_user,
    db::initialize,
    profile::{ProfileUpdate, create_profile},
};

pub(crate) use http::{assert_status, get_header, parse_json_body};

/// The bcrypt cost used in tests, the lowest the library accepts.
pub(crate) const TEST_PASSWORD_COST: u32 = 4;

#[track_caller]
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");

    connection
}

pub(crate) fn get_test_shared_connection() -> Arc<Mutex<Connection>> {
    Arc::new(Mutex::new(get_test_connection()))
}

#[track_caller]
pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");

    AppState::new(connection, "42")
        .expect("Could not create app state")
        .with_password_cost(TEST_PASSWORD_COST)
}

/// Insert a user with a profile that copies the username.
#[track_caller]
pub(crate) fn insert_test_user(username: &str, password: &str, connection: &Connection) -> User {
    let username = Username::new(username).expect("Invalid test username");
    let password_hash = PasswordHash::from_raw_password(password, TEST_PASSWORD_COST)
        .expect("Could not hash test password");
    let user = create_user(&username, None, &password_hash, connection)
        .expect("Could not create test user");
    let profile = ProfileUpdate {
        first_name: None,
        last_name: None,
        username: Some(username.to_string()),
    };
    create_profile(user.id, &profile, connection).expect("Could not create test profile");

    user
}
