//! Database operations for user profiles.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    auth::UserID,
    profile::{ProfileUpdate, UserProfile},
};

/// Create the user profile table.
///
/// Must be called after the user table exists.
pub fn create_profile_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_profile (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL UNIQUE,
            first_name TEXT,
            last_name TEXT,
            username TEXT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Create the profile for the user with `user_id`.
///
/// # Errors
///
/// Returns an [Error::InvalidForeignKey] if the user does not exist, or an [Error::SqlError] if the
/// user already has a profile or another SQL error occurred.
pub fn create_profile(
    user_id: UserID,
    profile: &ProfileUpdate,
    connection: &Connection,
) -> Result<UserProfile, Error> {
    connection.execute(
        "INSERT INTO user_profile (user_id, first_name, last_name, username)
        VALUES (?1, ?2, ?3, ?4)",
        (
            user_id.as_i64(),
            &profile.first_name,
            &profile.last_name,
            &profile.username,
        ),
    )?;

    Ok(UserProfile {
        user_id,
        first_name: profile.first_name.clone(),
        last_name: profile.last_name.clone(),
        username: profile.username.clone(),
    })
}

/// Retrieve the profile of the user with `user_id`.
///
/// # Errors
///
/// Returns an [Error::ProfileNotFound] if the user has no profile.
pub fn get_profile_by_user_id(user_id: UserID, connection: &Connection) -> Result<UserProfile, Error> {
    connection
        .prepare(
            "SELECT user_id, first_name, last_name, username
            FROM user_profile WHERE user_id = :user_id",
        )?
        .query_row(&[(":user_id", &user_id.as_i64())], map_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::ProfileNotFound,
            error => error.into(),
        })
}

/// Overwrite the profile fields that are `Some` in `update`, keeping the rest.
///
/// # Errors
///
/// Returns an [Error::ProfileNotFound] if the user has no profile.
pub fn update_profile(
    user_id: UserID,
    update: &ProfileUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user_profile SET
            first_name = COALESCE(?1, first_name),
            last_name = COALESCE(?2, last_name),
            username = COALESCE(?3, username)
        WHERE user_id = ?4",
        (
            &update.first_name,
            &update.last_name,
            &update.username,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::ProfileNotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<UserProfile, rusqlite::Error> {
    Ok(UserProfile {
        user_id: UserID::new(row.get(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        username: row.get(3)?,
    })
}
