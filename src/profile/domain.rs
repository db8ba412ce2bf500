//! Core profile domain types.

use serde::{Deserialize, Serialize};

use crate::auth::UserID;

/// The maximum number of characters in each profile name field.
pub const MAX_NAME_LENGTH: usize = 150;

/// The personal details attached to a user.
///
/// `username` is a copy taken at registration. The `user` table holds the name used for logging
/// in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user the profile belongs to.
    #[serde(rename = "user")]
    pub user_id: UserID,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

/// Values for creating or updating a profile.
///
/// On update, `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}
