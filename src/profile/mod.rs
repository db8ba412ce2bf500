//! User profiles: the personal details kept alongside each user.

mod db;
mod domain;
mod get;
mod update;

pub use db::{create_profile, create_profile_table, get_profile_by_user_id, update_profile};
pub use domain::{MAX_NAME_LENGTH, ProfileUpdate, UserProfile};
pub use get::get_profile_endpoint;
pub use update::update_profile_endpoint;
