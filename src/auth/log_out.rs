//! Log-out endpoint.

use axum::Json;
use axum_extra::extract::PrivateCookieJar;
use serde_json::{Value, json};

use crate::auth::invalidate_auth_cookie;

/// Invalidate the auth cookie.
///
/// Succeeds whether or not the client was logged in.
pub async fn post_log_out(jar: PrivateCookieJar) -> (PrivateCookieJar, Json<Value>) {
    (
        invalidate_auth_cookie(jar),
        Json(json!({ "message": "Logout successful" })),
    )
}
