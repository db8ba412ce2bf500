//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/categories/{category_id}/', tests use
//! `format_endpoint` to fill in the ID.

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for registering a new user.
pub const REGISTER: &str = "/api/register/";
/// The route for logging in a user.
pub const LOG_IN: &str = "/api/login/";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/logout/";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories/";
/// The route to get, update and delete a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}/";
/// The route to list and create expenses.
pub const EXPENSES: &str = "/api/expenses/";
/// The route to get, update and delete a single expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}/";
/// The route for the logged in user's spending summary.
pub const ANALYTICS: &str = "/api/analytics/";
/// The route to get a user's profile.
pub const PROFILE: &str = "/api/profile/";
/// The route to update a user's profile.
pub const PROFILE_UPDATE: &str = "/api/profile_update/";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/expenses/{expense_id}/', '{expense_id}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
