//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/Subscriptions/Edit/{subscription_id}', use [format_endpoint].

/// The root route which redirects to the subscriptions or log in page.
pub const ROOT: &str = "/";
/// The page listing a user's subscriptions.
pub const SUBSCRIPTIONS_VIEW: &str = "/Subscriptions";
/// The page and form handler for creating a subscription.
pub const CREATE_SUBSCRIPTION: &str = "/Subscriptions/Create";
/// The page and form handler for editing a subscription.
pub const EDIT_SUBSCRIPTION: &str = "/Subscriptions/Edit/{subscription_id}";
/// The confirmation page and form handler for deleting a subscription.
pub const DELETE_SUBSCRIPTION: &str = "/Subscriptions/Delete/{subscription_id}";
/// The page and form handler for registering a new account.
pub const REGISTER: &str = "/Account/Register";
/// The page and form handler for logging in.
pub const LOG_IN: &str = "/Account/Login";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/Account/Logout";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/Subscriptions/Edit/{subscription_id}',
/// '{subscription_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
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
