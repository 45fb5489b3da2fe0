//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        auth_guard, auth_guard_hx, get_log_in_page, get_register_page, post_log_in, post_log_out,
        register_user,
    },
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    subscription::{
        create_subscription_endpoint, delete_subscription_endpoint, get_create_subscription_page,
        get_delete_subscription_page, get_edit_subscription_page, get_subscriptions_page,
        update_subscription_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(
            endpoints::LOG_IN,
            get(get_log_in_page).post(post_log_in),
        )
        .route(endpoints::LOG_OUT, post(post_log_out))
        .route(
            endpoints::REGISTER,
            get(get_register_page).post(register_user),
        )
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::SUBSCRIPTIONS_VIEW, get(get_subscriptions_page))
        .route(
            endpoints::CREATE_SUBSCRIPTION,
            get(get_create_subscription_page),
        )
        .route(
            endpoints::EDIT_SUBSCRIPTION,
            get(get_edit_subscription_page),
        )
        .route(
            endpoints::DELETE_SUBSCRIPTION,
            get(get_delete_subscription_page),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST routes need to use the HX-REDIRECT header for auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(
                endpoints::CREATE_SUBSCRIPTION,
                post(create_subscription_endpoint),
            )
            .route(
                endpoints::EDIT_SUBSCRIPTION,
                post(update_subscription_endpoint),
            )
            .route(
                endpoints::DELETE_SUBSCRIPTION,
                post(delete_subscription_endpoint),
            )
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the subscriptions page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::SUBSCRIPTIONS_VIEW)
}
