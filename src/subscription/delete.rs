//! Subscription deletion page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    endpoints::{self, format_endpoint},
    html::{BUTTON_DELETE_STYLE, FORM_CONTAINER_STYLE, base, format_currency, link},
    navigation::NavBar,
    subscription::{Subscription, SubscriptionId, delete_subscription, get_owned_subscription},
};

/// The state needed for the delete subscription page and its form handler.
#[derive(Debug, Clone)]
pub struct DeleteSubscriptionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteSubscriptionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn delete_confirmation_view(endpoint: &str, subscription: &Subscription) -> Markup {
    let nav_bar = NavBar::new(endpoint).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Delete Subscription" }

            p class="mb-4" { "Are you sure you want to delete this subscription?" }

            dl class="w-full mb-6 grid grid-cols-2 gap-2 text-sm"
            {
                dt class="font-semibold" { "Name" }
                dd { (subscription.name) }

                dt class="font-semibold" { "Price" }
                dd { (format_currency(subscription.price.as_f64())) }

                dt class="font-semibold" { "Billing Cycle" }
                dd { (subscription.billing_cycle) }

                dt class="font-semibold" { "Next Payment" }
                dd { (subscription.next_payment_date) }

                dt class="font-semibold" { "Category" }
                dd { (subscription.category.as_deref().unwrap_or("-")) }
            }

            form
                hx-post=(endpoint)
                hx-target-error="#alert-container"
                class="w-full space-y-4"
            {
                button type="submit" class=(BUTTON_DELETE_STYLE) { "Delete" }

                p class="text-sm text-center"
                {
                    (link(endpoints::SUBSCRIPTIONS_VIEW, "Cancel"))
                }
            }
        }
    };

    base("Delete Subscription", &[], &content)
}

/// Render the confirmation page for deleting one of the user's subscriptions.
pub async fn get_delete_subscription_page(
    State(state): State<DeleteSubscriptionState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<SubscriptionId>, PathRejection>,
) -> Result<Response, Error> {
    let Ok(Path(subscription_id)) = path else {
        return Err(Error::NotFound);
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let subscription = get_owned_subscription(subscription_id, user_id, &connection)?;
    let endpoint = format_endpoint(endpoints::DELETE_SUBSCRIPTION, subscription_id);

    Ok(delete_confirmation_view(&endpoint, &subscription).into_response())
}

/// Handle subscription deletion, then send the user back to the subscriptions page.
pub async fn delete_subscription_endpoint(
    State(state): State<DeleteSubscriptionState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<SubscriptionId>, PathRejection>,
) -> Response {
    let Ok(Path(subscription_id)) = path else {
        return Error::DeleteMissingSubscription.into_alert_response();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_subscription(subscription_id, user_id, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::SUBSCRIPTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::DeleteMissingSubscription) => {
            Error::DeleteMissingSubscription.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting subscription {subscription_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
