//! The page and form handler for creating a subscription.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID, endpoints,
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    subscription::{
        SubscriptionForm, create_subscription, form::SubscriptionFormView, get_categories,
    },
    timezone::local_today,
};

/// The state needed for the create subscription page and its form handler.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateSubscriptionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

fn create_subscription_form(
    values: &SubscriptionForm,
    categories: &[String],
    error_message: Option<&str>,
) -> Markup {
    SubscriptionFormView {
        endpoint: endpoints::CREATE_SUBSCRIPTION,
        values,
        categories,
        submit_text: "Create Subscription",
        error_message,
    }
    .into_html()
}

fn create_subscription_view(values: &SubscriptionForm, categories: &[String]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CREATE_SUBSCRIPTION).into_html();
    let form = create_subscription_form(values, categories, None);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "New Subscription" }
            (form)
        }
    };

    base("New Subscription", &[dollar_input_styles()], &content)
}

/// Render the page for creating a subscription.
///
/// The next payment date defaults to today in the server's timezone.
pub async fn get_create_subscription_page(
    State(state): State<CreateSubscriptionState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)
        .inspect_err(|error| tracing::error!("could not get categories: {error}"))?;

    let values = SubscriptionForm {
        next_payment_date: today.to_string(),
        ..Default::default()
    };

    Ok(create_subscription_view(&values, &categories).into_response())
}

/// Handle the create subscription form submission.
///
/// Invalid input is sent back in the form with an error message and nothing
/// is stored.
pub async fn create_subscription_endpoint(
    State(state): State<CreateSubscriptionState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<SubscriptionForm>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let builder = match form.validate() {
        Ok(builder) => builder,
        Err(error) => {
            let categories = match get_categories(user_id, &connection) {
                Ok(categories) => categories,
                Err(error) => return error.into_alert_response(),
            };

            return create_subscription_form(&form, &categories, Some(&error.to_string()))
                .into_response();
        }
    };

    match create_subscription(user_id, builder, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::SUBSCRIPTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a subscription: {error}");
            error.into_alert_response()
        }
    }
}
