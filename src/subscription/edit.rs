//! Subscription editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
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
    html::{FORM_CONTAINER_STYLE, base, dollar_input_styles},
    navigation::NavBar,
    subscription::{
        SubscriptionForm, SubscriptionId, form::SubscriptionFormView, get_categories,
        get_owned_subscription, update_subscription,
    },
};

/// The state needed for the edit subscription page and its form handler.
#[derive(Debug, Clone)]
pub struct EditSubscriptionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditSubscriptionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn edit_subscription_form(
    endpoint: &str,
    values: &SubscriptionForm,
    categories: &[String],
    error_message: Option<&str>,
) -> Markup {
    SubscriptionFormView {
        endpoint,
        values,
        categories,
        submit_text: "Save Changes",
        error_message,
    }
    .into_html()
}

/// Render the page for editing one of the user's subscriptions.
///
/// Subscriptions that do not exist, subscriptions owned by someone else and
/// IDs that are not numbers all get the 404 page.
pub async fn get_edit_subscription_page(
    State(state): State<EditSubscriptionState>,
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
    let categories = get_categories(user_id, &connection)?;

    let endpoint = format_endpoint(endpoints::EDIT_SUBSCRIPTION, subscription_id);
    let nav_bar = NavBar::new(&endpoint).into_html();
    let form = edit_subscription_form(
        &endpoint,
        &SubscriptionForm::from_subscription(&subscription),
        &categories,
        None,
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h2 class="text-xl font-bold mb-4" { "Edit " (subscription.name) }
            (form)
        }
    };

    Ok(base("Edit Subscription", &[dollar_input_styles()], &content).into_response())
}

/// Handle the edit subscription form submission.
///
/// The subscription ID comes from the path. Every other field is replaced
/// with the submitted value. Ownership is checked before the form, so a
/// subscription the user cannot see is reported as missing even when the
/// form is invalid.
pub async fn update_subscription_endpoint(
    State(state): State<EditSubscriptionState>,
    Extension(user_id): Extension<UserID>,
    path: Result<Path<SubscriptionId>, PathRejection>,
    Form(form): Form<SubscriptionForm>,
) -> Response {
    let Ok(Path(subscription_id)) = path else {
        return Error::UpdateMissingSubscription.into_alert_response();
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match get_owned_subscription(subscription_id, user_id, &connection) {
        Ok(_) => {}
        Err(Error::NotFound) => return Error::UpdateMissingSubscription.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not load subscription {subscription_id} for editing: {error}");
            return error.into_alert_response();
        }
    }

    let builder = match form.validate() {
        Ok(builder) => builder,
        Err(error) => {
            let categories = match get_categories(user_id, &connection) {
                Ok(categories) => categories,
                Err(error) => return error.into_alert_response(),
            };
            let endpoint = format_endpoint(endpoints::EDIT_SUBSCRIPTION, subscription_id);

            return edit_subscription_form(
                &endpoint,
                &form,
                &categories,
                Some(&error.to_string()),
            )
            .into_response();
        }
    };

    match update_subscription(subscription_id, user_id, builder, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::SUBSCRIPTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(Error::UpdateMissingSubscription) => {
            Error::UpdateMissingSubscription.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating subscription {subscription_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}


#[cfg(test)]
mod update_subscription_endpoint_tests {
    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use time::macros::date;

    use crate::{
        endpoints,
        subscription::{
            BillingCycle, SubscriptionForm, create_subscription, get_owned_subscription,
            test_helpers::builder, update_subscription_endpoint,
        },
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, create_test_user,
            get_shared_test_connection, must_get_form, parse_html_fragment,
        },
    };

    use super::EditSubscriptionState;

    fn get_test_state() -> EditSubscriptionState {
        EditSubscriptionState {
            db_connection: get_shared_test_connection(),
        }
    }

    fn updated_form() -> SubscriptionForm {
        SubscriptionForm {
            name: "Netflix Premium".to_owned(),
            price: "22.99".to_owned(),
            billing_cycle: "Monthly".to_owned(),
            next_payment_date: "2025-04-01".to_owned(),
            category: Some("streaming".to_owned()),
        }
    }

    #[tokio::test]
    async fn update_subscription_succeeds() {
        let state = get_test_state();
        let (user, subscription) = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_test_user("a@example.com", &connection);
            let subscription = create_subscription(
                user.id,
                builder("Netflix", 15.0, "Yearly", date!(2025 - 03 - 01), Some("media")),
                &connection,
            )
            .unwrap();
            (user, subscription)
        };

        let response = update_subscription_endpoint(
            State(state.clone()),
            Extension(user.id),
            Ok(Path(subscription.id)),
            Form(updated_form()),
        )
        .await;

        assert_hx_redirect(&response, endpoints::SUBSCRIPTIONS_VIEW);

        let got =
            get_owned_subscription(subscription.id, user.id, &state.db_connection.lock().unwrap())
                .unwrap();
        assert_eq!(got.name.as_ref(), "Netflix Premium");
        assert_eq!(got.price.as_f64(), 22.99);
        assert_eq!(got.billing_cycle, BillingCycle::Monthly);
        assert_eq!(got.next_payment_date, date!(2025 - 04 - 01));
        assert_eq!(got.category.as_deref(), Some("streaming"));
    }

    #[tokio::test]
    async fn update_other_users_subscription_is_not_found() {
        let state = get_test_state();
        let (other, subscription) = {
            let connection = state.db_connection.lock().unwrap();
            let owner = create_test_user("a@example.com", &connection);
            let other = create_test_user("b@example.com", &connection);
            let subscription = create_subscription(
                owner.id,
                builder("Netflix", 15.0, "Monthly", date!(2025 - 03 - 01), None),
                &connection,
            )
            .unwrap();
            (other, subscription)
        };

        let response = update_subscription_endpoint(
            State(state.clone()),
            Extension(other.id),
            Ok(Path(subscription.id)),
            Form(updated_form()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let got = get_owned_subscription(
            subscription.id,
            subscription.owner_id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(got, subscription);
    }

    #[tokio::test]
    async fn invalid_form_for_other_users_subscription_is_not_found() {
        let state = get_test_state();
        let (other, subscription) = {
            let connection = state.db_connection.lock().unwrap();
            let owner = create_test_user("a@example.com", &connection);
            let other = create_test_user("b@example.com", &connection);
            let subscription = create_subscription(
                owner.id,
                builder("Netflix", 15.0, "Monthly", date!(2025 - 03 - 01), None),
                &connection,
            )
            .unwrap();
            (other, subscription)
        };
        let form = SubscriptionForm {
            name: String::new(),
            ..updated_form()
        };

        let response = update_subscription_endpoint(
            State(state.clone()),
            Extension(other.id),
            Ok(Path(subscription.id)),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let forms = scraper::Selector::parse("form").unwrap();
        assert_eq!(html.select(&forms).count(), 0);
    }

    #[tokio::test]
    async fn invalid_form_for_missing_subscription_is_not_found() {
        let state = get_test_state();
        let user = create_test_user("a@example.com", &state.db_connection.lock().unwrap());
        let form = SubscriptionForm {
            price: "-1".to_owned(),
            ..updated_form()
        };

        let response = update_subscription_endpoint(
            State(state),
            Extension(user.id),
            Ok(Path(42)),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_date_is_shown_in_form() {
        let state = get_test_state();
        let (user, subscription) = {
            let connection = state.db_connection.lock().unwrap();
            let user = create_test_user("a@example.com", &connection);
            let subscription = create_subscription(
                user.id,
                builder("Netflix", 15.0, "Monthly", date!(2025 - 03 - 01), None),
                &connection,
            )
            .unwrap();
            (user, subscription)
        };
        let form = SubscriptionForm {
            next_payment_date: "soon".to_owned(),
            ..updated_form()
        };

        let response = update_subscription_endpoint(
            State(state.clone()),
            Extension(user.id),
            Ok(Path(subscription.id)),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(
            &form,
            "\"soon\" is not a valid date, expected a date like 2025-01-31",
        );

        let got =
            get_owned_subscription(subscription.id, user.id, &state.db_connection.lock().unwrap())
                .unwrap();
        assert_eq!(got, subscription);
    }
}
