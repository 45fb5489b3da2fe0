//! The registration page and the handler that creates new accounts.
use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    app_state::create_cookie_key,
    auth::{
        DEFAULT_COOKIE_DURATION, Email, PasswordHash, User, ValidatedPassword, create_user,
        set_auth_cookie,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        email_input, link, loading_spinner, log_in_register, password_input,
    },
};

/// Client-side minimum password length. The server checks strength on top of this.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()];

            @if let Some(error_message) = error_message
            {
                p class=(FORM_ERROR_STYLE) { (error_message) }
            }
        }
    }
}

/// Error messages for each field of the registration form.
#[derive(Default)]
struct RegistrationErrors<'a> {
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn registration_form(email: &str, password: &str, errors: RegistrationErrors) -> Markup {
    html! {
        form
            hx-post=(endpoints::REGISTER)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-indicator="#indicator"
            hx-disabled-elt="#submit-button"
            class="space-y-4 md:space-y-6"
        {
            (email_input(email, errors.email))
            (password_input(password, PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Create Account"
            }

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                (link(endpoints::LOG_IN, "Log in here"))
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let registration_form = registration_form("", "", RegistrationErrors::default());
    let content = log_in_register("Create an account", &registration_form);
    base("Register", &[], &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl RegistrationState {
    /// Create the cookie key from a string and set the default cookie duration.
    pub fn new(cookie_secret: &str, db_connection: Arc<Mutex<Connection>>) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection,
        }
    }
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

#[derive(Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Check the registration details and create the account.
///
/// # Errors
///
/// Returns:
/// - [Error::InvalidEmail] if the email does not look like an email address,
/// - [Error::TooWeak] if the password is too easy to guess,
/// - [Error::PasswordMismatch] if the two passwords differ,
/// - [Error::DuplicateEmail] if the email is already registered,
/// - [Error::HashingError] or [Error::SqlError] for unexpected failures.
pub fn register_account(
    form: &RegisterForm,
    hash_cost: u32,
    connection: &Connection,
) -> Result<User, Error> {
    let email = Email::new(&form.email)?;
    let password = ValidatedPassword::new(&form.password)?;

    if form.password != form.confirm_password {
        return Err(Error::PasswordMismatch);
    }

    let password_hash = PasswordHash::new(password, hash_cost)?;

    create_user(email, password_hash, connection)
}

/// Handler for registration form submissions.
///
/// A new account is logged in straight away and redirected to the
/// subscriptions page. Invalid details are shown next to the field at fault.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    Form(user_data): Form<RegisterForm>,
) -> Response {
    let registration = match state.db_connection.lock() {
        Ok(connection) => register_account(&user_data, PasswordHash::DEFAULT_COST, &connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let user = match registration {
        Ok(user) => user,
        Err(error @ (Error::InvalidEmail(_) | Error::DuplicateEmail)) => {
            let message = error.to_string();
            let errors = RegistrationErrors {
                email: Some(&message),
                ..Default::default()
            };
            return registration_form(&user_data.email, "", errors).into_response();
        }
        Err(error @ Error::TooWeak(_)) => {
            let message = error.to_string();
            let errors = RegistrationErrors {
                password: Some(&message),
                ..Default::default()
            };
            return registration_form(&user_data.email, &user_data.password, errors)
                .into_response();
        }
        Err(Error::PasswordMismatch) => {
            let errors = RegistrationErrors {
                confirm_password: Some("Passwords do not match"),
                ..Default::default()
            };
            return registration_form(&user_data.email, &user_data.password, errors)
                .into_response();
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while registering a user: {error}");
            return error.into_alert_response();
        }
    };

    match set_auth_cookie(jar, user.id, state.cookie_duration) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::SUBSCRIPTIONS_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not set auth cookie after registration: {error}");
            (
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
                .into_response()
        }
    }
}
