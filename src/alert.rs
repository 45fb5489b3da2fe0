//! Alert fragments for reporting failed HTMX requests.
//!
//! Forms that submit with HTMX set `hx-target-error="#alert-container"`, so an
//! error response rendered with [Alert] is swapped into the fixed alert
//! container at the bottom of the page.

use axum::response::{Html, IntoResponse, Response};
use maud::{Markup, html};

/// An alert message to display to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Something went wrong. `details` should tell the user what to do next.
    Error { message: String, details: String },
}

impl Alert {
    pub fn into_html(self) -> Markup {
        match self {
            Alert::Error { message, details } => html! {
                div
                    role="alert"
                    class="flex flex-col gap-1 p-4 mb-4 text-sm text-red-800 rounded-lg
                        bg-red-50 dark:bg-gray-800 dark:text-red-400 border border-red-300
                        dark:border-red-800"
                {
                    p class="font-semibold" { (message) }

                    @if !details.is_empty() {
                        span { (details) }
                    }

                    button
                        type="button"
                        class="self-end text-xs underline"
                        onclick="this.closest('[role=alert]').remove()"
                    {
                        "Dismiss"
                    }
                }
            },
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        Html(self.into_html().into_string()).into_response()
    }
}

#[cfg(test)]
mod alert_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{
        alert::Alert,
        test_utils::{assert_valid_html, parse_html_fragment},
    };

    #[tokio::test]
    async fn renders_message_and_details() {
        let response = Alert::Error {
            message: "Could not delete subscription".to_owned(),
            details: "Try again.".to_owned(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);

        let p = scraper::Selector::parse("p").unwrap();
        let message = html.select(&p).next().expect("No message found");
        assert_eq!(
            message.text().collect::<String>().trim(),
            "Could not delete subscription"
        );
    }
}
