//! The subscriptions page: a filterable, sortable table of the user's
//! subscriptions with an estimate of the total monthly spend.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error, UserID,
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CATEGORY_BADGE_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency, link,
    },
    navigation::NavBar,
    subscription::{
        BillingCycle, SortBy, Subscription, SubscriptionListing, SubscriptionQuery,
        list_subscriptions,
    },
    timezone::local_today,
};

/// The state needed for the subscriptions page.
#[derive(Debug, Clone)]
pub struct SubscriptionsPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SubscriptionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the subscriptions page.
///
/// The query string may contain `category`, `billingCycle` and `sortBy`.
pub async fn get_subscriptions_page(
    State(state): State<SubscriptionsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<SubscriptionQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let listing = list_subscriptions(user_id, &query, &connection)
        .inspect_err(|error| tracing::error!("could not list subscriptions: {error}"))?;

    Ok(subscriptions_view(&listing, &query, today).into_response())
}

fn subscriptions_view(
    listing: &SubscriptionListing,
    query: &SubscriptionQuery,
    today: Date,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::SUBSCRIPTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                div class="flex items-center justify-between"
                {
                    h1 class="text-2xl font-bold" { "Subscriptions" }
                    (link(endpoints::CREATE_SUBSCRIPTION, "New Subscription"))
                }

                (filter_form(&listing.categories, query))

                div class="p-4 rounded bg-white dark:bg-gray-800 shadow"
                {
                    span class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Estimated monthly total"
                    }
                    p id="total-monthly" class="text-3xl font-bold"
                    {
                        (format_currency(listing.total_monthly))
                    }
                }

                @if listing.subscriptions.is_empty() {
                    (empty_state(query))
                } @else {
                    (subscriptions_table(&listing.subscriptions, today))
                }
            }
        }
    };

    base("Subscriptions", &[], &content)
}

fn filter_form(categories: &[String], query: &SubscriptionQuery) -> Markup {
    let selected_category = query.category.as_deref().unwrap_or_default();
    let selected_billing_cycle = query.billing_cycle.as_deref().unwrap_or_default();
    let selected_sort = query.sort_by();

    // Keep a filter value that is not one of the options selectable, e.g. a
    // category from an old bookmark.
    let extra_category = (!selected_category.is_empty()
        && !categories.iter().any(|category| category == selected_category))
    .then_some(selected_category);
    let extra_billing_cycle = (!selected_billing_cycle.is_empty()
        && ![BillingCycle::Monthly, BillingCycle::Yearly]
            .iter()
            .any(|cycle| cycle.as_str() == selected_billing_cycle))
    .then_some(selected_billing_cycle);

    html! {
        form
            method="get"
            action=(endpoints::SUBSCRIPTIONS_VIEW)
            id="filter-form"
            class="grid grid-cols-1 md:grid-cols-4 gap-4 items-end"
        {
            div
            {
                label for="category" class=(FORM_LABEL_STYLE) { "Category" }

                select name="category" id="category" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[selected_category.is_empty()] { "All categories" }

                    @for category in categories {
                        option value=(category) selected[category == selected_category] { (category) }
                    }

                    @if let Some(category) = extra_category {
                        option value=(category) selected { (category) }
                    }
                }
            }

            div
            {
                label for="billingCycle" class=(FORM_LABEL_STYLE) { "Billing Cycle" }

                select name="billingCycle" id="billingCycle" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[selected_billing_cycle.is_empty()] { "All billing cycles" }

                    @for cycle in [BillingCycle::Monthly, BillingCycle::Yearly] {
                        option
                            value=(cycle.as_str())
                            selected[cycle.as_str() == selected_billing_cycle]
                        {
                            (cycle)
                        }
                    }

                    @if let Some(cycle) = extra_billing_cycle {
                        option value=(cycle) selected { (cycle) }
                    }
                }
            }

            div
            {
                label for="sortBy" class=(FORM_LABEL_STYLE) { "Sort By" }

                select name="sortBy" id="sortBy" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for (sort_by, label) in [
                        (SortBy::Name, "Name"),
                        (SortBy::Price, "Price"),
                        (SortBy::Date, "Next payment"),
                    ] {
                        option value=(sort_by.as_param()) selected[sort_by == selected_sort] { (label) }
                    }
                }
            }

            div class="flex gap-2"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
                a href=(endpoints::SUBSCRIPTIONS_VIEW) class=(BUTTON_SECONDARY_STYLE) { "Reset" }
            }
        }
    }
}

fn empty_state(query: &SubscriptionQuery) -> Markup {
    let is_filtered = [&query.category, &query.billing_cycle]
        .iter()
        .any(|filter| filter.as_deref().is_some_and(|value| !value.is_empty()));

    html! {
        div id="empty-state" class="p-8 text-center text-gray-500 dark:text-gray-400"
        {
            @if is_filtered {
                p { "No subscriptions match these filters." }
            } @else {
                p
                {
                    "You are not tracking any subscriptions yet. "
                    (link(endpoints::CREATE_SUBSCRIPTION, "Add your first subscription"))
                    "."
                }
            }
        }
    }
}

fn subscriptions_table(subscriptions: &[Subscription], today: Date) -> Markup {
    html! {
        div class="relative overflow-x-auto shadow-md rounded"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Price" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Billing Cycle" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Next Payment" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for subscription in subscriptions {
                        (subscription_row(subscription, today))
                    }
                }
            }
        }
    }
}

fn subscription_row(subscription: &Subscription, today: Date) -> Markup {
    let edit_url = format_endpoint(endpoints::EDIT_SUBSCRIPTION, subscription.id);
    let delete_url = format_endpoint(endpoints::DELETE_SUBSCRIPTION, subscription.id);
    let days_until = (subscription.next_payment_date - today).whole_days();
    let due_style = if days_until < 0 {
        "block text-xs text-red-600 dark:text-red-400"
    } else {
        "block text-xs text-gray-500 dark:text-gray-400"
    };

    html! {
        tr class=(TABLE_ROW_STYLE) data-subscription-id=(subscription.id)
        {
            th scope="row" class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
            {
                (subscription.name)
            }

            td class=(TABLE_CELL_STYLE)
            {
                (format_currency(subscription.price.as_f64()))

                @if subscription.billing_cycle == BillingCycle::Yearly {
                    span class="block text-xs"
                    {
                        "(" (format_currency(subscription.monthly_cost())) "/month)"
                    }
                }
            }

            td class=(TABLE_CELL_STYLE) { (subscription.billing_cycle) }

            td class=(TABLE_CELL_STYLE)
            {
                (subscription.next_payment_date)

                span class=(due_style) { (days_until_label(days_until)) }
            }

            td class=(TABLE_CELL_STYLE)
            {
                @if let Some(category) = &subscription.category {
                    span class=(CATEGORY_BADGE_STYLE) { (category) }
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    a href=(edit_url) class=(LINK_STYLE) { "Edit" }
                    a href=(delete_url) class=(LINK_STYLE) { "Delete" }
                }
            }
        }
    }
}

fn days_until_label(days_until: i64) -> String {
    match days_until {
        0 => "Due today".to_owned(),
        1 => "Due tomorrow".to_owned(),
        -1 => "1 day overdue".to_owned(),
        days if days > 1 => format!("Due in {days} days"),
        days => format!("{} days overdue", -days),
    }
}
