//! The owner-scoped listing query behind the subscriptions page.

use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    Error, UserID,
    subscription::{Subscription, db::map_row},
};

/// The filter and sort parameters taken from the subscriptions page query string.
///
/// Empty values are treated the same as missing ones.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SubscriptionQuery {
    pub category: Option<String>,
    #[serde(rename = "billingCycle")]
    pub billing_cycle: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

impl SubscriptionQuery {
    fn category_filter(&self) -> Option<&str> {
        non_empty(self.category.as_deref())
    }

    fn billing_cycle_filter(&self) -> Option<&str> {
        non_empty(self.billing_cycle.as_deref())
    }

    pub fn sort_by(&self) -> SortBy {
        SortBy::from_param(self.sort_by.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// The column the subscription list is sorted by, always ascending.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Name,
    Price,
    Date,
}

impl SortBy {
    /// Unknown or missing values fall back to sorting by name.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("price") => Self::Price,
            Some("date") => Self::Date,
            _ => Self::Name,
        }
    }

    /// The query string value for this sort order.
    pub fn as_param(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::Date => "date",
        }
    }

    fn order_clause(&self) -> &'static str {
        match self {
            Self::Name => "ORDER BY name ASC",
            Self::Price => "ORDER BY price ASC",
            Self::Date => "ORDER BY next_payment_date ASC",
        }
    }
}

/// Everything the subscriptions page needs to render.
#[derive(Debug, PartialEq)]
pub struct SubscriptionListing {
    /// The owner's subscriptions that match the filters, in sorted order.
    pub subscriptions: Vec<Subscription>,
    /// Every category the owner has used, regardless of the filters.
    pub categories: Vec<String>,
    /// The estimated monthly cost of `subscriptions`.
    pub total_monthly: f64,
}

/// List the subscriptions owned by `owner_id` that match `query`.
///
/// Ties in the sort column keep insertion order.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn list_subscriptions(
    owner_id: UserID,
    query: &SubscriptionQuery,
    connection: &Connection,
) -> Result<SubscriptionListing, Error> {
    let subscriptions = get_filtered_subscriptions(owner_id, query, connection)?;
    let categories = get_categories(owner_id, connection)?;
    let total_monthly = total_monthly_cost(&subscriptions);

    Ok(SubscriptionListing {
        subscriptions,
        categories,
        total_monthly,
    })
}

fn get_filtered_subscriptions(
    owner_id: UserID,
    query: &SubscriptionQuery,
    connection: &Connection,
) -> Result<Vec<Subscription>, Error> {
    // Sort by the chosen column, then ID to keep insertion order for ties.
    let sql = format!(
        "SELECT id, name, price, billing_cycle, next_payment_date, category, owner_id \
        FROM subscription \
        WHERE owner_id = :owner_id \
        AND (:category IS NULL OR category = :category) \
        AND (:billing_cycle IS NULL OR billing_cycle = :billing_cycle) \
        {}, id ASC",
        query.sort_by().order_clause()
    );

    connection
        .prepare(&sql)?
        .query_map(
            rusqlite::named_params! {
                ":owner_id": owner_id.as_i64(),
                ":category": query.category_filter(),
                ":billing_cycle": query.billing_cycle_filter(),
            },
            map_row,
        )?
        .map(|subscription_result| subscription_result.map_err(Error::SqlError))
        .collect()
}

/// The distinct categories used by `owner_id`, sorted alphabetically.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_categories(owner_id: UserID, connection: &Connection) -> Result<Vec<String>, Error> {
    connection
        .prepare(
            "SELECT DISTINCT category FROM subscription \
            WHERE owner_id = ?1 AND category IS NOT NULL \
            ORDER BY category ASC",
        )?
        .query_map([owner_id.as_i64()], |row| row.get(0))?
        .map(|category_result| category_result.map_err(Error::SqlError))
        .collect()
}

/// Sum the monthly cost of every subscription in `subscriptions`.
pub fn total_monthly_cost(subscriptions: &[Subscription]) -> f64 {
    subscriptions.iter().map(Subscription::monthly_cost).sum()
}


#[cfg(test)]
mod list_subscriptions_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        UserID,
        subscription::{
            Subscription, SubscriptionQuery, create_subscription, db::test_helpers::builder,
            list_subscriptions,
        },
        test_utils::{create_test_user, get_test_connection},
    };

    fn names(subscriptions: &[Subscription]) -> Vec<String> {
        subscriptions
            .iter()
            .map(|subscription| subscription.name.to_string())
            .collect()
    }

    fn query(
        category: Option<&str>,
        billing_cycle: Option<&str>,
        sort_by: Option<&str>,
    ) -> SubscriptionQuery {
        SubscriptionQuery {
            category: category.map(str::to_owned),
            billing_cycle: billing_cycle.map(str::to_owned),
            sort_by: sort_by.map(str::to_owned),
        }
    }

    /// Creates Netflix, Hosting, Gym and Spotify, in that order.
    fn insert_sample_subscriptions(owner_id: UserID, connection: &Connection) {
        for new_subscription in [
            builder("Netflix", 15.0, "Monthly", date!(2025 - 03 - 10), Some("media")),
            builder("Hosting", 120.0, "Yearly", date!(2025 - 01 - 05), Some("work")),
            builder("Gym", 40.0, "Monthly", date!(2025 - 02 - 01), None),
            builder("Spotify", 12.0, "Monthly", date!(2025 - 03 - 01), Some("media")),
        ] {
            create_subscription(owner_id, new_subscription, connection).unwrap();
        }
    }

    #[test]
    fn no_subscriptions_gives_empty_listing() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);

        let listing = list_subscriptions(owner.id, &SubscriptionQuery::default(), &connection)
            .unwrap();

        assert!(listing.subscriptions.is_empty());
        assert!(listing.categories.is_empty());
        assert_eq!(listing.total_monthly, 0.0);
    }

    #[test]
    fn default_sort_is_by_name() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        insert_sample_subscriptions(owner.id, &connection);

        let listing = list_subscriptions(owner.id, &SubscriptionQuery::default(), &connection)
            .unwrap();

        assert_eq!(
            names(&listing.subscriptions),
            ["Gym", "Hosting", "Netflix", "Spotify"]
        );
    }

    #[test]
    fn unknown_sort_falls_back_to_name() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        insert_sample_subscriptions(owner.id, &connection);

        let listing =
            list_subscriptions(owner.id, &query(None, None, Some("colour")), &connection).unwrap();

        assert_eq!(
            names(&listing.subscriptions),
            ["Gym", "Hosting", "Netflix", "Spotify"]
        );
    }

    #[test]
    fn sort_by_price_is_non_decreasing() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        insert_sample_subscriptions(owner.id, &connection);

        let listing =
            list_subscriptions(owner.id, &query(None, None, Some("price")), &connection).unwrap();

        assert_eq!(
            names(&listing.subscriptions),
            ["Spotify", "Netflix", "Gym", "Hosting"]
        );
    }

    #[test]
    fn sort_by_date_is_non_decreasing() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        insert_sample_subscriptions(owner.id, &connection);

        let listing =
            list_subscriptions(owner.id, &query(None, None, Some("date")), &connection).unwrap();

        assert_eq!(
            names(&listing.subscriptions),
            ["Hosting", "Gym", "Spotify", "Netflix"]
        );
    }

    #[test]
    fn ties_keep_insertion_order() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        for name in ["Zeta", "Alpha", "Mu"] {
            create_subscription(
                owner.id,
                builder(name, 10.0, "Monthly", date!(2025 - 03 - 01), None),
                &connection,
            )
            .unwrap();
        }

        for sort_by in ["price", "date"] {
            let listing =
                list_subscriptions(owner.id, &query(None, None, Some(sort_by)), &connection)
                    .unwrap();

            assert_eq!(
                names(&listing.subscriptions),
                ["Zeta", "Alpha", "Mu"],
                "ties not in insertion order when sorting by {sort_by}"
            );
        }
    }

    #[test]
    fn name_sort_is_case_sensitive() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        for name in ["apple", "Banana"] {
            create_subscription(
                owner.id,
                builder(name, 10.0, "Monthly", date!(2025 - 03 - 01), None),
                &connection,
            )
            .unwrap();
        }

        let listing = list_subscriptions(owner.id, &SubscriptionQuery::default(), &connection)
            .unwrap();

        assert_eq!(names(&listing.subscriptions), ["Banana", "apple"]);
    }

    #[test]
    fn category_filter_returns_exact_matches() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        insert_sample_subscriptions(owner.id, &connection);

        let listing =
            list_subscriptions(owner.id, &query(Some("media"), None, None), &connection).unwrap();

        assert_eq!(names(&listing.subscriptions), ["Netflix", "Spotify"]);
        assert!(
            listing
                .subscriptions
                .iter()
                .all(|subscription| subscription.category.as_deref() == Some("media"))
        );
    }

    #[test]
    fn billing_cycle_filter_returns_exact_matches() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        insert_sample_subscriptions(owner.id, &connection);

        let listing =
            list_subscriptions(owner.id, &query(None, Some("Yearly"), None), &connection).unwrap();
        assert_eq!(names(&listing.subscriptions), ["Hosting"]);

        let listing =
            list_subscriptions(owner.id, &query(None, Some("yearly"), None), &connection).unwrap();
        assert!(listing.subscriptions.is_empty());
    }

    #[test]
    fn filters_combine() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        insert_sample_subscriptions(owner.id, &connection);

        let listing = list_subscriptions(
            owner.id,
            &query(Some("work"), Some("Monthly"), None),
            &connection,
        )
        .unwrap();

        assert!(listing.subscriptions.is_empty());
        assert_eq!(listing.total_monthly, 0.0);
    }

    #[test]
    fn empty_filters_are_ignored() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        insert_sample_subscriptions(owner.id, &connection);

        let listing =
            list_subscriptions(owner.id, &query(Some(""), Some(""), Some("")), &connection)
                .unwrap();

        assert_eq!(listing.subscriptions.len(), 4);
    }

    #[test]
    fn categories_ignore_filters() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        insert_sample_subscriptions(owner.id, &connection);

        let listing =
            list_subscriptions(owner.id, &query(Some("work"), None, None), &connection).unwrap();

        assert_eq!(names(&listing.subscriptions), ["Hosting"]);
        assert_eq!(listing.categories, ["media", "work"]);
    }

    #[test]
    fn total_spreads_yearly_price_over_twelve_months() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        create_subscription(
            owner.id,
            builder("Monthly thing", 12.0, "Monthly", date!(2025 - 03 - 01), None),
            &connection,
        )
        .unwrap();
        create_subscription(
            owner.id,
            builder("Yearly thing", 120.0, "Yearly", date!(2025 - 03 - 01), None),
            &connection,
        )
        .unwrap();

        let listing = list_subscriptions(owner.id, &SubscriptionQuery::default(), &connection)
            .unwrap();

        assert!(
            (listing.total_monthly - 22.0).abs() < 1e-9,
            "got total {}, want 22",
            listing.total_monthly
        );
    }

    #[test]
    fn unrecognized_billing_cycle_adds_nothing_to_total() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        create_subscription(
            owner.id,
            builder("Netflix", 15.0, "Monthly", date!(2025 - 03 - 01), None),
            &connection,
        )
        .unwrap();
        create_subscription(
            owner.id,
            builder("Paper", 5.0, "Weekly", date!(2025 - 03 - 01), None),
            &connection,
        )
        .unwrap();

        let listing = list_subscriptions(owner.id, &SubscriptionQuery::default(), &connection)
            .unwrap();

        assert_eq!(listing.subscriptions.len(), 2);
        assert_eq!(listing.total_monthly, 15.0);
    }

    #[test]
    fn total_only_counts_filtered_subscriptions() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        insert_sample_subscriptions(owner.id, &connection);

        let listing =
            list_subscriptions(owner.id, &query(Some("media"), None, None), &connection).unwrap();

        assert_eq!(listing.total_monthly, 27.0);
    }

    #[test]
    fn other_users_subscriptions_never_appear() {
        let connection = get_test_connection();
        let owner = create_test_user("a@example.com", &connection);
        let other = create_test_user("b@example.com", &connection);
        insert_sample_subscriptions(owner.id, &connection);
        create_subscription(
            other.id,
            builder("Secret", 1.0, "Monthly", date!(2025 - 03 - 01), Some("media")),
            &connection,
        )
        .unwrap();
        create_subscription(
            other.id,
            builder("Private", 1.0, "Monthly", date!(2025 - 03 - 01), Some("private")),
            &connection,
        )
        .unwrap();

        for filters in [
            query(None, None, None),
            query(Some("media"), None, Some("price")),
            query(None, Some("Monthly"), Some("date")),
        ] {
            let listing = list_subscriptions(owner.id, &filters, &connection).unwrap();

            assert!(
                listing
                    .subscriptions
                    .iter()
                    .all(|subscription| subscription.owner_id == owner.id),
                "got another user's subscription with {filters:?}"
            );
            assert_eq!(listing.categories, ["media", "work"]);
        }
    }
}
