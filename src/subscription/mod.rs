//! Subscription tracking.
//!
//! This module contains everything related to subscriptions:
//! - The `Subscription` model and the validated types it is built from
//! - Owner-scoped database functions for storing and listing subscriptions
//! - The pages and form handlers for listing, creating, editing and deleting subscriptions

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod query;

pub use create::{create_subscription_endpoint, get_create_subscription_page};
pub use db::{
    create_subscription, create_subscription_table, delete_subscription, get_owned_subscription,
    update_subscription,
};
pub use delete::{delete_subscription_endpoint, get_delete_subscription_page};
pub use domain::{
    BillingCycle, Price, Subscription, SubscriptionBuilder, SubscriptionForm, SubscriptionId,
    SubscriptionName,
};
pub use edit::{get_edit_subscription_page, update_subscription_endpoint};
pub use list::get_subscriptions_page;
pub use query::{
    SortBy, SubscriptionListing, SubscriptionQuery, get_categories, list_subscriptions,
};

#[cfg(test)]
pub(crate) use db::test_helpers;
