//! Database operations for subscriptions.
//!
//! Every query is scoped to an owner: a subscription that belongs to another
//! user is indistinguishable from one that does not exist.

use rusqlite::{Connection, Row};

use crate::{
    Error, UserID,
    subscription::{
        BillingCycle, Price, Subscription, SubscriptionBuilder, SubscriptionId, SubscriptionName,
    },
};

/// Initialize the subscription table and indexes.
pub fn create_subscription_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS subscription (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            price REAL NOT NULL,
            billing_cycle TEXT NOT NULL,
            next_payment_date TEXT NOT NULL,
            category TEXT,
            owner_id INTEGER NOT NULL,
            FOREIGN KEY(owner_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_subscription_owner ON subscription(owner_id);",
    )?;

    Ok(())
}

/// Create a subscription owned by `owner_id` and return it with its generated ID.
pub fn create_subscription(
    owner_id: UserID,
    builder: SubscriptionBuilder,
    connection: &Connection,
) -> Result<Subscription, Error> {
    connection.execute(
        "INSERT INTO subscription (name, price, billing_cycle, next_payment_date, category, owner_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        (
            builder.name.as_ref(),
            builder.price.as_f64(),
            builder.billing_cycle.as_str(),
            builder.next_payment_date,
            builder.category.as_deref(),
            owner_id.as_i64(),
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Subscription {
        id,
        name: builder.name,
        price: builder.price,
        billing_cycle: builder.billing_cycle,
        next_payment_date: builder.next_payment_date,
        category: builder.category,
        owner_id,
    })
}

/// Retrieve the subscription with `id` if it belongs to `owner_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such subscription or it belongs
/// to another user.
pub fn get_owned_subscription(
    id: SubscriptionId,
    owner_id: UserID,
    connection: &Connection,
) -> Result<Subscription, Error> {
    connection
        .prepare(
            "SELECT id, name, price, billing_cycle, next_payment_date, category, owner_id
            FROM subscription WHERE id = ?1 AND owner_id = ?2;",
        )?
        .query_row((id, owner_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Replace every field of an owned subscription except its ID and owner.
///
/// # Errors
///
/// Returns [Error::UpdateMissingSubscription] if there is no such
/// subscription or it belongs to another user.
pub fn update_subscription(
    id: SubscriptionId,
    owner_id: UserID,
    builder: SubscriptionBuilder,
    connection: &Connection,
) -> Result<Subscription, Error> {
    let existing = match get_owned_subscription(id, owner_id, connection) {
        Ok(subscription) => subscription,
        Err(Error::NotFound) => return Err(Error::UpdateMissingSubscription),
        Err(error) => return Err(error),
    };

    let rows_affected = connection.execute(
        "UPDATE subscription
        SET name = ?1, price = ?2, billing_cycle = ?3, next_payment_date = ?4, category = ?5
        WHERE id = ?6 AND owner_id = ?7",
        (
            builder.name.as_ref(),
            builder.price.as_f64(),
            builder.billing_cycle.as_str(),
            builder.next_payment_date,
            builder.category.as_deref(),
            existing.id,
            existing.owner_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingSubscription);
    }

    Ok(Subscription {
        id: existing.id,
        name: builder.name,
        price: builder.price,
        billing_cycle: builder.billing_cycle,
        next_payment_date: builder.next_payment_date,
        category: builder.category,
        owner_id: existing.owner_id,
    })
}

/// Delete an owned subscription.
///
/// # Errors
///
/// Returns [Error::DeleteMissingSubscription] if there is no such
/// subscription or it belongs to another user.
pub fn delete_subscription(
    id: SubscriptionId,
    owner_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM subscription WHERE id = ?1 AND owner_id = ?2",
        (id, owner_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingSubscription);
    }

    Ok(())
}

/// Expects the columns id, name, price, billing_cycle, next_payment_date,
/// category and owner_id, in that order.
pub(super) fn map_row(row: &Row) -> Result<Subscription, rusqlite::Error> {
    let raw_name: String = row.get(1)?;
    let raw_billing_cycle: String = row.get(3)?;

    Ok(Subscription {
        id: row.get(0)?,
        name: SubscriptionName::new_unchecked(&raw_name),
        price: Price::new_unchecked(row.get(2)?),
        billing_cycle: BillingCycle::from_stored(&raw_billing_cycle),
        next_payment_date: row.get(4)?,
        category: row.get(5)?,
        owner_id: UserID::new(row.get(6)?),
    })
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use time::Date;

    use crate::subscription::{
        BillingCycle, Price, SubscriptionBuilder, SubscriptionName,
    };

    /// A valid builder for tests. `billing_cycle` is stored as-is.
    pub(crate) fn builder(
        name: &str,
        price: f64,
        billing_cycle: &str,
        next_payment_date: Date,
        category: Option<&str>,
    ) -> SubscriptionBuilder {
        SubscriptionBuilder {
            name: SubscriptionName::new_unchecked(name),
            price: Price::new_unchecked(price),
            billing_cycle: BillingCycle::from_stored(billing_cycle),
            next_payment_date,
            category: category.map(str::to_owned),
        }
    }
}
