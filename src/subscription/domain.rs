//! Core subscription domain types.

use std::fmt::Display;

use serde::Deserialize;
use time::Date;

use crate::{Error, UserID, parse_date};

/// Database identifier for a subscription.
pub type SubscriptionId = i64;

/// A validated, non-empty subscription name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionName(String);

impl SubscriptionName {
    /// Create a subscription name, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptySubscriptionName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptySubscriptionName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a subscription name without validation, e.g. for names loaded from the database.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for SubscriptionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for SubscriptionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The amount charged each billing cycle. Always finite and at least [Price::MIN].
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Price(f64);

impl Price {
    /// The smallest price a subscription can have, one cent.
    pub const MIN: f64 = 0.01;

    /// # Errors
    ///
    /// Returns [Error::PriceTooSmall] if `amount` is less than [Price::MIN], infinite or NaN.
    pub fn new(amount: f64) -> Result<Self, Error> {
        if amount.is_finite() && amount >= Self::MIN {
            Ok(Self(amount))
        } else {
            Err(Error::PriceTooSmall(amount))
        }
    }

    /// Create a price without validation, e.g. for prices loaded from the database.
    pub fn new_unchecked(amount: f64) -> Self {
        Self(amount)
    }

    pub fn as_f64(&self) -> f64 {
        self.0
    }
}

/// How often a subscription is charged.
///
/// Only "Monthly" and "Yearly" are understood. Any other text is kept as-is
/// so that it can be shown and edited, but it does not count towards the
/// monthly total.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BillingCycle {
    Monthly,
    Yearly,
    Other(String),
}

impl BillingCycle {
    /// The billing cycle suggested for new subscriptions.
    pub const DEFAULT: &'static str = "Monthly";

    /// Parse a billing cycle entered by a user.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyBillingCycle] if `text` is empty or only whitespace.
    pub fn new(text: &str) -> Result<Self, Error> {
        let text = text.trim();

        if text.is_empty() {
            return Err(Error::EmptyBillingCycle);
        }

        Ok(Self::from_stored(text))
    }

    /// Interpret the text stored in the database. Matching is case sensitive.
    pub fn from_stored(text: &str) -> Self {
        match text {
            "Monthly" => Self::Monthly,
            "Yearly" => Self::Yearly,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Monthly => "Monthly",
            Self::Yearly => "Yearly",
            Self::Other(text) => text,
        }
    }
}

impl Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recurring payment tracked by a user.
#[derive(Clone, Debug, PartialEq)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub name: SubscriptionName,
    pub price: Price,
    pub billing_cycle: BillingCycle,
    pub next_payment_date: Date,
    pub category: Option<String>,
    pub owner_id: UserID,
}

impl Subscription {
    /// The estimated cost of this subscription per month.
    ///
    /// Yearly prices are spread evenly over twelve months. Unrecognized
    /// billing cycles contribute nothing.
    pub fn monthly_cost(&self) -> f64 {
        match self.billing_cycle {
            BillingCycle::Monthly => self.price.as_f64(),
            BillingCycle::Yearly => self.price.as_f64() / 12.0,
            BillingCycle::Other(_) => 0.0,
        }
    }
}

/// The user editable fields of a subscription, already validated.
///
/// The ID and owner are never taken from user input, so they are not part
/// of the builder.
#[derive(Clone, Debug, PartialEq)]
pub struct SubscriptionBuilder {
    pub name: SubscriptionName,
    pub price: Price,
    pub billing_cycle: BillingCycle,
    pub next_payment_date: Date,
    pub category: Option<String>,
}

/// The raw values submitted through the create and edit forms.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SubscriptionForm {
    pub name: String,
    pub price: String,
    pub billing_cycle: String,
    pub next_payment_date: String,
    #[serde(default)]
    pub category: Option<String>,
}

impl SubscriptionForm {
    /// Check every field and convert the form into a [SubscriptionBuilder].
    ///
    /// A blank category is treated as no category.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, checking the fields in form order:
    /// [Error::EmptySubscriptionName], [Error::InvalidPrice],
    /// [Error::PriceTooSmall], [Error::EmptyBillingCycle] or [Error::InvalidDate].
    pub fn validate(&self) -> Result<SubscriptionBuilder, Error> {
        let name = SubscriptionName::new(&self.name)?;
        let amount: f64 = self
            .price
            .trim()
            .parse()
            .map_err(|_| Error::InvalidPrice(self.price.clone()))?;
        let price = Price::new(amount)?;
        let billing_cycle = BillingCycle::new(&self.billing_cycle)?;
        let next_payment_date = parse_date(&self.next_payment_date)?;
        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .map(str::to_owned);

        Ok(SubscriptionBuilder {
            name,
            price,
            billing_cycle,
            next_payment_date,
            category,
        })
    }

    /// Pre-fill the form with the current values of `subscription`.
    pub fn from_subscription(subscription: &Subscription) -> Self {
        Self {
            name: subscription.name.to_string(),
            price: format_price_input(subscription.price),
            billing_cycle: subscription.billing_cycle.to_string(),
            next_payment_date: subscription.next_payment_date.to_string(),
            category: subscription.category.clone(),
        }
    }
}

/// Two decimal places when that is exact, otherwise every digit so that
/// saving the form unchanged keeps the stored price.
fn format_price_input(price: Price) -> String {
    let amount = price.as_f64();
    let rounded = format!("{amount:.2}");

    if rounded.parse::<f64>() == Ok(amount) {
        rounded
    } else {
        amount.to_string()
    }
}


#[cfg(test)]
mod price_tests {
    use crate::{Error, subscription::Price};

    #[test]
    fn rejects_fractions_of_a_cent() {
        assert_eq!(Price::new(0.004), Err(Error::PriceTooSmall(0.004)));
        assert_eq!(Price::new(0.0099), Err(Error::PriceTooSmall(0.0099)));
    }

    #[test]
    fn rejects_zero_and_negative_prices() {
        assert_eq!(Price::new(0.0), Err(Error::PriceTooSmall(0.0)));
        assert_eq!(Price::new(-5.0), Err(Error::PriceTooSmall(-5.0)));
        assert!(Price::new(f64::INFINITY).is_err());
        assert!(Price::new(f64::NAN).is_err());
    }

    #[test]
    fn accepts_positive_price() {
        assert_eq!(Price::new(0.01).map(|price| price.as_f64()), Ok(0.01));
    }
}


#[cfg(test)]
mod subscription_form_tests {
    use time::macros::date;

    use crate::{
        Error, UserID,
        subscription::{BillingCycle, Price, Subscription, SubscriptionForm, SubscriptionName},
    };

    fn stored_subscription(amount: f64, billing_cycle: BillingCycle) -> Subscription {
        Subscription {
            id: 1,
            name: SubscriptionName::new_unchecked("Hosting"),
            price: Price::new_unchecked(amount),
            billing_cycle,
            next_payment_date: date!(2025 - 01 - 05),
            category: None,
            owner_id: UserID::new(1),
        }
    }

    fn valid_form() -> SubscriptionForm {
        SubscriptionForm {
            name: "Netflix".to_owned(),
            price: "15.00".to_owned(),
            billing_cycle: "Monthly".to_owned(),
            next_payment_date: "2025-03-01".to_owned(),
            category: Some("media".to_owned()),
        }
    }

    #[test]
    fn validate_succeeds() {
        let builder = valid_form().validate().unwrap();

        assert_eq!(builder.name, SubscriptionName::new_unchecked("Netflix"));
        assert_eq!(builder.price, Price::new_unchecked(15.0));
        assert_eq!(builder.billing_cycle, BillingCycle::Monthly);
        assert_eq!(builder.next_payment_date, date!(2025 - 03 - 01));
        assert_eq!(builder.category, Some("media".to_owned()));
    }

    #[test]
    fn blank_category_becomes_none() {
        for category in [None, Some(""), Some("   ")] {
            let form = SubscriptionForm {
                category: category.map(str::to_owned),
                ..valid_form()
            };

            assert_eq!(form.validate().unwrap().category, None);
        }
    }

    #[test]
    fn rejects_non_positive_price() {
        let form = SubscriptionForm {
            price: "0".to_owned(),
            ..valid_form()
        };

        assert_eq!(form.validate(), Err(Error::PriceTooSmall(0.0)));
    }

    #[test]
    fn rejects_price_below_one_cent() {
        let form = SubscriptionForm {
            price: "0.004".to_owned(),
            ..valid_form()
        };

        assert_eq!(form.validate(), Err(Error::PriceTooSmall(0.004)));
    }

    #[test]
    fn prefilled_form_keeps_stored_price() {
        for amount in [15.0, 120.0, 9.99, 9.999, 0.015, 1234.5678] {
            let subscription = stored_subscription(amount, BillingCycle::Monthly);

            let builder = SubscriptionForm::from_subscription(&subscription)
                .validate()
                .unwrap();

            assert_eq!(builder.price.as_f64(), amount, "price {amount} changed");
        }
    }

    #[test]
    fn prefilled_price_uses_two_decimal_places_when_exact() {
        let subscription = stored_subscription(120.0, BillingCycle::Yearly);

        assert_eq!(SubscriptionForm::from_subscription(&subscription).price, "120.00");
    }

    #[test]
    fn rejects_price_that_is_not_a_number() {
        let form = SubscriptionForm {
            price: "ten dollars".to_owned(),
            ..valid_form()
        };

        assert_eq!(
            form.validate(),
            Err(Error::InvalidPrice("ten dollars".to_owned()))
        );
    }

    #[test]
    fn rejects_empty_name_and_billing_cycle() {
        let form = SubscriptionForm {
            name: " ".to_owned(),
            ..valid_form()
        };
        assert_eq!(form.validate(), Err(Error::EmptySubscriptionName));

        let form = SubscriptionForm {
            billing_cycle: String::new(),
            ..valid_form()
        };
        assert_eq!(form.validate(), Err(Error::EmptyBillingCycle));
    }

    #[test]
    fn rejects_invalid_date() {
        let form = SubscriptionForm {
            next_payment_date: "next tuesday".to_owned(),
            ..valid_form()
        };

        assert_eq!(
            form.validate(),
            Err(Error::InvalidDate("next tuesday".to_owned()))
        );
    }
}
