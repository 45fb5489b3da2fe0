//! The form shared by the create and edit subscription pages.

use maud::{Markup, html};

use crate::{
    html::{
        BUTTON_PRIMARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        loading_spinner,
    },
    subscription::{BillingCycle, Price, SubscriptionForm},
};

/// Billing cycles offered as suggestions. Users may type any other value.
const SUGGESTED_BILLING_CYCLES: [&str; 2] = ["Monthly", "Yearly"];

pub(super) struct SubscriptionFormView<'a> {
    /// The endpoint the form is posted to.
    pub endpoint: &'a str,
    pub values: &'a SubscriptionForm,
    /// Existing categories, suggested in the category input.
    pub categories: &'a [String],
    pub submit_text: &'a str,
    pub error_message: Option<&'a str>,
}

impl SubscriptionFormView<'_> {
    pub(super) fn into_html(self) -> Markup {
        let values = self.values;
        let billing_cycle = if values.billing_cycle.is_empty() {
            BillingCycle::DEFAULT
        } else {
            values.billing_cycle.as_str()
        };

        html! {
            form
                hx-post=(self.endpoint)
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                hx-disabled-elt="#submit-button"
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                    input
                        id="name"
                        type="text"
                        name="name"
                        placeholder="Netflix"
                        value=(values.name)
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="price" class=(FORM_LABEL_STYLE) { "Price" }

                    div class="input-wrapper w-full"
                    {
                        input
                            id="price"
                            type="number"
                            name="price"
                            step="any"
                            min=(Price::MIN)
                            placeholder="0.00"
                            value=(values.price)
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                div
                {
                    label for="billing_cycle" class=(FORM_LABEL_STYLE) { "Billing Cycle" }

                    input
                        id="billing_cycle"
                        type="text"
                        name="billing_cycle"
                        list="billing-cycle-options"
                        value=(billing_cycle)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);

                    datalist id="billing-cycle-options"
                    {
                        @for billing_cycle in SUGGESTED_BILLING_CYCLES {
                            option value=(billing_cycle) {}
                        }
                    }
                }

                div
                {
                    label for="next_payment_date" class=(FORM_LABEL_STYLE) { "Next Payment Date" }

                    input
                        id="next_payment_date"
                        type="date"
                        name="next_payment_date"
                        value=(values.next_payment_date)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="category" class=(FORM_LABEL_STYLE) { "Category (optional)" }

                    input
                        id="category"
                        type="text"
                        name="category"
                        list="category-options"
                        placeholder="e.g. Entertainment"
                        value=[values.category.as_deref()]
                        class=(FORM_TEXT_INPUT_STYLE);

                    datalist id="category-options"
                    {
                        @for category in self.categories {
                            option value=(category) {}
                        }
                    }
                }

                @if let Some(error_message) = self.error_message {
                    p class=(FORM_ERROR_STYLE) { (error_message) }
                }

                button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE)
                {
                    span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                    (self.submit_text)
                }
            }
        }
    }
}
