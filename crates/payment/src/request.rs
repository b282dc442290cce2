use serde_json::{Map, Value};

use storefront_core::Money;

use crate::payable::Payable;

/// What a gateway hands back for a payable: everything needed to start the
/// payment on the customer's side.
pub trait PaymentRequest: Send + Sync + core::fmt::Debug {
    /// Markup to embed in the checkout page (a form, a button, a script tag).
    fn html_snippet(&self, options: &Map<String, Value>) -> String;

    /// Whether starting the payment sends the customer away from the shop.
    fn will_redirect(&self) -> bool;

    /// `true` for stand-in requests that process no payment at all.
    /// Callers must not treat such a request as a live transaction.
    fn is_placeholder(&self) -> bool {
        false
    }
}

/// Request produced when no real payment processing is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullRequest {
    payable_type: String,
    payable_id: String,
    amount: Money,
}

impl NullRequest {
    pub fn for_payable(payable: &dyn Payable) -> Self {
        Self {
            payable_type: payable.payable_type().to_string(),
            payable_id: payable.payable_id(),
            amount: payable.amount(),
        }
    }

    pub fn payable_type(&self) -> &str {
        &self.payable_type
    }

    pub fn payable_id(&self) -> &str {
        &self.payable_id
    }

    pub fn amount(&self) -> &Money {
        &self.amount
    }
}

impl PaymentRequest for NullRequest {
    fn html_snippet(&self, _options: &Map<String, Value>) -> String {
        String::new()
    }

    fn will_redirect(&self) -> bool {
        false
    }

    fn is_placeholder(&self) -> bool {
        true
    }
}
