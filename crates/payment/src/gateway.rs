use tracing::debug;

use crate::error::PaymentResult;
use crate::payable::Payable;
use crate::request::{NullRequest, PaymentRequest};

/// A payment gateway: turns a payable into a payment request.
///
/// Implementations own their network timeouts and retries; the configured
/// timeout of the payment method is available to callers through
/// [`crate::PaymentMethod::timeout`].
pub trait PaymentGateway: Send + Sync {
    /// Display name, e.g. `"Plastic Payments"`.
    fn name(&self) -> &str;

    /// Whether completing a payment needs no live round-trip (cash on
    /// delivery, bank transfer, ...).
    fn is_offline(&self) -> bool;

    fn create_payment_request(
        &self,
        payable: &dyn Payable,
    ) -> PaymentResult<Box<dyn PaymentRequest>>;
}

/// The inert default gateway, used when a payment method has none configured.
///
/// Always available; needs no registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullGateway;

impl NullGateway {
    pub const NAME: &'static str = "Null Gateway";
}

impl PaymentGateway for NullGateway {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn is_offline(&self) -> bool {
        true
    }

    fn create_payment_request(
        &self,
        payable: &dyn Payable,
    ) -> PaymentResult<Box<dyn PaymentRequest>> {
        debug!(
            payable_type = payable.payable_type(),
            payable_id = %payable.payable_id(),
            "null gateway issued a placeholder payment request"
        );
        Ok(Box::new(NullRequest::for_payable(payable)))
    }
}
