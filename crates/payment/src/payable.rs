use storefront_core::Money;

/// Anything that can be paid for (an order, an invoice, a subscription fee).
///
/// Only the minimum a gateway needs is required here; the owning module keeps
/// the full contract.
pub trait Payable: Send + Sync {
    /// Identity of the payable within its own type.
    fn payable_id(&self) -> String;

    /// Kind of payable, e.g. `"order"`.
    fn payable_type(&self) -> &str;

    /// Human readable title shown on payment pages.
    fn title(&self) -> String;

    fn amount(&self) -> Money;

    fn currency(&self) -> String {
        self.amount().currency().to_string()
    }
}
