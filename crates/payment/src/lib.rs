//! Payment module: gateway abstraction, gateway registry and payment methods.
//!
//! A [`PaymentMethod`] is a configured, named binding to a gateway
//! identifier. The identifier is resolved through [`PaymentGateways`] into a
//! [`PaymentGateway`], which turns a [`Payable`] into a [`PaymentRequest`].
//! Methods without a gateway fall back to the inert [`NullGateway`].

pub mod error;
pub mod gateway;
pub mod method;
pub mod payable;
pub mod registry;
pub mod repository;
pub mod request;

pub use error::{PaymentError, PaymentResult};
pub use gateway::{NullGateway, PaymentGateway};
pub use method::{DEFAULT_TIMEOUT, PaymentMethod};
pub use payable::Payable;
pub use registry::{GatewayFactory, NULL_GATEWAY_ID, PaymentGateways};
pub use repository::{InMemoryPaymentMethodRepository, PaymentMethodRepository};
pub use request::{NullRequest, PaymentRequest};
