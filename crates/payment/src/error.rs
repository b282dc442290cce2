use thiserror::Error;

use storefront_core::DomainError;

pub type PaymentResult<T> = Result<T, PaymentError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// The identifier is not bound in the gateway registry.
    #[error("unknown payment gateway '{0}'")]
    UnknownGateway(String),

    /// A concrete gateway could not build a payment request.
    #[error("payment gateway '{gateway}' failed: {message}")]
    Gateway { gateway: String, message: String },

    #[error("gateway registry unavailable: {0}")]
    Registry(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl PaymentError {
    pub fn gateway(gateway: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Gateway {
            gateway: gateway.into(),
            message: message.into(),
        }
    }
}
