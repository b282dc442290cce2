use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use storefront_core::{DomainError, DomainResult, Entity, PaymentMethodId};

use crate::error::PaymentResult;
use crate::gateway::{NullGateway, PaymentGateway};
use crate::registry::PaymentGateways;

/// Seconds a payment may take when the method does not configure `timeout`.
pub const DEFAULT_TIMEOUT: u64 = 180;

/// A configured, enable-able binding of a name to a payment gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    id: PaymentMethodId,
    name: String,
    description: Option<String>,
    gateway: Option<String>,
    #[serde(default = "empty_configuration", deserialize_with = "deserialize_configuration")]
    configuration: Value,
    is_enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PaymentMethod {
    /// A new, enabled method with empty configuration.
    pub fn new(name: impl Into<String>, gateway: Option<String>) -> DomainResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: PaymentMethodId::new(),
            name: validate_name(name.into())?,
            description: None,
            gateway,
            configuration: empty_configuration(),
            is_enabled: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_configuration(mut self, configuration: Value) -> Self {
        self.configuration = normalize(configuration);
        self
    }

    pub fn id_typed(&self) -> PaymentMethodId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The configured gateway identifier, if any.
    pub fn gateway_name(&self) -> Option<&str> {
        self.gateway.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The free-form configuration as a mapping. Never absent: a missing or
    /// malformed configuration reads as an empty mapping.
    pub fn configuration(&self) -> Map<String, Value> {
        match &self.configuration {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        }
    }

    /// `configuration["timeout"]` in seconds, [`DEFAULT_TIMEOUT`] when absent,
    /// not a non-negative integer, or when the configuration is not a mapping.
    pub fn timeout(&self) -> u64 {
        let Value::Object(map) = &self.configuration else {
            return DEFAULT_TIMEOUT;
        };

        match map.get("timeout") {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(DEFAULT_TIMEOUT),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(DEFAULT_TIMEOUT),
            _ => DEFAULT_TIMEOUT,
        }
    }

    /// The gateway this method pays through, resolved in the process-wide
    /// registry.
    pub fn gateway(&self) -> PaymentResult<Arc<dyn PaymentGateway>> {
        self.gateway_from(PaymentGateways::global())
    }

    /// The gateway this method pays through, resolved in `registry`.
    ///
    /// Without a gateway identifier the [`NullGateway`] is returned and the
    /// registry is not consulted. An identifier the registry does not know is
    /// a configuration error and is returned as
    /// [`crate::PaymentError::UnknownGateway`].
    pub fn gateway_from(
        &self,
        registry: &PaymentGateways,
    ) -> PaymentResult<Arc<dyn PaymentGateway>> {
        match self.gateway.as_deref() {
            None => Ok(Arc::new(NullGateway)),
            Some(id) => registry.resolve(id),
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        self.name = validate_name(name.into())?;
        self.touch();
        Ok(())
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
        self.touch();
    }

    pub fn set_gateway(&mut self, gateway: Option<String>) {
        self.gateway = gateway;
        self.touch();
    }

    pub fn set_configuration(&mut self, configuration: Value) {
        self.configuration = normalize(configuration);
        self.touch();
    }

    pub fn enable(&mut self) {
        self.is_enabled = true;
        self.touch();
    }

    pub fn disable(&mut self) {
        self.is_enabled = false;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Entity for PaymentMethod {
    type Id = PaymentMethodId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn validate_name(name: String) -> DomainResult<String> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("payment method name cannot be empty"));
    }
    Ok(name)
}

fn empty_configuration() -> Value {
    Value::Object(Map::new())
}

fn normalize(configuration: Value) -> Value {
    match configuration {
        Value::Null => empty_configuration(),
        other => other,
    }
}

fn deserialize_configuration<'de, D>(deserializer: D) -> Result<Value, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(normalize(Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null)))
}
