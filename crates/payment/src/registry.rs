//! Process-wide gateway registry.
//!
//! Gateways are registered once during startup (or test setup) and resolved
//! by identifier afterwards. Registration takes the write lock; resolution
//! only ever takes the read lock, so concurrent `resolve` calls never block
//! each other.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, RwLock};

use tracing::{debug, info, warn};

use storefront_core::{DomainError, DomainResult};

use crate::error::{PaymentError, PaymentResult};
use crate::gateway::{NullGateway, PaymentGateway};

/// Identifier under which the [`NullGateway`] is always resolvable.
pub const NULL_GATEWAY_ID: &str = "null";

/// Produces a gateway instance on each resolution.
pub type GatewayFactory = Arc<dyn Fn() -> Arc<dyn PaymentGateway> + Send + Sync>;

#[derive(Default)]
pub struct PaymentGateways {
    bindings: RwLock<BTreeMap<String, GatewayFactory>>,
}

impl core::fmt::Debug for PaymentGateways {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let ids = self.ids().unwrap_or_default();
        f.debug_struct("PaymentGateways").field("ids", &ids).finish()
    }
}

impl PaymentGateways {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by the whole process.
    pub fn global() -> &'static PaymentGateways {
        static GLOBAL: OnceLock<PaymentGateways> = OnceLock::new();
        GLOBAL.get_or_init(PaymentGateways::new)
    }

    /// Bind `id` to `factory`. An existing binding is replaced; a blank
    /// identifier is rejected.
    pub fn register<G, F>(&self, id: impl Into<String>, factory: F) -> PaymentResult<()>
    where
        G: PaymentGateway + 'static,
        F: Fn() -> G + Send + Sync + 'static,
    {
        let id = validate_id(id.into())?;
        let factory: GatewayFactory =
            Arc::new(move || Arc::new(factory()) as Arc<dyn PaymentGateway>);

        let mut bindings = self.write()?;
        if bindings.insert(id.clone(), factory).is_some() {
            warn!(gateway = %id, "payment gateway binding replaced");
        } else {
            info!(gateway = %id, "payment gateway registered");
        }
        Ok(())
    }

    /// Bind `id` to a gateway built with `Default`.
    pub fn register_default<G>(&self, id: impl Into<String>) -> PaymentResult<()>
    where
        G: PaymentGateway + Default + 'static,
    {
        self.register(id, G::default)
    }

    /// Remove the binding for `id`; returns whether one existed.
    pub fn deregister(&self, id: &str) -> PaymentResult<bool> {
        Ok(self.write()?.remove(id).is_some())
    }

    /// Build the gateway bound to `id`.
    ///
    /// `"null"` resolves to the [`NullGateway`] unless something else was
    /// registered under that name.
    pub fn resolve(&self, id: &str) -> PaymentResult<Arc<dyn PaymentGateway>> {
        let factory = self.read()?.get(id).cloned();

        match factory {
            Some(factory) => {
                debug!(gateway = id, "payment gateway resolved");
                Ok(factory())
            }
            None if id == NULL_GATEWAY_ID => Ok(Arc::new(NullGateway)),
            None => Err(PaymentError::UnknownGateway(id.to_string())),
        }
    }

    /// Alias of [`resolve`](Self::resolve).
    pub fn make(&self, id: &str) -> PaymentResult<Arc<dyn PaymentGateway>> {
        self.resolve(id)
    }

    /// Every resolvable identifier, sorted, `"null"` included.
    pub fn ids(&self) -> PaymentResult<Vec<String>> {
        let mut ids: Vec<String> = self.read()?.keys().cloned().collect();
        if !ids.iter().any(|id| id == NULL_GATEWAY_ID) {
            ids.push(NULL_GATEWAY_ID.to_string());
            ids.sort();
        }
        Ok(ids)
    }

    /// `(identifier, display name)` pairs for select boxes, sorted by identifier.
    pub fn choices(&self) -> PaymentResult<Vec<(String, String)>> {
        self.ids()?
            .into_iter()
            .map(|id| {
                let name = self.resolve(&id)?.name().to_string();
                Ok((id, name))
            })
            .collect()
    }

    /// Drop every binding. Meant for test setup.
    pub fn reset(&self) -> PaymentResult<()> {
        self.write()?.clear();
        Ok(())
    }

    fn read(
        &self,
    ) -> PaymentResult<std::sync::RwLockReadGuard<'_, BTreeMap<String, GatewayFactory>>> {
        self.bindings
            .read()
            .map_err(|_| PaymentError::Registry("lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> PaymentResult<std::sync::RwLockWriteGuard<'_, BTreeMap<String, GatewayFactory>>> {
        self.bindings
            .write()
            .map_err(|_| PaymentError::Registry("lock poisoned".to_string()))
    }
}

fn validate_id(id: String) -> DomainResult<String> {
    if id.trim().is_empty() {
        return Err(DomainError::validation("gateway identifier cannot be empty"));
    }
    Ok(id)
}
