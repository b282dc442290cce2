use std::sync::{Arc, RwLock};

use storefront_core::{DomainError, DomainResult, Entity, PaymentMethodId};

use crate::method::PaymentMethod;

/// Persistence port for payment methods.
pub trait PaymentMethodRepository: Send + Sync {
    fn create(&self, method: PaymentMethod) -> DomainResult<()>;

    fn update(&self, method: PaymentMethod) -> DomainResult<()>;

    fn delete(&self, id: PaymentMethodId) -> DomainResult<()>;

    fn find(&self, id: PaymentMethodId) -> DomainResult<Option<PaymentMethod>>;

    /// Every method, in creation order.
    fn list(&self) -> DomainResult<Vec<PaymentMethod>>;

    /// Enabled methods only, in creation order.
    fn actives(&self) -> DomainResult<Vec<PaymentMethod>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(PaymentMethod::is_enabled)
            .collect())
    }
}

impl<R> PaymentMethodRepository for Arc<R>
where
    R: PaymentMethodRepository + ?Sized,
{
    fn create(&self, method: PaymentMethod) -> DomainResult<()> {
        (**self).create(method)
    }

    fn update(&self, method: PaymentMethod) -> DomainResult<()> {
        (**self).update(method)
    }

    fn delete(&self, id: PaymentMethodId) -> DomainResult<()> {
        (**self).delete(id)
    }

    fn find(&self, id: PaymentMethodId) -> DomainResult<Option<PaymentMethod>> {
        (**self).find(id)
    }

    fn list(&self) -> DomainResult<Vec<PaymentMethod>> {
        (**self).list()
    }

    fn actives(&self) -> DomainResult<Vec<PaymentMethod>> {
        (**self).actives()
    }
}

/// In-memory payment method store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPaymentMethodRepository {
    methods: RwLock<Vec<PaymentMethod>>,
}

impl InMemoryPaymentMethodRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PaymentMethodRepository for InMemoryPaymentMethodRepository {
    fn create(&self, method: PaymentMethod) -> DomainResult<()> {
        let mut methods = self
            .methods
            .write()
            .map_err(|_| DomainError::conflict("payment method lock poisoned"))?;

        if methods.iter().any(|m| m.same_entity_as(&method)) {
            return Err(DomainError::conflict(format!(
                "payment method {} already exists",
                method.id_typed()
            )));
        }
        methods.push(method);
        Ok(())
    }

    fn update(&self, method: PaymentMethod) -> DomainResult<()> {
        let mut methods = self
            .methods
            .write()
            .map_err(|_| DomainError::conflict("payment method lock poisoned"))?;

        let row = methods
            .iter_mut()
            .find(|m| m.same_entity_as(&method))
            .ok_or_else(|| {
                DomainError::not_found(format!("payment method {}", method.id_typed()))
            })?;
        *row = method;
        Ok(())
    }

    fn delete(&self, id: PaymentMethodId) -> DomainResult<()> {
        let mut methods = self
            .methods
            .write()
            .map_err(|_| DomainError::conflict("payment method lock poisoned"))?;

        let before = methods.len();
        methods.retain(|m| m.id_typed() != id);
        if methods.len() == before {
            return Err(DomainError::not_found(format!("payment method {id}")));
        }
        Ok(())
    }

    fn find(&self, id: PaymentMethodId) -> DomainResult<Option<PaymentMethod>> {
        let methods = self
            .methods
            .read()
            .map_err(|_| DomainError::conflict("payment method lock poisoned"))?;
        Ok(methods.iter().find(|m| m.id_typed() == id).cloned())
    }

    fn list(&self) -> DomainResult<Vec<PaymentMethod>> {
        let methods = self
            .methods
            .read()
            .map_err(|_| DomainError::conflict("payment method lock poisoned"))?;
        Ok(methods.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crud_round_trip() {
        let repo = InMemoryPaymentMethodRepository::new();
        let mut method = PaymentMethod::new("Cash", None).unwrap();
        let id = method.id_typed();

        repo.create(method.clone()).unwrap();
        assert_eq!(repo.find(id).unwrap().unwrap().name(), "Cash");

        method.rename("Cash on delivery").unwrap();
        repo.update(method).unwrap();
        assert_eq!(repo.find(id).unwrap().unwrap().name(), "Cash on delivery");

        repo.delete(id).unwrap();
        assert!(repo.find(id).unwrap().is_none());
        assert!(matches!(repo.delete(id), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn duplicate_create_conflicts() {
        let repo = InMemoryPaymentMethodRepository::new();
        let method = PaymentMethod::new("Cash", None).unwrap();
        repo.create(method.clone()).unwrap();
        assert!(matches!(repo.create(method), Err(DomainError::Conflict(_))));
    }

    #[test]
    fn update_of_missing_method_is_not_found() {
        let repo = InMemoryPaymentMethodRepository::new();
        let method = PaymentMethod::new("Cash", None).unwrap();
        assert!(matches!(repo.update(method), Err(DomainError::NotFound(_))));
    }

    #[test]
    fn actives_skips_disabled_methods() {
        let repo = Arc::new(InMemoryPaymentMethodRepository::new());
        let cash = PaymentMethod::new("Cash", None).unwrap();
        let mut card = PaymentMethod::new("Card", Some("plastic".to_string())).unwrap();
        card.disable();
        let wire = PaymentMethod::new("Wire transfer", None).unwrap();

        for m in [cash, card, wire] {
            repo.create(m).unwrap();
        }

        let names: Vec<_> = repo
            .actives()
            .unwrap()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["Cash", "Wire transfer"]);
        assert_eq!(repo.list().unwrap().len(), 3);
    }
}
