use std::sync::RwLock;

use storefront_core::{DomainError, DomainResult, TaxonId, TaxonomyId};

use crate::repository::{CatalogRepository, TaxonFilter, TaxonStore, TaxonomyStore};
use crate::taxon::Taxon;
use crate::taxonomy::Taxonomy;

/// In-memory catalog tables.
///
/// Rows are kept in insertion order. Constraint checks mirror what the
/// relational schema declares: unique taxonomy slug, unique
/// `(taxonomy_id, parent_id, slug)`, and restricting foreign keys.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    taxonomies: Vec<Taxonomy>,
    taxons: Vec<Taxon>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn taxonomy_slug_taken(&self, slug: &str, except: TaxonomyId) -> bool {
        self.taxonomies
            .iter()
            .any(|t| t.slug() == slug && t.id_typed() != except)
    }

    fn taxon_slug_taken(&self, candidate: &Taxon) -> bool {
        self.taxons
            .iter()
            .any(|t| t.is_sibling_of(candidate) && t.slug() == candidate.slug())
    }

    fn check_taxon_references(&self, taxon: &Taxon) -> DomainResult<()> {
        if !self.taxonomies.iter().any(|t| t.id_typed() == taxon.taxonomy_id()) {
            return Err(DomainError::validation(format!(
                "taxonomy {} does not exist",
                taxon.taxonomy_id()
            )));
        }

        if let Some(parent_id) = taxon.parent_id() {
            match self.taxons.iter().find(|t| t.id_typed() == parent_id) {
                None => {
                    return Err(DomainError::validation(format!(
                        "parent taxon {parent_id} does not exist"
                    )));
                }
                Some(parent) if parent.taxonomy_id() != taxon.taxonomy_id() => {
                    return Err(DomainError::validation(
                        "parent taxon belongs to a different taxonomy",
                    ));
                }
                Some(_) => {}
            }
        }

        if self.taxon_slug_taken(taxon) {
            return Err(DomainError::uniqueness(format!(
                "slug '{}' is already used at this level of the taxonomy",
                taxon.slug()
            )));
        }

        Ok(())
    }
}

impl TaxonomyStore for InMemoryCatalog {
    fn taxonomy(&self, id: TaxonomyId) -> Option<Taxonomy> {
        self.taxonomies.iter().find(|t| t.id_typed() == id).cloned()
    }

    fn taxonomies(&self) -> Vec<Taxonomy> {
        self.taxonomies.clone()
    }

    fn insert_taxonomy(&mut self, taxonomy: Taxonomy) -> DomainResult<()> {
        if self.taxonomy(taxonomy.id_typed()).is_some() {
            return Err(DomainError::conflict(format!(
                "taxonomy {} already exists",
                taxonomy.id_typed()
            )));
        }
        if self.taxonomy_slug_taken(taxonomy.slug(), taxonomy.id_typed()) {
            return Err(DomainError::uniqueness(format!(
                "taxonomy slug '{}' is already taken",
                taxonomy.slug()
            )));
        }
        self.taxonomies.push(taxonomy);
        Ok(())
    }

    fn update_taxonomy(&mut self, taxonomy: Taxonomy) -> DomainResult<()> {
        if self.taxonomy_slug_taken(taxonomy.slug(), taxonomy.id_typed()) {
            return Err(DomainError::uniqueness(format!(
                "taxonomy slug '{}' is already taken",
                taxonomy.slug()
            )));
        }
        let row = self
            .taxonomies
            .iter_mut()
            .find(|t| t.id_typed() == taxonomy.id_typed())
            .ok_or_else(|| DomainError::not_found(format!("taxonomy {}", taxonomy.id_typed())))?;
        *row = taxonomy;
        Ok(())
    }

    fn delete_taxonomy(&mut self, id: TaxonomyId) -> DomainResult<()> {
        if self.taxons.iter().any(|t| t.taxonomy_id() == id) {
            return Err(DomainError::conflict(format!(
                "taxonomy {id} still owns taxons"
            )));
        }
        let before = self.taxonomies.len();
        self.taxonomies.retain(|t| t.id_typed() != id);
        if self.taxonomies.len() == before {
            return Err(DomainError::not_found(format!("taxonomy {id}")));
        }
        Ok(())
    }
}

impl TaxonStore for InMemoryCatalog {
    fn taxon(&self, id: TaxonId) -> Option<Taxon> {
        self.taxons.iter().find(|t| t.id_typed() == id).cloned()
    }

    fn taxons(&self, filter: &TaxonFilter) -> Vec<Taxon> {
        self.taxons
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    fn insert_taxon(&mut self, taxon: Taxon) -> DomainResult<()> {
        if self.taxon(taxon.id_typed()).is_some() {
            return Err(DomainError::conflict(format!(
                "taxon {} already exists",
                taxon.id_typed()
            )));
        }
        self.check_taxon_references(&taxon)?;
        self.taxons.push(taxon);
        Ok(())
    }

    fn update_taxon(&mut self, taxon: Taxon) -> DomainResult<()> {
        let index = self
            .taxons
            .iter()
            .position(|t| t.id_typed() == taxon.id_typed())
            .ok_or_else(|| DomainError::not_found(format!("taxon {}", taxon.id_typed())))?;

        if self.taxons[index].taxonomy_id() != taxon.taxonomy_id() {
            return Err(DomainError::validation(
                "a taxon cannot be moved to another taxonomy",
            ));
        }
        self.check_taxon_references(&taxon)?;
        self.taxons[index] = taxon;
        Ok(())
    }

    fn delete_taxon(&mut self, id: TaxonId) -> DomainResult<()> {
        if self.taxons.iter().any(|t| t.parent_id() == Some(id)) {
            return Err(DomainError::conflict(format!("taxon {id} still has children")));
        }
        let before = self.taxons.len();
        self.taxons.retain(|t| t.id_typed() != id);
        if self.taxons.len() == before {
            return Err(DomainError::not_found(format!("taxon {id}")));
        }
        Ok(())
    }
}

/// Lock-guarded in-memory repository for tests/dev.
///
/// Writes run against a private copy of the tables which replaces the shared
/// state only when the work succeeds.
#[derive(Debug, Default)]
pub struct InMemoryCatalogRepository {
    inner: RwLock<InMemoryCatalog>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogRepository for InMemoryCatalogRepository {
    type Store = InMemoryCatalog;

    fn read<T>(&self, work: impl FnOnce(&Self::Store) -> DomainResult<T>) -> DomainResult<T> {
        let catalog = self
            .inner
            .read()
            .map_err(|_| DomainError::conflict("catalog lock poisoned"))?;
        work(&catalog)
    }

    fn write<T>(
        &self,
        work: impl FnOnce(&mut Self::Store) -> DomainResult<T>,
    ) -> DomainResult<T> {
        let mut catalog = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("catalog lock poisoned"))?;

        let mut draft = catalog.clone();
        let out = work(&mut draft)?;
        *catalog = draft;
        Ok(out)
    }
}
