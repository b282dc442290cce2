//! Persistence boundary for taxonomies and taxons.
//!
//! The tree engine never talks to a database directly. It runs its checks and
//! writes against a [`CatalogRepository`], which hands out a store for the
//! duration of one read or one atomic write.

use std::sync::Arc;

use storefront_core::{DomainResult, TaxonId, TaxonomyId};

use crate::taxon::Taxon;
use crate::taxonomy::Taxonomy;

/// Which parent a taxon filter matches.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum ParentFilter {
    /// No restriction on the parent.
    #[default]
    Any,
    /// Root-level taxons only (no parent).
    Root,
    /// Direct children of the given taxon.
    Of(TaxonId),
}

impl ParentFilter {
    /// The filter selecting the sibling group a node with `parent_id` lives in.
    pub fn group_of(parent_id: Option<TaxonId>) -> Self {
        match parent_id {
            Some(id) => Self::Of(id),
            None => Self::Root,
        }
    }

    pub fn matches(self, parent_id: Option<TaxonId>) -> bool {
        match self {
            Self::Any => true,
            Self::Root => parent_id.is_none(),
            Self::Of(id) => parent_id == Some(id),
        }
    }
}

/// find-by-filter criteria for taxons.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaxonFilter {
    pub taxonomy_id: Option<TaxonomyId>,
    pub parent: ParentFilter,
}

impl TaxonFilter {
    pub fn taxonomy(taxonomy_id: TaxonomyId) -> Self {
        Self {
            taxonomy_id: Some(taxonomy_id),
            parent: ParentFilter::Any,
        }
    }

    pub fn sibling_group(taxonomy_id: TaxonomyId, parent_id: Option<TaxonId>) -> Self {
        Self {
            taxonomy_id: Some(taxonomy_id),
            parent: ParentFilter::group_of(parent_id),
        }
    }

    pub fn children_of(parent_id: TaxonId) -> Self {
        Self {
            taxonomy_id: None,
            parent: ParentFilter::Of(parent_id),
        }
    }

    pub fn matches(&self, taxon: &Taxon) -> bool {
        self.taxonomy_id.is_none_or(|id| id == taxon.taxonomy_id())
            && self.parent.matches(taxon.parent_id())
    }
}

/// Taxonomy records.
///
/// Implementations enforce unique taxonomy slugs and must refuse to delete a
/// taxonomy that still owns taxons.
pub trait TaxonomyStore {
    fn taxonomy(&self, id: TaxonomyId) -> Option<Taxonomy>;
    fn taxonomies(&self) -> Vec<Taxonomy>;
    fn insert_taxonomy(&mut self, taxonomy: Taxonomy) -> DomainResult<()>;
    fn update_taxonomy(&mut self, taxonomy: Taxonomy) -> DomainResult<()>;
    fn delete_taxonomy(&mut self, id: TaxonomyId) -> DomainResult<()>;
}

/// Taxon records.
///
/// Implementations are the final authority on the `(taxonomy_id, parent_id,
/// slug)` unique constraint and on the taxonomy/parent references, and report
/// violations with the same error kinds the engine uses. `taxons` returns
/// records in insertion order.
pub trait TaxonStore {
    fn taxon(&self, id: TaxonId) -> Option<Taxon>;
    fn taxons(&self, filter: &TaxonFilter) -> Vec<Taxon>;
    fn insert_taxon(&mut self, taxon: Taxon) -> DomainResult<()>;
    fn update_taxon(&mut self, taxon: Taxon) -> DomainResult<()>;
    fn delete_taxon(&mut self, id: TaxonId) -> DomainResult<()>;
}

/// Transactional access to the catalog store.
///
/// `write` is all-or-nothing: when `work` returns an error nothing it did is
/// kept, and concurrent readers never observe a half-applied write.
pub trait CatalogRepository: Send + Sync {
    type Store: TaxonomyStore + TaxonStore;

    fn read<T>(&self, work: impl FnOnce(&Self::Store) -> DomainResult<T>) -> DomainResult<T>;

    fn write<T>(&self, work: impl FnOnce(&mut Self::Store) -> DomainResult<T>)
    -> DomainResult<T>;
}

impl<R> CatalogRepository for Arc<R>
where
    R: CatalogRepository,
{
    type Store = R::Store;

    fn read<T>(&self, work: impl FnOnce(&Self::Store) -> DomainResult<T>) -> DomainResult<T> {
        (**self).read(work)
    }

    fn write<T>(
        &self,
        work: impl FnOnce(&mut Self::Store) -> DomainResult<T>,
    ) -> DomainResult<T> {
        (**self).write(work)
    }
}
