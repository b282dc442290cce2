//! Lazy, taxonomy-scoped taxon queries and priority ordering.

use tracing::debug;

use storefront_core::{DomainResult, TaxonId, TaxonomyId};

use crate::repository::{CatalogRepository, ParentFilter, TaxonFilter, TaxonStore};
use crate::taxon::Taxon;
use crate::tree::TaxonTree;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Order {
    Insertion,
    PriorityAsc,
    PriorityDesc,
}

/// A taxon query scoped to one taxonomy.
///
/// Nothing touches the store until [`get`](Self::get), [`first`](Self::first)
/// or [`count`](Self::count) is called.
///
/// ```ignore
/// let roots = tree.by_taxonomy(&category).roots().sort().get()?;
/// ```
#[derive(Debug)]
pub struct TaxonQuery<'a, R> {
    tree: &'a TaxonTree<R>,
    filter: TaxonFilter,
    except: Vec<TaxonId>,
    order: Order,
}

impl<'a, R> TaxonQuery<'a, R>
where
    R: CatalogRepository,
{
    pub(crate) fn new(tree: &'a TaxonTree<R>, taxonomy_id: TaxonomyId) -> Self {
        Self {
            tree,
            filter: TaxonFilter::taxonomy(taxonomy_id),
            except: Vec::new(),
            order: Order::Insertion,
        }
    }

    /// Root-level taxons only.
    pub fn roots(mut self) -> Self {
        self.filter.parent = ParentFilter::Root;
        self
    }

    /// Direct children of `parent` only.
    pub fn children_of(mut self, parent: impl Into<TaxonId>) -> Self {
        self.filter.parent = ParentFilter::Of(parent.into());
        self
    }

    /// Leave `taxon` out of the result.
    pub fn except(mut self, taxon: impl Into<TaxonId>) -> Self {
        self.except.push(taxon.into());
        self
    }

    /// Ascending priority; ties keep store order.
    pub fn sort(mut self) -> Self {
        self.order = Order::PriorityAsc;
        self
    }

    /// Descending priority; ties keep store order.
    pub fn sort_reverse(mut self) -> Self {
        self.order = Order::PriorityDesc;
        self
    }

    pub fn get(self) -> DomainResult<Vec<Taxon>> {
        let Self {
            tree,
            filter,
            except,
            order,
        } = self;

        let taxons: Vec<Taxon> = tree.repository().read(|store| {
            Ok(store
                .taxons(&filter)
                .into_iter()
                .filter(|t| !except.contains(&t.id_typed()))
                .collect())
        })?;

        debug!(taxonomy_id = ?filter.taxonomy_id, found = taxons.len(), "taxon query");

        Ok(match order {
            Order::Insertion => taxons,
            Order::PriorityAsc => sort_by_priority(taxons),
            Order::PriorityDesc => sort_by_priority_reverse(taxons),
        })
    }

    pub fn first(self) -> DomainResult<Option<Taxon>> {
        Ok(self.get()?.into_iter().next())
    }

    pub fn count(self) -> DomainResult<usize> {
        Ok(self.get()?.len())
    }
}

/// Order taxons by ascending priority. The sort is stable: equal priorities
/// keep their input order.
pub fn sort_by_priority(taxons: impl IntoIterator<Item = Taxon>) -> Vec<Taxon> {
    let mut taxons: Vec<Taxon> = taxons.into_iter().collect();
    taxons.sort_by_key(Taxon::priority);
    taxons
}

/// Order taxons by descending priority, stable for equal priorities.
pub fn sort_by_priority_reverse(taxons: impl IntoIterator<Item = Taxon>) -> Vec<Taxon> {
    let mut taxons: Vec<Taxon> = taxons.into_iter().collect();
    taxons.sort_by(|a, b| b.priority().cmp(&a.priority()));
    taxons
}
