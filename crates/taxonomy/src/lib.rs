//! Taxonomy module: hierarchical product classification.
//!
//! A [`Taxonomy`] is a named grouping ("Category", "Brand", "Wine Regions")
//! owning any number of [`Taxon`] trees. The [`TaxonTree`] engine enforces the
//! tree invariants on write (sibling-scoped slugs, same-taxonomy parents, no
//! cycles, derived levels) and serves traversal and ordering on read. Storage
//! is abstracted behind [`CatalogRepository`]; [`InMemoryCatalogRepository`]
//! is the reference implementation.

pub mod memory;
pub mod query;
pub mod repository;
pub mod slug;
pub mod taxon;
pub mod taxonomy;
pub mod tree;

pub use memory::{InMemoryCatalog, InMemoryCatalogRepository};
pub use query::{TaxonQuery, sort_by_priority, sort_by_priority_reverse};
pub use repository::{CatalogRepository, ParentFilter, TaxonFilter, TaxonStore, TaxonomyStore};
pub use taxon::{NewTaxon, Taxon};
pub use taxonomy::Taxonomy;
pub use tree::TaxonTree;
