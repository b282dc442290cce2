use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, TaxonId, TaxonomyId};

/// A single node of a taxonomy's hierarchy (e.g. a category).
///
/// `level` is derived from the parent chain and only changes together with
/// `parent_id`; there is no way to set it on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxon {
    id: TaxonId,
    taxonomy_id: TaxonomyId,
    parent_id: Option<TaxonId>,
    name: String,
    slug: String,
    priority: i32,
    level: u32,
}

impl Taxon {
    pub fn id_typed(&self) -> TaxonId {
        self.id
    }

    pub fn taxonomy_id(&self) -> TaxonomyId {
        self.taxonomy_id
    }

    pub fn parent_id(&self) -> Option<TaxonId> {
        self.parent_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Depth in the tree; roots are at level 0.
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_root_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Whether `other` belongs to the same sibling group (same taxonomy, same
    /// parent, roots counting as one group).
    pub fn is_sibling_of(&self, other: &Taxon) -> bool {
        self.id != other.id
            && self.taxonomy_id == other.taxonomy_id
            && self.parent_id == other.parent_id
    }

    /// Move under `parent` (or to the root level), recomputing the level.
    pub(crate) fn place_under(&mut self, parent: Option<&Taxon>) {
        match parent {
            Some(parent) => {
                self.parent_id = Some(parent.id);
                self.level = parent.level + 1;
            }
            None => {
                self.parent_id = None;
                self.level = 0;
            }
        }
    }

    pub(crate) fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        self.name = validate_name(name.into())?;
        Ok(())
    }

    pub(crate) fn set_slug(&mut self, slug: String) {
        self.slug = slug;
    }

    pub(crate) fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }
}

impl Entity for Taxon {
    type Id = TaxonId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl From<&Taxon> for TaxonId {
    fn from(taxon: &Taxon) -> Self {
        taxon.id
    }
}

/// Input for creating a taxon.
///
/// The taxonomy and name are required; everything else is optional. Slug,
/// level and id are filled in by [`crate::TaxonTree::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaxon {
    pub taxonomy_id: TaxonomyId,
    pub name: String,
    pub parent_id: Option<TaxonId>,
    pub slug: Option<String>,
    pub priority: i32,
}

impl NewTaxon {
    pub fn new(taxonomy: impl Into<TaxonomyId>, name: impl Into<String>) -> Self {
        Self {
            taxonomy_id: taxonomy.into(),
            name: name.into(),
            parent_id: None,
            slug: None,
            priority: 0,
        }
    }

    pub fn parent(mut self, parent: impl Into<TaxonId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Materialize the node once slug and parent have been resolved.
    pub(crate) fn into_taxon(self, slug: String, parent: Option<&Taxon>) -> DomainResult<Taxon> {
        let mut taxon = Taxon {
            id: TaxonId::new(),
            taxonomy_id: self.taxonomy_id,
            parent_id: None,
            name: validate_name(self.name)?,
            slug,
            priority: self.priority,
            level: 0,
        };
        taxon.place_under(parent);
        Ok(taxon)
    }
}

pub(crate) fn validate_name(name: String) -> DomainResult<String> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("taxon name cannot be empty"));
    }
    Ok(name)
}
