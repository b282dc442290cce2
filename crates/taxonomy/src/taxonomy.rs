use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, TaxonomyId};

use crate::slug;

/// A named, flat grouping that owns zero or more taxon trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    id: TaxonomyId,
    name: String,
    slug: String,
}

impl Taxonomy {
    /// Build a new, not yet persisted taxonomy.
    ///
    /// The slug is derived from `name` unless given explicitly.
    pub fn new(name: impl Into<String>, slug: Option<String>) -> DomainResult<Self> {
        let name = validate_name(name.into())?;
        let slug = match slug {
            Some(explicit) if explicit.trim().is_empty() => {
                return Err(DomainError::validation("taxonomy slug cannot be empty"));
            }
            Some(explicit) => explicit,
            None => slug::generate(&name),
        };

        if slug.is_empty() {
            return Err(DomainError::validation(format!(
                "taxonomy name '{name}' does not produce a usable slug"
            )));
        }

        Ok(Self {
            id: TaxonomyId::new(),
            name,
            slug,
        })
    }

    pub fn id_typed(&self) -> TaxonomyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Renaming keeps the slug; links built on it stay valid.
    pub(crate) fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        self.name = validate_name(name.into())?;
        Ok(())
    }
}

impl Entity for Taxonomy {
    type Id = TaxonomyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl From<&Taxonomy> for TaxonomyId {
    fn from(taxonomy: &Taxonomy) -> Self {
        taxonomy.id
    }
}

fn validate_name(name: String) -> DomainResult<String> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("taxonomy name cannot be empty"));
    }
    Ok(name)
}
