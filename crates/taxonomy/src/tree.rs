//! Taxon tree engine: invariant-checked writes and traversals.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use storefront_core::{DomainError, DomainResult, TaxonId, TaxonomyId};

use crate::query::TaxonQuery;
use crate::repository::{CatalogRepository, TaxonFilter, TaxonStore, TaxonomyStore};
use crate::slug;
use crate::taxon::{NewTaxon, Taxon};
use crate::taxonomy::Taxonomy;

/// Operations over taxonomies and their taxon trees.
///
/// Every structural mutation runs inside a single [`CatalogRepository::write`]
/// so uniqueness checks, cycle checks and subtree level updates commit
/// together or not at all.
///
/// Levels are maintained eagerly: moving a node rewrites the level of the
/// node and of every node below it.
#[derive(Debug)]
pub struct TaxonTree<R> {
    repo: R,
}

impl<R> TaxonTree<R>
where
    R: CatalogRepository,
{
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    // ---- taxonomies ------------------------------------------------------

    pub fn create_taxonomy(&self, name: &str, slug: Option<&str>) -> DomainResult<Taxonomy> {
        let taxonomy = Taxonomy::new(name, slug.map(str::to_string))?;
        self.repo.write(|store| store.insert_taxonomy(taxonomy.clone()))?;
        info!(taxonomy_id = %taxonomy.id_typed(), slug = taxonomy.slug(), "taxonomy created");
        Ok(taxonomy)
    }

    pub fn taxonomy(&self, id: TaxonomyId) -> DomainResult<Taxonomy> {
        self.repo.read(|store| {
            store
                .taxonomy(id)
                .ok_or_else(|| DomainError::not_found(format!("taxonomy {id}")))
        })
    }

    pub fn find_taxonomy_by_name(&self, name: &str) -> DomainResult<Option<Taxonomy>> {
        self.repo
            .read(|store| Ok(store.taxonomies().into_iter().find(|t| t.name() == name)))
    }

    pub fn taxonomies(&self) -> DomainResult<Vec<Taxonomy>> {
        self.repo.read(|store| Ok(store.taxonomies()))
    }

    pub fn rename_taxonomy(&self, id: TaxonomyId, name: &str) -> DomainResult<Taxonomy> {
        self.repo.write(|store| {
            let mut taxonomy = store
                .taxonomy(id)
                .ok_or_else(|| DomainError::not_found(format!("taxonomy {id}")))?;
            taxonomy.rename(name)?;
            store.update_taxonomy(taxonomy.clone())?;
            Ok(taxonomy)
        })
    }

    /// Deletes an empty taxonomy. Taxonomies that still own taxons are
    /// rejected with [`DomainError::Conflict`]; nodes are never orphaned.
    pub fn delete_taxonomy(&self, id: TaxonomyId) -> DomainResult<()> {
        self.repo.write(|store| {
            if !store.taxons(&TaxonFilter::taxonomy(id)).is_empty() {
                warn!(taxonomy_id = %id, "refusing to delete taxonomy that owns taxons");
                return Err(DomainError::conflict(format!(
                    "taxonomy {id} still owns taxons; delete them first"
                )));
            }
            store.delete_taxonomy(id)
        })?;
        info!(taxonomy_id = %id, "taxonomy deleted");
        Ok(())
    }

    // ---- taxon writes ----------------------------------------------------

    /// Create a taxon.
    ///
    /// Fails with `Validation` for an empty name, an unknown taxonomy, or a
    /// parent that is missing or lives in another taxonomy, and with
    /// `Uniqueness` when the slug is already used in the sibling group.
    pub fn create(&self, new: NewTaxon) -> DomainResult<Taxon> {
        let taxon = self.repo.write(|store| {
            if store.taxonomy(new.taxonomy_id).is_none() {
                return Err(DomainError::validation(format!(
                    "taxonomy {} does not exist",
                    new.taxonomy_id
                )));
            }

            let parent = match new.parent_id {
                Some(parent_id) => {
                    let parent = store.taxon(parent_id).ok_or_else(|| {
                        DomainError::validation(format!("parent taxon {parent_id} does not exist"))
                    })?;
                    if parent.taxonomy_id() != new.taxonomy_id {
                        return Err(DomainError::validation(
                            "parent taxon belongs to a different taxonomy",
                        ));
                    }
                    Some(parent)
                }
                None => None,
            };

            let slug = resolve_slug(new.slug.as_deref(), &new.name)?;
            let taxon = new.into_taxon(slug, parent.as_ref())?;
            ensure_slug_free(&*store, &taxon)?;
            store.insert_taxon(taxon.clone())?;
            Ok(taxon)
        })?;

        info!(
            taxon_id = %taxon.id_typed(),
            taxonomy_id = %taxon.taxonomy_id(),
            slug = taxon.slug(),
            level = taxon.level(),
            "taxon created"
        );
        Ok(taxon)
    }

    /// Move `node` (with its subtree) under `parent`.
    ///
    /// Rejected with `Validation` when the parent is the node itself, one of
    /// its descendants, or in another taxonomy. On any failure the tree is
    /// left unchanged.
    pub fn attach_parent(&self, node: TaxonId, parent: TaxonId) -> DomainResult<Taxon> {
        let moved = self.repo.write(|store| {
            let mut taxon = load(&*store, node)?;
            let parent = load(&*store, parent)?;

            if parent.id_typed() == taxon.id_typed() {
                return Err(DomainError::validation("a taxon cannot be its own parent"));
            }
            if parent.taxonomy_id() != taxon.taxonomy_id() {
                return Err(DomainError::validation(
                    "parent taxon belongs to a different taxonomy",
                ));
            }
            if ancestor_chain(&*store, &parent)?
                .iter()
                .any(|a| a.id_typed() == taxon.id_typed())
            {
                return Err(DomainError::validation(format!(
                    "taxon {} is a descendant of {}; attaching would create a cycle",
                    parent.id_typed(),
                    taxon.id_typed()
                )));
            }
            if taxon.parent_id() == Some(parent.id_typed()) {
                return Ok(taxon);
            }

            taxon.place_under(Some(&parent));
            ensure_slug_free(&*store, &taxon)?;
            store.update_taxon(taxon.clone())?;
            relevel_subtree(store, &taxon)?;
            Ok(taxon)
        })?;

        info!(
            taxon_id = %moved.id_typed(),
            parent_id = ?moved.parent_id(),
            level = moved.level(),
            "taxon attached"
        );
        Ok(moved)
    }

    /// Make `node` a root of its taxonomy.
    pub fn detach_parent(&self, node: TaxonId) -> DomainResult<Taxon> {
        let moved = self.repo.write(|store| {
            let mut taxon = load(&*store, node)?;
            if taxon.is_root_level() {
                return Ok(taxon);
            }

            taxon.place_under(None);
            ensure_slug_free(&*store, &taxon)?;
            store.update_taxon(taxon.clone())?;
            relevel_subtree(store, &taxon)?;
            Ok(taxon)
        })?;

        info!(taxon_id = %moved.id_typed(), "taxon detached to root level");
        Ok(moved)
    }

    pub fn rename(&self, id: TaxonId, name: &str) -> DomainResult<Taxon> {
        self.repo.write(|store| {
            let mut taxon = load(&*store, id)?;
            taxon.rename(name)?;
            store.update_taxon(taxon.clone())?;
            Ok(taxon)
        })
    }

    pub fn set_priority(&self, id: TaxonId, priority: i32) -> DomainResult<Taxon> {
        self.repo.write(|store| {
            let mut taxon = load(&*store, id)?;
            taxon.set_priority(priority);
            store.update_taxon(taxon.clone())?;
            Ok(taxon)
        })
    }

    /// Replace the slug; the new one must be free in the sibling group.
    pub fn set_slug(&self, id: TaxonId, slug: &str) -> DomainResult<Taxon> {
        self.repo.write(|store| {
            let mut taxon = load(&*store, id)?;
            taxon.set_slug(resolve_slug(Some(slug), taxon.name())?);
            ensure_slug_free(&*store, &taxon)?;
            store.update_taxon(taxon.clone())?;
            Ok(taxon)
        })
    }

    /// Deletes a leaf taxon. Nodes with children are rejected with
    /// [`DomainError::Conflict`]; move or delete the children first.
    pub fn delete(&self, id: TaxonId) -> DomainResult<()> {
        self.repo.write(|store| {
            load(&*store, id)?;
            if !store.taxons(&TaxonFilter::children_of(id)).is_empty() {
                warn!(taxon_id = %id, "refusing to delete taxon with children");
                return Err(DomainError::conflict(format!("taxon {id} still has children")));
            }
            store.delete_taxon(id)
        })?;
        info!(taxon_id = %id, "taxon deleted");
        Ok(())
    }

    // ---- taxon reads -----------------------------------------------------

    pub fn taxon(&self, id: TaxonId) -> DomainResult<Taxon> {
        self.repo.read(|store| load(&*store, id))
    }

    /// Ancestors of `node`, root first, immediate parent last. Empty for roots.
    ///
    /// Fails with `Integrity` if the stored parent links form a cycle or point
    /// at a missing node.
    pub fn ancestors(&self, node: TaxonId) -> DomainResult<Vec<Taxon>> {
        self.repo.read(|store| {
            let taxon = load(&*store, node)?;
            let mut chain = ancestor_chain(&*store, &taxon)?;
            chain.reverse();
            Ok(chain)
        })
    }

    /// Direct children, in no guaranteed order.
    pub fn children(&self, node: TaxonId) -> DomainResult<Vec<Taxon>> {
        self.repo.read(|store| {
            load(&*store, node)?;
            Ok(store.taxons(&TaxonFilter::children_of(node)))
        })
    }

    /// Every node below `node`, depth-first pre-order.
    pub fn descendants(&self, node: TaxonId) -> DomainResult<Vec<Taxon>> {
        self.repo.read(|store| {
            let taxon = load(&*store, node)?;
            subtree(&*store, &taxon)
        })
    }

    /// Other members of the node's sibling group.
    pub fn siblings(&self, node: TaxonId) -> DomainResult<Vec<Taxon>> {
        self.repo.read(|store| {
            let taxon = load(&*store, node)?;
            let group = TaxonFilter::sibling_group(taxon.taxonomy_id(), taxon.parent_id());
            Ok(store
                .taxons(&group)
                .into_iter()
                .filter(|t| t.id_typed() != node)
                .collect())
        })
    }

    /// Lazily scoped query over one taxonomy; accepts a `&Taxonomy` or its id.
    pub fn by_taxonomy(&self, taxonomy: impl Into<TaxonomyId>) -> TaxonQuery<'_, R> {
        TaxonQuery::new(self, taxonomy.into())
    }

    /// Root-level taxon with the given slug.
    pub fn find_by_taxonomy_and_slug(
        &self,
        taxonomy: impl Into<TaxonomyId>,
        slug: &str,
    ) -> DomainResult<Option<Taxon>> {
        self.find_by_path(taxonomy, &[slug])
    }

    /// Resolve a node by its slug path from the root, e.g.
    /// `["accessories", "docking-stations"]`. An empty path matches nothing.
    pub fn find_by_path(
        &self,
        taxonomy: impl Into<TaxonomyId>,
        path: &[&str],
    ) -> DomainResult<Option<Taxon>> {
        let taxonomy_id = taxonomy.into();
        self.repo.read(|store| {
            let mut current: Option<Taxon> = None;
            for segment in path {
                let group = TaxonFilter::sibling_group(
                    taxonomy_id,
                    current.as_ref().map(Taxon::id_typed),
                );
                match store.taxons(&group).into_iter().find(|t| t.slug() == *segment) {
                    Some(found) => current = Some(found),
                    None => return Ok(None),
                }
            }
            Ok(current)
        })
    }
}

fn load<S>(store: &S, id: TaxonId) -> DomainResult<Taxon>
where
    S: TaxonStore + ?Sized,
{
    store
        .taxon(id)
        .ok_or_else(|| DomainError::not_found(format!("taxon {id}")))
}

fn resolve_slug(explicit: Option<&str>, name: &str) -> DomainResult<String> {
    let slug = match explicit {
        Some(explicit) if explicit.trim().is_empty() => {
            return Err(DomainError::validation("taxon slug cannot be empty"));
        }
        Some(explicit) => explicit.to_string(),
        None => slug::generate(name),
    };
    if slug.is_empty() {
        return Err(DomainError::validation(format!(
            "taxon name '{name}' does not produce a usable slug"
        )));
    }
    Ok(slug)
}

fn ensure_slug_free<S>(store: &S, taxon: &Taxon) -> DomainResult<()>
where
    S: TaxonStore + ?Sized,
{
    let group = TaxonFilter::sibling_group(taxon.taxonomy_id(), taxon.parent_id());
    let taken = store
        .taxons(&group)
        .iter()
        .any(|t| t.id_typed() != taxon.id_typed() && t.slug() == taxon.slug());

    if taken {
        warn!(
            taxonomy_id = %taxon.taxonomy_id(),
            slug = taxon.slug(),
            "slug collision in sibling group"
        );
        return Err(DomainError::uniqueness(format!(
            "slug '{}' is already used at this level of the taxonomy",
            taxon.slug()
        )));
    }
    Ok(())
}

/// Ancestors of `taxon`, immediate parent first.
fn ancestor_chain<S>(store: &S, taxon: &Taxon) -> DomainResult<Vec<Taxon>>
where
    S: TaxonStore + ?Sized,
{
    let mut visited = HashSet::from([taxon.id_typed()]);
    let mut chain = Vec::new();
    let mut next = taxon.parent_id();

    while let Some(parent_id) = next {
        if !visited.insert(parent_id) {
            return Err(DomainError::integrity(format!(
                "cycle detected in the parent chain of taxon {}",
                taxon.id_typed()
            )));
        }
        let parent = store.taxon(parent_id).ok_or_else(|| {
            DomainError::integrity(format!("taxon {parent_id} is referenced as parent but missing"))
        })?;
        next = parent.parent_id();
        chain.push(parent);
    }

    debug!(taxon_id = %taxon.id_typed(), depth = chain.len(), "walked ancestor chain");
    Ok(chain)
}

/// Every node below `root` in depth-first pre-order (root excluded).
fn subtree<S>(store: &S, root: &Taxon) -> DomainResult<Vec<Taxon>>
where
    S: TaxonStore + ?Sized,
{
    let mut visited = HashSet::from([root.id_typed()]);
    let mut out = Vec::new();
    // Children are pushed reversed so the first child is popped first.
    let mut stack: Vec<Taxon> = store
        .taxons(&TaxonFilter::children_of(root.id_typed()))
        .into_iter()
        .rev()
        .collect();

    while let Some(node) = stack.pop() {
        if !visited.insert(node.id_typed()) {
            return Err(DomainError::integrity(format!(
                "cycle detected below taxon {}",
                root.id_typed()
            )));
        }
        stack.extend(
            store
                .taxons(&TaxonFilter::children_of(node.id_typed()))
                .into_iter()
                .rev(),
        );
        out.push(node);
    }

    Ok(out)
}

/// Recompute levels below `root` after it moved.
fn relevel_subtree<S>(store: &mut S, root: &Taxon) -> DomainResult<()>
where
    S: TaxonStore + ?Sized,
{
    let mut visited = HashSet::from([root.id_typed()]);
    let mut stack = vec![root.clone()];
    let mut updated = 0usize;

    while let Some(parent) = stack.pop() {
        for mut child in store.taxons(&TaxonFilter::children_of(parent.id_typed())) {
            if !visited.insert(child.id_typed()) {
                return Err(DomainError::integrity(format!(
                    "cycle detected below taxon {}",
                    root.id_typed()
                )));
            }
            child.place_under(Some(&parent));
            store.update_taxon(child.clone())?;
            updated += 1;
            stack.push(child);
        }
    }

    debug!(taxon_id = %root.id_typed(), updated, "recomputed subtree levels");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryCatalogRepository;

    fn tree() -> TaxonTree<InMemoryCatalogRepository> {
        TaxonTree::new(InMemoryCatalogRepository::new())
    }

    fn names(taxons: &[Taxon]) -> Vec<&str> {
        taxons.iter().map(Taxon::name).collect()
    }

    #[test]
    fn slug_is_autogenerated_from_name() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let taxon = tree.create(NewTaxon::new(&category, "Example Taxon")).unwrap();
        assert_eq!(taxon.slug(), "example-taxon");
    }

    #[test]
    fn slug_can_be_explicitly_set() {
        let tree = tree();
        let regions = tree.create_taxonomy("Wine Regions", None).unwrap();
        let taxon = tree
            .create(NewTaxon::new(&regions, "Carcavelos DOC").slug("carcavelos"))
            .unwrap();
        assert_eq!(taxon.slug(), "carcavelos");
    }

    #[test]
    fn create_rejects_empty_name() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let err = tree.create(NewTaxon::new(&category, "  ")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn create_rejects_unknown_taxonomy() {
        let tree = tree();
        let err = tree
            .create(NewTaxon::new(TaxonomyId::new(), "Tokaj"))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn create_rejects_parent_from_another_taxonomy() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let brand = tree.create_taxonomy("Brand", None).unwrap();
        let root = tree.create(NewTaxon::new(&category, "Root")).unwrap();

        let err = tree
            .create(NewTaxon::new(&brand, "Child").parent(&root))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn same_slug_can_be_used_in_another_taxonomy() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let regions = tree.create_taxonomy("Regions", None).unwrap();

        let a = tree.create(NewTaxon::new(&category, "Domestic")).unwrap();
        let b = tree.create(NewTaxon::new(&regions, "Domestic")).unwrap();
        assert_eq!(a.slug(), "domestic");
        assert_eq!(b.slug(), "domestic");
    }

    #[test]
    fn same_slug_can_be_used_on_another_level() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let a = tree.create(NewTaxon::new(&category, "Docking Stations")).unwrap();
        let b = tree
            .create(NewTaxon::new(&category, "Docking Stations").parent(&a))
            .unwrap();
        assert_eq!(a.slug(), b.slug());
    }

    #[test]
    fn slugs_must_be_unique_within_a_sibling_group() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let root = tree.create(NewTaxon::new(&category, "Accessories")).unwrap();
        tree.create(NewTaxon::new(&category, "Docking Stations").parent(&root))
            .unwrap();

        let err = tree
            .create(NewTaxon::new(&category, "Docking Stations").parent(&root))
            .unwrap_err();
        assert!(err.is_uniqueness());
        assert_eq!(tree.children(root.id_typed()).unwrap().len(), 1);
    }

    #[test]
    fn taxons_can_tell_their_level_in_the_tree() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();

        let root1 = tree.create(NewTaxon::new(&category, "Root 1")).unwrap();
        let root2 = tree.create(NewTaxon::new(&category, "Root 2")).unwrap();
        let r1c1 = tree
            .create(NewTaxon::new(&category, "Root 1 Child 1").parent(&root1))
            .unwrap();
        let r1c2 = tree
            .create(NewTaxon::new(&category, "Root 1 Child 2").parent(&root1))
            .unwrap();
        let r1c2c1 = tree
            .create(NewTaxon::new(&category, "Root 1 Child 2 Child 1").parent(&r1c2))
            .unwrap();
        let r1c2c1c1 = tree
            .create(NewTaxon::new(&category, "Root 1 Child 2 Child 1 Child 1").parent(&r1c2c1))
            .unwrap();
        let r2c1 = tree
            .create(NewTaxon::new(&category, "Root 2 Child 1").parent(&root2))
            .unwrap();

        assert_eq!(root1.level(), 0);
        assert_eq!(r1c1.level(), 1);
        assert_eq!(r1c2.level(), 1);
        assert_eq!(r1c2c1.level(), 2);
        assert_eq!(r1c2c1c1.level(), 3);
        assert_eq!(root2.level(), 0);
        assert_eq!(r2c1.level(), 1);
    }

    #[test]
    fn ancestors_are_listed_root_first() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let root = tree.create(NewTaxon::new(&category, "root")).unwrap();
        let c1 = tree.create(NewTaxon::new(&category, "child_1").parent(&root)).unwrap();
        let c2 = tree.create(NewTaxon::new(&category, "child_2").parent(&c1)).unwrap();
        let c3 = tree.create(NewTaxon::new(&category, "child_3").parent(&c2)).unwrap();

        assert!(tree.ancestors(root.id_typed()).unwrap().is_empty());
        assert_eq!(names(&tree.ancestors(c1.id_typed()).unwrap()), vec!["root"]);
        assert_eq!(
            names(&tree.ancestors(c3.id_typed()).unwrap()),
            vec!["root", "child_1", "child_2"]
        );
    }

    #[test]
    fn changing_the_parent_is_reflected_in_ancestors_and_level() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let root = tree.create(NewTaxon::new(&category, "root")).unwrap();
        let c1 = tree.create(NewTaxon::new(&category, "child_1").parent(&root)).unwrap();
        let c2 = tree.create(NewTaxon::new(&category, "child_2").parent(&c1)).unwrap();

        assert_eq!(c1.level(), 1);
        assert_eq!(c2.level(), 2);

        let c1 = tree.detach_parent(c1.id_typed()).unwrap();
        assert_eq!(c1.level(), 0);
        assert!(c1.is_root_level());
        assert!(tree.ancestors(c1.id_typed()).unwrap().is_empty());

        let c2 = tree.attach_parent(c2.id_typed(), root.id_typed()).unwrap();
        assert_eq!(c2.level(), 1);
        assert_eq!(names(&tree.ancestors(c2.id_typed()).unwrap()), vec!["root"]);
    }

    #[test]
    fn moving_a_node_relevels_its_whole_subtree() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let a = tree.create(NewTaxon::new(&category, "A")).unwrap();
        let b = tree.create(NewTaxon::new(&category, "B").parent(&a)).unwrap();
        let c = tree.create(NewTaxon::new(&category, "C").parent(&b)).unwrap();
        let d = tree.create(NewTaxon::new(&category, "D").parent(&c)).unwrap();
        let other = tree.create(NewTaxon::new(&category, "Other")).unwrap();

        tree.detach_parent(b.id_typed()).unwrap();
        assert_eq!(tree.taxon(c.id_typed()).unwrap().level(), 1);
        assert_eq!(tree.taxon(d.id_typed()).unwrap().level(), 2);

        tree.attach_parent(b.id_typed(), other.id_typed()).unwrap();
        assert_eq!(tree.taxon(b.id_typed()).unwrap().level(), 1);
        assert_eq!(tree.taxon(c.id_typed()).unwrap().level(), 2);
        assert_eq!(tree.taxon(d.id_typed()).unwrap().level(), 3);
    }

    #[test]
    fn attaching_under_a_descendant_is_rejected_and_changes_nothing() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let a = tree.create(NewTaxon::new(&category, "A")).unwrap();
        let b = tree.create(NewTaxon::new(&category, "B").parent(&a)).unwrap();
        let c = tree.create(NewTaxon::new(&category, "C").parent(&b)).unwrap();

        let before = tree.by_taxonomy(&category).get().unwrap();

        let err = tree.attach_parent(a.id_typed(), c.id_typed()).unwrap_err();
        assert!(err.is_validation());
        let err = tree.attach_parent(a.id_typed(), a.id_typed()).unwrap_err();
        assert!(err.is_validation());

        assert_eq!(tree.by_taxonomy(&category).get().unwrap(), before);
    }

    #[test]
    fn attaching_across_taxonomies_is_rejected() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let brand = tree.create_taxonomy("Brand", None).unwrap();
        let a = tree.create(NewTaxon::new(&category, "A")).unwrap();
        let b = tree.create(NewTaxon::new(&brand, "B")).unwrap();

        let err = tree.attach_parent(a.id_typed(), b.id_typed()).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(tree.taxon(a.id_typed()).unwrap().taxonomy_id(), category.id_typed());
    }

    #[test]
    fn moving_into_a_group_with_the_same_slug_is_rejected() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let root = tree.create(NewTaxon::new(&category, "Cables")).unwrap();
        let nested = tree
            .create(NewTaxon::new(&category, "Cables").parent(&root))
            .unwrap();

        let err = tree.detach_parent(nested.id_typed()).unwrap_err();
        assert!(err.is_uniqueness());
        assert_eq!(tree.taxon(nested.id_typed()).unwrap().level(), 1);
    }

    #[test]
    fn taxons_can_tell_if_they_are_root_level() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let root = tree.create(NewTaxon::new(&category, "Parent")).unwrap();
        let child = tree.create(NewTaxon::new(&category, "Child").parent(&root)).unwrap();

        assert!(root.is_root_level());
        assert!(!child.is_root_level());
        assert!(tree.detach_parent(child.id_typed()).unwrap().is_root_level());
    }

    #[test]
    fn corrupted_parent_links_surface_as_integrity_errors() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let a = tree.create(NewTaxon::new(&category, "A")).unwrap();
        let b = tree.create(NewTaxon::new(&category, "B").parent(&a)).unwrap();

        // Bypass the engine: A's parent becomes B while B's parent is A.
        tree.repository()
            .write(|store| {
                let mut a = store.taxon(a.id_typed()).unwrap();
                a.place_under(Some(&b));
                store.update_taxon(a)
            })
            .unwrap();

        let err = tree.ancestors(a.id_typed()).unwrap_err();
        assert!(err.is_integrity(), "{err}");
        let err = tree.descendants(a.id_typed()).unwrap_err();
        assert!(err.is_integrity(), "{err}");
    }

    #[test]
    fn children_descendants_and_siblings() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let parent = tree.create(NewTaxon::new(&category, "Parent")).unwrap();
        let c1 = tree.create(NewTaxon::new(&category, "Child 1").parent(&parent)).unwrap();
        tree.create(NewTaxon::new(&category, "Child 2").parent(&parent)).unwrap();
        tree.create(NewTaxon::new(&category, "Child 3").parent(&parent)).unwrap();
        tree.create(NewTaxon::new(&category, "Grandchild").parent(&c1)).unwrap();

        assert_eq!(tree.children(parent.id_typed()).unwrap().len(), 3);
        assert_eq!(
            names(&tree.descendants(parent.id_typed()).unwrap()),
            vec!["Child 1", "Grandchild", "Child 2", "Child 3"]
        );
        assert_eq!(
            names(&tree.siblings(c1.id_typed()).unwrap()),
            vec!["Child 2", "Child 3"]
        );
    }

    #[test]
    fn deleting_a_parent_is_rejected() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let parent = tree.create(NewTaxon::new(&category, "Parent")).unwrap();
        let child = tree.create(NewTaxon::new(&category, "Child").parent(&parent)).unwrap();

        assert!(matches!(
            tree.delete(parent.id_typed()),
            Err(DomainError::Conflict(_))
        ));
        tree.delete(child.id_typed()).unwrap();
        tree.delete(parent.id_typed()).unwrap();
        assert!(matches!(
            tree.taxon(parent.id_typed()),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn deleting_a_non_empty_taxonomy_is_rejected() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let taxon = tree.create(NewTaxon::new(&category, "Cat 1")).unwrap();

        assert!(matches!(
            tree.delete_taxonomy(category.id_typed()),
            Err(DomainError::Conflict(_))
        ));
        tree.delete(taxon.id_typed()).unwrap();
        tree.delete_taxonomy(category.id_typed()).unwrap();
        assert!(tree.taxonomies().unwrap().is_empty());
    }

    #[test]
    fn field_updates() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let root = tree.create(NewTaxon::new(&category, "Phones")).unwrap();
        tree.create(NewTaxon::new(&category, "Tablets")).unwrap();

        let renamed = tree.rename(root.id_typed(), "Smartphones").unwrap();
        assert_eq!(renamed.name(), "Smartphones");
        assert_eq!(renamed.slug(), "phones");

        assert_eq!(tree.set_priority(root.id_typed(), 7).unwrap().priority(), 7);

        let err = tree.set_slug(root.id_typed(), "tablets").unwrap_err();
        assert!(err.is_uniqueness());
        assert_eq!(
            tree.set_slug(root.id_typed(), "smartphones").unwrap().slug(),
            "smartphones"
        );
    }

    #[test]
    fn find_by_slug_and_path() {
        let tree = tree();
        let category = tree.create_taxonomy("Category", None).unwrap();
        let root = tree.create(NewTaxon::new(&category, "Accessories")).unwrap();
        let docks = tree
            .create(NewTaxon::new(&category, "Docking Stations").parent(&root))
            .unwrap();

        let found = tree
            .find_by_taxonomy_and_slug(&category, "accessories")
            .unwrap()
            .unwrap();
        assert_eq!(found.id_typed(), root.id_typed());

        // Not a root.
        assert!(
            tree.find_by_taxonomy_and_slug(&category, "docking-stations")
                .unwrap()
                .is_none()
        );

        let found = tree
            .find_by_path(&category, &["accessories", "docking-stations"])
            .unwrap()
            .unwrap();
        assert_eq!(found.id_typed(), docks.id_typed());
        assert!(tree.find_by_path(&category, &[]).unwrap().is_none());
    }

    #[test]
    fn taxonomy_lookup_and_rename() {
        let tree = tree();
        let gadgets = tree.create_taxonomy("Gadgets", None).unwrap();

        let found = tree.find_taxonomy_by_name("Gadgets").unwrap().unwrap();
        assert_eq!(found.id_typed(), gadgets.id_typed());
        assert!(tree.find_taxonomy_by_name("Nope").unwrap().is_none());

        let renamed = tree.rename_taxonomy(gadgets.id_typed(), "Devices").unwrap();
        assert_eq!(renamed.slug(), "gadgets");
        assert_eq!(tree.taxonomy(gadgets.id_typed()).unwrap().name(), "Devices");
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 64,
                ..ProptestConfig::default()
            })]

            /// Property: a chain built through nested parents has level == depth.
            #[test]
            fn level_equals_depth(depth in 0usize..12) {
                let tree = tree();
                let category = tree.create_taxonomy("Category", None).unwrap();
                let mut node = tree.create(NewTaxon::new(&category, "Level 0")).unwrap();
                for d in 1..=depth {
                    node = tree
                        .create(NewTaxon::new(&category, format!("Level {d}")).parent(&node))
                        .unwrap();
                }
                prop_assert_eq!(node.level() as usize, depth);
                prop_assert_eq!(tree.ancestors(node.id_typed()).unwrap().len(), depth);
            }

            /// Property: detaching any node of a chain makes it a level-0 root.
            #[test]
            fn detach_always_yields_root(depth in 1usize..8, pick in 0usize..8) {
                let tree = tree();
                let category = tree.create_taxonomy("Category", None).unwrap();
                let mut chain = vec![tree.create(NewTaxon::new(&category, "Node 0")).unwrap()];
                for d in 1..=depth {
                    let parent = chain.last().unwrap().clone();
                    chain.push(
                        tree.create(NewTaxon::new(&category, format!("Node {d}")).parent(&parent))
                            .unwrap(),
                    );
                }
                let target = &chain[pick % chain.len()];
                let detached = tree.detach_parent(target.id_typed()).unwrap();
                prop_assert_eq!(detached.level(), 0);
                prop_assert!(detached.is_root_level());
            }
        }
    }
}
