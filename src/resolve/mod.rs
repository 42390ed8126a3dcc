//! Path resolution and attribute visibility.
//!
//! [`GraphResolver`] computes, for a data set, which entity-link paths are
//! reachable and which attributes are visible at each. Resolution is a pure
//! function of the immutable model and the data set's overrides: it never
//! fails, always terminates, and may be memoized by embedding applications
//! keyed on data-set identity.

use std::collections::HashSet;

use crate::model::{Attribute, DataSet, EntityId, LinkPath, Model};
use crate::names::NameGenerator;

/// A visible attribute together with its generated display name.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedAttribute<'m> {
    pub name: String,
    pub attribute: &'m Attribute,
}

/// The visible attributes at one resolved path. `entity` is the terminal
/// entity of the path (the root entity for the empty path).
#[derive(Debug, Clone, PartialEq)]
pub struct PathAttributes<'m> {
    pub path: LinkPath,
    pub entity: EntityId,
    pub attributes: Vec<NamedAttribute<'m>>,
}

/// Resolves the reachable link-paths and visible attributes of data sets.
#[derive(Debug, Clone)]
pub struct GraphResolver<'m> {
    model: &'m Model,
    names: NameGenerator,
}

impl<'m> GraphResolver<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self {
            model,
            names: NameGenerator::default(),
        }
    }

    pub fn with_names(model: &'m Model, names: NameGenerator) -> Self {
        Self { model, names }
    }

    /// All distinct paths to connected entities, deduplicated, in
    /// first-discovery order. A path survives if
    ///
    /// - no link instance occurs twice within it,
    /// - neither it nor any of its prefixes is explicitly excluded,
    /// - it does not exceed `max_entity_link_depth`, unless explicitly
    ///   included.
    ///
    /// Every surviving path is registered together with all of its proper
    /// prefixes. A path beyond the depth limit is still traversed through
    /// (without being registered on its own) when an explicitly included path
    /// extends it, so a single deep include works without including every
    /// intermediate path.
    pub fn paths_to_connected_entities(&self, data_set: &DataSet) -> Vec<LinkPath> {
        let mut seen = HashSet::new();
        let mut paths = Vec::new();
        self.traverse(
            data_set,
            data_set.root(),
            &LinkPath::empty(),
            &mut seen,
            &mut paths,
        );
        paths
    }

    fn traverse(
        &self,
        data_set: &DataSet,
        entity: EntityId,
        current: &LinkPath,
        seen: &mut HashSet<LinkPath>,
        paths: &mut Vec<LinkPath>,
    ) {
        for &link in self.model.entity_links(entity) {
            if current.contains(link) {
                continue;
            }
            let path = current.extended(link);
            if data_set.excluded_paths().contains(&path) {
                continue;
            }
            let beyond_depth = data_set
                .max_entity_link_depth()
                .is_some_and(|depth| path.len() > depth);
            if beyond_depth && !data_set.included_paths().contains(&path) {
                let leads_to_included = data_set
                    .included_paths()
                    .iter()
                    .any(|included| included.len() > path.len() && included.starts_with(&path));
                if leads_to_included {
                    self.traverse(data_set, self.model.link_target(link), &path, seen, paths);
                }
                continue;
            }
            register_with_prefixes(&path, seen, paths);
            self.traverse(data_set, self.model.link_target(link), &path, seen, paths);
        }
    }

    /// All visible attributes with their display names, per path. The first
    /// element is always the empty path with the root entity's attributes,
    /// filtered only by the personal-data flag; the remaining elements follow
    /// path-discovery order. Attributes keep entity definition order.
    pub fn connected_attributes(
        &self,
        data_set: &DataSet,
        include_personal_data: bool,
    ) -> Vec<PathAttributes<'m>> {
        let root = data_set.root();
        let empty = LinkPath::empty();
        let mut result = vec![PathAttributes {
            path: empty.clone(),
            entity: root,
            attributes: self
                .model
                .entity(root)
                .attributes
                .iter()
                .filter(|attribute| include_personal_data || !attribute.personal_data)
                .map(|attribute| NamedAttribute {
                    name: self.names.prefixed_name(self.model, attribute, &empty),
                    attribute,
                })
                .collect(),
        }];

        for path in self.paths_to_connected_entities(data_set) {
            let entity = self.model.path_entity(root, &path);
            let attributes = self
                .model
                .entity(entity)
                .attributes
                .iter()
                .filter(|attribute| {
                    attribute_visible(data_set, &path, attribute, include_personal_data)
                })
                .map(|attribute| NamedAttribute {
                    name: self.names.prefixed_name(self.model, attribute, &path),
                    attribute,
                })
                .collect();
            result.push(PathAttributes {
                path,
                entity,
                attributes,
            });
        }
        result
    }
}

/// Visibility of an attribute at a non-empty path.
fn attribute_visible(
    data_set: &DataSet,
    path: &LinkPath,
    attribute: &Attribute,
    include_personal_data: bool,
) -> bool {
    if let Some(included) = data_set.included_attributes().get(path) {
        if !included.contains(&attribute.name) {
            return false;
        }
    }
    if let Some(excluded) = data_set.excluded_attributes().get(path) {
        if excluded.contains(&attribute.name) {
            return false;
        }
    }
    attribute.accessible_via_entity_link && (include_personal_data || !attribute.personal_data)
}

/// Append a path and all of its proper prefixes, each at most once,
/// preserving first-discovery order.
fn register_with_prefixes(path: &LinkPath, seen: &mut HashSet<LinkPath>, paths: &mut Vec<LinkPath>) {
    for len in 1..=path.len() {
        let prefix = path.truncated(len);
        if seen.insert(prefix.clone()) {
            paths.push(prefix);
        }
    }
}
