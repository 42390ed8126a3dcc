//! The assembled entity graph: node and edge handles, paths, lookups.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::Dfs;

use crate::error::{SchemaError, SchemaResult};

use super::entity::{Attribute, Entity, EntityLink, LinkOptions};

/// Handle to an entity in a [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(NodeIndex);

/// Handle to one entity-link instance in a [`Model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(EdgeIndex);

/// An ordered sequence of entity links describing a traversal from a data
/// set's root entity. The empty path denotes the root entity itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LinkPath(Vec<LinkId>);

impl LinkPath {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn links(&self) -> &[LinkId] {
        &self.0
    }

    pub fn last(&self) -> Option<LinkId> {
        self.0.last().copied()
    }

    pub fn contains(&self, link: LinkId) -> bool {
        self.0.contains(&link)
    }

    /// A new path with `link` appended.
    pub fn extended(&self, link: LinkId) -> Self {
        let mut links = self.0.clone();
        links.push(link);
        Self(links)
    }

    /// The path without its last link; the empty path stays empty.
    pub fn parent(&self) -> Self {
        let mut links = self.0.clone();
        links.pop();
        Self(links)
    }

    /// The prefix consisting of the first `len` links.
    pub fn truncated(&self, len: usize) -> Self {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Does this path start with all links of `prefix`?
    pub fn starts_with(&self, prefix: &LinkPath) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

impl From<Vec<LinkId>> for LinkPath {
    fn from(links: Vec<LinkId>) -> Self {
        Self(links)
    }
}

/// The static entity/link graph assembled during model definition.
///
/// Entities are nodes, entity links are edges; parallel edges between the same
/// pair of entities are kept distinct. Outgoing links are tracked per entity in
/// definition order, which drives path-discovery order during resolution.
#[derive(Debug, Clone, Default)]
pub struct Model {
    graph: DiGraph<Entity, EntityLink>,
    node_indices: HashMap<String, NodeIndex>,
    outgoing: HashMap<NodeIndex, Vec<LinkId>>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity, validating that its name is unique in the model and
    /// that its attribute names are unique within the entity.
    pub fn add_entity(&mut self, entity: Entity) -> SchemaResult<EntityId> {
        if self.node_indices.contains_key(&entity.name) {
            return Err(SchemaError::DuplicateEntity {
                name: entity.name.clone(),
            });
        }
        for (position, attribute) in entity.attributes.iter().enumerate() {
            if entity.attributes[..position]
                .iter()
                .any(|other| other.name == attribute.name)
            {
                return Err(SchemaError::DuplicateAttribute {
                    entity: entity.name.clone(),
                    attribute: attribute.name.clone(),
                });
            }
        }
        let name = entity.name.clone();
        let node = self.graph.add_node(entity);
        self.node_indices.insert(name, node);
        Ok(EntityId(node))
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.graph[id.0]
    }

    pub fn entity_by_name(&self, name: &str) -> Option<EntityId> {
        self.node_indices.get(name).copied().map(EntityId)
    }

    /// Like [`entity_by_name`](Self::entity_by_name), but an unknown name is
    /// an error.
    pub fn find_entity(&self, name: &str) -> SchemaResult<EntityId> {
        self.entity_by_name(name)
            .ok_or_else(|| SchemaError::UnknownEntity {
                name: name.to_string(),
            })
    }

    /// Append a directed link from `source` to `target`. The foreign key
    /// column defaults to `<target table>_fk` and the prefix to the target
    /// entity name.
    pub fn link_entity(
        &mut self,
        source: EntityId,
        target: EntityId,
        options: LinkOptions,
    ) -> LinkId {
        let target_entity = &self.graph[target.0];
        let link = EntityLink {
            prefix: options
                .prefix
                .unwrap_or_else(|| target_entity.name.clone()),
            fk_column: options
                .fk_column
                .unwrap_or_else(|| format!("{}_fk", target_entity.table_name)),
            description: options.description,
        };
        let edge = LinkId(self.graph.add_edge(source.0, target.0, link));
        self.outgoing.entry(source.0).or_default().push(edge);
        edge
    }

    pub fn link(&self, id: LinkId) -> &EntityLink {
        &self.graph[id.0]
    }

    pub fn link_source(&self, id: LinkId) -> EntityId {
        let (source, _) = self
            .graph
            .edge_endpoints(id.0)
            .expect("link handles are only created by this model");
        EntityId(source)
    }

    pub fn link_target(&self, id: LinkId) -> EntityId {
        let (_, target) = self
            .graph
            .edge_endpoints(id.0)
            .expect("link handles are only created by this model");
        EntityId(target)
    }

    /// Outgoing links of an entity, in definition order.
    pub fn entity_links(&self, entity: EntityId) -> &[LinkId] {
        self.outgoing
            .get(&entity.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The entity a path ends at: the last link's target, or `root` for the
    /// empty path.
    pub fn path_entity(&self, root: EntityId, path: &LinkPath) -> EntityId {
        match path.last() {
            Some(link) => self.link_target(link),
            None => root,
        }
    }

    /// Find the unique link whose target entity name (and prefix, if given)
    /// matches. Zero or multiple matches fail.
    pub fn find_entity_link(
        &self,
        entity: EntityId,
        target_name: &str,
        prefix: Option<&str>,
    ) -> SchemaResult<LinkId> {
        let mut matches = self.entity_links(entity).iter().copied().filter(|&id| {
            let link = self.link(id);
            self.entity(self.link_target(id)).name == target_name
                && prefix.map_or(true, |p| p == link.prefix)
        });

        let context = || {
            (
                self.entity(entity).name.clone(),
                target_name.to_string(),
                prefix.unwrap_or("").to_string(),
            )
        };

        match (matches.next(), matches.next()) {
            (Some(id), None) => Ok(id),
            (None, _) => {
                let (entity, target, prefix) = context();
                Err(SchemaError::LinkNotFound {
                    entity,
                    target,
                    prefix,
                })
            }
            (Some(_), Some(_)) => {
                let (entity, target, prefix) = context();
                Err(SchemaError::AmbiguousLink {
                    entity,
                    target,
                    prefix,
                })
            }
        }
    }

    /// Find an attribute of an entity by name.
    pub fn find_attribute(&self, entity: EntityId, name: &str) -> SchemaResult<&Attribute> {
        self.entity(entity)
            .attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .ok_or_else(|| SchemaError::AttributeNotFound {
                entity: self.entity(entity).name.clone(),
                attribute: name.to_string(),
            })
    }

    /// All entities reachable from `root` through any chain of links,
    /// including `root` itself. Depth-first with a global visited set; this is
    /// discovery only, not path enumeration.
    pub fn connected_entities(&self, root: EntityId) -> Vec<EntityId> {
        let mut dfs = Dfs::new(&self.graph, root.0);
        let mut reachable = Vec::new();
        while let Some(node) = dfs.next(&self.graph) {
            reachable.push(EntityId(node));
        }
        reachable
    }
}
