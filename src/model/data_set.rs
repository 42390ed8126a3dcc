//! Data sets: a named view rooted at one entity, with metrics and
//! visibility overrides.

use std::collections::{HashMap, HashSet};

use crate::error::{SchemaError, SchemaResult};

use super::graph::{EntityId, LinkPath, Model};
use super::metric::{parse_formula, ComposedMetric, Metric, SimpleMetric};

/// One step of a path specification: a target entity name, optionally
/// qualified by the link prefix when several links point at the same entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep<'a> {
    pub entity: &'a str,
    pub prefix: Option<&'a str>,
}

impl<'a> PathStep<'a> {
    /// Step to the unique link targeting `entity`.
    pub fn to(entity: &'a str) -> Self {
        Self {
            entity,
            prefix: None,
        }
    }

    /// Step to the link targeting `entity` with the given prefix.
    pub fn via(entity: &'a str, prefix: &'a str) -> Self {
        Self {
            entity,
            prefix: Some(prefix),
        }
    }
}

/// An entity with its metrics and recursively linked entities.
///
/// Overrides are populated during model definition through the `exclude_*` /
/// `include_*` calls below; resolution treats them as read-only afterwards.
#[derive(Debug, Clone)]
pub struct DataSet {
    name: String,
    root: EntityId,
    max_entity_link_depth: Option<usize>,
    metrics: Vec<Metric>,
    excluded_paths: HashSet<LinkPath>,
    included_paths: HashSet<LinkPath>,
    excluded_attributes: HashMap<LinkPath, HashSet<String>>,
    included_attributes: HashMap<LinkPath, HashSet<String>>,
}

impl DataSet {
    pub fn new(root: EntityId, name: &str) -> Self {
        Self {
            name: name.into(),
            root,
            max_entity_link_depth: None,
            metrics: Vec::new(),
            excluded_paths: HashSet::new(),
            included_paths: HashSet::new(),
            excluded_attributes: HashMap::new(),
            included_attributes: HashMap::new(),
        }
    }

    /// Limit how many entity links may be traversed from the root entity.
    /// Individual deeper paths can still be surfaced with `include_path`.
    #[must_use = "builders have no effect until used"]
    pub fn with_max_entity_link_depth(mut self, depth: usize) -> Self {
        self.max_entity_link_depth = Some(depth);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> EntityId {
        self.root
    }

    pub fn max_entity_link_depth(&self) -> Option<usize> {
        self.max_entity_link_depth
    }

    /// An identifier usable in URLs and file names.
    pub fn id(&self) -> String {
        self.name.replace(' ', "_").to_lowercase()
    }

    // =========================================================================
    // Metrics
    // =========================================================================

    /// Metrics in definition order.
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn find_metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|metric| metric.name() == name)
    }

    /// Add a metric computed as a direct aggregation on an entity table
    /// column. Metric names are unique within a data set.
    pub fn add_simple_metric(&mut self, metric: SimpleMetric) -> SchemaResult<()> {
        self.check_metric_name(&metric.name)?;
        self.metrics.push(Metric::Simple(metric));
        Ok(())
    }

    /// Add a metric composed from already-defined metrics. Every bracketed
    /// reference in the formula must name an existing metric of this data set.
    pub fn add_composed_metric(&mut self, metric: ComposedMetric) -> SchemaResult<()> {
        self.check_metric_name(&metric.name)?;
        let (segments, parents) = parse_formula(&metric.formula);
        if parents.is_empty() {
            return Err(SchemaError::EmptyFormula {
                name: metric.name,
                formula: metric.formula,
            });
        }
        for parent in &parents {
            if self.find_metric(parent).is_none() {
                return Err(SchemaError::UnknownMetric {
                    name: parent.clone(),
                    data_set: self.name.clone(),
                });
            }
        }
        self.metrics.push(Metric::Composed(ComposedMetric {
            segments,
            parents,
            ..metric
        }));
        Ok(())
    }

    fn check_metric_name(&self, name: &str) -> SchemaResult<()> {
        if self.find_metric(name).is_some() {
            return Err(SchemaError::DuplicateMetric {
                name: name.to_string(),
                data_set: self.name.clone(),
            });
        }
        Ok(())
    }

    // =========================================================================
    // Path and attribute overrides
    // =========================================================================

    /// Exclude a connected entity, and with it everything reached through it.
    pub fn exclude_path(&mut self, model: &Model, path: &[PathStep<'_>]) -> SchemaResult<()> {
        let path = self.parse_path(model, path)?;
        self.excluded_paths.insert(path);
        Ok(())
    }

    /// Surface a connected entity that the `max_entity_link_depth` setting
    /// would otherwise cut off. Applies to that exact path only, not to paths
    /// extending it.
    pub fn include_path(&mut self, model: &Model, path: &[PathStep<'_>]) -> SchemaResult<()> {
        let path = self.parse_path(model, path)?;
        self.included_paths.insert(path);
        Ok(())
    }

    /// Hide attributes of the entity at `path`. With `attribute_names: None`
    /// every attribute of that entity is hidden. The path must contain at
    /// least one step; root attributes are never subject to overrides.
    pub fn exclude_attributes(
        &mut self,
        model: &Model,
        path: &[PathStep<'_>],
        attribute_names: Option<&[&str]>,
    ) -> SchemaResult<()> {
        let path = self.parse_path(model, path)?;
        let entity = model.path_entity(self.root, &path);
        let names = match attribute_names {
            Some(names) => {
                let mut resolved = HashSet::new();
                for name in names {
                    resolved.insert(model.find_attribute(entity, name)?.name.clone());
                }
                resolved
            }
            None => model
                .entity(entity)
                .attributes
                .iter()
                .map(|attribute| attribute.name.clone())
                .collect(),
        };
        self.excluded_attributes.insert(path, names);
        Ok(())
    }

    /// Show only the listed attributes of the entity at `path`; any attribute
    /// not listed is hidden. The path itself is registered as included, so a
    /// whitelist alone is enough to surface a path beyond the depth limit.
    pub fn include_attributes(
        &mut self,
        model: &Model,
        path: &[PathStep<'_>],
        attribute_names: &[&str],
    ) -> SchemaResult<()> {
        let path = self.parse_path(model, path)?;
        let entity = model.path_entity(self.root, &path);
        let mut resolved = HashSet::new();
        for name in attribute_names {
            resolved.insert(model.find_attribute(entity, name)?.name.clone());
        }
        self.included_paths.insert(path.clone());
        self.included_attributes.insert(path, resolved);
        Ok(())
    }

    /// Resolve a path specification into entity link instances, starting at
    /// the root entity.
    fn parse_path(&self, model: &Model, path: &[PathStep<'_>]) -> SchemaResult<LinkPath> {
        let mut entity = self.root;
        let mut links = Vec::with_capacity(path.len());
        for step in path {
            let link = model.find_entity_link(entity, step.entity, step.prefix)?;
            entity = model.link_target(link);
            links.push(link);
        }
        Ok(LinkPath::from(links))
    }

    // =========================================================================
    // Read access for resolution
    // =========================================================================

    pub fn excluded_paths(&self) -> &HashSet<LinkPath> {
        &self.excluded_paths
    }

    pub fn included_paths(&self) -> &HashSet<LinkPath> {
        &self.included_paths
    }

    pub fn excluded_attributes(&self) -> &HashMap<LinkPath, HashSet<String>> {
        &self.excluded_attributes
    }

    pub fn included_attributes(&self) -> &HashMap<LinkPath, HashSet<String>> {
        &self.included_attributes
    }
}
