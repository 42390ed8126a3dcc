//! OLAP cube document generation from resolved data sets.
//!
//! Per data set one cube is built: a dimension for every visible non-array
//! attribute, a measure for every simple metric and a calculated member for
//! every composed metric. Date/duration attributes become templated
//! dimensions built from caller-supplied hierarchy templates.

mod document;
mod xml;

pub use document::{
    CalculatedMember, Cube, Dimension, Hierarchy, Level, LevelDataType, LevelType, Measure,
    MeasureDataType, SchemaDocument,
};

use std::collections::HashMap;

use crate::model::metric::ends_with_division;
use crate::model::{AttributeType, ComposedMetric, DataSet, Metric, Model};
use crate::names::NameGenerator;
use crate::resolve::GraphResolver;

/// Configuration for schema document generation.
#[derive(Debug, Clone)]
pub struct CubeConfig {
    /// The database schema holding the generated fact tables.
    pub fact_table_schema_name: String,
    /// Leave out dimensions for high-cardinality attributes.
    pub exclude_high_cardinality_dimensions: bool,
    /// Include dimensions for personal-data attributes.
    pub include_personal_data: bool,
    /// Hierarchy templates per attribute type; attributes of a type without a
    /// template fall back to plain column-bound dimensions.
    pub dimension_templates: HashMap<AttributeType, Vec<Hierarchy>>,
}

impl CubeConfig {
    pub fn new(fact_table_schema_name: &str) -> Self {
        Self {
            fact_table_schema_name: fact_table_schema_name.into(),
            exclude_high_cardinality_dimensions: true,
            include_personal_data: false,
            dimension_templates: HashMap::new(),
        }
    }

    pub fn with_dimension_template(
        mut self,
        attribute_type: AttributeType,
        hierarchies: Vec<Hierarchy>,
    ) -> Self {
        self.dimension_templates.insert(attribute_type, hierarchies);
        self
    }

    pub fn include_high_cardinality_dimensions(mut self) -> Self {
        self.exclude_high_cardinality_dimensions = false;
        self
    }

    pub fn include_personal_data(mut self) -> Self {
        self.include_personal_data = true;
        self
    }
}

/// Builds OLAP schema documents from resolved data sets.
#[derive(Debug)]
pub struct SchemaDocumentGenerator<'m> {
    model: &'m Model,
    config: CubeConfig,
    names: NameGenerator,
}

impl<'m> SchemaDocumentGenerator<'m> {
    pub fn new(model: &'m Model, config: CubeConfig) -> Self {
        Self {
            model,
            config,
            names: NameGenerator::default(),
        }
    }

    pub fn with_names(model: &'m Model, config: CubeConfig, names: NameGenerator) -> Self {
        Self {
            model,
            config,
            names,
        }
    }

    /// The complete document, one cube per data set.
    pub fn schema_document(&self, name: &str, data_sets: &[&DataSet]) -> SchemaDocument {
        SchemaDocument {
            name: name.into(),
            cubes: data_sets.iter().map(|data_set| self.cube(data_set)).collect(),
        }
    }

    /// One cube for a data set: its dimensions, measures and calculated
    /// members, with the data set's first metric as the default measure.
    pub fn cube(&self, data_set: &DataSet) -> Cube {
        let root = self.model.entity(data_set.root());
        Cube {
            name: root.name.clone(),
            description: root.description.clone(),
            fact_schema_name: self.config.fact_table_schema_name.clone(),
            fact_table_name: format!("{}_fact", root.table_name),
            default_measure: data_set.metrics().first().map(|metric| metric.name().to_string()),
            dimensions: self.dimensions(data_set),
            measures: self.measures(data_set),
            calculated_members: self.calculated_members(data_set),
        }
    }

    fn dimensions(&self, data_set: &DataSet) -> Vec<Dimension> {
        let resolver = GraphResolver::with_names(self.model, self.names.clone());
        let connected =
            resolver.connected_attributes(data_set, self.config.include_personal_data);
        let root = self.model.entity(data_set.root());

        let mut dimensions = Vec::new();
        for path_attributes in &connected {
            for named in &path_attributes.attributes {
                let attribute = named.attribute;
                if attribute.attribute_type == Some(AttributeType::Array) {
                    continue;
                }
                if self.config.exclude_high_cardinality_dimensions && attribute.high_cardinality {
                    continue;
                }
                let template = attribute
                    .attribute_type
                    .and_then(|attribute_type| self.config.dimension_templates.get(&attribute_type));
                let dimension = if let Some(hierarchies) = template {
                    Dimension::Templated {
                        name: named.name.clone(),
                        description: attribute.description.clone(),
                        foreign_key: self.names.attribute_fk_name(
                            self.model,
                            attribute,
                            &path_attributes.path,
                        ),
                        time_dimension: attribute.attribute_type == Some(AttributeType::Date),
                        hierarchies: hierarchies.clone(),
                    }
                } else if path_attributes.path.is_empty() {
                    Dimension::Private {
                        name: named.name.clone(),
                        description: attribute.description.clone(),
                        column_name: attribute.column_name.clone(),
                    }
                } else {
                    let entity = self.model.entity(path_attributes.entity);
                    Dimension::Linked {
                        name: named.name.clone(),
                        description: attribute.description.clone(),
                        column_name: attribute.column_name.clone(),
                        foreign_key: self.names.join_fk_name(
                            self.model,
                            &root.name,
                            &path_attributes.path,
                        ),
                        primary_key: entity.pk_column_name.clone(),
                        schema_name: entity.schema_name.clone(),
                        table_name: entity.table_name.clone(),
                    }
                };
                dimensions.push(dimension);
            }
        }
        dimensions
    }

    fn measures(&self, data_set: &DataSet) -> Vec<Measure> {
        data_set
            .metrics()
            .iter()
            .filter_map(|metric| match metric {
                Metric::Simple(metric) => Some(Measure {
                    name: metric.name.clone(),
                    description: metric.description.clone(),
                    column_name: metric.column_name.clone(),
                    aggregation: metric.aggregation,
                    data_type: if metric.aggregation.is_count() {
                        MeasureDataType::Integer
                    } else {
                        MeasureDataType::Numeric
                    },
                    number_format: metric.number_format,
                }),
                Metric::Composed(_) => None,
            })
            .collect()
    }

    fn calculated_members(&self, data_set: &DataSet) -> Vec<CalculatedMember> {
        data_set
            .metrics()
            .iter()
            .filter_map(|metric| match metric {
                Metric::Composed(metric) => Some(CalculatedMember {
                    name: metric.name.clone(),
                    description: metric.description.clone(),
                    formula: member_formula(metric),
                    number_format: metric.number_format,
                }),
                Metric::Simple(_) => None,
            })
            .collect()
    }
}

/// The member expression for a composed metric: parents substituted as
/// qualified measure names, denominators guarded against zero.
fn member_formula(metric: &ComposedMetric) -> String {
    let mut formula = String::new();
    for (segment, parent) in metric.segments.iter().zip(metric.parents.iter()) {
        formula.push_str(segment);
        let reference = format!("[Measures].[{parent}]");
        if ends_with_division(segment) {
            formula.push_str(&format!("IIf({reference} = 0, NULL, {reference})"));
        } else {
            formula.push_str(&reference);
        }
    }
    if let Some(last) = metric.segments.last() {
        formula.push_str(last);
    }
    formula
}
