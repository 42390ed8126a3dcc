//! The OLAP schema document model: cubes, dimensions, measures and
//! calculated members, serializable to the target engine's XML file format.

use serde::Serialize;

use crate::model::{Aggregation, NumberFormat};

use super::xml::XmlElement;

// =============================================================================
// Hierarchies (used both in templates and in generated dimensions)
// =============================================================================

/// Level types of the target engine's hierarchy levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LevelType {
    Regular,
    TimeYears,
    TimeQuarters,
    TimeMonths,
    TimeWeeks,
    TimeDays,
}

impl LevelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelType::Regular => "Regular",
            LevelType::TimeYears => "TimeYears",
            LevelType::TimeQuarters => "TimeQuarters",
            LevelType::TimeMonths => "TimeMonths",
            LevelType::TimeWeeks => "TimeWeeks",
            LevelType::TimeDays => "TimeDays",
        }
    }
}

/// Data types of hierarchy level columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LevelDataType {
    String,
    Integer,
    Numeric,
}

impl LevelDataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelDataType::String => "String",
            LevelDataType::Integer => "Integer",
            LevelDataType::Numeric => "Numeric",
        }
    }
}

/// One level of a dimension hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[must_use = "builders have no effect until used"]
pub struct Level {
    pub name: String,
    pub column: String,
    pub name_column: Option<String>,
    pub level_type: LevelType,
    pub data_type: LevelDataType,
    pub unique_members: bool,
}

impl Level {
    pub fn new(name: &str, column: &str) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            name_column: None,
            level_type: LevelType::Regular,
            data_type: LevelDataType::String,
            unique_members: false,
        }
    }

    pub fn with_name_column(mut self, name_column: &str) -> Self {
        self.name_column = Some(name_column.into());
        self
    }

    pub fn with_level_type(mut self, level_type: LevelType) -> Self {
        self.level_type = level_type;
        self
    }

    pub fn with_data_type(mut self, data_type: LevelDataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn unique_members(mut self) -> Self {
        self.unique_members = true;
        self
    }

    fn to_xml_element(&self) -> XmlElement {
        let mut element = XmlElement::new("Level")
            .attr("name", &self.name)
            .attr("column", &self.column);
        if let Some(name_column) = &self.name_column {
            element = element.attr("nameColumn", name_column);
        }
        element
            .attr("type", self.data_type.as_str())
            .attr("levelType", self.level_type.as_str())
            .attr("uniqueMembers", bool_str(self.unique_members))
    }
}

/// A hierarchy over a dimension table, used as a caller-supplied template for
/// date/duration dimensions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[must_use = "builders have no effect until used"]
pub struct Hierarchy {
    pub name: String,
    pub table_schema_name: String,
    pub table_name: String,
    pub levels: Vec<Level>,
}

impl Hierarchy {
    pub fn new(name: &str, table_schema_name: &str, table_name: &str) -> Self {
        Self {
            name: name.into(),
            table_schema_name: table_schema_name.into(),
            table_name: table_name.into(),
            levels: Vec::new(),
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.levels.push(level);
        self
    }
}

// =============================================================================
// Dimensions
// =============================================================================

/// A cube dimension generated from one visible attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Dimension {
    /// Root-entity attribute bound directly to a fact-table column.
    Private {
        name: String,
        description: String,
        column_name: String,
    },
    /// Attribute of a linked entity, joined through the path's foreign key in
    /// the fact table to the linked entity's own table.
    Linked {
        name: String,
        description: String,
        column_name: String,
        foreign_key: String,
        primary_key: String,
        schema_name: String,
        table_name: String,
    },
    /// Date/duration attribute built from caller-supplied hierarchy
    /// templates, parameterized by the generated foreign-key name.
    Templated {
        name: String,
        description: String,
        foreign_key: String,
        time_dimension: bool,
        hierarchies: Vec<Hierarchy>,
    },
}

impl Dimension {
    pub fn name(&self) -> &str {
        match self {
            Dimension::Private { name, .. }
            | Dimension::Linked { name, .. }
            | Dimension::Templated { name, .. } => name,
        }
    }

    fn to_xml_element(&self) -> XmlElement {
        match self {
            Dimension::Private {
                name,
                description,
                column_name,
            } => XmlElement::new("Dimension")
                .attr("name", name)
                .attr("description", description)
                .child(
                    XmlElement::new("Hierarchy")
                        .attr("allMemberName", format!("All {name}"))
                        .attr("hasAll", "true")
                        .child(
                            XmlElement::new("Level")
                                .attr("name", name)
                                .attr("column", column_name)
                                .attr("uniqueMembers", "true"),
                        ),
                ),
            Dimension::Linked {
                name,
                description,
                column_name,
                foreign_key,
                primary_key,
                schema_name,
                table_name,
            } => XmlElement::new("Dimension")
                .attr("name", name)
                .attr("description", description)
                .attr("foreignKey", foreign_key)
                .child(
                    XmlElement::new("Hierarchy")
                        .attr("allMemberName", format!("All {name}"))
                        .attr("hasAll", "true")
                        .attr("primaryKey", primary_key)
                        .child(
                            XmlElement::new("Table")
                                .attr("schema", schema_name)
                                .attr("name", table_name),
                        )
                        .child(
                            XmlElement::new("Level")
                                .attr("name", name)
                                .attr("column", column_name)
                                .attr("uniqueMembers", "true"),
                        ),
                ),
            Dimension::Templated {
                name,
                description,
                foreign_key,
                time_dimension,
                hierarchies,
            } => {
                let dimension_type = if *time_dimension {
                    "TimeDimension"
                } else {
                    "StandardDimension"
                };
                let mut element = XmlElement::new("Dimension")
                    .attr("name", name)
                    .attr("type", dimension_type)
                    .attr("description", description)
                    .attr("foreignKey", foreign_key);
                for hierarchy in hierarchies {
                    let mut hierarchy_element = XmlElement::new("Hierarchy")
                        .attr("allMemberName", format!("All {}s", name.to_lowercase()))
                        .attr("hasAll", "true")
                        .attr("name", &hierarchy.name)
                        .child(
                            XmlElement::new("Table")
                                .attr("schema", &hierarchy.table_schema_name)
                                .attr("name", &hierarchy.table_name),
                        );
                    for level in &hierarchy.levels {
                        hierarchy_element.push_child(level.to_xml_element());
                    }
                    element.push_child(hierarchy_element);
                }
                element
            }
        }
    }
}

// =============================================================================
// Measures and calculated members
// =============================================================================

/// Data type of a measure: Integer for count-family aggregations, Numeric
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MeasureDataType {
    Integer,
    Numeric,
}

impl MeasureDataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureDataType::Integer => "Integer",
            MeasureDataType::Numeric => "Numeric",
        }
    }
}

/// A measure generated from a simple metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measure {
    pub name: String,
    pub description: String,
    pub column_name: String,
    pub aggregation: Aggregation,
    pub data_type: MeasureDataType,
    pub number_format: NumberFormat,
}

impl Measure {
    fn to_xml_element(&self) -> XmlElement {
        XmlElement::new("Measure")
            .attr("name", &self.name)
            .attr("description", &self.description)
            .attr("column", &self.column_name)
            .attr("aggregator", self.aggregation.as_str())
            .attr("formatString", self.number_format.as_str())
            .attr("datatype", self.data_type.as_str())
    }
}

/// A calculated member generated from a composed metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatedMember {
    pub name: String,
    pub description: String,
    /// The member expression over qualified measure names,
    /// e.g. `[Measures].[Revenue] / [Measures].[# Orders]`.
    pub formula: String,
    pub number_format: NumberFormat,
}

impl CalculatedMember {
    fn to_xml_element(&self) -> XmlElement {
        XmlElement::new("CalculatedMember")
            .attr("name", &self.name)
            .attr("dimension", "Measures")
            .attr("description", &self.description)
            .child(XmlElement::new("Formula").text(&self.formula))
            .child(
                XmlElement::new("CalculatedMemberProperty")
                    .attr("name", "FORMAT_STRING")
                    .attr("value", self.number_format.as_str()),
            )
    }
}

// =============================================================================
// Cube and document
// =============================================================================

/// A named collection of dimensions, measures and calculated members over one
/// data set's fact table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cube {
    pub name: String,
    pub description: String,
    pub fact_schema_name: String,
    pub fact_table_name: String,
    /// The first metric of the data set, if any.
    pub default_measure: Option<String>,
    pub dimensions: Vec<Dimension>,
    pub measures: Vec<Measure>,
    pub calculated_members: Vec<CalculatedMember>,
}

impl Cube {
    fn to_xml_element(&self) -> XmlElement {
        let mut element = XmlElement::new("Cube")
            .attr("name", &self.name)
            .attr("description", &self.description);
        if let Some(default_measure) = &self.default_measure {
            element = element.attr("defaultMeasure", default_measure);
        }
        element.push_child(
            XmlElement::new("Table")
                .attr("schema", &self.fact_schema_name)
                .attr("name", &self.fact_table_name),
        );
        for dimension in &self.dimensions {
            element.push_child(dimension.to_xml_element());
        }
        for measure in &self.measures {
            element.push_child(measure.to_xml_element());
        }
        for member in &self.calculated_members {
            element.push_child(member.to_xml_element());
        }
        element
    }
}

/// The complete schema document: one cube per data set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDocument {
    pub name: String,
    pub cubes: Vec<Cube>,
}

impl SchemaDocument {
    /// Serialize to the target engine's XML file format.
    pub fn to_xml(&self) -> String {
        let mut root = XmlElement::new("Schema").attr("name", &self.name);
        for cube in &self.cubes {
            root.push_child(cube.to_xml_element());
        }
        format!("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n{}", root.render())
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
