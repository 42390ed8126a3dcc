//! Entities, attributes and entity links - the static vocabulary of a model.

use inflector::Inflector;
use serde::Serialize;

// =============================================================================
// Attribute
// =============================================================================

/// Attribute types that need special treatment in artifact creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// A numeric identifier, filterable but never aggregated.
    Id,
    /// Rendered as a foreign key to a date dimension in star schemas.
    Date,
    /// Rendered as a foreign key to a duration dimension in star schemas.
    Duration,
    /// Cast to text in flattened tables.
    Enum,
    /// Excluded from cube dimensions.
    Array,
}

/// A property of an entity, corresponds to a column in the underlying
/// dimensional table. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[must_use = "builders have no effect until used"]
pub struct Attribute {
    /// How the attribute is displayed in front-ends, e.g. "Order date".
    pub name: String,
    /// A meaningful business definition of the attribute.
    pub description: String,
    /// The column in the underlying table. Defaults to the snake_cased name.
    pub column_name: String,
    pub attribute_type: Option<AttributeType>,
    /// Values that are very uncommon or unique, e.g. IDs or free text.
    pub high_cardinality: bool,
    /// Person-related data, e.g. "Email address".
    pub personal_data: bool,
    /// Shown by default in overviews.
    pub important_field: bool,
    /// When false, the attribute never appears through an entity link; it is
    /// only visible on the data set rooted at its own entity.
    pub accessible_via_entity_link: bool,
}

impl Attribute {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            column_name: name.to_snake_case(),
            attribute_type: None,
            high_cardinality: false,
            personal_data: false,
            important_field: false,
            accessible_via_entity_link: true,
        }
    }

    pub fn with_column_name(mut self, column_name: &str) -> Self {
        self.column_name = column_name.into();
        self
    }

    pub fn with_type(mut self, attribute_type: AttributeType) -> Self {
        self.attribute_type = Some(attribute_type);
        self
    }

    pub fn high_cardinality(mut self) -> Self {
        self.high_cardinality = true;
        self
    }

    pub fn personal_data(mut self) -> Self {
        self.personal_data = true;
        self
    }

    pub fn important_field(mut self) -> Self {
        self.important_field = true;
        self
    }

    /// Restrict the attribute to the data set rooted at its own entity.
    pub fn inaccessible_via_entity_link(mut self) -> Self {
        self.accessible_via_entity_link = false;
        self
    }
}

// =============================================================================
// Entity
// =============================================================================

/// A business object with attributes and links to other entities, corresponds
/// to a table in the dimensional schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[must_use = "builders have no effect until used"]
pub struct Entity {
    /// A short noun phrase that captures the nature of the entity,
    /// e.g. "Customer", "Order item".
    pub name: String,
    /// A short text that helps to understand the underlying business process.
    pub description: String,
    /// The database schema of the underlying table, e.g. "xy_dim".
    pub schema_name: String,
    /// The underlying table. Defaults to the snake_cased entity name.
    pub table_name: String,
    /// The primary key column. Defaults to `<table_name>_id`.
    pub pk_column_name: String,
    /// Attributes in definition order.
    pub attributes: Vec<Attribute>,
}

impl Entity {
    pub fn new(name: &str, description: &str, schema_name: &str) -> Self {
        let table_name = name.to_snake_case();
        let pk_column_name = format!("{table_name}_id");
        Self {
            name: name.into(),
            description: description.into(),
            schema_name: schema_name.into(),
            table_name,
            pk_column_name,
            attributes: Vec::new(),
        }
    }

    /// Override the table name. Also resets the primary-key default, so call
    /// this before `with_pk_column_name`.
    pub fn with_table_name(mut self, table_name: &str) -> Self {
        self.table_name = table_name.into();
        self.pk_column_name = format!("{table_name}_id");
        self
    }

    pub fn with_pk_column_name(mut self, pk_column_name: &str) -> Self {
        self.pk_column_name = pk_column_name.into();
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }
}

// =============================================================================
// Entity links
// =============================================================================

/// A directed link from one entity to another, corresponds to a foreign key
/// relationship. Link identity is per-instance: two links to the same target
/// with different prefixes are distinct edges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityLink {
    /// Attributes reached through this link are prefixed with this,
    /// e.g. "First order". Defaults to the target entity name.
    pub prefix: String,
    /// The foreign key column in the source entity's table,
    /// e.g. "first_order_fk". Defaults to `<target table>_fk`.
    pub fk_column: String,
    /// A short explanation of the relation.
    pub description: Option<String>,
}

/// Optional overrides for [`crate::model::Model::link_entity`]; unset fields
/// are derived from the target entity.
#[derive(Debug, Clone, Default)]
#[must_use = "builders have no effect until used"]
pub struct LinkOptions {
    pub fk_column: Option<String>,
    pub prefix: Option<String>,
    pub description: Option<String>,
}

impl LinkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fk_column(mut self, fk_column: &str) -> Self {
        self.fk_column = Some(fk_column.into());
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.into());
        self
    }
}
