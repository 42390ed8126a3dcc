//! Unified error type for model definition and lookup failures.
//!
//! All failures surface at definition time or at lookup-invocation time, never
//! mid-traversal: once a model and its data sets are built, resolution and
//! generation are infallible.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while defining or looking up parts of a schema model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// An entity with the same name was already added to the model.
    #[error("entity \"{name}\" already exists in the model")]
    DuplicateEntity { name: String },

    /// An entity declares two attributes with the same name.
    #[error("attribute \"{attribute}\" already exists in entity \"{entity}\"")]
    DuplicateAttribute { entity: String, attribute: String },

    /// A metric with the same name was already added to the data set.
    #[error("metric \"{name}\" already exists in data set \"{data_set}\"")]
    DuplicateMetric { name: String, data_set: String },

    /// A composed-metric formula references a metric that does not exist.
    #[error("could not find metric \"{name}\" in data set \"{data_set}\"")]
    UnknownMetric { name: String, data_set: String },

    /// A composed-metric formula contains no metric references.
    #[error("formula \"{formula}\" of metric \"{name}\" references no other metrics")]
    EmptyFormula { name: String, formula: String },

    /// Referenced an entity that does not exist in the model.
    #[error("unknown entity \"{name}\"")]
    UnknownEntity { name: String },

    /// No entity link matched a target name / prefix pair.
    #[error("linked entity \"{target}\" / \"{prefix}\" not found in entity \"{entity}\"")]
    LinkNotFound {
        entity: String,
        target: String,
        prefix: String,
    },

    /// More than one entity link matched a target name / prefix pair.
    #[error("multiple linked entities found for \"{target}\" / \"{prefix}\" in entity \"{entity}\"")]
    AmbiguousLink {
        entity: String,
        target: String,
        prefix: String,
    },

    /// No attribute with the given name exists on the entity.
    #[error("attribute \"{attribute}\" not found in entity \"{entity}\"")]
    AttributeNotFound { entity: String, attribute: String },
}
