//! # Cubist
//!
//! Semantic data-set modeling: declare business entities, their attributes,
//! foreign-key links and derived metrics, then resolve per data set which
//! linked entities and attributes are visible and generate query and cube
//! artifacts from the resolved view.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │           Model (entities, links, metrics)               │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [resolve]
//! ┌─────────────────────────────────────────────────────────┐
//! │      Resolved view (paths + visible attributes)          │
//! └─────────────────────────────────────────────────────────┘
//!                  │                     │
//!                  ▼ [sql]               ▼ [cube]
//! ┌──────────────────────────┐ ┌──────────────────────────┐
//! │ Flattened / star SELECT  │ │  OLAP schema document    │
//! └──────────────────────────┘ └──────────────────────────┘
//! ```
//!
//! The model is assembled once during a definition phase and never mutated
//! afterwards; resolution and generation are pure functions of it.

pub mod cube;
pub mod error;
pub mod model;
pub mod names;
pub mod resolve;
pub mod sql;

pub use error::{SchemaError, SchemaResult};
pub use model::{
    Aggregation, Attribute, AttributeType, DataSet, Entity, EntityId, EntityLink, LinkId,
    LinkOptions, LinkPath, Metric, Model, NumberFormat, PathStep,
};
pub use names::NameGenerator;
pub use resolve::{GraphResolver, NamedAttribute, PathAttributes};
