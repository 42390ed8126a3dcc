//! SQL generation: the identifier-quoting dialect seam and the SELECT
//! generators for flattened and star-schema queries.

pub mod dialect;
mod generator;

pub use dialect::{Ansi, Postgres, SqlDialect};
pub use generator::SqlGenerator;
