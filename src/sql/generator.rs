//! SELECT generation for flattened and star-schema data set queries.

use std::collections::HashSet;

use crate::model::metric::ends_with_division;
use crate::model::{AttributeType, DataSet, Metric, Model};
use crate::names::NameGenerator;
use crate::resolve::{GraphResolver, NamedAttribute, PathAttributes};

use super::dialect::SqlDialect;

/// Builds one SELECT per data set, either as a flattened wide table (every
/// visible attribute inlined) or as a star schema (foreign keys to linked
/// entities kept instead of inlining their attributes).
#[derive(Debug)]
pub struct SqlGenerator<'m, D: SqlDialect> {
    model: &'m Model,
    dialect: D,
    names: NameGenerator,
}

impl<'m, D: SqlDialect> SqlGenerator<'m, D> {
    pub fn new(model: &'m Model, dialect: D) -> Self {
        Self {
            model,
            dialect,
            names: NameGenerator::default(),
        }
    }

    pub fn with_names(model: &'m Model, dialect: D, names: NameGenerator) -> Self {
        Self {
            model,
            dialect,
            names,
        }
    }

    /// The flattened wide-table query: one column per visible attribute at
    /// every visible path, aliased to its display name, followed by one
    /// column per metric.
    pub fn flattened_select(&self, data_set: &DataSet) -> String {
        let resolver = GraphResolver::with_names(self.model, self.names.clone());
        let connected = resolver.connected_attributes(data_set, true);
        let root = self.model.entity(data_set.root());

        let mut columns = Vec::new();
        for path_attributes in &connected {
            let alias = if path_attributes.path.is_empty() {
                root.name.clone()
            } else {
                self.names.table_alias(self.model, &path_attributes.path)
            };
            for named in &path_attributes.attributes {
                let column = self.qualified(&alias, &named.attribute.column_name);
                let expr = match named.attribute.attribute_type {
                    Some(AttributeType::Enum) => format!("CAST({column} AS TEXT)"),
                    _ => column,
                };
                columns.push(format!(
                    "{expr} AS {}",
                    self.dialect.quote_identifier(&named.name)
                ));
            }
        }
        for metric in data_set.metrics() {
            columns.push(format!(
                "{} AS {}",
                self.metric_sql(data_set, &root.name, metric),
                self.dialect.quote_identifier(metric.name())
            ));
        }

        self.assemble(data_set, &connected, &columns)
    }

    /// The star-schema query: root attributes and metric source columns kept
    /// raw, date/duration attributes rendered as derived foreign keys, and
    /// every linked path reduced to its join foreign-key column.
    pub fn star_schema_select(&self, data_set: &DataSet) -> String {
        let resolver = GraphResolver::with_names(self.model, self.names.clone());
        let connected = resolver.connected_attributes(data_set, true);
        let root = self.model.entity(data_set.root());

        let mut columns = Vec::new();
        let mut seen_root_columns = HashSet::new();
        let (root_attributes, linked) = connected
            .split_first()
            .map(|(first, rest)| (first.attributes.as_slice(), rest))
            .unwrap_or((&[], &[]));

        for named in root_attributes {
            if is_templated(named.attribute.attribute_type) {
                continue;
            }
            if seen_root_columns.insert(named.attribute.column_name.clone()) {
                columns.push(self.qualified(&root.name, &named.attribute.column_name));
            }
        }
        for metric in data_set.metrics() {
            if let Metric::Simple(metric) = metric {
                if seen_root_columns.insert(metric.column_name.clone()) {
                    columns.push(self.qualified(&root.name, &metric.column_name));
                }
            }
        }
        for named in root_attributes {
            if let Some(column) = self.derived_fk_select(&root.name, named) {
                columns.push(column);
            }
        }

        for path_attributes in linked {
            let Some(link_id) = path_attributes.path.last() else {
                continue;
            };
            let link = self.model.link(link_id);
            let parent = path_attributes.path.parent();
            let parent_alias = if parent.is_empty() {
                root.name.clone()
            } else {
                self.names.table_alias(self.model, &parent)
            };
            let fk_name = self
                .names
                .join_fk_name(self.model, &root.name, &path_attributes.path);
            columns.push(format!(
                "{} AS {}",
                self.qualified(&parent_alias, &link.fk_column),
                self.dialect.quote_identifier(&fk_name)
            ));

            let alias = self.names.table_alias(self.model, &path_attributes.path);
            for named in &path_attributes.attributes {
                if let Some(column) = self.derived_fk_select(&alias, named) {
                    columns.push(column);
                }
            }
        }

        self.assemble(data_set, &connected, &columns)
    }

    // =========================================================================
    // Pieces
    // =========================================================================

    /// The SQL expression computing a metric from one row of the fact table.
    /// COUNT-family metrics render as a null-safe presence indicator, other
    /// aggregations as a zero-defaulted value; composed metrics substitute
    /// their parents recursively, guarding denominators against zero.
    fn metric_sql(&self, data_set: &DataSet, root_alias: &str, metric: &Metric) -> String {
        match metric {
            Metric::Simple(metric) => {
                let column = self.qualified(root_alias, &metric.column_name);
                if metric.aggregation.is_count() {
                    format!("CASE WHEN {column} IS NOT NULL THEN 1 ELSE 0 END")
                } else {
                    format!("COALESCE({column}, 0)")
                }
            }
            Metric::Composed(metric) => {
                let mut sql = String::new();
                for (segment, parent_name) in metric.segments.iter().zip(&metric.parents) {
                    sql.push_str(segment);
                    let parent = data_set
                        .find_metric(parent_name)
                        .expect("composed metric parents are validated when added");
                    let rendered = self.metric_sql(data_set, root_alias, parent);
                    if ends_with_division(segment) {
                        sql.push_str(&format!("NULLIF({rendered}, 0)"));
                    } else {
                        sql.push_str(&format!("({rendered})"));
                    }
                }
                if let Some(last) = metric.segments.last() {
                    sql.push_str(last);
                }
                sql
            }
        }
    }

    /// The derived foreign-key column for a date/duration attribute: dates
    /// truncate to a YYYYMMDD integer, durations pass through.
    fn derived_fk_select(&self, alias: &str, named: &NamedAttribute<'_>) -> Option<String> {
        let column = self.qualified(alias, &named.attribute.column_name);
        let fk_name = self.dialect.quote_identifier(&format!("{} (FK)", named.name));
        match named.attribute.attribute_type {
            Some(AttributeType::Date) => Some(format!(
                "CAST(TO_CHAR({column}, 'YYYYMMDD') AS INTEGER) AS {fk_name}"
            )),
            Some(AttributeType::Duration) => Some(format!("{column} AS {fk_name}")),
            _ => None,
        }
    }

    /// FROM the root entity table plus one LEFT JOIN per resolved path, in
    /// path-discovery order.
    fn from_and_joins(&self, data_set: &DataSet, connected: &[PathAttributes<'_>]) -> String {
        let root = self.model.entity(data_set.root());
        let mut lines = vec![format!(
            "FROM {}.{} AS {}",
            self.dialect.quote_identifier(&root.schema_name),
            self.dialect.quote_identifier(&root.table_name),
            self.dialect.quote_identifier(&root.name)
        )];
        for path_attributes in connected {
            let Some(link_id) = path_attributes.path.last() else {
                continue;
            };
            let link = self.model.link(link_id);
            let target = self.model.entity(path_attributes.entity);
            let alias = self.names.table_alias(self.model, &path_attributes.path);
            let parent = path_attributes.path.parent();
            let parent_alias = if parent.is_empty() {
                root.name.clone()
            } else {
                self.names.table_alias(self.model, &parent)
            };
            lines.push(format!(
                "LEFT JOIN {}.{} AS {} ON {} = {}",
                self.dialect.quote_identifier(&target.schema_name),
                self.dialect.quote_identifier(&target.table_name),
                self.dialect.quote_identifier(&alias),
                self.qualified(&parent_alias, &link.fk_column),
                self.qualified(&alias, &target.pk_column_name)
            ));
        }
        lines.join("\n")
    }

    fn assemble(
        &self,
        data_set: &DataSet,
        connected: &[PathAttributes<'_>],
        columns: &[String],
    ) -> String {
        let mut sql = String::from("SELECT\n    ");
        sql.push_str(&columns.join(",\n    "));
        sql.push('\n');
        sql.push_str(&self.from_and_joins(data_set, connected));
        sql
    }

    fn qualified(&self, alias: &str, column: &str) -> String {
        format!(
            "{}.{}",
            self.dialect.quote_identifier(alias),
            self.dialect.quote_identifier(column)
        )
    }
}

fn is_templated(attribute_type: Option<AttributeType>) -> bool {
    matches!(
        attribute_type,
        Some(AttributeType::Date) | Some(AttributeType::Duration)
    )
}
