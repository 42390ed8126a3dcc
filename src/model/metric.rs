//! Metrics: direct column aggregations and formulas composed from them.

use serde::Serialize;

// =============================================================================
// Vocabulary
// =============================================================================

/// Aggregation methods for simple metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Aggregation {
    #[serde(rename = "sum")]
    Sum,
    #[serde(rename = "avg")]
    Average,
    #[serde(rename = "count")]
    Count,
    #[serde(rename = "distinct-count")]
    DistinctCount,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Average => "avg",
            Aggregation::Count => "count",
            Aggregation::DistinctCount => "distinct-count",
        }
    }

    /// COUNT-family aggregations produce integers and aggregate presence
    /// rather than magnitude.
    pub fn is_count(&self) -> bool {
        matches!(self, Aggregation::Count | Aggregation::DistinctCount)
    }
}

/// How metric values are formatted in front-ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum NumberFormat {
    #[default]
    Standard,
    Currency,
    Percent,
}

impl NumberFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberFormat::Standard => "Standard",
            NumberFormat::Currency => "Currency",
            NumberFormat::Percent => "Percent",
        }
    }
}

// =============================================================================
// Metrics
// =============================================================================

/// A metric computed as a direct aggregation on an entity table column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[must_use = "builders have no effect until used"]
pub struct SimpleMetric {
    /// How the metric is displayed in front-ends, e.g. "Revenue (lifetime)".
    pub name: String,
    /// A meaningful business definition of the metric.
    pub description: String,
    /// The column the aggregation is based on.
    pub column_name: String,
    pub aggregation: Aggregation,
    /// Key business metric, shown by default in overviews.
    pub important_field: bool,
    pub number_format: NumberFormat,
}

impl SimpleMetric {
    pub fn new(name: &str, description: &str, column_name: &str, aggregation: Aggregation) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            column_name: column_name.into(),
            aggregation,
            important_field: false,
            number_format: NumberFormat::Standard,
        }
    }

    pub fn important_field(mut self) -> Self {
        self.important_field = true;
        self
    }

    pub fn with_number_format(mut self, number_format: NumberFormat) -> Self {
        self.number_format = number_format;
        self
    }

    /// Documentation string for displaying the formula in front-ends.
    pub fn display_formula(&self) -> String {
        format!("{}({})", self.aggregation.as_str(), self.column_name)
    }
}

/// A metric composed from other metrics through a formula.
///
/// The formula references other metrics of the same data set by bracketed
/// display name, e.g. `[Revenue (lifetime)] / [# Orders]`. References are
/// resolved when the metric is added to a data set; since every parent must
/// already exist at that point and metrics are immutable afterwards, reference
/// cycles cannot be expressed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[must_use = "builders have no effect until used"]
pub struct ComposedMetric {
    pub name: String,
    pub description: String,
    /// The formula as written, with whitespace runs collapsed.
    pub formula: String,
    pub important_field: bool,
    pub number_format: NumberFormat,
    /// Literal formula text surrounding the references; always one segment
    /// more than there are parents.
    pub(crate) segments: Vec<String>,
    /// Parent metric names in reference order.
    pub(crate) parents: Vec<String>,
}

impl ComposedMetric {
    pub fn new(name: &str, description: &str, formula: &str) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            formula: collapse_whitespace(formula),
            important_field: false,
            number_format: NumberFormat::Standard,
            segments: Vec::new(),
            parents: Vec::new(),
        }
    }

    pub fn important_field(mut self) -> Self {
        self.important_field = true;
        self
    }

    pub fn with_number_format(mut self, number_format: NumberFormat) -> Self {
        self.number_format = number_format;
        self
    }

    /// Parent metric names in the order they appear in the formula.
    pub fn parent_names(&self) -> &[String] {
        &self.parents
    }

    pub fn display_formula(&self) -> String {
        self.formula.clone()
    }
}

/// A metric of a data set: either a direct aggregation or a composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Metric {
    Simple(SimpleMetric),
    Composed(ComposedMetric),
}

impl Metric {
    pub fn name(&self) -> &str {
        match self {
            Metric::Simple(metric) => &metric.name,
            Metric::Composed(metric) => &metric.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Metric::Simple(metric) => &metric.description,
            Metric::Composed(metric) => &metric.description,
        }
    }

    pub fn important_field(&self) -> bool {
        match self {
            Metric::Simple(metric) => metric.important_field,
            Metric::Composed(metric) => metric.important_field,
        }
    }

    pub fn number_format(&self) -> NumberFormat {
        match self {
            Metric::Simple(metric) => metric.number_format,
            Metric::Composed(metric) => metric.number_format,
        }
    }

    pub fn display_formula(&self) -> String {
        match self {
            Metric::Simple(metric) => metric.display_formula(),
            Metric::Composed(metric) => metric.display_formula(),
        }
    }
}

// =============================================================================
// Formula parsing
// =============================================================================

fn collapse_whitespace(formula: &str) -> String {
    formula.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a bracket formula into literal segments and referenced names:
/// `"[a] + [b]"` becomes `(["", " + ", ""], ["a", "b"])`. An unterminated
/// bracket is kept as literal text.
pub(crate) fn parse_formula(formula: &str) -> (Vec<String>, Vec<String>) {
    let mut segments = Vec::new();
    let mut parents = Vec::new();
    let mut literal = String::new();
    let mut chars = formula.chars();
    while let Some(c) = chars.next() {
        if c == '[' {
            let mut name = String::new();
            let mut closed = false;
            for inner in chars.by_ref() {
                if inner == ']' {
                    closed = true;
                    break;
                }
                name.push(inner);
            }
            if closed {
                segments.push(std::mem::take(&mut literal));
                parents.push(name);
            } else {
                literal.push('[');
                literal.push_str(&name);
            }
        } else {
            literal.push(c);
        }
    }
    segments.push(literal);
    (segments, parents)
}

/// Does this formula segment end in a division, so that the reference that
/// follows it is a denominator? Trailing whitespace and opening parentheses
/// are ignored: the parent in `"{} / ({} + 1)"` counts as a denominator.
pub(crate) fn ends_with_division(segment: &str) -> bool {
    segment
        .trim_end_matches(|c: char| c.is_whitespace() || c == '(')
        .ends_with('/')
}
