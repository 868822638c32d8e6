//! Resolved select, group and order lists.

use serde::{Deserialize, Serialize};

use super::condition::ConditionNode;
use crate::literal::TypedLiteral;
use crate::schema::FieldTypeDescriptor;

/// Aggregation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    Sum,
    Count,
    Min,
    Max,
    Avg,
}

impl Aggregation {
    /// Returns the SQL name of the function.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "SUM",
            Self::Count => "COUNT",
            Self::Min => "MIN",
            Self::Max => "MAX",
            Self::Avg => "AVG",
        }
    }

    /// Recognizes an aggregation keyword, any case.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "SUM" => Some(Self::Sum),
            "COUNT" => Some(Self::Count),
            "MIN" => Some(Self::Min),
            "MAX" => Some(Self::Max),
            "AVG" => Some(Self::Avg),
            _ => None,
        }
    }
}

/// Order direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderDirection {
    /// Ascending order (default).
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// An `IIF(...)` or `CASE WHEN ... END` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalFunction {
    /// The condition as written.
    pub condition_text: String,
    /// The parsed condition.
    pub condition: ConditionNode,
    /// Value when the condition holds.
    pub true_value: TypedLiteral,
    /// Value otherwise.
    pub false_value: TypedLiteral,
}

/// One resolved item of a select, group or order list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name, `*`, or the full expression text for functions and
    /// constants.
    pub source_name: String,
    /// Table qualifier written in front of the field.
    pub table_qualifier: Option<String>,
    /// Output alias.
    pub alias: Option<String>,
    /// Aggregation applied to the field.
    pub aggregation: Option<Aggregation>,
    /// `DISTINCT` inside an aggregation.
    pub is_distinct: bool,
    /// `COUNT(*)`.
    pub is_count_star: bool,
    /// Type from the schema, when it can be determined statically.
    pub resolved_type: Option<FieldTypeDescriptor>,
    /// Value of a constant field.
    pub literal_value: Option<TypedLiteral>,
    /// Payload of a conditional field.
    pub conditional: Option<ConditionalFunction>,
    /// Direction, for ORDER BY items.
    pub order_direction: Option<OrderDirection>,
}

impl FieldDescriptor {
    /// Creates a descriptor for `source_name` with everything else unset.
    #[must_use]
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            ..Self::default()
        }
    }

    /// Returns the alias if there is one, otherwise the source name.
    #[must_use]
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.source_name)
    }

    /// Returns true if the field is aggregated.
    #[must_use]
    pub const fn is_aggregate(&self) -> bool {
        self.aggregation.is_some()
    }

    /// Returns true for constant fields.
    #[must_use]
    pub const fn is_constant(&self) -> bool {
        self.literal_value.is_some()
    }

    /// Returns true for `IIF` and `CASE WHEN` fields.
    #[must_use]
    pub const fn is_conditional(&self) -> bool {
        self.conditional.is_some()
    }
}

/// A resolved comma-separated field list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldList {
    /// `DISTINCT` in front of the list.
    pub is_distinct: bool,
    /// The fields, in the order written.
    pub fields: Vec<FieldDescriptor>,
}

impl FieldList {
    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the list has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates over the fields.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    /// Returns true if any field is aggregated.
    #[must_use]
    pub fn has_aggregates(&self) -> bool {
        self.fields.iter().any(FieldDescriptor::is_aggregate)
    }

    /// Aggregated fields.
    #[must_use]
    pub fn aggregate_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_aggregate()).collect()
    }

    /// Plain fields: not aggregated, not constant, not conditional.
    #[must_use]
    pub fn non_aggregate_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields
            .iter()
            .filter(|f| !f.is_aggregate() && !f.is_constant() && !f.is_conditional())
            .collect()
    }

    /// Conditional fields.
    #[must_use]
    pub fn conditional_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_conditional()).collect()
    }

    /// Constant fields.
    #[must_use]
    pub fn constant_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_constant()).collect()
    }

    /// Finds a field by alias, then a plain field by name.
    ///
    /// Aggregated fields are only found through their alias, which defaults
    /// to the aggregate expression.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|f| f.alias.as_deref().is_some_and(|a| a.eq_ignore_ascii_case(name)))
            .or_else(|| {
                self.fields
                    .iter()
                    .find(|f| !f.is_aggregate() && f.source_name.eq_ignore_ascii_case(name))
            })
    }

    /// Finds the aggregate computing the same value as `aggregate`: same
    /// function, same field, same DISTINCT.
    #[must_use]
    pub fn find_aggregate(&self, aggregate: &FieldDescriptor) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| {
            f.is_aggregate()
                && f.aggregation == aggregate.aggregation
                && f.is_distinct == aggregate.is_distinct
                && f.is_count_star == aggregate.is_count_star
                && f.source_name.eq_ignore_ascii_case(&aggregate.source_name)
        })
    }
}

impl<'a> IntoIterator for &'a FieldList {
    type Item = &'a FieldDescriptor;
    type IntoIter = core::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
