//! Whole statements.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ast::{ConditionNode, FieldList};
use crate::error::{Result, SqlParseError};
use crate::lexer::{split_qualified, split_top_level, top_level_words, unquote_identifier};
use crate::parser::{ConditionParser, FieldListParser, find_clause};
use crate::schema::SchemaProvider;

/// Clause keywords in the order they appear in a statement.
const CLAUSES: [&str; 7] = [
    "SELECT", "FROM", "WHERE", "GROUP BY", "HAVING", "ORDER BY", "LIMIT",
];

/// A `LIMIT count` or `LIMIT offset, count` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    /// Maximum number of rows.
    pub count: u64,
    /// Rows to skip first.
    pub offset: u64,
}

/// A SQL statement split into clauses and resolved against a schema.
///
/// The service name is read from the FROM clause when the statement is
/// created; everything else is filled in by [`SqlStatement::parse`].
///
/// ```
/// use thin_sql_core::SqlStatement;
/// use thin_sql_core::literal::FieldTypeCategory;
/// use thin_sql_core::schema::RowSchema;
///
/// let mut statement =
///     SqlStatement::new("SELECT Country, SUM(Sales) FROM \"Kettle\".\"sales\" GROUP BY Country")
///         .unwrap();
/// assert_eq!(statement.namespace(), Some("Kettle"));
/// assert_eq!(statement.service_name(), "sales");
///
/// let schema = RowSchema::new()
///     .field("Country", FieldTypeCategory::String)
///     .field("Sales", FieldTypeCategory::Number);
/// statement.parse(&schema).unwrap();
/// assert_eq!(statement.select_fields().map(|f| f.len()), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlStatement {
    raw_text: String,
    namespace: Option<String>,
    service_name: String,
    table_alias: Option<String>,

    select_clause: Option<String>,
    from_clause: Option<String>,
    where_clause: Option<String>,
    group_clause: Option<String>,
    having_clause: Option<String>,
    order_clause: Option<String>,
    limit_clause: Option<String>,

    select_fields: Option<FieldList>,
    where_condition: Option<ConditionNode>,
    group_fields: Option<FieldList>,
    having_condition: Option<ConditionNode>,
    order_fields: Option<FieldList>,
    limit: Option<Limit>,
}

impl SqlStatement {
    /// Creates a statement and reads the service it queries.
    ///
    /// # Errors
    ///
    /// Returns `MissingClause("FROM")` without a FROM clause,
    /// `MalformedExpression` if the FROM clause is not a single table with an
    /// optional alias, and `UnbalancedSyntax` for unterminated quotes.
    pub fn new(raw_text: impl Into<String>) -> Result<Self> {
        let raw_text = raw_text.into();
        let from = clause(&raw_text, 1)?.ok_or(SqlParseError::MissingClause("FROM"))?;
        let (namespace, service_name, table_alias) = split_from(&from)?;
        debug!(
            service = %service_name,
            namespace = ?namespace,
            alias = ?table_alias,
            "Created statement"
        );

        Ok(Self {
            raw_text,
            namespace,
            service_name,
            table_alias,
            select_clause: None,
            from_clause: Some(from),
            where_clause: None,
            group_clause: None,
            having_clause: None,
            order_clause: None,
            limit_clause: None,
            select_fields: None,
            where_condition: None,
            group_fields: None,
            having_condition: None,
            order_fields: None,
            limit: None,
        })
    }

    /// Extracts every clause and resolves it against `schema`.
    ///
    /// On error the statement is left as it was. Parsing again against the
    /// same schema gives the same result.
    ///
    /// # Errors
    ///
    /// Returns `MissingClause("SELECT")` without a SELECT clause, or the
    /// first error raised by a clause.
    pub fn parse(&mut self, schema: &dyn SchemaProvider) -> Result<()> {
        debug!(sql = %self.raw_text, "Parsing statement");
        let raw = self.raw_text.as_str();
        let select_clause = clause(raw, 0)?.ok_or(SqlParseError::MissingClause("SELECT"))?;
        let from_clause = clause(raw, 1)?;
        let where_clause = clause(raw, 2)?;
        let group_clause = clause(raw, 3)?;
        let having_clause = clause(raw, 4)?;
        let order_clause = clause(raw, 5)?;
        let limit_clause = clause(raw, 6)?;

        let alias = self.table_alias.as_deref();
        let service = Some(self.service_name.as_str());
        let select_fields = FieldListParser::new(schema)
            .table_alias(alias)
            .service_name(service)
            .parse(&select_clause)?;
        let where_condition = where_clause
            .as_deref()
            .map(|text| {
                ConditionParser::new(schema)
                    .table_alias(alias)
                    .service_name(service)
                    .parse(text)
            })
            .transpose()?;
        let group_fields = group_clause
            .as_deref()
            .map(|text| {
                FieldListParser::new(schema)
                    .table_alias(alias)
                    .service_name(service)
                    .select_fields(&select_fields)
                    .parse(text)
            })
            .transpose()?;
        let having_condition = having_clause
            .as_deref()
            .map(|text| {
                ConditionParser::new(schema)
                    .table_alias(alias)
                    .service_name(service)
                    .select_fields(&select_fields)
                    .parse(text)
            })
            .transpose()?;
        let order_fields = order_clause
            .as_deref()
            .map(|text| {
                FieldListParser::new(schema)
                    .table_alias(alias)
                    .service_name(service)
                    .select_fields(&select_fields)
                    .order_by()
                    .parse(text)
            })
            .transpose()?;
        let limit = limit_clause.as_deref().map(parse_limit).transpose()?;

        self.select_clause = Some(select_clause);
        self.from_clause = from_clause;
        self.where_clause = where_clause;
        self.group_clause = group_clause;
        self.having_clause = having_clause;
        self.order_clause = order_clause;
        self.limit_clause = limit_clause;
        self.select_fields = Some(select_fields);
        self.where_condition = where_condition;
        self.group_fields = group_fields;
        self.having_condition = having_condition;
        self.order_fields = order_fields;
        self.limit = limit;

        debug!(
            service = %self.service_name,
            fields = self.select_fields.as_ref().map_or(0, FieldList::len),
            "Parsed statement"
        );
        Ok(())
    }

    /// The statement text as given.
    #[must_use]
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The namespace qualifying the service, if any.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The service (table) the statement queries.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// The alias given to the service in the FROM clause.
    #[must_use]
    pub fn table_alias(&self) -> Option<&str> {
        self.table_alias.as_deref()
    }

    /// Returns true once [`SqlStatement::parse`] has succeeded.
    #[must_use]
    pub const fn is_parsed(&self) -> bool {
        self.select_fields.is_some()
    }

    #[must_use]
    pub fn select_clause(&self) -> Option<&str> {
        self.select_clause.as_deref()
    }

    #[must_use]
    pub fn from_clause(&self) -> Option<&str> {
        self.from_clause.as_deref()
    }

    #[must_use]
    pub fn where_clause(&self) -> Option<&str> {
        self.where_clause.as_deref()
    }

    #[must_use]
    pub fn group_clause(&self) -> Option<&str> {
        self.group_clause.as_deref()
    }

    #[must_use]
    pub fn having_clause(&self) -> Option<&str> {
        self.having_clause.as_deref()
    }

    #[must_use]
    pub fn order_clause(&self) -> Option<&str> {
        self.order_clause.as_deref()
    }

    #[must_use]
    pub fn limit_clause(&self) -> Option<&str> {
        self.limit_clause.as_deref()
    }

    /// The resolved select list.
    #[must_use]
    pub const fn select_fields(&self) -> Option<&FieldList> {
        self.select_fields.as_ref()
    }

    /// The WHERE condition.
    #[must_use]
    pub const fn where_condition(&self) -> Option<&ConditionNode> {
        self.where_condition.as_ref()
    }

    /// The resolved GROUP BY list.
    #[must_use]
    pub const fn group_fields(&self) -> Option<&FieldList> {
        self.group_fields.as_ref()
    }

    /// The HAVING condition.
    #[must_use]
    pub const fn having_condition(&self) -> Option<&ConditionNode> {
        self.having_condition.as_ref()
    }

    /// The resolved ORDER BY list.
    #[must_use]
    pub const fn order_fields(&self) -> Option<&FieldList> {
        self.order_fields.as_ref()
    }

    #[must_use]
    pub const fn limit(&self) -> Option<Limit> {
        self.limit
    }

    /// `PARAMETER(...)` pairs found in the WHERE clause.
    #[must_use]
    pub fn parameters(&self) -> Vec<(String, String)> {
        self.where_condition
            .as_ref()
            .map(ConditionNode::parameters)
            .unwrap_or_default()
    }
}

/// Extracts the clause at `index` of [`CLAUSES`].
fn clause(raw: &str, index: usize) -> Result<Option<String>> {
    find_clause(raw, CLAUSES[index], &CLAUSES[index + 1..])
}

/// Splits `[namespace.]service [[AS] alias]`.
fn split_from(from: &str) -> Result<(Option<String>, String, Option<String>)> {
    let words = top_level_words(from)?;
    let (table, alias) = match words.as_slice() {
        [table] => (table.slice(from), None),
        [table, alias] => (table.slice(from), Some(alias.slice(from))),
        [table, keyword, alias] if keyword.slice(from).eq_ignore_ascii_case("AS") => {
            (table.slice(from), Some(alias.slice(from)))
        }
        _ => {
            return Err(SqlParseError::MalformedExpression(format!(
                "expected a single table in FROM '{from}'"
            )));
        }
    };

    let (namespace, service_name) = split_qualified(table)?;
    if service_name.is_empty() || namespace.as_deref().is_some_and(str::is_empty) {
        return Err(SqlParseError::MalformedExpression(format!(
            "empty table name in FROM '{from}'"
        )));
    }
    Ok((namespace, service_name, alias.map(unquote_identifier)))
}

fn parse_limit(text: &str) -> Result<Limit> {
    let invalid = || SqlParseError::MalformedExpression(format!("invalid LIMIT '{text}'"));
    let numbers = split_top_level(text, ',')?
        .into_iter()
        .map(|n| n.trim().parse::<u64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>>>()?;
    match numbers.as_slice() {
        [count] => Ok(Limit {
            count: *count,
            offset: 0,
        }),
        [offset, count] => Ok(Limit {
            count: *count,
            offset: *offset,
        }),
        _ => Err(invalid()),
    }
}
