//! WHERE and HAVING condition parsing.
//!
//! The expression is split on top-level `OR` first and every segment on
//! top-level `AND`, which makes `AND` bind tighter than `OR` without a
//! grammar. Parenthesized parts recurse into the same procedure, at most
//! [`MAX_NESTING`] levels deep.

use tracing::trace;

use crate::ast::{
    Comparator, ConditionNode, FieldList, JoiningOperator, Predicate, encode_in_list,
};
use crate::error::{Result, SqlParseError};
use crate::lexer::{Scanner, split_on_keyword, split_top_level, top_level_words, unquote_identifier};
use crate::literal::{extract_literal, unquote_string};
use crate::schema::SchemaProvider;

use super::fields::FieldListParser;
use super::{TableScope, lookup_reference};

/// Deepest parenthesized group a condition may contain.
pub const MAX_NESTING: usize = 64;

/// Parses boolean conditions against a schema.
///
/// ```
/// use thin_sql_core::parser::ConditionParser;
/// use thin_sql_core::schema::RowSchema;
/// use thin_sql_core::literal::FieldTypeCategory;
///
/// let schema = RowSchema::new()
///     .field("A", FieldTypeCategory::String)
///     .field("B", FieldTypeCategory::Integer);
/// let tree = ConditionParser::new(&schema)
///     .parse("A = 'Foo' OR NOT (B > 5)")
///     .unwrap();
/// assert_eq!(tree.children().len(), 2);
/// ```
pub struct ConditionParser<'a> {
    schema: &'a dyn SchemaProvider,
    scope: TableScope<'a>,
    select_fields: Option<&'a FieldList>,
}

impl<'a> ConditionParser<'a> {
    /// Creates a parser that resolves fields against `schema`.
    #[must_use]
    pub const fn new(schema: &'a dyn SchemaProvider) -> Self {
        Self {
            schema,
            scope: TableScope {
                alias: None,
                service: None,
            },
            select_fields: None,
        }
    }

    /// Sets the table alias used as a field qualifier.
    #[must_use]
    pub const fn table_alias(mut self, alias: Option<&'a str>) -> Self {
        self.scope.alias = alias;
        self
    }

    /// Sets the service name, which may also qualify fields.
    #[must_use]
    pub const fn service_name(mut self, service: Option<&'a str>) -> Self {
        self.scope.service = service;
        self
    }

    pub(super) const fn scope(mut self, scope: TableScope<'a>) -> Self {
        self.scope = scope;
        self
    }

    /// Lets operands refer to select list items by alias or expression, as
    /// HAVING clauses do.
    #[must_use]
    pub const fn select_fields(mut self, fields: &'a FieldList) -> Self {
        self.select_fields = Some(fields);
        self
    }

    /// Parses `text` into a condition tree.
    ///
    /// Blank text gives the empty condition.
    ///
    /// # Errors
    ///
    /// Returns `UnbalancedSyntax`, `UnknownOperator`, `UnknownField`,
    /// `EmptyParameterName`, `EmptyParameterValue` or `MalformedExpression`
    /// for the first problem found. Groups nested deeper than
    /// [`MAX_NESTING`] are a `MalformedExpression`.
    pub fn parse(&self, text: &str) -> Result<ConditionNode> {
        if text.trim().is_empty() {
            return Ok(ConditionNode::empty());
        }
        trace!(condition = %text, "Parsing condition");
        self.parse_or(text, 0)
    }

    fn parse_or(&self, text: &str, depth: usize) -> Result<ConditionNode> {
        let mut segments = Vec::new();
        for segment in split_on_keyword(text, "OR")? {
            segments.push(self.parse_and(segment, depth)?);
        }
        Ok(join(segments, JoiningOperator::Or))
    }

    fn parse_and(&self, segment: &str, depth: usize) -> Result<ConditionNode> {
        let mut parts = Vec::new();
        for part in split_on_keyword(segment, "AND")? {
            parts.push(self.parse_part(part, depth)?);
        }
        Ok(join(parts, JoiningOperator::And))
    }

    /// Parses one AND-part: `[NOT]... (group)` or `[NOT]... predicate`.
    fn parse_part(&self, part: &str, depth: usize) -> Result<ConditionNode> {
        let part = part.trim();
        if part.is_empty() {
            return Err(SqlParseError::MalformedExpression(String::from(
                "missing operand of AND/OR",
            )));
        }

        let mut scanner = Scanner::new(part);
        let mut negated = false;
        while scanner.eat_keyword("NOT") {
            negated = !negated;
        }
        let body = scanner.rest().trim();

        if let Some(inner) = enclosed_group(body)? {
            if inner.trim().is_empty() {
                return Err(SqlParseError::MalformedExpression(part.to_string()));
            }
            if depth >= MAX_NESTING {
                return Err(SqlParseError::MalformedExpression(String::from(
                    "nesting too deep",
                )));
            }
            let mut node = self.parse_or(inner, depth + 1)?;
            node.negated ^= negated;
            trace!(group = %inner, negated, "Parsed parenthesized condition");
            return Ok(ConditionNode::composite(vec![node]));
        }

        let mut node = ConditionNode::atomic(self.parse_predicate(body)?);
        node.negated = negated;
        Ok(node)
    }

    fn parse_predicate(&self, text: &str) -> Result<Predicate> {
        if text.is_empty() {
            return Err(SqlParseError::MalformedExpression(String::from(
                "NOT without a condition",
            )));
        }

        let mut scanner = Scanner::new(text);
        if scanner.read_word().eq_ignore_ascii_case("PARAMETER") && scanner.at_char('(') {
            return parse_parameter(text, scanner);
        }

        let mut scanner = Scanner::new(text);
        let left = scanner.read_operand()?;
        if left.is_empty() {
            return Err(SqlParseError::MalformedExpression(text.to_string()));
        }
        let left_field = self.resolve_field(left)?;
        scanner.skip_whitespace();

        let comparator = if let Some(symbol) = scanner.read_symbol() {
            Comparator::from_symbol(symbol)
                .ok_or_else(|| SqlParseError::UnknownOperator(symbol.to_string()))?
        } else {
            let word = scanner.read_word();
            if word.eq_ignore_ascii_case("IS") {
                return parse_is_null(text, left_field, scanner);
            }
            if word.eq_ignore_ascii_case("IN") {
                return parse_in_list(text, left_field, scanner);
            }
            if word.is_empty() {
                return Err(match scanner.rest().split_whitespace().next() {
                    Some(token) => SqlParseError::UnknownOperator(token.to_string()),
                    None => SqlParseError::MalformedExpression(format!(
                        "missing comparator in '{text}'"
                    )),
                });
            }
            Comparator::from_keyword(word)
                .ok_or_else(|| SqlParseError::UnknownOperator(word.to_string()))?
        };

        let right = scanner.rest().trim();
        if right.is_empty() {
            return Err(SqlParseError::MalformedExpression(format!(
                "missing right operand in '{text}'"
            )));
        }

        let mut predicate = Predicate::new(left_field, comparator);
        if let Some(value) = extract_literal(right) {
            predicate.right_literal = Some(value.to_string());
            predicate.right_value = Some(value);
        } else if top_level_words(right)?.len() > 1 {
            return Err(SqlParseError::MalformedExpression(format!(
                "unexpected text after '{}' in '{text}'",
                comparator.as_str()
            )));
        } else {
            predicate.right_field = Some(self.resolve_field(right)?);
        }
        trace!(
            left = %predicate.left_field,
            comparator = comparator.as_str(),
            "Parsed predicate"
        );
        Ok(predicate)
    }

    /// Resolves an operand to a field name, trying the select list before
    /// the schema.
    ///
    /// With a select list, an aggregate call must match one of its
    /// aggregates, however it is spelled.
    fn resolve_field(&self, text: &str) -> Result<String> {
        let text = text.trim();
        if let Some(fields) = self.select_fields {
            if let Some(field) = fields.find(text) {
                return Ok(field.output_name().to_string());
            }
            let aggregate = FieldListParser::new(self.schema)
                .scope(self.scope)
                .aggregate_call(text)?;
            if let Some(aggregate) = aggregate {
                trace!(operand = %text, "Matching aggregate against the select list");
                return fields
                    .find_aggregate(&aggregate)
                    .map(|field| field.output_name().to_string())
                    .ok_or_else(|| SqlParseError::UnknownField(text.to_string()));
            }
            let selected = self
                .scope
                .unqualified(text)?
                .and_then(|name| fields.find(&name));
            if let Some(field) = selected {
                return Ok(field.output_name().to_string());
            }
        }
        lookup_reference(self.schema, self.scope, text)?
            .map(|reference| reference.name)
            .ok_or_else(|| SqlParseError::UnknownField(text.to_string()))
    }
}

/// Parses `text` against `schema` with no table alias and no select list.
///
/// # Errors
///
/// See [`ConditionParser::parse`].
pub fn parse_condition(text: &str, schema: &dyn SchemaProvider) -> Result<ConditionNode> {
    ConditionParser::new(schema).parse(text)
}

/// Combines sibling nodes. A single node is returned as is.
fn join(mut nodes: Vec<ConditionNode>, joining: JoiningOperator) -> ConditionNode {
    if nodes.len() == 1 {
        if let Some(node) = nodes.pop() {
            return node;
        }
    }
    for (i, node) in nodes.iter_mut().enumerate() {
        node.joining = if i == 0 {
            JoiningOperator::None
        } else {
            joining
        };
    }
    ConditionNode::composite(nodes)
}

/// Returns the interior of `text` if the whole of it is one parenthesized
/// group.
fn enclosed_group(text: &str) -> Result<Option<&str>> {
    if !text.starts_with('(') {
        return Ok(None);
    }
    let mut scanner = Scanner::new(text);
    scanner.skip_group()?;
    let end = scanner.position();
    if !scanner.rest().trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(&text[1..end - 1]))
}

/// Strips one layer of single quotes and collapses doubled quotes.
fn strip_single_quotes(token: &str) -> String {
    let token = token.trim();
    unquote_string(token).unwrap_or_else(|| {
        match token
            .strip_prefix('\'')
            .and_then(|t| t.strip_suffix('\''))
        {
            Some(inner) => inner.replace("''", "'"),
            None => token.to_string(),
        }
    })
}

/// `PARAMETER('name') = 'value'`, with the scanner on the `(`.
fn parse_parameter(text: &str, mut scanner: Scanner<'_>) -> Result<Predicate> {
    let open = scanner.position();
    scanner.skip_group()?;
    let name = strip_single_quotes(&text[open + 1..scanner.position() - 1]);
    let name = unquote_identifier(&name);
    if name.trim().is_empty() {
        return Err(SqlParseError::EmptyParameterName);
    }

    scanner.skip_whitespace();
    match scanner.read_symbol() {
        Some("=") => {}
        Some(symbol) => return Err(SqlParseError::UnknownOperator(symbol.to_string())),
        None => {
            return Err(SqlParseError::MalformedExpression(format!(
                "expected '=' after parameter in '{text}'"
            )));
        }
    }

    let value = strip_single_quotes(scanner.rest());
    if value.trim().is_empty() {
        return Err(SqlParseError::EmptyParameterValue);
    }

    trace!(parameter = %name, "Parsed parameter");
    let mut predicate = Predicate::new(name, Comparator::ParameterEq);
    predicate.right_literal = Some(value);
    Ok(predicate)
}

/// `IS NULL` or `IS NOT NULL`, with the scanner after `IS`.
fn parse_is_null(text: &str, left_field: String, mut scanner: Scanner<'_>) -> Result<Predicate> {
    let comparator = if scanner.eat_keyword("NOT") {
        Comparator::IsNotNull
    } else {
        Comparator::IsNull
    };
    if !scanner.eat_keyword("NULL") {
        let token = scanner.rest().split_whitespace().next().unwrap_or_default();
        return Err(SqlParseError::UnknownOperator(format!("IS {token}")));
    }
    expect_end(text, &scanner)?;
    Ok(Predicate::new(left_field, comparator))
}

/// `IN (v1, v2, ...)`, with the scanner after `IN`.
fn parse_in_list(text: &str, left_field: String, mut scanner: Scanner<'_>) -> Result<Predicate> {
    if !scanner.at_char('(') {
        return Err(SqlParseError::MalformedExpression(format!(
            "expected '(' after IN in '{text}'"
        )));
    }
    let open = scanner.position();
    scanner.skip_group()?;
    let list = &text[open + 1..scanner.position() - 1];
    expect_end(text, &scanner)?;

    if list.trim().is_empty() {
        return Err(SqlParseError::MalformedExpression(format!(
            "empty IN list in '{text}'"
        )));
    }
    let values: Vec<String> = split_top_level(list, ',')?
        .into_iter()
        .map(strip_single_quotes)
        .collect();

    let mut predicate = Predicate::new(left_field, Comparator::InList);
    predicate.right_literal = Some(encode_in_list(&values));
    Ok(predicate)
}

fn expect_end(text: &str, scanner: &Scanner<'_>) -> Result<()> {
    let rest = scanner.rest().trim();
    if rest.is_empty() {
        Ok(())
    } else {
        Err(SqlParseError::MalformedExpression(format!(
            "unexpected '{rest}' in '{text}'"
        )))
    }
}
