//! SELECT, GROUP BY and ORDER BY list resolution.

use tracing::trace;

use crate::ast::{
    Aggregation, ConditionalFunction, FieldDescriptor, FieldList, OrderDirection,
};
use crate::error::{Result, SqlParseError};
use crate::lexer::{
    Scanner, Span, find_keyword, split_qualified, split_top_level, top_level_words,
    unquote_identifier,
};
use crate::literal::{TypedLiteral, extract_literal};
use crate::schema::{FieldTypeDescriptor, SchemaProvider};

use super::clause::find_clause;
use super::condition::ConditionParser;
use super::{TableScope, lookup_reference};

/// Resolves comma-separated field lists against a schema.
pub struct FieldListParser<'a> {
    schema: &'a dyn SchemaProvider,
    scope: TableScope<'a>,
    select_fields: Option<&'a FieldList>,
    order_by: bool,
}

impl<'a> FieldListParser<'a> {
    /// Creates a parser for select lists.
    #[must_use]
    pub const fn new(schema: &'a dyn SchemaProvider) -> Self {
        Self {
            schema,
            scope: TableScope {
                alias: None,
                service: None,
            },
            select_fields: None,
            order_by: false,
        }
    }

    /// Sets the table alias that may qualify field names.
    #[must_use]
    pub const fn table_alias(mut self, alias: Option<&'a str>) -> Self {
        self.scope.alias = alias;
        self
    }

    /// Sets the service name, which may also qualify field names.
    #[must_use]
    pub const fn service_name(mut self, service: Option<&'a str>) -> Self {
        self.scope.service = service;
        self
    }

    pub(super) const fn scope(mut self, scope: TableScope<'a>) -> Self {
        self.scope = scope;
        self
    }

    /// Lets items refer to select list entries by alias or expression.
    #[must_use]
    pub const fn select_fields(mut self, fields: &'a FieldList) -> Self {
        self.select_fields = Some(fields);
        self
    }

    /// Accepts a trailing `ASC` or `DESC` on every item.
    #[must_use]
    pub const fn order_by(mut self) -> Self {
        self.order_by = true;
        self
    }

    /// Parses `text` into a field list.
    ///
    /// # Errors
    ///
    /// Returns `UnknownField` for names the schema does not know,
    /// `InvalidLiteral` for unreadable conditional branches, and
    /// `MalformedExpression` or `UnbalancedSyntax` for broken items.
    pub fn parse(&self, text: &str) -> Result<FieldList> {
        let mut list = FieldList::default();
        let mut scanner = Scanner::new(text.trim());
        if scanner.eat_keyword("DISTINCT") {
            list.is_distinct = true;
        }
        let rest = scanner.rest();
        if rest.trim().is_empty() {
            return Ok(list);
        }

        for item in split_top_level(rest, ',')? {
            self.parse_item(item, &mut list.fields)?;
        }
        trace!(fields = list.len(), distinct = list.is_distinct, "Resolved field list");
        Ok(list)
    }

    fn parse_item(&self, item: &str, out: &mut Vec<FieldDescriptor>) -> Result<()> {
        let item = item.trim();
        if item.is_empty() {
            return Err(SqlParseError::MalformedExpression(String::from(
                "empty item in field list",
            )));
        }

        let (body, direction) = if self.order_by {
            split_direction(item)?
        } else {
            (item, None)
        };
        let (expression, alias) = split_alias(body)?;

        let mut descriptors = self.classify(expression, alias)?;
        for descriptor in &mut descriptors {
            if direction.is_some() {
                descriptor.order_direction = direction;
            }
        }
        out.append(&mut descriptors);
        Ok(())
    }

    fn classify(
        &self,
        expression: &str,
        alias: Option<String>,
    ) -> Result<Vec<FieldDescriptor>> {
        if let Some(qualifier) = star_qualifier(expression)? {
            if alias.is_some() {
                return Err(SqlParseError::MalformedExpression(format!(
                    "'{expression}' cannot take an alias"
                )));
            }
            return Ok(self.expand_star(qualifier));
        }

        if let Some(found) = self
            .select_fields
            .and_then(|fields| fields.find(expression))
        {
            let mut descriptor = found.clone();
            if alias.is_some() {
                descriptor.alias = alias;
            }
            return Ok(vec![descriptor]);
        }

        let descriptor = if let Some((function, inner)) = function_call(expression)? {
            if let Some(aggregation) = Aggregation::from_keyword(function) {
                let parsed = self.parse_aggregation(expression, aggregation, inner)?;
                let mut descriptor = self
                    .select_fields
                    .and_then(|fields| fields.find_aggregate(&parsed))
                    .cloned()
                    .unwrap_or(parsed);
                if alias.is_some() {
                    descriptor.alias = alias;
                }
                descriptor
            } else if function.eq_ignore_ascii_case("IIF") {
                self.parse_iif(expression, inner, alias)?
            } else {
                return Err(SqlParseError::MalformedExpression(format!(
                    "unknown function '{function}'"
                )));
            }
        } else if Scanner::new(expression).eat_keyword("CASE") {
            self.parse_case(expression, alias)?
        } else if let Some(value) = extract_literal(expression) {
            let mut descriptor = FieldDescriptor::new(expression);
            descriptor.resolved_type = Some(FieldTypeDescriptor::new(value.category()));
            descriptor.literal_value = Some(value);
            descriptor.alias = alias;
            descriptor
        } else {
            let mut descriptor = self.resolve(expression)?;
            if alias.is_some() {
                descriptor.alias = alias;
            }
            descriptor
        };
        trace!(field = %descriptor.source_name, alias = ?descriptor.alias, "Resolved field");
        Ok(vec![descriptor])
    }

    /// Looks up a plain or qualified field name, select list first.
    fn resolve(&self, text: &str) -> Result<FieldDescriptor> {
        if let Some(fields) = self.select_fields {
            let selected = self
                .scope
                .unqualified(text)?
                .and_then(|name| fields.find(&name));
            if let Some(found) = selected {
                return Ok(found.clone());
            }
        }

        let reference = lookup_reference(self.schema, self.scope, text)?
            .ok_or_else(|| SqlParseError::UnknownField(text.to_string()))?;
        let mut descriptor = FieldDescriptor::new(reference.name);
        descriptor.table_qualifier = reference.qualifier;
        descriptor.resolved_type = Some(reference.field_type);
        Ok(descriptor)
    }

    fn expand_star(&self, qualifier: Option<String>) -> Vec<FieldDescriptor> {
        self.schema
            .ordered_fields()
            .into_iter()
            .map(|(name, field_type)| {
                let mut descriptor = FieldDescriptor::new(name);
                descriptor.table_qualifier.clone_from(&qualifier);
                descriptor.resolved_type = Some(field_type);
                descriptor
            })
            .collect()
    }

    /// Parses `expression` as an aggregate call, if it is one.
    pub(super) fn aggregate_call(&self, expression: &str) -> Result<Option<FieldDescriptor>> {
        let Some((function, inner)) = function_call(expression)? else {
            return Ok(None);
        };
        Aggregation::from_keyword(function)
            .map(|aggregation| self.parse_aggregation(expression, aggregation, inner))
            .transpose()
    }

    /// Builds an aggregate aliased by its own expression text.
    fn parse_aggregation(
        &self,
        expression: &str,
        aggregation: Aggregation,
        inner: &str,
    ) -> Result<FieldDescriptor> {
        let inner = inner.trim();

        if inner == "*" {
            if aggregation != Aggregation::Count {
                return Err(SqlParseError::MalformedExpression(format!(
                    "{}(*) is not supported",
                    aggregation.as_str()
                )));
            }
            let mut descriptor = FieldDescriptor::new("*");
            descriptor.aggregation = Some(aggregation);
            descriptor.is_count_star = true;
            descriptor.alias = Some(expression.to_string());
            return Ok(descriptor);
        }

        let mut scanner = Scanner::new(inner);
        let is_distinct = scanner.eat_keyword("DISTINCT");
        let field = scanner.rest().trim();
        if field.is_empty() {
            return Err(SqlParseError::MalformedExpression(format!(
                "missing field in '{expression}'"
            )));
        }

        let reference = lookup_reference(self.schema, self.scope, field)?
            .ok_or_else(|| SqlParseError::UnknownField(field.to_string()))?;
        let mut descriptor = FieldDescriptor::new(reference.name);
        descriptor.table_qualifier = reference.qualifier;
        descriptor.resolved_type = Some(reference.field_type);
        descriptor.aggregation = Some(aggregation);
        descriptor.is_distinct = is_distinct;
        descriptor.alias = Some(expression.to_string());
        Ok(descriptor)
    }

    /// `IIF(condition, true-literal, false-literal)`.
    fn parse_iif(
        &self,
        expression: &str,
        inner: &str,
        alias: Option<String>,
    ) -> Result<FieldDescriptor> {
        let args = split_top_level(inner, ',')?;
        let [condition, when_true, when_false] = args.as_slice() else {
            return Err(SqlParseError::MalformedExpression(format!(
                "IIF takes 3 arguments, got {} in '{expression}'",
                args.len()
            )));
        };
        self.conditional(expression, condition, when_true, when_false, alias)
    }

    /// `CASE WHEN condition THEN true-literal ELSE false-literal END`.
    fn parse_case(&self, expression: &str, alias: Option<String>) -> Result<FieldDescriptor> {
        let missing = |keyword: &str| {
            SqlParseError::MalformedExpression(format!("missing {keyword} in '{expression}'"))
        };
        let end = find_keyword(expression, "END")?.ok_or_else(|| missing("END"))?;
        if end.end != expression.len() {
            return Err(SqlParseError::MalformedExpression(format!(
                "unexpected text after END in '{expression}'"
            )));
        }
        let condition =
            find_clause(expression, "WHEN", &["THEN"])?.ok_or_else(|| missing("WHEN"))?;
        let when_true =
            find_clause(expression, "THEN", &["ELSE"])?.ok_or_else(|| missing("THEN"))?;
        let when_false =
            find_clause(expression, "ELSE", &["END"])?.ok_or_else(|| missing("ELSE"))?;
        self.conditional(expression, &condition, &when_true, &when_false, alias)
    }

    fn conditional(
        &self,
        expression: &str,
        condition: &str,
        when_true: &str,
        when_false: &str,
        alias: Option<String>,
    ) -> Result<FieldDescriptor> {
        let condition_text = condition.trim();
        let tree = ConditionParser::new(self.schema)
            .scope(self.scope)
            .parse(condition_text)?;
        if tree.is_empty() {
            return Err(SqlParseError::MalformedExpression(format!(
                "missing condition in '{expression}'"
            )));
        }

        let mut descriptor = FieldDescriptor::new(expression);
        descriptor.alias = alias;
        descriptor.conditional = Some(ConditionalFunction {
            condition_text: condition_text.to_string(),
            condition: tree,
            true_value: branch_literal(when_true)?,
            false_value: branch_literal(when_false)?,
        });
        Ok(descriptor)
    }
}

/// Parses a select list with an optional table alias and no select list
/// context.
///
/// # Errors
///
/// See [`FieldListParser::parse`].
pub fn parse_fields(
    table_alias: Option<&str>,
    text: &str,
    schema: &dyn SchemaProvider,
) -> Result<FieldList> {
    FieldListParser::new(schema).table_alias(table_alias).parse(text)
}

fn branch_literal(text: &str) -> Result<TypedLiteral> {
    let text = text.trim();
    extract_literal(text).ok_or_else(|| SqlParseError::InvalidLiteral(text.to_string()))
}

/// Splits off a trailing `ASC` or `DESC`.
fn split_direction(item: &str) -> Result<(&str, Option<OrderDirection>)> {
    let words = top_level_words(item)?;
    if let [.., before, last] = words.as_slice() {
        let direction = match last.slice(item).to_ascii_uppercase().as_str() {
            "ASC" => Some(OrderDirection::Asc),
            "DESC" => Some(OrderDirection::Desc),
            _ => None,
        };
        if direction.is_some() {
            return Ok((&item[..before.end], direction));
        }
    }
    Ok((item, Some(OrderDirection::Asc)))
}

/// Splits `expr AS alias` or `expr alias` into expression and alias.
fn split_alias(item: &str) -> Result<(&str, Option<String>)> {
    let words = top_level_words(item)?;
    match words.as_slice() {
        [.., expression_end, keyword, alias]
            if keyword.slice(item).eq_ignore_ascii_case("AS") =>
        {
            Ok((&item[..expression_end.end], Some(unquote_identifier(alias.slice(item)))))
        }
        [.., expression_end, alias] if is_bare_alias(item, expression_end, alias) => {
            Ok((&item[..expression_end.end], Some(unquote_identifier(alias.slice(item)))))
        }
        _ => Ok((item, None)),
    }
}

fn is_bare_alias(item: &str, before: &Span, alias: &Span) -> bool {
    let alias = alias.slice(item);
    let before = before.slice(item);
    let quoted = alias.len() >= 2
        && ((alias.starts_with('"') && alias.ends_with('"'))
            || (alias.starts_with('`') && alias.ends_with('`')));
    let identifier = alias.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && alias.chars().all(|c| c.is_alphanumeric() || c == '_');
    let keyword = ["END", "AS", "DESC", "ASC"]
        .iter()
        .any(|k| alias.eq_ignore_ascii_case(k));
    // `DATE '...'` and `TIMESTAMP '...'` are one constant.
    let prefix = ["DATE", "TIMESTAMP", "DISTINCT"]
        .iter()
        .any(|k| before.eq_ignore_ascii_case(k));
    (quoted || identifier) && !keyword && !prefix
}

/// Recognizes `*` and `qualifier.*`, returning the qualifier.
fn star_qualifier(expression: &str) -> Result<Option<Option<String>>> {
    if expression == "*" {
        return Ok(Some(None));
    }
    if !expression.ends_with(".*") {
        return Ok(None);
    }
    let (qualifier, name) = split_qualified(expression)?;
    Ok((name == "*").then_some(qualifier))
}

/// Recognizes `name(...)` spanning the whole expression.
fn function_call(expression: &str) -> Result<Option<(&str, &str)>> {
    let mut scanner = Scanner::new(expression);
    let name = scanner.read_word();
    if name.is_empty() || !scanner.at_char('(') {
        return Ok(None);
    }
    let open = scanner.position();
    scanner.skip_group()?;
    if !scanner.rest().trim().is_empty() {
        return Ok(None);
    }
    Ok(Some((name, &expression[open + 1..scanner.position() - 1])))
}
