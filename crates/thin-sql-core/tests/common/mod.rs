#![allow(dead_code)]

use thin_sql_core::ast::{ConditionNode, FieldList, Predicate};
use thin_sql_core::literal::FieldTypeCategory;
use thin_sql_core::schema::{FieldTypeDescriptor, RowSchema};
use thin_sql_core::{SqlParseError, SqlStatement, parse_condition, parse_fields};

/// `{A: String, B: Integer, C: String, D: Integer}`.
pub fn abcd_schema() -> RowSchema {
    RowSchema::new()
        .field("A", FieldTypeCategory::String)
        .field("B", FieldTypeCategory::Integer)
        .field("C", FieldTypeCategory::String)
        .field("D", FieldTypeCategory::Integer)
}

/// A sales table with one field name that needs quoting.
pub fn sales_schema() -> RowSchema {
    RowSchema::new()
        .field("CUSTOMERNAME", FieldTypeCategory::String)
        .field("Country", FieldTypeCategory::String)
        .field(
            "Sales",
            FieldTypeDescriptor::new(FieldTypeCategory::Number)
                .with_length(9)
                .with_precision(2),
        )
        .field("Quantity", FieldTypeCategory::Integer)
        .field("OrderDate", FieldTypeCategory::Date)
        .field("Paid", FieldTypeCategory::Boolean)
        .field("field with space", FieldTypeCategory::String)
}

pub fn condition(text: &str) -> ConditionNode {
    parse_condition(text, &abcd_schema())
        .unwrap_or_else(|e| panic!("Failed to parse: {text}\nError: {e:?}"))
}

pub fn condition_err(text: &str) -> SqlParseError {
    parse_condition(text, &abcd_schema())
        .expect_err(&format!("Expected parse error for: {text}"))
}

pub fn sales_condition(text: &str) -> ConditionNode {
    parse_condition(text, &sales_schema())
        .unwrap_or_else(|e| panic!("Failed to parse: {text}\nError: {e:?}"))
}

pub fn fields(text: &str) -> FieldList {
    parse_fields(None, text, &sales_schema())
        .unwrap_or_else(|e| panic!("Failed to parse: {text}\nError: {e:?}"))
}

pub fn fields_err(text: &str) -> SqlParseError {
    parse_fields(None, text, &sales_schema())
        .expect_err(&format!("Expected parse error for: {text}"))
}

pub fn statement(sql: &str) -> SqlStatement {
    let mut statement = SqlStatement::new(sql)
        .unwrap_or_else(|e| panic!("Failed to create: {sql}\nError: {e:?}"));
    statement
        .parse(&sales_schema())
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"));
    statement
}

pub fn statement_err(sql: &str) -> SqlParseError {
    match SqlStatement::new(sql) {
        Ok(mut statement) => statement
            .parse(&sales_schema())
            .expect_err(&format!("Expected parse error for: {sql}")),
        Err(e) => e,
    }
}

pub fn atom(node: &ConditionNode) -> &Predicate {
    node.predicate()
        .unwrap_or_else(|| panic!("Expected an atomic node, got {node:?}"))
}

/// Verifies that a condition renders to SQL that parses back to the same
/// tree.
pub fn round_trip(text: &str) {
    let tree = condition(text);
    let rendered = tree.to_string();
    let reparsed = condition(&rendered);
    assert_eq!(
        tree, reparsed,
        "Round-trip failed.\n  Input:    {text}\n  Rendered: {rendered}"
    );
}
