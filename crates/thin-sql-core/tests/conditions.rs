//! Tests for WHERE and HAVING condition parsing.

mod common;
use common::*;

use thin_sql_core::SqlParseError;
use thin_sql_core::ast::{Comparator, JoiningOperator};
use thin_sql_core::literal::TypedLiteral;
use thin_sql_core::parser::{ConditionParser, MAX_NESTING};

#[test]
fn and_binds_tighter_than_or() {
    let tree = condition("A='Foo' OR B>5 AND C='foo' OR D=123");
    let children = tree.children();
    assert_eq!(children.len(), 3);

    assert!(children[0].is_atomic());
    assert_eq!(children[0].joining, JoiningOperator::None);
    assert_eq!(atom(&children[0]).left_field, "A");
    assert_eq!(atom(&children[0]).right_literal.as_deref(), Some("Foo"));

    let and_group = &children[1];
    assert_eq!(and_group.joining, JoiningOperator::Or);
    assert_eq!(and_group.children().len(), 2);
    assert_eq!(and_group.children()[0].joining, JoiningOperator::None);
    assert_eq!(atom(&and_group.children()[0]).comparator, Comparator::Gt);
    assert_eq!(and_group.children()[1].joining, JoiningOperator::And);
    assert_eq!(atom(&and_group.children()[1]).right_literal.as_deref(), Some("foo"));

    assert_eq!(children[2].joining, JoiningOperator::Or);
    assert_eq!(atom(&children[2]).right_value, Some(TypedLiteral::Integer(123)));
}

#[test]
fn negated_group() {
    let tree = condition("A='Foo' AND NOT ( B>5 OR C='AAA' )");
    assert_eq!(tree.children().len(), 2);

    let wrapper = &tree.children()[1];
    assert_eq!(wrapper.joining, JoiningOperator::And);
    assert!(!wrapper.negated);
    assert_eq!(wrapper.children().len(), 1);

    let inner = &wrapper.children()[0];
    assert!(inner.negated);
    assert_eq!(inner.children().len(), 2);
    assert_eq!(inner.children()[0].joining, JoiningOperator::None);
    assert_eq!(inner.children()[1].joining, JoiningOperator::Or);
    assert_eq!(atom(&inner.children()[1]).right_literal.as_deref(), Some("AAA"));
}

#[test]
fn nested_groups() {
    let tree = condition("(A = 'x' OR (B = 1 AND (C = 'y' OR D = 2)))");
    assert_eq!(tree.children().len(), 1);
    let or_group = &tree.children()[0];
    assert_eq!(or_group.children().len(), 2);
    let and_wrapper = &or_group.children()[1];
    let and_group = &and_wrapper.children()[0];
    assert_eq!(and_group.children().len(), 2);
    assert_eq!(and_group.children()[1].children()[0].children().len(), 2);
}

#[test]
fn negated_atomic() {
    let tree = condition("NOT A = 'x' AND B <> 3");
    assert!(tree.children()[0].negated);
    assert!(!tree.children()[1].negated);
    assert_eq!(atom(&tree.children()[1]).comparator, Comparator::Ne);
}

#[test]
fn in_list_escaping() {
    let tree = sales_condition("CUSTOMERNAME IN (''';''', 'Toys ''R'' us' )");
    let predicate = atom(&tree);
    assert_eq!(predicate.comparator, Comparator::InList);
    assert_eq!(predicate.right_literal.as_deref(), Some("'\\;';Toys 'R' us"));
}

#[test]
fn in_list_commas_inside_quotes() {
    let tree = sales_condition(
        "CUSTOMERNAME IN ('ANNA''S DECORATIONS, LTD', 'MEN ''R'' US RETAILERS, Ltd.')",
    );
    let values = atom(&tree).in_list_values().unwrap();
    assert_eq!(
        values,
        vec!["ANNA'S DECORATIONS, LTD", "MEN 'R' US RETAILERS, Ltd."]
    );
}

#[test]
fn in_list_of_numbers() {
    let tree = condition("B IN (1, 2,3)");
    assert_eq!(atom(&tree).right_literal.as_deref(), Some("1;2;3"));
}

#[test]
fn every_symbolic_comparator() {
    let cases = [
        ("=", Comparator::Eq),
        (">", Comparator::Gt),
        (">=", Comparator::Ge),
        ("=>", Comparator::Ge),
        ("<", Comparator::Lt),
        ("<=", Comparator::Le),
        ("<>", Comparator::Ne),
        ("!=", Comparator::Ne),
    ];
    for (symbol, comparator) in cases {
        let tree = condition(&format!("B {symbol} 5"));
        assert_eq!(atom(&tree).comparator, comparator, "{symbol}");
        let tree = condition(&format!("B{symbol}5"));
        assert_eq!(atom(&tree).comparator, comparator, "{symbol}");
    }
}

#[test]
fn keyword_comparators() {
    assert_eq!(atom(&condition("A LIKE 'F%'")).comparator, Comparator::Like);
    assert_eq!(atom(&condition("A like 'F%'")).comparator, Comparator::Like);
    assert_eq!(atom(&condition("A REGEX '^F.*'")).comparator, Comparator::Regexp);
    assert_eq!(atom(&condition("A REGEXP '^F.*'")).comparator, Comparator::Regexp);
    assert_eq!(atom(&condition("A IS NULL")).comparator, Comparator::IsNull);
    assert_eq!(atom(&condition("A IS NOT NULL")).comparator, Comparator::IsNotNull);
}

#[test]
fn like_predicate_matches() {
    let tree = sales_condition("CUSTOMERNAME LIKE 'Toys%'");
    let pattern = atom(&tree).like_pattern().unwrap();
    assert!(pattern.is_match("Toys 'R' us"));
    assert!(!pattern.is_match("Mini Toys"));
}

#[test]
fn quoted_fields_and_qualifiers() {
    let schema = sales_schema();
    let tree = ConditionParser::new(&schema)
        .service_name(Some("Sales"))
        .parse("\"Sales\".\"field with space\" = 'x' AND sales.Quantity > 2")
        .unwrap();
    assert_eq!(atom(&tree.children()[0]).left_field, "field with space");
    assert_eq!(atom(&tree.children()[1]).left_field, "Quantity");
}

#[test]
fn unknown_qualifier_is_rejected() {
    assert_eq!(
        condition_err("bogus.A = 'x'"),
        SqlParseError::UnknownField(String::from("bogus.A"))
    );

    let schema = abcd_schema();
    let parser = ConditionParser::new(&schema)
        .table_alias(Some("t"))
        .service_name(Some("Service"));
    assert!(parser.parse("t.A = 'x' AND Service.B > 1").is_ok());
    assert_eq!(
        parser.parse("A = other.C"),
        Err(SqlParseError::UnknownField(String::from("other.C")))
    );
}

#[test]
fn dotted_field_name_needs_no_scope() {
    let schema = thin_sql_core::RowSchema::new()
        .field("geo.country", thin_sql_core::FieldTypeCategory::String);
    let tree = thin_sql_core::parse_condition("geo.country = 'BE'", &schema).unwrap();
    assert_eq!(atom(&tree).left_field, "geo.country");
}

#[test]
fn nesting_up_to_the_limit() {
    let nested = |depth: usize| format!("{}B = 1{}", "(".repeat(depth), ")".repeat(depth));

    let tree = condition(&nested(MAX_NESTING));
    assert_eq!(tree.predicates().len(), 1);

    assert_eq!(
        condition_err(&nested(MAX_NESTING + 1)),
        SqlParseError::MalformedExpression(String::from("nesting too deep"))
    );
    assert_eq!(
        condition_err(&nested(10_000)),
        SqlParseError::MalformedExpression(String::from("nesting too deep"))
    );
}

#[test]
fn field_to_field_comparison() {
    let tree = condition("A = C");
    assert_eq!(atom(&tree).right_field.as_deref(), Some("C"));
    assert_eq!(atom(&tree).right_literal, None);
}

#[test]
fn typed_right_values() {
    let tree = sales_condition(
        "Sales > 10.5 AND Paid = TRUE AND OrderDate >= DATE '2012-03-04' AND Quantity = -2",
    );
    let values: Vec<_> = tree
        .predicates()
        .into_iter()
        .map(|p| p.right_value.clone())
        .collect();
    assert_eq!(values[0], Some(TypedLiteral::Number(10.5)));
    assert_eq!(values[1], Some(TypedLiteral::Boolean(true)));
    assert_eq!(
        tree.predicates()[2].right_literal.as_deref(),
        Some("2012/03/04 00:00:00.000")
    );
    assert_eq!(values[3], Some(TypedLiteral::Integer(-2)));
}

#[test]
fn parameters() {
    let tree = condition(
        "A = 'x' AND PARAMETER('country') = 'Belgium' AND Parameter ( 'year' )='2012'",
    );
    assert_eq!(
        tree.parameters(),
        vec![
            (String::from("country"), String::from("Belgium")),
            (String::from("year"), String::from("2012")),
        ]
    );
    assert_eq!(atom(&tree.children()[1]).comparator, Comparator::ParameterEq);
}

#[test]
fn parameter_errors() {
    assert_eq!(condition_err("PARAMETER(' ') = 'x'"), SqlParseError::EmptyParameterName);
    assert_eq!(condition_err("PARAMETER('p') = ' '"), SqlParseError::EmptyParameterValue);
    assert_eq!(
        condition_err("PARAMETER('p') > 'x'"),
        SqlParseError::UnknownOperator(String::from(">"))
    );
}

#[test]
fn empty_condition() {
    let tree = condition("");
    assert!(tree.is_empty());
    assert!(tree.predicates().is_empty());
    assert!(!condition("A = 'x'").is_empty());
}

#[test]
fn errors() {
    assert!(matches!(condition_err("A = 'Foo"), SqlParseError::UnbalancedSyntax(_)));
    assert!(matches!(condition_err("(A = 'Foo'"), SqlParseError::UnbalancedSyntax(_)));
    assert!(matches!(condition_err("A = 'Foo')"), SqlParseError::UnbalancedSyntax(_)));
    assert_eq!(
        condition_err("A ~ 'Foo'"),
        SqlParseError::UnknownOperator(String::from("~"))
    );
    assert_eq!(
        condition_err("A =< 'Foo'"),
        SqlParseError::UnknownOperator(String::from("=<"))
    );
    assert_eq!(
        condition_err("E = 'Foo'"),
        SqlParseError::UnknownField(String::from("E"))
    );
    assert_eq!(
        condition_err("A = Foo"),
        SqlParseError::UnknownField(String::from("Foo"))
    );
    assert!(matches!(condition_err("A = 'x' 'y'"), SqlParseError::MalformedExpression(_)));
    assert!(matches!(condition_err("OR A = 'x'"), SqlParseError::MalformedExpression(_)));
    assert!(matches!(condition_err("B IN ()"), SqlParseError::MalformedExpression(_)));
}

#[test]
fn display_round_trips() {
    for text in [
        "A='Foo' OR B>5 AND C='foo' OR D=123",
        "A='Foo' AND NOT ( B>5 OR C='AAA' )",
        "NOT (NOT A = 'x')",
        "((B = 1))",
        "NOT ((B = 1) OR C = 'it''s')",
        "A IS NULL OR C IS NOT NULL",
        "A IN ('a;b', 'it''s', '') AND B = -3",
        "PARAMETER('p') = 'v' AND A LIKE 'x%'",
        "A = C AND D >= 2",
    ] {
        round_trip(text);
    }
}

#[test]
fn condition_serializes_to_json() {
    let tree = condition("A = 'x' AND NOT (B > 1 OR D IS NULL)");
    let json = serde_json::to_string(&tree).unwrap();
    let back: thin_sql_core::ConditionNode = serde_json::from_str(&json).unwrap();
    assert_eq!(back, tree);
}
