//! Property tests: random AND/OR/NOT/parenthesis expressions parse to trees
//! that evaluate like standard SQL precedence says they should.

use proptest::prelude::*;
use thin_sql_core::ast::{Comparator, ConditionKind, ConditionNode, JoiningOperator};
use thin_sql_core::literal::{FieldTypeCategory, TypedLiteral};
use thin_sql_core::{RowSchema, parse_condition};

const FIELDS: [&str; 4] = ["A", "B", "C", "D"];
const VALUES: i64 = 3;

/// The meaning of a generated expression.
#[derive(Debug, Clone)]
enum Expr {
    Eq(usize, i64),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Group(Box<Expr>),
}

impl Expr {
    fn eval(&self, row: &[i64; 4]) -> bool {
        match self {
            Self::Eq(field, value) => row[*field] == *value,
            Self::Not(inner) => !inner.eval(row),
            Self::And(items) => items.iter().all(|e| e.eval(row)),
            Self::Or(items) => items.iter().any(|e| e.eval(row)),
            Self::Group(inner) => inner.eval(row),
        }
    }

    /// Renders SQL that means `self` under standard precedence, using as
    /// few parentheses as that allows.
    fn render(&self) -> String {
        match self {
            Self::Eq(field, value) => format!("{} = {value}", FIELDS[*field]),
            Self::Not(inner) => match inner.as_ref() {
                Self::Eq(..) | Self::Not(_) | Self::Group(_) => format!("NOT {}", inner.render()),
                _ => format!("NOT ({})", inner.render()),
            },
            Self::And(items) => items
                .iter()
                .map(|e| match e {
                    Self::Or(_) => format!("({})", e.render()),
                    _ => e.render(),
                })
                .collect::<Vec<_>>()
                .join(" AND "),
            Self::Or(items) => items
                .iter()
                .map(Self::render)
                .collect::<Vec<_>>()
                .join(" or "),
            Self::Group(inner) => format!("( {} )", inner.render()),
        }
    }
}

fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = (0..FIELDS.len(), 0..VALUES).prop_map(|(f, v)| Expr::Eq(f, v));
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| Expr::Not(Box::new(e))),
            prop::collection::vec(inner.clone(), 2..4).prop_map(Expr::And),
            prop::collection::vec(inner.clone(), 2..4).prop_map(Expr::Or),
            inner.prop_map(|e| Expr::Group(Box::new(e))),
        ]
    })
}

fn schema() -> RowSchema {
    FIELDS
        .iter()
        .fold(RowSchema::new(), |schema, name| {
            schema.field(*name, FieldTypeCategory::Integer)
        })
}

/// Evaluates a parsed tree, giving `AND` precedence over `OR` among
/// siblings.
fn eval_node(node: &ConditionNode, row: &[i64; 4]) -> bool {
    let value = match &node.kind {
        ConditionKind::Atomic(predicate) => {
            assert_eq!(predicate.comparator, Comparator::Eq);
            let field = FIELDS
                .iter()
                .position(|f| *f == predicate.left_field)
                .expect("known field");
            predicate.right_value == Some(TypedLiteral::Integer(row[field]))
        }
        ConditionKind::Composite(children) => {
            let mut any = false;
            let mut all = true;
            for (i, child) in children.iter().enumerate() {
                let v = eval_node(child, row);
                if i > 0 && child.joining == JoiningOperator::Or {
                    any |= all;
                    all = v;
                } else {
                    all &= v;
                }
            }
            any | all
        }
    };
    value != node.negated
}

fn assert_well_joined(node: &ConditionNode) {
    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        if i == 0 {
            assert_eq!(child.joining, JoiningOperator::None);
        } else {
            assert_ne!(child.joining, JoiningOperator::None);
            assert_eq!(child.joining, children[1].joining);
        }
        assert_well_joined(child);
    }
}

fn rows() -> impl Iterator<Item = [i64; 4]> {
    (0..VALUES.pow(4)).map(|n| {
        let mut row = [0; 4];
        let mut rest = n;
        for cell in &mut row {
            *cell = rest % VALUES;
            rest /= VALUES;
        }
        row
    })
}

proptest! {
    #[test]
    fn parsed_tree_agrees_with_precedence(expr in arb_expr()) {
        let sql = expr.render();
        let tree = parse_condition(&sql, &schema()).unwrap();
        for row in rows() {
            prop_assert_eq!(eval_node(&tree, &row), expr.eval(&row), "{} at {:?}", sql, row);
        }
    }

    #[test]
    fn composites_are_consistently_joined(expr in arb_expr()) {
        let tree = parse_condition(&expr.render(), &schema()).unwrap();
        assert_well_joined(&tree);
    }

    #[test]
    fn rendered_tree_parses_back(expr in arb_expr()) {
        let schema = schema();
        let tree = parse_condition(&expr.render(), &schema).unwrap();
        let rendered = tree.to_string();
        let reparsed = parse_condition(&rendered, &schema).unwrap();
        prop_assert_eq!(&reparsed, &tree, "{}", rendered);
        prop_assert_eq!(parse_condition(&expr.render(), &schema).unwrap(), tree);
    }
}
