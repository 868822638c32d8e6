//! Boolean condition trees for WHERE and HAVING clauses.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::literal::{LikePattern, TypedLiteral, quote_string};

/// How a node combines with the sibling before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JoiningOperator {
    /// First child of a composite.
    #[default]
    None,
    /// `AND` with the previous sibling.
    And,
    /// `OR` with the previous sibling.
    Or,
}

impl JoiningOperator {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Comparison operators of an atomic predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
    Ne,
    Like,
    Regexp,
    InList,
    IsNull,
    IsNotNull,
    /// `PARAMETER('name') = 'value'`: always true, carries a parameter.
    ParameterEq,
}

impl Comparator {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Ne => "<>",
            Self::Like => "LIKE",
            Self::Regexp => "REGEXP",
            Self::InList => "IN",
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
            Self::ParameterEq => "PARAMETER",
        }
    }

    /// Recognizes a symbolic comparator. `=>` is read as `>=`.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Self::Eq),
            ">" => Some(Self::Gt),
            ">=" | "=>" => Some(Self::Ge),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            "<>" | "!=" => Some(Self::Ne),
            _ => None,
        }
    }

    /// Recognizes a keyword comparator that takes a single right operand.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "LIKE" => Some(Self::Like),
            "REGEX" | "REGEXP" => Some(Self::Regexp),
            _ => None,
        }
    }
}

/// A single comparison without boolean connectives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    /// The field on the left; for parameters, the parameter name.
    pub left_field: String,
    /// The comparison operator.
    pub comparator: Comparator,
    /// Decoded right-hand literal text. For IN lists, the `;`-joined values.
    pub right_literal: Option<String>,
    /// Right-hand field, for field-to-field comparisons.
    pub right_field: Option<String>,
    /// Typed value of a single right-hand literal.
    pub right_value: Option<TypedLiteral>,
}

impl Predicate {
    /// Creates a predicate with no right-hand side.
    #[must_use]
    pub fn new(left_field: impl Into<String>, comparator: Comparator) -> Self {
        Self {
            left_field: left_field.into(),
            comparator,
            right_literal: None,
            right_field: None,
            right_value: None,
        }
    }

    /// Returns the decoded values of an IN list.
    #[must_use]
    pub fn in_list_values(&self) -> Option<Vec<String>> {
        match (self.comparator, &self.right_literal) {
            (Comparator::InList, Some(list)) => Some(decode_in_list(list)),
            _ => None,
        }
    }

    /// Compiles the right-hand literal as a `LIKE` pattern.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLikePattern` if the predicate has no literal.
    pub fn like_pattern(&self) -> Result<LikePattern> {
        LikePattern::compile(self.right_literal.as_deref())
    }
}

/// Escapes every `;` in each value and joins the values with `;`.
#[must_use]
pub fn encode_in_list<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| v.as_ref().replace(';', "\\;"))
        .collect::<Vec<_>>()
        .join(";")
}

/// Splits an encoded IN list on unescaped `;` and unescapes `\;`.
#[must_use]
pub fn decode_in_list(encoded: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut chars = encoded.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&';') => {
                current.push(';');
                chars.next();
            }
            ';' => values.push(core::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    values.push(current);
    values
}

/// The payload of a condition node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConditionKind {
    /// A single predicate.
    Atomic(Predicate),
    /// A group of conditions. One child is a parenthesized group, several
    /// children are joined by their joining operators, none is the empty
    /// condition.
    Composite(Vec<ConditionNode>),
}

/// A node of a boolean condition tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionNode {
    /// Whether the node is prefixed by `NOT`.
    pub negated: bool,
    /// How the node combines with its previous sibling.
    pub joining: JoiningOperator,
    /// Predicate or children.
    pub kind: ConditionKind,
}

impl ConditionNode {
    /// The condition of an empty expression.
    #[must_use]
    pub const fn empty() -> Self {
        Self::composite(Vec::new())
    }

    /// Creates an atomic node.
    #[must_use]
    pub const fn atomic(predicate: Predicate) -> Self {
        Self {
            negated: false,
            joining: JoiningOperator::None,
            kind: ConditionKind::Atomic(predicate),
        }
    }

    /// Creates a composite node.
    #[must_use]
    pub const fn composite(children: Vec<Self>) -> Self {
        Self {
            negated: false,
            joining: JoiningOperator::None,
            kind: ConditionKind::Composite(children),
        }
    }

    /// Returns true for the empty condition.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(&self.kind, ConditionKind::Composite(c) if c.is_empty())
    }

    /// Returns true for an atomic node.
    #[must_use]
    pub const fn is_atomic(&self) -> bool {
        matches!(self.kind, ConditionKind::Atomic(_))
    }

    /// Returns the predicate of an atomic node.
    #[must_use]
    pub const fn predicate(&self) -> Option<&Predicate> {
        match &self.kind {
            ConditionKind::Atomic(p) => Some(p),
            ConditionKind::Composite(_) => None,
        }
    }

    /// Returns the children of a composite node (empty for atomics).
    #[must_use]
    pub fn children(&self) -> &[Self] {
        match &self.kind {
            ConditionKind::Atomic(_) => &[],
            ConditionKind::Composite(children) => children,
        }
    }

    /// Returns every predicate in the tree, left to right.
    #[must_use]
    pub fn predicates(&self) -> Vec<&Predicate> {
        let mut out = Vec::new();
        self.collect_predicates(&mut out);
        out
    }

    fn collect_predicates<'a>(&'a self, out: &mut Vec<&'a Predicate>) {
        match &self.kind {
            ConditionKind::Atomic(p) => out.push(p),
            ConditionKind::Composite(children) => {
                for child in children {
                    child.collect_predicates(out);
                }
            }
        }
    }

    /// Returns the `(name, value)` pairs of every `PARAMETER(...)` predicate.
    #[must_use]
    pub fn parameters(&self) -> Vec<(String, String)> {
        self.predicates()
            .into_iter()
            .filter(|p| p.comparator == Comparator::ParameterEq)
            .map(|p| {
                (
                    p.left_field.clone(),
                    p.right_literal.clone().unwrap_or_default(),
                )
            })
            .collect()
    }

    /// Renders the node as if it were not negated.
    fn fmt_body(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ConditionKind::Atomic(p) => write!(f, "{p}"),
            ConditionKind::Composite(children) => match children.as_slice() {
                [] => Ok(()),
                [child] if child.negated => {
                    f.write_str("NOT (")?;
                    child.fmt_body(f)?;
                    f.write_str(")")
                }
                [child] => write!(f, "({child})"),
                [first, rest @ ..] => {
                    write!(f, "{first}")?;
                    for child in rest {
                        let op = match child.joining {
                            JoiningOperator::Or => "OR",
                            JoiningOperator::And | JoiningOperator::None => "AND",
                        };
                        write!(f, " {op} {child}")?;
                    }
                    Ok(())
                }
            },
        }
    }
}

impl fmt::Display for ConditionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.negated {
            return self.fmt_body(f);
        }
        if self.is_atomic() {
            f.write_str("NOT ")?;
            self.fmt_body(f)
        } else {
            f.write_str("NOT (")?;
            self.fmt_body(f)?;
            f.write_str(")")
        }
    }
}

fn write_identifier(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let plain = name.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_');
    if plain {
        f.write_str(name)
    } else {
        write!(f, "\"{}\"", name.replace('"', "\"\""))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literal = self.right_literal.as_deref().unwrap_or_default();
        match self.comparator {
            Comparator::ParameterEq => {
                write!(
                    f,
                    "PARAMETER({}) = {}",
                    quote_string(&self.left_field),
                    quote_string(literal)
                )
            }
            Comparator::IsNull | Comparator::IsNotNull => {
                write_identifier(f, &self.left_field)?;
                write!(f, " {}", self.comparator.as_str())
            }
            Comparator::InList => {
                write_identifier(f, &self.left_field)?;
                let values: Vec<String> = decode_in_list(literal)
                    .iter()
                    .map(|v| quote_string(v))
                    .collect();
                write!(f, " IN ({})", values.join(", "))
            }
            _ => {
                write_identifier(f, &self.left_field)?;
                write!(f, " {} ", self.comparator.as_str())?;
                match (&self.right_field, &self.right_value) {
                    (Some(field), _) => write_identifier(f, field),
                    (None, Some(value)) => f.write_str(&value.to_sql()),
                    (None, None) => f.write_str(&quote_string(literal)),
                }
            }
        }
    }
}
