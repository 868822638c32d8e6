//! # thin-sql-core
//!
//! An embedded front end for a small SQL dialect.
//!
//! The crate turns `SELECT ... FROM ... WHERE ... GROUP BY ... HAVING ...
//! ORDER BY ... LIMIT` text into clause strings, resolved field lists and
//! boolean condition trees, checked against a [`schema::SchemaProvider`].
//! It never executes anything: the intermediate representation in [`ast`]
//! is what an execution engine consumes.
//!
//! ```rust
//! use thin_sql_core::SqlStatement;
//! use thin_sql_core::ast::{Comparator, JoiningOperator};
//! use thin_sql_core::literal::FieldTypeCategory;
//! use thin_sql_core::schema::RowSchema;
//!
//! let schema = RowSchema::new()
//!     .field("A", FieldTypeCategory::String)
//!     .field("B", FieldTypeCategory::Integer);
//!
//! let mut statement =
//!     SqlStatement::new("SELECT A, B FROM Service WHERE A = 'Foo' OR B > 5 AND B < 10").unwrap();
//! statement.parse(&schema).unwrap();
//!
//! let condition = statement.where_condition().unwrap();
//! assert_eq!(condition.children().len(), 2);
//! assert_eq!(condition.children()[1].joining, JoiningOperator::Or);
//! assert_eq!(
//!     condition.children()[1].children()[0].predicate().map(|p| p.comparator),
//!     Some(Comparator::Gt)
//! );
//! ```
//!
//! Keywords spelled inside quoted literals never count:
//!
//! ```rust
//! use thin_sql_core::parser::find_clause;
//!
//! assert_eq!(find_clause("'Select' * From Test", "SELECT", &["FROM"]), Ok(None));
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod literal;
pub mod parser;
pub mod schema;
pub mod statement;

pub use ast::{ConditionNode, FieldDescriptor, FieldList};
pub use error::{Result, SqlParseError};
pub use literal::{FieldTypeCategory, TypedLiteral};
pub use parser::{find_clause, parse_condition, parse_fields};
pub use schema::{FieldTypeDescriptor, RowSchema, SchemaProvider};
pub use statement::{Limit, SqlStatement};
