//! Clause, condition and field list parsing.
//!
//! Nothing here tokenizes a whole statement. Each parser works on the raw
//! text of one clause and leans on the quote-aware helpers of
//! [`crate::lexer`] to find top-level keywords and separators.

mod clause;
mod condition;
mod fields;

pub use clause::find_clause;
pub use condition::{ConditionParser, MAX_NESTING, parse_condition};
pub use fields::{FieldListParser, parse_fields};

use crate::error::Result;
use crate::lexer::{split_qualified, unquote_identifier};
use crate::schema::{FieldTypeDescriptor, SchemaProvider};

/// A field reference found in the schema.
struct FieldReference {
    qualifier: Option<String>,
    name: String,
    field_type: FieldTypeDescriptor,
}

/// Names a field may be qualified with: the FROM alias and the service.
#[derive(Debug, Clone, Copy)]
struct TableScope<'a> {
    alias: Option<&'a str>,
    service: Option<&'a str>,
}

impl TableScope<'_> {
    fn accepts(&self, qualifier: &str) -> bool {
        [self.alias, self.service]
            .into_iter()
            .flatten()
            .any(|name| name.eq_ignore_ascii_case(qualifier))
    }

    /// Strips an accepted qualifier from `text`. Any other qualifier gives
    /// `None`.
    fn unqualified(&self, text: &str) -> Result<Option<String>> {
        let (qualifier, name) = split_qualified(text)?;
        Ok(qualifier
            .as_deref()
            .is_none_or(|q| self.accepts(q))
            .then_some(name))
    }
}

/// Looks up a plain, quoted or qualified field reference.
///
/// `qualifier.name` is looked up by name when the qualifier is in `scope`.
/// Otherwise the whole text is tried as a dotted field name.
fn lookup_reference(
    schema: &dyn SchemaProvider,
    scope: TableScope<'_>,
    text: &str,
) -> Result<Option<FieldReference>> {
    let text = text.trim();
    let (qualifier, name) = split_qualified(text)?;
    if qualifier.as_deref().is_none_or(|q| scope.accepts(q)) {
        if let Some(field_type) = schema.lookup_field(&name) {
            return Ok(Some(FieldReference {
                qualifier,
                name,
                field_type,
            }));
        }
    }

    if qualifier.is_none() {
        return Ok(None);
    }
    let whole = unquote_identifier(text);
    Ok(schema.lookup_field(&whole).map(|field_type| FieldReference {
        qualifier: None,
        name: whole,
        field_type,
    }))
}
