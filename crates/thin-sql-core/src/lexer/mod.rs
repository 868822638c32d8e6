//! Quote and parenthesis aware scanning.
//!
//! SQL text is never tokenized up front. Instead a [`Scanner`] walks the raw
//! text and exposes the characters that sit outside quoted literals and
//! parentheses, which is all the clause splitter and the condition parser
//! need.

mod scanner;
mod span;

pub use scanner::{
    Scanner, find_keyword, keyword_spans, split_on_keyword, split_qualified, split_top_level,
    top_level_words, unquote_identifier,
};
pub use span::Span;
