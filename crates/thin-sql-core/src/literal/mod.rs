//! Literal extraction.
//!
//! A raw lexeme from a SQL statement is classified by trying a fixed set of
//! literal grammars. Each attempt either decodes the lexeme into a
//! [`TypedLiteral`] or reports no match; a mismatch is never an error.

pub mod like;
pub mod types;

use core::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use like::LikePattern;
pub use types::{FieldTypeCategory, SqlType};

/// Format used to render dates back to text.
pub const DATE_DISPLAY_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// Most significant digits a decimal may carry and still be a `Number`.
const FLOAT_DIGITS: usize = 15;

/// A decoded literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypedLiteral {
    /// String literal, quotes removed and unescaped.
    String(String),
    /// Integer literal.
    Integer(i64),
    /// Floating point literal.
    Number(f64),
    /// Decimal literal kept at full precision.
    BigNumber(Decimal),
    /// Boolean literal.
    Boolean(bool),
    /// Date or timestamp literal.
    Date(NaiveDateTime),
}

impl TypedLiteral {
    /// Returns the type category of the value.
    #[must_use]
    pub const fn category(&self) -> FieldTypeCategory {
        match self {
            Self::String(_) => FieldTypeCategory::String,
            Self::Integer(_) => FieldTypeCategory::Integer,
            Self::Number(_) => FieldTypeCategory::Number,
            Self::BigNumber(_) => FieldTypeCategory::BigNumber,
            Self::Boolean(_) => FieldTypeCategory::Boolean,
            Self::Date(_) => FieldTypeCategory::Date,
        }
    }

    /// Renders the literal as SQL text that extracts back to the same value.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::String(s) => quote_string(s),
            Self::Date(d) => format!("[{}]", d.format(DATE_DISPLAY_FORMAT)),
            Self::Boolean(true) => String::from("TRUE"),
            Self::Boolean(false) => String::from("FALSE"),
            // Whole floats need a decimal point to stay floats.
            Self::Number(n) => {
                let text = n.to_string();
                if text.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
                    format!("{text}.0")
                } else {
                    text
                }
            }
            other => other.to_string(),
        }
    }
}

impl fmt::Display for TypedLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::BigNumber(d) => write!(f, "{d}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Date(d) => write!(f, "{}", d.format(DATE_DISPLAY_FORMAT)),
        }
    }
}

/// The literal grammars understood by [`attempt_extract`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// `'text'` with `''` as an escaped quote.
    String,
    /// Optionally signed digits.
    Integer,
    /// Digits with a decimal point, as a float.
    Number,
    /// Digits with a decimal point, at full precision.
    BigNumber,
    /// `true` or `false`, any case.
    Boolean,
    /// `TIMESTAMP '...'`, `DATE '...'` or `[yyyy/MM/dd ...]`.
    Date,
}

/// Tries to decode `lexeme` with the grammar of `kind`.
///
/// Returns `None` when the lexeme does not belong to that grammar.
#[must_use]
pub fn attempt_extract(kind: LiteralKind, lexeme: &str) -> Option<TypedLiteral> {
    let text = lexeme.trim();
    if text.is_empty() {
        return None;
    }
    match kind {
        LiteralKind::String => unquote_string(text).map(TypedLiteral::String),
        LiteralKind::Integer => {
            let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            text.parse().ok().map(TypedLiteral::Integer)
        }
        LiteralKind::Number => {
            if !is_decimal(text) {
                return None;
            }
            text.parse().ok().map(TypedLiteral::Number)
        }
        LiteralKind::BigNumber => {
            if !is_decimal(text) {
                return None;
            }
            parse_decimal(text).map(TypedLiteral::BigNumber)
        }
        LiteralKind::Boolean => {
            if text.eq_ignore_ascii_case("true") {
                Some(TypedLiteral::Boolean(true))
            } else if text.eq_ignore_ascii_case("false") {
                Some(TypedLiteral::Boolean(false))
            } else {
                None
            }
        }
        LiteralKind::Date => parse_date(text).map(TypedLiteral::Date),
    }
}

/// Classifies `lexeme` with the first grammar that accepts it.
///
/// Grammars are tried as string, date, integer, decimal, boolean. A decimal
/// with more significant digits than a float holds becomes a `BigNumber`.
#[must_use]
pub fn extract_literal(lexeme: &str) -> Option<TypedLiteral> {
    attempt_extract(LiteralKind::String, lexeme)
        .or_else(|| attempt_extract(LiteralKind::Date, lexeme))
        .or_else(|| attempt_extract(LiteralKind::Integer, lexeme))
        .or_else(|| {
            let kind = if significant_digits(lexeme.trim()) > FLOAT_DIGITS {
                LiteralKind::BigNumber
            } else {
                LiteralKind::Number
            };
            attempt_extract(kind, lexeme)
        })
        .or_else(|| attempt_extract(LiteralKind::Boolean, lexeme))
}

/// Removes the surrounding single quotes of a string literal and collapses
/// doubled quotes. Returns `None` if the text is not exactly one quoted
/// string.
#[must_use]
pub fn unquote_string(text: &str) -> Option<String> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\'' && chars.next() != Some('\'') {
            return None;
        }
        value.push(c);
    }
    Some(value)
}

/// Wraps `value` in single quotes, doubling embedded quotes.
#[must_use]
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn is_decimal(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let Some((whole, fraction)) = unsigned.split_once('.') else {
        return false;
    };
    !(whole.is_empty() && fraction.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit())
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (whole, fraction) = unsigned.split_once('.')?;
    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    };
    // from_str_exact refuses to round digits that do not fit.
    let value = Decimal::from_str_exact(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

fn significant_digits(text: &str) -> usize {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.trim_start_matches('0').len()
}

fn parse_date(text: &str) -> Option<NaiveDateTime> {
    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        let inner = inner.trim();
        if inner.is_empty() {
            return None;
        }
        return NaiveDateTime::parse_from_str(inner, "%Y/%m/%d %H:%M:%S%.f")
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(inner, "%Y/%m/%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            });
    }
    if let Some(rest) = strip_keyword(text, "TIMESTAMP") {
        let value = unquote_string(rest.trim())?;
        return NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M:%S%.f").ok();
    }
    if let Some(rest) = strip_keyword(text, "DATE") {
        let value = unquote_string(rest.trim())?;
        return NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0));
    }
    None
}

fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    head.eq_ignore_ascii_case(keyword)
        .then(|| &text[keyword.len()..])
}
