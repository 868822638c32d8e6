//! SQL `LIKE` pattern matching.

use regex::Regex;

use crate::error::{Result, SqlParseError};

/// A compiled `LIKE` pattern.
///
/// `%` matches any run of characters (including none) and `_` matches
/// exactly one character. Every other character matches itself, and the
/// pattern has to cover the whole value.
#[derive(Debug, Clone)]
pub struct LikePattern {
    /// The original pattern text.
    pattern: String,
    /// Compiled regex for matching.
    regex: Regex,
}

impl LikePattern {
    /// Compiles a `LIKE` pattern.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLikePattern` when no pattern is given.
    pub fn compile(pattern: Option<&str>) -> Result<Self> {
        let pattern = pattern.ok_or(SqlParseError::InvalidLikePattern)?;
        let mut regex_str = String::from("(?s)^");
        let mut literal = String::new();

        for c in pattern.chars() {
            match c {
                '%' | '_' => {
                    regex_str.push_str(&regex::escape(&literal));
                    literal.clear();
                    regex_str.push_str(if c == '%' { ".*" } else { "." });
                }
                _ => literal.push(c),
            }
        }
        regex_str.push_str(&regex::escape(&literal));
        regex_str.push('$');

        let regex = Regex::new(&regex_str).map_err(|_| SqlParseError::InvalidLikePattern)?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Returns the original pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Returns true if `value` matches the pattern.
    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Matches `value` against a `LIKE` pattern in one go.
///
/// # Errors
///
/// Returns `InvalidLikePattern` when no pattern is given.
pub fn like(value: &str, pattern: Option<&str>) -> Result<bool> {
    Ok(LikePattern::compile(pattern)?.is_match(value))
}
