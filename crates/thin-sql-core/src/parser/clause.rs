//! Clause extraction.

use crate::error::Result;
use crate::lexer::find_keyword;

/// Returns the text between `start` and the first of `ends` that follows it.
///
/// Keywords only count at the top level: outside quotes and brackets, outside
/// parentheses, and delimited by whitespace, parentheses or the ends of the
/// text. With no end keyword, or when none of them occurs, the clause runs to
/// the end of the text.
///
/// The clause is trimmed. A missing start keyword or an empty clause gives
/// `None`.
///
/// # Errors
///
/// Returns `UnbalancedSyntax` if a quote, bracket or parenthesis is never
/// closed.
pub fn find_clause(text: &str, start: &str, ends: &[&str]) -> Result<Option<String>> {
    let Some(span) = find_keyword(text, start)? else {
        return Ok(None);
    };
    let rest = &text[span.end..];

    let mut end = rest.len();
    for keyword in ends {
        if let Some(found) = find_keyword(rest, keyword)? {
            end = end.min(found.start);
        }
    }

    let clause = rest[..end].trim();
    Ok((!clause.is_empty()).then(|| clause.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SqlParseError;

    #[test]
    fn test_quoted_keyword_is_not_a_clause() {
        assert_eq!(find_clause("'Select' * From Test", "SELECT", &["FROM"]), Ok(None));
    }

    #[test]
    fn test_clause_between_keywords() {
        let sql = "SELECT a, b FROM t WHERE a = 'from here' ORDER BY b";
        assert_eq!(
            find_clause(sql, "SELECT", &["FROM"]).unwrap().as_deref(),
            Some("a, b")
        );
        assert_eq!(
            find_clause(sql, "WHERE", &["GROUP BY", "HAVING", "ORDER BY"])
                .unwrap()
                .as_deref(),
            Some("a = 'from here'")
        );
        assert_eq!(
            find_clause(sql, "order by", &[]).unwrap().as_deref(),
            Some("b")
        );
    }

    #[test]
    fn test_first_end_keyword_wins_regardless_of_order() {
        let sql = "SELECT x FROM t HAVING c > 1 GROUP BY x";
        assert_eq!(
            find_clause(sql, "FROM", &["GROUP BY", "HAVING"])
                .unwrap()
                .as_deref(),
            Some("t")
        );
    }

    #[test]
    fn test_keywords_in_parentheses_are_skipped() {
        let sql = "SELECT IIF(a = 1 AND (b FROM c), 1, 0) FROM t";
        assert_eq!(
            find_clause(sql, "SELECT", &["FROM"]).unwrap().as_deref(),
            Some("IIF(a = 1 AND (b FROM c), 1, 0)")
        );
    }

    #[test]
    fn test_empty_clause_is_none() {
        assert_eq!(find_clause("SELECT  FROM t", "SELECT", &["FROM"]), Ok(None));
        assert_eq!(find_clause("SELECT a FROM t", "WHERE", &[]), Ok(None));
    }

    #[test]
    fn test_unbalanced_quote() {
        assert!(matches!(
            find_clause("SELECT 'a FROM t", "SELECT", &["FROM"]),
            Err(SqlParseError::UnbalancedSyntax(_))
        ));
    }
}
