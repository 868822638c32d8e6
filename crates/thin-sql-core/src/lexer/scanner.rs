//! Quote and parenthesis aware scanning of SQL text.
//!
//! The scanner never builds a token stream. It walks the raw text and
//! reports which characters sit at the top level, that is outside single,
//! double and back quotes, outside `[...]` brackets and outside any pair of
//! parentheses. Clause extraction, boolean splitting and list splitting are
//! all expressed in terms of those top-level positions.

use super::Span;
use crate::error::{Result, SqlParseError};

/// A cursor over SQL text.
pub struct Scanner<'a> {
    /// The input text.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// Current parenthesis nesting depth.
    depth: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the unconsumed remainder of the input.
    #[must_use]
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Returns the current character without advancing.
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Advances to the next character and returns it.
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skips whitespace.
    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn unbalanced(&self) -> SqlParseError {
        SqlParseError::UnbalancedSyntax(self.input.to_string())
    }

    /// Skips a quoted section whose opening character is under the cursor.
    ///
    /// A doubled closing quote inside the section is an escaped quote.
    fn skip_quoted(&mut self, close: char) -> Result<()> {
        self.advance(); // opening quote or bracket
        loop {
            match self.advance() {
                Some(c) if c == close => {
                    if close != ']' && self.peek() == Some(close) {
                        self.advance();
                    } else {
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => return Err(self.unbalanced()),
            }
        }
    }

    /// Skips a parenthesized group whose `(` is under the cursor, including
    /// nested groups and quoted sections.
    pub fn skip_group(&mut self) -> Result<()> {
        let outer = self.depth;
        loop {
            match self.peek() {
                Some(q @ ('\'' | '"' | '`')) => self.skip_quoted(q)?,
                Some('[') => self.skip_quoted(']')?,
                Some('(') => {
                    self.advance();
                    self.depth += 1;
                }
                Some(')') => {
                    if self.depth == outer {
                        return Err(self.unbalanced());
                    }
                    self.advance();
                    self.depth -= 1;
                    if self.depth == outer {
                        return Ok(());
                    }
                }
                Some(_) => {
                    self.advance();
                }
                None => return Err(self.unbalanced()),
            }
        }
    }

    /// Advances to the next character that sits at the top level and returns
    /// its byte offset.
    ///
    /// Quoted sections, bracketed sections and parentheses are consumed
    /// silently. Reaching the end of input inside any of them is an error.
    pub fn next_top_level(&mut self) -> Result<Option<(usize, char)>> {
        loop {
            let at = self.pos;
            match self.peek() {
                None if self.depth > 0 => return Err(self.unbalanced()),
                None => return Ok(None),
                Some(q @ ('\'' | '"' | '`')) => self.skip_quoted(q)?,
                Some('[') => self.skip_quoted(']')?,
                Some('(') => {
                    self.advance();
                    self.depth += 1;
                }
                Some(')') => {
                    if self.depth == 0 {
                        return Err(self.unbalanced());
                    }
                    self.advance();
                    self.depth -= 1;
                }
                Some(c) => {
                    self.advance();
                    if self.depth == 0 {
                        return Ok(Some((at, c)));
                    }
                }
            }
        }
    }

    /// Reads one operand: a run of characters up to whitespace or a
    /// comparison symbol, where quoted sections and parenthesized groups are
    /// taken whole.
    pub fn read_operand(&mut self) -> Result<&'a str> {
        self.skip_whitespace();
        let start = self.pos;
        loop {
            match self.peek() {
                Some(q @ ('\'' | '"' | '`')) => self.skip_quoted(q)?,
                Some('[') => self.skip_quoted(']')?,
                Some('(') => self.skip_group()?,
                Some(')') => return Err(self.unbalanced()),
                Some(c) if c.is_whitespace() || matches!(c, '=' | '<' | '>' | '!') => break,
                Some(_) => {
                    self.advance();
                }
                None => break,
            }
        }
        Ok(&self.input[start..self.pos])
    }

    /// Reads a comparison symbol (`=`, `<>`, `>=`, ...) if one is under the
    /// cursor.
    pub fn read_symbol(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| matches!(c, '=' | '<' | '>' | '!'))
        {
            self.advance();
        }
        (self.pos > start).then(|| &self.input[start..self.pos])
    }

    /// Reads a run of alphabetic characters.
    pub fn read_word(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }
        &self.input[start..self.pos]
    }

    /// Consumes `keyword` (case-insensitive) if it is the next word.
    pub fn eat_keyword(&mut self, keyword: &str) -> bool {
        let checkpoint = self.pos;
        self.skip_whitespace();
        if let Some(end) = match_keyword(self.input, self.pos, keyword) {
            if boundary_after(self.input, end) {
                self.pos = end;
                return true;
            }
        }
        self.pos = checkpoint;
        false
    }

    /// Returns true if the next non-whitespace character is `c`.
    pub fn at_char(&mut self, c: char) -> bool {
        self.skip_whitespace();
        self.peek() == Some(c)
    }
}

/// Matches a (possibly multi-word) keyword at byte offset `at`, returning the
/// end offset of the match.
fn match_keyword(input: &str, at: usize, keyword: &str) -> Option<usize> {
    let mut pos = at;
    for (i, word) in keyword.split_whitespace().enumerate() {
        if i > 0 {
            let rest = &input[pos..];
            let trimmed = rest.trim_start();
            if trimmed.len() == rest.len() {
                return None;
            }
            pos += rest.len() - trimmed.len();
        }
        let candidate = input.get(pos..pos + word.len())?;
        if !candidate.eq_ignore_ascii_case(word) {
            return None;
        }
        pos += word.len();
    }
    (pos > at).then_some(pos)
}

fn boundary_before(input: &str, at: usize) -> bool {
    input[..at]
        .chars()
        .next_back()
        .is_none_or(|c| c.is_whitespace() || c == ')')
}

fn boundary_after(input: &str, end: usize) -> bool {
    input[end..]
        .chars()
        .next()
        .is_none_or(|c| c.is_whitespace() || c == '(')
}

/// Returns every top-level occurrence of `keyword` in `input`.
///
/// # Errors
///
/// Returns `UnbalancedSyntax` if a quote, bracket or parenthesis is left
/// open anywhere in `input`.
pub fn keyword_spans(input: &str, keyword: &str) -> Result<Vec<Span>> {
    let mut spans: Vec<Span> = Vec::new();
    let first = keyword.trim_start().chars().next();
    let mut scanner = Scanner::new(input);
    while let Some((at, c)) = scanner.next_top_level()? {
        let Some(first) = first else { continue };
        if spans.last().is_some_and(|s| at < s.end)
            || !c.eq_ignore_ascii_case(&first)
            || !boundary_before(input, at)
        {
            continue;
        }
        if let Some(end) = match_keyword(input, at, keyword) {
            if boundary_after(input, end) {
                spans.push(Span::new(at, end));
            }
        }
    }
    Ok(spans)
}

/// Returns the first top-level occurrence of `keyword` in `input`.
///
/// # Errors
///
/// Returns `UnbalancedSyntax` on unterminated quotes or parentheses.
pub fn find_keyword(input: &str, keyword: &str) -> Result<Option<Span>> {
    Ok(keyword_spans(input, keyword)?.into_iter().next())
}

/// Splits `input` on every top-level occurrence of `separator`.
///
/// The pieces are returned untrimmed.
///
/// # Errors
///
/// Returns `UnbalancedSyntax` on unterminated quotes or parentheses.
pub fn split_top_level(input: &str, separator: char) -> Result<Vec<&str>> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut scanner = Scanner::new(input);
    while let Some((at, c)) = scanner.next_top_level()? {
        if c == separator {
            pieces.push(&input[start..at]);
            start = at + c.len_utf8();
        }
    }
    pieces.push(&input[start..]);
    Ok(pieces)
}

/// Splits `input` on every top-level occurrence of `keyword`.
///
/// # Errors
///
/// Returns `UnbalancedSyntax` on unterminated quotes or parentheses.
pub fn split_on_keyword<'a>(input: &'a str, keyword: &str) -> Result<Vec<&'a str>> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for span in keyword_spans(input, keyword)? {
        pieces.push(&input[start..span.start]);
        start = span.end;
    }
    pieces.push(&input[start..]);
    Ok(pieces)
}

/// Splits `input` into whitespace separated top-level words. Quoted sections
/// and parenthesized groups stay inside the word they belong to.
///
/// # Errors
///
/// Returns `UnbalancedSyntax` on unterminated quotes or parentheses.
pub fn top_level_words(input: &str) -> Result<Vec<Span>> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    let mut scanner = Scanner::new(input);
    loop {
        let before = scanner.position();
        let next = scanner.next_top_level()?;
        // Everything consumed before this character (quotes, groups) belongs
        // to the current word.
        if start.is_none() && scanner.position() > before {
            let skipped_ws = input[before..].starts_with(char::is_whitespace);
            if !skipped_ws {
                start = Some(before);
            }
        }
        match next {
            Some((at, c)) if c.is_whitespace() => {
                if let Some(s) = start.take() {
                    words.push(Span::new(s, at));
                }
            }
            Some(_) => {}
            None => {
                if let Some(s) = start {
                    words.push(Span::new(s, input.len()));
                }
                return Ok(words);
            }
        }
    }
}

/// Removes one layer of double or back quotes from an identifier and
/// unescapes doubled quotes inside it.
#[must_use]
pub fn unquote_identifier(text: &str) -> String {
    let text = text.trim();
    for quote in ['"', '`'] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            let inner = &text[1..text.len() - 1];
            return inner.replace(&format!("{quote}{quote}"), &quote.to_string());
        }
    }
    text.to_string()
}

/// Splits `qualifier.name` at the first top-level dot, unquoting both
/// halves.
///
/// # Errors
///
/// Returns `UnbalancedSyntax` on unterminated quotes.
pub fn split_qualified(text: &str) -> Result<(Option<String>, String)> {
    let text = text.trim();
    let mut scanner = Scanner::new(text);
    while let Some((at, c)) = scanner.next_top_level()? {
        if c == '.' {
            let qualifier = unquote_identifier(&text[..at]);
            let name = unquote_identifier(&text[at + 1..]);
            return Ok((Some(qualifier), name));
        }
    }
    Ok((None, unquote_identifier(text)))
}
