use crate::errors::SearchError;
use regex::Regex;

/// Character cursor over a query string.
///
/// The position only ever moves forward. Regex matching is anchored at the
/// current position: patterns are built with [`Cursor::anchored`] and run
/// against the unread remainder, never against the whole input.
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Compile `pattern` so it can only match at the current offset.
    pub fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
        Regex::new(&format!(r"\A(?:{})", pattern))
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Up to `n` characters from the current position, without consuming them.
    pub fn peek_n(&self, n: usize) -> &'a str {
        let rest = self.rest();
        let end = rest
            .char_indices()
            .nth(n)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        &rest[..end]
    }

    pub fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    pub fn next_n(&mut self, n: usize) -> &'a str {
        let taken = self.peek_n(n);
        self.pos += taken.len();
        taken
    }

    /// The match of `re` starting exactly at the current position.
    pub fn peek_match(&self, re: &Regex) -> Option<&'a str> {
        let rest = self.rest();
        re.find(rest)
            .filter(|m| m.start() == 0 && !m.as_str().is_empty())
            .map(|m| &rest[..m.end()])
    }

    /// Like [`Cursor::peek_match`], advancing past the match.
    pub fn read_match(&mut self, re: &Regex) -> Option<&'a str> {
        let matched = self.peek_match(re)?;
        self.pos += matched.len();
        Some(matched)
    }

    /// Like [`Cursor::read_match`], failing with a positioned error when nothing matches.
    pub fn expect_match(&mut self, re: &Regex, what: &str) -> Result<&'a str, SearchError> {
        match self.read_match(re) {
            Some(matched) => Ok(matched),
            None => Err(self.croak(format!("Expected {}", what))),
        }
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Unread remainder of the input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Current position as a character offset.
    pub fn offset(&self) -> usize {
        self.input[..self.pos].chars().count()
    }

    pub fn croak(&self, message: impl Into<String>) -> SearchError {
        SearchError::lex(message, self.offset())
    }
}
