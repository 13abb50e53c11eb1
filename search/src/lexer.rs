use crate::cursor::Cursor;
use crate::errors::SearchError;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

/// Operators understood between a keyword and its value.
pub const OPERATORS: [&str; 7] = [":", "=", ":=", "<", "<=", ">", ">="];

lazy_static! {
    /// Longest first, so `:=` wins over `:`.
    static ref OPERATORS_LONGEST_FIRST: Vec<&'static str> = {
        let mut operators = OPERATORS.to_vec();
        operators.sort_by(|a, b| b.len().cmp(&a.len()));
        operators
    };
    static ref OPERATOR: Regex = Cursor::anchored(
        &OPERATORS_LONGEST_FIRST
            .iter()
            .map(|op| regex::escape(op))
            .collect::<Vec<_>>()
            .join("|")
    )
    .unwrap();
    static ref LOGICAL_OPERATOR: Regex = Cursor::anchored("(?i:and|or)").unwrap();
    static ref DIGITS: Regex = Cursor::anchored(r"[0-9]+").unwrap();
    static ref WORD: Regex = Cursor::anchored(r"\w+").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Negation,
    LogicalOperator,
    OpenGroup,
    CloseGroup,
    Keyword,
    Operator,
    Number,
    /// Quoted or unquoted text. Quotes and escapes are already stripped.
    Text,
}

impl TokenKind {
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Negation => "negation",
            TokenKind::LogicalOperator => "logical operator",
            TokenKind::OpenGroup => "open parenthesis",
            TokenKind::CloseGroup => "close parenthesis",
            TokenKind::Keyword => "keyword",
            TokenKind::Operator => "operator",
            TokenKind::Number => "number",
            TokenKind::Text => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Character offset of the first character of the token.
    pub offset: usize,
}

/// Lexing rules to apply for the next token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexMode {
    /// Top level, between terms.
    Open,
    /// Right after a keyword: operator, then value. Whitespace ends the expression.
    Expression,
}

struct Lookahead {
    mode: LexMode,
    token: Option<Token>,
}

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    keywords: &'a HashMap<String, String>,
    lookahead: Option<Lookahead>,
}

impl<'a> Lexer<'a> {
    /// `keywords` maps every lower-case keyword and alias to its canonical keyword.
    pub fn new(input: &'a str, keywords: &'a HashMap<String, String>) -> Self {
        Self {
            cursor: Cursor::new(input),
            keywords,
            lookahead: None,
        }
    }

    /// Next token without consuming it. A buffered token is returned as it was
    /// lexed; an "end of expression" lookahead is discarded when the mode changes.
    pub fn peek(&mut self, mode: LexMode) -> Result<Option<&Token>, SearchError> {
        let stale = matches!(&self.lookahead, Some(la) if la.mode != mode && la.token.is_none());
        if self.lookahead.is_none() || stale {
            let token = self.read_next(mode)?;
            self.lookahead = Some(Lookahead { mode, token });
        }
        Ok(self.lookahead.as_ref().and_then(|la| la.token.as_ref()))
    }

    pub fn next(&mut self, mode: LexMode) -> Result<Option<Token>, SearchError> {
        match self.lookahead.take() {
            Some(la) if la.token.is_some() || la.mode == mode => Ok(la.token),
            _ => self.read_next(mode),
        }
    }

    /// Character offset of the next unread token, or of the cursor.
    pub fn offset(&self) -> usize {
        match &self.lookahead {
            Some(Lookahead {
                token: Some(token), ..
            }) => token.offset,
            _ => self.cursor.offset(),
        }
    }

    fn read_next(&mut self, mode: LexMode) -> Result<Option<Token>, SearchError> {
        if mode == LexMode::Open {
            while self.cursor.peek().is_some_and(char::is_whitespace) {
                self.cursor.next();
            }
        }

        let offset = self.cursor.offset();
        let Some(ch) = self.cursor.peek() else {
            return Ok(None);
        };

        match mode {
            LexMode::Open => {
                if let Some(op) = self.read_logical_operator() {
                    return Ok(Some(token(TokenKind::LogicalOperator, op, offset)));
                }
                let kind = match ch {
                    '-' => Some(TokenKind::Negation),
                    '(' => Some(TokenKind::OpenGroup),
                    ')' => Some(TokenKind::CloseGroup),
                    _ => None,
                };
                if let Some(kind) = kind {
                    self.cursor.next();
                    return Ok(Some(token(kind, ch.to_string(), offset)));
                }
                if is_keyword_start(ch) {
                    return Ok(Some(self.read_keyword(offset)));
                }
            }
            LexMode::Expression => {
                if is_terminator(ch) {
                    return Ok(None);
                }
                if is_operator_char(ch) {
                    let op = self.cursor.expect_match(&OPERATOR, "an operator")?;
                    return Ok(Some(token(TokenKind::Operator, op, offset)));
                }
                if ch.is_ascii_digit() {
                    if let Some(number) = self.read_number() {
                        return Ok(Some(token(TokenKind::Number, number, offset)));
                    }
                }
            }
        }

        if is_quote(ch) {
            return Ok(Some(token(TokenKind::Text, self.read_quoted(), offset)));
        }
        if is_free_text(ch) {
            return Ok(Some(token(TokenKind::Text, self.read_free_text(), offset)));
        }

        Err(self
            .cursor
            .croak(format!("Can't handle character: {:?}", ch)))
    }

    /// `and`/`or` only count when a delimiter follows, so "Android" stays text.
    fn read_logical_operator(&mut self) -> Option<&'a str> {
        let op = self.cursor.peek_match(&LOGICAL_OPERATOR)?;
        let follower = self.cursor.rest()[op.len()..].chars().next()?;
        if follower.is_whitespace() || is_paren(follower) || is_quote(follower) {
            self.cursor.read_match(&LOGICAL_OPERATOR)
        } else {
            None
        }
    }

    /// A word is a keyword only when an operator and a value follow without whitespace.
    fn read_keyword(&mut self, offset: usize) -> Token {
        if let Some(word) = self.cursor.peek_match(&WORD) {
            let name = word.to_lowercase();
            if self.keywords.contains_key(&name)
                && operator_follows(&self.cursor.rest()[word.len()..])
            {
                self.cursor.next_n(word.chars().count());
                return token(TokenKind::Keyword, name, offset);
            }
        }
        token(TokenKind::Text, self.read_free_text(), offset)
    }

    /// Digits count as a number only when nothing but a terminator follows ("2soul" is text).
    fn read_number(&mut self) -> Option<&'a str> {
        let digits = self.cursor.peek_match(&DIGITS)?;
        match self.cursor.rest()[digits.len()..].chars().next() {
            Some(ch) if !is_terminator(ch) && !is_quote(ch) => None,
            _ => self.cursor.read_match(&DIGITS),
        }
    }

    /// Read up to the matching quote, or to the end of input when it is never closed.
    /// A backslash escapes only the delimiter in use.
    fn read_quoted(&mut self) -> String {
        let Some(quote) = self.cursor.next() else {
            return String::new();
        };
        let mut text = String::new();
        while let Some(ch) = self.cursor.next() {
            if ch == quote {
                break;
            }
            if ch == '\\' && self.cursor.peek() == Some(quote) {
                self.cursor.next();
                text.push(quote);
            } else {
                text.push(ch);
            }
        }
        text
    }

    fn read_free_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.cursor.peek().filter(|ch| is_free_text(*ch)) {
            text.push(ch);
            self.cursor.next();
        }
        text
    }
}

fn operator_follows(after_word: &str) -> bool {
    OPERATORS_LONGEST_FIRST.iter().any(|op| {
        after_word
            .strip_prefix(op)
            .and_then(|value| value.chars().next())
            .is_some_and(|ch| !ch.is_whitespace() && !is_paren(ch))
    })
}

fn is_operator_char(ch: char) -> bool {
    OPERATORS.iter().any(|op| op.contains(ch))
}

fn token(kind: TokenKind, text: impl Into<String>, offset: usize) -> Token {
    Token {
        kind,
        text: text.into(),
        offset,
    }
}

fn is_keyword_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_paren(ch: char) -> bool {
    ch == '(' || ch == ')'
}

fn is_quote(ch: char) -> bool {
    ch == '"' || ch == '\''
}

fn is_terminator(ch: char) -> bool {
    ch.is_whitespace() || is_paren(ch)
}

fn is_free_text(ch: char) -> bool {
    !is_terminator(ch) && !ch.is_control()
}
