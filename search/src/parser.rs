use crate::errors::SearchError;
use crate::lexer::{LexMode, Lexer, Token, TokenKind};
use crate::logic::{LogicAccumulator, LogicTree};
use crate::registry::{Keyword, Registry, ValueType};
use crate::types::{Expression, FreeText, Group, Operator, SearchToken};

/// Values that search for the absence of a field on keywords that allow it.
const NONE_VALUES: [&str; 2] = ["none", "-"];

/// Parses search queries into an AND/OR tree of search tokens.
///
/// Query syntax:
/// - `keyword:value`, `keyword=value`, `keyword:=value`, `keyword>=3` etc.
/// - free text, quoted (`"..."` or `'...'`) or not
/// - `-term` negates a term or a `( ... )` group
/// - `or` starts a new branch, `and` is implicit
pub struct QueryParser<'r> {
    registry: &'r Registry,
}

impl<'r> QueryParser<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Parse a single-line query.
    pub fn parse(&self, query: &str) -> Result<LogicTree<SearchToken>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::parse(
                "You didn't enter anything to search for.",
                0,
            ));
        }

        let mut run = ParseRun {
            lexer: Lexer::new(query, self.registry.aliases()),
            registry: self.registry,
        };
        let tree = run.parse_terms(false)?;
        tracing::debug!("Parsed search query {:?} into {:?}", query, tree);
        Ok(tree)
    }
}

/// State of one `parse` call.
struct ParseRun<'a> {
    lexer: Lexer<'a>,
    registry: &'a Registry,
}

enum Term {
    Token(SearchToken),
    And,
    Or,
}

impl<'a> ParseRun<'a> {
    /// Terms until end of input, or until the closing parenthesis of a group.
    fn parse_terms(&mut self, in_group: bool) -> Result<LogicTree<SearchToken>, SearchError> {
        let mut statements = LogicAccumulator::new();

        loop {
            match self.lexer.peek(LexMode::Open)?.map(|token| token.kind) {
                None if in_group => {
                    return Err(self.error("Your search contains unclosed parentheses."));
                }
                None => break,
                Some(TokenKind::CloseGroup) if in_group => break,
                Some(TokenKind::CloseGroup) => return Err(self.unexpected()),
                Some(_) => {}
            }

            match self.parse_term()? {
                Term::Token(token) => statements.add_and(token),
                Term::Or => statements.or(),
                Term::And => {}
            }
        }

        Ok(statements.into_tree())
    }

    fn parse_term(&mut self) -> Result<Term, SearchError> {
        let Some(token) = self.lexer.peek(LexMode::Open)?.cloned() else {
            return Err(self.unexpected());
        };

        match token.kind {
            TokenKind::Negation => Ok(Term::Token(self.parse_negated()?)),
            TokenKind::Keyword => Ok(Term::Token(self.parse_expression()?)),
            TokenKind::Text => Ok(Term::Token(self.parse_text()?)),
            TokenKind::OpenGroup => Ok(Term::Token(self.parse_group()?)),
            TokenKind::LogicalOperator => {
                self.lexer.next(LexMode::Open)?;
                if token.text.eq_ignore_ascii_case("or") {
                    Ok(Term::Or)
                } else {
                    Ok(Term::And)
                }
            }
            _ => Err(self.unexpected()),
        }
    }

    /// `-` followed by the unit it negates. `-and`/`-or` search for the word itself.
    fn parse_negated(&mut self) -> Result<SearchToken, SearchError> {
        self.skip(TokenKind::Negation)?;

        let Some(token) = self.lexer.peek(LexMode::Open)?.cloned() else {
            return Err(self.error("Unexpected end of search after -."));
        };

        let mut negated = match token.kind {
            TokenKind::Negation => self.parse_negated()?,
            TokenKind::Keyword => self.parse_expression()?,
            TokenKind::Text | TokenKind::LogicalOperator => self.parse_text()?,
            TokenKind::OpenGroup => self.parse_group()?,
            _ => return Err(self.unexpected()),
        };
        negated.toggle_negation();
        Ok(negated)
    }

    fn parse_expression(&mut self) -> Result<SearchToken, SearchError> {
        let key = self.expect(TokenKind::Keyword)?;
        let registry = self.registry;
        let keyword = registry.resolve(&key.text).ok_or_else(|| {
            SearchError::parse(format!("Unknown keyword {}.", key.text), key.offset)
        })?;

        let operator = self.parse_operator(keyword)?;
        let value = self.parse_value(keyword)?;

        Ok(SearchToken::Expression(Expression {
            keyword: keyword.name.clone(),
            operator,
            value,
            negated: false,
        }))
    }

    fn parse_text(&mut self) -> Result<SearchToken, SearchError> {
        let Some(token) = self.lexer.next(LexMode::Open)? else {
            return Err(self.unexpected());
        };
        Ok(SearchToken::FreeText(FreeText {
            value: token.text,
            negated: false,
        }))
    }

    fn parse_group(&mut self) -> Result<SearchToken, SearchError> {
        self.skip(TokenKind::OpenGroup)?;
        let tree = self.parse_terms(true)?;
        self.skip(TokenKind::CloseGroup)?;
        Ok(SearchToken::Group(Group {
            tree,
            negated: false,
        }))
    }

    fn parse_operator(&mut self, keyword: &Keyword) -> Result<Operator, SearchError> {
        let token = self.lexer.peek(LexMode::Expression)?.cloned();
        let operator = match token {
            Some(token) if token.kind == TokenKind::Operator => {
                Operator::from_symbol(&token.text)
            }
            _ => None,
        };
        let Some(operator) = operator else {
            return Err(self.error(format!(
                "Unexpected token in {} expression. Expected operator.",
                keyword.name
            )));
        };
        if !keyword.value_type.allows(operator) {
            return Err(self.error(format!(
                "Operator {} is invalid for keyword {}.",
                operator, keyword.name
            )));
        }

        self.lexer.next(LexMode::Expression)?;
        Ok(operator)
    }

    /// The search value after the operator. `None` searches for the absence of the field.
    fn parse_value(&mut self, keyword: &Keyword) -> Result<Option<String>, SearchError> {
        let Some(token) = self.lexer.peek(LexMode::Expression)?.cloned() else {
            return Err(self.missing_value(keyword));
        };

        let lowered = token.text.to_lowercase();
        let searches_none = keyword.allow_search_none && NONE_VALUES.contains(&lowered.as_str());
        let valid = match token.kind {
            TokenKind::Number => true,
            TokenKind::Text => keyword.value_type != ValueType::Number || searches_none,
            _ => false,
        };
        if !valid {
            return Err(self.error(format!(
                "Type {} cannot be used with {}.",
                token.kind.describe(),
                keyword.name
            )));
        }
        if token.text.is_empty() {
            return Err(self.missing_value(keyword));
        }
        if token.kind == TokenKind::Number
            && keyword.value_type == ValueType::Number
            && token.text.parse::<i64>().is_err()
        {
            return Err(self.error(format!("Number {} is out of range.", token.text)));
        }

        self.lexer.next(LexMode::Expression)?;

        if let Some(mapped) = keyword.mapped_value(&token.text) {
            return Ok(Some(mapped.to_string()));
        }
        if searches_none {
            return Ok(None);
        }
        Ok(Some(token.text))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SearchError> {
        let found = matches!(self.lexer.peek(LexMode::Open)?, Some(token) if token.kind == kind);
        if !found {
            return Err(self.error(format!("Expected {}.", kind.describe())));
        }
        self.lexer
            .next(LexMode::Open)?
            .ok_or_else(|| self.error(format!("Expected {}.", kind.describe())))
    }

    fn skip(&mut self, kind: TokenKind) -> Result<(), SearchError> {
        self.expect(kind).map(|_| ())
    }

    fn missing_value(&self, keyword: &Keyword) -> SearchError {
        self.error(format!(
            "You must provide a search value for the {} expression.",
            keyword.name
        ))
    }

    fn unexpected(&mut self) -> SearchError {
        match self.lexer.peek(LexMode::Open) {
            Ok(Some(token)) => SearchError::parse(
                format!("Unexpected token: {}", token.text),
                token.offset,
            ),
            Ok(None) => self.error("Unexpected end of search."),
            Err(err) => err,
        }
    }

    fn error(&self, message: impl Into<String>) -> SearchError {
        SearchError::parse(message, self.lexer.offset())
    }
}

#[cfg(test)]
mod tests;
