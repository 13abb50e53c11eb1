//! AST types for the search query language

use crate::logic::LogicTree;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Operator {
    #[serde(rename = ":")]
    Contains, // keyword:value
    #[serde(rename = "=")]
    Exact, // keyword=value
    #[serde(rename = ":=")]
    ElementExact, // keyword:=value, one array element exactly
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ":" => Some(Operator::Contains),
            "=" => Some(Operator::Exact),
            ":=" => Some(Operator::ElementExact),
            "<" => Some(Operator::Lt),
            ">" => Some(Operator::Gt),
            "<=" => Some(Operator::Le),
            ">=" => Some(Operator::Ge),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Contains => ":",
            Operator::Exact => "=",
            Operator::ElementExact => ":=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Le => "<=",
            Operator::Ge => ">=",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// `keyword operator value`. A `None` value searches for the absence of the field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    pub keyword: String,
    pub operator: Operator,
    pub value: Option<String>,
    pub negated: bool,
}

/// Quoted or unquoted text outside of an expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeText {
    pub value: String,
    pub negated: bool,
}

/// Parenthesized sub-query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub tree: LogicTree<SearchToken>,
    pub negated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchToken {
    Expression(Expression),
    FreeText(FreeText),
    Group(Group),
}

impl SearchToken {
    pub fn is_negated(&self) -> bool {
        match self {
            SearchToken::Expression(expr) => expr.negated,
            SearchToken::FreeText(text) => text.negated,
            SearchToken::Group(group) => group.negated,
        }
    }

    pub fn toggle_negation(&mut self) {
        match self {
            SearchToken::Expression(expr) => expr.negated = !expr.negated,
            SearchToken::FreeText(text) => text.negated = !text.negated,
            SearchToken::Group(group) => group.negated = !group.negated,
        }
    }
}
