//! Turns a parsed query into a [`Predicate`] using the keyword registry.
//!
//! Column semantics per keyword type:
//! - number: plain comparison, `:` means `=`.
//! - string: `:` is case-insensitive containment, `=` case-insensitive equality.
//! - array: the column holds a JSON list of strings. `:` matches part of an element,
//!   `:=` a whole element, `=` a list holding exactly that one element.
//!
//! Searching for none matches a null field, and for strings and arrays also an
//! empty string or an empty list.
//!
//! Negated leaves always include the null case, so that an absent value satisfies
//! the negation rather than neither side.

use crate::errors::RegistryError;
use crate::logic::{Connective, LogicTree, Member};
use crate::predicate::{Comparison, LikePattern, Literal, Predicate};
use crate::registry::{Keyword, Registry, ValueType};
use crate::types::{Operator, SearchToken};
use std::collections::BTreeMap;

/// Characters users type as wildcards. Removed from partial array matches.
const USER_WILDCARDS: [char; 2] = ['%', '*'];

/// How often each canonical keyword was used. Diagnostic only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageStats {
    counts: BTreeMap<String, u64>,
}

impl UsageStats {
    fn record(&mut self, keyword: &str) {
        *self.counts.entry(keyword.to_string()).or_insert(0) += 1;
    }

    fn merge(&mut self, other: &UsageStats) {
        for (keyword, count) in &other.counts {
            *self.counts.entry(keyword.clone()).or_insert(0) += count;
        }
    }

    pub fn get(&self, keyword: &str) -> u64 {
        self.counts.get(keyword).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    /// `None` when the query places no constraint (e.g. only empty groups).
    pub predicate: Option<Predicate>,
    /// Keyword usage of this compilation alone.
    pub usage: UsageStats,
}

pub struct Compiler<'r> {
    registry: &'r Registry,
    cumulative: UsageStats,
}

impl<'r> Compiler<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            cumulative: UsageStats::default(),
        }
    }

    /// Normalizes `tree` and compiles it. Fails only when the tree references a
    /// keyword or operator this registry does not accept.
    pub fn compile(&mut self, tree: LogicTree<SearchToken>) -> Result<Compilation, RegistryError> {
        let tree = tree.normalize();
        let mut usage = UsageStats::default();
        let predicate = self.compile_tree(&tree, &mut usage)?;
        self.cumulative.merge(&usage);

        tracing::debug!("Compiled search predicate: {:?}", predicate);
        Ok(Compilation { predicate, usage })
    }

    /// Running totals over every compilation made by this compiler.
    pub fn cumulative_usage(&self) -> &UsageStats {
        &self.cumulative
    }

    fn compile_tree(
        &self,
        tree: &LogicTree<SearchToken>,
        usage: &mut UsageStats,
    ) -> Result<Option<Predicate>, RegistryError> {
        let mut compiled = Vec::with_capacity(tree.members.len());
        for member in &tree.members {
            let predicate = match member {
                Member::Single(token) => self.compile_token(token, usage)?,
                Member::Bundle(tokens) => {
                    let mut inner = Vec::with_capacity(tokens.len());
                    for token in tokens {
                        inner.extend(self.compile_token(token, usage)?);
                    }
                    combine(tree.bundle_connective(), inner)
                }
            };
            compiled.extend(predicate);
        }
        Ok(combine(tree.connective, compiled))
    }

    fn compile_token(
        &self,
        token: &SearchToken,
        usage: &mut UsageStats,
    ) -> Result<Option<Predicate>, RegistryError> {
        match token {
            SearchToken::Expression(expr) => self.compile_leaf(
                &expr.keyword,
                expr.operator,
                expr.value.as_deref(),
                expr.negated,
                usage,
            ),
            SearchToken::FreeText(text) => self.compile_leaf(
                &self.registry.free_text_keyword().name,
                Operator::Contains,
                Some(&text.value),
                text.negated,
                usage,
            ),
            SearchToken::Group(group) => {
                debug_assert!(!group.negated, "groups are normalized before compiling");
                self.compile_tree(&group.tree, usage)
            }
        }
    }

    fn compile_leaf(
        &self,
        keyword: &str,
        operator: Operator,
        value: Option<&str>,
        negated: bool,
        usage: &mut UsageStats,
    ) -> Result<Option<Predicate>, RegistryError> {
        let kw = self
            .registry
            .keyword(keyword)
            .ok_or_else(|| RegistryError::UnknownKeyword(keyword.to_string()))?;
        if !kw.value_type.allows(operator) {
            return Err(unsupported(kw, operator));
        }
        usage.record(&kw.name);

        let operator = effective_operator(kw, operator);
        let mut per_column = Vec::with_capacity(kw.columns.len());
        for column in &kw.columns {
            per_column.push(column_leaf(kw, column, operator, value, negated)?);
        }

        // Positive: any column matches. Negated: no column matches.
        Ok(if negated {
            Predicate::all(per_column)
        } else {
            Predicate::any(per_column)
        })
    }
}

fn combine(connective: Connective, predicates: Vec<Predicate>) -> Option<Predicate> {
    match connective {
        Connective::And => Predicate::all(predicates),
        Connective::Or => Predicate::any(predicates),
    }
}

fn unsupported(kw: &Keyword, operator: Operator) -> RegistryError {
    RegistryError::UnsupportedOperator {
        keyword: kw.name.clone(),
        operator: operator.to_string(),
    }
}

fn effective_operator(kw: &Keyword, operator: Operator) -> Operator {
    match (kw.value_type, operator) {
        (ValueType::Number, Operator::Contains) => Operator::Exact,
        (ValueType::String, Operator::Contains) if kw.force_exact_matches => Operator::Exact,
        (ValueType::Array, Operator::Contains) if kw.force_exact_matches => {
            Operator::ElementExact
        }
        (_, operator) => operator,
    }
}

fn column_leaf(
    kw: &Keyword,
    column: &str,
    operator: Operator,
    value: Option<&str>,
    negated: bool,
) -> Result<Predicate, RegistryError> {
    let Some(value) = value else {
        return Ok(absent_value(kw, column, negated));
    };

    let paired = kw
        .placeholder
        .as_ref()
        .and_then(|ph| ph.generalized_column(column).map(|generalized| (ph, generalized)));

    let positive = match paired {
        Some((placeholder, generalized)) => {
            let segments = split_ignore_case(value, placeholder.token());
            Predicate::And(vec![
                segment_match(kw, column, operator, &segments)?,
                match_value(kw, generalized, operator, &placeholder.placeholderize(value))?,
            ])
        }
        None => match_value(kw, column, operator, value)?,
    };

    Ok(if negated {
        positive.negate_nullable(column)
    } else {
        positive
    })
}

fn match_value(
    kw: &Keyword,
    column: &str,
    operator: Operator,
    value: &str,
) -> Result<Predicate, RegistryError> {
    let column = column.to_string();
    let predicate = match (kw.value_type, operator) {
        (ValueType::Number, _) => {
            let number = value.parse::<i64>().map_err(|_| {
                RegistryError::Config(format!(
                    "Keyword {} received non-numeric value {:?}",
                    kw.name, value
                ))
            })?;
            Predicate::Compare {
                column,
                op: comparison(operator).ok_or_else(|| unsupported(kw, operator))?,
                value: Literal::Integer(number),
                fold_case: false,
            }
        }
        (ValueType::String, Operator::Contains) => Predicate::Like {
            column,
            pattern: LikePattern::contains(value),
        },
        (ValueType::String, Operator::Exact) => Predicate::Compare {
            column,
            op: Comparison::Eq,
            value: Literal::Text(value.to_lowercase()),
            fold_case: true,
        },
        (ValueType::Array, Operator::Contains) => Predicate::AnyElement {
            column,
            pattern: LikePattern::contains(&strip_wildcards(value)),
        },
        (ValueType::Array, Operator::ElementExact) => Predicate::AnyElement {
            column,
            pattern: LikePattern::exact(value),
        },
        (ValueType::Array, Operator::Exact) => Predicate::Compare {
            column,
            op: Comparison::Eq,
            value: Literal::Text(format!("[{}]", json_string(value)).to_lowercase()),
            fold_case: true,
        },
        _ => return Err(unsupported(kw, operator)),
    };
    Ok(predicate)
}

/// Literal side of a placeholder search: every segment must appear in order,
/// with anything in between.
fn segment_match(
    kw: &Keyword,
    column: &str,
    operator: Operator,
    segments: &[String],
) -> Result<Predicate, RegistryError> {
    let column = column.to_string();
    let predicate = match (kw.value_type, operator) {
        (ValueType::String, Operator::Contains) => Predicate::Like {
            column,
            pattern: LikePattern::segments("", segments, "").floating(),
        },
        (ValueType::String, Operator::Exact) => Predicate::Like {
            column,
            pattern: LikePattern::segments("", segments, ""),
        },
        (ValueType::Array, Operator::Contains) => {
            let stripped: Vec<String> = segments.iter().map(|s| strip_wildcards(s)).collect();
            Predicate::AnyElement {
                column,
                pattern: LikePattern::segments("", &stripped, "").floating(),
            }
        }
        (ValueType::Array, Operator::ElementExact) => Predicate::AnyElement {
            column,
            pattern: LikePattern::segments("", segments, ""),
        },
        (ValueType::Array, Operator::Exact) => {
            let escaped: Vec<String> = segments.iter().map(|s| json_inner(s)).collect();
            Predicate::Like {
                column,
                pattern: LikePattern::segments("[\"", &escaped, "\"]"),
            }
        }
        _ => return Err(unsupported(kw, operator)),
    };
    Ok(predicate)
}

/// Search none: the field is null, or holds an empty string or an empty list.
fn absent_value(kw: &Keyword, column: &str, negated: bool) -> Predicate {
    let empty = match kw.value_type {
        ValueType::Number => None,
        ValueType::String => Some(String::new()),
        ValueType::Array => Some("[]".to_string()),
    };
    match (empty, negated) {
        (None, false) => Predicate::IsNull(column.to_string()),
        (None, true) => Predicate::IsNotNull(column.to_string()),
        (Some(empty), negated) => {
            let absent = Predicate::Or(vec![
                Predicate::IsNull(column.to_string()),
                Predicate::Compare {
                    column: column.to_string(),
                    op: Comparison::Eq,
                    value: Literal::Text(empty),
                    fold_case: false,
                },
            ]);
            if negated {
                Predicate::Not(Box::new(absent))
            } else {
                absent
            }
        }
    }
}

fn comparison(operator: Operator) -> Option<Comparison> {
    match operator {
        Operator::Exact => Some(Comparison::Eq),
        Operator::Lt => Some(Comparison::Lt),
        Operator::Gt => Some(Comparison::Gt),
        Operator::Le => Some(Comparison::Le),
        Operator::Ge => Some(Comparison::Ge),
        Operator::Contains | Operator::ElementExact => None,
    }
}

/// `value` as a JSON string literal, quotes included: the same escaping the
/// catalog applies when it stores a list.
fn json_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// JSON escaping without the surrounding quotes.
fn json_inner(value: &str) -> String {
    let quoted = json_string(value);
    quoted[1..quoted.len() - 1].to_string()
}

fn strip_wildcards(value: &str) -> String {
    value.chars().filter(|ch| !USER_WILDCARDS.contains(ch)).collect()
}

/// Split on every case-insensitive occurrence of `token`. Segments come back lower-cased.
fn split_ignore_case(value: &str, token: &str) -> Vec<String> {
    let value = value.to_lowercase();
    let token = token.to_lowercase();
    value.split(token.as_str()).map(str::to_string).collect()
}
