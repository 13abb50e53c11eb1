//! Engine-neutral boolean predicate produced by the compiler.
//!
//! An execution engine only needs equality, ordered comparison, pattern
//! containment, per-element list matching, null tests and AND/OR/NOT
//! composition to run it.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparison {
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Comparison {
    pub fn sql(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Lt => "<",
            Comparison::Gt => ">",
            Comparison::Le => "<=",
            Comparison::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Text(String),
    Integer(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PatternPart {
    Literal(String),
    AnyRun,
}

/// Case-insensitive pattern anchored at both ends of the value.
/// Literal parts match verbatim; `AnyRun` matches any (possibly empty) run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LikePattern {
    parts: Vec<PatternPart>,
}

impl LikePattern {
    /// Joins `pieces` with match-any runs. Empty pieces are dropped and
    /// consecutive runs collapse.
    pub fn new(pieces: Vec<PatternPart>) -> Self {
        let mut parts: Vec<PatternPart> = Vec::with_capacity(pieces.len());
        for piece in pieces {
            match piece {
                PatternPart::Literal(text) if text.is_empty() => {}
                PatternPart::AnyRun if parts.last() == Some(&PatternPart::AnyRun) => {}
                piece => parts.push(piece),
            }
        }
        Self { parts }
    }

    /// The whole value equals `text`, ignoring case.
    pub fn exact(text: &str) -> Self {
        Self::new(vec![PatternPart::Literal(text.to_string())])
    }

    /// Substring containment of `needle`.
    pub fn contains(needle: &str) -> Self {
        Self::new(vec![
            PatternPart::AnyRun,
            PatternPart::Literal(needle.to_string()),
            PatternPart::AnyRun,
        ])
    }

    /// `prefix`, then each segment separated by match-any runs, then `suffix`.
    pub fn segments(prefix: &str, segments: &[String], suffix: &str) -> Self {
        let mut pieces = vec![PatternPart::Literal(prefix.to_string())];
        for (idx, segment) in segments.iter().enumerate() {
            if idx > 0 {
                pieces.push(PatternPart::AnyRun);
            }
            pieces.push(PatternPart::Literal(segment.clone()));
        }
        pieces.push(PatternPart::Literal(suffix.to_string()));
        Self::new(pieces)
    }

    /// Releases both anchors.
    pub fn floating(self) -> Self {
        let mut pieces = vec![PatternPart::AnyRun];
        pieces.extend(self.parts);
        pieces.push(PatternPart::AnyRun);
        Self::new(pieces)
    }

    pub fn parts(&self) -> &[PatternPart] {
        &self.parts
    }

    pub fn matches(&self, value: &str) -> bool {
        let value = value.to_lowercase();
        let mut rest = value.as_str();
        let mut floating = false;

        for (idx, part) in self.parts.iter().enumerate() {
            match part {
                PatternPart::AnyRun => floating = true,
                PatternPart::Literal(text) => {
                    let text = text.to_lowercase();
                    let is_last = idx + 1 == self.parts.len();
                    if !floating {
                        match rest.strip_prefix(text.as_str()) {
                            Some(tail) => rest = tail,
                            None => return false,
                        }
                    } else if is_last {
                        return rest.ends_with(text.as_str());
                    } else {
                        match rest.find(text.as_str()) {
                            Some(pos) => rest = &rest[pos + text.len()..],
                            None => return false,
                        }
                    }
                    floating = false;
                }
            }
        }

        floating || rest.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
    Compare {
        column: String,
        op: Comparison,
        value: Literal,
        /// Compare both operands lower-cased.
        fold_case: bool,
    },
    Like {
        column: String,
        pattern: LikePattern,
    },
    /// Some element of a list column matches `pattern`. A null or empty list
    /// has no element, so this is false rather than unknown.
    AnyElement {
        column: String,
        pattern: LikePattern,
    },
    IsNull(String),
    IsNotNull(String),
}

impl Predicate {
    /// Conjunction; a single predicate is returned unwrapped and `None` means no constraint.
    pub fn all(mut predicates: Vec<Predicate>) -> Option<Predicate> {
        match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(Predicate::And(predicates)),
        }
    }

    pub fn any(mut predicates: Vec<Predicate>) -> Option<Predicate> {
        match predicates.len() {
            0 => None,
            1 => predicates.pop(),
            _ => Some(Predicate::Or(predicates)),
        }
    }

    /// `NOT(self) OR column IS NULL`: a missing value satisfies the negation,
    /// where `NOT(self)` alone would be unknown.
    pub fn negate_nullable(self, column: &str) -> Predicate {
        Predicate::Or(vec![
            Predicate::Not(Box::new(self)),
            Predicate::IsNull(column.to_string()),
        ])
    }
}
