use crate::predicate::{LikePattern, Literal, PatternPart, Predicate};

/// Escape character declared on every LIKE clause.
const LIKE_ESCAPE: char = '\\';

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    Integer(i64),
}

/// Builds a SQLite WHERE clause (without the `WHERE` keyword) and its bind values.
/// Values are bound with `?` placeholders, in order of appearance.
pub fn build_sql(predicate: &Predicate) -> (String, Vec<SqlValue>) {
    let mut bind_values = Vec::new();
    let sql = build_predicate_sql(predicate, &mut bind_values);
    (sql, bind_values)
}

/// Like [`build_sql`], with an empty clause when there is no constraint.
pub fn build_where(predicate: Option<&Predicate>) -> (String, Vec<SqlValue>) {
    match predicate {
        Some(predicate) => build_sql(predicate),
        None => (String::new(), Vec::new()),
    }
}

fn build_predicate_sql(predicate: &Predicate, values: &mut Vec<SqlValue>) -> String {
    match predicate {
        Predicate::And(members) => build_group(members, " AND ", values),
        Predicate::Or(members) => build_group(members, " OR ", values),
        Predicate::Not(inner) => format!("NOT ({})", build_predicate_sql(inner, values)),
        Predicate::Compare {
            column,
            op,
            value,
            fold_case,
        } => {
            values.push(match value {
                Literal::Text(text) if *fold_case => SqlValue::String(text.to_lowercase()),
                Literal::Text(text) => SqlValue::String(text.clone()),
                Literal::Integer(number) => SqlValue::Integer(*number),
            });
            if *fold_case {
                format!("LOWER({}) {} ?", quote_ident(column), op.sql())
            } else {
                format!("{} {} ?", quote_ident(column), op.sql())
            }
        }
        Predicate::Like { column, pattern } => {
            values.push(SqlValue::String(like_pattern(pattern)));
            format!("{} LIKE ? ESCAPE '{}'", quote_ident(column), LIKE_ESCAPE)
        }
        Predicate::AnyElement { column, pattern } => {
            values.push(SqlValue::String(like_pattern(pattern)));
            format!(
                "EXISTS (SELECT 1 FROM json_each({}) AS element WHERE element.value LIKE ? ESCAPE '{}')",
                quote_ident(column),
                LIKE_ESCAPE
            )
        }
        Predicate::IsNull(column) => format!("{} IS NULL", quote_ident(column)),
        Predicate::IsNotNull(column) => format!("{} IS NOT NULL", quote_ident(column)),
    }
}

fn build_group(members: &[Predicate], separator: &str, values: &mut Vec<SqlValue>) -> String {
    let parts: Vec<String> = members
        .iter()
        .map(|member| build_predicate_sql(member, values))
        .collect();
    format!("({})", parts.join(separator))
}

/// LIKE pattern text: literal parts with `%`, `_` and the escape character escaped.
pub fn like_pattern(pattern: &LikePattern) -> String {
    let mut out = String::new();
    for part in pattern.parts() {
        match part {
            PatternPart::AnyRun => out.push('%'),
            PatternPart::Literal(text) => {
                for ch in text.chars() {
                    if matches!(ch, '%' | '_') || ch == LIKE_ESCAPE {
                        out.push(LIKE_ESCAPE);
                    }
                    out.push(ch);
                }
            }
        }
    }
    out
}

/// `card.level` becomes `"card"."level"`.
fn quote_ident(column: &str) -> String {
    column
        .split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}
