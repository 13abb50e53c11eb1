//! In-memory execution of compiled predicates over a small catalog.
//!
//! Evaluation follows SQL three-valued logic: a comparison against a missing
//! value is unknown (`None`), `NOT unknown` stays unknown, and a row only
//! matches when the whole predicate is known to be true. A list with no
//! elements (or no list at all) never has a matching element.

use crate::predicate::{Comparison, Literal, Predicate};
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Text(String),
    /// Multi-valued column. Whole-list tests see its compact JSON text.
    List(Vec<String>),
}

impl Cell {
    /// The text a database would hold for this cell.
    fn as_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Integer(number) => Some(number.to_string()),
            Cell::Text(text) => Some(text.clone()),
            Cell::List(items) => Some(serde_json::Value::from(items.clone()).to_string()),
        }
    }

    /// List elements, decoding a list stored as JSON text. `None` when the cell
    /// is not a list.
    fn elements(&self) -> Option<Vec<String>> {
        match self {
            Cell::Null => Some(Vec::new()),
            Cell::List(items) => Some(items.clone()),
            Cell::Text(text) => serde_json::from_str(text).ok(),
            Cell::Integer(_) => None,
        }
    }
}

/// Column id (or its last dotted segment) to value.
pub type Row = BTreeMap<String, Cell>;

/// Value of `column` in `row`. A row may key its cells by the full column id
/// (`card.level`) or by the bare column name (`level`).
fn cell<'r>(row: &'r Row, column: &str) -> Option<&'r Cell> {
    row_key(row, column).and_then(|key| row.get(key))
}

fn row_key<'c>(row: &Row, column: &'c str) -> Option<&'c str> {
    if row.contains_key(column) {
        return Some(column);
    }
    let bare = column.rsplit('.').next()?;
    row.contains_key(bare).then_some(bare)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    rows: Vec<Row>,
}

impl Catalog {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// A JSON array of row objects.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows matching `predicate`; every row when there is no constraint.
    pub fn filter(&self, predicate: Option<&Predicate>) -> Vec<&Row> {
        let matching: Vec<&Row> = match predicate {
            Some(predicate) => self.rows.iter().filter(|row| predicate.matches(row)).collect(),
            None => self.rows.iter().collect(),
        };
        tracing::debug!("{} of {} catalog rows match", matching.len(), self.rows.len());
        matching
    }

    /// Fills generalized placeholder columns that a row lacks from its literal column,
    /// the same way ingestion does. Returns the number of cells written.
    pub fn derive_generalized_columns(&mut self, registry: &Registry) -> usize {
        let mut written = 0;
        for keyword in registry.keywords() {
            let Some(placeholder) = &keyword.placeholder else {
                continue;
            };
            for (literal, generalized) in placeholder.column_map() {
                for row in &mut self.rows {
                    if cell(row, generalized).is_some() {
                        continue;
                    }
                    let Some(key) = row_key(row, literal) else {
                        continue;
                    };
                    let derived = match &row[key] {
                        Cell::Text(text) => Cell::Text(placeholder.placeholderize(text)),
                        Cell::List(items) => Cell::List(
                            items.iter().map(|item| placeholder.placeholderize(item)).collect(),
                        ),
                        other => other.clone(),
                    };
                    // Same key style as the literal cell.
                    let target = if key == literal.as_str() {
                        generalized.clone()
                    } else {
                        generalized.rsplit('.').next().unwrap_or(generalized).to_string()
                    };
                    row.insert(target, derived);
                    written += 1;
                }
            }
        }
        written
    }
}

impl Predicate {
    /// Three-valued evaluation against `row`. `None` means unknown.
    pub fn eval(&self, row: &Row) -> Option<bool> {
        match self {
            Predicate::And(members) => {
                let mut result = Some(true);
                for member in members {
                    match member.eval(row) {
                        Some(false) => return Some(false),
                        None => result = None,
                        Some(true) => {}
                    }
                }
                result
            }
            Predicate::Or(members) => {
                let mut result = Some(false);
                for member in members {
                    match member.eval(row) {
                        Some(true) => return Some(true),
                        None => result = None,
                        Some(false) => {}
                    }
                }
                result
            }
            Predicate::Not(inner) => inner.eval(row).map(|value| !value),
            Predicate::Compare {
                column,
                op,
                value,
                fold_case,
            } => {
                let cell = cell(row, column)?;
                let ordering = compare(cell, value, *fold_case)?;
                Some(match op {
                    Comparison::Eq => ordering == Ordering::Equal,
                    Comparison::Lt => ordering == Ordering::Less,
                    Comparison::Gt => ordering == Ordering::Greater,
                    Comparison::Le => ordering != Ordering::Greater,
                    Comparison::Ge => ordering != Ordering::Less,
                })
            }
            Predicate::Like { column, pattern } => {
                let text = cell(row, column)?.as_text()?;
                Some(pattern.matches(&text))
            }
            Predicate::AnyElement { column, pattern } => {
                let elements = match cell(row, column) {
                    Some(cell) => cell.elements()?,
                    None => Vec::new(),
                };
                Some(elements.iter().any(|element| pattern.matches(element)))
            }
            Predicate::IsNull(column) => Some(is_null(row, column)),
            Predicate::IsNotNull(column) => Some(!is_null(row, column)),
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.eval(row) == Some(true)
    }
}

fn is_null(row: &Row, column: &str) -> bool {
    matches!(cell(row, column), None | Some(Cell::Null))
}

/// Ordering of `cell` relative to `literal`; `None` when the cell is null or the
/// two cannot be compared.
fn compare(cell: &Cell, literal: &Literal, fold_case: bool) -> Option<Ordering> {
    match (cell, literal) {
        (Cell::Null, _) => None,
        (Cell::Integer(left), Literal::Integer(right)) => Some(left.cmp(right)),
        (Cell::Text(text), Literal::Integer(right)) => {
            text.trim().parse::<i64>().ok().map(|left| left.cmp(right))
        }
        (Cell::List(_), Literal::Integer(_)) => None,
        (cell, Literal::Text(right)) => {
            let left = cell.as_text()?;
            if fold_case {
                Some(left.to_lowercase().cmp(&right.to_lowercase()))
            } else {
                Some(left.as_str().cmp(right.as_str()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::LikePattern;

    fn row(cells: &[(&str, Cell)]) -> Row {
        cells
            .iter()
            .map(|(key, cell)| (key.to_string(), cell.clone()))
            .collect()
    }

    fn level_ge(n: i64) -> Predicate {
        Predicate::Compare {
            column: "card.level".into(),
            op: Comparison::Ge,
            value: Literal::Integer(n),
            fold_case: false,
        }
    }

    #[test]
    fn test_cells_from_json() {
        let catalog = Catalog::from_json_str(
            r#"[{"name": "Nanoha", "level": 3, "traits": ["Magic", "Weapon"], "flavor": null}]"#,
        )
        .unwrap();
        let row = &catalog.rows()[0];
        assert_eq!(row["name"], Cell::Text("Nanoha".into()));
        assert_eq!(row["level"], Cell::Integer(3));
        assert_eq!(row["traits"], Cell::List(vec!["Magic".into(), "Weapon".into()]));
        assert_eq!(row["flavor"], Cell::Null);
    }

    #[test]
    fn test_column_lookup_accepts_bare_names() {
        let bare = row(&[("level", Cell::Integer(3))]);
        let full = row(&[("card.level", Cell::Integer(1))]);
        assert_eq!(level_ge(3).eval(&bare), Some(true));
        assert_eq!(level_ge(3).eval(&full), Some(false));
    }

    #[test]
    fn test_three_valued_logic() {
        let null_level = row(&[("level", Cell::Null)]);
        let missing = Row::new();
        for row in [&null_level, &missing] {
            assert_eq!(level_ge(3).eval(row), None);
            assert_eq!(Predicate::Not(Box::new(level_ge(3))).eval(row), None);
            assert!(!level_ge(3).matches(row));
            assert!(level_ge(3).negate_nullable("card.level").matches(row));
        }

        let unknown_or_true = Predicate::Or(vec![level_ge(3), Predicate::IsNull("card.level".into())]);
        assert_eq!(unknown_or_true.eval(&null_level), Some(true));
        let unknown_and_false = Predicate::And(vec![level_ge(3), Predicate::IsNotNull("card.level".into())]);
        assert_eq!(unknown_and_false.eval(&null_level), Some(false));
        let unknown_and_true = Predicate::And(vec![level_ge(3), Predicate::IsNull("card.level".into())]);
        assert_eq!(unknown_and_true.eval(&null_level), None);
    }

    #[test]
    fn test_like_over_lists_uses_json_text() {
        let traits = row(&[("traits", Cell::List(vec!["Magic".into(), "Weapon".into()]))]);
        let element = |needle: &str| Predicate::Like {
            column: "card.traits".into(),
            pattern: LikePattern::contains(needle),
        };
        assert!(element("\"magic\"").matches(&traits));
        assert!(element("eap").matches(&traits));
        assert!(!element("\"mag\"").matches(&traits));

        let exact = Predicate::Compare {
            column: "card.traits".into(),
            op: Comparison::Eq,
            value: Literal::Text(r#"["magic","weapon"]"#.into()),
            fold_case: true,
        };
        assert!(exact.matches(&traits));
    }

    #[test]
    fn test_any_element_matches_single_items() {
        let element = |pattern: LikePattern| Predicate::AnyElement {
            column: "card.traits".into(),
            pattern,
        };
        let traits = row(&[("traits", Cell::List(vec!["Magic".into(), "Weapon".into()]))]);
        assert!(element(LikePattern::contains("eap")).matches(&traits));
        assert!(element(LikePattern::exact("magic")).matches(&traits));
        assert!(!element(LikePattern::exact("mag")).matches(&traits));
        assert!(!element(LikePattern::contains(",")).matches(&traits));
        assert!(!element(LikePattern::contains("\"")).matches(&traits));

        let stored = row(&[("traits", Cell::Text(r#"["Magic","Weapon"]"#.into()))]);
        assert!(element(LikePattern::exact("weapon")).matches(&stored));

        let anything = LikePattern::contains("");
        assert_eq!(element(anything.clone()).eval(&row(&[("traits", Cell::List(vec![]))])), Some(false));
        assert_eq!(element(anything.clone()).eval(&row(&[("traits", Cell::Null)])), Some(false));
        assert_eq!(element(anything.clone()).eval(&Row::new()), Some(false));
        assert_eq!(element(anything).eval(&row(&[("traits", Cell::Integer(1))])), None);
    }

    #[test]
    fn test_derive_generalized_columns() {
        let registry = Registry::default_cards().unwrap();
        let mut catalog = Catalog::new(vec![
            row(&[(
                "abilities",
                Cell::List(vec!["Choose a 《Magic》 character".into()]),
            )]),
            row(&[
                ("abilities", Cell::List(vec!["Draw a card".into()])),
                ("abilities_ph", Cell::List(vec!["kept".into()])),
            ]),
            row(&[("card.abilities", Cell::Text("《Weapon》".into()))]),
        ]);

        assert_eq!(catalog.derive_generalized_columns(&registry), 2);
        assert_eq!(
            catalog.rows()[0]["abilities_ph"],
            Cell::List(vec!["Choose a 《TRAIT》 character".into()])
        );
        assert_eq!(catalog.rows()[1]["abilities_ph"], Cell::List(vec!["kept".into()]));
        assert_eq!(
            catalog.rows()[2]["card.abilities_ph"],
            Cell::Text("《TRAIT》".into())
        );
    }

    #[test]
    fn test_filter_without_constraint_returns_everything() {
        let catalog = Catalog::new(vec![Row::new(), Row::new()]);
        assert_eq!(catalog.filter(None).len(), 2);
        assert!(catalog.filter(Some(&level_ge(1))).is_empty());
    }
}
