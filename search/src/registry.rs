//! Keyword registry: which keywords exist, what they search, and how.
//!
//! The registry is read from a declarative file and validated once at startup.
//! After [`Registry::new`] succeeds, every keyword points at known columns of the
//! right kind, so the compiler never has to resolve anything dynamically.

use crate::errors::RegistryError;
use crate::types::Operator;
use lazy_static::lazy_static;
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Registry for the trading-card catalog.
pub const DEFAULT_REGISTRY_YAML: &str = include_str!("../config/cards.yaml");

lazy_static! {
    static ref KEYWORD_NAME: Regex = Regex::new(r"^[a-z_]\w*$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Array,
}

impl ValueType {
    pub fn allows(&self, operator: Operator) -> bool {
        match self {
            ValueType::Number => matches!(
                operator,
                Operator::Contains
                    | Operator::Exact
                    | Operator::Lt
                    | Operator::Gt
                    | Operator::Le
                    | Operator::Ge
            ),
            ValueType::Array => matches!(
                operator,
                Operator::Contains | Operator::Exact | Operator::ElementExact
            ),
            ValueType::String => matches!(operator, Operator::Contains | Operator::Exact),
        }
    }

    /// Column kind a keyword of this type must target.
    pub fn column_kind(&self) -> ColumnKind {
        match self {
            ValueType::String => ColumnKind::Text,
            ValueType::Number => ColumnKind::Integer,
            ValueType::Array => ColumnKind::Json,
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueType::String => write!(f, "string"),
            ValueType::Number => write!(f, "number"),
            ValueType::Array => write!(f, "array"),
        }
    }
}

/// Storage kind of a catalog column. `Json` columns hold a list of strings
/// serialized as compact JSON text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Integer,
    Json,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Text => write!(f, "text"),
            ColumnKind::Integer => write!(f, "integer"),
            ColumnKind::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    One(String),
    Many(Vec<String>),
}

impl ColumnRef {
    pub fn columns(&self) -> Vec<String> {
        match self {
            ColumnRef::One(column) => vec![column.clone()],
            ColumnRef::Many(columns) => columns.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderConfig {
    /// Literal column -> generalized column holding placeholderized text.
    pub column_map: BTreeMap<String, String>,
    pub placeholder_token: String,
    /// Substrings matching this pattern are replaced by the token.
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordConfig {
    #[serde(rename = "type", alias = "valueType")]
    pub value_type: ValueType,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// `none` or `-` searches for the absence of the field.
    #[serde(default)]
    pub allow_search_none: bool,
    /// Shorthand values expanded before matching.
    #[serde(default)]
    pub value_mapping: BTreeMap<String, String>,
    pub db_column: ColumnRef,
    /// Partial matches (`:`) are upgraded to exact ones.
    #[serde(default)]
    pub force_exact_matches: bool,
    #[serde(default)]
    pub placeholder_search: Option<PlaceholderConfig>,
}

fn default_free_text_keyword() -> String {
    "name".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryConfig {
    pub columns: BTreeMap<String, ColumnKind>,
    /// Keyword used for text outside of expressions.
    #[serde(default = "default_free_text_keyword")]
    pub free_text_keyword: String,
    pub keywords: BTreeMap<String, KeywordConfig>,
}

impl RegistryConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RegistryError> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// `.json` files are read as JSON, everything else as YAML.
    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            RegistryError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }
}

/// Placeholder search pairing, resolved from [`PlaceholderConfig`].
#[derive(Debug, Clone)]
pub struct Placeholder {
    column_map: BTreeMap<String, String>,
    token: String,
    pattern: Regex,
}

impl Placeholder {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn column_map(&self) -> &BTreeMap<String, String> {
        &self.column_map
    }

    pub fn generalized_column(&self, column: &str) -> Option<&str> {
        self.column_map.get(column).map(String::as_str)
    }

    /// Replace every match of the pattern with the placeholder token.
    /// This is the transform that fills the generalized column.
    pub fn placeholderize(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, NoExpand(&self.token))
            .into_owned()
    }
}

/// A validated keyword.
#[derive(Debug, Clone)]
pub struct Keyword {
    pub name: String,
    pub value_type: ValueType,
    pub aliases: Vec<String>,
    pub allow_search_none: bool,
    /// Keys are lower-case.
    pub value_mapping: HashMap<String, String>,
    pub columns: Vec<String>,
    pub force_exact_matches: bool,
    pub placeholder: Option<Placeholder>,
}

impl Keyword {
    /// Expanded shorthand for `value`, looked up case-insensitively.
    pub fn mapped_value(&self, value: &str) -> Option<&str> {
        self.value_mapping
            .get(&value.to_lowercase())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    keywords: BTreeMap<String, Keyword>,
    aliases: HashMap<String, String>,
    columns: BTreeMap<String, ColumnKind>,
    free_text_keyword: String,
}

impl Registry {
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let RegistryConfig {
            columns,
            free_text_keyword,
            keywords: keyword_configs,
        } = config;

        let mut keywords = BTreeMap::new();
        let mut aliases: HashMap<String, String> = HashMap::new();

        for (name, kw_config) in keyword_configs {
            let name = name.to_lowercase();
            let keyword = resolve_keyword(&name, kw_config, &columns)?;

            for alias in std::iter::once(&name).chain(keyword.aliases.iter()) {
                if !KEYWORD_NAME.is_match(alias) {
                    return Err(RegistryError::InvalidKeywordName(alias.clone()));
                }
                if let Some(first) = aliases.insert(alias.clone(), name.clone()) {
                    if first != name {
                        return Err(RegistryError::DuplicateAlias {
                            alias: alias.clone(),
                            first,
                            second: name,
                        });
                    }
                }
            }
            keywords.insert(name, keyword);
        }

        let free_text_keyword = free_text_keyword.to_lowercase();
        match keywords.get(&free_text_keyword) {
            Some(kw) if kw.value_type != ValueType::Number => {}
            Some(_) => {
                return Err(RegistryError::Config(format!(
                    "Free text keyword {} must be a string or array keyword",
                    free_text_keyword
                )))
            }
            None => return Err(RegistryError::UnknownKeyword(free_text_keyword)),
        }

        tracing::info!(
            "Keyword registry ready: {} keywords, {} aliases, {} columns",
            keywords.len(),
            aliases.len(),
            columns.len()
        );

        Ok(Self {
            keywords,
            aliases,
            columns,
            free_text_keyword,
        })
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, RegistryError> {
        Self::new(RegistryConfig::from_yaml_str(yaml)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        Self::new(RegistryConfig::from_path(path)?)
    }

    pub fn default_cards() -> Result<Self, RegistryError> {
        Self::from_yaml_str(DEFAULT_REGISTRY_YAML)
    }

    /// Canonical keyword for a keyword or alias, case-insensitively.
    pub fn resolve(&self, alias: &str) -> Option<&Keyword> {
        let name = self.aliases.get(&alias.to_lowercase())?;
        self.keywords.get(name)
    }

    pub fn keyword(&self, name: &str) -> Option<&Keyword> {
        self.keywords.get(name)
    }

    pub fn keywords(&self) -> impl Iterator<Item = &Keyword> {
        self.keywords.values()
    }

    /// Every lower-case keyword and alias, mapped to its canonical keyword.
    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }

    pub fn free_text_keyword(&self) -> &Keyword {
        // Checked in `new`.
        &self.keywords[&self.free_text_keyword]
    }

    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        self.columns.get(column).copied()
    }

    pub fn columns(&self) -> &BTreeMap<String, ColumnKind> {
        &self.columns
    }
}

fn resolve_keyword(
    name: &str,
    config: KeywordConfig,
    columns: &BTreeMap<String, ColumnKind>,
) -> Result<Keyword, RegistryError> {
    let expected = config.value_type.column_kind();
    let check_column = |column: &str| -> Result<(), RegistryError> {
        match columns.get(column) {
            None => Err(RegistryError::UnknownColumn {
                keyword: name.to_string(),
                column: column.to_string(),
            }),
            Some(kind) if *kind != expected => Err(RegistryError::ColumnKindMismatch {
                keyword: name.to_string(),
                column: column.to_string(),
                expected: expected.to_string(),
                found: kind.to_string(),
            }),
            Some(_) => Ok(()),
        }
    };

    let keyword_columns = config.db_column.columns();
    if keyword_columns.is_empty() {
        return Err(RegistryError::Config(format!(
            "Keyword {} has no target column",
            name
        )));
    }
    for column in &keyword_columns {
        check_column(column)?;
    }

    let mut value_mapping = HashMap::new();
    for (from, to) in config.value_mapping {
        if config.value_type == ValueType::Number && to.parse::<i64>().is_err() {
            return Err(RegistryError::InvalidValueMapping {
                keyword: name.to_string(),
                reason: format!("{:?} is not a number", to),
            });
        }
        value_mapping.insert(from.to_lowercase(), to);
    }

    let placeholder = match config.placeholder_search {
        Some(ph) => {
            let invalid = |reason: String| RegistryError::InvalidPlaceholder {
                keyword: name.to_string(),
                reason,
            };
            if config.value_type == ValueType::Number {
                return Err(invalid("number keywords cannot use placeholders".into()));
            }
            if ph.placeholder_token.is_empty() {
                return Err(invalid("placeholder token is empty".into()));
            }
            if ph.column_map.is_empty() {
                return Err(invalid("column map is empty".into()));
            }
            for (literal, generalized) in &ph.column_map {
                if !keyword_columns.contains(literal) {
                    return Err(invalid(format!(
                        "{} is not a column of this keyword",
                        literal
                    )));
                }
                check_column(generalized)?;
            }
            let pattern = RegexBuilder::new(&ph.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| invalid(format!("bad pattern: {}", e)))?;
            if !pattern.is_match(&ph.placeholder_token) {
                return Err(invalid(format!(
                    "pattern {} does not match its own token {}",
                    ph.pattern, ph.placeholder_token
                )));
            }
            Some(Placeholder {
                column_map: ph.column_map,
                token: ph.placeholder_token,
                pattern,
            })
        }
        None => None,
    };

    Ok(Keyword {
        name: name.to_string(),
        value_type: config.value_type,
        aliases: config.aliases.iter().map(|a| a.to_lowercase()).collect(),
        allow_search_none: config.allow_search_none,
        value_mapping,
        columns: keyword_columns,
        force_exact_matches: config.force_exact_matches,
        placeholder,
    })
}

#[cfg(test)]
mod tests;
