/// Per-query errors. Both variants are terminal for the query that raised them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The lexer met a character it has no rule for.
    Lex { message: String, offset: usize },
    /// The token stream does not form a valid query.
    Parse { message: String, offset: usize },
}

impl SearchError {
    pub fn lex(message: impl Into<String>, offset: usize) -> Self {
        SearchError::Lex {
            message: message.into(),
            offset,
        }
    }

    pub fn parse(message: impl Into<String>, offset: usize) -> Self {
        SearchError::Parse {
            message: message.into(),
            offset,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            SearchError::Lex { message, .. } | SearchError::Parse { message, .. } => message,
        }
    }

    /// Character offset into the query where the failure was detected.
    pub fn offset(&self) -> usize {
        match self {
            SearchError::Lex { offset, .. } | SearchError::Parse { offset, .. } => *offset,
        }
    }
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at pos. {})", self.message(), self.offset())
    }
}

impl std::error::Error for SearchError {}

/// Keyword registry misconfiguration. Raised at startup, never blamed on user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    UnknownColumn {
        keyword: String,
        column: String,
    },
    ColumnKindMismatch {
        keyword: String,
        column: String,
        expected: String,
        found: String,
    },
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },
    InvalidKeywordName(String),
    InvalidPlaceholder {
        keyword: String,
        reason: String,
    },
    InvalidValueMapping {
        keyword: String,
        reason: String,
    },
    UnknownKeyword(String),
    UnsupportedOperator {
        keyword: String,
        operator: String,
    },
    Config(String),
}

impl From<std::io::Error> for RegistryError {
    fn from(error: std::io::Error) -> Self {
        RegistryError::Config(error.to_string())
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(error: serde_json::Error) -> Self {
        RegistryError::Config(format!("JSON: {}", error))
    }
}

impl From<serde_yaml_ng::Error> for RegistryError {
    fn from(error: serde_yaml_ng::Error) -> Self {
        RegistryError::Config(format!("YAML: {}", error))
    }
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::UnknownColumn { keyword, column } => {
                write!(f, "Keyword {} targets unknown column {}", keyword, column)
            }
            RegistryError::ColumnKindMismatch {
                keyword,
                column,
                expected,
                found,
            } => write!(
                f,
                "Keyword {} needs a {} column, but {} is {}",
                keyword, expected, column, found
            ),
            RegistryError::DuplicateAlias {
                alias,
                first,
                second,
            } => write!(
                f,
                "Alias {} is claimed by both {} and {}",
                alias, first, second
            ),
            RegistryError::InvalidKeywordName(name) => write!(
                f,
                "Keyword or alias {:?} must start with a letter or '_' and contain only word characters",
                name
            ),
            RegistryError::InvalidPlaceholder { keyword, reason } => {
                write!(f, "Invalid placeholder search for {}: {}", keyword, reason)
            }
            RegistryError::InvalidValueMapping { keyword, reason } => {
                write!(f, "Invalid value mapping for {}: {}", keyword, reason)
            }
            RegistryError::UnknownKeyword(keyword) => write!(f, "Unknown keyword: {}", keyword),
            RegistryError::UnsupportedOperator { keyword, operator } => write!(
                f,
                "Operator {} is not supported for keyword {}",
                operator, keyword
            ),
            RegistryError::Config(msg) => write!(f, "Registry configuration error: {}", msg),
        }
    }
}

impl std::error::Error for RegistryError {}
