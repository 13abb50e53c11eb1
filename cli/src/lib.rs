pub mod config;

use card_search::RegistryError;
use std::path::PathBuf;

/// Error type for CLI input and setup failures
#[derive(Debug)]
pub enum CliError {
    MultilineQuery,
    Registry {
        path: Option<PathBuf>,
        error: RegistryError,
    },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::MultilineQuery => {
                write!(
                    f,
                    "Search queries must fit on a single line. Remove the line breaks and try again."
                )
            }
            CliError::Registry {
                path: Some(path),
                error,
            } => {
                write!(
                    f,
                    "Failed to load keyword registry from {}: {error}\n\nPossible fixes:\n  - Check the path passed with --registry or set in {}\n  - Make sure the file is valid YAML (.yaml/.yml) or JSON (.json)",
                    path.display(),
                    config::REGISTRY_ENV
                )
            }
            CliError::Registry { path: None, error } => {
                write!(f, "Built-in keyword registry is invalid: {error}")
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::MultilineQuery => None,
            CliError::Registry { error, .. } => Some(error),
        }
    }
}

/// Rejects queries with embedded line breaks before they reach the parser.
pub fn validate_query(query: &str) -> Result<&str, CliError> {
    if query.contains(['\n', '\r']) {
        return Err(CliError::MultilineQuery);
    }
    Ok(query)
}
