use crate::CliError;
use card_search::Registry;
use std::path::PathBuf;

/// Environment variable naming a registry file, used when `--registry` is not given.
pub const REGISTRY_ENV: &str = "CARD_SEARCH_REGISTRY";

/// Where the keyword registry comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    File(PathBuf),
    BuiltIn,
}

impl RegistrySource {
    /// `--registry` wins over the environment; otherwise the built-in card registry.
    pub fn resolve(flag: Option<PathBuf>, env_value: Option<String>) -> Self {
        match (flag, env_value) {
            (Some(path), _) => RegistrySource::File(path),
            (None, Some(value)) if !value.trim().is_empty() => {
                RegistrySource::File(PathBuf::from(value.trim()))
            }
            _ => RegistrySource::BuiltIn,
        }
    }

    pub fn from_env(flag: Option<PathBuf>) -> Self {
        Self::resolve(flag, std::env::var(REGISTRY_ENV).ok())
    }

    pub fn load(&self) -> Result<Registry, CliError> {
        match self {
            RegistrySource::File(path) => {
                tracing::debug!("Loading keyword registry from {}", path.display());
                Registry::from_path(path).map_err(|error| CliError::Registry {
                    path: Some(path.clone()),
                    error,
                })
            }
            RegistrySource::BuiltIn => Registry::default_cards()
                .map_err(|error| CliError::Registry { path: None, error }),
        }
    }
}
