//! Error types for the parser registry crate.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    #[error("Parser already registered for name: {0}")]
    DuplicateParser(String),
    #[error("Parser not registered for name: {0}")]
    ParserNotFound(String),
    #[error("Format specification already defined for identifier: {0}")]
    DuplicateSpecification(String),
    #[error("Signature already defined for identifier: {0}")]
    DuplicateSignature(String),
    #[error("Empty signature pattern: {0}")]
    EmptyPattern(String),
    #[error("Too many scanner rules: {count} (limit {limit})")]
    TooManyRules { count: usize, limit: usize },
    #[error("Matcher build error: {0}")]
    MatcherBuild(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        RegistryError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for RegistryError {
    fn from(err: serde_yaml::Error) -> Self {
        RegistryError::Config(err.to_string())
    }
}
