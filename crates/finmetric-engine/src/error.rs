//! Error types for extraction, formatting and comparison

use finmetric_core::{ProviderError, ProviderErrorKind};
use std::fmt;
use thiserror::Error;

/// Comparison engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad caller input, e.g. fewer than two symbols
    #[error("Validation error: {0}")]
    Validation(String),

    /// One or more provider fetches failed; nothing is returned
    #[error(transparent)]
    AggregateFetch(#[from] AggregateFetchError),

    /// The aligner was handed too few entities. A caller bug, not a user condition.
    #[error("Insufficient entities: need at least {required}, got {actual}")]
    InsufficientEntities { required: usize, actual: usize },

    /// Single-symbol fetch failure
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// A numeric literal that could not be parsed
///
/// Recovered locally by callers, who display a placeholder instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot parse {input:?} as a number")]
pub struct FormatError {
    pub input: String,
}

impl FormatError {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// A provider failure for one symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub symbol: String,
    pub cause: ProviderError,
}

impl FetchFailure {
    pub fn kind(&self) -> ProviderErrorKind {
        self.cause.kind()
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.symbol, self.cause)
    }
}

/// Every symbol that failed during one comparison, in request order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct AggregateFetchError {
    pub failures: Vec<FetchFailure>,
}

impl AggregateFetchError {
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.symbol.as_str())
    }

    pub fn failure_for(&self, symbol: &str) -> Option<&FetchFailure> {
        self.failures.iter().find(|f| f.symbol == symbol)
    }
}

impl fmt::Display for AggregateFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to fetch {} symbol(s)", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            f.write_str(if i == 0 { ": " } else { "; " })?;
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}
