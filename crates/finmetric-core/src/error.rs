//! Error types for stock data providers

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Failure reported by a [`StockInfoProvider`](crate::StockInfoProvider)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Symbol unrecognized upstream
    #[error("Symbol not found: {symbol}")]
    NotFound { symbol: String },

    /// Transport unreachable, timed out, or returned an unusable response
    #[error("Network error: {0}")]
    Network(String),

    /// Symbol malformed (e.g. empty)
    #[error("Invalid request: {0}")]
    Validation(String),
}

/// Kind of a [`ProviderError`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    NotFound,
    Network,
    Validation,
}

impl ProviderError {
    pub fn not_found(symbol: impl Into<String>) -> Self {
        Self::NotFound {
            symbol: symbol.into(),
        }
    }

    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            Self::NotFound { .. } => ProviderErrorKind::NotFound,
            Self::Network(_) => ProviderErrorKind::Network,
            Self::Validation(_) => ProviderErrorKind::Validation,
        }
    }
}
