//! Stock data provider trait

use crate::{RawStockRecord, Result};
use async_trait::async_trait;

/// Source of raw stock records, one symbol at a time
///
/// Implementations own their transport concerns (timeouts, rate limiting,
/// authentication). Callers only see the record or one of the
/// [`ProviderError`](crate::ProviderError) kinds.
#[async_trait]
pub trait StockInfoProvider: Send + Sync {
    /// Fetch the raw record for `symbol`
    async fn fetch(&self, symbol: &str) -> Result<RawStockRecord>;

    /// Short name used in logs
    fn name(&self) -> &str {
        "provider"
    }
}
