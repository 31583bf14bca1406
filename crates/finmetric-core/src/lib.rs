//! Core types for finmetric
//!
//! This crate defines the raw record wrapper, the canonical metric model and
//! the provider trait shared by the rest of the workspace.

pub mod error;
pub mod metric;
pub mod provider;
pub mod record;

pub use error::{ProviderError, ProviderErrorKind, Result};
pub use metric::{
    ComparisonResult, ComparisonSeries, LineItem, Metric, MetricValue, Officer, PeerRating,
    StockMetricSet, StockProfile, StockReport, TechnicalAverage,
};
pub use provider::StockInfoProvider;
pub use record::{RawStockRecord, fields};
