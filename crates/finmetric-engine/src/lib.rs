//! Financial metric normalization and comparison
//!
//! This crate turns raw, inconsistently-shaped stock records into canonical
//! metric sets and aligns several of them for side-by-side display. It
//! includes:
//!
//! - Unit classification and formatting (percentages, multiples, ₹ Lakh/Crore)
//! - Defensive extraction that never fails on missing or malformed fields
//! - Label-aligned comparison series with an explicit missing-value mask
//! - A comparison engine that fetches every symbol concurrently
//! - An HTTP provider for the Indian stock API and table/JSON renderers
//!
//! # Example
//!
//! ```rust,ignore
//! use finmetric_engine::{ComparisonEngine, EngineConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EngineConfig::builder().with_env().build()?;
//!     let engine = ComparisonEngine::from_config(&config)?;
//!
//!     let result = engine.compare(&["TATAMOTORS", "RELIANCE"]).await?;
//!     for series in &result.series {
//!         println!("{}: {:?}", series.name, series.values);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod align;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod format;
pub mod render;

// Re-export main types for convenience
pub use align::ComparisonAligner;
pub use api::IndianStockClient;
pub use config::{EngineConfig, ProviderEndpoint};
pub use engine::ComparisonEngine;
pub use error::{AggregateFetchError, EngineError, FetchFailure, FormatError, Result};
pub use extract::MetricExtractor;
pub use format::{Category, UnitFormatter};
pub use render::{OutputFormat, Renderer, RendererFactory};

// Re-export the core model
pub use finmetric_core::{
    ComparisonResult, ComparisonSeries, Metric, MetricValue, ProviderError, RawStockRecord,
    StockInfoProvider, StockMetricSet, StockProfile, StockReport,
};
