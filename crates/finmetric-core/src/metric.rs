//! Canonical metric types
//!
//! Everything here is built once per request and never mutated afterwards.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric reading, or the explicit absence of one
///
/// `Unavailable` is never the same thing as `Numeric(0.0)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    Numeric(f64),
    #[default]
    Unavailable,
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(v) => Some(*v),
            Self::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }

    /// Keep `self` when available, otherwise evaluate `fallback`
    pub fn or_else(self, fallback: impl FnOnce() -> MetricValue) -> MetricValue {
        match self {
            Self::Numeric(_) => self,
            Self::Unavailable => fallback(),
        }
    }
}

impl From<Option<f64>> for MetricValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Unavailable, Self::Numeric)
    }
}

/// The metrics every comparison is aligned on, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    CurrentPrice,
    MarketCap,
    PeRatio,
}

impl Metric {
    /// Canonical label order of a [`ComparisonResult`]
    pub const ALL: [Metric; 3] = [Metric::CurrentPrice, Metric::MarketCap, Metric::PeRatio];

    pub fn label(&self) -> &'static str {
        match self {
            Self::CurrentPrice => "Current Price",
            Self::MarketCap => "Market Cap",
            Self::PeRatio => "P/E Ratio",
        }
    }

    /// Position of this metric in [`Metric::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Self::CurrentPrice => 0,
            Self::MarketCap => 1,
            Self::PeRatio => 2,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of a financial statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub display_name: String,
    pub value: MetricValue,
}

/// Moving-average price over a window of days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalAverage {
    pub window_days: u32,
    pub price: MetricValue,
}

/// Normalized metrics for one entity
///
/// Peers are reduced sets: only name, price, market cap and P/E are filled
/// and their own `peers` list is always empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMetricSet {
    pub company_name: String,
    pub current_price: MetricValue,
    /// Raw rupee magnitude, not yet scaled for display
    pub market_cap: MetricValue,
    pub pe_ratio: MetricValue,
    /// Statement category code (`CAS`, `BAL`, `INC`, ...) to its leading rows
    pub financial_line_items: IndexMap<String, Vec<LineItem>>,
    pub peers: Vec<StockMetricSet>,
    pub technical_averages: Vec<TechnicalAverage>,
}

impl StockMetricSet {
    pub fn metric(&self, metric: Metric) -> MetricValue {
        match metric {
            Metric::CurrentPrice => self.current_price,
            Metric::MarketCap => self.market_cap,
            Metric::PeRatio => self.pe_ratio,
        }
    }
}

/// Company officer as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Officer {
    pub name: String,
    pub title: Option<String>,
    pub since: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerRating {
    pub company_name: String,
    pub overall_rating: Option<String>,
}

/// Descriptive, non-numeric part of a stock record
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockProfile {
    pub company_name: String,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub officers: Vec<Officer>,
    pub peer_ratings: Vec<PeerRating>,
}

/// Single-stock detail view
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockReport {
    pub symbol: String,
    pub metrics: StockMetricSet,
    pub profile: StockProfile,
}

/// One entity's values, positionally aligned to [`ComparisonResult::labels`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSeries {
    pub name: String,
    pub values: Vec<f64>,
    /// `true` where the value was unavailable and `0` was emitted instead
    pub missing_mask: Vec<bool>,
}

impl ComparisonSeries {
    /// Value for `metric`, `None` when it was masked as missing
    pub fn value(&self, metric: Metric) -> Option<f64> {
        let idx = metric.index();
        match self.missing_mask.get(idx) {
            Some(false) => self.values.get(idx).copied(),
            _ => None,
        }
    }
}

/// Label-aligned series for two or more entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub labels: Vec<String>,
    pub series: Vec<ComparisonSeries>,
}

impl ComparisonResult {
    /// One metric across every series, in series order
    pub fn column(&self, metric: Metric) -> Vec<(&str, Option<f64>)> {
        self.series
            .iter()
            .map(|s| (s.name.as_str(), s.value(metric)))
            .collect()
    }

    /// Whether every value of every series was available
    pub fn is_complete(&self) -> bool {
        self.series.iter().all(|s| s.missing_mask.iter().all(|m| !m))
    }

    pub fn missing_count(&self) -> usize {
        self.series
            .iter()
            .map(|s| s.missing_mask.iter().filter(|m| **m).count())
            .sum()
    }
}
