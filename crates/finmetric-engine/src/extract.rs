//! Defensive extraction of canonical metrics from raw provider records
//!
//! Extraction never fails. A missing or unparseable scalar becomes
//! [`MetricValue::Unavailable`] and a missing list becomes an empty one.

use crate::format::UnitFormatter;
use finmetric_core::record::{lookup, lookup_str};
use finmetric_core::{
    LineItem, MetricValue, Officer, PeerRating, RawStockRecord, StockMetricSet, StockProfile,
    StockReport, TechnicalAverage, fields,
};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// Rows kept per financial statement category
pub const DEFAULT_LINE_ITEM_LIMIT: usize = 5;

/// Numeric value at `path`, `Unavailable` when absent or unparseable
fn metric_at(value: &Value, path: &[&str]) -> MetricValue {
    let Some(raw) = lookup(value, path) else {
        return MetricValue::Unavailable;
    };
    match UnitFormatter::parse_numeric(raw) {
        Ok(v) => MetricValue::Numeric(v),
        Err(e) => {
            debug!(path = ?path, "{e}; treating as unavailable");
            MetricValue::Unavailable
        }
    }
}

/// Converts raw records into [`StockMetricSet`]s and [`StockProfile`]s
#[derive(Debug, Clone)]
pub struct MetricExtractor {
    line_item_limit: usize,
}

impl Default for MetricExtractor {
    fn default() -> Self {
        Self {
            line_item_limit: DEFAULT_LINE_ITEM_LIMIT,
        }
    }
}

impl MetricExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override how many rows are kept per statement category
    pub fn with_line_item_limit(mut self, limit: usize) -> Self {
        self.line_item_limit = limit;
        self
    }

    /// Extract the canonical metric set
    pub fn extract(&self, raw: &RawStockRecord) -> StockMetricSet {
        let payload = raw.payload();
        let first_peer = raw.peers().first();

        // NSE first, BSE second
        let current_price = metric_at(payload, &[fields::CURRENT_PRICE, fields::NSE])
            .or_else(|| metric_at(payload, &[fields::CURRENT_PRICE, fields::BSE]));

        // The first peer entry is the fallback source for market cap and P/E
        let market_cap = metric_at(payload, &[fields::COMPANY_PROFILE, fields::MARKET_CAP])
            .or_else(|| {
                first_peer.map_or(MetricValue::Unavailable, |peer| {
                    debug!(symbol = raw.symbol(), "market cap sourced from first peer entry");
                    metric_at(peer, &[fields::MARKET_CAP])
                })
            });
        let pe_ratio = metric_at(payload, &[fields::COMPANY_PROFILE, fields::PE_RATIO]).or_else(
            || {
                first_peer.map_or(MetricValue::Unavailable, |peer| {
                    debug!(symbol = raw.symbol(), "P/E ratio sourced from first peer entry");
                    metric_at(peer, &[fields::PEER_PE_RATIO])
                })
            },
        );

        StockMetricSet {
            company_name: Self::company_name(raw),
            current_price,
            market_cap,
            pe_ratio,
            financial_line_items: self.line_items(raw),
            peers: raw.peers().iter().map(Self::peer).collect(),
            technical_averages: Self::technical_averages(raw),
        }
    }

    /// Extract the descriptive parts of a record
    pub fn extract_profile(&self, raw: &RawStockRecord) -> StockProfile {
        let officers = raw
            .get_array(&[fields::COMPANY_PROFILE, fields::OFFICERS, fields::OFFICER])
            .iter()
            .filter_map(Self::officer)
            .collect();

        let peer_ratings = raw
            .peers()
            .iter()
            .map(|peer| PeerRating {
                company_name: lookup_str(peer, &[fields::COMPANY_NAME])
                    .unwrap_or_default()
                    .to_string(),
                overall_rating: lookup(peer, &[fields::OVERALL_RATING]).and_then(scalar_text),
            })
            .collect();

        StockProfile {
            company_name: Self::company_name(raw),
            industry: raw.get_str(&[fields::INDUSTRY]).map(str::to_string),
            description: raw
                .get_str(&[fields::COMPANY_PROFILE, fields::COMPANY_DESCRIPTION])
                .map(str::to_string),
            officers,
            peer_ratings,
        }
    }

    /// Metrics and profile together, for the single-stock view
    pub fn extract_report(&self, raw: &RawStockRecord) -> StockReport {
        StockReport {
            symbol: raw.symbol().to_string(),
            metrics: self.extract(raw),
            profile: self.extract_profile(raw),
        }
    }

    fn company_name(raw: &RawStockRecord) -> String {
        raw.get_str(&[fields::COMPANY_NAME])
            .unwrap_or_else(|| raw.symbol())
            .to_string()
    }

    fn line_items(&self, raw: &RawStockRecord) -> IndexMap<String, Vec<LineItem>> {
        let Some(map) = raw.financial_map() else {
            return IndexMap::new();
        };

        map.iter()
            .map(|(category, rows)| {
                let items = rows
                    .as_array()
                    .map(Vec::as_slice)
                    .unwrap_or_default()
                    .iter()
                    .take(self.line_item_limit)
                    .map(|row| LineItem {
                        display_name: lookup_str(row, &[fields::DISPLAY_NAME])
                            .unwrap_or_default()
                            .to_string(),
                        value: metric_at(row, &[fields::VALUE]),
                    })
                    .collect();
                (category.clone(), items)
            })
            .collect()
    }

    /// Reduced set for a peer entry; peers of peers are never expanded
    fn peer(entry: &Value) -> StockMetricSet {
        StockMetricSet {
            company_name: lookup_str(entry, &[fields::COMPANY_NAME])
                .unwrap_or_default()
                .to_string(),
            current_price: metric_at(entry, &[fields::PRICE]),
            market_cap: metric_at(entry, &[fields::MARKET_CAP]),
            pe_ratio: metric_at(entry, &[fields::PEER_PE_RATIO]),
            ..StockMetricSet::default()
        }
    }

    fn technical_averages(raw: &RawStockRecord) -> Vec<TechnicalAverage> {
        raw.get_array(&[fields::STOCK_TECHNICAL_DATA])
            .iter()
            .filter_map(|entry| {
                let days = metric_at(entry, &[fields::DAYS])
                    .as_f64()
                    .filter(|d| d.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(d));
                let Some(days) = days else {
                    debug!(symbol = raw.symbol(), "skipping technical entry without a day window");
                    return None;
                };
                Some(TechnicalAverage {
                    window_days: days as u32,
                    price: metric_at(entry, &[fields::NSE_PRICE]),
                })
            })
            .collect()
    }

    fn officer(entry: &Value) -> Option<Officer> {
        let middle = lookup_str(entry, &[fields::MIDDLE_INITIAL])
            .map(|m| format!("{m} "))
            .unwrap_or_default();
        let name = format!(
            "{} {}{}",
            lookup_str(entry, &[fields::FIRST_NAME]).unwrap_or_default(),
            middle,
            lookup_str(entry, &[fields::LAST_NAME]).unwrap_or_default(),
        );
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        Some(Officer {
            name: name.to_string(),
            title: lookup_str(entry, &[fields::TITLE, fields::TITLE_VALUE]).map(str::to_string),
            since: lookup(entry, &[fields::SINCE]).and_then(scalar_text),
        })
    }
}

/// Strings and numbers as display text; anything else is absent
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
