//! Raw provider records
//!
//! A `RawStockRecord` wraps the JSON document returned by a stock data
//! provider for one symbol. Nothing about its shape is guaranteed: every
//! accessor returns `Option` (or an empty slice) and treats JSON `null` the
//! same as a missing key.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known field names read from provider payloads
pub mod fields {
    pub const COMPANY_NAME: &str = "companyName";
    pub const INDUSTRY: &str = "industry";
    pub const CURRENT_PRICE: &str = "currentPrice";
    pub const NSE: &str = "NSE";
    pub const BSE: &str = "BSE";
    pub const COMPANY_PROFILE: &str = "companyProfile";
    pub const MARKET_CAP: &str = "marketCap";
    pub const PE_RATIO: &str = "peRatio";
    pub const COMPANY_DESCRIPTION: &str = "companyDescription";
    pub const OFFICERS: &str = "officers";
    pub const OFFICER: &str = "officer";
    pub const FIRST_NAME: &str = "firstName";
    pub const MIDDLE_INITIAL: &str = "mI";
    pub const LAST_NAME: &str = "lastName";
    pub const TITLE: &str = "title";
    pub const TITLE_VALUE: &str = "Value";
    pub const SINCE: &str = "since";
    pub const PEER_COMPANY_LIST: &str = "peerCompanyList";
    pub const PRICE: &str = "price";
    pub const PEER_PE_RATIO: &str = "priceToEarningsValueRatio";
    pub const OVERALL_RATING: &str = "overallRating";
    pub const FINANCIALS: &str = "financials";
    pub const STOCK_FINANCIAL_MAP: &str = "stockFinancialMap";
    pub const DISPLAY_NAME: &str = "displayName";
    pub const VALUE: &str = "value";
    pub const STOCK_TECHNICAL_DATA: &str = "stockTechnicalData";
    pub const DAYS: &str = "days";
    pub const NSE_PRICE: &str = "nsePrice";
}

/// Walk `path` through nested JSON objects.
///
/// Returns `None` as soon as a segment is missing, the current value is not
/// an object, or the value found is `null`.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for segment in path {
        current = current.as_object()?.get(*segment)?;
    }
    if current.is_null() { None } else { Some(current) }
}

/// Like [`lookup`] but only yields non-blank strings, trimmed
pub fn lookup_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    lookup(value, path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Like [`lookup`] but yields the elements of an array, or nothing
pub fn lookup_array<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    lookup(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// One provider document for one requested symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStockRecord {
    /// Symbol the record was requested under
    symbol: String,
    /// Provider payload, untouched
    payload: Value,
}

impl RawStockRecord {
    /// Wrap a provider payload fetched for `symbol`
    pub fn new(symbol: impl Into<String>, payload: Value) -> Self {
        Self {
            symbol: symbol.into(),
            payload,
        }
    }

    /// Symbol the record was requested under
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The untouched provider payload
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn into_payload(self) -> Value {
        self.payload
    }

    /// Value at a nested object path, `null` treated as absent
    pub fn get(&self, path: &[&str]) -> Option<&Value> {
        lookup(&self.payload, path)
    }

    /// Non-blank string at a nested object path
    pub fn get_str(&self, path: &[&str]) -> Option<&str> {
        lookup_str(&self.payload, path)
    }

    /// Array elements at a nested object path, empty when absent
    pub fn get_array(&self, path: &[&str]) -> &[Value] {
        lookup_array(&self.payload, path)
    }

    /// `companyProfile.peerCompanyList`, empty when absent
    pub fn peers(&self) -> &[Value] {
        self.get_array(&[fields::COMPANY_PROFILE, fields::PEER_COMPANY_LIST])
    }

    /// `financials[0].stockFinancialMap`, in wire key order
    pub fn financial_map(&self) -> Option<&Map<String, Value>> {
        self.get_array(&[fields::FINANCIALS])
            .first()
            .and_then(|statement| lookup(statement, &[fields::STOCK_FINANCIAL_MAP]))
            .and_then(Value::as_object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> RawStockRecord {
        RawStockRecord::new(
            "RELIANCE",
            json!({
                "companyName": "Reliance Industries",
                "currentPrice": { "NSE": "1218.95", "BSE": null },
                "companyProfile": {
                    "companyDescription": "   ",
                    "peerCompanyList": [{ "companyName": "TCS" }]
                },
                "financials": [
                    { "stockFinancialMap": { "INC": [], "BAL": [], "CAS": [] } }
                ]
            }),
        )
    }

    #[test]
    fn test_nested_lookup() {
        let record = record();
        assert_eq!(record.symbol(), "RELIANCE");
        assert_eq!(
            record.get(&[fields::CURRENT_PRICE, fields::NSE]),
            Some(&json!("1218.95"))
        );
        assert!(record.get(&[fields::CURRENT_PRICE, fields::BSE]).is_none());
        assert!(record.get(&["missing", "deeper"]).is_none());
    }

    #[test]
    fn test_lookup_through_non_object() {
        let value = json!({ "currentPrice": "12" });
        assert!(lookup(&value, &["currentPrice", "NSE"]).is_none());
    }

    #[test]
    fn test_blank_strings_are_absent() {
        let record = record();
        assert_eq!(record.get_str(&[fields::COMPANY_NAME]), Some("Reliance Industries"));
        assert!(
            record
                .get_str(&[fields::COMPANY_PROFILE, fields::COMPANY_DESCRIPTION])
                .is_none()
        );
    }

    #[test]
    fn test_array_defaults_to_empty() {
        let record = record();
        assert_eq!(record.peers().len(), 1);
        assert!(record.get_array(&[fields::STOCK_TECHNICAL_DATA]).is_empty());
    }

    #[test]
    fn test_financial_map_keeps_key_order() {
        let record = record();
        let keys: Vec<_> = record
            .financial_map()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        assert_eq!(keys, vec!["INC", "BAL", "CAS"]);
    }
}
