//! Unit classification and display formatting for financial values

use crate::error::FormatError;
use finmetric_core::MetricValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shown in place of a value that is missing or unparseable
pub const PLACEHOLDER: &str = "N/A";

const CRORE: f64 = 10_000_000.0;
const LAKH: f64 = 100_000.0;

const PERCENTAGE_TERMS: [&str; 5] = ["Margin", "Ratio", "Rate", "Growth", "Return"];
const MULTIPLE_TERMS: [&str; 3] = ["P/E", "P/B", "EV/EBITDA"];

/// Unit a metric is displayed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Percentage,
    Multiple,
    CurrencyScaled,
}

impl Category {
    /// Classify a metric by its display name
    ///
    /// Case-sensitive substring match; percentage terms are checked before
    /// multiple terms, so "P/E Ratio" is a percentage.
    pub fn classify(display_name: &str) -> Self {
        if PERCENTAGE_TERMS.iter().any(|t| display_name.contains(t)) {
            Self::Percentage
        } else if MULTIPLE_TERMS.iter().any(|t| display_name.contains(t)) {
            Self::Multiple
        } else {
            Self::CurrencyScaled
        }
    }
}

/// Formats raw provider values for display
pub struct UnitFormatter;

impl UnitFormatter {
    pub fn classify(display_name: &str) -> Category {
        Category::classify(display_name)
    }

    /// Parse a provider value into a float
    ///
    /// Numbers pass through. Strings are stripped of everything except
    /// digits, `.` and a leading `-` (so "₹1,234.50" parses as 1234.5).
    pub fn parse_numeric(raw: &Value) -> Result<f64, FormatError> {
        match raw {
            Value::Number(n) => n.as_f64().ok_or_else(|| FormatError::new(n.to_string())),
            Value::String(s) => Self::parse_numeric_str(s),
            other => Err(FormatError::new(other.to_string())),
        }
    }

    pub fn parse_numeric_str(raw: &str) -> Result<f64, FormatError> {
        let mut cleaned = String::with_capacity(raw.len());
        for c in raw.chars() {
            if c.is_ascii_digit() || c == '.' || (c == '-' && cleaned.is_empty()) {
                cleaned.push(c);
            }
        }

        cleaned
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| FormatError::new(raw))
    }

    /// Parse and format in one step
    pub fn format(raw: &Value, category: Category) -> Result<String, FormatError> {
        Self::parse_numeric(raw).map(|v| Self::format_value(v, category))
    }

    /// Format a value, substituting [`PLACEHOLDER`] when it cannot be parsed
    pub fn format_or_placeholder(raw: &Value, category: Category) -> String {
        Self::format(raw, category).unwrap_or_else(|e| {
            tracing::debug!("{e}; showing placeholder");
            PLACEHOLDER.to_string()
        })
    }

    /// Format an extracted metric, [`PLACEHOLDER`] when unavailable
    pub fn format_metric(value: MetricValue, category: Category) -> String {
        value.as_f64().map_or_else(
            || PLACEHOLDER.to_string(),
            |v| Self::format_value(v, category),
        )
    }

    pub fn format_value(value: f64, category: Category) -> String {
        match category {
            Category::Percentage => format!("{value:.2}%"),
            Category::Multiple => format!("{value:.2}x"),
            Category::CurrencyScaled => {
                if value >= CRORE {
                    format!("₹{:.2} Cr", value / CRORE)
                } else if value >= LAKH {
                    format!("₹{:.2} Lakh", value / LAKH)
                } else {
                    format!("₹{value:.2}")
                }
            }
        }
    }
}

/// Human title for a financial statement category code
pub fn statement_title(code: &str) -> &str {
    match code {
        "CAS" => "Cash Flow Statement (CAS)",
        "BAL" => "Balance Sheet (BAL)",
        "INC" => "Income Statement (INC)",
        other => other,
    }
}
