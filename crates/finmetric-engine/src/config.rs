//! Configuration for the comparison engine and its HTTP provider

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable names read by [`EngineConfig::with_env`]
pub mod env {
    pub const PROVIDER_URL: &str = "FINMETRIC_PROVIDER_URL";
    pub const PROVIDER_ENDPOINT: &str = "FINMETRIC_PROVIDER_ENDPOINT";
    pub const API_KEY: &str = "INDIAN_STOCK_API_KEY";
    pub const REQUEST_TIMEOUT_SECS: &str = "FINMETRIC_REQUEST_TIMEOUT_SECS";
    pub const RATE_LIMIT_PER_MINUTE: &str = "FINMETRIC_RATE_LIMIT_PER_MINUTE";
}

pub const DEFAULT_BASE_URL: &str = "https://stock.indianapi.in";

/// Shape of the upstream stock endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderEndpoint {
    /// Stock API called directly; the body is the record (needs an API key)
    #[default]
    Direct,
    /// Research backend; the body wraps records in `{"data": [{"raw_data": ...}]}`
    Gateway,
}

impl FromStr for ProviderEndpoint {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "gateway" => Ok(Self::Gateway),
            other => Err(EngineError::Config(format!(
                "unknown provider endpoint '{other}', expected 'direct' or 'gateway'"
            ))),
        }
    }
}

/// Configuration for comparisons and the HTTP provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Base URL of the stock data service
    pub base_url: String,

    /// Which endpoint shape `base_url` serves
    pub endpoint: ProviderEndpoint,

    /// API key sent as `X-API-Key` (direct endpoint only)
    pub api_key: Option<String>,

    /// Per-request timeout, enforced by the provider
    pub request_timeout: Duration,

    /// Requests per minute allowed to the provider
    pub rate_limit_per_minute: u32,

    /// Fewest symbols a comparison accepts
    pub min_symbols: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: ProviderEndpoint::Direct,
            api_key: None,
            request_timeout: Duration::from_secs(30),
            rate_limit_per_minute: 60,
            min_symbols: 2,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration builder
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)
            .map_err(|e| EngineError::Config(format!("invalid base_url '{}': {e}", self.base_url)))?;

        if self.endpoint == ProviderEndpoint::Direct && self.api_key.is_none() {
            return Err(EngineError::Config(format!(
                "an API key is required for the direct endpoint (set {})",
                env::API_KEY
            )));
        }

        if self.rate_limit_per_minute == 0 {
            return Err(EngineError::Config(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }

        if self.min_symbols < 2 {
            return Err(EngineError::Config(
                "min_symbols must be at least 2".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for EngineConfig
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    base_url: Option<String>,
    endpoint: Option<ProviderEndpoint>,
    api_key: Option<String>,
    request_timeout: Option<Duration>,
    rate_limit_per_minute: Option<u32>,
    min_symbols: Option<usize>,
    env_error: Option<EngineError>,
}

impl EngineConfigBuilder {
    /// Set the provider base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the endpoint shape
    pub fn endpoint(mut self, endpoint: ProviderEndpoint) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set the provider API key
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the provider rate limit
    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    /// Set the minimum number of symbols per comparison
    pub fn min_symbols(mut self, min: usize) -> Self {
        self.min_symbols = Some(min);
        self
    }

    /// Fill unset fields from the process environment
    ///
    /// Values set explicitly on the builder take precedence. Malformed
    /// variables are reported by [`build`](Self::build).
    pub fn with_env(self) -> Self {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if self.base_url.is_none() {
            self.base_url = var(env::PROVIDER_URL);
        }
        if self.api_key.is_none() {
            self.api_key = var(env::API_KEY).filter(|k| !k.trim().is_empty());
        }
        if self.endpoint.is_none() {
            if let Some(raw) = var(env::PROVIDER_ENDPOINT) {
                match raw.parse() {
                    Ok(endpoint) => self.endpoint = Some(endpoint),
                    Err(e) => self.env_error = Some(e),
                }
            }
        }
        if self.request_timeout.is_none() {
            if let Some(raw) = var(env::REQUEST_TIMEOUT_SECS) {
                match raw.trim().parse::<u64>() {
                    Ok(secs) => self.request_timeout = Some(Duration::from_secs(secs)),
                    Err(e) => {
                        self.env_error = Some(EngineError::Config(format!(
                            "{}: {e}",
                            env::REQUEST_TIMEOUT_SECS
                        )));
                    }
                }
            }
        }
        if self.rate_limit_per_minute.is_none() {
            if let Some(raw) = var(env::RATE_LIMIT_PER_MINUTE) {
                match raw.trim().parse::<u32>() {
                    Ok(limit) => self.rate_limit_per_minute = Some(limit),
                    Err(e) => {
                        self.env_error = Some(EngineError::Config(format!(
                            "{}: {e}",
                            env::RATE_LIMIT_PER_MINUTE
                        )));
                    }
                }
            }
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EngineConfig> {
        if let Some(err) = self.env_error {
            return Err(err);
        }

        let defaults = EngineConfig::default();

        let config = EngineConfig {
            base_url: self.base_url.unwrap_or(defaults.base_url),
            endpoint: self.endpoint.unwrap_or(defaults.endpoint),
            api_key: self.api_key,
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            rate_limit_per_minute: self
                .rate_limit_per_minute
                .unwrap_or(defaults.rate_limit_per_minute),
            min_symbols: self.min_symbols.unwrap_or(defaults.min_symbols),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.endpoint, ProviderEndpoint::Direct);
        assert_eq!(config.min_symbols, 2);
        // Direct endpoint without a key is rejected
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::builder()
            .api_key("test_key")
            .rate_limit_per_minute(30)
            .request_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(config.rate_limit_per_minute, 30);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_gateway_needs_no_key() {
        let config = EngineConfig::builder()
            .base_url("http://localhost:8000/api/v1")
            .endpoint(ProviderEndpoint::Gateway)
            .build();
        assert!(config.is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let base = EngineConfig {
            api_key: Some("k".into()),
            ..Default::default()
        };
        assert!(base.validate().is_ok());

        let bad_url = EngineConfig {
            base_url: "not a url".into(),
            ..base.clone()
        };
        assert!(bad_url.validate().is_err());

        let zero_rate = EngineConfig {
            rate_limit_per_minute: 0,
            ..base.clone()
        };
        assert!(zero_rate.validate().is_err());

        let one_symbol = EngineConfig {
            min_symbols: 1,
            ..base
        };
        assert!(one_symbol.validate().is_err());
    }

    #[test]
    fn test_env_fills_unset_fields() {
        let config = EngineConfig::builder()
            .rate_limit_per_minute(10)
            .with_vars(vars(&[
                (env::PROVIDER_URL, "http://localhost:8000/api/v1"),
                (env::PROVIDER_ENDPOINT, "Gateway"),
                (env::RATE_LIMIT_PER_MINUTE, "99"),
                (env::REQUEST_TIMEOUT_SECS, "7"),
            ]))
            .build()
            .unwrap();

        assert_eq!(config.endpoint, ProviderEndpoint::Gateway);
        assert_eq!(config.base_url, "http://localhost:8000/api/v1");
        // Explicit builder value wins
        assert_eq!(config.rate_limit_per_minute, 10);
        assert_eq!(config.request_timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_malformed_env_is_reported() {
        let result = EngineConfig::builder()
            .api_key("k")
            .with_vars(vars(&[(env::REQUEST_TIMEOUT_SECS, "soon")]))
            .build();
        assert!(matches!(result, Err(EngineError::Config(_))));

        let result = EngineConfig::builder()
            .with_vars(vars(&[(env::PROVIDER_ENDPOINT, "carrier-pigeon")]))
            .build();
        assert!(matches!(result, Err(EngineError::Config(_))));
    }
}
