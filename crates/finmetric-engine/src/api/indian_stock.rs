//! HTTP provider for Indian equities
//!
//! Talks either to the stock API directly or to the research backend that
//! wraps it; see [`ProviderEndpoint`].

use crate::config::{EngineConfig, ProviderEndpoint};
use crate::error::EngineError;
use async_trait::async_trait;
use finmetric_core::{ProviderError, RawStockRecord, StockInfoProvider};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const API_KEY_HEADER: &str = "X-API-Key";

/// Stock data client with rate limiting and a per-request timeout
#[derive(Clone)]
pub struct IndianStockClient {
    client: Client,
    base_url: Url,
    endpoint: ProviderEndpoint,
    api_key: Option<String>,
    rate_limiter: SharedRateLimiter,
}

impl IndianStockClient {
    /// Create a client from configuration
    pub fn new(config: &EngineConfig) -> crate::Result<Self> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| EngineError::Config(format!("invalid base_url: {e}")))?;
        // Keep the last path segment when joining endpoint paths
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let rate = NonZeroU32::new(config.rate_limit_per_minute).ok_or_else(|| {
            EngineError::Config("rate_limit_per_minute must be greater than 0".to_string())
        })?;
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(rate)));

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| EngineError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            endpoint: config.endpoint,
            api_key: config.api_key.clone(),
            rate_limiter,
        })
    }

    /// URL requested for `symbol`
    pub fn request_url(&self, symbol: &str) -> Result<Url, ProviderError> {
        let path = match self.endpoint {
            ProviderEndpoint::Direct => "stock",
            ProviderEndpoint::Gateway => "fetch-indian-stock",
        };
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| ProviderError::Validation(format!("cannot build request URL: {e}")))?;

        match self.endpoint {
            ProviderEndpoint::Direct => {
                url.query_pairs_mut().append_pair("name", symbol);
            }
            ProviderEndpoint::Gateway => {
                url.query_pairs_mut()
                    .append_pair("stock_name", symbol)
                    .append_pair("index_data", "false");
            }
        }
        Ok(url)
    }

    async fn fetch_record(&self, symbol: &str) -> Result<RawStockRecord, ProviderError> {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(ProviderError::Validation("symbol must not be empty".to_string()));
        }

        let url = self.request_url(symbol)?;
        self.rate_limiter.until_ready().await;
        debug!(%url, "requesting stock data");

        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Network(format!("request for {symbol} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(symbol, %status, "stock data request rejected");
            return Err(status_error(symbol, status, &body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Network(format!("invalid response body for {symbol}: {e}")))?;

        decode_payload(symbol, self.endpoint, body)
    }
}

#[async_trait]
impl StockInfoProvider for IndianStockClient {
    async fn fetch(&self, symbol: &str) -> Result<RawStockRecord, ProviderError> {
        self.fetch_record(symbol).await
    }

    fn name(&self) -> &str {
        match self.endpoint {
            ProviderEndpoint::Direct => "indian-stock-api",
            ProviderEndpoint::Gateway => "research-gateway",
        }
    }
}

fn status_error(symbol: &str, status: StatusCode, body: &str) -> ProviderError {
    match status {
        StatusCode::NOT_FOUND => ProviderError::not_found(symbol),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::Validation(format!("{symbol} rejected with {status}: {body}"))
        }
        _ => ProviderError::Network(format!("{symbol}: HTTP {status}: {body}")),
    }
}

/// Turn a successful response body into a record
fn decode_payload(
    symbol: &str,
    endpoint: ProviderEndpoint,
    body: Value,
) -> Result<RawStockRecord, ProviderError> {
    if body.get("error").is_some_and(|e| !e.is_null()) {
        debug!(symbol, "provider reported an error body");
        return Err(ProviderError::not_found(symbol));
    }

    let record = match endpoint {
        ProviderEndpoint::Direct => body,
        ProviderEndpoint::Gateway => {
            let Value::Object(mut envelope) = body else {
                return Err(ProviderError::Network(format!(
                    "unexpected response shape for {symbol}"
                )));
            };
            // Only the first document per symbol is used
            let first = match envelope.remove("data") {
                Some(Value::Array(docs)) => docs.into_iter().next(),
                _ => None,
            };
            let Some(mut document) = first else {
                return Err(ProviderError::not_found(symbol));
            };
            match document.get_mut("raw_data").map(Value::take) {
                Some(raw) if !raw.is_null() => raw,
                _ => {
                    return Err(ProviderError::Network(format!(
                        "document for {symbol} has no raw_data"
                    )));
                }
            }
        }
    };

    if !record.is_object() {
        return Err(ProviderError::Network(format!(
            "unexpected response shape for {symbol}"
        )));
    }
    Ok(RawStockRecord::new(symbol, record))
}
