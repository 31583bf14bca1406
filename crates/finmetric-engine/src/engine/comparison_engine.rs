//! Fetch, extract and align several stocks in one call

use crate::align::{ComparisonAligner, DEFAULT_MIN_ENTITIES};
use crate::api::IndianStockClient;
use crate::config::EngineConfig;
use crate::error::{AggregateFetchError, EngineError, FetchFailure, Result};
use crate::extract::MetricExtractor;
use finmetric_core::{ComparisonResult, StockInfoProvider, StockMetricSet, StockReport};
use std::sync::Arc;
use tracing::{info, warn};

/// Entry point for multi-stock comparisons
///
/// Holds no per-call state; concurrent calls never interact.
#[derive(Clone)]
pub struct ComparisonEngine {
    provider: Arc<dyn StockInfoProvider>,
    extractor: MetricExtractor,
    aligner: ComparisonAligner,
}

impl ComparisonEngine {
    /// Create an engine with default extraction and alignment settings
    pub fn new(provider: Arc<dyn StockInfoProvider>) -> Self {
        Self {
            provider,
            extractor: MetricExtractor::new(),
            aligner: ComparisonAligner::new(),
        }
    }

    /// Create an engine over `provider`, honoring `config.min_symbols`
    ///
    /// A minimum below two is raised to two; a comparison always needs a pair.
    pub fn with_config(provider: Arc<dyn StockInfoProvider>, config: &EngineConfig) -> Self {
        Self {
            aligner: ComparisonAligner::new()
                .with_min_count(config.min_symbols.max(DEFAULT_MIN_ENTITIES)),
            ..Self::new(provider)
        }
    }

    /// Create an engine backed by the HTTP provider described by `config`
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let provider = Arc::new(IndianStockClient::new(config)?);
        Ok(Self::with_config(provider, config))
    }

    pub fn extractor(&self) -> &MetricExtractor {
        &self.extractor
    }

    pub fn aligner(&self) -> &ComparisonAligner {
        &self.aligner
    }

    /// Compare `symbols` on the canonical metrics
    ///
    /// All fetches run concurrently and every one is awaited, even after a
    /// sibling has failed. Any failure fails the whole call with an
    /// [`AggregateFetchError`] naming each failed symbol; partial results
    /// are discarded.
    pub async fn compare<S: AsRef<str>>(&self, symbols: &[S]) -> Result<ComparisonResult> {
        let required = self.aligner.min_count();
        if symbols.len() < required {
            return Err(EngineError::Validation(format!(
                "at least {required} symbols are required, got {}",
                symbols.len()
            )));
        }

        let sets = self.fetch_all(symbols).await?;
        let result = self.aligner.align(&sets)?;

        info!(
            series = result.series.len(),
            missing = result.missing_count(),
            "comparison complete"
        );
        Ok(result)
    }

    /// Fetch and extract a single symbol for the detail view
    pub async fn inspect(&self, symbol: &str) -> Result<StockReport> {
        info!(symbol, provider = self.provider.name(), "inspecting stock");
        let raw = self.provider.fetch(symbol).await?;
        Ok(self.extractor.extract_report(&raw))
    }

    /// Compare a stock's listed peers with each other
    pub async fn compare_peers(&self, symbol: &str) -> Result<ComparisonResult> {
        let report = self.inspect(symbol).await?;
        self.peer_comparison(&report)
    }

    /// Peer comparison for a report that was already fetched
    pub fn peer_comparison(&self, report: &StockReport) -> Result<ComparisonResult> {
        self.aligner.align_peers(&report.metrics)
    }

    async fn fetch_all<S: AsRef<str>>(&self, symbols: &[S]) -> Result<Vec<StockMetricSet>> {
        info!(
            count = symbols.len(),
            provider = self.provider.name(),
            "fetching stocks for comparison"
        );

        // Each record is extracted as soon as its fetch settles
        let fetches = symbols.iter().map(|symbol| {
            let symbol = symbol.as_ref();
            async move {
                let outcome = self
                    .provider
                    .fetch(symbol)
                    .await
                    .map(|raw| self.extractor.extract(&raw));
                (symbol, outcome)
            }
        });
        let outcomes = futures::future::join_all(fetches).await;

        let mut sets = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(set) => sets.push(set),
                Err(cause) => {
                    warn!(symbol, error = %cause, "fetch failed");
                    failures.push(FetchFailure {
                        symbol: symbol.to_string(),
                        cause,
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(sets)
        } else {
            Err(AggregateFetchError { failures }.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use finmetric_core::{Metric, ProviderError, ProviderErrorKind, RawStockRecord};
    use mockall::mock;
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Barrier;
    use tokio_test::{assert_err, assert_ok};

    mock! {
        pub Provider {}

        #[async_trait]
        impl StockInfoProvider for Provider {
            async fn fetch(&self, symbol: &str) -> finmetric_core::Result<RawStockRecord>;
        }
    }

    fn payload(name: &str, nse: &str, market_cap: &str, pe: &str) -> Value {
        json!({
            "companyName": name,
            "currentPrice": { "NSE": nse },
            "companyProfile": { "marketCap": market_cap, "peRatio": pe }
        })
    }

    fn canned(symbol: &str) -> finmetric_core::Result<RawStockRecord> {
        match symbol {
            "TATAMOTORS" => Ok(RawStockRecord::new(
                symbol,
                payload("Tata Motors", "230.35", "289786.73", "5.39"),
            )),
            "RELIANCE" => Ok(RawStockRecord::new(
                symbol,
                payload("Reliance Industries", "1218.95", "1650002.23", "22.97"),
            )),
            "NOCAP" => Ok(RawStockRecord::new(
                symbol,
                json!({ "companyName": "No Cap Ltd", "currentPrice": { "BSE": "10" } }),
            )),
            "" => Err(ProviderError::Validation("symbol must not be empty".into())),
            "OFFLINE" => Err(ProviderError::Network("connection refused".into())),
            other => Err(ProviderError::not_found(other)),
        }
    }

    fn engine_with_canned(expected_calls: usize) -> ComparisonEngine {
        let mut provider = MockProvider::new();
        provider
            .expect_fetch()
            .times(expected_calls)
            .returning(canned);
        ComparisonEngine::new(Arc::new(provider))
    }

    #[tokio::test]
    async fn test_compare_two_symbols() {
        let engine = engine_with_canned(2);

        let result = assert_ok!(engine.compare(&["TATAMOTORS", "RELIANCE"]).await);

        assert_eq!(result.labels, vec!["Current Price", "Market Cap", "P/E Ratio"]);
        assert_eq!(result.series.len(), 2);
        assert!(result.series.iter().all(|s| s.values.len() == 3));
        assert_eq!(result.series[0].name, "Tata Motors");
        assert_eq!(result.series[1].name, "Reliance Industries");
        assert_eq!(result.series[1].values, vec![1218.95, 1_650_002.23, 22.97]);
        assert!(result.is_complete());
    }

    #[tokio::test]
    async fn test_missing_metrics_are_masked() {
        let engine = engine_with_canned(2);

        let result = assert_ok!(engine.compare(&["NOCAP", "RELIANCE"]).await);

        assert_eq!(result.series[0].values, vec![10.0, 0.0, 0.0]);
        assert_eq!(result.series[0].missing_mask, vec![false, true, true]);
        assert_eq!(result.column(Metric::MarketCap)[0], ("No Cap Ltd", None));
    }

    #[tokio::test]
    async fn test_single_failure_fails_whole_comparison() {
        let engine = engine_with_canned(2);

        let err = assert_err!(engine.compare(&["TATAMOTORS", "BADSYMBOL"]).await);

        let aggregate = match err {
            EngineError::AggregateFetch(aggregate) => aggregate,
            other => panic!("Expected AggregateFetch, got {other:?}"),
        };
        assert_eq!(aggregate.failures.len(), 1);
        assert_eq!(aggregate.failures[0].symbol, "BADSYMBOL");
        assert_eq!(aggregate.failures[0].kind(), ProviderErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_every_failure_is_reported_in_order() {
        let engine = engine_with_canned(4);

        let err = assert_err!(
            engine
                .compare(&["OFFLINE", "RELIANCE", "", "BADSYMBOL"])
                .await
        );

        let aggregate = match err {
            EngineError::AggregateFetch(aggregate) => aggregate,
            other => panic!("Expected AggregateFetch, got {other:?}"),
        };
        let kinds: Vec<_> = aggregate
            .failures
            .iter()
            .map(|f| (f.symbol.as_str(), f.kind()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("OFFLINE", ProviderErrorKind::Network),
                ("", ProviderErrorKind::Validation),
                ("BADSYMBOL", ProviderErrorKind::NotFound),
            ]
        );
    }

    #[tokio::test]
    async fn test_single_symbol_rejected_before_fetch() {
        // No fetch expectations: any call would panic the mock
        let engine = engine_with_canned(0);

        let err = assert_err!(engine.compare(&["ONLY"]).await);
        assert!(matches!(err, EngineError::Validation(_)));

        let none: [&str; 0] = [];
        assert!(matches!(
            engine.compare(&none).await,
            Err(EngineError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_config_min_symbols() {
        let mut provider = MockProvider::new();
        provider.expect_fetch().times(0).returning(canned);
        let config = EngineConfig {
            min_symbols: 3,
            ..Default::default()
        };
        let engine = ComparisonEngine::with_config(Arc::new(provider), &config);

        let err = assert_err!(engine.compare(&["TATAMOTORS", "RELIANCE"]).await);
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn test_config_min_symbols_never_below_two() {
        for min_symbols in [0, 1] {
            // No fetch may happen: the symbol count is rejected up front
            let mut provider = MockProvider::new();
            provider.expect_fetch().times(0).returning(canned);
            let config = EngineConfig {
                min_symbols,
                ..Default::default()
            };
            let engine = ComparisonEngine::with_config(Arc::new(provider), &config);
            assert_eq!(engine.aligner().min_count(), 2);

            let err = assert_err!(engine.compare(&["ONLY"]).await);
            assert!(matches!(err, EngineError::Validation(_)));

            let none: [&str; 0] = [];
            let err = assert_err!(engine.compare(&none).await);
            assert!(matches!(err, EngineError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_inspect() {
        let engine = engine_with_canned(2);

        let report = assert_ok!(engine.inspect("TATAMOTORS").await);
        assert_eq!(report.symbol, "TATAMOTORS");
        assert_eq!(report.metrics.company_name, "Tata Motors");

        let err = assert_err!(engine.inspect("BADSYMBOL").await);
        assert!(matches!(err, EngineError::Provider(ProviderError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_compare_peers() {
        let mut provider = MockProvider::new();
        provider.expect_fetch().times(1).returning(|symbol| {
            Ok(RawStockRecord::new(
                symbol,
                json!({
                    "companyProfile": {
                        "peerCompanyList": [
                            { "companyName": "TCS", "price": "3500", "marketCap": "1200000",
                              "priceToEarningsValueRatio": "30.2" },
                            { "companyName": "Infosys", "price": "1500" }
                        ]
                    }
                }),
            ))
        });
        let engine = ComparisonEngine::new(Arc::new(provider));

        let result = assert_ok!(engine.compare_peers("WIPRO").await);
        assert_eq!(result.series.len(), 2);
        assert_eq!(result.series[1].missing_mask, vec![false, true, true]);
    }

    #[tokio::test]
    async fn test_peer_comparison_reuses_report() {
        // TATAMOTORS lists no peers; only the one inspect fetch is allowed
        let engine = engine_with_canned(1);

        let report = assert_ok!(engine.inspect("TATAMOTORS").await);
        let err = assert_err!(engine.peer_comparison(&report));
        assert!(matches!(
            err,
            EngineError::InsufficientEntities {
                required: 2,
                actual: 0
            }
        ));
    }

    /// Provider with per-symbol latency that counts settled fetches
    struct ScriptedProvider {
        delays: HashMap<&'static str, Duration>,
        settled: AtomicUsize,
        barrier: Option<Barrier>,
    }

    #[async_trait]
    impl StockInfoProvider for ScriptedProvider {
        async fn fetch(&self, symbol: &str) -> finmetric_core::Result<RawStockRecord> {
            if let Some(barrier) = &self.barrier {
                barrier.wait().await;
            }
            if let Some(delay) = self.delays.get(symbol) {
                tokio::time::sleep(*delay).await;
            }
            self.settled.fetch_add(1, Ordering::SeqCst);
            canned(symbol)
        }
    }

    #[tokio::test]
    async fn test_failure_does_not_cancel_siblings() {
        let provider = Arc::new(ScriptedProvider {
            delays: HashMap::from([("TATAMOTORS", Duration::from_millis(50))]),
            settled: AtomicUsize::new(0),
            barrier: None,
        });
        let engine = ComparisonEngine::new(provider.clone());

        let err = assert_err!(engine.compare(&["TATAMOTORS", "BADSYMBOL"]).await);

        // The slow successful fetch was awaited even though BADSYMBOL failed first
        assert_eq!(provider.settled.load(Ordering::SeqCst), 2);
        let aggregate = match err {
            EngineError::AggregateFetch(aggregate) => aggregate,
            other => panic!("Expected AggregateFetch, got {other:?}"),
        };
        assert_eq!(aggregate.symbols().collect::<Vec<_>>(), vec!["BADSYMBOL"]);
    }

    #[tokio::test]
    async fn test_fetches_run_concurrently() {
        // Every fetch waits for all of its siblings; sequential fetching would never finish
        let symbols = ["TATAMOTORS", "RELIANCE", "NOCAP"];
        let provider = Arc::new(ScriptedProvider {
            delays: HashMap::new(),
            settled: AtomicUsize::new(0),
            barrier: Some(Barrier::new(symbols.len())),
        });
        let engine = ComparisonEngine::new(provider);

        let result = tokio::time::timeout(Duration::from_secs(5), engine.compare(&symbols))
            .await
            .expect("fetches did not run concurrently");
        let result = assert_ok!(result);

        let names: Vec<_> = result.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Tata Motors", "Reliance Industries", "No Cap Ltd"]);
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let engine = engine_with_canned(4);

        let (ok, failed) = tokio::join!(
            engine.compare(&["TATAMOTORS", "RELIANCE"]),
            engine.compare(&["RELIANCE", "BADSYMBOL"]),
        );

        assert_eq!(assert_ok!(ok).series.len(), 2);
        assert!(matches!(failed, Err(EngineError::AggregateFetch(_))));
    }
}
