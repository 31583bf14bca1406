//! Offline comparison example
//!
//! Runs a comparison against a fixed in-memory provider, so no API key or
//! network access is needed.
//!
//! ```bash
//! cargo run -p finmetric-engine --example offline_comparison
//! ```

use async_trait::async_trait;
use finmetric_engine::{
    ComparisonEngine, EngineError, OutputFormat, ProviderError, RawStockRecord, RendererFactory,
    StockInfoProvider,
};
use serde_json::{Value, json};
use std::sync::Arc;

struct FixtureProvider;

fn fixture(symbol: &str) -> Option<Value> {
    let (name, price, cap, pe) = match symbol {
        "TATAMOTORS" => ("Tata Motors", "1218.95", 1_650_002.23, 22.97),
        "RELIANCE" => ("Reliance Industries", "230.35", 289_786.73, 5.39),
        _ => return None,
    };
    Some(json!({
        "companyName": name,
        "currentPrice": { "NSE": price },
        "companyProfile": {
            "peerCompanyList": [{ "marketCap": cap, "priceToEarningsValueRatio": pe }]
        }
    }))
}

#[async_trait]
impl StockInfoProvider for FixtureProvider {
    async fn fetch(&self, symbol: &str) -> Result<RawStockRecord, ProviderError> {
        fixture(symbol)
            .map(|payload| RawStockRecord::new(symbol, payload))
            .ok_or_else(|| ProviderError::not_found(symbol))
    }

    fn name(&self) -> &str {
        "fixture"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    finmetric_utils::init_tracing();

    let engine = ComparisonEngine::new(Arc::new(FixtureProvider));
    let renderer = RendererFactory::create(OutputFormat::Table);

    let result = engine.compare(&["TATAMOTORS", "RELIANCE"]).await?;
    println!("{}", renderer.render_comparison(&result));

    // An unknown symbol fails the whole comparison
    if let Err(EngineError::AggregateFetch(err)) =
        engine.compare(&["TATAMOTORS", "UNKNOWN"]).await
    {
        println!("{}", renderer.render_fetch_errors(&err));
    }

    Ok(())
}
