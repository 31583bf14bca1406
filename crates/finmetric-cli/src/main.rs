//! Command-line interface for finmetric

use clap::{Parser, Subcommand};
use finmetric_engine::{
    ComparisonEngine, EngineConfig, EngineError, OutputFormat, ProviderEndpoint, RendererFactory,
};
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "finmetric")]
#[command(about = "Compare Indian stocks on price, market cap and P/E", long_about = None)]
struct Args {
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Provider base URL (overrides FINMETRIC_PROVIDER_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Provider endpoint shape: direct or gateway (overrides FINMETRIC_PROVIDER_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare two or more symbols side by side
    Compare {
        /// Ticker symbols, e.g. TATAMOTORS RELIANCE
        #[arg(required = true, num_args = 1..)]
        symbols: Vec<String>,
    },
    /// Show the detail view for one symbol
    Show {
        /// Ticker symbol
        symbol: String,

        /// Also compare the peers listed for the symbol
        #[arg(long)]
        peers: bool,
    },
}

impl Args {
    fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }

    fn config(&self) -> anyhow::Result<EngineConfig> {
        let mut builder = EngineConfig::builder();
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }
        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint(endpoint.parse::<ProviderEndpoint>()?);
        }
        Ok(builder.with_env().build()?)
    }
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    finmetric_utils::load_env_file();
    finmetric_utils::init_tracing_with("warn,finmetric_engine=info");

    let args = Args::parse();
    let config = args.config()?;
    let engine = ComparisonEngine::from_config(&config)?;
    let renderer = RendererFactory::create(args.output_format());

    info!(endpoint = ?config.endpoint, base_url = %config.base_url, "starting finmetric");

    match args.command {
        Command::Compare { symbols } => {
            let symbols: Vec<String> = symbols.iter().map(|s| normalize(s)).collect();
            match engine.compare(&symbols).await {
                Ok(result) => println!("{}", renderer.render_comparison(&result)),
                Err(EngineError::AggregateFetch(err)) => {
                    eprintln!("{}", renderer.render_fetch_errors(&err));
                    return Ok(ExitCode::FAILURE);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Show { symbol, peers } => {
            let report = engine.inspect(&normalize(&symbol)).await?;
            println!("{}", renderer.render_report(&report));

            if peers {
                match engine.peer_comparison(&report) {
                    Ok(result) => println!("{}", renderer.render_comparison(&result)),
                    Err(e) => warn!("peer comparison unavailable: {e}"),
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
