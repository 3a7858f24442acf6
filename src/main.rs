use std::env;

use clap::Parser;
use tokio::time::Duration;

use depthbook::engine::config::{BookConfig, DEFAULT_LEVELS, DEFAULT_PRECISION};
use depthbook::feed::router;
use depthbook::telemetry;

/// Order-book depth demo: simulated feed -> aggregator -> console ladder.
#[derive(Parser, Debug)]
#[command(name = "depthbook")]
struct Args {
    /// Book symbol; falls back to DEPTHBOOK_SYMBOL, then BTC/USD
    #[arg(long)]
    symbol: Option<String>,

    /// Rows retained per side
    #[arg(long, default_value_t = DEFAULT_LEVELS)]
    levels: usize,

    /// Decimal places for displayed prices
    #[arg(long, default_value_t = DEFAULT_PRECISION)]
    precision: u32,

    /// Refresh cadence in milliseconds
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Emit each snapshot as one JSON line instead of the ladder view
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok(); // load .env
    telemetry::init_tracing("info");
    telemetry::init_metrics();

    let args = Args::parse();
    let symbol = args
        .symbol
        .or_else(|| env::var("DEPTHBOOK_SYMBOL").ok())
        .unwrap_or_else(|| "BTC/USD".to_string());

    let config = BookConfig {
        symbol,
        levels: args.levels,
        precision: args.precision,
    };

    router::run_demo(config, Duration::from_millis(args.interval_ms), args.json).await
}
