// Router orchestrates feed adapter + aggregator
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::{info, warn};

use crate::engine::config::BookConfig;
use crate::engine::depth::DepthAggregator;
use crate::engine::types::BookSnapshot;
use crate::feed::adapters::{FeedAdapter, FeedEvent};
use crate::feed::simulator::SimulatedFeed;
use crate::telemetry;

/// Drive one book instance from the simulated feed and print a fresh
/// snapshot on every refresh tick. The aggregator itself is single
/// writer; the mutex here is the external serialization point between
/// the batch-apply task and the aggregation task.
pub async fn run_demo(config: BookConfig, refresh: Duration, json: bool) -> anyhow::Result<()> {
    let symbol = config.symbol.clone();
    let levels = config.levels;
    let agg = Arc::new(Mutex::new(DepthAggregator::with_config(config)?));

    let feed = SimulatedFeed::new(&symbol, levels, refresh);
    let (tx, mut rx) = mpsc::channel::<FeedEvent>(1000);

    let feed_task = tokio::spawn(async move {
        feed.run(tx).await;
    });

    let apply_agg = Arc::clone(&agg);
    let apply_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                FeedEvent::Batch { symbol, updates, ts_ms } => {
                    let mut agg = apply_agg.lock().unwrap();
                    let result = agg.apply_batch(&updates);
                    if !result.all_applied() {
                        warn!(
                            symbol = %symbol,
                            ts_ms,
                            rejected = result.rejected.len(),
                            "dropped invalid updates from feed batch"
                        );
                    }
                }
            }
        }
    });

    let print_agg = Arc::clone(&agg);
    let print_task = tokio::spawn(async move {
        let mut ticker = interval(refresh);
        loop {
            ticker.tick().await;
            let snap = {
                let mut agg = print_agg.lock().unwrap();
                agg.aggregate().clone()
            };
            if let Some(spread) = snap.spread {
                telemetry::record_spread(&snap.symbol, spread);
            }
            if json {
                match serde_json::to_string(&snap) {
                    Ok(line) => println!("{}", line),
                    Err(e) => warn!(error = %e, "failed to serialize snapshot"),
                }
            } else {
                print_ladder(&snap);
            }
        }
    });

    info!(symbol = %symbol, "depth demo running");
    tokio::select! {
        _ = feed_task => info!("feed task completed"),
        _ = apply_task => info!("apply task completed"),
        _ = print_task => info!("print task completed"),
    }
    Ok(())
}

/// Console rendering of one snapshot: asks worst-first above the spread
/// line, bids best-first below it, mirroring the usual ladder layout.
pub fn print_ladder(snap: &BookSnapshot) {
    println!("\n=== {} @ {} ===", snap.symbol, snap.as_of_ms);
    println!("{:>14} {:>12} {:>12} {:>7}", "Price", "Size", "Total", "Depth");
    for ask in snap.asks.iter().rev() {
        println!(
            "{:>14} {:>12} {:>12} {:>6.2}%",
            format!("{}", ask.price),
            format_size(ask.size),
            format_size(ask.cumulative_size),
            ask.depth_percent
        );
    }
    match (snap.spread, snap.spread_percent) {
        (Some(spread), Some(pct)) => println!("-- spread {:.6} ({:.3}%) --", spread, pct),
        _ => println!("-- spread n/a --"),
    }
    for bid in &snap.bids {
        println!(
            "{:>14} {:>12} {:>12} {:>6.2}%",
            format!("{}", bid.price),
            format_size(bid.size),
            format_size(bid.cumulative_size),
            bid.depth_percent
        );
    }
}

/// Compact size formatting: 1.2M / 34.50K / 120.00.
pub fn format_size(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.2}K", value / 1_000.0)
    } else {
        format!("{:.2}", value)
    }
}
