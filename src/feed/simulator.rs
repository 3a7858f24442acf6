use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration};
use tracing::{debug, info};

use crate::engine::types::{LevelUpdate, Side};
use crate::feed::adapters::{FeedAdapter, FeedEvent};

/// Simulated market-data feed: a fixed ladder around a base price with
/// uniform random sizes, regenerated in full every tick. Stands in for a
/// real WebSocket feed so the rest of the pipeline can be exercised
/// without a network.
pub struct SimulatedFeed {
    pub symbol: String,
    /// Price levels generated per side each tick.
    pub levels: usize,
    pub base_price: f64,
    /// Gap between adjacent price levels.
    pub tick_size: f64,
    pub max_size: f64,
    pub cadence: Duration,
}

impl SimulatedFeed {
    pub fn new(symbol: &str, levels: usize, cadence: Duration) -> Self {
        Self {
            symbol: symbol.to_string(),
            levels,
            base_price: 1.1000,
            tick_size: 0.0001,
            max_size: 1_000_000.0,
            cadence,
        }
    }

    /// One full two-sided batch. Best bid sits at the base price, best
    /// ask one tick above it, so the book is never crossed.
    pub fn generate(&self) -> Vec<LevelUpdate> {
        let mut rng = rand::thread_rng();
        let mut updates = Vec::with_capacity(self.levels * 2);
        for i in 0..self.levels {
            let ask_price = self.base_price + (i + 1) as f64 * self.tick_size;
            let bid_price = self.base_price - i as f64 * self.tick_size;
            updates.push(LevelUpdate {
                side: Side::Ask,
                price: ask_price,
                size: rng.gen_range(0.0..self.max_size),
            });
            updates.push(LevelUpdate {
                side: Side::Bid,
                price: bid_price,
                size: rng.gen_range(0.0..self.max_size),
            });
        }
        updates
    }
}

#[async_trait::async_trait]
impl FeedAdapter for SimulatedFeed {
    async fn run(&self, tx: mpsc::Sender<FeedEvent>) {
        info!(symbol = %self.symbol, levels = self.levels, cadence_ms = self.cadence.as_millis() as u64, "starting simulated feed");
        let mut ticker = interval(self.cadence);
        loop {
            ticker.tick().await;
            let updates = self.generate();
            let ts_ms = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_millis() as u64);
            let event = FeedEvent::Batch {
                symbol: self.symbol.clone(),
                updates,
                ts_ms,
            };
            if tx.send(event).await.is_err() {
                debug!(symbol = %self.symbol, "feed receiver dropped, stopping");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_batch_is_valid_and_uncrossed() {
        let feed = SimulatedFeed::new("BTC/USD", 15, Duration::from_secs(1));
        let updates = feed.generate();
        assert_eq!(updates.len(), 30);

        let best_bid = updates
            .iter()
            .filter(|u| u.side == Side::Bid)
            .map(|u| u.price)
            .fold(f64::MIN, f64::max);
        let best_ask = updates
            .iter()
            .filter(|u| u.side == Side::Ask)
            .map(|u| u.price)
            .fold(f64::MAX, f64::min);
        assert!(best_ask > best_bid);

        for u in updates {
            assert!(u.price.is_finite() && u.price > 0.0);
            assert!(u.size.is_finite() && u.size >= 0.0);
        }
    }
}
