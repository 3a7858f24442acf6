// Shared trait + event for market data feeds

use crate::engine::types::LevelUpdate;

pub enum FeedEvent {
    // One atomic batch of raw level upserts for a symbol. Entries apply
    // in order; a later entry for the same (side, price) wins.
    Batch {
        symbol: String,
        updates: Vec<LevelUpdate>,
        ts_ms: u64,
    },
}

#[async_trait::async_trait]
pub trait FeedAdapter {
    // Push events into the router's channel until the receiver goes away.
    async fn run(&self, tx: tokio::sync::mpsc::Sender<FeedEvent>);
}
