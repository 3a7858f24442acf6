use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

// Raw upsert as delivered by a feed: size 0 means "delete this level"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelUpdate {
    pub side: Side,
    pub price: f64,
    pub size: f64,
}

/// One render-ready row of a book side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub size: f64,
    /// Running total of `size` from the best price out to this level.
    pub cumulative_size: f64,
    /// `cumulative_size` normalized against the deeper side's final total, 0..=100.
    pub depth_percent: f64,
}

/// Immutable result of one aggregation pass. Bids descend, asks ascend,
/// each capped to the configured level count, best of book first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub symbol: String,
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
    /// `best_ask - best_bid`; None unless both sides are non-empty.
    pub spread: Option<f64>,
    /// `spread / best_ask * 100`; None unless both sides are non-empty.
    pub spread_percent: Option<f64>,
    pub as_of_ms: u64,
}

impl BookSnapshot {
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bids: Vec::new(),
            asks: Vec::new(),
            spread: None,
            spread_percent: None,
            as_of_ms: 0,
        }
    }

    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    /// Field-by-field equality ignoring the pass timestamp.
    pub fn same_view(&self, other: &BookSnapshot) -> bool {
        self.symbol == other.symbol
            && self.bids == other.bids
            && self.asks == other.asks
            && self.spread == other.spread
            && self.spread_percent == other.spread_percent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BookError {
    #[error("price is not finite: {price}")]
    NonFinitePrice { price: f64 },
    #[error("price must be positive: {price}")]
    NonPositivePrice { price: f64 },
    #[error("size is not finite: {size}")]
    NonFiniteSize { size: f64 },
    #[error("size must be non-negative: {size}")]
    NegativeSize { size: f64 },
}

/// A batch entry the engine refused to apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RejectedUpdate {
    pub index: usize,
    pub update: LevelUpdate,
    pub reason: BookError,
}

/// Outcome of `apply_batch`: valid entries were applied in order,
/// invalid ones are reported here instead of corrupting the book.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchResult {
    pub applied: usize,
    pub rejected: Vec<RejectedUpdate>,
}

impl BatchResult {
    pub fn all_applied(&self) -> bool {
        self.rejected.is_empty()
    }
}
