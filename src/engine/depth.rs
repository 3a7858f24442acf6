use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use ordered_float::OrderedFloat;
use tracing::{debug, instrument, trace, warn};

use crate::engine::config::{BookConfig, ConfigError};
use crate::engine::types::{
    BatchResult, BookError, BookSnapshot, LevelUpdate, PriceLevel, RejectedUpdate, Side,
};

/// Depth aggregator for a single symbol.
///
/// Owns one raw price -> size map per side (full-precision keys, so two
/// prices that only differ past the display precision never collide) and
/// the most recently published snapshot. Single writer by design; callers
/// that share an instance across tasks must serialize access themselves.
#[derive(Debug)]
pub struct DepthAggregator {
    config: BookConfig,
    bids: BTreeMap<OrderedFloat<f64>, f64>,
    asks: BTreeMap<OrderedFloat<f64>, f64>,
    last: BookSnapshot,
}

impl DepthAggregator {
    /// Build with default levels/precision. Defaults always validate.
    #[instrument]
    pub fn new(symbol: &str) -> Self {
        let config = BookConfig::new(symbol);
        debug!(levels = config.levels, precision = config.precision, "initialized depth aggregator");
        let last = BookSnapshot::empty(&config.symbol);
        Self { config, bids: BTreeMap::new(), asks: BTreeMap::new(), last }
    }

    pub fn with_config(config: BookConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let last = BookSnapshot::empty(&config.symbol);
        Ok(Self { config, bids: BTreeMap::new(), asks: BTreeMap::new(), last })
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    /// Change levels/precision for subsequent passes. Validated the same
    /// way as construction; raw state and the published snapshot are
    /// untouched on rejection.
    pub fn reconfigure(&mut self, levels: usize, precision: u32) -> Result<(), ConfigError> {
        let candidate = BookConfig {
            symbol: self.config.symbol.clone(),
            levels,
            precision,
        };
        candidate.validate()?;
        self.config = candidate;
        Ok(())
    }

    /// Upsert one raw level. Size 0 deletes the level from that side.
    /// Only mutates raw state; the published snapshot is untouched until
    /// the next `aggregate` pass.
    pub fn apply_update(&mut self, side: Side, price: f64, size: f64) -> Result<(), BookError> {
        Self::validate_update(price, size)?;
        let book = match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        };
        if size == 0.0 {
            if book.remove(&OrderedFloat(price)).is_some() {
                trace!(?side, price, "removed level");
            }
        } else {
            book.insert(OrderedFloat(price), size);
            trace!(?side, price, size, "upserted level");
        }
        Ok(())
    }

    /// Apply a batch in order; a later entry for the same (side, price)
    /// overwrites an earlier one. Invalid entries are rejected one by one
    /// and reported back, valid entries still apply. Nothing is published
    /// mid-batch since snapshots only come from `aggregate`.
    #[instrument(level = "debug", skip(self, updates), fields(symbol = %self.config.symbol, count = updates.len()))]
    pub fn apply_batch(&mut self, updates: &[LevelUpdate]) -> BatchResult {
        let mut result = BatchResult::default();
        for (index, update) in updates.iter().enumerate() {
            match self.apply_update(update.side, update.price, update.size) {
                Ok(()) => result.applied += 1,
                Err(reason) => {
                    warn!(index, ?update, error = %reason, "rejected level update");
                    result.rejected.push(RejectedUpdate { index, update: *update, reason });
                }
            }
        }
        debug!(applied = result.applied, rejected = result.rejected.len(), "applied batch");
        result
    }

    /// One aggregation pass over the current raw state: ordered walk per
    /// side, truncate to `levels`, running cumulative sums, depth percent
    /// against the deeper side's total, spread from the current best bid
    /// and ask, display prices rounded to `precision`. Pure over the raw
    /// maps; never mutates them. Total for any valid state including the
    /// empty book.
    #[instrument(level = "debug", skip(self), fields(symbol = %self.config.symbol))]
    pub fn aggregate(&mut self) -> &BookSnapshot {
        let levels = self.config.levels;
        // Asks walk up from the lowest price, bids walk down from the highest.
        let mut asks = Self::rank(self.asks.iter().map(|(p, s)| (p.0, *s)), levels);
        let mut bids = Self::rank(self.bids.iter().rev().map(|(p, s)| (p.0, *s)), levels);

        let ask_total = asks.last().map_or(0.0, |l| l.cumulative_size);
        let bid_total = bids.last().map_or(0.0, |l| l.cumulative_size);
        let max_total = f64::max(ask_total, bid_total);
        Self::fill_depth_percent(&mut asks, max_total);
        Self::fill_depth_percent(&mut bids, max_total);

        // Spread comes from the full-precision best prices of this pass,
        // never from a previously published snapshot.
        let (spread, spread_percent) = match (bids.first(), asks.first()) {
            (Some(bid), Some(ask)) => {
                let spread = ask.price - bid.price;
                (Some(spread), Some(spread / ask.price * 100.0))
            }
            _ => (None, None),
        };

        // Display-only rounding, applied after all math on raw prices.
        for level in asks.iter_mut().chain(bids.iter_mut()) {
            level.price = round_to(level.price, self.config.precision);
        }

        debug!(
            bid_levels = bids.len(),
            ask_levels = asks.len(),
            max_total,
            ?spread,
            "aggregated book"
        );

        self.last = BookSnapshot {
            symbol: self.config.symbol.clone(),
            bids,
            asks,
            spread,
            spread_percent,
            as_of_ms: now_ms(),
        };
        &self.last
    }

    /// The most recently aggregated snapshot. Empty before the first pass.
    pub fn snapshot(&self) -> &BookSnapshot {
        &self.last
    }

    /// Clear all raw state on both sides; the next `aggregate` yields
    /// empty ladders.
    #[instrument(level = "debug", skip(self), fields(symbol = %self.config.symbol))]
    pub fn reset(&mut self) {
        self.bids.clear();
        self.asks.clear();
        debug!("cleared raw book state");
    }

    /// True when no raw level exists on either side.
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Raw (price, size) at the highest bid, pre-aggregation.
    pub fn best_bid(&self) -> Option<(f64, f64)> {
        self.bids.iter().next_back().map(|(p, s)| (p.0, *s))
    }

    /// Raw (price, size) at the lowest ask, pre-aggregation.
    pub fn best_ask(&self) -> Option<(f64, f64)> {
        self.asks.iter().next().map(|(p, s)| (p.0, *s))
    }

    fn validate_update(price: f64, size: f64) -> Result<(), BookError> {
        if !price.is_finite() {
            return Err(BookError::NonFinitePrice { price });
        }
        if price <= 0.0 {
            return Err(BookError::NonPositivePrice { price });
        }
        if !size.is_finite() {
            return Err(BookError::NonFiniteSize { size });
        }
        if size < 0.0 {
            return Err(BookError::NegativeSize { size });
        }
        Ok(())
    }

    fn rank(side: impl Iterator<Item = (f64, f64)>, levels: usize) -> Vec<PriceLevel> {
        let mut out = Vec::with_capacity(levels);
        let mut total = 0.0;
        for (price, size) in side.take(levels) {
            total += size;
            out.push(PriceLevel {
                price,
                size,
                cumulative_size: total,
                depth_percent: 0.0,
            });
        }
        out
    }

    fn fill_depth_percent(side: &mut [PriceLevel], max_total: f64) {
        for level in side {
            level.depth_percent = if max_total == 0.0 {
                // Guard 0/0 for the degenerate all-zero book.
                0.0
            } else {
                (level.cumulative_size / max_total * 100.0).clamp(0.0, 100.0)
            };
        }
    }
}

fn round_to(value: f64, digits: u32) -> f64 {
    let scale = 10f64.powi(digits as i32);
    (value * scale).round() / scale
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}
