// Feed module entrypoint
pub mod adapters;  // shared event + trait for market-data feeds
pub mod simulator; // random-walk demo feed (no network)
pub mod router;    // wires a feed into an aggregator on a fixed cadence
