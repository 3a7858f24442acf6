// Engine module entrypoint
pub mod config; // per-book levels/precision settings + validation
pub mod depth;  // the depth aggregator core
pub mod types;  // level/snapshot/error types shared with consumers
