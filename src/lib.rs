pub mod engine;
pub mod feed;
pub mod telemetry;
