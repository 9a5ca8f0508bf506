//! Rolling aggregation of ingested records.

mod collector;

pub use collector::{StatsCollector, WINDOW_MS};
