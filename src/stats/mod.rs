//! Relay statistics and counters

pub mod metrics;

pub use metrics::{RelayStats, StatsSnapshot};
