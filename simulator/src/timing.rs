//! Timing for the simulator.
//!
//! The firmware samples every 10 s and averages 15 min into one long entry. Here
//! everything runs faster so both graphs fill within minutes.

use thermograph_common::config::{AggregatorConfig, DashboardConfig};

/// One simulated sample per second.
pub const SAMPLING_PERIOD_MS: u32 = 1_000;

/// Short entries averaged into one long entry.
pub const LONG_WINDOW: usize = 10;

/// Window redraw and event polling granularity.
pub const SLICE_MS: u32 = 20;

/// Save the history file every this many cycles.
pub const PERSIST_EVERY: u32 = 15;

pub const fn simulator_config() -> DashboardConfig {
    let mut config = DashboardConfig::new()
        .with_sampling_period(SAMPLING_PERIOD_MS)
        .with_aggregator(AggregatorConfig::new().with_long_window(LONG_WINDOW))
        .with_persist_every(PERSIST_EVERY);
    config.slice_ms = SLICE_MS;
    config.sensor_cooldown_ms = SAMPLING_PERIOD_MS;
    config
}
