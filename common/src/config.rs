//! Display, sampling and persistence configuration.
//!
//! Compile-time constants describe the panel and the defaults; [`DashboardConfig`]
//! and [`AggregatorConfig`] carry the values a build may tune at runtime.
//!
//! # Open parameters
//!
//! Two knobs are configuration rather than fixed behaviour:
//! - [`ShortAveraging`]: whether one short-buffer entry is a single raw reading or
//!   the mean of two consecutive readings.
//! - `long_window` (K): how many short-buffer entries are averaged into one
//!   long-buffer entry. [`samples_per_interval`] derives it from a wall-clock span.

// =============================================================================
// Display Configuration
// =============================================================================

/// Panel width in pixels (landscape, 160x128 ST7789 module).
pub const SCREEN_WIDTH: u16 = 160;

/// Panel height in pixels.
pub const SCREEN_HEIGHT: u16 = 128;

/// Maximum samples kept per history buffer: one bar per pixel column.
pub const HISTORY_CAPACITY: usize = SCREEN_WIDTH as usize;

/// Border around the banner screen (10% of the width).
pub const BORDER_WIDTH: i32 = SCREEN_WIDTH as i32 / 10;

// =============================================================================
// Sampling Configuration
// =============================================================================

/// Default time between sensor reads. Better if it divides 60 s.
pub const SAMPLING_PERIOD_MS: u32 = 10_000;

/// Pacing granularity while waiting for the next cycle.
pub const SLEEP_SLICE_MS: u32 = 100;

/// Wait before retrying after a failed sensor read.
pub const SENSOR_COOLDOWN_MS: u32 = 2_000;

/// Persist both buffers every this many completed cycles.
pub const PERSIST_EVERY_CYCLES: u32 = 10;

/// The banner splash is redrawn with probability 1 / `SPLASH_ONE_IN` per cycle.
pub const SPLASH_ONE_IN: u32 = 32;

/// Span covered by one long-buffer entry by default.
pub const LONG_INTERVAL_SECS: u32 = 15 * 60;

const _: () = assert!(SLEEP_SLICE_MS <= SAMPLING_PERIOD_MS);
const _: () = assert!(HISTORY_CAPACITY > 0);

/// Number of samples taken at `period_ms` cadence within `interval_secs`.
///
/// Returns at least 1 so a misconfigured interval never disables aggregation silently.
pub const fn samples_per_interval(
    interval_secs: u32,
    period_ms: u32,
) -> usize {
    if period_ms == 0 {
        return 1;
    }
    let samples = (interval_secs as u64 * 1000) / period_ms as u64;
    if samples == 0 { 1 } else { samples as usize }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// How many raw readings make up one short-buffer entry.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShortAveraging {
    /// Every raw reading is appended as-is.
    #[default]
    Single,
    /// Every second raw reading appends the mean of the pair.
    Pair,
}

/// Parameters of the two-resolution sampling pipeline.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AggregatorConfig {
    /// Raw readings per short-buffer entry.
    pub averaging: ShortAveraging,
    /// Short-buffer entries per long-buffer entry (K). Zero disables the long buffer.
    pub long_window: usize,
}

impl AggregatorConfig {
    /// Quarter-hour long resolution at the default sampling period.
    pub const fn new() -> Self {
        Self {
            averaging: ShortAveraging::Single,
            long_window: samples_per_interval(LONG_INTERVAL_SECS, SAMPLING_PERIOD_MS),
        }
    }

    #[must_use]
    pub const fn with_averaging(
        mut self,
        averaging: ShortAveraging,
    ) -> Self {
        self.averaging = averaging;
        self
    }

    #[must_use]
    pub const fn with_long_window(
        mut self,
        long_window: usize,
    ) -> Self {
        self.long_window = long_window;
        self
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self { Self::new() }
}

/// Timing and policy knobs of the dashboard loop.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DashboardConfig {
    /// Target duration of one cycle, measured from the start of the sensor read.
    pub sampling_period_ms: u32,
    /// Pacing sleep granularity.
    pub slice_ms: u32,
    /// Wait after a failed sensor read.
    pub sensor_cooldown_ms: u32,
    /// Persist every N completed cycles. Zero disables periodic saves.
    pub persist_every: u32,
    /// Splash probability denominator. Zero disables the splash.
    pub splash_one_in: u32,
    /// Sampling pipeline parameters.
    pub aggregator: AggregatorConfig,
}

impl DashboardConfig {
    pub const fn new() -> Self {
        Self {
            sampling_period_ms: SAMPLING_PERIOD_MS,
            slice_ms: SLEEP_SLICE_MS,
            sensor_cooldown_ms: SENSOR_COOLDOWN_MS,
            persist_every: PERSIST_EVERY_CYCLES,
            splash_one_in: SPLASH_ONE_IN,
            aggregator: AggregatorConfig::new(),
        }
    }

    /// Change the sampling period.
    ///
    /// A long window still derived from the previous period is re-derived so it
    /// covers the same span; a window set explicitly is kept.
    #[must_use]
    pub const fn with_sampling_period(
        mut self,
        period_ms: u32,
    ) -> Self {
        if self.aggregator.long_window == samples_per_interval(LONG_INTERVAL_SECS, self.sampling_period_ms) {
            self.aggregator.long_window = samples_per_interval(LONG_INTERVAL_SECS, period_ms);
        }
        self.sampling_period_ms = period_ms;
        self
    }

    #[must_use]
    pub const fn with_aggregator(
        mut self,
        aggregator: AggregatorConfig,
    ) -> Self {
        self.aggregator = aggregator;
        self
    }

    #[must_use]
    pub const fn with_persist_every(
        mut self,
        cycles: u32,
    ) -> Self {
        self.persist_every = cycles;
        self
    }

    #[must_use]
    pub const fn with_splash_one_in(
        mut self,
        one_in: u32,
    ) -> Self {
        self.splash_one_in = one_in;
        self
    }
}

impl Default for DashboardConfig {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Unit Tests
// =============================================================================
