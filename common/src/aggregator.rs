//! Two-resolution time series built from periodic scalar readings.
//!
//! The short buffer receives one entry per sampling tick (or per pair of ticks,
//! see [`ShortAveraging`]). Every `K` short entries, the mean of the newest `K`
//! short entries is appended to the long buffer, so long values always derive
//! from short values and never from raw readings.

use crate::buffer::HistoryBuffer;
use crate::config::{AggregatorConfig, ShortAveraging};

/// Owns the short and long history buffers, each capped at `W` samples.
pub struct SampleAggregator<const W: usize> {
    config: AggregatorConfig,
    short: HistoryBuffer<W>,
    long: HistoryBuffer<W>,
    /// Raw readings ingested since start or the last restore.
    ticks: u32,
    /// Short-buffer appends since start or the last restore; drives the long cadence.
    short_appends: u32,
    /// First reading of an incomplete pair.
    pending: Option<f32>,
}

impl<const W: usize> SampleAggregator<W> {
    pub const fn new(config: AggregatorConfig) -> Self {
        Self {
            config,
            short: HistoryBuffer::new(),
            long: HistoryBuffer::new(),
            ticks: 0,
            short_appends: 0,
            pending: None,
        }
    }

    pub const fn config(&self) -> &AggregatorConfig { &self.config }

    pub const fn short(&self) -> &HistoryBuffer<W> { &self.short }

    pub const fn long(&self) -> &HistoryBuffer<W> { &self.long }

    pub const fn ticks(&self) -> u32 { self.ticks }

    /// Feed one raw reading.
    pub fn ingest(
        &mut self,
        value: f32,
    ) {
        self.ticks = self.ticks.wrapping_add(1);

        let entry = match self.config.averaging {
            ShortAveraging::Single => value,
            ShortAveraging::Pair => match self.pending.take() {
                None => {
                    self.pending = Some(value);
                    return;
                }
                Some(first) => (first + value) / 2.0,
            },
        };
        self.short.push(entry);
        self.short_appends = self.short_appends.wrapping_add(1);

        let k = self.config.long_window;
        if k == 0 || self.short_appends % k as u32 != 0 {
            return;
        }
        if let Some(mean) = self.short.mean_of_last(k) {
            self.long.push(mean);
            debug!("long sample {} after {} short entries", mean, self.short_appends);
        }
    }

    /// Replace both buffers, e.g. with persisted history. Cadence counters restart.
    pub fn restore(
        &mut self,
        short: &[f32],
        long: &[f32],
    ) {
        self.replace(HistoryBuffer::from_newest(short), HistoryBuffer::from_newest(long));
    }

    /// [`restore`](Self::restore) from buffers that are already bounded.
    pub fn replace(
        &mut self,
        short: HistoryBuffer<W>,
        long: HistoryBuffer<W>,
    ) {
        self.short = short;
        self.long = long;
        self.ticks = 0;
        self.short_appends = 0;
        self.pending = None;
    }
}

impl<const W: usize> Default for SampleAggregator<W> {
    fn default() -> Self { Self::new(AggregatorConfig::new()) }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn aggregator<const W: usize>(
        averaging: ShortAveraging,
        k: usize,
    ) -> SampleAggregator<W> {
        SampleAggregator::new(AggregatorConfig::new().with_averaging(averaging).with_long_window(k))
    }

    #[test]
    fn test_three_readings_with_window_two() {
        let mut agg = aggregator::<160>(ShortAveraging::Single, 2);
        agg.ingest(20.0);
        assert!(agg.long().is_empty());
        agg.ingest(20.0);
        assert_eq!(agg.long().iter().collect::<Vec<_>>(), vec![20.0]);
        agg.ingest(21.0);
        assert_eq!(agg.short().iter().collect::<Vec<_>>(), vec![20.0, 20.0, 21.0]);
        assert_eq!(agg.long().iter().collect::<Vec<_>>(), vec![20.0]);
        assert_eq!(agg.ticks(), 3);
    }

    #[test]
    fn test_long_entry_is_mean_of_last_window() {
        let mut agg = aggregator::<160>(ShortAveraging::Single, 3);
        for v in [1.0, 2.0, 3.0, 10.0, 20.0, 30.0] {
            agg.ingest(v);
        }
        assert_eq!(agg.long().iter().collect::<Vec<_>>(), vec![2.0, 20.0]);
    }

    #[test]
    fn test_pair_averaging() {
        let mut agg = aggregator::<160>(ShortAveraging::Pair, 2);
        agg.ingest(20.0);
        assert!(agg.short().is_empty());
        agg.ingest(21.0);
        assert_eq!(agg.short().last(), Some(20.5));
        agg.ingest(22.0);
        agg.ingest(23.0);
        assert_eq!(agg.short().iter().collect::<Vec<_>>(), vec![20.5, 22.5]);
        assert_eq!(agg.long().last(), Some(21.5));
    }

    #[test]
    fn test_zero_window_disables_long() {
        let mut agg = aggregator::<8>(ShortAveraging::Single, 0);
        for i in 0..20 {
            agg.ingest(i as f32);
        }
        assert_eq!(agg.short().len(), 8);
        assert!(agg.long().is_empty());
    }

    #[test]
    fn test_window_larger_than_capacity_never_fires() {
        let mut agg = aggregator::<4>(ShortAveraging::Single, 6);
        for _ in 0..24 {
            agg.ingest(1.0);
        }
        assert!(agg.long().is_empty());
    }

    #[test]
    fn test_restore_replaces_and_restarts_cadence() {
        let mut agg = aggregator::<4>(ShortAveraging::Single, 2);
        agg.ingest(5.0);
        agg.restore(&[1.0, 2.0, 3.0, 4.0, 5.0], &[9.0]);
        assert_eq!(agg.short().iter().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0, 5.0]);
        assert_eq!(agg.ticks(), 0);

        agg.ingest(7.0);
        assert_eq!(agg.long().iter().collect::<Vec<_>>(), vec![9.0]);
        agg.ingest(9.0);
        assert_eq!(agg.long().iter().collect::<Vec<_>>(), vec![9.0, 8.0]);
    }

    proptest! {
        #[test]
        fn test_buffers_stay_bounded(
            readings in prop::collection::vec(-40.0f32..80.0, 0..400),
            k in 1usize..12,
            pair in any::<bool>(),
        ) {
            let averaging = if pair { ShortAveraging::Pair } else { ShortAveraging::Single };
            let mut agg = aggregator::<16>(averaging, k);
            let (mut short_len, mut long_len) = (0, 0);
            for v in readings {
                agg.ingest(v);
                prop_assert!(agg.short().len() <= 16);
                prop_assert!(agg.long().len() <= 16);
                // Lengths only grow until capacity
                prop_assert!(agg.short().len() >= short_len);
                prop_assert!(agg.long().len() >= long_len);
                short_len = agg.short().len();
                long_len = agg.long().len();
            }
        }

        #[test]
        fn test_long_matches_short_tail_when_produced(
            readings in prop::collection::vec(-40.0f32..80.0, 1..200),
            k in 1usize..10,
        ) {
            let mut agg = aggregator::<32>(ShortAveraging::Single, k);
            for (i, v) in readings.into_iter().enumerate() {
                let before = agg.long().last();
                let before_len = agg.long().len();
                agg.ingest(v);
                if (i + 1) % k == 0 {
                    let expected = agg.short().mean_of_last(k);
                    prop_assert_eq!(agg.long().last(), expected);
                } else {
                    prop_assert_eq!(agg.long().last(), before);
                    prop_assert_eq!(agg.long().len(), before_len);
                }
            }
        }
    }
}
