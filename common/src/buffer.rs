//! Bounded sample history with oldest-first eviction.

use heapless::Deque;

/// Sliding window of the last `W` samples, oldest first.
#[derive(Clone)]
pub struct HistoryBuffer<const W: usize> {
    samples: Deque<f32, W>,
}

impl<const W: usize> HistoryBuffer<W> {
    pub const fn new() -> Self { Self { samples: Deque::new() } }

    /// Build from a chronological sequence, keeping only the newest `W` values.
    pub fn from_newest(values: &[f32]) -> Self {
        let mut buffer = Self::new();
        for &v in &values[values.len().saturating_sub(W)..] {
            buffer.push(v);
        }
        buffer
    }

    pub const fn capacity(&self) -> usize { W }

    /// Append a sample, dropping the oldest one when full.
    pub fn push(
        &mut self,
        value: f32,
    ) {
        if self.samples.is_full() {
            self.samples.pop_front();
        }
        self.samples.push_back(value).ok();
    }

    /// Samples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ { self.samples.iter().copied() }

    #[inline]
    pub fn len(&self) -> usize { self.samples.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.samples.is_empty() }

    /// Most recent sample.
    pub fn last(&self) -> Option<f32> { self.samples.back().copied() }

    /// Arithmetic mean of the newest `k` samples, or `None` if fewer are held.
    pub fn mean_of_last(
        &self,
        k: usize,
    ) -> Option<f32> {
        let len = self.len();
        if k == 0 || k > len {
            return None;
        }
        let sum: f32 = self.iter().skip(len - k).sum();
        Some(sum / k as f32)
    }

    /// Smallest and largest sample.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.iter().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }

    pub fn clear(&mut self) { self.samples.clear(); }
}

impl<const W: usize> Default for HistoryBuffer<W> {
    fn default() -> Self { Self::new() }
}

impl<const W: usize> core::fmt::Debug for HistoryBuffer<W> {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<const W: usize> PartialEq for HistoryBuffer<W> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a.to_bits() == b.to_bits())
    }
}
