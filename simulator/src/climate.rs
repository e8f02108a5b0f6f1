//! Simulated DHT22: slow daily-like swing plus sensor noise.

use std::f32::consts::TAU;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use thermograph_common::sensor::{Reading, Sensor, SensorError};

/// Readings per full temperature swing.
const CYCLE_TICKS: f32 = 600.0;

pub struct SimulatedClimate {
    rng: ChaCha8Rng,
    tick: u32,
    /// Every n-th read times out; 0 never fails.
    fail_every: u32,
}

impl SimulatedClimate {
    pub fn new(
        rng: ChaCha8Rng,
        fail_every: u32,
    ) -> Self {
        Self { rng, tick: 0, fail_every }
    }
}

/// Round to the sensor's 0.1 resolution.
fn quantize(v: f32) -> f32 { (v * 10.0).round() / 10.0 }

impl Sensor for SimulatedClimate {
    fn read(&mut self) -> Result<Reading, SensorError> {
        self.tick = self.tick.wrapping_add(1);
        if self.fail_every > 0 && self.tick % self.fail_every == 0 {
            return Err(SensorError::Timeout);
        }
        let phase = self.tick as f32 / CYCLE_TICKS * TAU;
        let temperature = 21.0 + 3.0 * phase.sin() + self.rng.random_range(-0.15..0.15);
        let humidity = 45.0 - 8.0 * phase.sin() + self.rng.random_range(-0.5..0.5);
        Ok(Reading::new(quantize(temperature), quantize(humidity.clamp(0.0, 100.0))))
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_readings_are_quantized_and_plausible() {
        let mut climate = SimulatedClimate::new(ChaCha8Rng::seed_from_u64(7), 0);
        for _ in 0..1_000 {
            let r = climate.read().unwrap();
            assert!((17.0..=25.0).contains(&r.temperature));
            assert!((0.0..=100.0).contains(&r.humidity));
            assert_eq!(quantize(r.temperature), r.temperature);
        }
    }

    #[test]
    fn test_periodic_failures() {
        let mut climate = SimulatedClimate::new(ChaCha8Rng::seed_from_u64(7), 3);
        let failures: Vec<bool> = (0..6).map(|_| climate.read().is_err()).collect();
        assert_eq!(failures, vec![false, false, true, false, false, true]);
    }
}
