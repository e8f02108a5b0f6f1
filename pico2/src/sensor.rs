//! DHT22 single-wire reader.
//!
//! The 40 data bits are timed with interrupts masked; pulses are only a few tens
//! of microseconds apart. Decoding is done by [`thermograph_pico2::dht22`].

use embassy_rp::gpio::{Flex, Pull};
use embassy_time::{Duration, Instant, block_for};
use thermograph_common::sensor::{Reading, Sensor, SensorError};
use thermograph_pico2::config::{DHT22_EDGE_TIMEOUT_US, DHT22_MIN_INTERVAL_MS, DHT22_START_LOW_US};
use thermograph_pico2::dht22::{self, FRAME_BITS};

pub struct Dht22<'d> {
    pin: Flex<'d>,
    last_read: Option<Instant>,
}

impl<'d> Dht22<'d> {
    pub fn new(mut pin: Flex<'d>) -> Self {
        pin.set_pull(Pull::Up);
        pin.set_as_input();
        Self { pin, last_read: None }
    }

    /// Block until the line reaches `high`, returning how long that took in microseconds.
    fn wait_for(
        pin: &Flex<'_>,
        high: bool,
    ) -> Result<u32, SensorError> {
        let start = Instant::now();
        while pin.is_high() != high {
            if start.elapsed().as_micros() > DHT22_EDGE_TIMEOUT_US {
                return Err(SensorError::Timeout);
            }
        }
        Ok(start.elapsed().as_micros() as u32)
    }

    fn capture(&mut self) -> Result<[u32; FRAME_BITS], SensorError> {
        self.pin.set_as_output();
        self.pin.set_low();
        block_for(Duration::from_micros(u64::from(DHT22_START_LOW_US)));

        let pin = &mut self.pin;
        critical_section::with(|_| {
            pin.set_high();
            pin.set_as_input();

            // Response: ~80 us low then ~80 us high, then the first bit's low phase
            Self::wait_for(pin, false)?;
            Self::wait_for(pin, true)?;
            Self::wait_for(pin, false)?;

            let mut pulses = [0u32; FRAME_BITS];
            for width in &mut pulses {
                Self::wait_for(pin, true)?;
                *width = Self::wait_for(pin, false)?;
            }
            Ok(pulses)
        })
    }
}

impl Sensor for Dht22<'_> {
    fn read(&mut self) -> Result<Reading, SensorError> {
        let min_interval = Duration::from_millis(DHT22_MIN_INTERVAL_MS);
        if let Some(last) = self.last_read {
            let elapsed = last.elapsed();
            if elapsed < min_interval {
                block_for(min_interval - elapsed);
            }
        }
        self.last_read = Some(Instant::now());

        let pulses = self.capture();
        // Release the bus whatever happened
        self.pin.set_as_input();
        dht22::decode(&dht22::frame_from_pulses(&pulses?))
    }
}
