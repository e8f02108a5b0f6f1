//! Temperature/humidity sensor capability.

use core::fmt;

/// One sensor sample.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Degrees Celsius.
    pub temperature: f32,
    /// Relative humidity, percent.
    pub humidity: f32,
}

impl Reading {
    pub const fn new(
        temperature: f32,
        humidity: f32,
    ) -> Self {
        Self { temperature, humidity }
    }
}

/// Why a read did not complete. All variants are transient: the caller retries
/// after a cooldown.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// The sensor did not answer in time.
    Timeout,
    /// The frame arrived but its checksum did not match.
    Checksum,
    /// Values outside the sensor's physical range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Timeout => f.write_str("sensor timeout"),
            Self::Checksum => f.write_str("sensor checksum mismatch"),
            Self::OutOfRange => f.write_str("sensor value out of range"),
        }
    }
}

/// Source of temperature/humidity readings.
pub trait Sensor {
    fn read(&mut self) -> Result<Reading, SensorError>;
}

impl<T: Sensor + ?Sized> Sensor for &mut T {
    fn read(&mut self) -> Result<Reading, SensorError> { (**self).read() }
}
