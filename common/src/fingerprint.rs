//! Redraw suppression key.

use crate::sensor::Reading;

/// Summary of a reading that changes whenever either field changes.
///
/// Both `f32` bit patterns are packed side by side, so equality is exact and
/// there are no collisions. Not meant as a general-purpose hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub const fn of(reading: &Reading) -> Self {
        let t = reading.temperature.to_bits() as u64;
        let h = reading.humidity.to_bits() as u64;
        Self((t << 32) | h)
    }
}
