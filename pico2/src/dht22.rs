//! DHT22 (AM2302) frame decoding.
//!
//! A transfer is 40 bits, MSB first: humidity (16), temperature (16), checksum (8).
//! Each bit is a ~50 us low followed by a high pulse whose length encodes the
//! value: ~26 us for 0, ~70 us for 1. The reader in the binary measures the high
//! pulses; classification and decoding live here so they can be tested on host.

use thermograph_common::sensor::{Reading, SensorError};

/// Bits in one transfer.
pub const FRAME_BITS: usize = 40;

/// High pulses longer than this are ones.
pub const ONE_THRESHOLD_US: u32 = 48;

/// Raw transfer bytes.
pub type Frame = [u8; FRAME_BITS / 8];

/// Pack measured high-pulse widths into frame bytes.
pub fn frame_from_pulses(pulses: &[u32; FRAME_BITS]) -> Frame {
    let mut frame = [0u8; FRAME_BITS / 8];
    for (i, &width) in pulses.iter().enumerate() {
        if width > ONE_THRESHOLD_US {
            frame[i / 8] |= 0x80 >> (i % 8);
        }
    }
    frame
}

/// Check and decode a frame. Values are 0.1 resolution, temperature sign in bit 15.
pub fn decode(frame: &Frame) -> Result<Reading, SensorError> {
    let [h_hi, h_lo, t_hi, t_lo, checksum] = *frame;
    let sum = h_hi.wrapping_add(h_lo).wrapping_add(t_hi).wrapping_add(t_lo);
    if sum != checksum {
        return Err(SensorError::Checksum);
    }

    let humidity = f32::from(u16::from_be_bytes([h_hi, h_lo])) / 10.0;
    let magnitude = f32::from(u16::from_be_bytes([t_hi & 0x7f, t_lo])) / 10.0;
    let temperature = if t_hi & 0x80 != 0 { -magnitude } else { magnitude };

    if !(0.0..=100.0).contains(&humidity) || !(-40.0..=80.0).contains(&temperature) {
        return Err(SensorError::OutOfRange);
    }
    Ok(Reading::new(temperature, humidity))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_datasheet_example() {
        // 65.2 %RH, 35.1 C
        let reading = decode(&[0x02, 0x8c, 0x01, 0x5f, 0xee]).unwrap();
        assert_eq!(reading, Reading::new(35.1, 65.2));
    }

    #[test]
    fn test_decode_negative_temperature() {
        let reading = decode(&[0x01, 0xf4, 0x80, 0x65, 0xda]).unwrap();
        assert_eq!(reading.temperature, -10.1);
        assert_eq!(reading.humidity, 50.0);
    }

    #[test]
    fn test_decode_checksum_mismatch() {
        assert_eq!(decode(&[0x02, 0x8c, 0x01, 0x5f, 0xef]), Err(SensorError::Checksum));
    }

    #[test]
    fn test_decode_out_of_range() {
        // 120.0 %RH with a valid checksum
        assert_eq!(decode(&[0x04, 0xb0, 0x00, 0xc8, 0x7c]), Err(SensorError::OutOfRange));
    }

    #[test]
    fn test_all_zero_frame_is_zero_reading() {
        assert_eq!(decode(&[0; 5]), Ok(Reading::new(0.0, 0.0)));
    }

    #[test]
    fn test_pulses_msb_first() {
        let mut pulses = [26u32; FRAME_BITS];
        pulses[0] = 70;
        pulses[15] = 70;
        pulses[39] = 70;
        assert_eq!(frame_from_pulses(&pulses), [0x80, 0x01, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_threshold_boundary() {
        let mut pulses = [0u32; FRAME_BITS];
        pulses[0] = ONE_THRESHOLD_US;
        pulses[1] = ONE_THRESHOLD_US + 1;
        assert_eq!(frame_from_pulses(&pulses)[0], 0x40);
    }
}
