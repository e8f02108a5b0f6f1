//! Text encoding of the history record.
//!
//! ```text
//! # thermograph history v1
//! short 20 20.5 21
//! long 20.25
//! ```
//!
//! Values use Rust's shortest round-trip float formatting, so a decoded record
//! reproduces the encoded `f32` values bit for bit.

use core::fmt::{self, Write};

use heapless::String;

use crate::buffer::HistoryBuffer;

/// Largest record the encoder produces and the store reads back.
pub const RECORD_CAPACITY: usize = 4096;

/// First line of every record.
pub const HEADER: &str = "# thermograph history v1";

const SHORT_KEY: &str = "short";
const LONG_KEY: &str = "long";

/// Why a stored record was rejected.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// Record is not valid UTF-8.
    NotText,
    /// First line is not the expected header.
    BadHeader,
    /// A line that is neither `short` nor `long`.
    UnknownLine,
    /// The same series appears twice.
    DuplicateSeries,
    /// One of the two series is absent.
    MissingSeries,
    /// A value that does not parse or is not finite.
    BadNumber,
}

impl fmt::Display for DecodeError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let msg = match self {
            Self::NotText => "record is not text",
            Self::BadHeader => "bad record header",
            Self::UnknownLine => "unknown record line",
            Self::DuplicateSeries => "duplicate series",
            Self::MissingSeries => "missing series",
            Self::BadNumber => "invalid sample value",
        };
        f.write_str(msg)
    }
}

/// Encode both buffers. Fails only if the record would exceed [`RECORD_CAPACITY`].
pub fn encode<const W: usize>(
    short: &HistoryBuffer<W>,
    long: &HistoryBuffer<W>,
) -> Result<String<RECORD_CAPACITY>, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{HEADER}")?;
    for (key, series) in [(SHORT_KEY, short), (LONG_KEY, long)] {
        out.push_str(key).map_err(|_| fmt::Error)?;
        for v in series.iter() {
            write!(out, " {v}")?;
        }
        out.push('\n').map_err(|_| fmt::Error)?;
    }
    Ok(out)
}

/// Decode a record produced by [`encode`].
///
/// Series longer than `W` keep their newest `W` values. Any defect rejects the
/// whole record; nothing is returned partially.
pub fn decode<const W: usize>(record: &[u8]) -> Result<(HistoryBuffer<W>, HistoryBuffer<W>), DecodeError> {
    let text = core::str::from_utf8(record).map_err(|_| DecodeError::NotText)?;
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    if lines.next() != Some(HEADER) {
        return Err(DecodeError::BadHeader);
    }

    let mut short = None;
    let mut long = None;
    for line in lines {
        let mut fields = line.split_ascii_whitespace();
        let slot = match fields.next() {
            Some(SHORT_KEY) => &mut short,
            Some(LONG_KEY) => &mut long,
            _ => return Err(DecodeError::UnknownLine),
        };
        if slot.is_some() {
            return Err(DecodeError::DuplicateSeries);
        }
        let mut series = HistoryBuffer::<W>::new();
        for field in fields {
            let v: f32 = field.parse().map_err(|_| DecodeError::BadNumber)?;
            if !v.is_finite() {
                return Err(DecodeError::BadNumber);
            }
            series.push(v);
        }
        *slot = Some(series);
    }

    match (short, long) {
        (Some(short), Some(long)) => Ok((short, long)),
        _ => Err(DecodeError::MissingSeries),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn buffer<const W: usize>(values: &[f32]) -> HistoryBuffer<W> { HistoryBuffer::from_newest(values) }

    #[test]
    fn test_encode_layout() {
        let record = encode(&buffer::<8>(&[20.0, 20.5, 21.0]), &buffer::<8>(&[20.25])).unwrap();
        assert_eq!(record.as_str(), "# thermograph history v1\nshort 20 20.5 21\nlong 20.25\n");
    }

    #[test]
    fn test_empty_series_round_trip() {
        let record = encode(&buffer::<8>(&[]), &buffer::<8>(&[])).unwrap();
        assert_eq!(record.as_str(), "# thermograph history v1\nshort\nlong\n");
        let (short, long) = decode::<8>(record.as_bytes()).unwrap();
        assert!(short.is_empty() && long.is_empty());
    }

    #[test]
    fn test_decode_tolerates_whitespace_and_order() {
        let text = b"# thermograph history v1\r\n\nlong  1.5 \r\nshort -3 4\n";
        let (short, long) = decode::<8>(text).unwrap();
        assert_eq!(short, buffer(&[-3.0, 4.0]));
        assert_eq!(long, buffer(&[1.5]));
    }

    #[test]
    fn test_decode_keeps_newest_when_oversized() {
        let text = b"# thermograph history v1\nshort 1 2 3 4 5\nlong 9\n";
        let (short, _) = decode::<3>(text).unwrap();
        assert_eq!(short, buffer(&[3.0, 4.0, 5.0]));
    }

    #[test]
    fn test_decode_rejects_corruption() {
        let cases: [(&[u8], DecodeError); 8] = [
            (b"", DecodeError::BadHeader),
            (b"ts_h = [20.0]\nts_d = []\n", DecodeError::BadHeader),
            (b"# thermograph history v1\nshort 1\n", DecodeError::MissingSeries),
            (b"# thermograph history v1\nshort 1\nlong 2\nmedium 3\n", DecodeError::UnknownLine),
            (b"# thermograph history v1\nshort 1\nshort 2\nlong 3\n", DecodeError::DuplicateSeries),
            (b"# thermograph history v1\nshort 1 x\nlong 3\n", DecodeError::BadNumber),
            (b"# thermograph history v1\nshort 1 NaN\nlong 3\n", DecodeError::BadNumber),
            (b"# thermograph history v1\nshort \xff\nlong\n", DecodeError::NotText),
        ];
        for (record, expected) in cases {
            assert_eq!(decode::<8>(record).err(), Some(expected));
        }
    }

    #[test]
    fn test_full_history_fits_record() {
        let values: Vec<f32> = (0..160).map(|i| -1234.5677 - i as f32 / 7.0).collect();
        let full = buffer::<160>(&values);
        let record = encode(&full, &full).unwrap();
        assert!(record.len() <= RECORD_CAPACITY);
        assert_eq!(decode::<160>(record.as_bytes()).unwrap().0, full);
    }

    proptest! {
        #[test]
        fn test_round_trip_is_exact(
            short in prop::collection::vec(-40.0f32..85.0, 0..160),
            long in prop::collection::vec(-40.0f32..85.0, 0..160),
        ) {
            let (short, long) = (buffer::<160>(&short), buffer::<160>(&long));
            let record = encode(&short, &long).unwrap();
            let (s, l) = decode::<160>(record.as_bytes()).unwrap();
            prop_assert_eq!(s, short);
            prop_assert_eq!(l, long);
        }
    }
}
