//! Framing of the history record stored in flash.
//!
//! ```text
//! offset 0: magic   u32 LE  "THG1"
//! offset 4: length  u32 LE  payload bytes
//! offset 8: payload
//! ```
//!
//! An erased region reads back as all `0xFF`, which is reported as "no record".

use thermograph_common::history::{RECORD_CAPACITY, StorageError};

use crate::config::{FLASH_SECTOR_SIZE, HISTORY_REGION_SIZE};

pub const MAGIC: u32 = u32::from_le_bytes(*b"THG1");

pub const HEADER_LEN: usize = 8;

/// Largest payload the region can hold.
pub const MAX_PAYLOAD: usize = HISTORY_REGION_SIZE - HEADER_LEN;

const _: () = assert!(RECORD_CAPACITY <= MAX_PAYLOAD);

pub type Header = [u8; HEADER_LEN];

pub fn encode_header(len: usize) -> Result<Header, StorageError> {
    if len > MAX_PAYLOAD {
        return Err(StorageError::Full);
    }
    let mut header = [0u8; HEADER_LEN];
    header[..4].copy_from_slice(&MAGIC.to_le_bytes());
    header[4..].copy_from_slice(&(len as u32).to_le_bytes());
    Ok(header)
}

/// Payload length announced by `header`, `None` for an erased region.
pub fn decode_header(header: &Header) -> Result<Option<usize>, StorageError> {
    if header.iter().all(|&b| b == 0xff) {
        return Ok(None);
    }
    let [m0, m1, m2, m3, l0, l1, l2, l3] = *header;
    if u32::from_le_bytes([m0, m1, m2, m3]) != MAGIC {
        return Err(StorageError::Corrupted);
    }
    let len = u32::from_le_bytes([l0, l1, l2, l3]) as usize;
    if len > MAX_PAYLOAD {
        return Err(StorageError::Corrupted);
    }
    Ok(Some(len))
}

/// Bytes to erase before writing a record of `len` payload bytes.
pub const fn erase_span(len: usize) -> usize {
    (HEADER_LEN + len).div_ceil(FLASH_SECTOR_SIZE) * FLASH_SECTOR_SIZE
}

// =============================================================================
// Unit Tests
// =============================================================================
