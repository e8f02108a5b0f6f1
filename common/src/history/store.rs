//! Record storage backends and the load/save policy around them.

use core::fmt;

use heapless::Vec;

use super::codec::{self, DecodeError, RECORD_CAPACITY};
use crate::buffer::HistoryBuffer;

/// Errors from a record backend.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// The medium reported a failure (flash erase/program, file I/O).
    Io,
    /// The record does not fit the caller's buffer.
    BufferTooSmall,
    /// The record does not fit the medium.
    Full,
    /// Framing around the record is damaged.
    Corrupted,
}

impl fmt::Display for StorageError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Io => f.write_str("storage i/o error"),
            Self::BufferTooSmall => f.write_str("record larger than buffer"),
            Self::Full => f.write_str("storage full"),
            Self::Corrupted => f.write_str("record framing corrupted"),
        }
    }
}

/// Holds at most one opaque record.
pub trait RecordStorage {
    /// Copy the stored record into `buf`. `Ok(None)` when nothing was ever written.
    fn read_record(
        &mut self,
        buf: &mut [u8],
    ) -> Result<Option<usize>, StorageError>;

    /// Replace the stored record.
    fn write_record(
        &mut self,
        record: &[u8],
    ) -> Result<(), StorageError>;
}

impl<T: RecordStorage + ?Sized> RecordStorage for &mut T {
    fn read_record(
        &mut self,
        buf: &mut [u8],
    ) -> Result<Option<usize>, StorageError> {
        (**self).read_record(buf)
    }

    fn write_record(
        &mut self,
        record: &[u8],
    ) -> Result<(), StorageError> {
        (**self).write_record(record)
    }
}

/// RAM-backed record, lost on reset. Used by tests and as a fallback backend.
#[derive(Default)]
pub struct MemoryStorage {
    record: Option<Vec<u8, RECORD_CAPACITY>>,
}

impl MemoryStorage {
    pub const fn new() -> Self { Self { record: None } }

    /// Start with raw record bytes already present.
    pub fn with_record(bytes: &[u8]) -> Result<Self, StorageError> {
        let mut storage = Self::new();
        storage.write_record(bytes)?;
        Ok(storage)
    }

    /// The stored bytes, if any.
    pub fn record(&self) -> Option<&[u8]> { self.record.as_deref() }
}

impl RecordStorage for MemoryStorage {
    fn read_record(
        &mut self,
        buf: &mut [u8],
    ) -> Result<Option<usize>, StorageError> {
        let Some(record) = &self.record else {
            return Ok(None);
        };
        let dst = buf.get_mut(..record.len()).ok_or(StorageError::BufferTooSmall)?;
        dst.copy_from_slice(record);
        Ok(Some(record.len()))
    }

    fn write_record(
        &mut self,
        record: &[u8],
    ) -> Result<(), StorageError> {
        let stored = Vec::from_slice(record).map_err(|_| StorageError::Full)?;
        self.record = Some(stored);
        Ok(())
    }
}

// =============================================================================
// Store
// =============================================================================

/// Why a save did not happen. The in-memory buffers stay authoritative either way.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SaveError {
    /// Encoded history exceeds the record capacity.
    RecordTooLarge,
    Storage(StorageError),
}

impl fmt::Display for SaveError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::RecordTooLarge => f.write_str("history record too large"),
            Self::Storage(e) => write!(f, "{e}"),
        }
    }
}

/// How the last load went.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadStatus {
    Restored,
    /// No record stored yet.
    Missing,
    /// A record exists but was rejected.
    Corrupted(DecodeError),
    /// The backend could not be read.
    Unreadable(StorageError),
}

/// Result of [`HistoryStore::load`]: always usable buffers plus a diagnostic.
#[derive(Debug)]
pub struct Loaded<const W: usize> {
    pub short: HistoryBuffer<W>,
    pub long: HistoryBuffer<W>,
    pub status: LoadStatus,
}

impl<const W: usize> Loaded<W> {
    fn empty(status: LoadStatus) -> Self {
        Self {
            short: HistoryBuffer::new(),
            long: HistoryBuffer::new(),
            status,
        }
    }
}

/// Saves and restores the aggregator buffers through a [`RecordStorage`].
pub struct HistoryStore<S> {
    storage: S,
}

impl<S: RecordStorage> HistoryStore<S> {
    pub const fn new(storage: S) -> Self { Self { storage } }

    pub fn storage(&self) -> &S { &self.storage }

    /// Write both buffers as one record.
    pub fn save<const W: usize>(
        &mut self,
        short: &HistoryBuffer<W>,
        long: &HistoryBuffer<W>,
    ) -> Result<(), SaveError> {
        let record = codec::encode(short, long).map_err(|_| SaveError::RecordTooLarge)?;
        self.storage.write_record(record.as_bytes()).map_err(SaveError::Storage)?;
        debug!("history saved: {} bytes", record.len());
        Ok(())
    }

    /// Read both buffers back. Never fails: absent or bad records yield empty buffers.
    pub fn load<const W: usize>(&mut self) -> Loaded<W> {
        let mut buf = [0u8; RECORD_CAPACITY];
        let len = match self.storage.read_record(&mut buf) {
            Ok(Some(len)) => len,
            Ok(None) => {
                info!("no stored history");
                return Loaded::empty(LoadStatus::Missing);
            }
            Err(e) => {
                warn!("history unreadable: {}", e);
                return Loaded::empty(LoadStatus::Unreadable(e));
            }
        };
        match codec::decode::<W>(&buf[..len]) {
            Ok((short, long)) => {
                info!("history restored: {} short, {} long", short.len(), long.len());
                Loaded {
                    short,
                    long,
                    status: LoadStatus::Restored,
                }
            }
            Err(e) => {
                warn!("history corrupted: {}", e);
                Loaded::empty(LoadStatus::Corrupted(e))
            }
        }
    }
}
