//! Persistence of the two history buffers.
//!
//! [`codec`] turns the buffers into a small human-readable text record and back;
//! [`store`] moves that record through a [`RecordStorage`] backend (flash on the
//! device, a file on the host) and never lets a bad record reach the caller.

pub mod codec;
pub mod store;

pub use codec::{DecodeError, RECORD_CAPACITY};
pub use store::{HistoryStore, LoadStatus, Loaded, MemoryStorage, RecordStorage, SaveError, StorageError};
