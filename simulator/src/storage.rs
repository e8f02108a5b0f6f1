//! File-backed history record and image directory.

use std::path::PathBuf;
use std::{fs, io};

use thermograph_common::history::{RecordStorage, StorageError};
use thermograph_common::raster::ImageLibrary;

/// The history record as a plain text file.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
}

impl RecordStorage for FileStorage {
    fn read_record(
        &mut self,
        buf: &mut [u8],
    ) -> Result<Option<usize>, StorageError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(_) => return Err(StorageError::Io),
        };
        let dst = buf.get_mut(..bytes.len()).ok_or(StorageError::BufferTooSmall)?;
        dst.copy_from_slice(&bytes);
        Ok(Some(bytes.len()))
    }

    /// Write beside the target and rename, so a crash never leaves half a record.
    fn write_record(
        &mut self,
        record: &[u8],
    ) -> Result<(), StorageError> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, record).map_err(|_| StorageError::Io)?;
        fs::rename(&tmp, &self.path).map_err(|_| StorageError::Io)
    }
}

/// Raw `.565` images read from a directory.
pub struct FileImages {
    dir: PathBuf,
    loaded: Vec<u8>,
}

impl FileImages {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            loaded: Vec::new(),
        }
    }
}

impl ImageLibrary for FileImages {
    type Reader<'a>
        = &'a [u8]
    where
        Self: 'a;

    fn open(
        &mut self,
        name: &str,
    ) -> Option<Self::Reader<'_>> {
        self.loaded = fs::read(self.dir.join(name)).ok()?;
        Some(self.loaded.as_slice())
    }
}
