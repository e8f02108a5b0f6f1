//! History record in the last two flash sectors.

use embassy_rp::flash::{Blocking, Flash};
use embassy_rp::peripherals::FLASH;
use thermograph_common::history::{RECORD_CAPACITY, RecordStorage, StorageError};
use thermograph_pico2::config::{FLASH_SIZE, HISTORY_REGION_OFFSET};
use thermograph_pico2::flash_record::{self, HEADER_LEN, Header};

pub struct FlashStorage<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
}

impl<'d> FlashStorage<'d> {
    pub fn new(flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>) -> Self { Self { flash } }
}

impl RecordStorage for FlashStorage<'_> {
    fn read_record(
        &mut self,
        buf: &mut [u8],
    ) -> Result<Option<usize>, StorageError> {
        let mut header: Header = [0u8; HEADER_LEN];
        self.flash
            .blocking_read(HISTORY_REGION_OFFSET, &mut header)
            .map_err(|_| StorageError::Io)?;
        let Some(len) = flash_record::decode_header(&header)? else {
            return Ok(None);
        };
        let dst = buf.get_mut(..len).ok_or(StorageError::BufferTooSmall)?;
        self.flash
            .blocking_read(HISTORY_REGION_OFFSET + HEADER_LEN as u32, dst)
            .map_err(|_| StorageError::Io)?;
        Ok(Some(len))
    }

    fn write_record(
        &mut self,
        record: &[u8],
    ) -> Result<(), StorageError> {
        let header = flash_record::encode_header(record.len())?;
        // Header and payload go out in one program from RAM
        let mut image = [0xffu8; HEADER_LEN + RECORD_CAPACITY];
        let frame = image.get_mut(..HEADER_LEN + record.len()).ok_or(StorageError::Full)?;
        frame[..HEADER_LEN].copy_from_slice(&header);
        frame[HEADER_LEN..].copy_from_slice(record);

        let span = flash_record::erase_span(record.len()) as u32;
        self.flash
            .blocking_erase(HISTORY_REGION_OFFSET, HISTORY_REGION_OFFSET + span)
            .map_err(|_| StorageError::Io)?;
        self.flash
            .blocking_write(HISTORY_REGION_OFFSET, frame)
            .map_err(|_| StorageError::Io)
    }
}
