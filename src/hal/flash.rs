//! Flash-backed settings storage
//!
//! The STM32G474 has no EEPROM, so the settings bytes live in the last flash
//! page. The page is mirrored in a small RAM record; every byte write
//! rewrites the record (erase page, program one double word).

use embassy_stm32::flash::{Blocking, Flash};

use crate::config::{FLASH_PAGE_SIZE, SETTINGS_FLASH_OFFSET};
use crate::settings::ByteStore;

/// Bytes of settings kept in flash (one double word)
pub const RECORD_LEN: usize = 8;

/// Settings page in internal flash
pub struct FlashStore<'d> {
    flash: Flash<'d, Blocking>,
    record: [u8; RECORD_LEN],
}

impl<'d> FlashStore<'d> {
    /// Wrap the flash peripheral and load the current record
    #[must_use]
    pub fn new(mut flash: Flash<'d, Blocking>) -> Self {
        let mut record = [0xFF; RECORD_LEN];
        if flash.blocking_read(SETTINGS_FLASH_OFFSET, &mut record).is_err() {
            warn!("settings page read failed, using erased record");
            record = [0xFF; RECORD_LEN];
        }
        Self { flash, record }
    }

    fn commit(&mut self) {
        let end = SETTINGS_FLASH_OFFSET + FLASH_PAGE_SIZE;
        if self.flash.blocking_erase(SETTINGS_FLASH_OFFSET, end).is_err() {
            error!("settings page erase failed");
            return;
        }
        if self.flash.blocking_write(SETTINGS_FLASH_OFFSET, &self.record).is_err() {
            error!("settings page write failed");
        }
    }
}

impl ByteStore for FlashStore<'_> {
    fn read_byte(&mut self, addr: u16) -> u8 {
        self.record.get(usize::from(addr)).copied().unwrap_or(0xFF)
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        let Some(slot) = self.record.get_mut(usize::from(addr)) else {
            warn!("settings address {} out of range", addr);
            return;
        };
        if *slot == value {
            return;
        }
        *slot = value;
        self.commit();
    }
}
