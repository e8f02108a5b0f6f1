//! Board configuration.
//!
//! # Wiring (RP2350, 160x128 ST7789 module + DHT22)
//!
//! | Signal        | GPIO | Notes                          |
//! |---------------|------|--------------------------------|
//! | Display SCK   | 14   | SPI1 SCK                       |
//! | Display MOSI  | 15   | SPI1 TX                        |
//! | Display CS    | 13   | driven manually                |
//! | Display DC    | 4    |                                |
//! | Display RESET | 2    |                                |
//! | Backlight     | 5    | active high                    |
//! | DHT22 data    | 16   | internal pull-up, open drain   |

// =============================================================================
// Display
// =============================================================================

/// SPI clock for the ST7789.
pub const DISPLAY_SPI_HZ: u32 = 40_000_000;

/// MADCTL value: row/column exchange (landscape) with mirrored Y.
pub const DISPLAY_MADCTL: u8 = MADCTL_MV | MADCTL_MY;

pub const MADCTL_MY: u8 = 0x80;
pub const MADCTL_MV: u8 = 0x20;

/// Reset pulse and wake-up delays.
pub const DISPLAY_RESET_MS: u32 = 50;
pub const DISPLAY_SWRESET_MS: u32 = 150;
pub const DISPLAY_WAKE_MS: u32 = 10;

// =============================================================================
// DHT22
// =============================================================================

/// Host start signal: data line held low at least 1 ms.
pub const DHT22_START_LOW_US: u32 = 1_100;

/// Give up on any single edge after this long.
pub const DHT22_EDGE_TIMEOUT_US: u64 = 200;

/// The sensor refuses to be read more often than this.
pub const DHT22_MIN_INTERVAL_MS: u64 = 2_000;

// =============================================================================
// Flash
// =============================================================================

/// On-board QSPI flash size.
pub const FLASH_SIZE: usize = 4 * 1024 * 1024;

/// Smallest erasable unit.
pub const FLASH_SECTOR_SIZE: usize = 4096;

/// History lives in the last two sectors.
pub const HISTORY_REGION_SIZE: usize = 2 * FLASH_SECTOR_SIZE;

/// Offset of the history region from the start of flash.
pub const HISTORY_REGION_OFFSET: u32 = (FLASH_SIZE - HISTORY_REGION_SIZE) as u32;

const _: () = assert!(HISTORY_REGION_OFFSET as usize % FLASH_SECTOR_SIZE == 0);
