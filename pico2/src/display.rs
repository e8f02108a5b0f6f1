//! SPI configuration for the 160x128 ST7789 module.

use embassy_rp::spi::Config as SpiConfig;
use thermograph_pico2::config::DISPLAY_SPI_HZ;

/// SPI configuration for the ST7789 display (mode 0).
pub fn display_spi_config() -> SpiConfig {
    let mut config = SpiConfig::default();
    config.frequency = DISPLAY_SPI_HZ;
    config
}
