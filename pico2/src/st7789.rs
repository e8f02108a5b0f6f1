//! Blocking ST7789 driver exposing the controller's address window as a [`PixelSink`].
//!
//! No framebuffer: the rasterizer opens a window with CASET/RASET/RAMWR and
//! streams native RGB565 bytes straight to the panel.

use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI1;
use embassy_rp::spi::{Blocking, Error as SpiError, Spi};
use embedded_hal::delay::DelayNs;
use thermograph_common::sink::PixelSink;
use thermograph_pico2::config::{DISPLAY_MADCTL, DISPLAY_RESET_MS, DISPLAY_SWRESET_MS, DISPLAY_WAKE_MS};

// ST7789 Commands
const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const NORON: u8 = 0x13;
const INVOFF: u8 = 0x20;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;

/// 16 bits per pixel on both the RGB and MCU interfaces.
const COLMOD_RGB565: u8 = 0x55;

pub struct St7789<'d> {
    spi: Spi<'d, SPI1, Blocking>,
    dc: Output<'d>,
    cs: Output<'d>,
    reset: Output<'d>,
}

impl<'d> St7789<'d> {
    /// Create a new ST7789 driver (call init() after).
    pub fn new(
        spi: Spi<'d, SPI1, Blocking>,
        dc: Output<'d>,
        cs: Output<'d>,
        reset: Output<'d>,
    ) -> Self {
        Self { spi, dc, cs, reset }
    }

    /// Reset and configure the panel: RGB565, landscape, mirrored Y, no inversion.
    pub fn init(
        &mut self,
        delay: &mut impl DelayNs,
    ) -> Result<(), SpiError> {
        self.reset.set_low();
        delay.delay_ms(DISPLAY_RESET_MS);
        self.reset.set_high();
        delay.delay_ms(DISPLAY_RESET_MS);

        self.command(SWRESET, &[])?;
        delay.delay_ms(DISPLAY_SWRESET_MS);

        self.command(SLPOUT, &[])?;
        delay.delay_ms(DISPLAY_WAKE_MS);

        self.command(COLMOD, &[COLMOD_RGB565])?;
        self.command(MADCTL, &[DISPLAY_MADCTL])?;
        self.command(INVOFF, &[])?;

        self.command(NORON, &[])?;
        delay.delay_ms(DISPLAY_WAKE_MS);

        self.command(DISPON, &[])?;
        delay.delay_ms(DISPLAY_WAKE_MS);
        Ok(())
    }

    /// Send a command byte (DC low) followed by its parameters (DC high).
    fn command(
        &mut self,
        cmd: u8,
        params: &[u8],
    ) -> Result<(), SpiError> {
        self.cs.set_low();
        self.dc.set_low();
        let mut result = self.spi.blocking_write(&[cmd]);
        if result.is_ok() && !params.is_empty() {
            self.dc.set_high();
            result = self.spi.blocking_write(params);
        }
        self.cs.set_high();
        result
    }
}

impl PixelSink for St7789<'_> {
    type Error = SpiError;

    fn set_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<(), Self::Error> {
        let [x0h, x0l] = x0.to_be_bytes();
        let [x1h, x1l] = x1.to_be_bytes();
        let [y0h, y0l] = y0.to_be_bytes();
        let [y1h, y1l] = y1.to_be_bytes();
        self.command(CASET, &[x0h, x0l, x1h, x1l])?;
        self.command(RASET, &[y0h, y0l, y1h, y1l])?;
        self.command(RAMWR, &[])
    }

    /// Pixel data after RAMWR; the controller keeps advancing its write pointer
    /// across chip-select cycles until the next command.
    fn stream(
        &mut self,
        bytes: &[u8],
    ) -> Result<(), Self::Error> {
        self.cs.set_low();
        self.dc.set_high();
        let result = self.spi.blocking_write(bytes);
        self.cs.set_high();
        result
    }
}
