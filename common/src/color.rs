//! RGB888 to native RGB565 color mapping.
//!
//! The ST7789 expects 16-bit pixels on the wire, most significant byte first:
//!
//! ```text
//! bit  15..11  10..5  4..0
//!      red     green  blue
//! ```
//!
//! A [`Color`] holds those two bytes ready to stream. It can only be produced by a
//! [`ColorModel`], so everything above the model treats colors as opaque tokens.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::RawData;

/// Bytes per native pixel.
pub const BYTES_PER_PIXEL: usize = 2;

/// A native-encoded pixel value (RGB565, big-endian).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color([u8; BYTES_PER_PIXEL]);

impl Color {
    /// The two bytes streamed to the sink for this color.
    #[inline]
    pub const fn native(self) -> [u8; BYTES_PER_PIXEL] { self.0 }

    /// Rebuild a color from bytes already in native encoding (sink readback).
    #[inline]
    pub(crate) const fn from_native(bytes: [u8; BYTES_PER_PIXEL]) -> Self { Self(bytes) }

    /// Interpret the native value as an `embedded-graphics` color.
    pub fn to_rgb565(self) -> Rgb565 { Rgb565::from(RawU16::new(u16::from_be_bytes(self.0))) }

    /// Native encoding of an `embedded-graphics` color.
    pub fn from_rgb565(color: Rgb565) -> Self { Self(RawU16::from(color).into_inner().to_be_bytes()) }
}

impl From<Color> for Rgb565 {
    fn from(color: Color) -> Self { color.to_rgb565() }
}

/// Subpixel order of the panel.
///
/// Some ST7789 modules are wired BGR; swapping here keeps palettes portable.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

/// Maps 8-bit-per-channel RGB to the sink's native pixel encoding.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorModel {
    order: ChannelOrder,
}

impl ColorModel {
    /// Model for a panel with standard RGB subpixel order.
    pub const fn new() -> Self { Self { order: ChannelOrder::Rgb } }

    pub const fn with_order(order: ChannelOrder) -> Self { Self { order } }

    pub const fn order(&self) -> ChannelOrder { self.order }

    /// Truncate each channel to 5/6/5 bits and pack.
    pub const fn rgb(
        &self,
        r: u8,
        g: u8,
        b: u8,
    ) -> Color {
        let (hi, lo) = match self.order {
            ChannelOrder::Rgb => (r, b),
            ChannelOrder::Bgr => (b, r),
        };
        let packed = ((hi as u16 & 0xf8) << 8) | ((g as u16 & 0xfc) << 3) | (lo as u16 >> 3);
        Color(packed.to_be_bytes())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
