//! The pixel-window capability every surface implements.
//!
//! A sink only understands two things: select a rectangular window, then stream
//! native pixel bytes into it row-major. The ST7789 works exactly like this
//! (CASET/RASET then RAMWR), and so do the in-memory surfaces below.
//!
//! A window write is expected to stream exactly `width * height` pixels before the
//! next window is selected. Surfaces here tolerate violations: bytes past the end of
//! the window are dropped, and a new window discards any half-written pixel.

use core::fmt;

use embedded_graphics::Pixel;
use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::Point;

use crate::color::{BYTES_PER_PIXEL, Color};

/// Addressable pixel surface reachable only through window writes.
pub trait PixelSink {
    type Error;

    /// Select the inclusive rectangle `(x0, y0)..=(x1, y1)` for the next stream.
    fn set_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<(), Self::Error>;

    /// Write native pixel bytes into the current window.
    fn stream(
        &mut self,
        bytes: &[u8],
    ) -> Result<(), Self::Error>;
}

impl<T: PixelSink + ?Sized> PixelSink for &mut T {
    type Error = T::Error;

    fn set_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<(), Self::Error> {
        (**self).set_window(x0, y0, x1, y1)
    }

    fn stream(
        &mut self,
        bytes: &[u8],
    ) -> Result<(), Self::Error> {
        (**self).stream(bytes)
    }
}

// =============================================================================
// Window bookkeeping
// =============================================================================

/// An inclusive pixel rectangle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Window {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl Window {
    pub const fn new(
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub const fn width(&self) -> u32 { self.x1.abs_diff(self.x0) as u32 + 1 }

    pub const fn height(&self) -> u32 { self.y1.abs_diff(self.y0) as u32 + 1 }

    /// Pixels a complete write into this window carries.
    pub const fn area(&self) -> u32 { self.width() * self.height() }

    /// Surface coordinates of the `index`-th pixel in row-major order.
    const fn position(
        &self,
        index: u32,
    ) -> (u32, u32) {
        let w = self.width();
        (self.x0 as u32 + index % w, self.y0 as u32 + index / w)
    }
}

/// Cursor state shared by the in-memory sinks.
#[derive(Clone, Copy, Debug, Default)]
struct WindowCursor {
    window: Option<Window>,
    written: u32,
    pending: Option<u8>,
    dropped: u32,
}

impl WindowCursor {
    fn select(
        &mut self,
        window: Window,
    ) {
        self.window = Some(window);
        self.written = 0;
        self.pending = None;
    }

    fn remaining(&self) -> u32 { self.window.map_or(0, |w| w.area().saturating_sub(self.written)) }

    /// Feed bytes, calling `put` with the surface position of every completed pixel.
    fn feed(
        &mut self,
        bytes: &[u8],
        mut put: impl FnMut(u32, u32, Color),
    ) {
        let Some(window) = self.window else {
            self.dropped = self.dropped.saturating_add((bytes.len() / BYTES_PER_PIXEL) as u32);
            return;
        };
        for &byte in bytes {
            let Some(hi) = self.pending.take() else {
                self.pending = Some(byte);
                continue;
            };
            if self.written < window.area() {
                let (x, y) = window.position(self.written);
                put(x, y, Color::from_native([hi, byte]));
                self.written += 1;
            } else {
                self.dropped = self.dropped.saturating_add(1);
            }
        }
    }
}

// =============================================================================
// In-memory framebuffer
// =============================================================================

/// Errors reported by [`FrameBuffer`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// Window reaches past the surface or has inverted corners.
    OutOfBounds,
    /// Backing storage cannot hold `width * height` pixels.
    BufferTooSmall,
}

impl fmt::Display for SinkError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::OutOfBounds => f.write_str("window out of bounds"),
            Self::BufferTooSmall => f.write_str("framebuffer too small"),
        }
    }
}

/// Row-major RGB565 (big-endian) surface over caller-provided memory.
///
/// Used as the test double for the rasterizer and as an off-screen canvas.
pub struct FrameBuffer<'a> {
    buf: &'a mut [u8],
    width: u16,
    height: u16,
    cursor: WindowCursor,
}

impl<'a> FrameBuffer<'a> {
    pub fn new(
        buf: &'a mut [u8],
        width: u16,
        height: u16,
    ) -> Result<Self, SinkError> {
        let needed = width as usize * height as usize * BYTES_PER_PIXEL;
        if buf.len() < needed {
            return Err(SinkError::BufferTooSmall);
        }
        Ok(Self {
            buf: &mut buf[..needed],
            width,
            height,
            cursor: WindowCursor::default(),
        })
    }

    pub const fn width(&self) -> u16 { self.width }

    pub const fn height(&self) -> u16 { self.height }

    /// Read back one pixel.
    pub fn pixel(
        &self,
        x: u16,
        y: u16,
    ) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        Some(Color::from_native([self.buf[at], self.buf[at + 1]]))
    }

    /// Pixels still owed to the current window.
    pub fn window_remaining(&self) -> u32 { self.cursor.remaining() }

    /// Pixels streamed past the end of a window (or with no window selected).
    pub const fn dropped(&self) -> u32 { self.cursor.dropped }

    /// Iterate over all pixels equal to `color`.
    pub fn find(
        &self,
        color: Color,
    ) -> impl Iterator<Item = (u16, u16)> + '_ {
        let width = self.width as usize;
        self.buf
            .chunks_exact(BYTES_PER_PIXEL)
            .enumerate()
            .filter(move |(_, px)| *px == color.native())
            .map(move |(i, _)| ((i % width) as u16, (i / width) as u16))
    }
}

impl PixelSink for FrameBuffer<'_> {
    type Error = SinkError;

    fn set_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<(), Self::Error> {
        if x0 > x1 || y0 > y1 || x1 >= self.width || y1 >= self.height {
            return Err(SinkError::OutOfBounds);
        }
        self.cursor.select(Window::new(x0, y0, x1, y1));
        Ok(())
    }

    fn stream(
        &mut self,
        bytes: &[u8],
    ) -> Result<(), Self::Error> {
        let width = self.width as usize;
        let buf = &mut *self.buf;
        self.cursor.feed(bytes, |x, y, color| {
            let at = (y as usize * width + x as usize) * BYTES_PER_PIXEL;
            buf[at..at + BYTES_PER_PIXEL].copy_from_slice(&color.native());
        });
        Ok(())
    }
}

// =============================================================================
// embedded-graphics adapter
// =============================================================================

/// Exposes any RGB565 `DrawTarget` (e.g. the desktop simulator) as a [`PixelSink`].
pub struct DrawTargetSink<D> {
    target: D,
    cursor: WindowCursor,
}

impl<D> DrawTargetSink<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    pub const fn new(target: D) -> Self {
        Self {
            target,
            cursor: WindowCursor {
                window: None,
                written: 0,
                pending: None,
                dropped: 0,
            },
        }
    }

    pub const fn target(&self) -> &D { &self.target }

    pub fn into_inner(self) -> D { self.target }
}

impl<D> PixelSink for DrawTargetSink<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    type Error = D::Error;

    fn set_window(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
    ) -> Result<(), Self::Error> {
        self.cursor.select(Window::new(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)));
        Ok(())
    }

    fn stream(
        &mut self,
        bytes: &[u8],
    ) -> Result<(), Self::Error> {
        // Collect at most one stream call worth of pixels, then hand them over at once.
        let mut pixels: heapless::Vec<Pixel<Rgb565>, STREAM_BATCH> = heapless::Vec::new();
        let mut result = Ok(());
        for part in bytes.chunks(STREAM_BATCH * BYTES_PER_PIXEL) {
            pixels.clear();
            self.cursor.feed(part, |x, y, color| {
                pixels.push(Pixel(Point::new(x as i32, y as i32), color.to_rgb565())).ok();
            });
            if let Err(e) = self.target.draw_iter(pixels.iter().copied()) {
                result = Err(e);
            }
        }
        result
    }
}

/// Pixels forwarded to the draw target per batch.
const STREAM_BATCH: usize = 128;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use embedded_graphics::mock_display::MockDisplay;
    use embedded_graphics::pixelcolor::RgbColor;

    use super::*;
    use crate::color::ColorModel;

    #[test]
    fn test_window_dimensions() {
        let w = Window::new(2, 3, 5, 3);
        assert_eq!(w.width(), 4);
        assert_eq!(w.height(), 1);
        assert_eq!(w.area(), 4);
    }

    #[test]
    fn test_framebuffer_rejects_small_buffer() {
        let mut mem = [0u8; 10];
        assert_eq!(FrameBuffer::new(&mut mem, 4, 4).err(), Some(SinkError::BufferTooSmall));
    }

    #[test]
    fn test_framebuffer_streams_row_major() {
        let model = ColorModel::new();
        let red = model.rgb(255, 0, 0);
        let mut mem = [0u8; 4 * 4 * 2];
        let mut fb = FrameBuffer::new(&mut mem, 4, 4).unwrap();

        fb.set_window(1, 1, 2, 2).unwrap();
        assert_eq!(fb.window_remaining(), 4);
        for _ in 0..4 {
            fb.stream(&red.native()).unwrap();
        }
        assert_eq!(fb.window_remaining(), 0);

        let lit: Vec<_> = fb.find(red).collect();
        assert_eq!(lit, vec![(1, 1), (2, 1), (1, 2), (2, 2)]);
    }

    #[test]
    fn test_framebuffer_split_pixel_across_streams() {
        let model = ColorModel::new();
        let blue = model.rgb(0, 0, 255);
        let mut mem = [0u8; 2 * 2 * 2];
        let mut fb = FrameBuffer::new(&mut mem, 2, 2).unwrap();
        fb.set_window(1, 0, 1, 0).unwrap();
        fb.stream(&blue.native()[..1]).unwrap();
        assert_eq!(fb.window_remaining(), 1);
        fb.stream(&blue.native()[1..]).unwrap();
        assert_eq!(fb.pixel(1, 0), Some(blue));
    }

    #[test]
    fn test_framebuffer_drops_overflow() {
        let mut mem = [0u8; 2 * 2 * 2];
        let mut fb = FrameBuffer::new(&mut mem, 2, 2).unwrap();
        fb.set_window(0, 0, 0, 0).unwrap();
        fb.stream(&[0xff; 6]).unwrap();
        assert_eq!(fb.dropped(), 2);
        assert_eq!(fb.pixel(1, 0), Some(ColorModel::new().rgb(0, 0, 0)));
    }

    #[test]
    fn test_framebuffer_rejects_out_of_bounds_window() {
        let mut mem = [0u8; 2 * 2 * 2];
        let mut fb = FrameBuffer::new(&mut mem, 2, 2).unwrap();
        assert_eq!(fb.set_window(0, 0, 2, 0), Err(SinkError::OutOfBounds));
        assert_eq!(fb.set_window(1, 0, 0, 0), Err(SinkError::OutOfBounds));
        assert_eq!(fb.pixel(2, 0), None);
    }

    #[test]
    fn test_draw_target_sink() {
        let model = ColorModel::new();
        let mut sink = DrawTargetSink::new(MockDisplay::<Rgb565>::new());
        sink.set_window(0, 0, 1, 0).unwrap();
        let red = model.rgb(255, 0, 0).native();
        sink.stream(&[red[0], red[1], red[0], red[1]]).unwrap();

        let display = sink.into_inner();
        assert_eq!(display.get_pixel(Point::new(0, 0)), Some(Rgb565::RED));
        assert_eq!(display.get_pixel(Point::new(1, 0)), Some(Rgb565::RED));
        assert_eq!(display.get_pixel(Point::new(2, 0)), None);
    }
}
