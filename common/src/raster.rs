//! Shape, text and image rasterization on top of a [`PixelSink`].
//!
//! Every primitive is expressed as window writes: spans become one window and one
//! burst of repeated color, isolated points become 1x1 windows. Coordinates are
//! surface-space `i32` and may lie outside the panel; anything off-surface is
//! clipped rather than reported. Sink errors are dropped: drawing is best-effort and
//! the next frame overwrites whatever went missing.
//!
//! The rasterizer keeps no drawing state between calls.

use core::fmt;

use embedded_io::{Read, ReadExactError};

use crate::color::{BYTES_PER_PIXEL, Color};
use crate::font::{self, GLYPH_SIZE, Glyph};
use crate::sink::PixelSink;

/// Pixels per streamed burst when flooding a window with one color.
const FLOOD_PIXELS: usize = 64;

/// Bytes read from an image source per chunk.
const IMAGE_CHUNK: usize = 256;

/// Size of the image header: big-endian `u16` width then height.
const IMAGE_HEADER: usize = 4;

// =============================================================================
// Image sources
// =============================================================================

/// Why a streamed image did not render completely.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageError {
    /// Source ended inside the 4-byte header; nothing was drawn.
    MissingHeader,
    /// Source ended inside the pixel body; the rest of the window was filled black.
    Truncated,
    /// The underlying reader failed.
    Read,
}

impl fmt::Display for ImageError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::MissingHeader => f.write_str("image header truncated"),
            Self::Truncated => f.write_str("image body truncated"),
            Self::Read => f.write_str("image read failed"),
        }
    }
}

/// Named image resources, e.g. files on the host or blobs linked into flash.
pub trait ImageLibrary {
    type Reader<'a>: Read
    where
        Self: 'a;

    /// Open `name`, or `None` when it does not exist.
    fn open(
        &mut self,
        name: &str,
    ) -> Option<Self::Reader<'_>>;
}

/// Images compiled into the binary as `(name, bytes)` pairs.
pub struct StaticImages<'a> {
    entries: &'a [(&'a str, &'a [u8])],
}

impl<'a> StaticImages<'a> {
    pub const fn new(entries: &'a [(&'a str, &'a [u8])]) -> Self { Self { entries } }
}

impl<'a> ImageLibrary for StaticImages<'a> {
    type Reader<'r>
        = &'a [u8]
    where
        Self: 'r;

    fn open(
        &mut self,
        name: &str,
    ) -> Option<Self::Reader<'_>> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, data)| *data)
    }
}

// =============================================================================
// Rasterizer
// =============================================================================

/// Drawing primitives over a window-addressed surface of `width` x `height` pixels.
pub struct Rasterizer<S> {
    sink: S,
    width: u16,
    height: u16,
}

impl<S: PixelSink> Rasterizer<S> {
    pub const fn new(
        sink: S,
        width: u16,
        height: u16,
    ) -> Self {
        Self { sink, width, height }
    }

    pub const fn width(&self) -> u16 { self.width }

    pub const fn height(&self) -> u16 { self.height }

    pub fn sink_mut(&mut self) -> &mut S { &mut self.sink }

    pub fn into_inner(self) -> S { self.sink }

    // -------------------------------------------------------------------------
    // Window helpers
    // -------------------------------------------------------------------------

    /// Clip the inclusive rectangle to the surface and select it.
    ///
    /// Returns the number of pixels the window expects, or `None` when nothing is visible.
    fn clip_window(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
    ) -> Option<u32> {
        let cx0 = x0.min(x1).max(0);
        let cx1 = x0.max(x1).min(i32::from(self.width) - 1);
        let cy0 = y0.min(y1).max(0);
        let cy1 = y0.max(y1).min(i32::from(self.height) - 1);
        if cx0 > cx1 || cy0 > cy1 {
            return None;
        }
        self.sink.set_window(cx0 as u16, cy0 as u16, cx1 as u16, cy1 as u16).ok()?;
        Some(((cx1 - cx0 + 1) * (cy1 - cy0 + 1)) as u32)
    }

    /// Stream `count` copies of `color` into the current window.
    fn flood(
        &mut self,
        color: Color,
        count: u32,
    ) {
        let mut burst = [0u8; FLOOD_PIXELS * BYTES_PER_PIXEL];
        for px in burst.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&color.native());
        }
        let mut left = count as usize;
        while left > 0 {
            let n = left.min(FLOOD_PIXELS);
            self.sink.stream(&burst[..n * BYTES_PER_PIXEL]).ok();
            left -= n;
        }
    }

    fn span(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: Color,
    ) {
        if let Some(count) = self.clip_window(x0, y0, x1, y1) {
            self.flood(color, count);
        }
    }

    // -------------------------------------------------------------------------
    // Points, runs and rectangles
    // -------------------------------------------------------------------------

    pub fn pixel(
        &mut self,
        x: i32,
        y: i32,
        color: Color,
    ) {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return;
        }
        if self.sink.set_window(x as u16, y as u16, x as u16, y as u16).is_ok() {
            self.sink.stream(&color.native()).ok();
        }
    }

    /// Horizontal run from `xa` to `xb` inclusive, in either order.
    pub fn hline(
        &mut self,
        xa: i32,
        xb: i32,
        y: i32,
        color: Color,
    ) {
        self.span(xa, y, xb, y, color);
    }

    /// Vertical run from `ya` to `yb` inclusive, in either order.
    pub fn vline(
        &mut self,
        ya: i32,
        yb: i32,
        x: i32,
        color: Color,
    ) {
        self.span(x, ya, x, yb, color);
    }

    /// Solid `w` x `h` rectangle with its top-left corner at `(x, y)`.
    pub fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Color,
    ) {
        if w <= 0 || h <= 0 {
            return;
        }
        self.span(x, y, x.saturating_add(w - 1), y.saturating_add(h - 1), color);
    }

    /// One-pixel rectangle outline.
    pub fn rect(
        &mut self,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Color,
    ) {
        if w <= 0 || h <= 0 {
            return;
        }
        let x1 = x.saturating_add(w - 1);
        let y1 = y.saturating_add(h - 1);
        self.hline(x, x1, y, color);
        self.hline(x, x1, y1, color);
        self.vline(y, y1, x, color);
        self.vline(y, y1, x1, color);
    }

    /// Paint the whole surface.
    pub fn fill(
        &mut self,
        color: Color,
    ) {
        self.fill_rect(0, 0, i32::from(self.width), i32::from(self.height), color);
    }

    // -------------------------------------------------------------------------
    // Lines, circles, triangles
    // -------------------------------------------------------------------------

    /// Bresenham line, both endpoints included.
    ///
    /// Axis-aligned segments take the span fast path. Otherwise the walk starts
    /// at the first step that lands on the surface and stops after the last one,
    /// so far off-screen endpoints cost no more than on-screen ones.
    pub fn line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: Color,
    ) {
        if y0 == y1 {
            return self.hline(x0, x1, y0, color);
        }
        if x0 == x1 {
            return self.vline(y0, y1, x0, color);
        }

        let (x0, y0, x1, y1) = (i64::from(x0), i64::from(y0), i64::from(x1), i64::from(y1));
        let (w, h) = (i64::from(self.width), i64::from(self.height));
        let steep = (y1 - y0).abs() > (x1 - x0).abs();

        // u is the major axis, v the minor one
        let (u0, v0, u1, v1, u_len, v_len) = if steep {
            (y0, x0, y1, x1, h, w)
        } else {
            (x0, y0, x1, y1, w, h)
        };
        let (du, dv) = ((u1 - u0).abs(), (v1 - v0).abs());
        let (su, sv) = ((u1 - u0).signum(), (v1 - v0).signum());

        // Step i plots u0 + su * i and v0 + sv * floor((2 * i * dv + du) / (2 * du)).
        let (u_lo, u_hi) = visible_offsets(u0, su, u_len);
        let (v_lo, v_hi) = visible_offsets(v0, sv, v_len);
        if v_hi < 0 {
            return;
        }
        let (du2, dv2) = (i128::from(du), i128::from(dv));
        let first_v = if v_lo > 0 { ceil_div(i128::from(2 * v_lo - 1) * du2, 2 * dv2) } else { 0 };
        let last_v = ceil_div(i128::from(2 * v_hi + 1) * du2, 2 * dv2) - 1;

        let first = i128::from(u_lo.max(0)).max(first_v);
        let last = i128::from(u_hi.min(du)).min(last_v);
        if first > last {
            return;
        }

        let num = 2 * first * dv2 + du2;
        let (mut u, mut v) = (u0 + su * first as i64, v0 + sv * (num / (2 * du2)) as i64);
        let mut err = (num % (2 * du2)) as i64;

        for _ in first..=last {
            let (x, y) = if steep { (v, u) } else { (u, v) };
            self.pixel(x as i32, y as i32, color);
            err += 2 * dv;
            if err >= 2 * du {
                err -= 2 * du;
                v += sv;
            }
            u += su;
        }
    }

    /// Midpoint circle of radius `r` centred on `(cx, cy)`.
    ///
    /// The filled variant is built only from horizontal spans. A negative radius
    /// draws nothing, a zero radius a single pixel.
    pub fn circle(
        &mut self,
        cx: i32,
        cy: i32,
        r: i32,
        color: Color,
        fill: bool,
    ) {
        if r < 0 {
            return;
        }
        let (cx, cy, r) = (i64::from(cx), i64::from(cy), i64::from(r));
        let (w, h) = (i64::from(self.width), i64::from(self.height));

        // Bounding square misses the surface
        if cx + r < 0 || cy + r < 0 || cx - r >= w || cy - r >= h {
            return;
        }
        if r == 0 {
            return self.pixel(cx as i32, cy as i32, color);
        }

        // Surface entirely inside the circle: no outline pixel can land on it
        let inner = i128::from(r - 1) * i128::from(r - 1);
        let covered = [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)].iter().all(|&(x, y)| {
            let (dx, dy) = (i128::from(x - cx), i128::from(y - cy));
            dx * dx + dy * dy < inner
        });
        if covered {
            if fill {
                self.fill(color);
            }
            return;
        }

        let mut f = 1 - r;
        let mut ddx = 1;
        let mut ddy = -2 * r;
        let (mut x, mut y) = (0, r);

        if fill {
            self.wide_hline(cx - r, cx + r, cy, color);
        } else {
            self.wide_pixel(cx - r, cy, color);
            self.wide_pixel(cx + r, cy, color);
            self.wide_pixel(cx, cy - r, color);
            self.wide_pixel(cx, cy + r, color);
        }

        while x < y {
            if f >= 0 {
                y -= 1;
                ddy += 2;
                f += ddy;
            }
            x += 1;
            ddx += 2;
            f += ddx;

            if fill {
                self.wide_hline(cx - x, cx + x, cy + y, color);
                self.wide_hline(cx - x, cx + x, cy - y, color);
                self.wide_hline(cx - y, cx + y, cy + x, color);
                self.wide_hline(cx - y, cx + y, cy - x, color);
            } else {
                for (px, py) in [(x, y), (y, x)] {
                    self.wide_pixel(cx + px, cy + py, color);
                    self.wide_pixel(cx - px, cy + py, color);
                    self.wide_pixel(cx + px, cy - py, color);
                    self.wide_pixel(cx - px, cy - py, color);
                }
            }
        }
    }

    fn wide_pixel(
        &mut self,
        x: i64,
        y: i64,
        color: Color,
    ) {
        self.pixel(narrow(x), narrow(y), color);
    }

    fn wide_hline(
        &mut self,
        xa: i64,
        xb: i64,
        y: i64,
        color: Color,
    ) {
        self.hline(narrow(xa), narrow(xb), narrow(y), color);
    }

    /// Triangle through three vertices, outlined or scanline-filled.
    pub fn triangle(
        &mut self,
        v0: (i32, i32),
        v1: (i32, i32),
        v2: (i32, i32),
        color: Color,
        fill: bool,
    ) {
        if fill {
            self.fill_triangle(v0, v1, v2, color);
        } else {
            self.line(v0.0, v0.1, v1.0, v1.1, color);
            self.line(v1.0, v1.1, v2.0, v2.1, color);
            self.line(v2.0, v2.1, v0.0, v0.1, color);
        }
    }

    /// Flat-bottom/flat-top split. Edge positions are floored per row so the two
    /// bounds of a row can meet but never cross.
    fn fill_triangle(
        &mut self,
        v0: (i32, i32),
        v1: (i32, i32),
        v2: (i32, i32),
        color: Color,
    ) {
        let mut v = [v0, v1, v2];
        v.sort_unstable_by_key(|p| p.1);
        let [(x0, y0), (x1, y1), (x2, y2)] = v;

        if y0 == y2 {
            let lo = x0.min(x1).min(x2);
            let hi = x0.max(x1).max(x2);
            return self.hline(lo, hi, y0, color);
        }

        let top = y0.max(0);
        let bottom = y2.min(i32::from(self.height) - 1);
        for y in top..=bottom {
            let long = edge_x((x0, y0), (x2, y2), y);
            let (a, b) = if y < y1 {
                (long, edge_x((x0, y0), (x1, y1), y))
            } else if y == y1 {
                // The short edges meet here; a flat edge contributes both ends
                let other = if y1 == y0 { x0 } else if y1 == y2 { x2 } else { x1 };
                (long.min(x1).min(other), long.max(x1).max(other))
            } else {
                (long, edge_x((x1, y1), (x2, y2), y))
            };
            self.hline(a, b, y, color);
        }
    }

    // -------------------------------------------------------------------------
    // Text
    // -------------------------------------------------------------------------

    /// Draw one 8x8 glyph upscaled by `scale`.
    ///
    /// With `bg` the whole cell is painted first; without it unset bits are left
    /// untouched. A zero scale draws nothing.
    pub fn draw_char(
        &mut self,
        x: i32,
        y: i32,
        glyph: &Glyph,
        fg: Color,
        bg: Option<Color>,
        scale: u32,
    ) {
        if scale == 0 {
            return;
        }
        let s = scale.min(i32::MAX as u32 / GLYPH_SIZE as u32) as i32;
        if let Some(bg) = bg {
            self.fill_rect(x, y, GLYPH_SIZE * s, GLYPH_SIZE * s, bg);
        }
        for row in 0..GLYPH_SIZE as u32 {
            for col in 0..GLYPH_SIZE as u32 {
                if !font::is_set(glyph, col, row) {
                    continue;
                }
                let px = x.saturating_add(col as i32 * s);
                let py = y.saturating_add(row as i32 * s);
                if s > 1 {
                    self.fill_rect(px, py, s, s, fg);
                } else {
                    self.pixel(px, py, fg);
                }
            }
        }
    }

    /// Draw `text` left to right with a fixed `8 * scale` advance.
    pub fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        fg: Color,
        bg: Option<Color>,
        scale: u32,
    ) {
        let advance = (GLYPH_SIZE as u32).saturating_mul(scale) as i32;
        let mut cx = x;
        for c in text.chars() {
            self.draw_char(cx, y, font::glyph(c), fg, bg, scale);
            cx = cx.saturating_add(advance);
        }
    }

    // -------------------------------------------------------------------------
    // Images
    // -------------------------------------------------------------------------

    /// Draw the named image from `library`; a missing or damaged image is logged and skipped.
    pub fn image<L: ImageLibrary>(
        &mut self,
        x: i32,
        y: i32,
        library: &mut L,
        name: &str,
    ) {
        let Some(mut reader) = library.open(name) else {
            warn!("image {} not found", name);
            return;
        };
        if let Err(e) = self.blit_image(x, y, &mut reader) {
            warn!("image {}: {}", name, e);
        }
    }

    /// Stream a raw RGB565 image (`>HH` width/height header then pixels) with its
    /// top-left corner at `(x, y)`.
    ///
    /// Images that stick out of the surface are clipped row by row. A body shorter
    /// than `width * height` pixels is completed with black so the window always
    /// receives its full pixel count.
    pub fn blit_image<R: Read>(
        &mut self,
        x: i32,
        y: i32,
        reader: &mut R,
    ) -> Result<(), ImageError> {
        let mut header = [0u8; IMAGE_HEADER];
        reader.read_exact(&mut header).map_err(|e| match e {
            ReadExactError::UnexpectedEof => ImageError::MissingHeader,
            ReadExactError::Other(_) => ImageError::Read,
        })?;
        let w = i32::from(u16::from_be_bytes([header[0], header[1]]));
        let h = i32::from(u16::from_be_bytes([header[2], header[3]]));
        if w == 0 || h == 0 {
            return Ok(());
        }

        let (x1, y1) = (x.saturating_add(w - 1), y.saturating_add(h - 1));
        let Some(window_px) = self.clip_window(x, y, x1, y1) else {
            return Ok(());
        };

        // Visible byte range within each source row, and the visible rows.
        let row_bytes = w as usize * BYTES_PER_PIXEL;
        let vis_from = (0.max(-x) as usize * BYTES_PER_PIXEL).min(row_bytes);
        let vis_to = ((i32::from(self.width) - x).clamp(0, w) as usize) * BYTES_PER_PIXEL;
        let first_row = 0.max(-y) as usize;
        let end_row = (i32::from(self.height) - y).clamp(0, h) as usize;
        let unclipped = vis_from == 0 && vis_to == row_bytes && first_row == 0 && end_row == h as usize;

        let total = row_bytes * h as usize;
        let mut pos = 0usize;
        let mut streamed = 0usize;
        let mut chunk = [0u8; IMAGE_CHUNK];
        let mut outcome = Ok(());

        while pos < total && pos / row_bytes < end_row {
            let want = (total - pos).min(IMAGE_CHUNK);
            let n = match reader.read(&mut chunk[..want]) {
                Ok(0) => {
                    outcome = Err(ImageError::Truncated);
                    break;
                }
                Ok(n) => n,
                Err(_) => {
                    outcome = Err(ImageError::Read);
                    break;
                }
            };
            let data = &chunk[..n];

            if unclipped {
                // Whole image on screen: forward raw chunks.
                self.sink.stream(data).ok();
                streamed += n;
            } else {
                let mut off = 0;
                while off < n {
                    let at = pos + off;
                    let (row, col) = (at / row_bytes, at % row_bytes);
                    let take = (row_bytes - col).min(n - off);
                    if (first_row..end_row).contains(&row) {
                        let from = col.max(vis_from);
                        let to = (col + take).min(vis_to);
                        if from < to {
                            self.sink.stream(&data[off + from - col..off + to - col]).ok();
                            streamed += to - from;
                        }
                    }
                    off += take;
                }
            }
            pos += n;
        }

        let owed = window_px as usize * BYTES_PER_PIXEL;
        if streamed < owed {
            if outcome.is_ok() {
                outcome = Err(ImageError::Truncated);
            }
            if streamed % BYTES_PER_PIXEL != 0 {
                self.sink.stream(&[0]).ok();
                streamed += 1;
            }
            self.flood(Color::from_native([0, 0]), ((owed - streamed) / BYTES_PER_PIXEL) as u32);
        }
        outcome
    }
}

/// Range of step offsets `k` for which `start + dir * k` lies in `0..len`.
fn visible_offsets(
    start: i64,
    dir: i64,
    len: i64,
) -> (i64, i64) {
    if dir > 0 { (-start, len - 1 - start) } else { (start - (len - 1), start) }
}

/// `n / d` rounded up, for `n >= 0` and `d > 0`.
fn ceil_div(
    n: i128,
    d: i128,
) -> i128 {
    (n + d - 1) / d
}

/// Clamp into `i32`. Anything clamped is far off any surface, so clipping is unchanged.
fn narrow(v: i64) -> i32 { v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32 }

/// X of the edge `a -> b` on row `y`, floored. Requires `a.1 != b.1`.
fn edge_x(
    a: (i32, i32),
    b: (i32, i32),
    y: i32,
) -> i32 {
    let (ax, ay) = (i64::from(a.0), i64::from(a.1));
    let (bx, by) = (i64::from(b.0), i64::from(b.1));
    let (num, den) = ((bx - ax) * (i64::from(y) - ay), by - ay);
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    (ax + num.div_euclid(den)) as i32
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;
    use crate::color::ColorModel;
    use crate::sink::{FrameBuffer, Window};

    const W: u16 = 64;
    const H: u16 = 64;

    fn ink() -> Color { ColorModel::new().rgb(255, 255, 255) }

    fn paper() -> Color { ColorModel::new().rgb(0, 0, 0) }

    /// Run `draw` on a blank 64x64 surface and return the inked pixels.
    fn render(draw: impl FnOnce(&mut Rasterizer<FrameBuffer<'_>>, Color)) -> BTreeSet<(i32, i32)> {
        let mut mem = vec![0u8; W as usize * H as usize * BYTES_PER_PIXEL];
        let fb = FrameBuffer::new(&mut mem, W, H).unwrap();
        let mut raster = Rasterizer::new(fb, W, H);
        draw(&mut raster, ink());
        let fb = raster.into_inner();
        assert_eq!(fb.window_remaining(), 0, "window left incomplete");
        assert_eq!(fb.dropped(), 0, "pixels streamed past a window");
        fb.find(ink()).map(|(x, y)| (i32::from(x), i32::from(y))).collect()
    }

    /// Sink that records the pixel sequence produced by 1x1 windows.
    #[derive(Default)]
    struct PointRecorder {
        windows: Vec<Window>,
    }

    impl PixelSink for PointRecorder {
        type Error = ();

        fn set_window(
            &mut self,
            x0: u16,
            y0: u16,
            x1: u16,
            y1: u16,
        ) -> Result<(), ()> {
            self.windows.push(Window::new(x0, y0, x1, y1));
            Ok(())
        }

        fn stream(
            &mut self,
            _bytes: &[u8],
        ) -> Result<(), ()> {
            Ok(())
        }
    }

    fn image_bytes(
        w: u16,
        h: u16,
        px: impl Fn(u16, u16) -> Color,
    ) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&w.to_be_bytes());
        out.extend_from_slice(&h.to_be_bytes());
        for y in 0..h {
            for x in 0..w {
                out.extend_from_slice(&px(x, y).native());
            }
        }
        out
    }

    // =========================================================================
    // Runs and clipping
    // =========================================================================

    #[test]
    fn test_hline_normalizes_order() {
        let lit = render(|r, c| r.hline(5, 2, 10, c));
        let expected: BTreeSet<_> = (2..=5).map(|x| (x, 10)).collect();
        assert_eq!(lit, expected);
    }

    #[test]
    fn test_vline_normalizes_order() {
        let lit = render(|r, c| r.vline(9, 7, 3, c));
        let expected: BTreeSet<_> = (7..=9).map(|y| (3, y)).collect();
        assert_eq!(lit, expected);
    }

    #[test]
    fn test_hline_is_single_window() {
        let mut sink = PointRecorder::default();
        Rasterizer::new(&mut sink, W, H).hline(40, 1, 0, ink());
        assert_eq!(sink.windows, vec![Window::new(1, 0, 40, 0)]);
    }

    #[test]
    fn test_runs_are_clipped() {
        let lit = render(|r, c| {
            r.hline(-5, 2, 0, c);
            r.vline(60, 70, 63, c);
            r.hline(-10, -1, 5, c);
            r.pixel(-1, 3, c);
            r.pixel(64, 3, c);
        });
        let mut expected: BTreeSet<_> = (0..=2).map(|x| (x, 0)).collect();
        expected.extend((60..64).map(|y| (63, y)));
        assert_eq!(lit, expected);
    }

    #[test]
    fn test_fill_rect_and_outline() {
        let filled = render(|r, c| r.fill_rect(1, 1, 3, 2, c));
        assert_eq!(filled.len(), 6);
        assert!(filled.contains(&(3, 2)));

        let outline = render(|r, c| r.rect(0, 0, 4, 4, c));
        assert_eq!(outline.len(), 12);
        assert!(!outline.contains(&(1, 1)));
    }

    #[test]
    fn test_degenerate_rects_are_noops() {
        assert!(render(|r, c| r.fill_rect(3, 3, 0, 5, c)).is_empty());
        assert!(render(|r, c| r.rect(3, 3, 4, -1, c)).is_empty());
    }

    #[test]
    fn test_fill_covers_surface() {
        assert_eq!(render(|r, c| r.fill(c)).len(), W as usize * H as usize);
    }

    // =========================================================================
    // Lines
    // =========================================================================

    #[test]
    fn test_line_diagonal() {
        let lit = render(|r, c| r.line(0, 0, 3, 3, c));
        let expected: BTreeSet<_> = (0..=3).map(|i| (i, i)).collect();
        assert_eq!(lit, expected);
    }

    #[test]
    fn test_line_fully_offscreen_is_skipped() {
        let mut sink = PointRecorder::default();
        Rasterizer::new(&mut sink, W, H).line(-100, -5, -3, -90, ink());
        assert!(sink.windows.is_empty());
    }

    #[test]
    fn test_line_long_span_walks_only_visible_part() {
        let mut sink = PointRecorder::default();
        Rasterizer::new(&mut sink, W, H).line(-1_000_000_000, 5, 1_000_000_000, 6, ink());
        // The minor step happens at the midpoint, which is x = 0
        let expected: Vec<_> = (0..W).map(|x| Window::new(x, 6, x, 6)).collect();
        assert_eq!(sink.windows, expected);
    }

    #[test]
    fn test_line_extreme_endpoints() {
        let mut sink = PointRecorder::default();
        let mut raster = Rasterizer::new(&mut sink, W, H);
        raster.line(i32::MIN, i32::MIN, i32::MAX, i32::MAX, ink());
        raster.line(i32::MAX, i32::MIN, i32::MIN, i32::MAX - 1, ink());
        assert!(sink.windows.len() <= 2 * W as usize + 2);
        assert!(sink.windows.iter().all(|w| w.area() == 1 && w.x1 < W && w.y1 < H));
    }

    /// Points plotted by `line`, in order.
    fn line_points(
        width: u16,
        height: u16,
        from: (i32, i32),
        to: (i32, i32),
    ) -> Vec<(i32, i32)> {
        let mut sink = PointRecorder::default();
        Rasterizer::new(&mut sink, width, height).line(from.0, from.1, to.0, to.1, ink());
        sink.windows.iter().map(|w| (i32::from(w.x0), i32::from(w.y0))).collect()
    }

    proptest! {
        #[test]
        fn test_clipped_line_matches_unclipped_walk(
            x0 in -300i32..364, y0 in -300i32..364, x1 in -300i32..364, y1 in -300i32..364,
        ) {
            prop_assume!(x0 != x1 && y0 != y1);
            const SHIFT: i32 = 400;
            let clipped = line_points(W, H, (x0, y0), (x1, y1));
            let reference: Vec<_> = line_points(1024, 1024, (x0 + SHIFT, y0 + SHIFT), (x1 + SHIFT, y1 + SHIFT))
                .into_iter()
                .map(|(x, y)| (x - SHIFT, y - SHIFT))
                .filter(|&(x, y)| (0..i32::from(W)).contains(&x) && (0..i32::from(H)).contains(&y))
                .collect();
            prop_assert_eq!(clipped, reference);
        }

        #[test]
        fn test_line_is_connected_path(
            x0 in 0i32..64, y0 in 0i32..64, x1 in 0i32..64, y1 in 0i32..64,
        ) {
            prop_assume!(x0 != x1 && y0 != y1);
            let mut sink = PointRecorder::default();
            Rasterizer::new(&mut sink, W, H).line(x0, y0, x1, y1, ink());

            let path: Vec<(i32, i32)> = sink
                .windows
                .iter()
                .map(|w| {
                    assert_eq!(w.area(), 1);
                    (i32::from(w.x0), i32::from(w.y0))
                })
                .collect();
            prop_assert_eq!(path.first().copied(), Some((x0, y0)));
            prop_assert_eq!(path.last().copied(), Some((x1, y1)));
            for pair in path.windows(2) {
                let step = (pair[1].0 - pair[0].0).abs().max((pair[1].1 - pair[0].1).abs());
                prop_assert_eq!(step, 1);
            }
            let unique: BTreeSet<_> = path.iter().collect();
            prop_assert_eq!(unique.len(), path.len());
        }
    }

    // =========================================================================
    // Circles
    // =========================================================================

    #[test]
    fn test_circle_degenerate_radii() {
        assert!(render(|r, c| r.circle(10, 10, -1, c, false)).is_empty());
        assert_eq!(render(|r, c| r.circle(10, 10, 0, c, true)), BTreeSet::from([(10, 10)]));
    }

    #[test]
    fn test_circle_outline_has_poles() {
        let lit = render(|r, c| r.circle(30, 30, 10, c, false));
        for pole in [(20, 30), (40, 30), (30, 20), (30, 40)] {
            assert!(lit.contains(&pole), "missing pole {pole:?}");
        }
        assert!(!lit.contains(&(30, 30)));
    }

    #[test]
    fn test_circle_extreme_centre_and_radius() {
        assert!(render(|r, c| r.circle(i32::MIN + 5, 10, 10, c, true)).is_empty());
        assert!(render(|r, c| r.circle(i32::MAX - 5, 10, 10, c, false)).is_empty());
        assert!(render(|r, c| r.circle(i32::MIN, i32::MIN, i32::MAX, c, true)).is_empty());
        assert!(render(|r, c| r.circle(-2_000_000_000, 0, 1_000_000_000, c, true)).is_empty());
        // Surface well inside a huge circle: empty ring, solid disc
        assert!(render(|r, c| r.circle(10, 10, i32::MAX, c, false)).is_empty());
        assert_eq!(render(|r, c| r.circle(10, 10, i32::MAX, c, true)).len(), W as usize * H as usize);
    }

    #[test]
    fn test_circle_clips_at_edges() {
        let lit = render(|r, c| r.circle(0, 0, 5, c, true));
        assert!(lit.contains(&(0, 0)));
        assert!(lit.iter().all(|&(x, y)| x >= 0 && y >= 0));
    }

    proptest! {
        #[test]
        fn test_circle_outline_symmetric_and_round(cx in 20i32..44, cy in 20i32..44, r in 1i32..20) {
            let lit = render(|ras, c| ras.circle(cx, cy, r, c, false));
            for &(x, y) in &lit {
                let (dx, dy) = (x - cx, y - cy);
                let d = f64::from(dx * dx + dy * dy).sqrt();
                prop_assert!((d - f64::from(r)).abs() <= 1.0, "({}, {}) at distance {}", x, y, d);
                prop_assert!(lit.contains(&(cx - dx, cy + dy)));
                prop_assert!(lit.contains(&(cx + dx, cy - dy)));
                prop_assert!(lit.contains(&(cx - dx, cy - dy)));
            }
        }

        #[test]
        fn test_circle_fill_is_solid(cx in 20i32..44, cy in 20i32..44, r in 1i32..20) {
            let lit = render(|ras, c| ras.circle(cx, cy, r, c, true));
            for y in cy - r..=cy + r {
                let row: Vec<i32> = lit.iter().filter(|p| p.1 == y).map(|p| p.0).collect();
                prop_assert!(!row.is_empty(), "row {} empty", y);
                let (lo, hi) = (row[0], row[row.len() - 1]);
                prop_assert_eq!(row.len() as i32, hi - lo + 1);
                prop_assert_eq!(cx - lo, hi - cx);
            }
            prop_assert!(lit.iter().all(|p| (p.1 - cy).abs() <= r));
        }
    }

    // =========================================================================
    // Triangles
    // =========================================================================

    #[test]
    fn test_triangle_outline_hits_vertices() {
        let lit = render(|r, c| r.triangle((2, 2), (20, 5), (8, 30), c, false));
        for v in [(2, 2), (20, 5), (8, 30)] {
            assert!(lit.contains(&v));
        }
        assert!(!lit.contains(&(10, 12)));
    }

    #[test]
    fn test_triangle_degenerate_fills() {
        assert_eq!(render(|r, c| r.triangle((5, 5), (5, 5), (5, 5), c, true)), BTreeSet::from([(5, 5)]));
        let flat = render(|r, c| r.triangle((9, 4), (2, 4), (5, 4), c, true));
        assert_eq!(flat, (2..=9).map(|x| (x, 4)).collect::<BTreeSet<_>>());
        // Collinear vertices must not panic or invert spans
        let diag = render(|r, c| r.triangle((0, 0), (4, 4), (8, 8), c, true));
        assert!(diag.contains(&(4, 4)));
    }

    #[test]
    fn test_triangle_flat_top_and_bottom() {
        let flat_top = render(|r, c| r.triangle((0, 0), (10, 0), (5, 10), c, true));
        assert_eq!(flat_top.iter().filter(|p| p.1 == 0).count(), 11);
        assert!(flat_top.contains(&(5, 10)));

        let flat_bottom = render(|r, c| r.triangle((5, 0), (0, 10), (10, 10), c, true));
        assert_eq!(flat_bottom.iter().filter(|p| p.1 == 10).count(), 11);
        assert!(flat_bottom.contains(&(5, 0)));
    }

    /// Exact horizontal extent of the triangle on row `y`, if it crosses it.
    fn row_extent(
        v: [(i32, i32); 3],
        y: i32,
    ) -> Option<(f64, f64)> {
        let mut xs = Vec::new();
        for (a, b) in [(v[0], v[1]), (v[1], v[2]), (v[2], v[0])] {
            let (lo, hi) = (a.1.min(b.1), a.1.max(b.1));
            if y < lo || y > hi {
                continue;
            }
            if a.1 == b.1 {
                xs.extend([f64::from(a.0), f64::from(b.0)]);
            } else {
                let t = f64::from(y - a.1) / f64::from(b.1 - a.1);
                xs.push(f64::from(a.0) + t * f64::from(b.0 - a.0));
            }
        }
        let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (lo <= hi).then_some((lo, hi))
    }

    fn orient(
        a: (i32, i32),
        b: (i32, i32),
        p: (i32, i32),
    ) -> i64 {
        i64::from(b.0 - a.0) * i64::from(p.1 - a.1) - i64::from(b.1 - a.1) * i64::from(p.0 - a.0)
    }

    proptest! {
        #[test]
        fn test_triangle_fill_covers_interior(
            v0 in (0i32..64, 0i32..64), v1 in (0i32..64, 0i32..64), v2 in (0i32..64, 0i32..64),
        ) {
            let lit = render(|r, c| r.triangle(v0, v1, v2, c, true));
            let v = [v0, v1, v2];

            for y in 0..64 {
                for x in 0..64 {
                    let p = (x, y);
                    let (d0, d1, d2) = (orient(v0, v1, p), orient(v1, v2, p), orient(v2, v0, p));
                    let inside = (d0 > 0 && d1 > 0 && d2 > 0) || (d0 < 0 && d1 < 0 && d2 < 0);
                    if inside {
                        prop_assert!(lit.contains(&p), "interior {:?} not plotted", p);
                    }
                }
            }
            for &(x, y) in &lit {
                let extent = row_extent(v, y);
                prop_assert!(extent.is_some(), "row {} outside triangle", y);
                let (lo, hi) = extent.unwrap_or_default();
                let px = f64::from(x);
                prop_assert!(px > lo - 1.0 - 1e-9 && px <= hi + 1e-9, "({}, {}) outside [{}, {}]", x, y, lo, hi);
            }
        }
    }

    // =========================================================================
    // Text
    // =========================================================================

    #[test]
    fn test_draw_char_matches_glyph_bits() {
        let g = font::glyph('A');
        let lit = render(|r, c| r.draw_char(10, 20, g, c, None, 1));
        let expected: BTreeSet<_> = (0..8u32)
            .flat_map(|row| (0..8u32).map(move |col| (col, row)))
            .filter(|&(col, row)| font::is_set(g, col, row))
            .map(|(col, row)| (10 + col as i32, 20 + row as i32))
            .collect();
        assert_eq!(lit, expected);
    }

    #[test]
    fn test_draw_char_upscaled_blocks() {
        let lit = render(|r, c| r.draw_char(0, 0, &font::CURSOR, c, None, 3));
        assert_eq!(lit.len(), 24 * 24);
        assert!(render(|r, c| r.draw_char(0, 0, &font::CURSOR, c, None, 0)).is_empty());
    }

    #[test]
    fn test_draw_char_background() {
        let mut mem = vec![0u8; W as usize * H as usize * BYTES_PER_PIXEL];
        let fb = FrameBuffer::new(&mut mem, W, H).unwrap();
        let mut raster = Rasterizer::new(fb, W, H);
        let bg = ColorModel::new().rgb(0, 0, 255);
        raster.draw_char(0, 0, font::glyph(' '), ink(), Some(bg), 2);
        let fb = raster.into_inner();
        assert_eq!(fb.find(bg).count(), 16 * 16);
        assert_eq!(fb.pixel(16, 0), Some(paper()));
    }

    #[test]
    fn test_transparent_char_keeps_underlay() {
        let lit = render(|r, c| {
            r.fill_rect(0, 0, 8, 8, c);
            r.draw_char(0, 0, font::glyph('.'), ColorModel::new().rgb(255, 0, 0), None, 1);
        });
        // '.' lights four pixels, the rest of the cell keeps the fill
        assert_eq!(lit.len(), 64 - 4);
    }

    #[test]
    fn test_draw_text_advance() {
        let lit = render(|r, c| r.draw_text(4, 0, "||", c, None, 2));
        // '|' occupies columns 3-4 of each cell: x = 4 + 6..10 and 4 + 16 + 6..10
        let xs: BTreeSet<i32> = lit.iter().map(|p| p.0).collect();
        assert_eq!(xs, BTreeSet::from([10, 11, 12, 13, 26, 27, 28, 29]));
    }

    // =========================================================================
    // Images
    // =========================================================================

    #[test]
    fn test_blit_image_in_bounds() {
        let red = ColorModel::new().rgb(255, 0, 0);
        let data = image_bytes(3, 2, |_, _| red);
        let mut mem = vec![0u8; W as usize * H as usize * BYTES_PER_PIXEL];
        let fb = FrameBuffer::new(&mut mem, W, H).unwrap();
        let mut raster = Rasterizer::new(fb, W, H);
        assert_eq!(raster.blit_image(5, 6, &mut data.as_slice()), Ok(()));
        let fb = raster.into_inner();
        let lit: BTreeSet<_> = fb.find(red).collect();
        assert_eq!(lit.len(), 6);
        assert!(lit.contains(&(5, 6)) && lit.contains(&(7, 7)));
        assert_eq!(fb.window_remaining(), 0);
    }

    #[test]
    fn test_blit_image_large_uses_chunks() {
        // 20x20 image = 800 body bytes, streamed in 256-byte chunks
        let model = ColorModel::new();
        let data = image_bytes(20, 20, |x, y| model.rgb((x * 12) as u8, (y * 12) as u8, 0));
        let mut mem = vec![0u8; W as usize * H as usize * BYTES_PER_PIXEL];
        let fb = FrameBuffer::new(&mut mem, W, H).unwrap();
        let mut raster = Rasterizer::new(fb, W, H);
        assert_eq!(raster.blit_image(0, 0, &mut data.as_slice()), Ok(()));
        let fb = raster.into_inner();
        assert_eq!(fb.pixel(19, 19), Some(model.rgb(228, 228, 0)));
        assert_eq!(fb.pixel(7, 3), Some(model.rgb(84, 36, 0)));
    }

    #[test]
    fn test_blit_image_clipped() {
        let model = ColorModel::new();
        let data = image_bytes(4, 4, |x, y| model.rgb((x * 60) as u8, (y * 60) as u8, 255));
        let mut mem = vec![0u8; W as usize * H as usize * BYTES_PER_PIXEL];
        let fb = FrameBuffer::new(&mut mem, W, H).unwrap();
        let mut raster = Rasterizer::new(fb, W, H);
        assert_eq!(raster.blit_image(-2, 62, &mut data.as_slice()), Ok(()));
        let fb = raster.into_inner();
        // Source (2, 0) lands at (0, 62); source (3, 1) at (1, 63)
        assert_eq!(fb.pixel(0, 62), Some(model.rgb(120, 0, 255)));
        assert_eq!(fb.pixel(1, 63), Some(model.rgb(180, 60, 255)));
        assert_eq!(fb.window_remaining(), 0);
        assert_eq!(fb.dropped(), 0);
    }

    #[test]
    fn test_blit_image_truncated_is_padded() {
        let mut data = image_bytes(4, 4, |_, _| ink());
        data.truncate(IMAGE_HEADER + 5 * BYTES_PER_PIXEL + 1);
        let mut mem = vec![0x12u8; W as usize * H as usize * BYTES_PER_PIXEL];
        let fb = FrameBuffer::new(&mut mem, W, H).unwrap();
        let mut raster = Rasterizer::new(fb, W, H);
        assert_eq!(raster.blit_image(0, 0, &mut data.as_slice()), Err(ImageError::Truncated));
        let fb = raster.into_inner();
        assert_eq!(fb.find(ink()).count(), 5);
        assert_eq!(fb.pixel(3, 3), Some(paper()));
        assert_eq!(fb.window_remaining(), 0);
    }

    #[test]
    fn test_blit_image_missing_header() {
        let mut sink = PointRecorder::default();
        let mut raster = Rasterizer::new(&mut sink, W, H);
        assert_eq!(raster.blit_image(0, 0, &mut [0u8, 4, 0].as_slice()), Err(ImageError::MissingHeader));
        assert!(sink.windows.is_empty());
    }

    #[test]
    fn test_image_library_lookup() {
        let red = ColorModel::new().rgb(255, 0, 0);
        let splash = image_bytes(2, 2, |_, _| red);
        let entries = [("splash.565", splash.as_slice())];
        let mut library = StaticImages::new(&entries);

        let mut sink = PointRecorder::default();
        let mut raster = Rasterizer::new(&mut sink, W, H);
        raster.image(0, 0, &mut library, "missing.565");
        raster.image(1, 1, &mut library, "splash.565");
        assert_eq!(sink.windows, vec![Window::new(1, 1, 2, 2)]);
    }
}
