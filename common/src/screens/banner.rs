//! C64 boot banner.
//!
//! Light blue border, blue screen, the BASIC banner and a finished
//! `LOAD`/`RUN` session. Shown at boot and, rarely, again as a splash.

use super::Theme;
use super::layout::{Align, Region, text_width};
use crate::config::BORDER_WIDTH;
use crate::font::GLYPH_SIZE;
use crate::raster::{ImageLibrary, Rasterizer};
use crate::sink::PixelSink;

/// Optional decorative image drawn below the typed lines.
pub const SPLASH_IMAGE: &str = "splash.565";

const BANNER: &str = "** C64 BASIC **";
const READY: &str = "READY.";
const TYPED: [&str; 2] = ["LOAD *,8,1", "RUN"];

/// Draw the banner over the whole surface.
pub fn draw_banner<S: PixelSink, L: ImageLibrary>(
    raster: &mut Rasterizer<S>,
    theme: &Theme,
    images: &mut L,
) {
    let (w, h) = (i32::from(raster.width()), i32::from(raster.height()));
    let bw = BORDER_WIDTH.min(w / 2).min(h / 2);
    let inner = Region::new(bw, bw, w - bw * 2, h - bw * 2);

    raster.fill(theme.border);
    raster.fill_rect(inner.x, inner.y, inner.width, inner.height, theme.background);

    let mut y = bw + 2;
    let (x, _) = inner.place(BANNER, 1, Align::Center, Align::Start);
    raster.draw_text(x, y, BANNER, theme.border, Some(theme.background), 1);
    y += GLYPH_SIZE * 2;

    let left = bw + 2;
    raster.draw_text(left, y, READY, theme.border, Some(theme.background), 1);
    y += GLYPH_SIZE;

    for line in TYPED {
        raster.draw_text(left, y, line, theme.border, Some(theme.background), 1);
        y += GLYPH_SIZE;
    }

    // Cursor parked on the next line
    raster.fill_rect(left, y, GLYPH_SIZE, GLYPH_SIZE, theme.border);

    raster.image(left + text_width(1, 1) + 4, y + 4, images, SPLASH_IMAGE);
}
