//! Current reading plus a bar graph of one history buffer.
//!
//! ```text
//! 21.5                    45.0   <- scale 2
//! temp                   humid
//! |||||||   ||||||||
//! ||||||||||||||||||||  hourly
//! min:20.1             max:22.8
//! ```
//!
//! One bar per sample, oldest at the left. The smallest sample still gets a
//! quarter-height bar so a flat history stays visible.

use core::fmt::Write;

use heapless::String;

use super::Theme;
use super::layout::{Align, Region};
use crate::buffer::HistoryBuffer;
use crate::font::GLYPH_SIZE;
use crate::raster::Rasterizer;
use crate::sensor::Reading;
use crate::sink::PixelSink;
use crate::view::GraphView;

const VALUE_SCALE: u32 = 2;
const LABEL_Y: i32 = 18;
/// Rows kept free under the bars for the min/max footer.
const GRAPH_BOTTOM_MARGIN: i32 = 11;
/// Rows kept free above the bars for the values and labels.
const GRAPH_TOP_MARGIN: i32 = 29;
/// Share of the bar height every sample gets regardless of value.
const BAR_FLOOR: f32 = 0.25;

type Label = String<16>;

fn format_value(
    prefix: &str,
    value: f32,
) -> Label {
    let mut text = Label::new();
    // Sixteen characters cover any prefix used here and any sensor value
    write!(text, "{prefix}{value:.1}").ok();
    text
}

/// Redraw the whole surface for `reading` with `series` graphed in the color of `view`.
///
/// An empty series leaves the graph, footer and caption out.
pub fn draw_main_view<S: PixelSink, const W: usize>(
    raster: &mut Rasterizer<S>,
    theme: &Theme,
    reading: &Reading,
    view: GraphView,
    series: &HistoryBuffer<W>,
) {
    let (w, h) = (i32::from(raster.width()), i32::from(raster.height()));
    let screen = Region::new(0, 0, w, h);

    raster.fill(theme.screen);

    // =========================================================================
    // Values
    // =========================================================================

    let temperature = format_value("", reading.temperature);
    raster.draw_text(0, 0, &temperature, theme.value, None, VALUE_SCALE);
    let humidity = format_value("", reading.humidity);
    let (x, _) = screen.place(&humidity, VALUE_SCALE, Align::End, Align::Start);
    raster.draw_text(x, 0, &humidity, theme.value, None, VALUE_SCALE);

    raster.draw_text(0, LABEL_Y, "temp", theme.label, None, 1);
    let (x, _) = screen.place("humid", 1, Align::End, Align::Start);
    raster.draw_text(x, LABEL_Y, "humid", theme.label, None, 1);

    // =========================================================================
    // Graph
    // =========================================================================

    let Some((min, max)) = series.min_max() else {
        return;
    };
    let delta = max - min;
    let base = h - GRAPH_BOTTOM_MARGIN;
    let max_len = (h - GRAPH_TOP_MARGIN - GRAPH_BOTTOM_MARGIN + 1) as f32;
    let color = theme.graph(view);

    for (x, v) in series.iter().enumerate() {
        let mut len = max_len * BAR_FLOOR;
        if delta > 0.0 {
            len += (v - min) / delta * max_len * (1.0 - BAR_FLOOR);
        }
        raster.vline(base, base - len as i32, x as i32, color);
    }

    let footer_y = h - GLYPH_SIZE;
    let low = format_value("min:", min);
    raster.draw_text(0, footer_y, &low, theme.min, None, 1);
    let high = format_value("max:", max);
    let (x, _) = screen.place(&high, 1, Align::End, Align::Start);
    raster.draw_text(x, footer_y, &high, theme.max, None, 1);

    let caption = Region::new(0, h / 2, w, h / 2);
    let (x, y) = caption.place(view.title(), 1, Align::Center, Align::Center);
    raster.draw_text(x, y, view.title(), theme.title, None, 1);
}
