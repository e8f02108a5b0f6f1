//! Full-screen compositions drawn through the [`Rasterizer`](crate::raster::Rasterizer).
//!
//! - [`banner`]: C64-style boot banner, also reused as the occasional splash
//! - [`main_view`]: current reading plus a bar graph of one history buffer

pub mod banner;
pub mod layout;
pub mod main_view;

pub use banner::{SPLASH_IMAGE, draw_banner};
pub use main_view::draw_main_view;

use crate::color::{Color, ColorModel};
use crate::palette::{C64Color, Palette};
use crate::view::GraphView;

/// Every color the screens use, resolved once through a [`ColorModel`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Theme {
    /// Banner border and banner text.
    pub border: Color,
    /// Banner inner area.
    pub background: Color,
    /// Main view background.
    pub screen: Color,
    /// Large temperature and humidity digits.
    pub value: Color,
    /// Small captions under the values.
    pub label: Color,
    pub min: Color,
    pub max: Color,
    /// Graph caption.
    pub title: Color,
    pub short_graph: Color,
    pub long_graph: Color,
}

impl Theme {
    pub const fn c64(model: &ColorModel) -> Self {
        let palette = Palette::c64(model);
        Self {
            border: palette.get(C64Color::LightBlue),
            background: palette.get(C64Color::Blue),
            screen: palette.get(C64Color::Black),
            value: palette.get(C64Color::White),
            label: model.rgb(50, 50, 50),
            min: model.rgb(0x00, 0xcc, 0x55),
            max: model.rgb(0x88, 0x00, 0x00),
            title: model.rgb(0xcc, 0xcc, 0xcc),
            short_graph: palette.get(C64Color::Violet),
            long_graph: palette.get(C64Color::Orange),
        }
    }

    /// Bar color for the graphed buffer.
    pub const fn graph(
        &self,
        view: GraphView,
    ) -> Color {
        match view {
            GraphView::Short => self.short_graph,
            GraphView::Long => self.long_graph,
        }
    }
}
