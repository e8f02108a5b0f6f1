//! Text placement inside a rectangle.

use crate::font::GLYPH_SIZE;

/// Placement of text along one axis.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Align {
    /// Left or top.
    #[default]
    Start,
    Center,
    /// Right or bottom.
    End,
}

impl Align {
    /// Offset of an item of `size` inside `span`; truncates toward zero when centering.
    const fn offset(
        self,
        span: i32,
        size: i32,
    ) -> i32 {
        match self {
            Self::Start => 0,
            Self::Center => (span - size) / 2,
            Self::End => span - size,
        }
    }
}

/// Width in pixels of `chars` glyphs at `scale`.
pub const fn text_width(
    chars: usize,
    scale: u32,
) -> i32 {
    chars as i32 * GLYPH_SIZE * scale as i32
}

/// Area text is placed into.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub const fn new(
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Self {
        Self { x, y, width, height }
    }

    /// Top-left corner for `text` at `scale` aligned inside this region.
    pub fn place(
        &self,
        text: &str,
        scale: u32,
        x_align: Align,
        y_align: Align,
    ) -> (i32, i32) {
        let w = text_width(text.chars().count(), scale);
        let h = GLYPH_SIZE * scale as i32;
        (self.x + x_align.offset(self.width, w), self.y + y_align.offset(self.height, h))
    }
}
