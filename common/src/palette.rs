//! The sixteen-color C64 palette used by the dashboard screens.

use crate::color::{Color, ColorModel};

/// Palette slots, in the machine's own index order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum C64Color {
    Black = 0,
    White = 1,
    Red = 2,
    Cyan = 3,
    Violet = 4,
    Green = 5,
    Blue = 6,
    Yellow = 7,
    Orange = 8,
    Brown = 9,
    LightRed = 10,
    Grey1 = 11,
    Grey2 = 12,
    LightGreen = 13,
    LightBlue = 14,
    Grey3 = 15,
}

impl C64Color {
    pub const ALL: [Self; 16] = [
        Self::Black,
        Self::White,
        Self::Red,
        Self::Cyan,
        Self::Violet,
        Self::Green,
        Self::Blue,
        Self::Yellow,
        Self::Orange,
        Self::Brown,
        Self::LightRed,
        Self::Grey1,
        Self::Grey2,
        Self::LightGreen,
        Self::LightBlue,
        Self::Grey3,
    ];

    /// Reference RGB888 value.
    pub const fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Black => (0, 0, 0),
            Self::White => (255, 255, 255),
            Self::Red => (157, 69, 60),
            Self::Cyan => (110, 199, 207),
            Self::Violet => (157, 77, 189),
            Self::Green => (92, 179, 57),
            Self::Blue => (75, 57, 176),
            Self::Yellow => (211, 223, 109),
            Self::Orange => (161, 102, 28),
            Self::Brown => (107, 81, 0),
            Self::LightRed => (204, 125, 117),
            Self::Grey1 => (96, 96, 96),
            Self::Grey2 => (138, 138, 138),
            Self::LightGreen => (162, 238, 133),
            Self::LightBlue => (137, 121, 230),
            Self::Grey3 => (179, 179, 179),
        }
    }
}

/// The palette mapped through a concrete [`ColorModel`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Palette {
    colors: [Color; 16],
}

impl Palette {
    pub const fn c64(model: &ColorModel) -> Self {
        let mut colors = [model.rgb(0, 0, 0); 16];
        let mut i = 0;
        while i < C64Color::ALL.len() {
            let (r, g, b) = C64Color::ALL[i].rgb();
            colors[i] = model.rgb(r, g, b);
            i += 1;
        }
        Self { colors }
    }

    #[inline]
    pub const fn get(
        &self,
        color: C64Color,
    ) -> Color {
        self.colors[color as usize]
    }
}
