//! Which history buffer the main view graphs.
//!
//! The dashboard alternates between the two on every redraw, so a stable
//! reading still shows both resolutions over consecutive changes.

/// Graph shown by the next redraw.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GraphView {
    /// Short buffer: one bar per sampling tick.
    Short,

    /// Long buffer: one bar per averaged window. Graphed by the first redraw.
    #[default]
    Long,
}

impl GraphView {
    /// Switch to the other buffer.
    #[inline]
    pub const fn toggle(self) -> Self {
        match self {
            Self::Short => Self::Long,
            Self::Long => Self::Short,
        }
    }

    /// Caption drawn under the graph.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Short => "hourly",
            Self::Long => "daily",
        }
    }
}
