//! Portable core of the Thermograph display.
//!
//! Shared by the Pico 2 firmware and the desktop simulator:
//!
//! - [`color`], [`palette`]: RGB565 native pixels and the C64 palette
//! - [`sink`]: window/stream pixel capability, in-memory [`FrameBuffer`] and
//!   an `embedded-graphics` adapter
//! - [`raster`], [`font`]: lines, circles, triangles, 8x8 text and raw images
//! - [`buffer`], [`aggregator`]: short and long history at two resolutions
//! - [`history`]: text record codec and storage backends
//! - [`screens`], [`view`]: boot banner and main view
//! - [`dashboard`]: the sampling loop tying it all together
//! - [`config`]: display geometry and timing defaults
//! - [`diagnostics`]: bounded in-memory log
//!
//! # no_std Compatibility
//!
//! The crate is `no_std` outside of tests. Enable the `defmt` feature on
//! embedded targets to route internal logging through `defmt`.

#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

#[macro_use]
mod fmt;

pub mod aggregator;
pub mod buffer;
pub mod color;
pub mod config;
pub mod dashboard;
pub mod diagnostics;
pub mod fingerprint;
pub mod font;
pub mod history;
pub mod palette;
pub mod raster;
pub mod screens;
pub mod sensor;
pub mod sink;
pub mod view;

// Re-export commonly used items
pub use aggregator::SampleAggregator;
pub use buffer::HistoryBuffer;
pub use color::{Color, ColorModel};
pub use config::*;
pub use dashboard::{Clock, CycleOutcome, CycleReport, Dashboard, Devices, Pacer};
pub use diagnostics::{DiagnosticLog, Level};
pub use history::{HistoryStore, LoadStatus, MemoryStorage, RecordStorage, StorageError};
pub use raster::{ImageLibrary, Rasterizer, StaticImages};
pub use screens::Theme;
pub use sensor::{Reading, Sensor, SensorError};
pub use sink::{DrawTargetSink, FrameBuffer, PixelSink};
pub use view::GraphView;
