//! Thermograph firmware for Raspberry Pi Pico 2 (RP2350)
//!
//! Shows temperature and humidity from a DHT22 on a 160x128 ST7789 panel, with a
//! bar graph of the last samples at two resolutions. History survives resets in
//! the last two flash sectors.
//!
//! # Architecture
//!
//! A single blocking loop ([`Dashboard::step`]): read, aggregate, redraw on
//! change, wait out the sampling period. Drawing goes straight to the panel
//! through the controller's address window, so there is no framebuffer.

#![no_std]
#![no_main]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

// Modules only used in the binary (not testable on host)
mod display;
mod sensor;
mod st7789;
mod storage;

use core::ops::ControlFlow;

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_rp::flash::Flash;
use embassy_rp::gpio::{Flex, Level, Output};
use embassy_rp::spi::Spi;
use embassy_time::{Delay, Instant};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thermograph_common::color::ColorModel;
use thermograph_common::config::{DashboardConfig, HISTORY_CAPACITY, SCREEN_HEIGHT, SCREEN_WIDTH};
use thermograph_common::dashboard::{Clock, Dashboard, Devices};
use thermograph_common::diagnostics::DiagnosticLog;
use thermograph_common::history::HistoryStore;
use thermograph_common::raster::{Rasterizer, StaticImages};
use thermograph_common::screens::Theme;
use {defmt_rtt as _, panic_probe as _};

use crate::display::display_spi_config;
use crate::sensor::Dht22;
use crate::st7789::St7789;
use crate::storage::FlashStorage;

// Program metadata for `picotool info`
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"thermograph"),
    embassy_rp::binary_info::rp_program_description!(c"C64-styled temperature/humidity display"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

/// Milliseconds since boot from the embassy time driver.
struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 { Instant::now().as_millis() }
}

/// Forward the dashboard's diagnostic lines to RTT.
fn flush_log(log: &mut DiagnosticLog) {
    for entry in log.drain() {
        info!("[{}] {}", entry.level, entry.message.as_str());
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Thermograph starting...");

    let p = embassy_rp::init(Default::default());
    let mut delay = Delay;

    // Display: SCK=14, MOSI=15, CS=13, DC=4, RESET=2, backlight=5
    let cs = Output::new(p.PIN_13, Level::High);
    let dc = Output::new(p.PIN_4, Level::Low);
    let reset = Output::new(p.PIN_2, Level::High);
    let _backlight = Output::new(p.PIN_5, Level::High);
    let spi = Spi::new_blocking_txonly(p.SPI1, p.PIN_14, p.PIN_15, display_spi_config());

    let mut panel = St7789::new(spi, dc, cs, reset);
    if let Err(e) = panel.init(&mut delay) {
        warn!("display init failed: {}", e);
    }
    info!("Display initialized");

    let flash = Flash::new_blocking(p.FLASH);
    let sensor = Dht22::new(Flex::new(p.PIN_16));

    let mut devices = Devices::new(
        sensor,
        Rasterizer::new(panel, SCREEN_WIDTH, SCREEN_HEIGHT),
        HistoryStore::new(FlashStorage::new(flash)),
        StaticImages::new(&[]),
    );

    let theme = Theme::c64(&ColorModel::new());
    let mut dashboard = Dashboard::<HISTORY_CAPACITY>::new(DashboardConfig::new(), theme);
    let status = dashboard.start(&mut devices);
    info!("History: {}", status);
    flush_log(dashboard.log_mut());

    // Boot time differs run to run by display and flash latency
    let mut rng = ChaCha8Rng::seed_from_u64(Instant::now().as_ticks());
    let clock = EmbassyClock;

    info!("Main loop starting");

    // Runs until power-down; nothing asks the pacer to stop.
    loop {
        let _ = dashboard.step(&mut devices, &mut rng, &clock, &mut delay, || ControlFlow::Continue(()));
        flush_log(dashboard.log_mut());
    }
}
