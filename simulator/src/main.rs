//! Thermograph simulator for desktop.
//!
//! Runs the same dashboard loop as the firmware against a simulated climate
//! sensor, a `history.txt` record in the working directory and an optional
//! `splash.565` image. Closing the window saves the history.

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod climate;
mod storage;
mod timing;

use std::ops::ControlFlow;
use std::thread;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use embedded_hal::delay::DelayNs;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thermograph_common::color::ColorModel;
use thermograph_common::config::{HISTORY_CAPACITY, SCREEN_HEIGHT, SCREEN_WIDTH};
use thermograph_common::dashboard::{Clock, CycleOutcome, Dashboard, Devices, Pacer};
use thermograph_common::diagnostics::DiagnosticLog;
use thermograph_common::history::HistoryStore;
use thermograph_common::raster::Rasterizer;
use thermograph_common::screens::Theme;
use thermograph_common::sink::DrawTargetSink;

use crate::climate::SimulatedClimate;
use crate::storage::{FileImages, FileStorage};
use crate::timing::simulator_config;

const HISTORY_FILE: &str = "history.txt";

/// Every n-th simulated read fails, exercising the cooldown path.
const FAIL_EVERY: u32 = 25;

struct StdClock(Instant);

impl Clock for StdClock {
    fn now_ms(&self) -> u64 { self.0.elapsed().as_millis() as u64 }
}

struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(
        &mut self,
        ns: u32,
    ) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

fn print_log(log: &mut DiagnosticLog) {
    for entry in log.drain() {
        eprintln!("[{}] {}", entry.level.prefix(), entry.message);
    }
}

/// Drain window events; `Break` on close.
fn pump_events(window: &mut Window) -> ControlFlow<()> {
    let mut flow = ControlFlow::Continue(());
    for ev in window.events() {
        if let SimulatorEvent::Quit = ev {
            flow = ControlFlow::Break(());
        }
    }
    flow
}

fn main() {
    let display: SimulatorDisplay<Rgb565> =
        SimulatorDisplay::new(Size::new(u32::from(SCREEN_WIDTH), u32::from(SCREEN_HEIGHT)));
    let output_settings = OutputSettingsBuilder::new().scale(4).build();
    let mut window = Window::new("Thermograph Sim", &output_settings);

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut devices = Devices::new(
        SimulatedClimate::new(ChaCha8Rng::seed_from_u64(seed ^ 0x5eed), FAIL_EVERY),
        Rasterizer::new(DrawTargetSink::new(display), SCREEN_WIDTH, SCREEN_HEIGHT),
        HistoryStore::new(FileStorage::new(HISTORY_FILE)),
        FileImages::new("."),
    );

    let config = simulator_config();
    let theme = Theme::c64(&ColorModel::new());
    let mut dashboard = Dashboard::<HISTORY_CAPACITY>::new(config, theme);
    dashboard.start(&mut devices);
    print_log(dashboard.log_mut());
    window.update(devices.raster.sink_mut().target());

    let clock = StdClock(Instant::now());
    let mut delay = StdDelay;
    let period = Pacer::new(config.sampling_period_ms, config.slice_ms);
    let cooldown = Pacer::new(config.sensor_cooldown_ms, config.slice_ms);

    loop {
        let start = clock.now_ms();
        let outcome = dashboard.run_cycle(&mut devices, &mut rng);
        print_log(dashboard.log_mut());
        window.update(devices.raster.sink_mut().target());

        let flow = match outcome {
            CycleOutcome::SensorFailed(_) => cooldown.wait(&clock, &mut delay, clock.now_ms(), || pump_events(&mut window)),
            CycleOutcome::Completed(_) => period.wait(&clock, &mut delay, start, || pump_events(&mut window)),
        };
        if flow.is_break() {
            break;
        }
    }

    match dashboard.persist(&mut devices.store) {
        Ok(()) => eprintln!("history saved to {HISTORY_FILE}"),
        Err(e) => eprintln!("history not saved: {e}"),
    }
}
