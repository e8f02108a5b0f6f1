//! The sense / aggregate / draw / pace / persist loop.
//!
//! [`Dashboard`] owns all mutable state (aggregator, graph selection, last drawn
//! fingerprint). Hardware is handed in per call through [`Devices`], so the same
//! loop drives the firmware, the simulator and the tests.
//!
//! ```ignore
//! let mut dashboard = Dashboard::<HISTORY_CAPACITY>::new(DashboardConfig::new(), theme);
//! dashboard.start(&mut devices);
//! while dashboard.step(&mut devices, &mut rng, &clock, &mut delay, || poll_quit()).is_continue() {}
//! dashboard.persist(&mut devices.store).ok();
//! ```

use core::ops::ControlFlow;

use embedded_hal::delay::DelayNs;
use rand::Rng;

use crate::aggregator::SampleAggregator;
use crate::config::DashboardConfig;
use crate::diagnostics::{DiagnosticLog, Level};
use crate::fingerprint::Fingerprint;
use crate::history::{HistoryStore, LoadStatus, RecordStorage, SaveError};
use crate::raster::{ImageLibrary, Rasterizer};
use crate::screens::{Theme, draw_banner, draw_main_view};
use crate::sensor::{Sensor, SensorError};
use crate::sink::PixelSink;
use crate::view::GraphView;

// =============================================================================
// Timing
// =============================================================================

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 { (**self).now_ms() }
}

/// Sleeps until a deadline in slices, polling between slices.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pacer {
    period_ms: u32,
    slice_ms: u32,
}

impl Pacer {
    /// A zero slice is treated as one millisecond.
    pub const fn new(
        period_ms: u32,
        slice_ms: u32,
    ) -> Self {
        Self {
            period_ms,
            slice_ms: if slice_ms == 0 { 1 } else { slice_ms },
        }
    }

    /// Wait until `period_ms` after `start_ms`.
    ///
    /// `poll` runs before every slice; returning `Break` ends the wait early and
    /// is passed through to the caller.
    pub fn wait<C: Clock, D: DelayNs>(
        &self,
        clock: &C,
        delay: &mut D,
        start_ms: u64,
        mut poll: impl FnMut() -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        let deadline = start_ms.saturating_add(u64::from(self.period_ms));
        loop {
            poll()?;
            let now = clock.now_ms();
            if now >= deadline {
                return ControlFlow::Continue(());
            }
            let slice = (deadline - now).min(u64::from(self.slice_ms));
            delay.delay_ms(slice as u32);
        }
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Everything the loop talks to.
pub struct Devices<Sn, S, St, L> {
    pub sensor: Sn,
    pub raster: Rasterizer<S>,
    pub store: HistoryStore<St>,
    pub images: L,
}

impl<Sn, S, St, L> Devices<Sn, S, St, L> {
    pub const fn new(
        sensor: Sn,
        raster: Rasterizer<S>,
        store: HistoryStore<St>,
        images: L,
    ) -> Self {
        Self {
            sensor,
            raster,
            store,
            images,
        }
    }
}

/// What a completed cycle did.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// The main view was redrawn.
    pub redrawn: bool,
    /// The banner was shown as a splash before the redraw.
    pub splash: bool,
    /// History was written to storage.
    pub persisted: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// The read failed; no state changed.
    SensorFailed(SensorError),
    Completed(CycleReport),
}

pub struct Dashboard<const W: usize> {
    config: DashboardConfig,
    theme: Theme,
    aggregator: SampleAggregator<W>,
    view: GraphView,
    last_drawn: Option<Fingerprint>,
    /// Completed cycles.
    cycles: u32,
    log: DiagnosticLog,
}

impl<const W: usize> Dashboard<W> {
    pub const fn new(
        config: DashboardConfig,
        theme: Theme,
    ) -> Self {
        Self {
            config,
            theme,
            aggregator: SampleAggregator::new(config.aggregator),
            view: GraphView::Long,
            last_drawn: None,
            cycles: 0,
            log: DiagnosticLog::new(),
        }
    }

    pub const fn config(&self) -> &DashboardConfig { &self.config }

    pub const fn aggregator(&self) -> &SampleAggregator<W> { &self.aggregator }

    /// Buffer the next redraw graphs.
    pub const fn view(&self) -> GraphView { self.view }

    pub const fn cycles(&self) -> u32 { self.cycles }

    pub fn log(&self) -> &DiagnosticLog { &self.log }

    pub fn log_mut(&mut self) -> &mut DiagnosticLog { &mut self.log }

    /// Show the boot banner and restore persisted history.
    pub fn start<Sn, S: PixelSink, St: RecordStorage, L: ImageLibrary>(
        &mut self,
        devices: &mut Devices<Sn, S, St, L>,
    ) -> LoadStatus {
        draw_banner(&mut devices.raster, &self.theme, &mut devices.images);

        let loaded = devices.store.load::<W>();
        match loaded.status {
            LoadStatus::Restored => self.log.push_fmt(
                Level::Info,
                format_args!("restored {} short, {} long", loaded.short.len(), loaded.long.len()),
            ),
            LoadStatus::Missing => self.log.push(Level::Info, "no stored history"),
            LoadStatus::Corrupted(e) => self.log.push_fmt(Level::Warn, format_args!("history discarded: {e}")),
            LoadStatus::Unreadable(e) => self.log.push_fmt(Level::Warn, format_args!("history unreadable: {e}")),
        }
        let status = loaded.status;
        self.aggregator.replace(loaded.short, loaded.long);
        self.last_drawn = None;
        status
    }

    /// One sense / aggregate / draw / persist pass, without pacing.
    pub fn run_cycle<Sn: Sensor, S: PixelSink, St: RecordStorage, L: ImageLibrary>(
        &mut self,
        devices: &mut Devices<Sn, S, St, L>,
        rng: &mut impl Rng,
    ) -> CycleOutcome {
        let reading = match devices.sensor.read() {
            Ok(reading) => reading,
            Err(e) => {
                warn!("sensor read failed: {}", e);
                self.log.push_fmt(Level::Warn, format_args!("{e}"));
                return CycleOutcome::SensorFailed(e);
            }
        };
        let fingerprint = Fingerprint::of(&reading);
        self.aggregator.ingest(reading.temperature);

        let mut report = CycleReport::default();

        let one_in = self.config.splash_one_in;
        if self.cycles > 0 && one_in > 0 && rng.random_ratio(1, one_in) {
            info!("splash");
            draw_banner(&mut devices.raster, &self.theme, &mut devices.images);
            self.last_drawn = None;
            report.splash = true;
        }

        if self.last_drawn != Some(fingerprint) {
            let series = match self.view {
                GraphView::Short => self.aggregator.short(),
                GraphView::Long => self.aggregator.long(),
            };
            draw_main_view(&mut devices.raster, &self.theme, &reading, self.view, series);
            debug!("redraw {} ({} samples)", self.view.title(), series.len());
            self.last_drawn = Some(fingerprint);
            self.view = self.view.toggle();
            report.redrawn = true;
        }

        self.cycles = self.cycles.wrapping_add(1);

        let every = self.config.persist_every;
        if every > 0 && self.cycles % every == 0 {
            match self.persist(&mut devices.store) {
                Ok(()) => report.persisted = true,
                Err(e) => {
                    warn!("history not saved: {}", e);
                    self.log.push_fmt(Level::Error, format_args!("save: {e}"));
                }
            }
        }

        CycleOutcome::Completed(report)
    }

    /// Run one cycle and pace it: a completed cycle waits out the sampling period
    /// from its start, a failed read waits the sensor cooldown.
    pub fn step<Sn: Sensor, S: PixelSink, St: RecordStorage, L: ImageLibrary, C: Clock, D: DelayNs>(
        &mut self,
        devices: &mut Devices<Sn, S, St, L>,
        rng: &mut impl Rng,
        clock: &C,
        delay: &mut D,
        poll: impl FnMut() -> ControlFlow<()>,
    ) -> ControlFlow<()> {
        let start = clock.now_ms();
        match self.run_cycle(devices, rng) {
            CycleOutcome::SensorFailed(_) => {
                Pacer::new(self.config.sensor_cooldown_ms, self.config.slice_ms).wait(clock, delay, clock.now_ms(), poll)
            }
            CycleOutcome::Completed(_) => {
                Pacer::new(self.config.sampling_period_ms, self.config.slice_ms).wait(clock, delay, start, poll)
            }
        }
    }

    /// Save both buffers now.
    pub fn persist<St: RecordStorage>(
        &mut self,
        store: &mut HistoryStore<St>,
    ) -> Result<(), SaveError> {
        store.save(self.aggregator.short(), self.aggregator.long())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
