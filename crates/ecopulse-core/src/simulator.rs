//! The metrics simulator: gauge set plus log feed behind one owner.
//!
//! `Simulator` is plain state with a single owner: that owner calls
//! `step`/`apply_reading`, everyone else reads a [`Snapshot`].

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::{Clock, SystemClock};
use crate::gauge::{GaugeSet, Holds};
use crate::log_feed::{Category, LogEntry, LogFeed};
use crate::reading::{FeedReading, Override};
use crate::snapshot::Snapshot;

pub struct Simulator<R = StdRng> {
    gauges: GaugeSet,
    log: LogFeed,
    holds: Holds,
    ticks: u64,
    rng: R,
    clock: Arc<dyn Clock>,
}

impl Simulator<StdRng> {
    /// Deterministic simulator on the system clock.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed), Arc::new(SystemClock))
    }

    /// Simulator seeded from the OS entropy source.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng(), Arc::new(SystemClock))
    }
}

impl<R: Rng> Simulator<R> {
    /// Initial gauge values and a log seeded with the first catalog messages.
    pub fn new(rng: R, clock: Arc<dyn Clock>) -> Self {
        Self::with_gauges(GaugeSet::default(), rng, clock)
    }

    pub fn with_gauges(gauges: GaugeSet, rng: R, clock: Arc<dyn Clock>) -> Self {
        let log = LogFeed::seeded(&clock.timestamp());
        Self {
            gauges,
            log,
            holds: Holds::default(),
            ticks: 0,
            rng,
            clock,
        }
    }

    /// Drift every gauge once. Gauges held by an override skip this tick and
    /// are released afterwards.
    pub fn tick(&mut self) {
        self.gauges.drift(&mut self.rng, &self.holds);
        self.holds.clear();
        self.ticks += 1;
    }

    /// One periodic cycle: drift, then a random catalog message.
    pub fn step(&mut self) -> &LogEntry {
        self.tick();
        self.append_random()
    }

    pub fn append_random(&mut self) -> &LogEntry {
        let ts = self.clock.timestamp();
        &self.log.append_random(&mut self.rng, &ts)[0]
    }

    pub fn append(&mut self, category: Category, message: impl Into<String>) -> &LogEntry {
        let entry = LogEntry::new(self.clock.timestamp(), category, message);
        &self.log.append(entry)[0]
    }

    /// Write the override now and keep the next tick from drifting it. A
    /// second override for the same gauge before that tick replaces the first.
    pub fn apply_override(&mut self, o: Override) -> f64 {
        self.holds.hold(o.gauge);
        self.gauges.set(o.gauge, o.value)
    }

    /// Apply a feed reading: its override (if any) and its log entry.
    pub fn apply_reading(&mut self, reading: &FeedReading) -> &LogEntry {
        if let Some(o) = reading.gauge_override() {
            self.apply_override(o);
        }
        let (category, message) = reading.log_line();
        self.append(category, message)
    }

    /// Draw a boolean that is `true` with probability `p` (clamped to [0, 1]).
    pub fn roll(&mut self, p: f64) -> bool {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self.rng.random_bool(p)
    }

    pub fn gauges(&self) -> &GaugeSet {
        &self.gauges
    }

    pub fn log(&self) -> &LogFeed {
        &self.log
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.ticks, &self.gauges, &self.log)
    }
}
