//! The six dashboard gauges and their drift rules.
//!
//! Every gauge is either bounded (clamped after each step), monotonic (only
//! ever grows) or free. Drift amounts are uniform draws; the atmospheric
//! gauge keeps a slight downward bias (0.52 vs 0.48 of `ATMOSPHERIC_DELTA`).

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Floor of the atmospheric level (ppm).
pub const ATMOSPHERIC_FLOOR: f64 = 400.0;
/// Scale of one atmospheric drift step.
pub const ATMOSPHERIC_DELTA: f64 = 0.15;
/// Closed interval of the efficiency gauge.
pub const EFFICIENCY_BOUNDS: (f64, f64) = (99.5, 99.99);
/// Closed interval of the reduction gauge.
pub const REDUCTION_BOUNDS: (f64, f64) = (10.0, 20.0);

const DEVICES_STEP_MAX: u64 = 2000;
const REMOVED_STEP_MAX: u64 = 150;
const EFFICIENCY_STEP: f64 = 0.01;
const REDUCTION_STEP: f64 = 0.05;
const PROJECTS_STEP: (i64, i64) = (-3, 6);

/// Gauge identifiers, used to address overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Gauge {
    AtmosphericLevel,
    DevicesConnected,
    TotalRemoved,
    EfficiencyPct,
    ReductionPct,
    ActiveProjects,
}

impl Gauge {
    pub const ALL: [Gauge; 6] = [
        Gauge::AtmosphericLevel,
        Gauge::DevicesConnected,
        Gauge::TotalRemoved,
        Gauge::EfficiencyPct,
        Gauge::ReductionPct,
        Gauge::ActiveProjects,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Gauge::AtmosphericLevel => "atmospheric_level",
            Gauge::DevicesConnected => "devices_connected",
            Gauge::TotalRemoved => "total_removed",
            Gauge::EfficiencyPct => "efficiency_pct",
            Gauge::ReductionPct => "reduction_pct",
            Gauge::ActiveProjects => "active_projects",
        }
    }

    fn index(self) -> usize {
        match self {
            Gauge::AtmosphericLevel => 0,
            Gauge::DevicesConnected => 1,
            Gauge::TotalRemoved => 2,
            Gauge::EfficiencyPct => 3,
            Gauge::ReductionPct => 4,
            Gauge::ActiveProjects => 5,
        }
    }
}

/// Gauges excluded from the next drift step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Holds([bool; 6]);

impl Holds {
    pub fn hold(&mut self, gauge: Gauge) {
        self.0[gauge.index()] = true;
    }

    pub fn is_held(&self, gauge: Gauge) -> bool {
        self.0[gauge.index()]
    }

    pub fn clear(&mut self) {
        self.0 = [false; 6];
    }
}

/// Current gauge values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GaugeSet {
    pub atmospheric_level: f64,
    pub devices_connected: u64,
    pub total_removed: u64,
    pub efficiency_pct: f64,
    pub reduction_pct: f64,
    pub active_projects: i64,
}

impl Default for GaugeSet {
    fn default() -> Self {
        Self {
            atmospheric_level: 419.5,
            devices_connected: 7_892_543_210,
            total_removed: 2_847_392,
            efficiency_pct: 99.87,
            reduction_pct: 15.3,
            active_projects: 1247,
        }
    }
}

impl GaugeSet {
    /// Advance every gauge not in `holds` by one random step.
    pub fn drift<R: Rng + ?Sized>(&mut self, rng: &mut R, holds: &Holds) {
        if !holds.is_held(Gauge::AtmosphericLevel) {
            let step = rng.random_range(-0.52 * ATMOSPHERIC_DELTA..0.48 * ATMOSPHERIC_DELTA);
            self.atmospheric_level = (self.atmospheric_level + step).max(ATMOSPHERIC_FLOOR);
        }
        if !holds.is_held(Gauge::DevicesConnected) {
            self.devices_connected = self
                .devices_connected
                .saturating_add(rng.random_range(0..DEVICES_STEP_MAX));
        }
        if !holds.is_held(Gauge::TotalRemoved) {
            self.total_removed = self
                .total_removed
                .saturating_add(rng.random_range(0..REMOVED_STEP_MAX));
        }
        if !holds.is_held(Gauge::EfficiencyPct) {
            let step = rng.random_range(-EFFICIENCY_STEP..EFFICIENCY_STEP);
            self.efficiency_pct = clamp(self.efficiency_pct + step, EFFICIENCY_BOUNDS);
        }
        if !holds.is_held(Gauge::ReductionPct) {
            let step = rng.random_range(-REDUCTION_STEP..REDUCTION_STEP);
            self.reduction_pct = clamp(self.reduction_pct + step, REDUCTION_BOUNDS);
        }
        if !holds.is_held(Gauge::ActiveProjects) {
            let step = rng.random_range(PROJECTS_STEP.0..=PROJECTS_STEP.1);
            self.active_projects = self.active_projects.saturating_add(step);
        }
    }

    /// Write an externally supplied value, keeping the gauge's invariants:
    /// bounded gauges are clamped and monotonic gauges are never lowered.
    /// Non-finite values are ignored. Returns the value actually stored.
    pub fn set(&mut self, gauge: Gauge, value: f64) -> f64 {
        if !value.is_finite() {
            return self.get(gauge);
        }
        match gauge {
            Gauge::AtmosphericLevel => {
                self.atmospheric_level = value.max(ATMOSPHERIC_FLOOR);
            }
            Gauge::DevicesConnected => {
                self.devices_connected = self.devices_connected.max(to_count(value));
            }
            Gauge::TotalRemoved => {
                self.total_removed = self.total_removed.max(to_count(value));
            }
            Gauge::EfficiencyPct => self.efficiency_pct = clamp(value, EFFICIENCY_BOUNDS),
            Gauge::ReductionPct => self.reduction_pct = clamp(value, REDUCTION_BOUNDS),
            Gauge::ActiveProjects => self.active_projects = value.round() as i64,
        }
        self.get(gauge)
    }

    pub fn get(&self, gauge: Gauge) -> f64 {
        match gauge {
            Gauge::AtmosphericLevel => self.atmospheric_level,
            Gauge::DevicesConnected => self.devices_connected as f64,
            Gauge::TotalRemoved => self.total_removed as f64,
            Gauge::EfficiencyPct => self.efficiency_pct,
            Gauge::ReductionPct => self.reduction_pct,
            Gauge::ActiveProjects => self.active_projects as f64,
        }
    }
}

fn clamp(v: f64, (lo, hi): (f64, f64)) -> f64 {
    v.clamp(lo, hi)
}

// `as` saturates: negatives become 0, huge values u64::MAX.
fn to_count(v: f64) -> u64 {
    v.floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn bounded_gauges_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut g = GaugeSet {
            efficiency_pct: 99.99,
            reduction_pct: 10.0,
            ..GaugeSet::default()
        };
        for _ in 0..5_000 {
            g.drift(&mut rng, &Holds::default());
            assert!((99.5..=99.99).contains(&g.efficiency_pct));
            assert!((10.0..=20.0).contains(&g.reduction_pct));
            assert!(g.atmospheric_level >= ATMOSPHERIC_FLOOR);
        }
    }

    #[test]
    fn held_gauge_does_not_move() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut g = GaugeSet::default();
        let mut holds = Holds::default();
        holds.hold(Gauge::AtmosphericLevel);
        g.drift(&mut rng, &holds);
        assert_eq!(g.atmospheric_level, 419.5);
    }

    #[test]
    fn active_projects_step_is_within_minus_three_and_six() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut g = GaugeSet::default();
        for _ in 0..1_000 {
            let before = g.active_projects;
            g.drift(&mut rng, &Holds::default());
            let d = g.active_projects - before;
            assert!((-3..=6).contains(&d), "step {d}");
        }
    }

    #[test]
    fn set_respects_invariants() {
        let mut g = GaugeSet::default();
        assert_eq!(g.set(Gauge::AtmosphericLevel, 350.0), 400.0);
        assert_eq!(g.set(Gauge::EfficiencyPct, 120.0), 99.99);
        assert_eq!(g.set(Gauge::ReductionPct, 1.0), 10.0);
        assert_eq!(g.set(Gauge::TotalRemoved, 5.0), 2_847_392.0);
        assert_eq!(g.set(Gauge::AtmosphericLevel, f64::NAN), 400.0);
        assert_eq!(g.set(Gauge::ActiveProjects, -12.4), -12.0);
    }
}
