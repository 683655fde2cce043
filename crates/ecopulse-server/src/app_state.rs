//! Shared application state for the HTTP and WebSocket handlers.
//!
//! Handlers never touch the simulator. They read the latest `Snapshot` from
//! the engine's watch channel.

use std::sync::Arc;

use tokio::sync::watch;

use ecopulse_core::{Gauge, Snapshot};

use crate::config::EcoPulseConfig;
use crate::obs::ServiceMetrics;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    snapshots: watch::Receiver<Snapshot>,
    metrics: Arc<ServiceMetrics>,
}

struct AppStateInner {
    cfg: EcoPulseConfig,
}

impl AppState {
    pub fn new(
        cfg: EcoPulseConfig,
        snapshots: watch::Receiver<Snapshot>,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg }),
            snapshots,
            metrics,
        }
    }

    pub fn cfg(&self) -> &EcoPulseConfig {
        &self.inner.cfg
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver that wakes on every publish after this call.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        let mut rx = self.snapshots.clone();
        rx.mark_unchanged();
        rx
    }

    pub fn metrics(&self) -> Arc<ServiceMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    /// Current gauge values and tick count, rendered next to the registry.
    pub fn metrics_extra(&self) -> Vec<(&'static str, f64)> {
        let snap = self.snapshot();
        let mut out: Vec<(&'static str, f64)> = Gauge::ALL
            .iter()
            .map(|&g| (gauge_metric_name(g), snap.gauges.get(g)))
            .collect();
        out.push(("ecopulse_snapshot_tick", snap.tick as f64));
        out
    }
}

fn gauge_metric_name(g: Gauge) -> &'static str {
    match g {
        Gauge::AtmosphericLevel => "ecopulse_gauge_atmospheric_level",
        Gauge::DevicesConnected => "ecopulse_gauge_devices_connected",
        Gauge::TotalRemoved => "ecopulse_gauge_total_removed",
        Gauge::EfficiencyPct => "ecopulse_gauge_efficiency_pct",
        Gauge::ReductionPct => "ecopulse_gauge_reduction_pct",
        Gauge::ActiveProjects => "ecopulse_gauge_active_projects",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::config;

    #[test]
    fn metrics_extra_tracks_latest_snapshot() {
        let cfg = config::load_from_str("version: 1\n").unwrap();
        let (tx, rx) = watch::channel(Snapshot::default());
        let state = AppState::new(cfg, rx, Arc::new(ServiceMetrics::default()));

        let extra = state.metrics_extra();
        assert_eq!(extra.len(), Gauge::ALL.len() + 1);
        assert!(extra.contains(&("ecopulse_gauge_atmospheric_level", 419.5)));
        assert!(extra.contains(&("ecopulse_snapshot_tick", 0.0)));

        let mut next = Snapshot::default();
        next.tick = 4;
        tx.send_replace(next);
        assert!(state.metrics_extra().contains(&("ecopulse_snapshot_tick", 4.0)));
        assert_eq!(state.snapshot().tick, 4);
    }

    #[test]
    fn subscribe_waits_for_next_publish() {
        let cfg = config::load_from_str("version: 1\n").unwrap();
        let (tx, rx) = watch::channel(Snapshot::default());
        let state = AppState::new(cfg, rx, Arc::new(ServiceMetrics::default()));

        let sub = state.subscribe();
        assert!(!sub.has_changed().unwrap());
        tx.send_replace(Snapshot::default());
        assert!(sub.has_changed().unwrap());
    }
}
