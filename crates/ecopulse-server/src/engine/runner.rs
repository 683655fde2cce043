use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, timeout, Instant};

use ecopulse_core::error::Result;
use ecopulse_core::{FetchFailure, FetchOutcome, Schedule, Simulator, Snapshot};

use crate::config::{EcoPulseConfig, Trigger};
use crate::feeds::FeedRegistry;
use crate::obs::ServiceMetrics;

use super::EngineHandle;

const RESULT_QUEUE: usize = 64;

/// Scheduled work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Simulator step plus per-tick feed rolls.
    Tick,
    /// Fetch the periodic feed at this registry index.
    Poll(usize),
}

struct FeedResult {
    idx: usize,
    outcome: FetchOutcome,
    elapsed: Duration,
}

pub struct Engine {
    sim: Simulator,
    schedule: Schedule<Job>,
    tick_interval: Duration,
    feeds: FeedRegistry,
    in_flight: Vec<bool>,
    metrics: Arc<ServiceMetrics>,
    snapshot_tx: watch::Sender<Snapshot>,
    results_tx: mpsc::Sender<FeedResult>,
    results_rx: mpsc::Receiver<FeedResult>,
}

impl Engine {
    /// Periodic feeds are polled at startup and then every period; the first
    /// tick happens one `tick_interval` after start.
    pub fn new(
        sim: Simulator,
        tick_interval: Duration,
        feeds: FeedRegistry,
        metrics: Arc<ServiceMetrics>,
    ) -> Result<Self> {
        let mut schedule = Schedule::new();
        schedule.every(Job::Tick, tick_interval)?;
        for (idx, feed) in feeds.iter().enumerate() {
            if let Trigger::Every(period) = feed.trigger {
                schedule.every_immediate(Job::Poll(idx), period)?;
            }
        }

        let (snapshot_tx, _) = watch::channel(sim.snapshot());
        let (results_tx, results_rx) = mpsc::channel(RESULT_QUEUE);

        Ok(Self {
            sim,
            schedule,
            tick_interval,
            in_flight: vec![false; feeds.len()],
            feeds,
            metrics,
            snapshot_tx,
            results_tx,
            results_rx,
        })
    }

    pub fn from_config(
        cfg: &EcoPulseConfig,
        feeds: FeedRegistry,
        metrics: Arc<ServiceMetrics>,
    ) -> Result<Self> {
        let sim = match cfg.simulator.seed {
            Some(seed) => Simulator::seeded(seed),
            None => Simulator::from_entropy(),
        };
        Self::new(sim, cfg.simulator.tick_interval(), feeds, metrics)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.sim.snapshot()
    }

    /// Run the engine on the current tokio runtime.
    pub fn spawn(self) -> EngineHandle {
        let snapshots = self.snapshot_tx.subscribe();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(self.run(shutdown_rx));
        EngineHandle::new(snapshots, shutdown_tx, join)
    }

    async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let origin = Instant::now();
        tracing::info!(
            tick_interval_ms = self.tick_interval.as_millis() as u64,
            feeds = self.feeds.len(),
            jobs = self.schedule.job_count(),
            "engine started"
        );

        loop {
            let wake = self.schedule.next_due().map(|d| origin + d);
            tokio::select! {
                _ = sleep_or_park(wake) => {
                    for job in self.schedule.advance_to(origin.elapsed()) {
                        self.run_job(job);
                    }
                }
                Some(result) = self.results_rx.recv() => {
                    self.on_result(result);
                }
                _ = shutdown.changed() => break,
            }
        }

        tracing::info!(ticks = self.sim.ticks(), "engine stopped");
    }

    fn run_job(&mut self, job: Job) {
        match job {
            Job::Tick => self.tick(),
            Job::Poll(idx) => self.launch(idx),
        }
    }

    fn tick(&mut self) {
        let category = self.sim.step().category;
        self.metrics.ticks.inc(&[]);
        self.metrics
            .log_appends
            .inc(&[("category", category.as_str())]);

        let rolls: Vec<(usize, f64)> = self
            .feeds
            .iter()
            .enumerate()
            .filter_map(|(idx, f)| match f.trigger {
                Trigger::PerTick(p) => Some((idx, p)),
                Trigger::Every(_) => None,
            })
            .collect();
        for (idx, p) in rolls {
            if self.sim.roll(p) {
                self.launch(idx);
            }
        }

        tracing::trace!(tick = self.sim.ticks(), "tick");
        self.publish();
    }

    /// Start a fetch unless one for the same feed is still running.
    fn launch(&mut self, idx: usize) {
        let Some(feed) = self.feeds.get(idx).cloned() else {
            return;
        };
        let source = feed.name();
        if self.in_flight[idx] {
            tracing::debug!(source, "previous fetch still in flight, skipping");
            return;
        }
        self.in_flight[idx] = true;
        self.metrics.feeds_in_flight.inc(&[("source", source)]);

        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let started = Instant::now();
            let fetch = AssertUnwindSafe(feed.source.fetch()).catch_unwind();
            let outcome = match timeout(feed.timeout, fetch).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => {
                    tracing::error!(source, "feed fetch panicked");
                    Err(FetchFailure::Transport("fetch panicked".into()))
                }
                Err(_) => Err(FetchFailure::TimedOut),
            };
            let result = FeedResult {
                idx,
                outcome,
                elapsed: started.elapsed(),
            };
            if tx.send(result).await.is_err() {
                tracing::warn!(source, "engine gone before feed result was delivered");
            }
        });
    }

    fn on_result(&mut self, result: FeedResult) {
        let Some(source) = self.feeds.get(result.idx).map(|f| f.name()) else {
            return;
        };
        self.in_flight[result.idx] = false;
        self.metrics.feeds_in_flight.dec(&[("source", source)]);
        self.metrics
            .feed_fetch_duration
            .observe(&[("source", source)], result.elapsed);

        match result.outcome {
            Ok(reading) => {
                let entry = self.sim.apply_reading(&reading);
                tracing::info!(source, message = %entry.message, "feed reading applied");
                let category = entry.category;
                self.metrics
                    .feed_fetches
                    .inc(&[("source", source), ("outcome", "ok")]);
                self.metrics
                    .log_appends
                    .inc(&[("category", category.as_str())]);
                self.publish();
            }
            Err(failure) => {
                tracing::debug!(source, error = %failure, "feed unavailable, keeping simulated values");
                self.metrics
                    .feed_fetches
                    .inc(&[("source", source), ("outcome", failure.as_label())]);
            }
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.sim.snapshot());
    }
}

async fn sleep_or_park(deadline: Option<Instant>) {
    match deadline {
        Some(t) => sleep_until(t).await,
        None => std::future::pending::<()>().await,
    }
}
