use tokio::sync::watch;
use tokio::task::JoinHandle;

use ecopulse_core::error::{EcoPulseError, Result};
use ecopulse_core::Snapshot;

/// Owner side of a running engine.
pub struct EngineHandle {
    snapshots: watch::Receiver<Snapshot>,
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl EngineHandle {
    pub(super) fn new(
        snapshots: watch::Receiver<Snapshot>,
        shutdown_tx: watch::Sender<bool>,
        join: JoinHandle<()>,
    ) -> Self {
        Self {
            snapshots,
            shutdown_tx,
            join,
        }
    }

    /// A fresh receiver; the current snapshot is readable immediately.
    pub fn snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    /// Stop the engine and wait for its task. In-flight fetches are abandoned.
    pub async fn shutdown(self) -> Result<()> {
        let _ = self.shutdown_tx.send(true);
        self.join
            .await
            .map_err(|e| EcoPulseError::Internal(format!("engine task failed: {e}")))
    }
}
