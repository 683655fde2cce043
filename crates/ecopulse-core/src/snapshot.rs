//! Read-only view of the simulator handed to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::gauge::GaugeSet;
use crate::log_feed::{LogEntry, LogFeed};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Completed simulator ticks.
    pub tick: u64,
    #[serde(flatten)]
    pub gauges: GaugeSet,
    pub log_entries: Vec<LogEntry>,
}

impl Snapshot {
    pub fn new(tick: u64, gauges: &GaugeSet, log: &LogFeed) -> Self {
        Self {
            tick,
            gauges: *gauges,
            log_entries: log.entries().to_vec(),
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            tick: 0,
            gauges: GaugeSet::default(),
            log_entries: Vec::new(),
        }
    }
}
