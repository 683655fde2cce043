//! EcoPulse core: the metrics simulator and log feed, free of any runtime.
//!
//! This crate owns the gauge set, the bounded log feed and its message
//! catalog, the logical-time schedule, feed readings and display formatting.
//! It carries no transport, timer or network dependencies: randomness and the
//! wall clock are injected, so every behavior can be driven deterministically.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! The simulator itself is infallible; construction-time problems surface as
//! `EcoPulseError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod clock;
pub mod display;
pub mod error;
pub mod gauge;
pub mod log_feed;
pub mod reading;
pub mod schedule;
pub mod simulator;
pub mod snapshot;

/// Shared result type.
pub use error::{EcoPulseError, Result};

pub use clock::{Clock, FixedClock, SystemClock};
pub use display::{format_number, DashboardView};
pub use gauge::{Gauge, GaugeSet};
pub use log_feed::{Category, LogEntry, LogFeed, LOG_CAPACITY};
pub use reading::{FeedReading, FetchFailure, FetchOutcome};
pub use schedule::Schedule;
pub use simulator::Simulator;
pub use snapshot::Snapshot;
