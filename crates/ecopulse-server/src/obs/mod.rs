//! Lightweight in-process metrics.
//!
//! Engine, feed and WebSocket activity is recorded in atomics and rendered by the
//! `/metrics` handler in Prometheus text format.

pub mod metrics;

pub use metrics::ServiceMetrics;
