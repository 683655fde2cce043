//! Simulator engine: the single writer of gauge and log state.
//!
//! The engine task owns the `Simulator` and a logical `Schedule`. It sleeps
//! until the next due job, runs it, and publishes a `Snapshot` on a watch
//! channel. Feed fetches run in their own tasks under a timeout and report
//! back over an mpsc channel, so every mutation still happens on the engine
//! task and a slow feed never delays a tick.

mod handle;
mod runner;

pub use handle::EngineHandle;
pub use runner::{Engine, Job};
