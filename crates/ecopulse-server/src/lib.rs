//! EcoPulse server library entry.
//!
//! Wires the engine, override feeds, HTTP API, WebSocket push and ops
//! endpoints together. Consumed by the binary (`main.rs`) and by integration
//! tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod engine;
pub mod feeds;
pub mod obs;
pub mod ops;
pub mod router;
pub mod transport;
