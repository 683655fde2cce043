//! Transport layer (WebSocket push of snapshots).

pub mod ws;
