//! Top-level facade crate for EcoPulse.
//!
//! Re-exports the simulator core and the server library so users can depend on a single crate.

pub mod core {
    pub use ecopulse_core::*;
}

pub mod server {
    pub use ecopulse_server::*;
}
