//! Read-only JSON endpoints over the latest snapshot.
//!
//! - `/v1/snapshot`  : raw gauge values and log
//! - `/v1/dashboard` : display strings and log

use axum::{extract::State, Json};

use ecopulse_core::{DashboardView, Snapshot};

use crate::app_state::AppState;

pub async fn snapshot(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.snapshot())
}

pub async fn dashboard(State(state): State<AppState>) -> Json<DashboardView> {
    Json(DashboardView::from(&state.snapshot()))
}
