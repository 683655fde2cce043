//! HTTP surface driven through `tower::ServiceExt::oneshot`.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use tokio::sync::watch;
use tower::ServiceExt;

use ecopulse_core::{Simulator, Snapshot};
use ecopulse_server::app_state::AppState;
use ecopulse_server::obs::ServiceMetrics;
use ecopulse_server::{config, ops, router};

struct Harness {
    app: Router,
    tx: watch::Sender<Snapshot>,
    metrics: Arc<ServiceMetrics>,
}

fn harness() -> Harness {
    let cfg = config::load_from_str("version: 1\n").unwrap();
    let (tx, rx) = watch::channel(Simulator::seeded(3).snapshot());
    let metrics = Arc::new(ServiceMetrics::default());
    let state = AppState::new(cfg, rx, Arc::clone(&metrics));
    Harness {
        app: router::build_router(state),
        tx,
        metrics,
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let resp = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn snapshot_endpoint_serves_latest_state() {
    let h = harness();

    let (status, body) = get(&h.app, "/v1/snapshot").await;
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["tick"], 0);
    assert_eq!(v["atmosphericLevel"], 419.5);
    assert_eq!(v["devicesConnected"], 7_892_543_210u64);
    assert_eq!(v["activeProjects"], 1247);
    assert_eq!(v["logEntries"].as_array().unwrap().len(), 5);
    assert_eq!(v["logEntries"][0]["category"], "info");

    let mut sim = Simulator::seeded(3);
    sim.step();
    h.tx.send_replace(sim.snapshot());

    let (_, body) = get(&h.app, "/v1/snapshot").await;
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["tick"], 1);
    assert_eq!(v["logEntries"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn dashboard_endpoint_formats_values() {
    let h = harness();

    let (status, body) = get(&h.app, "/v1/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    let v: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(v["atmosphericLevel"], "419.50");
    assert_eq!(v["devicesConnected"], "7.89B");
    assert_eq!(v["totalRemoved"], "2.85M");
    assert_eq!(v["efficiencyPct"], "99.87%");
    assert_eq!(v["reductionPct"], "15.30%");
    assert_eq!(v["activeProjects"], "1,247");
}

#[tokio::test]
async fn ops_endpoints() {
    let h = harness();

    assert_eq!(get(&h.app, "/healthz").await, (StatusCode::OK, "ok".to_string()));
    assert_eq!(get(&h.app, "/readyz").await, (StatusCode::OK, "ready".to_string()));

    h.metrics.ticks.inc(&[]);
    let (status, body) = get(&h.app, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("ecopulse_ticks_total 1\n"));
    assert!(body.contains("ecopulse_draining 0"));
    assert!(body.contains("ecopulse_gauge_atmospheric_level 419.5"));
    assert!(body.contains("ecopulse_gauge_active_projects 1247"));

    h.metrics.set_draining();
    assert_eq!(
        get(&h.app, "/readyz").await,
        (StatusCode::SERVICE_UNAVAILABLE, "draining".to_string())
    );
    let (_, body) = get(&h.app, "/metrics").await;
    assert!(body.contains("ecopulse_draining 1"));
}

#[tokio::test(start_paused = true)]
async fn readyz_reports_draining_before_listener_closes() {
    let h = harness();
    let metrics = Arc::clone(&h.metrics);
    let drain = tokio::spawn(async move { ops::drain(&metrics, Duration::from_secs(5)).await });
    tokio::task::yield_now().await;

    // The grace period is still running and requests are still served.
    assert!(!drain.is_finished());
    assert_eq!(
        get(&h.app, "/readyz").await,
        (StatusCode::SERVICE_UNAVAILABLE, "draining".to_string())
    );
    assert_eq!(get(&h.app, "/healthz").await.0, StatusCode::OK);

    drain.await.unwrap();
    assert!(h.metrics.is_draining());
}

#[tokio::test]
async fn unknown_route_is_404() {
    let h = harness();
    let (status, _) = get(&h.app, "/v1/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
