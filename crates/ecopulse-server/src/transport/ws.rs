//! WebSocket handler.
//!
//! Pushes the current snapshot on connect and again after every engine
//! publish. Inbound frames are only used for liveness: client pings are
//! answered, text and binary frames are ignored, a close frame ends the
//! session. The server pings on `server.ws_ping_interval_ms`.

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::time::MissedTickBehavior;

use ecopulse_core::error::{EcoPulseError, Result};
use ecopulse_core::Snapshot;

use crate::app_state::AppState;

pub async fn ws_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| async move {
        let metrics = app.metrics();
        metrics.ws_sessions.inc(&[]);
        if let Err(e) = run_session(app, socket).await {
            tracing::debug!(error = %e, "ws session ended with error");
        }
        metrics.ws_sessions.dec(&[]);
    })
}

fn snapshot_frame(snap: &Snapshot) -> Result<Message> {
    serde_json::to_string(snap)
        .map(Message::Text)
        .map_err(|e| EcoPulseError::Internal(format!("snapshot encode failed: {e}")))
}

async fn run_session(app: AppState, socket: WebSocket) -> Result<()> {
    let mut updates = app.subscribe();
    let (mut ws_tx, mut ws_rx) = socket.split();

    let first = snapshot_frame(&app.snapshot())?;
    if ws_tx.send(first).await.is_err() {
        return Ok(());
    }

    let mut ping_tick = tokio::time::interval(app.cfg().server.ws_ping_interval());
    ping_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // interval fires immediately; the snapshot above already proved liveness
    ping_tick.tick().await;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    // engine stopped
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
                let frame = {
                    let snap = updates.borrow_and_update();
                    snapshot_frame(&snap)?
                };
                if ws_tx.send(frame).await.is_err() {
                    break;
                }
            }

            incoming = ws_rx.next() => {
                let Some(Ok(msg)) = incoming else { break; };
                match msg {
                    Message::Ping(payload) => {
                        if ws_tx.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    Message::Pong(_) | Message::Text(_) | Message::Binary(_) => {}
                }
            }

            _ = ping_tick.tick() => {
                if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    Ok(())
}
