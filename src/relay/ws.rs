//! WebSocket handler — cursor event fan-out.
//!
//! DESIGN
//! ======
//! On upgrade, assigns a connection id, registers a per-connection queue,
//! and enters a `select!` loop:
//! - Incoming text → decode → re-encode canonically → broadcast to everyone
//! - Queued payloads from peers → forward to this socket
//!
//! The sender receives its own events back; clients filter their own id.
//! Payloads that fail to decode are dropped and logged; they never close the
//! connection.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → join (queue registered)
//! 2. First valid event teaches the relay this connection's `ClientId`;
//!    later ids on the same socket are relayed but not learned
//! 3. Close → part → broadcast `{"type":"part","cid":…}` to remaining peers

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::state::RelayState;
use crate::error::ErrorCode;
use crate::identity::ClientId;
use crate::protocol::{self, Inbound};

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<RelayState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: RelayState) {
    let conn_id = Uuid::new_v4();
    let mut peer_rx = state.join(conn_id).await;
    let peers = state.peer_count().await;
    info!(%conn_id, peers, "relay: peer connected");

    // Learned from the first valid event on this connection and kept for its
    // lifetime. Other ids sent on the same socket age out by timeout.
    let mut client_id: Option<ClientId> = None;

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        if let Some(relayed) = process_inbound_text(text.as_str()) {
                            if client_id.is_none() {
                                debug!(%conn_id, cid = %relayed.client_id, "relay: learned client id");
                                client_id = Some(relayed.client_id);
                            }
                            broadcast(&state, &relayed.payload).await;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(payload) = peer_rx.recv() => {
                if socket.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    state.part(conn_id).await;
    if let Some(id) = client_id {
        broadcast(&state, &protocol::encode_part(&id)).await;
    }
    let peers = state.peer_count().await;
    info!(%conn_id, peers, "relay: peer disconnected");
}

// =============================================================================
// INBOUND
// =============================================================================

/// A payload ready for fan-out, with the sender's id.
#[derive(Debug, Clone, PartialEq)]
pub struct Relayed {
    pub client_id: ClientId,
    pub payload: String,
}

/// Validate one inbound text frame and produce its canonical encoding.
///
/// Returns `None` for payloads that should not be relayed: anything that
/// fails to decode, and departure notices, which only the relay may issue.
#[must_use]
pub fn process_inbound_text(text: &str) -> Option<Relayed> {
    match protocol::decode(text) {
        Ok(Inbound::Cursor(event)) => Some(Relayed { payload: protocol::encode(&event), client_id: event.client_id }),
        Ok(Inbound::Part(id)) => {
            warn!(cid = %id, "relay: ignoring client-sent part notice");
            None
        }
        Err(e) => {
            warn!(code = e.error_code(), error = %e, "relay: dropping malformed payload");
            None
        }
    }
}

// =============================================================================
// BROADCAST
// =============================================================================

/// Queue a payload for every connected peer, sender included.
///
/// Best-effort: a full queue drops the payload for that peer only.
pub async fn broadcast(state: &RelayState, payload: &str) {
    let peers = state.peers.read().await;
    for (conn_id, tx) in peers.iter() {
        match tx.try_send(payload.to_owned()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!(%conn_id, "relay: peer queue full; dropping payload");
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
