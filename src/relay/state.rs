//! Shared relay state.
//!
//! DESIGN
//! ======
//! `RelayState` is injected into axum handlers via the `State` extractor. It
//! holds one bounded outbound queue per live connection, keyed by a
//! connection id the relay assigns on upgrade. The relay never interprets
//! presence; it only knows who is connected.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

/// Clone is required by axum; the peer map is shared behind an `Arc`.
#[derive(Clone)]
pub struct RelayState {
    /// Live connections: connection id -> sender for outgoing payloads.
    pub peers: Arc<RwLock<HashMap<Uuid, mpsc::Sender<String>>>>,
    /// Queue depth for each new connection.
    pub peer_queue: usize,
}

impl RelayState {
    #[must_use]
    pub fn new(peer_queue: usize) -> Self {
        Self { peers: Arc::new(RwLock::new(HashMap::new())), peer_queue: peer_queue.max(1) }
    }

    /// Register a connection and return the receiving end of its queue.
    pub async fn join(&self, conn_id: Uuid) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(self.peer_queue);
        self.peers.write().await.insert(conn_id, tx);
        rx
    }

    /// Forget a connection. Returns whether it was registered.
    pub async fn part(&self, conn_id: Uuid) -> bool {
        self.peers.write().await.remove(&conn_id).is_some()
    }

    pub async fn peer_count(&self) -> usize {
        self.peers.read().await.len()
    }
}

impl Default for RelayState {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PEER_QUEUE)
    }
}
