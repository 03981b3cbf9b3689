//! Value fan-out to connected WebSocket clients.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use folio_core::{PortfolioValue, ValuePublisher};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::connection::ClientConnection;
use super::events::UpdateEvent;
use crate::metrics::{WS_BROADCAST_DROPS_TOTAL, WS_CONNECTIONS_ACTIVE};

/// Registry of connected clients and the broadcaster for `update` events.
pub struct BroadcastManager {
    /// Connected clients indexed by connection ID.
    connections: RwLock<HashMap<String, Arc<ClientConnection>>>,
    value: Arc<PortfolioValue>,
}

impl BroadcastManager {
    /// Create a broadcast manager reading the current balance from `value`.
    pub fn new(value: Arc<PortfolioValue>) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            value,
        }
    }

    /// Register a connection and send it the current balance.
    ///
    /// Runs under the write lock, so no broadcast can reach the client
    /// ahead of its initial update. Returns whether the initial update
    /// was queued.
    pub async fn on_connect(&self, connection: Arc<ClientConnection>) -> bool {
        let mut conns = self.connections.write().await;
        let value = self.value.get();
        let _ = conns.insert(connection.id.clone(), Arc::clone(&connection));
        record_active(conns.len());

        let Some(json) = encode(value) else {
            return false;
        };
        let sent = connection.send(json);
        if sent {
            info!(conn_id = %connection.id, value, "client registered");
        } else {
            ::metrics::counter!(WS_BROADCAST_DROPS_TOTAL).increment(1);
            warn!(conn_id = %connection.id, "failed to queue initial update");
        }
        sent
    }

    /// Forget a connection. Unknown IDs are ignored.
    ///
    /// Returns whether the connection was registered.
    pub async fn on_disconnect(&self, connection_id: &str) -> bool {
        let mut conns = self.connections.write().await;
        let removed = conns.remove(connection_id).is_some();
        record_active(conns.len());
        if removed {
            info!(conn_id = connection_id, "client unregistered");
        }
        removed
    }

    /// Send `value` to every registered client.
    ///
    /// Best effort: a client with a full or closed queue misses this
    /// update. Returns the number of clients the update was queued for.
    pub async fn broadcast_update(&self, value: f64) -> usize {
        let Some(json) = encode(value) else {
            return 0;
        };
        let conns = self.connections.read().await;
        let mut delivered = 0;
        for conn in conns.values() {
            if conn.send(Arc::clone(&json)) {
                delivered += 1;
            } else {
                ::metrics::counter!(WS_BROADCAST_DROPS_TOTAL).increment(1);
                warn!(conn_id = %conn.id, "failed to send update to client");
            }
        }
        debug!(value, recipients = conns.len(), delivered, "broadcast update");
        delivered
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

}

#[async_trait]
impl ValuePublisher for BroadcastManager {
    async fn publish(&self, value: f64) {
        let _ = self.broadcast_update(value).await;
    }
}

#[allow(clippy::cast_precision_loss)]
fn record_active(count: usize) {
    ::metrics::gauge!(WS_CONNECTIONS_ACTIVE).set(count as f64);
}

fn encode(value: f64) -> Option<Arc<String>> {
    match UpdateEvent::new(value).to_json() {
        Ok(json) => Some(Arc::new(json)),
        Err(e) => {
            warn!(value, error = %e, "failed to serialize update");
            None
        }
    }
}
