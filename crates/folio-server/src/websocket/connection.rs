//! Per-client state shared by the session tasks and the broadcaster.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use uuid::Uuid;

/// A dashboard tab with an open socket.
///
/// The broadcaster only ever enqueues; the session's writer task owns the
/// socket and drains the queue.
pub struct ClientConnection {
    /// `conn_<uuid v7>`, unique per socket.
    pub id: String,
    tx: mpsc::Sender<Arc<String>>,
    opened_at: Instant,
    /// Milliseconds after `opened_at` of the last inbound frame.
    last_seen_ms: AtomicU64,
    dropped: AtomicU64,
}

impl ClientConnection {
    /// Wrap the sending half of a session's outbound queue.
    pub fn new(id: String, tx: mpsc::Sender<Arc<String>>) -> Self {
        Self {
            id,
            tx,
            opened_at: Instant::now(),
            last_seen_ms: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Fresh connection ID.
    pub fn generate_id() -> String {
        format!("conn_{}", Uuid::now_v7())
    }

    /// Enqueue an encoded update without waiting.
    ///
    /// A full or closed queue loses the update and bumps [`drop_count`](Self::drop_count).
    pub fn send(&self, message: Arc<String>) -> bool {
        if self.tx.try_send(message).is_ok() {
            return true;
        }
        let _ = self.dropped.fetch_add(1, Ordering::Relaxed);
        false
    }

    /// Updates this client has missed so far.
    pub fn drop_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Note that the client just sent a frame (pong, text, anything).
    pub fn mark_alive(&self) {
        let ms = u64::try_from(self.opened_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        let _ = self.last_seen_ms.fetch_max(ms, Ordering::Relaxed);
    }

    /// Time since the last inbound frame, or since the socket opened.
    pub fn idle(&self) -> Duration {
        let last_seen = Duration::from_millis(self.last_seen_ms.load(Ordering::Relaxed));
        self.opened_at.elapsed().saturating_sub(last_seen)
    }

    /// Time since the socket opened.
    pub fn age(&self) -> Duration {
        self.opened_at.elapsed()
    }
}

impl std::fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConnection")
            .field("id", &self.id)
            .field("idle", &self.idle())
            .field("dropped", &self.drop_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(capacity: usize) -> (ClientConnection, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (ClientConnection::new("conn_test".into(), tx), rx)
    }

    #[test]
    fn ids_carry_prefix_and_differ() {
        let first = ClientConnection::generate_id();
        let second = ClientConnection::generate_id();
        assert!(first.starts_with("conn_"), "got: {first}");
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn queued_updates_keep_order() {
        let (conn, mut rx) = client(8);
        for value in ["10000", "10025", "9990"] {
            assert!(conn.send(Arc::new(value.to_owned())));
        }
        for value in ["10000", "10025", "9990"] {
            assert_eq!(rx.recv().await.unwrap().as_str(), value);
        }
        assert_eq!(conn.drop_count(), 0);
    }

    #[test]
    fn full_queue_loses_updates() {
        let (conn, _rx) = client(1);
        assert!(conn.send(Arc::new("first".into())));
        assert!(!conn.send(Arc::new("second".into())));
        assert!(!conn.send(Arc::new("third".into())));
        assert_eq!(conn.drop_count(), 2);
    }

    #[test]
    fn closed_queue_loses_updates() {
        let (conn, rx) = client(8);
        drop(rx);
        assert!(!conn.send(Arc::new("orphan".into())));
        assert_eq!(conn.drop_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_counts_from_open_until_activity() {
        let (conn, _rx) = client(1);
        tokio::time::sleep(Duration::from_secs(40)).await;
        assert_eq!(conn.idle(), Duration::from_secs(40));

        conn.mark_alive();
        assert_eq!(conn.idle(), Duration::ZERO);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(conn.idle(), Duration::from_secs(5));
        assert_eq!(conn.age(), Duration::from_secs(45));
    }
}
