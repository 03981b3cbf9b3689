//! Liveness checks for dashboard clients.
//!
//! The session writer pings on the heartbeat interval. This watchdog closes
//! the session once nothing has arrived from the client for `timeout`.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use super::connection::ClientConnection;

/// How the watchdog ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatResult {
    /// The client was silent for the whole timeout.
    TimedOut,
    /// The session ended or the server is shutting down.
    Cancelled,
}

/// Idle limit for one connection.
#[derive(Debug, Clone, Copy)]
pub struct Heartbeat {
    timeout: Duration,
}

impl Heartbeat {
    /// Give up after `timeout` without any inbound frame.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Watch `connection` until it goes quiet for `timeout` or `cancel` fires.
    ///
    /// Sleeps until the idle deadline, then re-checks; activity in between
    /// pushes the deadline out.
    pub async fn run(
        self,
        connection: Arc<ClientConnection>,
        cancel: CancellationToken,
    ) -> HeartbeatResult {
        loop {
            let idle = connection.idle();
            if idle >= self.timeout {
                return HeartbeatResult::TimedOut;
            }
            tokio::select! {
                () = time::sleep(self.timeout - idle) => {}
                () = cancel.cancelled() => return HeartbeatResult::Cancelled,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn make_connection() -> Arc<ClientConnection> {
        let (tx, _rx) = mpsc::channel(4);
        Arc::new(ClientConnection::new("hb_conn".into(), tx))
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_before_timeout() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = Heartbeat::new(Duration::from_secs(90))
            .run(make_connection(), cancel)
            .await;
        assert_eq!(result, HeartbeatResult::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_client_times_out_at_timeout() {
        let start = time::Instant::now();
        let result = Heartbeat::new(Duration::from_secs(90))
            .run(make_connection(), CancellationToken::new())
            .await;
        assert_eq!(result, HeartbeatResult::TimedOut);
        assert_eq!(start.elapsed(), Duration::from_secs(90));
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_follows_last_activity() {
        let conn = make_connection();
        let start = time::Instant::now();
        let handle = tokio::spawn(
            Heartbeat::new(Duration::from_secs(90)).run(Arc::clone(&conn), CancellationToken::new()),
        );

        time::sleep(Duration::from_secs(40)).await;
        conn.mark_alive();

        assert_eq!(handle.await.unwrap(), HeartbeatResult::TimedOut);
        assert_eq!(start.elapsed(), Duration::from_secs(130));
    }

    #[tokio::test(start_paused = true)]
    async fn active_client_stays_connected() {
        let conn = make_connection();
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(
            Heartbeat::new(Duration::from_secs(20)).run(Arc::clone(&conn), cancel.clone()),
        );

        for _ in 0..10 {
            time::sleep(Duration::from_secs(5)).await;
            conn.mark_alive();
        }
        assert!(!handle.is_finished());

        cancel.cancel();
        assert_eq!(handle.await.unwrap(), HeartbeatResult::Cancelled);
    }
}
