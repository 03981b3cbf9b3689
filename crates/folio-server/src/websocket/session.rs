//! WebSocket session lifecycle: one connected client from upgrade through
//! disconnect.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::broadcast::BroadcastManager;
use super::connection::ClientConnection;
use super::heartbeat::{Heartbeat, HeartbeatResult};
use crate::config::ServerConfig;
use crate::metrics::{WS_CONNECTIONS_TOTAL, WS_DISCONNECTIONS_TOTAL, WS_HEARTBEAT_TIMEOUTS_TOTAL};

/// How long the writer gets to flush its close frame after the session ends.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a session for a freshly upgraded socket.
///
/// 1. Registers the client, which queues its initial `update`
/// 2. Forwards queued updates and periodic pings to the socket
/// 3. Closes the socket when the heartbeat times out or `shutdown` fires
/// 4. Ignores inbound text; any inbound frame counts as liveness
/// 5. Unregisters the client on exit
#[instrument(skip_all, fields(conn_id = %conn_id))]
pub async fn run_ws_session(
    socket: WebSocket,
    conn_id: String,
    broadcast: Arc<BroadcastManager>,
    config: Arc<ServerConfig>,
    shutdown: CancellationToken,
) {
    let (ws_tx, mut ws_rx) = socket.split();
    let (send_tx, send_rx) = mpsc::channel(config.send_queue_capacity.max(1));
    let connection = Arc::new(ClientConnection::new(conn_id.clone(), send_tx));
    let session_cancel = shutdown.child_token();

    ::metrics::counter!(WS_CONNECTIONS_TOTAL).increment(1);
    info!("client connected");

    let writer = tokio::spawn(forward_outbound(
        ws_tx,
        send_rx,
        config.heartbeat_interval(),
        session_cancel.clone(),
    ));

    let heartbeat = Heartbeat::new(config.heartbeat_timeout());
    let hb_conn = Arc::clone(&connection);
    let hb_cancel = session_cancel.clone();
    let heartbeat_task = tokio::spawn(async move {
        if heartbeat.run(hb_conn, hb_cancel.clone()).await == HeartbeatResult::TimedOut {
            ::metrics::counter!(WS_HEARTBEAT_TIMEOUTS_TOTAL).increment(1);
            warn!("client unresponsive, closing");
            hb_cancel.cancel();
        }
    });

    let _ = broadcast.on_connect(Arc::clone(&connection)).await;

    loop {
        tokio::select! {
            frame = ws_rx.next() => {
                match frame {
                    Some(Ok(Message::Close(_))) => {
                        debug!("client sent close frame");
                        break;
                    }
                    Some(Ok(Message::Text(text))) => {
                        connection.mark_alive();
                        debug!(len = text.len(), "ignoring inbound text");
                    }
                    Some(Ok(_)) => connection.mark_alive(),
                    Some(Err(e)) => {
                        debug!(error = %e, "socket read failed");
                        break;
                    }
                    None => break,
                }
            }
            () = session_cancel.cancelled() => break,
        }
    }

    session_cancel.cancel();
    let _ = broadcast.on_disconnect(&conn_id).await;
    let _ = heartbeat_task.await;
    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, writer).await.is_err() {
        debug!("writer did not finish in time");
    }

    ::metrics::counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    info!(
        duration_secs = connection.age().as_secs_f64(),
        dropped = connection.drop_count(),
        "client disconnected"
    );
}

/// Drain the outbound queue into the socket and ping on `ping_every`.
///
/// Sends a close frame once `cancel` fires.
async fn forward_outbound(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut send_rx: mpsc::Receiver<Arc<String>>,
    ping_every: Duration,
    cancel: CancellationToken,
) {
    let mut ping = tokio::time::interval(ping_every);
    // Skip the immediate first tick
    let _ = ping.tick().await;

    loop {
        tokio::select! {
            msg = send_rx.recv() => {
                let Some(text) = msg else { break };
                if ws_tx.send(Message::Text(text.as_str().into())).await.is_err() {
                    cancel.cancel();
                    break;
                }
            }
            _ = ping.tick() => {
                if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    cancel.cancel();
                    break;
                }
            }
            () = cancel.cancelled() => {
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }
        }
    }
    debug!("writer stopped");
}
