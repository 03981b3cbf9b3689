//! Stopping the dashboard: one token for the generator, the HTTP listener and
//! every client session.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Grace period for the generator and serve task when none is given.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Root of the cancellation tree.
///
/// Sessions hang child tokens off it, so cancelling here closes every open
/// dashboard socket with a close frame before the listener stops.
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// A coordinator that has not fired yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Token to hand to a task that should stop with the dashboard.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Fire the token. Calling it again does nothing.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether [`shutdown`](Self::shutdown) has fired.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Fire the token, then give `handles` up to `timeout` to return.
    ///
    /// `false` means something was still running when the grace period ran out.
    pub async fn graceful_shutdown(
        &self,
        handles: Vec<JoinHandle<()>>,
        timeout: Option<Duration>,
    ) -> bool {
        let timeout = timeout.unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT);

        self.shutdown();
        info!(
            tasks = handles.len(),
            grace_secs = timeout.as_secs(),
            "stopping generator and listener"
        );

        if tokio::time::timeout(timeout, futures::future::join_all(handles))
            .await
            .is_err()
        {
            warn!(?timeout, "tasks still running after grace period");
            return false;
        }
        info!("dashboard stopped");
        true
    }
}
