//! `/health` body: liveness plus a glance at the dashboard's state.

use serde::Serialize;
use std::time::Instant;

/// What `/health` reports.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `"ok"` whenever the handler runs at all.
    pub status: &'static str,
    /// Whole seconds since the server was built.
    pub uptime_secs: u64,
    /// Dashboard sockets currently registered with the broadcaster.
    pub connections: usize,
    /// Balance the next `update` would carry.
    pub portfolio_value: f64,
}

/// Snapshot the counters `/health` serves.
pub fn health_check(
    started: Instant,
    connections: usize,
    portfolio_value: f64,
) -> HealthResponse {
    HealthResponse {
        status: "ok",
        uptime_secs: started.elapsed().as_secs(),
        connections,
        portfolio_value,
    }
}
