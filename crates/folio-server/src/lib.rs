//! # folio-server
//!
//! Axum HTTP + `WebSocket` server for the live portfolio dashboard.
//!
//! - HTTP endpoints: dashboard, login and configuration pages, the
//!   `/api/portfolio` query, health and Prometheus metrics
//! - `WebSocket` gateway at `/ws`: connection registry, heartbeat, an
//!   immediate `update` on connect and fan-out of every generator tick
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod errors;
pub mod health;
pub mod metrics;
pub mod pages;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use errors::ServerError;
pub use server::{AppState, FolioServer};
pub use shutdown::ShutdownCoordinator;
