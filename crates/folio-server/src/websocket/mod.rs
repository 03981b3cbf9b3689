//! WebSocket connection management, heartbeat, and value broadcasting.

pub mod broadcast;
pub mod connection;
pub mod events;
pub mod heartbeat;
pub mod session;
