//! Server → client event envelope.

use chrono::{SecondsFormat, Utc};
use folio_core::PortfolioSnapshot;
use serde::{Deserialize, Serialize};

/// Event type carried by every balance message.
pub const UPDATE_EVENT: &str = "update";

/// `{"type":"update","timestamp":"…","data":{"portfolio_value":…}}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateEvent {
    /// Always [`UPDATE_EVENT`].
    #[serde(rename = "type")]
    pub event_type: String,
    /// RFC 3339 send time with millisecond precision.
    pub timestamp: String,
    /// The balance.
    pub data: PortfolioSnapshot,
}

impl UpdateEvent {
    /// Wrap `value` in an update stamped with the current time.
    pub fn new(value: f64) -> Self {
        Self {
            event_type: UPDATE_EVENT.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            data: PortfolioSnapshot {
                portfolio_value: value,
            },
        }
    }

    /// Serialize for the wire.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
