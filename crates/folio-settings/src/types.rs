//! Settings tree.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioSettings {
    /// HTTP and WebSocket server settings.
    pub server: ServerSettings,
    /// Value generator settings.
    pub generator: GeneratorSettings,
    /// Login page credentials.
    pub auth: AuthSettings,
    /// Log output settings.
    pub logging: LoggingSettings,
}

/// Server network and connection settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address.
    #[serde(deserialize_with = "scalar_string")]
    pub host: String,
    /// Bind port. `0` picks a free port.
    pub port: u16,
    /// Seconds between WebSocket pings.
    pub heartbeat_interval_secs: u64,
    /// Seconds without any inbound frame before a client is dropped.
    pub heartbeat_timeout_secs: u64,
    /// Outbound messages buffered per client before sends are dropped.
    pub send_queue_capacity: usize,
    /// Largest inbound WebSocket message accepted, in bytes.
    pub max_message_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
            send_queue_capacity: 64,
            max_message_size: 64 * 1024,
        }
    }
}

/// Simulated balance settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Balance at startup.
    pub initial_value: f64,
    /// Seconds between ticks.
    pub interval_secs: u64,
    /// Largest change applied in one tick, in either direction.
    pub max_delta: f64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            initial_value: 10_000.0,
            interval_secs: 10,
            max_delta: 50.0,
        }
    }
}

/// Credentials accepted by the login form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Expected username.
    #[serde(deserialize_with = "scalar_string")]
    pub username: String,
    /// Expected password.
    #[serde(deserialize_with = "scalar_string")]
    pub password: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password".to_string(),
        }
    }
}

/// Log output settings. `RUST_LOG` takes precedence over `level`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl FolioSettings {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let server = &self.server;
        if server.heartbeat_interval_secs == 0 {
            return Err(invalid("server.heartbeat_interval_secs must be > 0"));
        }
        if server.heartbeat_timeout_secs < server.heartbeat_interval_secs {
            return Err(invalid(
                "server.heartbeat_timeout_secs must be >= server.heartbeat_interval_secs",
            ));
        }
        if server.send_queue_capacity == 0 {
            return Err(invalid("server.send_queue_capacity must be > 0"));
        }
        if server.max_message_size == 0 {
            return Err(invalid("server.max_message_size must be > 0"));
        }

        let generator = &self.generator;
        if !generator.initial_value.is_finite() {
            return Err(invalid("generator.initial_value must be finite"));
        }
        if generator.interval_secs == 0 {
            return Err(invalid("generator.interval_secs must be > 0"));
        }
        if !generator.max_delta.is_finite() || generator.max_delta <= 0.0 {
            return Err(invalid("generator.max_delta must be finite and > 0"));
        }

        if !matches!(
            self.logging.level.to_ascii_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            return Err(invalid(&format!(
                "logging.level `{}` is not a log level",
                self.logging.level
            )));
        }
        Ok(())
    }
}

/// Accept any scalar for a string setting.
///
/// Env values are typed by figment, so `FOLIO_AUTH__PASSWORD=123456` arrives
/// as a number.
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(s) => s,
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Signed(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    })
}

fn invalid(msg: &str) -> SettingsError {
    SettingsError::InvalidValue(msg.to_string())
}
